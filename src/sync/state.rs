// file: src/sync/state.rs
// description: writes sync state and conflict notes back into the repository
// reference: descriptor rewrite through the repository writer

use crate::config::Config;
use crate::error::Result;
use crate::models::{ArticleMetadata, ArticlePaths};
use crate::remote::{CommitRequest, RepositoryWriter};
use crate::utils::Template;
use tracing::{debug, info};

/// Both sides of an article that diverged since the last sync.
pub struct ConflictFile<'a> {
    pub slug: &'a str,
    pub repository: &'a str,
    pub note: &'a str,
}

impl ConflictFile<'_> {
    pub fn render(&self) -> String {
        let fence = fence_for(&[self.repository, self.note]);

        format!(
            "# Conflict in {slug}\n\n\
             The repository copy changed after the last sync and note has a different version.\n\
             Merge the two below into index.md, then pull again with --force.\n\n\
             ## Repository version\n\n{fence}\n{repository}\n{fence}\n\n\
             ## note version\n\n{fence}\n{note}\n{fence}\n",
            slug = self.slug,
            repository = self.repository.trim_end(),
            note = self.note.trim_end(),
        )
    }
}

/// A backtick fence longer than any backtick run in the quoted documents.
fn fence_for(documents: &[&str]) -> String {
    let longest = documents
        .iter()
        .flat_map(|doc| doc.split(|c| c != '`'))
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

pub struct StateRecorder<'a, W> {
    writer: &'a W,
    config: &'a Config,
}

impl<'a, W: RepositoryWriter> StateRecorder<'a, W> {
    pub fn new(writer: &'a W, config: &'a Config) -> Self {
        Self { writer, config }
    }

    pub async fn save_metadata(&self, paths: &ArticlePaths, meta: &ArticleMetadata) -> Result<()> {
        let path = paths.descriptor();
        let content = meta.to_json()?;
        self.write(paths, path, content).await?;
        debug!(
            "{}: recorded {} at {}",
            paths.slug(),
            meta.editing.version,
            meta.editing.locked_at.as_deref().unwrap_or("-")
        );
        Ok(())
    }

    pub async fn write_conflict(&self, paths: &ArticlePaths, conflict: &ConflictFile<'_>) -> Result<()> {
        let path = paths.conflict();
        self.write(paths, path.clone(), conflict.render()).await?;
        info!("Wrote {}", path);
        Ok(())
    }

    async fn write(&self, paths: &ArticlePaths, path: String, content: String) -> Result<()> {
        let existing = self.writer.read(&path).await?;
        if existing.as_ref().is_some_and(|file| file.content == content) {
            return Ok(());
        }

        let message = Template::new(&self.config.sync.state_message).render(&[("slug", paths.slug())]);
        self.writer
            .commit(&CommitRequest {
                path,
                content,
                message,
                sha: existing.map(|file| file.sha),
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fakes::MemoryWriter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conflict_file_layout() {
        let rendered = ConflictFile {
            slug: "hello",
            repository: "Local edit\n",
            note: "Note edit",
        }
        .render();

        assert!(rendered.starts_with("# Conflict in hello\n"));
        assert!(rendered.contains("## Repository version\n\n```\nLocal edit\n```\n"));
        assert!(rendered.contains("## note version\n\n```\nNote edit\n```\n"));
    }

    #[test]
    fn test_fence_outgrows_quoted_code() {
        assert_eq!(fence_for(&["plain"]), "```");
        assert_eq!(fence_for(&["```rust\nx\n```", "````"]), "`````");
    }

    #[tokio::test]
    async fn test_save_metadata_updates_descriptor() {
        let writer = MemoryWriter::default()
            .with_file("articles/hello/meta.json", r#"{"note_id": "n1", "title": "T"}"#);
        let config = Config::default_config();
        let paths = ArticlePaths::new("articles", "hello");
        let meta = ArticleMetadata::new("n1", "T", "hello");

        StateRecorder::new(&writer, &config)
            .save_metadata(&paths, &meta)
            .await
            .unwrap();

        let commits = writer.committed();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].message, "chore: sync state for hello [skip ci]");
        assert!(commits[0].sha.is_some());
        assert_eq!(writer.file("articles/hello/meta.json"), Some(meta.to_json().unwrap()));
    }

    #[test]
    fn test_identical_descriptor_is_not_recommitted() {
        let config = Config::default_config();
        let paths = ArticlePaths::new("articles", "hello");
        let meta = ArticleMetadata::new("n1", "T", "hello");
        let writer =
            MemoryWriter::default().with_file("articles/hello/meta.json", &meta.to_json().unwrap());

        tokio_test::block_on(StateRecorder::new(&writer, &config).save_metadata(&paths, &meta))
            .unwrap();

        assert!(writer.committed().is_empty());
    }
}
