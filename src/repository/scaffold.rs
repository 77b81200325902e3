// file: src/repository/scaffold.rs
// description: creates a new article directory with markdown and sidecar descriptor

use crate::error::{PipelineError, Result};
use crate::models::ArticleMetadata;
use crate::utils::{Template, Validator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ScaffoldedArticle {
    pub slug: String,
    pub directory: PathBuf,
}

pub struct ArticleScaffold {
    root: PathBuf,
}

impl ArticleScaffold {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `<root>/<slug>/index.md` and `meta.json`. The slug defaults to
    /// the slugified title. An existing article is never overwritten.
    pub fn create(&self, title: &str, note_id: &str, slug: Option<&str>) -> Result<ScaffoldedArticle> {
        let title = title.trim();
        if title.is_empty() {
            return Err(PipelineError::Validation("Title must not be empty".to_string()));
        }
        Validator::validate_note_id(note_id)?;

        let slug = match slug {
            Some(slug) => slug.to_string(),
            None => Validator::slugify(title),
        };
        if slug.is_empty() {
            return Err(PipelineError::Validation(format!(
                "Cannot derive a slug from '{}'; pass one explicitly",
                title
            )));
        }
        Validator::validate_slug(&slug)?;

        let directory = self.root.join(&slug);
        if directory.join("index.md").exists() {
            return Err(PipelineError::Validation(format!(
                "Article already exists: {}",
                directory.display()
            )));
        }

        fs::create_dir_all(&directory).map_err(|e| PipelineError::FileOperation {
            path: directory.clone(),
            source: e,
        })?;

        let markdown = Template::article_skeleton().render(&[("title", title)]);
        let descriptor = ArticleMetadata::new(note_id, title, &slug).to_json()?;

        write_file(&directory.join("index.md"), &markdown)?;
        write_file(&directory.join("meta.json"), &descriptor)?;

        info!("Created article {} in {}", slug, directory.display());
        Ok(ScaffoldedArticle { slug, directory })
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| PipelineError::FileOperation {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ArticleScanner;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_create_article() {
        let temp = TempDir::new().unwrap();
        let scaffold = ArticleScaffold::new(temp.path());

        let article = scaffold.create("Hello, World!", "n1a2b3", None).unwrap();

        assert_eq!(article.slug, "hello-world");
        let markdown = fs::read_to_string(article.directory.join("index.md")).unwrap();
        assert!(markdown.starts_with("# Hello, World!\n"));

        let descriptor = fs::read_to_string(article.directory.join("meta.json")).unwrap();
        let meta = ArticleMetadata::from_json("meta.json", &descriptor).unwrap();
        assert_eq!(meta.note_id, "n1a2b3");
        assert_eq!(meta.slug.as_deref(), Some("hello-world"));

        let scanned = ArticleScanner::new(temp.path()).scan().unwrap();
        assert_eq!(scanned.len(), 1);
        assert!(scanned[0].has_descriptor);
    }

    #[test]
    fn test_create_refuses_existing_article() {
        let temp = TempDir::new().unwrap();
        let scaffold = ArticleScaffold::new(temp.path());
        scaffold.create("Post", "n1", Some("post")).unwrap();

        assert!(scaffold.create("Post again", "n2", Some("post")).is_err());
    }

    #[test]
    fn test_create_requires_usable_slug() {
        let temp = TempDir::new().unwrap();
        let scaffold = ArticleScaffold::new(temp.path());

        assert!(scaffold.create("日本語のタイトル", "n1", None).is_err());
        assert!(scaffold.create("日本語のタイトル", "n1", Some("japanese-title")).is_ok());
        assert!(scaffold.create("Title", "bad/id", None).is_err());
    }
}
