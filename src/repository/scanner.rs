// file: src/repository/scanner.rs
// description: discovers article directories in a local checkout
// reference: https://docs.rs/walkdir

use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const MARKDOWN_FILE: &str = "index.md";
const DESCRIPTOR_FILE: &str = "meta.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedArticle {
    pub slug: String,
    pub markdown_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub has_descriptor: bool,
}

pub struct ArticleScanner {
    root: PathBuf,
}

impl ArticleScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Every `<root>/<slug>/index.md` one level below the root, sorted by
    /// slug. Directories whose name is not a valid slug are skipped.
    pub fn scan(&self) -> Result<Vec<ScannedArticle>> {
        Validator::validate_directory(&self.root)?;
        info!("Scanning articles in {}", self.root.display());

        let mut articles = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                PipelineError::Validation(format!("Failed to scan {}: {}", self.root.display(), e))
            })?;

            if !entry.file_type().is_file() || entry.file_name() != MARKDOWN_FILE {
                continue;
            }

            let Some(directory) = entry.path().parent() else {
                continue;
            };
            let Some(slug) = Self::slug_of(directory) else {
                continue;
            };

            if Validator::validate_slug(&slug).is_err() {
                debug!("Skipping directory with invalid slug: {}", directory.display());
                continue;
            }

            let descriptor_path = directory.join(DESCRIPTOR_FILE);
            articles.push(ScannedArticle {
                slug,
                markdown_path: entry.path().to_path_buf(),
                has_descriptor: descriptor_path.is_file(),
                descriptor_path,
            });
        }

        info!("Found {} articles", articles.len());
        Ok(articles)
    }

    pub fn slugs(&self) -> Result<Vec<String>> {
        Ok(self.scan()?.into_iter().map(|a| a.slug).collect())
    }

    fn slug_of(directory: &Path) -> Option<String> {
        directory
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
    }
}
