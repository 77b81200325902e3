// file: src/utils/validation.rs
// description: validation helpers for slugs, note ids, coordinates and urls
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref SLUG: Regex = Regex::new(
        r"^[a-z0-9][a-z0-9_-]*$"
    ).expect("SLUG regex is valid");

    static ref REPO_COORDINATE: Regex = Regex::new(
        r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$"
    ).expect("REPO_COORDINATE regex is valid");

    static ref NOTE_ID: Regex = Regex::new(
        r"^[A-Za-z0-9]+$"
    ).expect("NOTE_ID regex is valid");

    static ref SLUG_SEPARATORS: Regex = Regex::new(
        r"[^a-z0-9]+"
    ).expect("SLUG_SEPARATORS regex is valid");
}

pub struct Validator;

impl Validator {
    /// Slugs name a directory in the repository, so they stay lowercase,
    /// ascii and free of path separators.
    pub fn validate_slug(slug: &str) -> Result<()> {
        if !SLUG.is_match(slug) {
            return Err(PipelineError::Validation(format!(
                "Invalid slug '{}': use lowercase letters, digits, '-' or '_'",
                slug
            )));
        }
        Ok(())
    }

    pub fn validate_note_id(note_id: &str) -> Result<()> {
        if !NOTE_ID.is_match(note_id) {
            return Err(PipelineError::Validation(format!(
                "Invalid note id '{}'",
                note_id
            )));
        }
        Ok(())
    }

    pub fn validate_repo_coordinate(repo: &str) -> Result<()> {
        if !REPO_COORDINATE.is_match(repo) {
            return Err(PipelineError::Validation(format!(
                "Repository must look like owner/name, got '{}'",
                repo
            )));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Lowercases and joins ascii alphanumeric runs with `-`. Titles with no
    /// ascii content produce an empty slug, which callers must reject.
    pub fn slugify(title: &str) -> String {
        let lowered = title.to_lowercase();
        SLUG_SEPARATORS
            .replace_all(&lowered, "-")
            .trim_matches('-')
            .to_string()
    }
}
