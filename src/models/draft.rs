// file: src/models/draft.rs
// description: platform-side draft values exchanged with the publishing client
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A draft as returned by the platform; `body` is an HTML fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Draft,
    Published,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Draft => "draft",
            Visibility::Published => "published",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" | "private" => Ok(Visibility::Draft),
            "published" | "public" => Ok(Visibility::Published),
            other => Err(format!("unknown visibility: {}", other)),
        }
    }
}

/// Body of a "create/update draft" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftUpdate {
    pub title: String,
    pub body: String,
    pub visibility: Visibility,
}

impl DraftUpdate {
    pub fn draft(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            visibility: Visibility::Draft,
        }
    }
}
