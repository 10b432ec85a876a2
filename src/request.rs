//! The render request and its on-disk forms.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::render::Section;

/// The three text fields interpolated into the prompt.
///
/// All fields are opaque text. Serialized forms must carry every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRequest {
    pub documents: String,
    pub history: String,
    pub question: String,
}

/// On-disk request format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Json,
    Toml,
}

impl RequestFormat {
    /// `.toml` files are TOML; everything else is treated as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

impl RenderRequest {
    pub fn new(
        documents: impl Into<String>,
        history: impl Into<String>,
        question: impl Into<String>,
    ) -> Self {
        Self {
            documents: documents.into(),
            history: history.into(),
            question: question.into(),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Invalid JSON request")
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid TOML request")
    }

    /// Reads a request file, picking the parser from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;

        let format = RequestFormat::from_path(path);
        debug!(path = ?path, format = ?format, "request_file_read");

        let request = match format {
            RequestFormat::Json => Self::from_json_str(&contents),
            RequestFormat::Toml => Self::from_toml_str(&contents),
        }
        .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(request)
    }

    /// Fields paired with their section, in prompt order.
    pub fn fields(&self) -> [(Section, &str); 3] {
        [
            (Section::Documents, self.documents.as_str()),
            (Section::History, self.history.as_str()),
            (Section::Question, self.question.as_str()),
        ]
    }

    /// Returns `(field, delimiter)` pairs where a field's text contains the
    /// closing tag of any section.
    ///
    /// Rendering never escapes such text, so a match means the prompt's
    /// structure can be read differently than intended.
    pub fn delimiter_collisions(&self) -> Vec<(Section, Section)> {
        let mut collisions = Vec::new();
        for (field, text) in self.fields() {
            for section in Section::ALL {
                if text.contains(section.close_tag()) {
                    collisions.push((field, section));
                }
            }
        }
        collisions
    }
}
