// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error type, render configuration and the image resolution seam

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Error type for decoding and converting documents
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// A referenced block is absent from the fetched block set
    #[error("Block {missing} is missing from the index{}", referenced_by_suffix(.referenced_by))]
    Integrity {
        missing: String,
        referenced_by: Option<String>,
    },

    #[error("Block {id} is its own ancestor")]
    Cycle { id: String },

    #[error("Block {id} is nested more than {depth} levels deep")]
    TooDeep { id: String, depth: usize },

    #[error("Invalid document URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to resolve image {token}: {message}")]
    ImageResolution { token: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn referenced_by_suffix(referenced_by: &Option<String>) -> String {
    match referenced_by {
        Some(owner) => format!(" (referenced by {owner})"),
        None => String::new(),
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

/// Configuration for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Use `<strong>`/`<em>`/`<del>` instead of `**`/`_`/`~~`
    pub use_html_tags: bool,
    /// Indentation unit repeated once per nesting level (default: tab)
    pub indent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            use_html_tags: false,
            indent: "\t".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn with_html_tags(mut self, use_html_tags: bool) -> Self {
        self.use_html_tags = use_html_tags;
        self
    }
}

/// A block rendered with substituted defaults because a field was missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderWarning {
    pub block_id: String,
    pub message: String,
}

/// Resolves image tokens to final paths once rendering is done
///
/// Implementations typically download the image into `image_dir` and return
/// the path the Markdown should point at.
pub trait ImageResolver {
    fn resolve(&mut self, token: &str, image_dir: &Path) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_config() {
        let config = RenderConfig::default();
        assert!(!config.use_html_tags);
        assert_eq!(config.indent, "\t");
    }

    #[test]
    fn test_render_config_partial_json() {
        let config: RenderConfig = serde_json::from_str(r#"{"use_html_tags": true}"#).unwrap();
        assert!(config.use_html_tags);
        assert_eq!(config.indent, "\t");
    }

    #[test]
    fn test_integrity_error_message() {
        let err = ConversionError::Integrity {
            missing: "c9".to_string(),
            referenced_by: Some("p1".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Block c9 is missing from the index (referenced by p1)"
        );

        let err = ConversionError::Integrity {
            missing: "root".to_string(),
            referenced_by: None,
        };
        assert_eq!(err.to_string(), "Block root is missing from the index");
    }
}
