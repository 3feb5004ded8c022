use std::path::Path;

use serde::Deserialize;
use tagnest_lexer::{Scanner, TagFilter};

use crate::ValidateError;

/// File name picked up from the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "tagnest.toml";

/// Validator settings.
///
/// Deserialized from TOML:
///
/// ```toml
/// tracked_tags = ["div", "Card"]
/// self_closing_heuristic = true
/// all_tags = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Names to watch. Empty means `div` only.
    pub tracked_tags: Vec<String>,
    /// Suppress opens that also appear self-closed on the same line.
    pub self_closing_heuristic: bool,
    /// Track every tag-like token, ignoring `tracked_tags`.
    pub all_tags: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            tracked_tags: Vec::new(),
            self_closing_heuristic: true,
            all_tags: false,
        }
    }
}

impl ValidatorConfig {
    /// Watch-list configuration for the given names.
    pub fn watching<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracked_tags: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load a config file. A missing file is an I/O error.
    pub fn load(path: &Path) -> Result<Self, ValidateError> {
        let source = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source).map_err(|e| ValidateError::Config {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    pub fn filter(&self) -> TagFilter {
        if self.all_tags {
            TagFilter::Any
        } else {
            TagFilter::names(self.tracked_tags.iter().cloned())
        }
    }

    /// Build the scanner this configuration describes.
    pub fn scanner(&self) -> Scanner {
        Scanner::new(self.filter()).with_self_closing_heuristic(self.self_closing_heuristic)
    }
}
