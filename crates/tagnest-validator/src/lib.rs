//! tagnest Validator
//!
//! Checks that tracked tags in JSX-like markup are properly nested.
//! Tokens come from `tagnest-lexer`; this crate runs the open-tag stack
//! and reports extra closes, mismatched pairs and tags left open.
//!
//! # Example
//!
//! ```
//! use tagnest_validator::{validate_str, Diagnostic, ValidatorConfig};
//!
//! let report = validate_str("</div>\n<div>\n</div>", &ValidatorConfig::default());
//! assert_eq!(
//!     report.diagnostics,
//!     vec![Diagnostic::ExtraClosingTag { tag: "div".into(), line: 1 }]
//! );
//! ```

pub mod config;
pub mod diagnostic;
pub mod validator;

use std::path::PathBuf;

pub use config::{ValidatorConfig, CONFIG_FILE_NAME};
pub use diagnostic::{Diagnostic, OpenTag, Report};
pub use validator::{validate_file, validate_str, Validator};

/// Fatal errors. Nesting problems are never errors; they are diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}
