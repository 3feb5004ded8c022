//! tagnest Lexer
//!
//! Extracts open and close tag tokens from JSX-like markup, one line at a
//! time. Matching is pattern based: tags split across lines, string
//! literals and comments are not understood.
//!
//! # Example
//!
//! ```
//! use tagnest_lexer::{Scanner, TagFilter, TagKind};
//!
//! let scanner = Scanner::new(TagFilter::names(["Card"]));
//! let tokens = scanner.scan_line(1, "<Card><div></div></Card>");
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].kind, TagKind::Open);
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, TagFilter, TagKind, TagToken, COMPONENT_PRESET, DEFAULT_TAG};
