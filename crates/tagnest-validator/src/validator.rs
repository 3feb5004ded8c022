//! Stack machine that checks tag nesting.
//!
//! Opens push, closes pop. A close with nothing open is an extra close; a
//! close that pops a differently named tag is a mismatch, and the popped
//! entry is consumed either way. Whatever is left at end of input is
//! reported once as unclosed.

use std::path::Path;

use tagnest_lexer::{Scanner, TagKind, TagToken};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::diagnostic::{Diagnostic, OpenTag, Report};
use crate::ValidateError;

/// Single-pass nesting validator.
pub struct Validator {
    scanner: Scanner,
    stack: Vec<OpenTag>,
    diagnostics: Vec<Diagnostic>,
}

impl Validator {
    pub fn new(config: &ValidatorConfig) -> Self {
        Self::with_scanner(config.scanner())
    }

    pub fn with_scanner(scanner: Scanner) -> Self {
        Self {
            scanner,
            stack: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize one line and apply its tokens in order.
    pub fn feed_line(&mut self, line_no: usize, line: &str) {
        for token in self.scanner.scan_line(line_no, line) {
            self.push_token(&token);
        }
    }

    /// Apply a single token to the stack.
    pub fn push_token(&mut self, token: &TagToken) {
        let line = token.line();
        match token.kind {
            TagKind::Open => {
                debug!(tag = %token.name, line, depth = self.stack.len() + 1, "open");
                self.stack.push(OpenTag::new(token.name.clone(), line));
            }
            TagKind::Close => match self.stack.pop() {
                None => {
                    debug!(tag = %token.name, line, "extra close");
                    self.diagnostics.push(Diagnostic::ExtraClosingTag {
                        tag: token.name.clone(),
                        line,
                    });
                }
                Some(open) if open.tag == token.name => {
                    debug!(tag = %token.name, line, opened = open.line, "close");
                }
                Some(open) => {
                    debug!(opened = %open.tag, closed = %token.name, line, "mismatch");
                    self.diagnostics.push(Diagnostic::MismatchedTag {
                        opened: open.tag,
                        opened_line: open.line,
                        closed: token.name.clone(),
                        closed_line: line,
                    });
                }
            },
        }
    }

    /// Tags currently open, outermost first.
    pub fn open_tags(&self) -> &[OpenTag] {
        &self.stack
    }

    /// End the scan and collect the report.
    pub fn finish(mut self) -> Report {
        if !self.stack.is_empty() {
            self.diagnostics.push(Diagnostic::UnclosedTags {
                tags: std::mem::take(&mut self.stack),
            });
        }
        debug!(count = self.diagnostics.len(), "scan finished");
        Report {
            diagnostics: self.diagnostics,
        }
    }
}

/// Validate source text. Lines are numbered from 1.
pub fn validate_str(source: &str, config: &ValidatorConfig) -> Report {
    let mut validator = Validator::new(config);
    for (idx, line) in source.lines().enumerate() {
        validator.feed_line(idx + 1, line);
    }
    validator.finish()
}

/// Read and validate a file. Failure to read is the only error.
pub fn validate_file(path: &Path, config: &ValidatorConfig) -> Result<Report, ValidateError> {
    let source = std::fs::read_to_string(path).map_err(|source| ValidateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "read source");
    Ok(validate_str(&source, config))
}
