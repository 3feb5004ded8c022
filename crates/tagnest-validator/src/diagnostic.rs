use std::fmt;

use serde::Serialize;

/// A tag that was opened and is still waiting for its close.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenTag {
    pub tag: String,
    pub line: usize,
}

impl OpenTag {
    pub fn new(tag: impl Into<String>, line: usize) -> Self {
        Self {
            tag: tag.into(),
            line,
        }
    }
}

/// A structural finding. Findings never stop the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A close tag with nothing open.
    ExtraClosingTag { tag: String, line: usize },
    /// A close tag whose name differs from the innermost open tag.
    MismatchedTag {
        opened: String,
        opened_line: usize,
        closed: String,
        closed_line: usize,
    },
    /// Tags still open at end of input, outermost first.
    UnclosedTags { tags: Vec<OpenTag> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ExtraClosingTag { tag, line } => {
                write!(f, "Extra closing {tag} at line {line}")
            }
            Diagnostic::MismatchedTag {
                opened,
                opened_line,
                closed,
                closed_line,
            } => write!(
                f,
                "Mismatch: Opened {opened} at {opened_line}, but closed {closed} at {closed_line}"
            ),
            Diagnostic::UnclosedTags { tags } => {
                write!(f, "Still open: ")?;
                for (i, open) in tags.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} (line {})", open.tag, open.line)?;
                }
                Ok(())
            }
        }
    }
}

/// The outcome of one scan: every diagnostic, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// True when the scan found nothing to report.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Entries left on the stack at end of input.
    pub fn unclosed(&self) -> &[OpenTag] {
        self.diagnostics
            .iter()
            .find_map(|d| match d {
                Diagnostic::UnclosedTags { tags } => Some(tags.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Human-readable report, one line per diagnostic.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out
    }
}
