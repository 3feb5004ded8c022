use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::token::{Span, TagFilter, TagKind, TagToken};

/// `<name` or `</name`, in a single alternation so matches come out in
/// document order.
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<(/)?([A-Za-z0-9]+)").unwrap());

/// Line-oriented tag scanner.
///
/// Extracts open and close tag tokens from each line independently using
/// pattern matching. This is not a markup lexer:
/// - tags split across lines are never reassembled; `<div` counts as an
///   open tag even when its `>` sits on a later line
/// - string literals and comments are not recognised, so tag-like text
///   inside them produces tokens
/// - self-closing tags are detected with a same-line heuristic
#[derive(Debug, Clone)]
pub struct Scanner {
    filter: TagFilter,
    self_closing_heuristic: bool,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(TagFilter::default())
    }
}

impl Scanner {
    /// Create a scanner for the given filter, with the self-closing
    /// heuristic enabled.
    pub fn new(filter: TagFilter) -> Self {
        Self {
            filter,
            self_closing_heuristic: true,
        }
    }

    /// Enable or disable the same-line self-closing suppression.
    pub fn with_self_closing_heuristic(mut self, enabled: bool) -> Self {
        self.self_closing_heuristic = enabled;
        self
    }

    pub fn filter(&self) -> &TagFilter {
        &self.filter
    }

    /// Tokenize a whole source text. Lines are numbered from 1.
    pub fn tokenize(&self, source: &str) -> Vec<TagToken> {
        source
            .lines()
            .enumerate()
            .flat_map(|(idx, line)| self.scan_line(idx + 1, line))
            .collect()
    }

    /// Scan a single line, returning its tracked tag tokens left to right.
    pub fn scan_line(&self, line_no: usize, line: &str) -> Vec<TagToken> {
        let mut tokens = Vec::new();

        for caps in TAG_RE.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let name = name.as_str();
            if !self.filter.tracks(name) {
                continue;
            }

            let kind = if caps.get(1).is_some() {
                TagKind::Close
            } else {
                TagKind::Open
            };

            if kind == TagKind::Open
                && self.self_closing_heuristic
                && has_self_closing(line, name)
            {
                trace!(line = line_no, tag = name, "suppressed self-closing open");
                continue;
            }

            let column = line[..whole.start()].chars().count() + 1;
            let token = TagToken::new(kind, name, Span::new(line_no, column));
            trace!(?token, "tag");
            tokens.push(token);
        }

        tokens
    }
}

/// Check whether `line` contains `<name` followed by a run of characters
/// other than `>` and `/`, then `/>`.
///
/// Matches exactly what `<name[^>/]*/>` would, without compiling a regex for
/// every tag name: the run always stops at the first `>` or `/`, so
/// backtracking could never find another match. There is no word boundary after the name, so `<CardContent />` also
/// counts as a self-closing `Card`.
pub fn has_self_closing(line: &str, name: &str) -> bool {
    let needle = format!("<{name}");
    let mut rest = line;
    while let Some(idx) = rest.find(&needle) {
        let after = &rest[idx + needle.len()..];
        let run = after.find(['>', '/']).unwrap_or(after.len());
        if after[run..].starts_with("/>") {
            return true;
        }
        rest = &rest[idx + 1..];
    }
    false
}
