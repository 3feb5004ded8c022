use std::collections::BTreeSet;

use serde::Serialize;

/// A position in source text, tracking line and column for error reporting.
///
/// Both are 1-based. The column points at the `<` that starts the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Whether a tag token opens or closes an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Open,
    Close,
}

/// A tag token produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagToken {
    pub kind: TagKind,
    pub name: String,
    pub span: Span,
}

impl TagToken {
    pub fn new(kind: TagKind, name: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            name: name.into(),
            span,
        }
    }

    pub fn open(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TagKind::Open, name, Span::new(line, column))
    }

    pub fn close(name: impl Into<String>, line: usize, column: usize) -> Self {
        Self::new(TagKind::Close, name, Span::new(line, column))
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

/// Tag name used when no names are configured.
pub const DEFAULT_TAG: &str = "div";

/// Layout and component names watched by the `components` preset.
pub const COMPONENT_PRESET: &[&str] = &[
    "div",
    "main",
    "Card",
    "CardContent",
    "Dialog",
    "DialogContent",
    "Badge",
];

/// Which tag names the scanner emits tokens for.
///
/// Names are case-sensitive: `Card` and `card` are different tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// Every tag-like token on the line.
    Any,
    /// Only the listed names. An empty set behaves like [`DEFAULT_TAG`]
    /// alone, the same as [`TagFilter::names`] with no names.
    Names(BTreeSet<String>),
}

impl TagFilter {
    /// Build a watch-list filter. An empty list falls back to [`DEFAULT_TAG`].
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if set.is_empty() {
            set.insert(DEFAULT_TAG.to_string());
        }
        TagFilter::Names(set)
    }

    /// The `components` preset watch-list.
    pub fn components() -> Self {
        Self::names(COMPONENT_PRESET.iter().copied())
    }

    /// Check whether a tag name is tracked by this filter.
    pub fn tracks(&self, name: &str) -> bool {
        match self {
            TagFilter::Any => true,
            TagFilter::Names(set) if set.is_empty() => name == DEFAULT_TAG,
            TagFilter::Names(set) => set.contains(name),
        }
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::names([DEFAULT_TAG])
    }
}
