//! Line Classification
//!
//! Decides what a single source line is. This is an explicit tokenizer over a tiny
//! grammar: a handful of prefix checks and one structured `KEY: value` split.
//!
//! Dispatch order, first match wins:
//!     1. `#` at column 0: comment.
//!     2. `---` at column 0: block separator.
//!     3. Two or more leading spaces: continuation of the open key, even when nothing
//!        follows the indentation.
//!     4. Empty or whitespace-only: blank (paragraph break inside an open key).
//!     5. `KEY:` or `KEY: value` at column 0: key declaration.
//!     6. Anything else: invalid syntax.

pub const COMMENT_MARKER: char = '#';
pub const SEPARATOR_MARKER: &str = "---";
pub const CONTINUATION_INDENT: &str = "  ";

/// Classification of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Comment,
    Separator,
    Blank,
    /// Line text with exactly the two indentation spaces removed.
    Continuation(&'a str),
    Key(KeyLine<'a>),
    Invalid,
}

/// A `KEY: value` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLine<'a> {
    pub key: &'a str,
    /// Inline value after `": "`, untrimmed. Empty for a bare `KEY:`.
    pub value: &'a str,
}

/// Classify one line of source text.
pub fn classify_line(text: &str) -> LineKind<'_> {
    if text.starts_with(COMMENT_MARKER) {
        return LineKind::Comment;
    }
    if text.starts_with(SEPARATOR_MARKER) {
        return LineKind::Separator;
    }
    if let Some(rest) = text.strip_prefix(CONTINUATION_INDENT) {
        return LineKind::Continuation(rest);
    }
    if text.trim().is_empty() {
        return LineKind::Blank;
    }
    match parse_key_line(text) {
        Some(key_line) => LineKind::Key(key_line),
        None => LineKind::Invalid,
    }
}

/// Split `KEY: value`. The key must start at column 0 and the colon must be followed by
/// end of line or a single space.
pub fn parse_key_line(text: &str) -> Option<KeyLine<'_>> {
    let colon = text.find(':')?;
    let key = &text[..colon];
    if !is_key(key) {
        return None;
    }
    let rest = &text[colon + 1..];
    let value = if rest.is_empty() {
        rest
    } else {
        rest.strip_prefix(' ')?
    };
    Some(KeyLine { key, value })
}

/// `[A-Z][A-Z0-9_]*`
pub fn is_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
