//! Line source
//!
//! Yields one line at a time from an in-memory source. `\r\n` and lone `\r` both end a
//! line, and a leading byte order mark is dropped.

/// A single source line with its 1-based number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    pub text: &'a str,
    pub number: usize,
}

/// Lazy iterator over the lines of a source string.
pub struct LineSource<'a> {
    rest: Option<&'a str>,
    number: usize,
}

impl<'a> LineSource<'a> {
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self {
            rest: if source.is_empty() { None } else { Some(source) },
            number: 0,
        }
    }
}

impl<'a> Iterator for LineSource<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        self.number += 1;
        let text = match rest.find(['\n', '\r']) {
            Some(end) => {
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                let remaining = &rest[end + terminator..];
                self.rest = if remaining.is_empty() {
                    None
                } else {
                    Some(remaining)
                };
                &rest[..end]
            }
            None => {
                self.rest = None;
                rest
            }
        };
        Some(SourceLine {
            text,
            number: self.number,
        })
    }
}
