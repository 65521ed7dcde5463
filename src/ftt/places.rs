//! Place strings
//!
//! A place slot may carry a geocoding override and a coordinate pair next to the text
//! meant for display:
//!
//!     London {=London, Greater London, England} <51.5, -0.1>
//!
//! [`extract_place`] strips both markers out of the display text and returns them
//! separately. `\{`, `\}`, `\<`, `\>` and `\\` are literal characters: they never open or
//! close a marker, inside or outside one.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceToken {
    #[regex(r"\\[{}<>\\]")]
    Escaped,

    #[regex(r"\{=([^}\\]|\\.)*\}")]
    Geocode,

    #[regex(r"<([^>\\]|\\.)*>")]
    Coordinates,

    #[regex(r"[^\\{<]+")]
    Text,
}

/// A place slot split into its display text and hoisted metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceParts {
    pub display: String,
    pub geo: Option<String>,
    pub coords: Option<String>,
}

impl PlaceParts {
    pub fn has_metadata(&self) -> bool {
        self.geo.is_some() || self.coords.is_some()
    }
}

pub fn extract_place(value: &str) -> PlaceParts {
    let mut parts = PlaceParts::default();
    let mut display = String::with_capacity(value.len());
    let mut lexer = PlaceToken::lexer(value);

    while let Some(token) = lexer.next() {
        let slice = lexer.slice();
        match token {
            Ok(PlaceToken::Escaped) => display.push_str(&slice[1..]),
            Ok(PlaceToken::Geocode) => {
                parts.geo = Some(unescape(slice[2..slice.len() - 1].trim()));
            }
            Ok(PlaceToken::Coordinates) => {
                parts.coords = Some(unescape(slice[1..slice.len() - 1].trim()));
            }
            // Unterminated markers and stray backslashes stay literal
            Ok(PlaceToken::Text) | Err(()) => display.push_str(slice),
        }
    }

    parts.display = display.split_whitespace().collect::<Vec<_>>().join(" ");
    parts
}

/// Resolve marker escapes inside a hoisted marker body.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('{' | '}' | '<' | '>' | '\\'))) => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
