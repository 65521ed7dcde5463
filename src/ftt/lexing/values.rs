//! Value splitting
//!
//! A flushed field value is a single string that may hold several positional slots
//! separated by `|`. The author writes `\|` to keep a literal pipe inside a slot and `\\`
//! for a literal backslash. Other backslash sequences are left untouched because place
//! strings give `\{`, `\}`, `\<` and `\>` their own meaning later on. Place slots keep
//! `\\` as well, since place extraction resolves it.

use logos::Logos;
use unicode_normalization::UnicodeNormalization;

pub const DELIMITER: char = '|';

/// Tokens of a field value.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueToken {
    #[token("\\|")]
    EscapedDelimiter,

    #[token("\\\\")]
    EscapedBackslash,

    // Any other escape is kept verbatim for downstream parsers
    #[regex(r"\\[^|\\]")]
    Escape,

    // A trailing backslash with nothing to escape
    #[token("\\")]
    Backslash,

    #[token("|")]
    Delimiter,

    #[regex(r"[^|\\]+")]
    Text,
}

/// Split `raw` into trimmed, NFC-normalized slots.
///
/// Empty input yields no slots. Adjacent delimiters yield an empty slot at that position.
pub fn split_values(raw: &str) -> Vec<String> {
    split_values_keeping(raw, &[])
}

/// Like [`split_values`], but slots whose index is in `verbatim` keep `\\` as written.
pub fn split_values_keeping(raw: &str, verbatim: &[usize]) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut slots = Vec::new();
    let mut current = String::new();
    let mut lexer = ValueToken::lexer(raw);
    while let Some(token) = lexer.next() {
        match token {
            Ok(ValueToken::Delimiter) => slots.push(finish_slot(&mut current)),
            Ok(ValueToken::EscapedDelimiter) => current.push(DELIMITER),
            Ok(ValueToken::EscapedBackslash) if !verbatim.contains(&slots.len()) => {
                current.push('\\')
            }
            Ok(
                ValueToken::EscapedBackslash
                | ValueToken::Escape
                | ValueToken::Backslash
                | ValueToken::Text,
            )
            | Err(()) => current.push_str(lexer.slice()),
        }
    }
    slots.push(finish_slot(&mut current));
    slots
}

fn finish_slot(current: &mut String) -> String {
    let slot = std::mem::take(current);
    normalize(slot.trim())
}

/// Unicode NFC normalization.
pub fn normalize(text: &str) -> String {
    text.nfc().collect()
}
