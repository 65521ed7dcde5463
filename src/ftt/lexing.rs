//! Lexing
//!
//!     Turns source text into classified lines and field values into slots. Everything in
//!     this module is stateless: the state machine that consumes classified lines lives in
//!     [building](crate::ftt::building).
//!
//!     The pipeline is:
//!         1. [line_source]: lazily yields `(text, line number)` pairs with line endings
//!            normalized. The source is never split into a line array.
//!         2. [line_classification]: decides what a single line is (comment, separator,
//!            continuation, blank, key declaration or invalid).
//!         3. [values]: splits a flushed value on unescaped `|` delimiters using a logos
//!            lexer and NFC-normalizes every slot.

pub mod line_classification;
pub mod line_source;
pub mod values;

pub use line_classification::{classify_line, KeyLine, LineKind};
pub use line_source::{LineSource, SourceLine};
pub use values::{normalize, split_values, split_values_keeping};
