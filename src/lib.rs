//! # ftt
//!
//! A parser and validator for the FTT family-tree text format.
//!
//! An FTT file is a list of `HEAD_` headers followed by keyed record blocks:
//!
//! ```text
//! HEAD_FORMAT: FTT v0.1
//!
//! ID: SMITH-1
//! NAME: John | Smith
//! BORN: 1850-06-14 | Boston, Massachusetts <42.36, -71.06>
//! BORN_SRC: ^CENSUS-1860
//! UNION: JONES-2 | MARR | 1872
//! ```
//!
//! [`parse`] turns such text into a validated record graph plus diagnostics. A fatal
//! diagnostic yields no records at all, never a partial graph.
//!
//! For assertions on parse results in tests, see the [testing module](ftt::testing).

pub mod ftt;

pub use ftt::ast::{Field, FieldMetadata, Modifier, Record, RecordType};
pub use ftt::config::{DuplicatePolicy, FttConfig, ParserConfig};
pub use ftt::diagnostics::{Diagnostic, DiagnosticCode, Tier};
pub use ftt::loader::{DocumentLoader, LoaderError};
pub use ftt::parsing::{parse, parse_with, ParseResult, Summary};
