//! Parse session
//!
//! All mutable state of one parse: headers, the record arena and the reporter. Nothing
//! here outlives a single call to [`parse`](crate::ftt::parsing::parse).

use crate::ftt::ast::{Headers, RecordMap};
use crate::ftt::diagnostics::{Diagnostic, DiagnosticCode, Reporter};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub headers: Headers,
    /// Line of the last assignment of each header, for diagnostics only.
    pub header_lines: HashMap<String, usize>,
    pub records: RecordMap,
    pub reporter: Reporter,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a diagnostic. A fatal code turns into an [`Abort`] carrying the headers
    /// collected so far.
    pub fn report(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        line: usize,
    ) -> Result<(), Abort> {
        self.reporter
            .raise(code, message, line)
            .map_err(|diagnostic| self.abort(diagnostic))
    }

    pub fn abort(&self, diagnostic: Diagnostic) -> Abort {
        Abort {
            headers: self.headers.clone(),
            diagnostic,
        }
    }
}

/// A fatal diagnostic that ended the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Abort {
    pub headers: Headers,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for Abort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::error::Error for Abort {}
