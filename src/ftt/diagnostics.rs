//! Diagnostics and the error reporter
//!
//!     Every problem found while parsing is a [`Diagnostic`] tagged with a stable
//!     [`DiagnosticCode`]. The code alone decides the tier: fatal codes abort the session,
//!     error codes accumulate in `errors`, warning codes accumulate in `warnings`.
//!
//!     The [`Reporter`] owns the recoverable lists for one session. Raising a fatal code
//!     hands the diagnostic back as an `Err`, so the caller can unwind with `?` instead of
//!     relying on a panic or a flag checked later.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Severity tier of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Fatal,
    Error,
    Warning,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Fatal => write!(f, "fatal"),
            Tier::Error => write!(f, "error"),
            Tier::Warning => write!(f, "warning"),
        }
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Syntax
    InvalidSyntax,
    // Context
    OrphanIndentation,
    HeaderInRecord,
    OrphanKey,
    ModifierMismatch,
    // Identity
    InvalidId,
    DuplicateId,
    DuplicateIdIgnored,
    // Header / version
    MissingHeader,
    InvalidVersion,
    UnsupportedVersion,
    // Graph integrity
    UnresolvedReference,
    MissingSource,
    GhostChild,
    LineageCycle,
    // Vocabulary
    InvalidVocabulary,
    UnknownVocabulary,
    NonstandardVocabulary,
    // Temporal
    InvalidDate,
    // Consistency
    UnionMismatch,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::InvalidSyntax => "ERR_SYNTAX_INVALID",
            DiagnosticCode::OrphanIndentation => "ERR_CONTEXT_INDENT",
            DiagnosticCode::HeaderInRecord => "ERR_CONTEXT_HEADER",
            DiagnosticCode::OrphanKey => "ERR_CONTEXT_ORPHAN_KEY",
            DiagnosticCode::ModifierMismatch => "ERR_CONTEXT_MODIFIER",
            DiagnosticCode::InvalidId => "ERR_ID_INVALID",
            DiagnosticCode::DuplicateId => "ERR_ID_DUPLICATE",
            DiagnosticCode::DuplicateIdIgnored => "ERR_ID_DUPLICATE_IGNORED",
            DiagnosticCode::MissingHeader => "ERR_HEADER_MISSING",
            DiagnosticCode::InvalidVersion => "ERR_VERSION_INVALID",
            DiagnosticCode::UnsupportedVersion => "ERR_VERSION_UNSUPPORTED",
            DiagnosticCode::UnresolvedReference => "ERR_REF_UNRESOLVED",
            DiagnosticCode::MissingSource => "ERR_SRC_MISSING",
            DiagnosticCode::GhostChild => "ERR_GHOST_CHILD",
            DiagnosticCode::LineageCycle => "ERR_LINEAGE_CYCLE",
            DiagnosticCode::InvalidVocabulary => "ERR_VOCAB_INVALID",
            DiagnosticCode::UnknownVocabulary => "ERR_VOCAB_UNKNOWN",
            DiagnosticCode::NonstandardVocabulary => "WARN_VOCAB_NONSTANDARD",
            DiagnosticCode::InvalidDate => "ERR_DATE_FORMAT",
            DiagnosticCode::UnionMismatch => "WARN_UNION_MISMATCH",
        }
    }

    /// The fixed tier for this code.
    pub fn tier(&self) -> Tier {
        match self {
            DiagnosticCode::DuplicateIdIgnored | DiagnosticCode::UnknownVocabulary => Tier::Error,
            DiagnosticCode::NonstandardVocabulary | DiagnosticCode::UnionMismatch => {
                Tier::Warning
            }
            _ => Tier::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.tier() == Tier::Fatal
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DiagnosticCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// 1-based source line.
    pub line: usize,
    pub tier: Tier,
    pub timestamp: DateTime<Utc>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>, line: usize) -> Self {
        Self {
            code,
            message: message.into(),
            line,
            tier: code.tier(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] line {}: {}",
            self.tier, self.code, self.line, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Recoverable diagnostics collected during one session.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Fatal codes are returned as `Err` and never stored.
    pub fn raise(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        line: usize,
    ) -> Result<(), Diagnostic> {
        let diagnostic = Diagnostic::new(code, message, line);
        match diagnostic.tier {
            Tier::Fatal => {
                log::debug!("fatal diagnostic: {}", diagnostic);
                return Err(diagnostic);
            }
            Tier::Error => self.errors.push(diagnostic),
            Tier::Warning => self.warnings.push(diagnostic),
        }
        Ok(())
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_lists(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_integrity_codes_are_fatal() {
        for code in [
            DiagnosticCode::UnresolvedReference,
            DiagnosticCode::MissingSource,
            DiagnosticCode::GhostChild,
            DiagnosticCode::LineageCycle,
        ] {
            assert!(code.is_fatal(), "{code} should be fatal");
        }
    }

    #[test]
    fn test_reporter_sorts_by_tier() {
        let mut reporter = Reporter::new();
        reporter
            .raise(DiagnosticCode::UnionMismatch, "mismatch", 4)
            .unwrap();
        reporter
            .raise(DiagnosticCode::UnknownVocabulary, "unknown", 5)
            .unwrap();

        assert_eq!(reporter.warnings().len(), 1);
        assert_eq!(reporter.errors().len(), 1);
        assert_eq!(reporter.errors()[0].code, DiagnosticCode::UnknownVocabulary);
    }

    #[test]
    fn test_reporter_returns_fatal() {
        let mut reporter = Reporter::new();
        let err = reporter
            .raise(DiagnosticCode::GhostChild, "ghost", 9)
            .unwrap_err();

        assert_eq!(err.tier, Tier::Fatal);
        assert_eq!(err.line, 9);
        assert!(reporter.errors().is_empty());
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::new(DiagnosticCode::InvalidDate, "bad date", 3);
        insta::assert_snapshot!(diag.to_string(), @"fatal[ERR_DATE_FORMAT] line 3: bad date");
    }

    #[test]
    fn test_serializes_code_as_string() {
        let diag = Diagnostic::new(DiagnosticCode::UnionMismatch, "m", 1);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["code"], "WARN_UNION_MISMATCH");
        assert_eq!(json["tier"], "warning");
    }
}
