//! Fluent assertion API for parse results

use super::matchers::TextMatch;
use crate::ftt::ast::{Field, Record, RecordType};
use crate::ftt::diagnostics::{Diagnostic, DiagnosticCode};
use crate::ftt::parsing::ParseResult;

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for a parse result
pub fn assert_graph(result: &ParseResult) -> GraphAssertion<'_> {
    GraphAssertion { result }
}

fn codes(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Graph Assertions
// ============================================================================

pub struct GraphAssertion<'a> {
    result: &'a ParseResult,
}

impl<'a> GraphAssertion<'a> {
    /// Assert no fatal diagnostic was raised
    pub fn is_valid(self) -> Self {
        assert!(
            self.result.is_valid(),
            "Expected a valid graph, found fatal: [{}]",
            codes(&self.result.fatal)
        );
        self
    }

    /// Assert the run aborted with `code`, leaving no records behind
    pub fn aborted_with(self, code: DiagnosticCode) -> Self {
        let actual: Vec<DiagnosticCode> = self.result.fatal.iter().map(|d| d.code).collect();
        assert_eq!(
            actual,
            vec![code],
            "Expected exactly one fatal {}, found [{}]",
            code,
            codes(&self.result.fatal)
        );
        assert!(
            self.result.records.is_empty(),
            "Expected no records after a fatal diagnostic, found {}",
            self.result.records.len()
        );
        self
    }

    /// Assert the single fatal diagnostic's message
    pub fn fatal_message(self, expected: impl Into<TextMatch>) -> Self {
        let fatal = self
            .result
            .fatal_diagnostic()
            .unwrap_or_else(|| panic!("Expected a fatal diagnostic, found none"));
        expected.into().assert(&fatal.message, "fatal message");
        self
    }

    pub fn fatal_line(self, expected: usize) -> Self {
        let line = self.result.fatal_diagnostic().map(|d| d.line);
        assert_eq!(line, Some(expected), "Expected fatal on line {}", expected);
        self
    }

    pub fn error_codes(self, expected: &[DiagnosticCode]) -> Self {
        let actual: Vec<DiagnosticCode> = self.result.errors.iter().map(|d| d.code).collect();
        assert_eq!(
            actual,
            expected,
            "Unexpected errors: [{}]",
            codes(&self.result.errors)
        );
        self
    }

    pub fn warning_codes(self, expected: &[DiagnosticCode]) -> Self {
        let actual: Vec<DiagnosticCode> = self.result.warnings.iter().map(|d| d.code).collect();
        assert_eq!(
            actual,
            expected,
            "Unexpected warnings: [{}]",
            codes(&self.result.warnings)
        );
        self
    }

    pub fn header(self, key: &str, expected: impl Into<TextMatch>) -> Self {
        let value = self
            .result
            .headers
            .get(key)
            .unwrap_or_else(|| panic!("Expected header '{}', found none", key));
        expected.into().assert(value, &format!("headers.{}", key));
        self
    }

    pub fn record_count(self, expected: usize) -> Self {
        let ids: Vec<&str> = self.result.records.keys().map(String::as_str).collect();
        assert_eq!(
            ids.len(),
            expected,
            "Expected {} records, found {}: [{}]",
            expected,
            ids.len(),
            ids.join(", ")
        );
        self
    }

    /// Assert on one record by id
    pub fn record<F>(self, id: &str, assertion: F) -> Self
    where
        F: FnOnce(RecordAssertion<'a>),
    {
        let record = self.result.records.get(id).unwrap_or_else(|| {
            panic!(
                "Expected record '{}', found [{}]",
                id,
                self.result
                    .records
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        });
        assertion(RecordAssertion {
            record,
            context: format!("records[{}]", id),
        });
        self
    }
}

// ============================================================================
// Record Assertions
// ============================================================================

pub struct RecordAssertion<'a> {
    record: &'a Record,
    context: String,
}

impl<'a> RecordAssertion<'a> {
    pub fn record_type(self, expected: RecordType) -> Self {
        assert_eq!(
            self.record.record_type, expected,
            "{}: Expected type {}, found {}",
            self.context, expected, self.record.record_type
        );
        self
    }

    pub fn defined_on(self, line: usize) -> Self {
        assert_eq!(
            self.record.definition_line, line,
            "{}: Expected definition on line {}",
            self.context, line
        );
        self
    }

    pub fn field_keys(self, expected: &[&str]) -> Self {
        let keys: Vec<&str> = self.record.fields.keys().collect();
        assert_eq!(keys, expected, "{}: Unexpected field keys", self.context);
        self
    }

    pub fn field_count(self, key: &str, expected: usize) -> Self {
        let actual = self.record.fields(key).len();
        assert_eq!(
            actual, expected,
            "{}: Expected {} {} field(s), found {}",
            self.context, expected, key, actual
        );
        self
    }

    /// Slot 0 of every field under `key`, in order
    pub fn targets(self, key: &str, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self.record.fields(key).iter().map(|f| f.slot(0)).collect();
        assert_eq!(
            actual, expected,
            "{}: Unexpected {} targets",
            self.context, key
        );
        self
    }

    pub fn field<F>(self, key: &str, index: usize, assertion: F) -> Self
    where
        F: FnOnce(FieldAssertion<'a>),
    {
        let fields = self.record.fields(key);
        assert!(
            index < fields.len(),
            "{}: {} index {} out of bounds ({} field(s))",
            self.context,
            key,
            index,
            fields.len()
        );
        assertion(FieldAssertion {
            field: &fields[index],
            context: format!("{}.{}[{}]", self.context, key, index),
        });
        self
    }
}

// ============================================================================
// Field Assertions
// ============================================================================

pub struct FieldAssertion<'a> {
    field: &'a Field,
    context: String,
}

impl<'a> FieldAssertion<'a> {
    pub fn raw(self, expected: impl Into<TextMatch>) -> Self {
        expected
            .into()
            .assert(&self.field.raw, &format!("{}.raw", self.context));
        self
    }

    pub fn parsed(self, expected: &[&str]) -> Self {
        assert_eq!(
            self.field.parsed, expected,
            "{}: Unexpected parsed slots",
            self.context
        );
        self
    }

    pub fn slot(self, index: usize, expected: impl Into<TextMatch>) -> Self {
        expected
            .into()
            .assert(self.field.slot(index), &format!("{}.parsed[{}]", self.context, index));
        self
    }

    pub fn is_implicit(self) -> Self {
        assert!(self.field.is_implicit, "{}: Expected an implicit field", self.context);
        self
    }

    pub fn is_authored(self) -> Self {
        assert!(!self.field.is_implicit, "{}: Expected an authored field", self.context);
        self
    }

    pub fn coords(self, expected: Option<&str>) -> Self {
        let actual = self.field.metadata.as_ref().and_then(|m| m.coords.as_deref());
        assert_eq!(actual, expected, "{}: Unexpected coordinates", self.context);
        self
    }

    pub fn geo(self, expected: Option<&str>) -> Self {
        let actual = self.field.metadata.as_ref().and_then(|m| m.geo.as_deref());
        assert_eq!(actual, expected, "{}: Unexpected geocode", self.context);
        self
    }

    /// Slot 0 of every modifier under `key`, in order
    pub fn modifier_targets(self, key: &str, expected: &[&str]) -> Self {
        let actual: Vec<&str> = self
            .field
            .modifiers
            .get(key)
            .map(|list| list.iter().map(|m| m.slot(0)).collect())
            .unwrap_or_default();
        assert_eq!(
            actual, expected,
            "{}: Unexpected {} modifiers",
            self.context, key
        );
        self
    }
}
