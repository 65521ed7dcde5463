//! Parse results
//!
//!     [`parse`] and [`parse_with`] run the full pipeline and never fail: a fatal
//!     diagnostic becomes a [`ParseResult`] holding the headers read before it, no
//!     records, no recoverable diagnostics and exactly one entry in `fatal`.

use crate::ftt::ast::{Headers, RecordMap, RecordType};
use crate::ftt::config::ParserConfig;
use crate::ftt::diagnostics::Diagnostic;
use crate::ftt::session::{Abort, Session};
use crate::ftt::transforms::standard::{graph_pipeline, GraphTransform, STRING_TO_GRAPH};
use serde::Serialize;
use std::fmt;

/// The output of one parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseResult {
    pub headers: Headers,
    pub records: RecordMap,
    pub fatal: Vec<Diagnostic>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn from_session(session: Session) -> Self {
        let (errors, warnings) = session.reporter.into_lists();
        Self {
            headers: session.headers,
            records: session.records,
            fatal: Vec::new(),
            errors,
            warnings,
        }
    }

    pub fn from_abort(abort: Abort) -> Self {
        Self {
            headers: abort.headers,
            records: RecordMap::new(),
            fatal: vec![abort.diagnostic],
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when no fatal diagnostic was raised.
    pub fn is_valid(&self) -> bool {
        self.fatal.is_empty()
    }

    pub fn fatal_diagnostic(&self) -> Option<&Diagnostic> {
        self.fatal.first()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            fatal: self.fatal.len(),
            errors: self.errors.len(),
            warnings: self.warnings.len(),
            ..Summary::default()
        };
        for record in self.records.values() {
            match record.record_type {
                RecordType::Individual => summary.individuals += 1,
                RecordType::Source => summary.sources += 1,
                RecordType::Event => summary.events += 1,
                RecordType::Placeholder => summary.placeholders += 1,
            }
            summary.implicit_fields += record
                .fields
                .iter()
                .flat_map(|(_, fields)| fields)
                .filter(|field| field.is_implicit)
                .count();
        }
        summary
    }
}

/// Record and diagnostic counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub individuals: usize,
    pub sources: usize,
    pub events: usize,
    pub placeholders: usize,
    pub implicit_fields: usize,
    pub fatal: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "records: {} individual(s), {} source(s), {} event(s), {} placeholder(s)",
            self.individuals, self.sources, self.events, self.placeholders
        )?;
        writeln!(f, "implicit fields: {}", self.implicit_fields)?;
        write!(
            f,
            "diagnostics: {} fatal, {} error(s), {} warning(s)",
            self.fatal, self.errors, self.warnings
        )
    }
}

/// Parse with the default configuration.
pub fn parse(source: &str) -> ParseResult {
    run(&STRING_TO_GRAPH, source)
}

/// Parse with an explicit configuration.
pub fn parse_with(source: &str, config: &ParserConfig) -> ParseResult {
    run(&graph_pipeline(config), source)
}

pub(crate) fn run(pipeline: &GraphTransform, source: &str) -> ParseResult {
    match pipeline.run(source.to_string()) {
        Ok(session) => {
            let result = ParseResult::from_session(session);
            log::info!(
                "parsed {} record(s) with {} error(s) and {} warning(s)",
                result.records.len(),
                result.errors.len(),
                result.warnings.len()
            );
            result
        }
        Err(abort) => {
            log::info!("parse aborted: {}", abort);
            ParseResult::from_abort(abort)
        }
    }
}
