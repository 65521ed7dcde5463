//! Pipeline stages
//!
//! Each stage owns the parser configuration it needs, so a pipeline built from one
//! [`ParserConfig`] behaves the same on every run.

use crate::ftt::assembling::assemble;
use crate::ftt::building::{finish, step, ParserState};
use crate::ftt::config::ParserConfig;
use crate::ftt::lexing::LineSource;
use crate::ftt::session::{Abort, Session};
use crate::ftt::transforms::Runnable;
use crate::ftt::validation::validate;

/// Source text to a sealed session: line classification and record construction.
pub struct LineProcessing {
    config: ParserConfig,
}

impl LineProcessing {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl Runnable<String, Session> for LineProcessing {
    fn run(&self, input: String) -> Result<Session, Abort> {
        let mut state = ParserState::new();
        let mut lines = 0;
        for line in LineSource::new(&input) {
            lines = line.number;
            state = step(state, line, &self.config)?;
        }
        let session = finish(state);
        log::debug!(
            "line processing: {} line(s), {} header(s), {} record(s)",
            lines,
            session.headers.len(),
            session.records.len()
        );
        Ok(session)
    }
}

/// Implicit unions and children, place extraction.
#[derive(Default)]
pub struct PostProcessing;

impl PostProcessing {
    pub fn new() -> Self {
        PostProcessing
    }
}

impl Runnable<Session, Session> for PostProcessing {
    fn run(&self, input: Session) -> Result<Session, Abort> {
        assemble(input)
    }
}

/// Header, reference, lineage, vocabulary and date checks.
pub struct GraphValidation {
    config: ParserConfig,
}

impl GraphValidation {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl Runnable<Session, Session> for GraphValidation {
    fn run(&self, input: Session) -> Result<Session, Abort> {
        validate(input, &self.config)
    }
}
