//! Record construction
//!
//!     Turns classified lines into headers, records, fields and modifiers. The parse
//!     buffer is an explicit [`Accumulator`] carried in [`ParserState`]; [`step`] consumes
//!     the state plus one line and returns the next state, so every transition can be
//!     driven and inspected from a test without a session object in the background.
//!
//!     Fields and modifiers are created once, when their buffer is flushed. A buffer is
//!     flushed when the next key, an `ID`, a block separator or the end of input arrives.

use crate::ftt::ast::{Field, Modifier, Record, PLACEHOLDER_SIGIL, SOURCE_SIGIL, EVENT_SIGIL};
use crate::ftt::config::ParserConfig;
use crate::ftt::diagnostics::DiagnosticCode;
use crate::ftt::lexing::{
    classify_line, normalize, split_values, split_values_keeping, KeyLine, LineKind, SourceLine,
};
use crate::ftt::schema::{field_spec, is_header_key, ModifierKind, IDENTITY_KEY};
use crate::ftt::session::{Abort, Session};

/// One piece of buffered value text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Text(String),
    /// A blank line inside an open key; joins as a newline.
    ParagraphBreak,
}

/// Where a flushed buffer goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Header(String),
    Field {
        record: String,
        key: String,
    },
    Modifier {
        record: String,
        field_key: String,
        field_index: usize,
        key: String,
    },
    /// Content of a duplicate block skipped under the lenient policy.
    Discarded,
}

/// Text collected for the currently open key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulator {
    pub target: Target,
    /// Line of the key declaration.
    pub line: usize,
    chunks: Vec<Chunk>,
}

impl Accumulator {
    pub fn new(target: Target, line: usize, inline: &str) -> Self {
        let mut acc = Self {
            target,
            line,
            chunks: Vec::new(),
        };
        if !inline.is_empty() {
            acc.push_text(inline);
        }
        acc
    }

    /// Append continuation text, folding it onto the previous text with one space.
    pub fn push_text(&mut self, text: &str) {
        if matches!(self.chunks.last(), Some(Chunk::Text(_))) {
            self.chunks.push(Chunk::Text(" ".to_string()));
        }
        self.chunks.push(Chunk::Text(text.to_string()));
    }

    pub fn push_paragraph_break(&mut self) {
        self.chunks.push(Chunk::ParagraphBreak);
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Joined text with only the outer edges trimmed.
    pub fn joined(&self) -> String {
        let mut text = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Text(part) => text.push_str(part),
                Chunk::ParagraphBreak => text.push('\n'),
            }
        }
        text.trim().to_string()
    }
}

/// The record block lines are currently attributed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordContext {
    #[default]
    None,
    Open(String),
    /// A duplicate block whose content is dropped.
    Discarding,
}

/// The data field a following modifier may bind to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastField {
    pub key: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ParserState {
    pub session: Session,
    pub context: RecordContext,
    pub last_field: Option<LastField>,
    pub buffer: Option<Accumulator>,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advance the state machine by one line.
pub fn step(
    mut state: ParserState,
    line: SourceLine<'_>,
    config: &ParserConfig,
) -> Result<ParserState, Abort> {
    match classify_line(line.text) {
        LineKind::Comment => {}
        LineKind::Separator => {
            flush(&mut state);
            state.context = RecordContext::None;
            state.last_field = None;
        }
        LineKind::Blank => {
            if let Some(buffer) = state.buffer.as_mut() {
                buffer.push_paragraph_break();
            }
        }
        LineKind::Continuation(text) => match state.buffer.as_mut() {
            Some(buffer) => buffer.push_text(text),
            None => {
                state.session.report(
                    DiagnosticCode::OrphanIndentation,
                    "Indented line has no open key to continue",
                    line.number,
                )?;
            }
        },
        LineKind::Key(key_line) => open_key(&mut state, key_line, line.number, config)?,
        LineKind::Invalid => {
            state.session.report(
                DiagnosticCode::InvalidSyntax,
                format!("Unrecognized line: '{}'", line.text),
                line.number,
            )?;
        }
    }
    Ok(state)
}

/// Flush the open buffer and hand back the finished session.
pub fn finish(mut state: ParserState) -> Session {
    flush(&mut state);
    state.session
}

fn open_key(
    state: &mut ParserState,
    key_line: KeyLine<'_>,
    number: usize,
    config: &ParserConfig,
) -> Result<(), Abort> {
    let KeyLine { key, value } = key_line;

    if is_header_key(key) {
        if state.context != RecordContext::None {
            return state.session.report(
                DiagnosticCode::HeaderInRecord,
                format!("Header '{key}' appears inside a record; headers must come first"),
                number,
            );
        }
        flush(state);
        state.buffer = Some(Accumulator::new(Target::Header(key.to_string()), number, value));
        return Ok(());
    }

    if key == IDENTITY_KEY {
        flush(state);
        return open_record(state, value, number, config);
    }

    let record = match &state.context {
        RecordContext::None => {
            return state.session.report(
                DiagnosticCode::OrphanKey,
                format!("Key '{key}' appears outside of any record"),
                number,
            );
        }
        RecordContext::Discarding => {
            flush(state);
            state.buffer = Some(Accumulator::new(Target::Discarded, number, value));
            return Ok(());
        }
        RecordContext::Open(id) => id.clone(),
    };

    flush(state);

    let target = match ModifierKind::split_key(key) {
        Some((base, _)) => match &state.last_field {
            Some(last) if last.key == base => Target::Modifier {
                record,
                field_key: last.key.clone(),
                field_index: last.index,
                key: key.to_string(),
            },
            other => {
                let found = other
                    .as_ref()
                    .map(|last| format!("'{}'", last.key))
                    .unwrap_or_else(|| "no field".to_string());
                return state.session.report(
                    DiagnosticCode::ModifierMismatch,
                    format!("Modifier '{key}' must follow a '{base}' field, found {found}"),
                    number,
                );
            }
        },
        None => Target::Field {
            record,
            key: key.to_string(),
        },
    };
    state.buffer = Some(Accumulator::new(target, number, value));
    Ok(())
}

fn open_record(
    state: &mut ParserState,
    value: &str,
    number: usize,
    config: &ParserConfig,
) -> Result<(), Abort> {
    let id = normalize(value.trim());
    state.last_field = None;

    if !is_valid_id(&id) {
        return state.session.report(
            DiagnosticCode::InvalidId,
            format!("Invalid record id '{id}'"),
            number,
        );
    }

    if let Some(existing) = state.session.records.get(&id) {
        let message = format!(
            "Duplicate id '{id}' (first defined on line {})",
            existing.definition_line
        );
        state
            .session
            .report(config.duplicate_ids.diagnostic_code(), message, number)?;
        state.context = RecordContext::Discarding;
        return Ok(());
    }

    log::trace!("record '{}' opened on line {}", id, number);
    state
        .session
        .records
        .insert(id.clone(), Record::new(id.clone(), number));
    state.context = RecordContext::Open(id);
    Ok(())
}

fn flush(state: &mut ParserState) {
    let Some(buffer) = state.buffer.take() else {
        return;
    };
    let raw = buffer.joined();
    let line = buffer.line;

    match buffer.target {
        Target::Header(key) => {
            state.session.headers.insert(key.clone(), normalize(&raw));
            state.session.header_lines.insert(key, line);
        }
        Target::Field { record, key } => {
            let parsed = split_values_keeping(&raw, field_spec(&key).places);
            if let Some(record) = state.session.records.get_mut(&record) {
                let index = record.fields.push(&key, Field::new(raw, parsed, line));
                state.last_field = Some(LastField { key, index });
            }
        }
        Target::Modifier {
            record,
            field_key,
            field_index,
            key,
        } => {
            let parsed = split_values(&raw);
            let field = state
                .session
                .records
                .get_mut(&record)
                .and_then(|record| record.fields.get_mut(&field_key))
                .and_then(|fields| fields.get_mut(field_index));
            if let Some(field) = field {
                field
                    .modifiers
                    .entry(key)
                    .or_default()
                    .push(Modifier { raw, parsed, line });
            }
        }
        Target::Discarded => {}
    }
}

/// Optional sigil followed by alphanumerics, `-`, `_` or `.`; a bare `?` is allowed.
pub fn is_valid_id(id: &str) -> bool {
    if id.len() == 1 && id.starts_with(PLACEHOLDER_SIGIL) {
        return true;
    }
    let body = id
        .strip_prefix([SOURCE_SIGIL, EVENT_SIGIL, PLACEHOLDER_SIGIL])
        .unwrap_or(id);
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
