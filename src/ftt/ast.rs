//! Record graph
//!
//!     The parser output is an arena of records keyed by their normalized id. Records never
//!     point at each other directly: every relationship is a string slot that is looked up
//!     through the arena, so a dangling reference is an ordinary, reportable condition.
//!
//!     Field order inside a record is authored order. Keys keep the position of their first
//!     occurrence and repeated keys append to the same list, so `PARENT` twice gives one
//!     `PARENT` entry holding two fields.

use serde::ser::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub const SOURCE_SIGIL: char = '^';
pub const EVENT_SIGIL: char = '&';
pub const PLACEHOLDER_SIGIL: char = '?';

/// Header assignments, last write wins.
pub type Headers = BTreeMap<String, String>;

/// The identity index: normalized id to record.
pub type RecordMap = BTreeMap<String, Record>;

/// Record kind, decided once from the id sigil when the record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RecordType {
    Individual,
    Source,
    Event,
    Placeholder,
}

impl RecordType {
    pub fn from_id(id: &str) -> Self {
        match id.chars().next() {
            Some(SOURCE_SIGIL) => RecordType::Source,
            Some(EVENT_SIGIL) => RecordType::Event,
            Some(PLACEHOLDER_SIGIL) => RecordType::Placeholder,
            _ => RecordType::Individual,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Individual => write!(f, "individual"),
            RecordType::Source => write!(f, "source"),
            RecordType::Event => write!(f, "event"),
            RecordType::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// True when `id` names an intentionally unknown person. Placeholders always resolve.
pub fn is_placeholder(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_SIGIL)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub definition_line: usize,
    pub fields: FieldMap,
}

impl Record {
    pub fn new(id: impl Into<String>, definition_line: usize) -> Self {
        let id = id.into();
        let record_type = RecordType::from_id(&id);
        Self {
            id,
            record_type,
            definition_line,
            fields: FieldMap::default(),
        }
    }

    /// Fields under `key`, or an empty slice.
    pub fn fields(&self, key: &str) -> &[Field] {
        self.fields.get(key).unwrap_or(&[])
    }

    /// True if any field under `key` names `target` in slot 0.
    pub fn references(&self, key: &str, target: &str) -> bool {
        self.fields(key).iter().any(|field| field.slot(0) == target)
    }
}

/// A single authored (or inferred) value line.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub raw: String,
    pub parsed: Vec<String>,
    pub modifiers: ModifierMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FieldMetadata>,
    pub is_implicit: bool,
    pub line: usize,
}

impl Field {
    pub fn new(raw: String, parsed: Vec<String>, line: usize) -> Self {
        Self {
            raw,
            parsed,
            modifiers: ModifierMap::new(),
            metadata: None,
            is_implicit: false,
            line,
        }
    }

    /// A field synthesized by post-processing from already normalized slots.
    pub fn implicit(parsed: Vec<String>, line: usize) -> Self {
        let raw = parsed.join(" | ");
        Self {
            is_implicit: true,
            ..Self::new(raw, parsed, line)
        }
    }

    /// Slot `index`, or `""` when the author omitted it.
    pub fn slot(&self, index: usize) -> &str {
        self.parsed.get(index).map(String::as_str).unwrap_or("")
    }
}

pub type ModifierMap = BTreeMap<String, Vec<Modifier>>;

/// A citation or annotation bound to the field right before it.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Modifier {
    pub raw: String,
    pub parsed: Vec<String>,
    pub line: usize,
}

impl Modifier {
    pub fn slot(&self, index: usize) -> &str {
        self.parsed.get(index).map(String::as_str).unwrap_or("")
    }
}

/// Data hoisted out of place strings. Derived, never authoritative.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct FieldMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coords: Option<String>,
}

/// Insertion-ordered multimap from field key to fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, Vec<Field>)>,
}

impl FieldMap {
    pub fn get(&self, key: &str) -> Option<&[Field]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, fields)| fields.as_slice())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Vec<Field>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, fields)| fields)
    }

    /// Append a field under `key`, returning its index within that key.
    pub fn push(&mut self, key: &str, field: Field) -> usize {
        match self.get_mut(key) {
            Some(fields) => {
                fields.push(field);
                fields.len() - 1
            }
            None => {
                self.entries.push((key.to_string(), vec![field]));
                0
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Field])> {
        self.entries
            .iter()
            .map(|(key, fields)| (key.as_str(), fields.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<Field>)> {
        self.entries
            .iter_mut()
            .map(|(key, fields)| (key.as_str(), fields))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(key, fields)| (key, fields)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_from_sigil() {
        assert_eq!(RecordType::from_id("SMITH-1"), RecordType::Individual);
        assert_eq!(RecordType::from_id("^CENSUS"), RecordType::Source);
        assert_eq!(RecordType::from_id("&WEDDING"), RecordType::Event);
        assert_eq!(RecordType::from_id("?UNKNOWN"), RecordType::Placeholder);
    }

    #[test]
    fn test_field_map_keeps_first_occurrence_order() {
        let mut map = FieldMap::default();
        map.push("NAME", Field::new("A".into(), vec!["A".into()], 2));
        map.push("PARENT", Field::new("B".into(), vec!["B".into()], 3));
        let index = map.push("NAME", Field::new("C".into(), vec!["C".into()], 4));

        assert_eq!(index, 1);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["NAME", "PARENT"]);
        assert_eq!(map.get("NAME").map(<[Field]>::len), Some(2));
    }

    #[test]
    fn test_field_map_serializes_in_authored_order() {
        let mut map = FieldMap::default();
        map.push("ZED", Field::new("1".into(), vec!["1".into()], 1));
        map.push("ALPHA", Field::new("2".into(), vec!["2".into()], 2));

        let json = serde_json::to_string(&map).unwrap();
        assert!(json.find("ZED").unwrap() < json.find("ALPHA").unwrap());
    }

    #[test]
    fn test_slot_defaults_to_empty() {
        let field = Field::new("B | BIO".into(), vec!["B".into(), "BIO".into()], 1);
        assert_eq!(field.slot(1), "BIO");
        assert_eq!(field.slot(4), "");
    }

    #[test]
    fn test_implicit_field_joins_raw() {
        let field = Field::implicit(vec!["A".into(), "MARR".into()], 7);
        assert!(field.is_implicit);
        assert_eq!(field.raw, "A | MARR");
    }
}
