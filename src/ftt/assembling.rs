//! Post-processing
//!
//!     Runs over the sealed record graph after line processing and before validation.
//!     It only adds implicit fields and rewrites place slots in place; no authored field
//!     is ever removed or reassigned. The passes run in a fixed order:
//!
//!         1. [`infer_unions`]: mirror one-sided unions onto the partner.
//!         2. [`reconcile_children`]: append children that only declare their parent.
//!         3. [`extract_places`]: strip geocode and coordinate markers from place slots.

use crate::ftt::ast::{is_placeholder, Field, FieldMetadata, RecordMap};
use crate::ftt::dates::{leading_year, UNKNOWN_YEAR};
use crate::ftt::diagnostics::DiagnosticCode;
use crate::ftt::places::extract_place;
use crate::ftt::schema::{
    field_spec, BORN_KEY, CHILD_KEY, PARENT_KEY, UNION_KEY, UNION_METADATA_SLOTS,
};
use crate::ftt::session::{Abort, Session};
use std::collections::{BTreeMap, BTreeSet};

/// Run every post-processing pass in order.
pub fn assemble(mut session: Session) -> Result<Session, Abort> {
    infer_unions(&mut session)?;
    reconcile_children(&mut session.records);
    extract_places(&mut session.records);
    Ok(session)
}

/// Authored union fields from one record naming one partner, in authored order.
type UnionSides = BTreeMap<(String, String), Vec<Field>>;

fn authored_unions(records: &RecordMap) -> UnionSides {
    let mut sides = UnionSides::new();
    for (id, record) in records {
        for field in record.fields(UNION_KEY) {
            let partner = field.slot(0);
            if field.is_implicit
                || partner.is_empty()
                || partner == id.as_str()
                || is_placeholder(partner)
                || !records.contains_key(partner)
            {
                continue;
            }
            sides
                .entry((id.clone(), partner.to_string()))
                .or_default()
                .push(field.clone());
        }
    }
    sides
}

/// Pair the k-th union A→B with the k-th union B→A. Paired unions are compared slot by
/// slot; an unpaired one gets an implicit mirror on the partner.
pub fn infer_unions(session: &mut Session) -> Result<(), Abort> {
    let sides = authored_unions(&session.records);
    let pairs: BTreeSet<(&str, &str)> = sides
        .keys()
        .map(|(a, b)| {
            if a < b {
                (a.as_str(), b.as_str())
            } else {
                (b.as_str(), a.as_str())
            }
        })
        .collect();

    let mut mirrors: Vec<(String, Field)> = Vec::new();
    for (a, b) in pairs {
        let empty = Vec::new();
        let from_a = sides.get(&(a.to_string(), b.to_string())).unwrap_or(&empty);
        let from_b = sides.get(&(b.to_string(), a.to_string())).unwrap_or(&empty);

        for (left, right) in from_a.iter().zip(from_b) {
            let differs = UNION_METADATA_SLOTS
                .into_iter()
                .find(|&i| left.slot(i) != right.slot(i));
            if let Some(slot) = differs {
                session.report(
                    DiagnosticCode::UnionMismatch,
                    format!(
                        "Union between '{a}' and '{b}' disagrees in slot {slot}: '{}' (line {}) vs '{}' (line {})",
                        left.slot(slot),
                        left.line,
                        right.slot(slot),
                        right.line
                    ),
                    left.line,
                )?;
            }
        }
        for field in from_a.iter().skip(from_b.len()) {
            mirrors.push((b.to_string(), mirror_union(a, field)));
        }
        for field in from_b.iter().skip(from_a.len()) {
            mirrors.push((a.to_string(), mirror_union(b, field)));
        }
    }

    log::debug!("inferred {} reciprocal union(s)", mirrors.len());
    for (owner, field) in mirrors {
        if let Some(record) = session.records.get_mut(&owner) {
            record.fields.push(UNION_KEY, field);
        }
    }
    Ok(())
}

fn mirror_union(declarer: &str, field: &Field) -> Field {
    let mut parsed: Vec<String> = std::iter::once(declarer.to_string())
        .chain(UNION_METADATA_SLOTS.map(|i| field.slot(i).to_string()))
        .collect();
    while parsed.len() > 1 && parsed.last().is_some_and(String::is_empty) {
        parsed.pop();
    }
    Field::implicit(parsed, field.line)
}

/// Append every child that names a parent but is missing from that parent's `CHILD`
/// list. Missing children are ordered by birth year, ties by id.
pub fn reconcile_children(records: &mut RecordMap) {
    // parent id -> (child id, line of the child's PARENT field), in child id order
    let mut declared: BTreeMap<String, Vec<(String, usize)>> = BTreeMap::new();
    for (child, record) in records.iter() {
        let mut seen = BTreeSet::new();
        for field in record.fields(PARENT_KEY) {
            let parent = field.slot(0);
            if parent.is_empty() || is_placeholder(parent) || !seen.insert(parent) {
                continue;
            }
            declared
                .entry(parent.to_string())
                .or_default()
                .push((child.clone(), field.line));
        }
    }

    let mut added = 0;
    for (parent, children) in declared {
        let Some(record) = records.get(&parent) else {
            continue;
        };
        if is_placeholder(&parent) {
            continue;
        }
        let mut missing: Vec<(u32, String, usize)> = children
            .into_iter()
            .filter(|(child, _)| !record.references(CHILD_KEY, child))
            .map(|(child, line)| {
                let year = records
                    .get(&child)
                    .and_then(|c| c.fields(BORN_KEY).first())
                    .map(|born| leading_year(born.slot(0)))
                    .unwrap_or(UNKNOWN_YEAR);
                (year, child, line)
            })
            .collect();
        missing.sort_by_key(|(year, _, _)| *year);

        if let Some(record) = records.get_mut(&parent) {
            for (_, child, line) in missing {
                log::trace!("implicit child '{}' added to '{}'", child, parent);
                record.fields.push(CHILD_KEY, Field::implicit(vec![child], line));
                added += 1;
            }
        }
    }
    log::debug!("reconciled {} implicit child reference(s)", added);
}

/// Rewrite place slots to their display form and hoist markers into metadata.
pub fn extract_places(records: &mut RecordMap) {
    for record in records.values_mut() {
        for (key, fields) in record.fields.iter_mut() {
            let places = field_spec(key).places;
            if places.is_empty() {
                continue;
            }
            for field in fields.iter_mut() {
                for &slot in places {
                    let Some(value) = field.parsed.get_mut(slot) else {
                        continue;
                    };
                    let parts = extract_place(value);
                    *value = parts.display.clone();
                    if parts.has_metadata() {
                        let metadata = field.metadata.get_or_insert_with(FieldMetadata::default);
                        if parts.geo.is_some() {
                            metadata.geo = parts.geo;
                        }
                        if parts.coords.is_some() {
                            metadata.coords = parts.coords;
                        }
                    }
                }
            }
        }
    }
}
