//! Graph validation
//!
//!     Runs over the assembled graph once line processing finished without a fatal
//!     diagnostic. Checks run in a fixed order and the first fatal one ends the session:
//!
//!         1. format header and version
//!         2. dangling references (fields and modifiers)
//!         3. ghost children
//!         4. lineage cycles
//!         5. controlled vocabularies
//!         6. date grammar
//!
//!     Every check walks records in id order so diagnostics are deterministic.

use crate::ftt::ast::{is_placeholder, Field, RecordMap, RecordType};
use crate::ftt::config::{FormatVersion, ParserConfig};
use crate::ftt::dates::parse_date;
use crate::ftt::diagnostics::DiagnosticCode;
use crate::ftt::schema::{
    field_spec, modifier_spec, CodeCheck, ReferenceKind, CHILD_KEY, FORMAT_HEADER, PARENT_KEY,
};
use crate::ftt::session::{Abort, Session};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static VERSION_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bv(\d+)\.(\d+)\b").expect("version pattern is valid"));

/// Run every check in order.
pub fn validate(mut session: Session, config: &ParserConfig) -> Result<Session, Abort> {
    check_version(&mut session, config.supported_version)?;
    check_references(&mut session)?;
    check_ghost_children(&mut session)?;
    check_lineage(&mut session)?;
    check_vocabularies(&mut session)?;
    check_dates(&mut session)?;
    log::debug!("graph validated: {} record(s)", session.records.len());
    Ok(session)
}

/// Extract `MAJOR.MINOR` from a `vMAJOR.MINOR` token.
pub fn declared_version(value: &str) -> Option<FormatVersion> {
    let captures = VERSION_TOKEN.captures(value)?;
    Some(FormatVersion {
        major: captures[1].parse().ok()?,
        minor: captures[2].parse().ok()?,
    })
}

fn check_version(session: &mut Session, supported: FormatVersion) -> Result<(), Abort> {
    let Some(value) = session.headers.get(FORMAT_HEADER).cloned() else {
        return session.report(
            DiagnosticCode::MissingHeader,
            format!("Required header '{FORMAT_HEADER}' is missing"),
            1,
        );
    };
    let line = session.header_lines.get(FORMAT_HEADER).copied().unwrap_or(1);

    match declared_version(&value) {
        None => session.report(
            DiagnosticCode::InvalidVersion,
            format!("'{FORMAT_HEADER}' must declare a version like 'v{supported}', found '{value}'"),
            line,
        ),
        Some(version) if version > supported => session.report(
            DiagnosticCode::UnsupportedVersion,
            format!("Format version {version} is newer than the supported {supported}"),
            line,
        ),
        Some(_) => Ok(()),
    }
}

/// A reference slot that does not resolve.
struct Dangling {
    kind: ReferenceKind,
    owner: String,
    key: String,
    target: String,
    line: usize,
}

fn check_references(session: &mut Session) -> Result<(), Abort> {
    let mut dangling = None;
    'records: for (id, record) in &session.records {
        for (key, fields) in record.fields.iter() {
            for field in fields {
                let modifiers = field.modifiers.iter().flat_map(|(modifier_key, list)| {
                    let references = modifier_spec(modifier_key).references;
                    list.iter().flat_map(move |modifier| {
                        references.iter().map(move |(slot, kind)| {
                            (modifier_key.as_str(), *kind, modifier.slot(*slot), modifier.line)
                        })
                    })
                });
                let slots = field_spec(key)
                    .references
                    .iter()
                    .map(|(slot, kind)| (key, *kind, field.slot(*slot), field.line))
                    .chain(modifiers);

                for (key, kind, target, line) in slots {
                    if resolves(&session.records, target) {
                        continue;
                    }
                    dangling = Some(Dangling {
                        kind,
                        owner: id.clone(),
                        key: key.to_string(),
                        target: target.to_string(),
                        line,
                    });
                    break 'records;
                }
            }
        }
    }

    match dangling {
        None => Ok(()),
        Some(Dangling {
            kind: ReferenceKind::Citation,
            owner,
            key,
            target,
            line,
        }) => session.report(
            DiagnosticCode::MissingSource,
            format!("'{owner}' cites missing source '{target}' in {key}"),
            line,
        ),
        Some(Dangling {
            kind: ReferenceKind::Record,
            owner,
            key,
            target,
            line,
        }) => session.report(
            DiagnosticCode::UnresolvedReference,
            format!("'{owner}' references unknown record '{target}' in {key}"),
            line,
        ),
    }
}

fn resolves(records: &RecordMap, target: &str) -> bool {
    target.is_empty() || is_placeholder(target) || records.contains_key(target)
}

fn check_ghost_children(session: &mut Session) -> Result<(), Abort> {
    let ghost = session.records.iter().find_map(|(parent, record)| {
        record
            .fields(CHILD_KEY)
            .iter()
            .filter(|field| !field.is_implicit)
            .find_map(|field| {
                let child = field.slot(0);
                if child.is_empty() || is_placeholder(child) {
                    return None;
                }
                let reciprocated = session
                    .records
                    .get(child)
                    .is_some_and(|c| c.references(PARENT_KEY, parent));
                (!reciprocated).then(|| (parent.clone(), child.to_string(), field.line))
            })
    });

    match ghost {
        Some((parent, child, line)) => session.report(
            DiagnosticCode::GhostChild,
            format!("'{parent}' lists child '{child}', but '{child}' does not list '{parent}' as a parent"),
            line,
        ),
        None => Ok(()),
    }
}

/// Parent edges of an individual, with the line of each `PARENT` field.
fn parent_edges<'a>(records: &'a RecordMap, id: &str) -> Vec<(&'a str, usize)> {
    records
        .get(id)
        .map(|record| {
            record
                .fields(PARENT_KEY)
                .iter()
                .map(|field| (field.slot(0), field.line))
                .filter(|(target, _)| is_lineage_node(records, target))
                .collect()
        })
        .unwrap_or_default()
}

fn is_lineage_node(records: &RecordMap, id: &str) -> bool {
    records
        .get(id)
        .is_some_and(|record| record.record_type == RecordType::Individual)
}

/// Iterative depth-first search over parent edges. Nodes proven acyclic are remembered
/// so later roots stop at them.
pub fn find_cycle(records: &RecordMap) -> Option<(Vec<String>, usize)> {
    let mut safe: HashSet<&str> = HashSet::new();

    for (root, record) in records {
        if record.record_type != RecordType::Individual || safe.contains(root.as_str()) {
            continue;
        }

        // (node, its edges, next edge to follow)
        let mut stack: Vec<(&str, Vec<(&str, usize)>, usize)> =
            vec![(root.as_str(), parent_edges(records, root), 0)];
        let mut on_path: HashSet<&str> = HashSet::from([root.as_str()]);

        while let Some((node, edges, next)) = stack.last_mut() {
            let Some(&(target, line)) = edges.get(*next) else {
                let node = *node;
                on_path.remove(node);
                safe.insert(node);
                stack.pop();
                continue;
            };
            *next += 1;

            if on_path.contains(target) {
                let start = stack.iter().position(|(n, _, _)| *n == target).unwrap_or(0);
                let mut path: Vec<String> =
                    stack[start..].iter().map(|(n, _, _)| n.to_string()).collect();
                path.push(target.to_string());
                return Some((path, line));
            }
            if safe.contains(target) {
                continue;
            }
            on_path.insert(target);
            stack.push((target, parent_edges(records, target), 0));
        }
    }
    None
}

fn check_lineage(session: &mut Session) -> Result<(), Abort> {
    match find_cycle(&session.records) {
        Some((path, line)) => session.report(
            DiagnosticCode::LineageCycle,
            format!("Lineage cycle detected: {}", path.join(" -> ")),
            line,
        ),
        None => Ok(()),
    }
}

fn authored_fields(session: &Session) -> impl Iterator<Item = (&str, &str, &Field)> {
    session.records.iter().flat_map(|(id, record)| {
        record.fields.iter().flat_map(move |(key, fields)| {
            fields
                .iter()
                .filter(|field| !field.is_implicit)
                .map(move |field| (id.as_str(), key, field))
        })
    })
}

fn check_vocabularies(session: &mut Session) -> Result<(), Abort> {
    let mut findings = Vec::new();
    for (id, key, field) in authored_fields(session) {
        for (slot, vocabulary) in field_spec(key).vocabularies {
            let code = field.slot(*slot);
            if code.is_empty() {
                continue;
            }
            let finding = match vocabulary.check(code) {
                CodeCheck::Standard => continue,
                CodeCheck::Nonstandard { preferred } => (
                    DiagnosticCode::NonstandardVocabulary,
                    format!(
                        "'{id}' uses nonstandard {} '{code}' in {key}; prefer '{preferred}'",
                        vocabulary.name
                    ),
                ),
                CodeCheck::Unknown if vocabulary.strict => (
                    DiagnosticCode::InvalidVocabulary,
                    format!("'{id}' uses invalid {} '{code}' in {key}", vocabulary.name),
                ),
                CodeCheck::Unknown => (
                    DiagnosticCode::UnknownVocabulary,
                    format!("'{id}' uses unknown {} '{code}' in {key}", vocabulary.name),
                ),
            };
            findings.push((finding.0, finding.1, field.line));
        }
    }

    for (code, message, line) in findings {
        session.report(code, message, line)?;
    }
    Ok(())
}

fn check_dates(session: &mut Session) -> Result<(), Abort> {
    let invalid = authored_fields(session).find_map(|(id, key, field)| {
        field_spec(key).dates.iter().find_map(|&slot| {
            let text = field.slot(slot);
            if text.is_empty() {
                return None;
            }
            parse_date(text)
                .err()
                .map(|err| (format!("'{id}' has {err} in {key}"), field.line))
        })
    });

    match invalid {
        Some((message, line)) => session.report(DiagnosticCode::InvalidDate, message, line),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ftt::ast::Record;
    use crate::ftt::diagnostics::Tier;
    use rstest::rstest;

    fn graph(records: &[(&str, &[(&str, &[&str])])]) -> Session {
        let mut session = Session::new();
        session
            .headers
            .insert(FORMAT_HEADER.to_string(), "FTT v0.1".to_string());
        for (id, fields) in records {
            let mut record = Record::new(*id, 1);
            for (key, slots) in fields.iter() {
                let parsed: Vec<String> = slots.iter().map(|s| s.to_string()).collect();
                record
                    .fields
                    .push(key, Field::new(parsed.join(" | "), parsed, 2));
            }
            session.records.insert(id.to_string(), record);
        }
        session
    }

    fn run(session: Session) -> Result<Session, Abort> {
        validate(session, &ParserConfig::default())
    }

    fn fatal_code(session: Session) -> DiagnosticCode {
        run(session).unwrap_err().diagnostic.code
    }

    #[rstest]
    #[case("FTT v0.1", None)]
    #[case("FTT v0.0", None)]
    #[case("FTT v0.2", Some(DiagnosticCode::UnsupportedVersion))]
    #[case("FTT v1.0", Some(DiagnosticCode::UnsupportedVersion))]
    #[case("FTT 0.1", Some(DiagnosticCode::InvalidVersion))]
    fn test_version_header(#[case] value: &str, #[case] expected: Option<DiagnosticCode>) {
        let mut session = graph(&[]);
        session
            .headers
            .insert(FORMAT_HEADER.to_string(), value.to_string());
        assert_eq!(run(session).err().map(|a| a.diagnostic.code), expected);
    }

    #[test]
    fn test_missing_header() {
        let mut session = graph(&[]);
        session.headers.clear();
        assert_eq!(fatal_code(session), DiagnosticCode::MissingHeader);
    }

    #[test]
    fn test_placeholders_always_resolve() {
        let session = graph(&[("A", &[("PARENT", &["?", "BIO"]), ("PARENT", &["?FATHER", "BIO"])])]);
        assert!(run(session).is_ok());
    }

    #[test]
    fn test_unresolved_reference() {
        let session = graph(&[("A", &[("ASSOC", &["NOBODY", "FRND"])])]);
        let abort = run(session).unwrap_err();
        assert_eq!(abort.diagnostic.code, DiagnosticCode::UnresolvedReference);
        assert!(abort.diagnostic.message.contains("NOBODY"));
    }

    #[test]
    fn test_missing_source_from_modifier() {
        let mut session = graph(&[("A", &[("BORN", &["1850"])])]);
        let born = &mut session.records.get_mut("A").unwrap().fields.get_mut("BORN").unwrap()[0];
        born.modifiers.insert(
            "BORN_SRC".to_string(),
            vec![crate::ftt::ast::Modifier {
                raw: "^GONE".to_string(),
                parsed: vec!["^GONE".to_string()],
                line: 3,
            }],
        );
        let abort = run(session).unwrap_err();
        assert_eq!(abort.diagnostic.code, DiagnosticCode::MissingSource);
        assert_eq!(abort.diagnostic.line, 3);
    }

    #[test]
    fn test_ghost_child() {
        let session = graph(&[("A", &[("CHILD", &["C"])]), ("C", &[])]);
        assert_eq!(fatal_code(session), DiagnosticCode::GhostChild);
    }

    #[test]
    fn test_cycle_path() {
        let session = graph(&[("A", &[("PARENT", &["B"])]), ("B", &[("PARENT", &["A"])])]);
        let abort = run(session).unwrap_err();
        assert_eq!(abort.diagnostic.code, DiagnosticCode::LineageCycle);
        assert_eq!(abort.diagnostic.message, "Lineage cycle detected: A -> B -> A");
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let session = graph(&[("A", &[("PARENT", &["A"])])]);
        let (path, _) = find_cycle(&session.records).unwrap();
        assert_eq!(path, vec!["A", "A"]);
    }

    #[test]
    fn test_shared_ancestors_are_not_cycles() {
        let session = graph(&[
            ("A", &[("PARENT", &["B"]), ("PARENT", &["C"])]),
            ("B", &[("PARENT", &["D"])]),
            ("C", &[("PARENT", &["D"])]),
            ("D", &[]),
        ]);
        assert!(find_cycle(&session.records).is_none());
    }

    #[test]
    fn test_long_cycle_found_from_first_root() {
        let session = graph(&[
            ("A", &[("PARENT", &["B"])]),
            ("B", &[("PARENT", &["C"])]),
            ("C", &[("PARENT", &["D"])]),
            ("D", &[("PARENT", &["B"])]),
        ]);
        let (path, _) = find_cycle(&session.records).unwrap();
        assert_eq!(path, vec!["B", "C", "D", "B"]);
    }

    #[rstest]
    #[case("PARENT", &["P", "COUSIN"], Some(Tier::Fatal))]
    #[case("PARENT", &["P", "ADOPTED"], Some(Tier::Warning))]
    #[case("PARENT", &["P", "BIO"], None)]
    #[case("SEX", &["Q"], Some(Tier::Error))]
    #[case("UNION", &["P", "MARR", "", "", "ELOPED"], Some(Tier::Error))]
    fn test_vocabulary_tiers(
        #[case] key: &str,
        #[case] slots: &[&str],
        #[case] expected: Option<Tier>,
    ) {
        let mut session = graph(&[("A", &[(key, slots)]), ("P", &[("UNION", &["A", "MARR"])])]);
        if key == "PARENT" {
            session
                .records
                .get_mut("P")
                .unwrap()
                .fields
                .push("CHILD", Field::new("A".into(), vec!["A".into()], 3));
        }
        let tier = match run(session) {
            Err(abort) => Some(abort.diagnostic.tier),
            Ok(session) => session
                .reporter
                .errors()
                .first()
                .or(session.reporter.warnings().first())
                .map(|d| d.tier),
        };
        assert_eq!(tier, expected);
    }

    #[test]
    fn test_bad_date_is_fatal() {
        let session = graph(&[("A", &[("BORN", &["May 12, 1980", "Boston"])])]);
        let abort = run(session).unwrap_err();
        assert_eq!(abort.diagnostic.code, DiagnosticCode::InvalidDate);
        assert!(abort.diagnostic.message.contains("May 12, 1980"));
    }

    #[test]
    fn test_implicit_fields_skip_date_checks() {
        let mut session = graph(&[("A", &[])]);
        session
            .records
            .get_mut("A")
            .unwrap()
            .fields
            .push("DATE", Field::implicit(vec!["garbage".into()], 2));
        assert!(run(session).is_ok());
    }
}
