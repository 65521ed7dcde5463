//! Full parses of the sample documents under `tests/fixtures`

use ftt::ftt::testing::{assert_graph, TextMatch};
use ftt::{DiagnosticCode, DocumentLoader, ParseResult, RecordType};
use std::path::PathBuf;

fn load(name: &str) -> ParseResult {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    DocumentLoader::from_path(path)
        .expect("fixture to be readable")
        .parse()
}

#[test]
fn test_smith_family_headers_and_records() {
    let result = load("smith-family.ftt");
    assert_graph(&result)
        .is_valid()
        .header("HEAD_FORMAT", "FTT v0.1")
        .header("HEAD_TITLE", "The Smith Family")
        .record_count(7)
        .error_codes(&[])
        .warning_codes(&[DiagnosticCode::NonstandardVocabulary])
        .record("^CENSUS-1860", |source| {
            source
                .record_type(RecordType::Source)
                .field("URL", 0, |url| {
                    url.parsed(&["https://example.org/census|1860"]);
                });
        })
        .record("&EMIGRATION", |event| {
            event
                .record_type(RecordType::Event)
                .field("PLACE", 0, |place| {
                    place.slot(0, "Liverpool <port>").coords(None);
                });
        });
}

#[test]
fn test_smith_family_fields() {
    let result = load("smith-family.ftt");
    assert_graph(&result).record("SMITH-1", |john| {
        john.defined_on(8)
            .field_keys(&["NAME", "SEX", "BORN", "UNION", "CHILD", "NOTE"])
            .field("BORN", 0, |born| {
                born.parsed(&["1850-06-14", "Boston, Massachusetts"])
                    .geo(Some("Boston, Suffolk, MA"))
                    .coords(Some("42.36, -71.06"))
                    .raw(TextMatch::Contains("<42.36, -71.06>".to_string()))
                    .modifier_targets("BORN_SRC", &["^CENSUS-1860"])
                    .modifier_targets("BORN_NOTE", &["Date from the family bible."]);
            })
            .field("NOTE", 0, |note| {
                note.raw("John worked the docks for most of his life.\nHe retired in 1915.");
            });
    });
}

#[test]
fn test_smith_family_children_are_reconciled() {
    let result = load("smith-family.ftt");
    assert_graph(&result)
        .record("SMITH-1", |john| {
            john.targets("CHILD", &["SMITH-3", "SMITH-4", "SMITH-5"])
                .field("CHILD", 0, |child| {
                    child.is_authored();
                })
                .field("CHILD", 1, |child| {
                    child.is_implicit();
                });
        })
        .record("JONES-2", |mary| {
            mary.targets("CHILD", &["SMITH-4", "SMITH-3"])
                .field_count("UNION", 1);
        });
}

#[test]
fn test_smith_family_summary() {
    let summary = load("smith-family.ftt").summary();
    assert_eq!(summary.individuals, 5);
    assert_eq!(summary.sources, 1);
    assert_eq!(summary.events, 1);
    assert_eq!(summary.implicit_fields, 4);
    assert_eq!(summary.warnings, 1);
}

#[test]
fn test_reciprocity_closure() {
    let result = load("smith-family.ftt");
    for (id, record) in &result.records {
        for union in record.fields("UNION") {
            let partner = &result.records[union.slot(0)];
            assert!(partner.references("UNION", id), "{id} -> {}", partner.id);
        }
        for child in record.fields("CHILD") {
            let child = &result.records[child.slot(0)];
            assert!(child.references("PARENT", id), "{id} -> {}", child.id);
        }
    }
}
