//! End-to-end parse scenarios: inference, integrity failures, normalization

use ftt::ftt::testing::{assert_graph, TextMatch};
use ftt::{parse, parse_with, DiagnosticCode, DuplicatePolicy, ParserConfig, Tier};
use rstest::rstest;

const HEAD: &str = "HEAD_FORMAT: FTT v0.1\n\n";

fn doc(body: &str) -> String {
    format!("{HEAD}{body}")
}

#[test]
fn test_one_sided_union_is_inferred() {
    let result = parse(&doc("ID: A\nUNION: B | MARR | 1850\n\nID: B\nNAME: Bee\n"));
    assert_graph(&result)
        .is_valid()
        .warning_codes(&[])
        .record("B", |b| {
            b.field_count("UNION", 1).field("UNION", 0, |union| {
                union.is_implicit().parsed(&["A", "MARR", "1850"]);
            });
        })
        .record("A", |a| {
            a.field("UNION", 0, |union| {
                union.is_authored();
            });
        });
}

#[test]
fn test_reciprocal_union_mismatch_is_a_warning() {
    let result = parse(&doc(
        "ID: A\nUNION: B | MARR | 1850\n\nID: B\nUNION: A | MARR | 1851\n",
    ));
    assert_graph(&result)
        .is_valid()
        .warning_codes(&[DiagnosticCode::UnionMismatch])
        .record("B", |b| {
            b.field_count("UNION", 1);
        });
    assert!(result.warnings[0].message.contains("slot 2"));
}

#[test]
fn test_ghost_child_aborts() {
    let result = parse(&doc("ID: A\nCHILD: C\n\nID: C\nNAME: Orphan\n"));
    assert_graph(&result)
        .aborted_with(DiagnosticCode::GhostChild)
        .fatal_line(4)
        .header("HEAD_FORMAT", "FTT v0.1");
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_lineage_cycle_names_the_path() {
    let result = parse(&doc("ID: A\nPARENT: B\n\nID: B\nPARENT: A\n"));
    assert_graph(&result)
        .aborted_with(DiagnosticCode::LineageCycle)
        .fatal_message("Lineage cycle detected: A -> B -> A");
}

#[test]
fn test_placeholder_parents_end_lineage() {
    let result = parse(&doc(
        "ID: A\nPARENT: ?\nPARENT: ?MOTHER\n\nID: B\nPARENT: A | BIO\n",
    ));
    assert_graph(&result)
        .is_valid()
        .record("A", |a| {
            a.targets("CHILD", &["B"]);
        });
}

#[test]
fn test_coordinates_are_hoisted() {
    let result = parse(&doc("ID: A\nBORN: 1850 | London <51.5, -0.1>\n"));
    assert_graph(&result).is_valid().record("A", |a| {
        a.field("BORN", 0, |born| {
            born.slot(1, "London").coords(Some("51.5, -0.1")).geo(None);
        });
    });
}

#[test]
fn test_non_grammar_date_aborts() {
    let result = parse(&doc("ID: A\nBORN: May 12, 1980\n"));
    assert_graph(&result)
        .aborted_with(DiagnosticCode::InvalidDate)
        .fatal_message(TextMatch::Contains("May 12, 1980".to_string()));
    assert_eq!(result.fatal[0].tier, Tier::Fatal);
}

#[test]
fn test_escaped_delimiter_stays_in_one_slot() {
    let result = parse(&doc("ID: A\nNAME: Smith \\| Jones | Mary\nUNION: ? | | 1850\n"));
    assert_graph(&result).is_valid().record("A", |a| {
        a.field("NAME", 0, |name| {
            name.parsed(&["Smith | Jones", "Mary"]);
        })
        .field("UNION", 0, |union| {
            union.parsed(&["?", "", "1850"]);
        });
    });
}

#[test]
fn test_escaped_backslash_before_delimiter() {
    let result = parse(&doc(
        "ID: A\nNAME: Back\\\\ | Slash\nBORN: 1850 | Dock\\\\ \\<east\\> <1, 2>\n",
    ));
    assert_graph(&result).is_valid().record("A", |a| {
        a.field("NAME", 0, |name| {
            name.parsed(&["Back\\", "Slash"]);
        })
        .field("BORN", 0, |born| {
            born.slot(1, "Dock\\ <east>").coords(Some("1, 2"));
        });
    });
}

#[test]
fn test_escaped_closers_inside_place_markers() {
    let result = parse(&doc("ID: A\nBORN: 1850 | Town {=A \\} B} <1, 2>\n"));
    assert_graph(&result).is_valid().record("A", |a| {
        a.field("BORN", 0, |born| {
            born.slot(1, "Town").geo(Some("A } B")).coords(Some("1, 2"));
        });
    });
}

#[test]
fn test_header_after_separator_is_accepted() {
    let result = parse(&doc("ID: A\nNAME: Ada\n---\nHEAD_LATE: appended\n"));
    assert_graph(&result)
        .is_valid()
        .header("HEAD_LATE", "appended")
        .record_count(1);
}

#[test]
fn test_composition_forms_resolve_to_one_record() {
    let result = parse(&doc(
        "ID: Jose\u{301}-1\n\nID: CHILD-1\nPARENT: Jos\u{e9}-1 | BIO\n",
    ));
    assert_graph(&result)
        .is_valid()
        .record_count(2)
        .record("Jos\u{e9}-1", |jose| {
            jose.targets("CHILD", &["CHILD-1"]);
        });
}

#[rstest]
#[case("", DiagnosticCode::MissingHeader)]
#[case("HEAD_FORMAT: FTT\n", DiagnosticCode::InvalidVersion)]
#[case("HEAD_FORMAT: FTT v0.2\n", DiagnosticCode::UnsupportedVersion)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nHEAD_LATE: x\n", DiagnosticCode::HeaderInRecord)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nBORN: 1850\nDIED_SRC: ^S\n", DiagnosticCode::ModifierMismatch)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nSRC: ^MISSING\n", DiagnosticCode::MissingSource)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nASSOC: B | FRND\n", DiagnosticCode::UnresolvedReference)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nUNION: ? | ELOPED\n", DiagnosticCode::InvalidVocabulary)]
#[case("HEAD_FORMAT: FTT v0.1\nID: A\nBORN: 1850-02-30\n", DiagnosticCode::InvalidDate)]
#[case("HEAD_FORMAT: FTT v0.1\n---\n  indented\n", DiagnosticCode::OrphanIndentation)]
#[case("HEAD_FORMAT: FTT v0.1\n---\n   \nID: A\n", DiagnosticCode::OrphanIndentation)]
#[case("HEAD_FORMAT: FTT v0.1\nid: a\n", DiagnosticCode::InvalidSyntax)]
fn test_fatal_inputs(#[case] source: &str, #[case] code: DiagnosticCode) {
    assert_graph(&parse(source)).aborted_with(code);
}

#[test]
fn test_newer_version_accepted_when_configured() {
    let config = ParserConfig {
        supported_version: "0.2".parse().unwrap(),
        ..ParserConfig::default()
    };
    let result = parse_with("HEAD_FORMAT: FTT v0.2\nID: A\n", &config);
    assert_graph(&result).is_valid().record_count(1);
}

#[test]
fn test_lenient_duplicates() {
    let config = ParserConfig {
        duplicate_ids: DuplicatePolicy::Lenient,
        ..ParserConfig::default()
    };
    let result = parse_with(
        &doc("ID: A\nNAME: First\n\nID: A\nNAME: Second\n"),
        &config,
    );
    assert_graph(&result)
        .is_valid()
        .error_codes(&[DiagnosticCode::DuplicateIdIgnored])
        .record("A", |a| {
            a.field_count("NAME", 1).field("NAME", 0, |name| {
                name.raw("First");
            });
        });

    assert_graph(&parse(&doc("ID: A\n\nID: A\n"))).aborted_with(DiagnosticCode::DuplicateId);
}

#[test]
fn test_recoverable_diagnostics_accumulate() {
    let result = parse(&doc("ID: A\nSEX: Q\nSEX: MALE\nASSOC: ? | NEIGHBOUR\n"));
    assert_graph(&result)
        .is_valid()
        .error_codes(&[DiagnosticCode::UnknownVocabulary, DiagnosticCode::UnknownVocabulary])
        .warning_codes(&[DiagnosticCode::NonstandardVocabulary]);
}

#[test]
fn test_line_endings_and_bom() {
    let result = parse("\u{feff}HEAD_FORMAT: FTT v0.1\r\n\r\nID: A\r\nNOTE: one\r\n  two\rNAME: x\r\n");
    assert_graph(&result)
        .is_valid()
        .header("HEAD_FORMAT", "FTT v0.1")
        .record("A", |a| {
            a.defined_on(3)
                .field("NOTE", 0, |note| {
                    note.raw("one two");
                })
                .field("NAME", 0, |name| {
                    name.raw("x").parsed(&["x"]);
                });
        });
}

#[test]
fn test_comments_are_ignored_inside_blocks() {
    let result = parse(&doc("ID: A\n# aside\nNOTE: one\n# aside\n  two\n"));
    assert_graph(&result).is_valid().record("A", |a| {
        a.field("NOTE", 0, |note| {
            note.raw("one two");
        });
    });
}

#[test]
fn test_fatal_result_serializes_without_records() {
    let result = parse(&doc("ID: A\nPARENT: A\n"));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["records"], serde_json::json!({}));
    assert_eq!(json["fatal"][0]["code"], "ERR_LINEAGE_CYCLE");
    assert_eq!(json["fatal"][0]["tier"], "fatal");
    assert_eq!(json["headers"]["HEAD_FORMAT"], "FTT v0.1");
}
