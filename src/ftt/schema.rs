//! Field-key schema
//!
//!     Slot positions mean different things per field key. This table is the one place
//!     that says which slots are references, dates, places or controlled codes; the
//!     post-processor and the validator both read it instead of hard-coding positions.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const HEADER_PREFIX: &str = "HEAD_";
pub const IDENTITY_KEY: &str = "ID";
pub const FORMAT_HEADER: &str = "HEAD_FORMAT";

pub const PARENT_KEY: &str = "PARENT";
pub const CHILD_KEY: &str = "CHILD";
pub const UNION_KEY: &str = "UNION";
pub const BORN_KEY: &str = "BORN";

/// Union slots compared for reciprocity: type, start, end, reason.
pub const UNION_METADATA_SLOTS: std::ops::RangeInclusive<usize> = 1..=4;

/// Modifier suffixes and their kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Citation,
    Annotation,
}

impl ModifierKind {
    pub const SUFFIXES: [(&'static str, ModifierKind); 2] = [
        ("_SRC", ModifierKind::Citation),
        ("_NOTE", ModifierKind::Annotation),
    ];

    /// Split `BORN_SRC` into (`BORN`, Citation). `None` for ordinary keys.
    pub fn split_key(key: &str) -> Option<(&str, ModifierKind)> {
        Self::SUFFIXES.iter().find_map(|(suffix, kind)| {
            key.strip_suffix(suffix)
                .filter(|base| !base.is_empty())
                .map(|base| (base, *kind))
        })
    }
}

/// What a reference slot points at, which decides the diagnostic on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Record,
    Citation,
}

/// A closed code set with tolerated legacy spellings.
#[derive(Debug)]
pub struct Vocabulary {
    pub name: &'static str,
    pub standard: &'static [&'static str],
    /// Nonstandard spelling and the standard code it stands for.
    pub aliases: &'static [(&'static str, &'static str)],
    /// Unknown codes are fatal when strict, recoverable otherwise.
    pub strict: bool,
}

/// Result of looking a code up in a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Standard,
    Nonstandard { preferred: &'static str },
    Unknown,
}

impl Vocabulary {
    pub fn check(&self, code: &str) -> CodeCheck {
        if self.standard.contains(&code) {
            return CodeCheck::Standard;
        }
        match self.aliases.iter().find(|(alias, _)| *alias == code) {
            Some((_, preferred)) => CodeCheck::Nonstandard {
                preferred: *preferred,
            },
            None => CodeCheck::Unknown,
        }
    }
}

pub const PARENT_TYPES: Vocabulary = Vocabulary {
    name: "parent type",
    standard: &["BIO", "ADO", "STE", "FOS", "SUR", "UNK"],
    aliases: &[
        ("BIRTH", "BIO"),
        ("ADOPTED", "ADO"),
        ("STEP", "STE"),
        ("FOSTER", "FOS"),
    ],
    strict: true,
};

pub const UNION_TYPES: Vocabulary = Vocabulary {
    name: "union type",
    standard: &["MARR", "CIVL", "PART", "UNK"],
    aliases: &[("MARRIAGE", "MARR"), ("CIVIL", "CIVL"), ("PARTNER", "PART")],
    strict: true,
};

pub const UNION_END_REASONS: Vocabulary = Vocabulary {
    name: "union end reason",
    standard: &["DIV", "WID", "SEP", "ANN", "UNK"],
    aliases: &[("DIVORCE", "DIV"), ("WIDOWED", "WID"), ("SEPARATED", "SEP")],
    strict: false,
};

pub const ASSOCIATION_ROLES: Vocabulary = Vocabulary {
    name: "association role",
    standard: &["GODP", "WITN", "GUAR", "FRND", "NEIG", "EMPL"],
    aliases: &[
        ("GODPARENT", "GODP"),
        ("WITNESS", "WITN"),
        ("GUARDIAN", "GUAR"),
        ("FRIEND", "FRND"),
    ],
    strict: false,
};

pub const EVENT_ROLES: Vocabulary = Vocabulary {
    name: "event role",
    standard: &["PRIN", "WITN", "OFFI", "ATTN"],
    aliases: &[
        ("PRINCIPAL", "PRIN"),
        ("WITNESS", "WITN"),
        ("OFFICIANT", "OFFI"),
    ],
    strict: false,
};

pub const SEX_CODES: Vocabulary = Vocabulary {
    name: "sex",
    standard: &["M", "F", "U", "X"],
    aliases: &[("MALE", "M"), ("FEMALE", "F"), ("UNKNOWN", "U")],
    strict: false,
};

/// Slot conventions of one field key.
#[derive(Debug, Default)]
pub struct FieldSpec {
    pub references: &'static [(usize, ReferenceKind)],
    pub dates: &'static [usize],
    pub places: &'static [usize],
    pub vocabularies: &'static [(usize, &'static Vocabulary)],
}

const RECORD_REF: &[(usize, ReferenceKind)] = &[(0, ReferenceKind::Record)];
const CITATION_REF: &[(usize, ReferenceKind)] = &[(0, ReferenceKind::Citation)];

static FIELD_SPECS: Lazy<HashMap<&'static str, FieldSpec>> = Lazy::new(|| {
    let vital = || FieldSpec {
        dates: &[0],
        places: &[1],
        ..FieldSpec::default()
    };
    HashMap::from([
        (
            PARENT_KEY,
            FieldSpec {
                references: RECORD_REF,
                vocabularies: &[(1, &PARENT_TYPES)],
                ..FieldSpec::default()
            },
        ),
        (
            CHILD_KEY,
            FieldSpec {
                references: RECORD_REF,
                ..FieldSpec::default()
            },
        ),
        (
            UNION_KEY,
            FieldSpec {
                references: RECORD_REF,
                dates: &[2, 3],
                vocabularies: &[(1, &UNION_TYPES), (4, &UNION_END_REASONS)],
                ..FieldSpec::default()
            },
        ),
        (
            "ASSOC",
            FieldSpec {
                references: RECORD_REF,
                vocabularies: &[(1, &ASSOCIATION_ROLES)],
                ..FieldSpec::default()
            },
        ),
        (
            "EVENT",
            FieldSpec {
                references: RECORD_REF,
                vocabularies: &[(1, &EVENT_ROLES)],
                ..FieldSpec::default()
            },
        ),
        (
            "SRC",
            FieldSpec {
                references: CITATION_REF,
                ..FieldSpec::default()
            },
        ),
        (BORN_KEY, vital()),
        ("DIED", vital()),
        ("BURIED", vital()),
        (
            "DATE",
            FieldSpec {
                dates: &[0],
                ..FieldSpec::default()
            },
        ),
        (
            "PLACE",
            FieldSpec {
                places: &[0],
                ..FieldSpec::default()
            },
        ),
        (
            "SEX",
            FieldSpec {
                vocabularies: &[(0, &SEX_CODES)],
                ..FieldSpec::default()
            },
        ),
    ])
});

static NO_SPEC: FieldSpec = FieldSpec {
    references: &[],
    dates: &[],
    places: &[],
    vocabularies: &[],
};

static CITATION_SPEC: FieldSpec = FieldSpec {
    references: CITATION_REF,
    dates: &[],
    places: &[],
    vocabularies: &[],
};

/// Slot conventions for a field key. Unknown keys carry no semantics.
pub fn field_spec(key: &str) -> &'static FieldSpec {
    FIELD_SPECS.get(key).unwrap_or(&NO_SPEC)
}

/// Slot conventions for a modifier key such as `BORN_SRC`.
pub fn modifier_spec(key: &str) -> &'static FieldSpec {
    match ModifierKind::split_key(key) {
        Some((_, ModifierKind::Citation)) => &CITATION_SPEC,
        _ => &NO_SPEC,
    }
}

pub fn is_header_key(key: &str) -> bool {
    key.starts_with(HEADER_PREFIX)
}
