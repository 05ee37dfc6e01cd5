//! Descriptive metadata schema.
//!
//! A static table mapping each field name to its value kind, cardinality and
//! search-indexing hints. The table carries no behavior; [`crate::FileSet`]
//! consults it when assigning caller-supplied attributes, and index layers
//! may read the hints.

use serde::Serialize;

/// Value kind of a metadata field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Text,
    Date,
    Uri,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    Single,
    Multiple,
}

/// How a field should be indexed for search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum IndexHint {
    StoredSearchable,
    StoredSortable,
    Facetable,
    Symbol,
}

/// One schema entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    pub index: &'static [IndexHint],
}

impl FieldSpec {
    const fn multi(name: &'static str, index: &'static [IndexHint]) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
            cardinality: Cardinality::Multiple,
            index,
        }
    }

    pub fn is_multiple(&self) -> bool {
        self.cardinality == Cardinality::Multiple
    }
}

use self::IndexHint::{Facetable, StoredSearchable, StoredSortable, Symbol};

const SEARCHABLE: &[IndexHint] = &[StoredSearchable];
const SEARCHABLE_FACET: &[IndexHint] = &[StoredSearchable, Facetable];

/// The basic descriptive metadata carried by every file set.
pub const BASIC_METADATA: &[FieldSpec] = &[
    FieldSpec {
        name: "title",
        kind: FieldKind::Text,
        cardinality: Cardinality::Multiple,
        index: SEARCHABLE,
    },
    FieldSpec {
        name: "label",
        kind: FieldKind::Text,
        cardinality: Cardinality::Single,
        index: &[],
    },
    FieldSpec {
        name: "relative_path",
        kind: FieldKind::Text,
        cardinality: Cardinality::Single,
        index: &[],
    },
    FieldSpec {
        name: "import_url",
        kind: FieldKind::Uri,
        cardinality: Cardinality::Single,
        index: &[Symbol],
    },
    FieldSpec::multi("part_of", &[]),
    FieldSpec::multi("resource_type", SEARCHABLE_FACET),
    FieldSpec::multi("creator", SEARCHABLE_FACET),
    FieldSpec::multi("contributor", SEARCHABLE_FACET),
    FieldSpec::multi("description", SEARCHABLE),
    FieldSpec::multi("tag", SEARCHABLE_FACET),
    FieldSpec::multi("rights", SEARCHABLE),
    FieldSpec::multi("publisher", SEARCHABLE_FACET),
    FieldSpec::multi("date_created", SEARCHABLE),
    FieldSpec {
        name: "date_uploaded",
        kind: FieldKind::Date,
        cardinality: Cardinality::Single,
        index: &[StoredSortable],
    },
    FieldSpec {
        name: "date_modified",
        kind: FieldKind::Date,
        cardinality: Cardinality::Single,
        index: &[StoredSortable],
    },
    FieldSpec::multi("subject", SEARCHABLE_FACET),
    FieldSpec::multi("language", SEARCHABLE_FACET),
    FieldSpec::multi("identifier", SEARCHABLE),
    FieldSpec::multi("based_near", SEARCHABLE_FACET),
    FieldSpec {
        name: "related_url",
        kind: FieldKind::Uri,
        cardinality: Cardinality::Multiple,
        index: SEARCHABLE,
    },
    FieldSpec::multi("bibliographic_citation", SEARCHABLE),
    FieldSpec::multi("source", SEARCHABLE),
];

/// Look up a field by name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    BASIC_METADATA.iter().find(|spec| spec.name == name)
}

/// Fields carrying the given index hint, e.g. everything facetable.
pub fn fields_with_hint(hint: IndexHint) -> impl Iterator<Item = &'static FieldSpec> {
    BASIC_METADATA
        .iter()
        .filter(move |spec| spec.index.contains(&hint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn field_names_are_unique() {
        let names: HashSet<_> = BASIC_METADATA.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), BASIC_METADATA.len());
    }

    #[test]
    fn single_valued_fields() {
        for name in ["label", "relative_path", "import_url", "date_uploaded", "date_modified"] {
            assert!(!field(name).unwrap().is_multiple(), "{name} should be single");
        }
        assert!(field("creator").unwrap().is_multiple());
    }

    #[test]
    fn unknown_field_is_none() {
        assert!(field("shoe_size").is_none());
    }

    #[test]
    fn facetable_fields_include_creator_and_subject() {
        let facets: Vec<_> = fields_with_hint(IndexHint::Facetable).map(|f| f.name).collect();
        assert!(facets.contains(&"creator"));
        assert!(facets.contains(&"subject"));
        assert!(!facets.contains(&"description"));
    }
}
