// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access kinds and the catalog which gives them human-readable labels.
//!
//! The catalog is closed: it is fixed at compile time and never mutated. Data produced by a
//! newer catalog can still carry kinds we don't know about, these are kept as
//! [`AccessKind::Other`] and displayed with their raw identifier.
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single access right which can be granted to a role on a resource.
#[derive(Clone, Debug)]
pub enum AccessKind {
    /// Permission to read a resource.
    Read,

    /// Permission to read a resource with sensitive attributes masked.
    ReadMasked,

    /// Permission to create new objects of a resource.
    Create,

    /// Permission to update existing objects.
    Update,

    /// Permission to delete objects.
    Delete,

    /// Permission to merge two objects into one.
    Merge,

    /// Permission to split a merged object again.
    Unmerge,

    /// Permission to open a change request.
    InitiateChangeRequest,

    /// Permission to accept a pending change request.
    AcceptChangeRequest,

    /// Access kind which is not part of the catalog.
    ///
    /// Construct it through [`AccessKind::from_identifier`] so that known identifiers are never
    /// wrapped here.
    Other(String),
}

impl AccessKind {
    /// Resolve an identifier like `"READ"` into an access kind.
    ///
    /// Identifiers unknown to the catalog are passed through as [`AccessKind::Other`].
    pub fn from_identifier(identifier: &str) -> Self {
        match identifier {
            "READ" => Self::Read,
            "READ_MASKED" => Self::ReadMasked,
            "CREATE" => Self::Create,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            "MERGE" => Self::Merge,
            "UNMERGE" => Self::Unmerge,
            "INITIATE_CHANGE_REQUEST" => Self::InitiateChangeRequest,
            "ACCEPT_CHANGE_REQUEST" => Self::AcceptChangeRequest,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire identifier of this access kind.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Read => "READ",
            Self::ReadMasked => "READ_MASKED",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Unmerge => "UNMERGE",
            Self::InitiateChangeRequest => "INITIATE_CHANGE_REQUEST",
            Self::AcceptChangeRequest => "ACCEPT_CHANGE_REQUEST",
            Self::Other(identifier) => identifier,
        }
    }

    /// Returns true if this kind is listed in the catalog.
    pub fn is_known(&self) -> bool {
        AccessCatalog::standard().entry(self.as_str()).is_some()
    }
}

// Equality goes through the identifier so that a hand-built `Other("READ")` still equals
// `Read`.
impl PartialEq for AccessKind {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for AccessKind {}

impl Hash for AccessKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_identifier(s))
    }
}

impl From<&str> for AccessKind {
    fn from(value: &str) -> Self {
        Self::from_identifier(value)
    }
}

impl Serialize for AccessKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccessKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let identifier: String = Deserialize::deserialize(deserializer)?;
        Ok(Self::from_identifier(&identifier))
    }
}

/// Display colors attached to a catalog entry.
///
/// Only carried along for a presentation layer, nothing in this crate interprets them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub background: &'static str,
    pub text: &'static str,
}

impl Swatch {
    /// Neutral colors used for kinds which are not in the catalog.
    pub const FALLBACK: Swatch = Swatch {
        background: "#f0f0f0",
        text: "#333333",
    };
}

/// One entry of the access catalog.
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    pub kind: AccessKind,
    pub label: &'static str,
    pub swatch: Swatch,
}

/// Result of looking up an identifier in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lookup<'a> {
    /// Human-readable label, or the identifier itself for unknown kinds.
    pub label: &'a str,

    /// True if the identifier is listed in the catalog.
    pub known: bool,

    pub swatch: Swatch,
}

/// Static registry mapping access kinds to their labels.
#[derive(Debug)]
pub struct AccessCatalog {
    entries: &'static [CatalogEntry],
}

const fn entry(
    kind: AccessKind,
    label: &'static str,
    background: &'static str,
    text: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        kind,
        label,
        swatch: Swatch { background, text },
    }
}

static STANDARD_ENTRIES: [CatalogEntry; 9] = [
    entry(AccessKind::Read, "Read", "#e6f7ff", "#0066cc"),
    entry(AccessKind::ReadMasked, "Read Masked", "#ffe6f7", "#cc0066"),
    entry(AccessKind::Create, "Create", "#d9f7be", "#389e0d"),
    entry(AccessKind::Update, "Update", "#fff1b8", "#d48806"),
    entry(AccessKind::Delete, "Delete", "#ffccc7", "#cf1322"),
    entry(AccessKind::Merge, "Merge", "#d3adf7", "#722ed1"),
    entry(AccessKind::Unmerge, "Unmerge", "#ffd8bf", "#d46b08"),
    entry(AccessKind::InitiateChangeRequest, "Initiate Change", "#d9d9d9", "#434343"),
    entry(AccessKind::AcceptChangeRequest, "Accept Change", "#b5f5ec", "#006d75"),
];

static STANDARD: AccessCatalog = AccessCatalog {
    entries: &STANDARD_ENTRIES,
};

impl AccessCatalog {
    /// The process-wide catalog.
    pub fn standard() -> &'static AccessCatalog {
        &STANDARD
    }

    /// All catalog entries in display order.
    pub fn entries(&self) -> &'static [CatalogEntry] {
        self.entries
    }

    /// All known access kinds in display order.
    pub fn kinds(&self) -> impl Iterator<Item = &'static AccessKind> {
        self.entries.iter().map(|entry| &entry.kind)
    }

    fn entry(&self, identifier: &str) -> Option<&'static CatalogEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind.as_str() == identifier)
    }

    /// Look up the label of an access kind identifier.
    ///
    /// Unknown identifiers are not an error, they are returned as their own label with `known`
    /// set to false.
    pub fn lookup<'a>(&self, identifier: &'a str) -> Lookup<'a> {
        match self.entry(identifier) {
            Some(entry) => Lookup {
                label: entry.label,
                known: true,
                swatch: entry.swatch,
            },
            None => Lookup {
                label: identifier,
                known: false,
                swatch: Swatch::FALLBACK,
            },
        }
    }

    /// Label for an access kind.
    pub fn label<'a>(&self, kind: &'a AccessKind) -> &'a str {
        self.lookup(kind.as_str()).label
    }

    /// Resolve a display label back into an access kind.
    ///
    /// Tries an exact label match first, then a case-insensitive one. If neither matches the
    /// label itself is taken as the raw identifier.
    pub fn from_label(&self, label: &str) -> AccessKind {
        if let Some(entry) = self.entries.iter().find(|entry| entry.label == label) {
            return entry.kind.clone();
        }

        let lowercase = label.to_lowercase();
        if let Some(entry) = self
            .entries
            .iter()
            .find(|entry| entry.label.to_lowercase() == lowercase)
        {
            return entry.kind.clone();
        }

        AccessKind::from_identifier(label)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{AccessCatalog, AccessKind, Swatch};

    #[test]
    fn known_kinds_have_labels() {
        let catalog = AccessCatalog::standard();

        let lookup = catalog.lookup("READ_MASKED");
        assert!(lookup.known);
        assert_eq!(lookup.label, "Read Masked");
        assert_eq!(lookup.swatch.background, "#ffe6f7");

        assert_eq!(catalog.kinds().count(), 9);
        assert_eq!(catalog.kinds().next(), Some(&AccessKind::Read));
    }

    #[test]
    fn unknown_kinds_fall_back_to_identifier() {
        let lookup = AccessCatalog::standard().lookup("FOO");
        assert!(!lookup.known);
        assert_eq!(lookup.label, "FOO");
        assert_eq!(lookup.swatch, Swatch::FALLBACK);

        let kind = AccessKind::from_identifier("FOO");
        assert_eq!(kind, AccessKind::Other("FOO".into()));
        assert!(!kind.is_known());
        assert_eq!(AccessCatalog::standard().label(&kind), "FOO");
    }

    #[test]
    fn hand_built_other_equals_known_kind() {
        assert_eq!(AccessKind::Other("READ".into()), AccessKind::Read);
        assert!(AccessKind::Other("MERGE".into()).is_known());
    }

    #[rstest]
    #[case("Read", AccessKind::Read)]
    #[case("read masked", AccessKind::ReadMasked)]
    #[case("INITIATE CHANGE", AccessKind::InitiateChangeRequest)]
    #[case("Accept Change", AccessKind::AcceptChangeRequest)]
    #[case("DELETE", AccessKind::Delete)]
    #[case("FOO", AccessKind::Other("FOO".into()))]
    #[case("Initiate", AccessKind::Other("Initiate".into()))]
    fn labels_resolve_to_kinds(#[case] label: &str, #[case] expected: AccessKind) {
        assert_eq!(AccessCatalog::standard().from_label(label), expected);
    }

    #[test]
    fn serializes_as_identifier() {
        let kinds = vec![AccessKind::Create, AccessKind::from_identifier("CUSTOM")];
        let json = serde_json::to_string(&kinds).unwrap();
        assert_eq!(json, r#"["CREATE","CUSTOM"]"#);

        let again: Vec<AccessKind> = serde_json::from_str(&json).unwrap();
        assert_eq!(again, kinds);
    }
}
