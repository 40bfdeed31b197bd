use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::clients::errors::{Error, Result};

/// Attribute name to scalar value, in the order the server sent them
pub type Attributes = Map<String, Value>;

/// The two kinds of records the catalog holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Band,
    Song,
}

impl RecordKind {
    /// Every kind, in store order
    pub const ALL: [RecordKind; 2] = [RecordKind::Band, RecordKind::Song];

    /// JSON:API `type` string of this kind
    #[must_use]
    pub fn resource_type(self) -> &'static str {
        match self {
            RecordKind::Band => "bands",
            RecordKind::Song => "songs",
        }
    }

    /// Collection path relative to the API base URL
    #[must_use]
    pub fn collection_path(self) -> &'static str {
        self.resource_type()
    }

    /// Map a JSON:API `type` string back to a kind
    pub fn from_resource_type(resource_type: &str) -> Result<Self> {
        match resource_type {
            "bands" => Ok(RecordKind::Band),
            "songs" => Ok(RecordKind::Song),
            other => Err(Error::UnknownResourceType(other.to_string())),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Band => f.write_str("band"),
            RecordKind::Song => f.write_str("song"),
        }
    }
}

// Accepts both `band` and `bands` since callers use either form
impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "band" | "bands" => Ok(RecordKind::Band),
            "song" | "songs" => Ok(RecordKind::Song),
            other => Err(Error::UnknownResourceType(other.to_string())),
        }
    }
}

/// State of one relationship on a record.
///
/// Starts as `Unresolved` after normalization and moves to `One` or `Many`
/// once the related link has been fetched. The related link is kept in every
/// state so the relationship can be fetched again.
#[derive(Debug, Clone, PartialEq)]
pub enum Relationship {
    Unresolved {
        related: String,
    },
    One {
        related: String,
        record: Box<Record>,
    },
    Many {
        related: String,
        // Server order
        records: Vec<Record>,
    },
}

impl Relationship {
    /// The related link, whatever the resolution state
    #[must_use]
    pub fn related(&self) -> &str {
        match self {
            Relationship::Unresolved { related }
            | Relationship::One { related, .. }
            | Relationship::Many { related, .. } => related,
        }
    }

    /// Whether the link has been fetched at least once
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Relationship::Unresolved { .. })
    }

    /// Resolved single record, if the relationship resolved to one
    #[must_use]
    pub fn as_one(&self) -> Option<&Record> {
        match self {
            Relationship::One { record, .. } => Some(&**record),
            _ => None,
        }
    }

    /// Resolved records, if the relationship resolved to a sequence
    #[must_use]
    pub fn as_many(&self) -> Option<&[Record]> {
        match self {
            Relationship::Many { records, .. } => Some(records.as_slice()),
            _ => None,
        }
    }
}

/// Value a relationship link resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Record),
    Many(Vec<Record>),
}

impl Related {
    /// Flatten into a list, a single record becomes a list of one
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Related::One(record) => vec![record],
            Related::Many(records) => records,
        }
    }
}

/// A band or a song as cached on the client
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    id: String,
    attributes: Attributes,
    relationships: BTreeMap<String, Relationship>,
}

impl Record {
    /// Build a record whose relationships are all unresolved links
    #[must_use]
    pub fn new(
        kind: RecordKind,
        id: impl Into<String>,
        attributes: Attributes,
        links: BTreeMap<String, String>,
    ) -> Self {
        let relationships = links
            .into_iter()
            .map(|(name, related)| (name, Relationship::Unresolved { related }))
            .collect();
        Record {
            kind,
            id: id.into(),
            attributes,
            relationships,
        }
    }

    /// Kind of this record
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Server identifier, fixed at construction
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All attributes
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Single attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attribute value as a string slice, if it is a string
    #[must_use]
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(Value::as_str)
    }

    /// Overwrite one attribute locally. Nothing is sent to the server.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// All relationships by name
    #[must_use]
    pub fn relationships(&self) -> &BTreeMap<String, Relationship> {
        &self.relationships
    }

    /// Relationship by name
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    /// Related link of a relationship, resolved or not
    #[must_use]
    pub fn related_link(&self, name: &str) -> Option<&str> {
        self.relationships.get(name).map(Relationship::related)
    }

    /// Store a fetched value on an existing relationship.
    ///
    /// Overwrites any earlier resolution. Relationships can only move forward,
    /// there is no way back to `Unresolved`.
    pub fn resolve_relationship(&mut self, name: &str, value: Related) -> Result<&Relationship> {
        let Some(slot) = self.relationships.get_mut(name) else {
            return Err(Error::UnknownRelationship {
                kind: self.kind,
                id: self.id.clone(),
                relationship: name.to_string(),
            });
        };
        let related = slot.related().to_string();
        *slot = match value {
            Related::One(record) => Relationship::One {
                related,
                record: Box::new(record),
            },
            Related::Many(records) => Relationship::Many { related, records },
        };
        Ok(&*slot)
    }
}
