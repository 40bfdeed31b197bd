use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::clients::{
    entities::{Attributes, Record, RecordKind, Related},
    errors::{Error, Result},
};

/// Media type the API expects on request bodies
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

// ============================================================================
// Response documents
// ============================================================================

/// A JSON:API response document
#[derive(Deserialize, Debug)]
pub struct Document {
    // None when the server sent `null`
    pub data: Option<PrimaryData>,
}

/// Primary data is either one resource object or a list of them
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<ResourceObject>),
    One(Box<ResourceObject>),
}

/// One resource as the server represents it
#[derive(Deserialize, Debug)]
pub struct ResourceObject {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub relationships: BTreeMap<String, RelationshipObject>,
}

/// A relationship block inside a resource object
#[derive(Deserialize, Debug, Default)]
pub struct RelationshipObject {
    // Only `related` is used
    #[serde(default)]
    pub links: Option<RelationshipLinks>,
}

/// The `links` member of a relationship block
#[derive(Deserialize, Debug, Default)]
pub struct RelationshipLinks {
    #[serde(default)]
    pub related: Option<Link>,
}

/// JSON:API allows a link to be a plain string or an object with `href`
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Link {
    /// `"related": "/bands/1/songs"`
    Url(String),
    /// `"related": { "href": "/bands/1/songs" }`
    Object { href: String },
}

impl Link {
    /// Target URL of the link
    #[must_use]
    pub fn href(&self) -> &str {
        match self {
            Link::Url(href) | Link::Object { href } => href,
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Flatten `relationships.<name>.links.related` into name -> URL.
/// Relationships without a related link are skipped.
#[must_use]
pub fn extract_relationships(
    relationships: BTreeMap<String, RelationshipObject>,
) -> BTreeMap<String, String> {
    relationships
        .into_iter()
        .filter_map(|(name, relationship)| {
            match relationship.links.and_then(|links| links.related) {
                Some(link) => Some((name, link.href().to_string())),
                None => {
                    debug!("Relationship {name} has no related link, skipping");
                    None
                }
            }
        })
        .collect()
}

/// Turn a raw resource object into a typed record
pub fn normalize(resource: ResourceObject) -> Result<Record> {
    let kind = RecordKind::from_resource_type(&resource.resource_type)?;
    let links = extract_relationships(resource.relationships);
    Ok(Record::new(kind, resource.id, resource.attributes, links))
}

/// Normalize the primary data of a document fetched from `url`
pub fn normalize_document(document: Document, url: &str) -> Result<Related> {
    match document.data {
        Some(PrimaryData::One(resource)) => Ok(Related::One(normalize(*resource)?)),
        Some(PrimaryData::Many(resources)) => {
            let records = resources
                .into_iter()
                .map(normalize)
                .collect::<Result<Vec<_>>>()?;
            Ok(Related::Many(records))
        }
        None => Err(Error::EmptyDocument(url.to_string())),
    }
}

// ============================================================================
// Write payloads
// ============================================================================

/// Body of a POST or PATCH request
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WriteDocument {
    pub data: WriteResource,
}

/// Resource object as sent to the server
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WriteResource {
    // Present on updates only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub attributes: Attributes,
    // Present on creation only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, RelationshipData>>,
}

/// To-one resource linkage sent when creating a record
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RelationshipData {
    pub data: ResourceIdentifier,
}

impl RelationshipData {
    /// Link to a single record
    #[must_use]
    pub fn to_one(kind: RecordKind, id: impl Into<String>) -> Self {
        RelationshipData {
            data: ResourceIdentifier {
                resource_type: kind.resource_type(),
                id: id.into(),
            },
        }
    }
}

/// `type` + `id` pair identifying a resource
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: &'static str,
    pub id: String,
}

/// `{ data: { type, attributes, relationships } }`
#[must_use]
pub fn creation_payload(
    kind: RecordKind,
    attributes: Attributes,
    relationships: BTreeMap<String, RelationshipData>,
) -> WriteDocument {
    WriteDocument {
        data: WriteResource {
            id: None,
            resource_type: kind.resource_type(),
            attributes,
            relationships: Some(relationships),
        },
    }
}

/// `{ data: { id, type, attributes } }`
#[must_use]
pub fn update_payload(kind: RecordKind, id: &str, attributes: Attributes) -> WriteDocument {
    WriteDocument {
        data: WriteResource {
            id: Some(id.to_string()),
            resource_type: kind.resource_type(),
            attributes,
            relationships: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_band_copies_id_and_attributes() {
        let resource: ResourceObject = serde_json::from_value(json!({
            "id": "1",
            "type": "bands",
            "attributes": { "name": "Rush", "description": "Canadian trio" },
            "relationships": {
                "songs": { "links": { "related": "/bands/1/songs" } }
            }
        }))
        .unwrap();

        let record = normalize(resource).unwrap();
        assert_eq!(record.kind(), RecordKind::Band);
        assert_eq!(record.id(), "1");
        assert_eq!(
            serde_json::Value::Object(record.attributes().clone()),
            json!({ "name": "Rush", "description": "Canadian trio" })
        );
        assert_eq!(record.related_link("songs"), Some("/bands/1/songs"));
        assert!(!record.relationship("songs").unwrap().is_resolved());
    }

    #[test]
    fn test_normalize_song_without_relationships() {
        let resource: ResourceObject = serde_json::from_value(json!({
            "id": "7",
            "type": "songs",
            "attributes": { "title": "Roundabout", "rating": 5 }
        }))
        .unwrap();

        let record = normalize(resource).unwrap();
        assert_eq!(record.kind(), RecordKind::Song);
        assert_eq!(record.attribute("rating"), Some(&json!(5)));
        assert!(record.relationships().is_empty());
    }

    #[test]
    fn test_normalize_rejects_unknown_type() {
        let resource: ResourceObject =
            serde_json::from_value(json!({ "id": "1", "type": "albums" })).unwrap();
        assert!(matches!(
            normalize(resource),
            Err(Error::UnknownResourceType(t)) if t == "albums"
        ));
    }

    #[test]
    fn test_extract_relationships_handles_link_shapes() {
        let relationships: BTreeMap<String, RelationshipObject> =
            serde_json::from_value(json!({
                "band": { "links": { "related": { "href": "/songs/3/band" } } },
                "songs": { "links": { "related": "/bands/1/songs" } },
                "label": { "data": { "type": "labels", "id": "2" } }
            }))
            .unwrap();

        let links = extract_relationships(relationships);
        assert_eq!(links.len(), 2);
        assert_eq!(links["band"], "/songs/3/band");
        assert_eq!(links["songs"], "/bands/1/songs");
    }

    #[test]
    fn test_normalize_document_shapes() {
        let one = document(json!({ "data": { "id": "1", "type": "bands" } }));
        assert!(matches!(
            normalize_document(one, "/x").unwrap(),
            Related::One(record) if record.id() == "1"
        ));

        let many = document(json!({ "data": [
            { "id": "2", "type": "songs" },
            { "id": "1", "type": "songs" }
        ]}));
        let Related::Many(records) = normalize_document(many, "/x").unwrap() else {
            panic!("expected a sequence");
        };
        let ids: Vec<_> = records.iter().map(Record::id).collect();
        assert_eq!(ids, ["2", "1"]);

        let empty = document(json!({ "data": null }));
        assert!(matches!(
            normalize_document(empty, "/songs/3/band"),
            Err(Error::EmptyDocument(url)) if url == "/songs/3/band"
        ));
    }

    #[test]
    fn test_creation_payload_shape() {
        let mut attributes = Attributes::new();
        attributes.insert("title".into(), json!("Owner of a Lonely Heart"));
        let relationships =
            BTreeMap::from([("band".to_string(), RelationshipData::to_one(RecordKind::Band, "9"))]);

        let payload = creation_payload(RecordKind::Song, attributes, relationships);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "data": {
                    "type": "songs",
                    "attributes": { "title": "Owner of a Lonely Heart" },
                    "relationships": { "band": { "data": { "type": "bands", "id": "9" } } }
                }
            })
        );
    }

    #[test]
    fn test_update_payload_shape() {
        let mut attributes = Attributes::new();
        attributes.insert("rating".into(), json!(4));

        let payload = update_payload(RecordKind::Song, "3", attributes);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "data": { "id": "3", "type": "songs", "attributes": { "rating": 4 } } })
        );
    }
}
