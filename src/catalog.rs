//! The catalog service: record store plus the JSON:API client that fills it.

use std::collections::BTreeMap;

use log::{debug, info};
use tokio::sync::broadcast;

use crate::clients::{
    entities::{Attributes, Record, RecordKind, Related, Relationship},
    errors::{Error, Result},
    http::JsonApiClient,
    jsonapi::{RelationshipData, creation_payload, normalize_document, update_payload},
};
use crate::store::{CatalogEvent, RecordStore};

/// Resolved configuration of a [`Catalog`]
pub struct CatalogConfig {
    /// Client used for every request
    pub client: JsonApiClient,
}

/// Builds a [`Catalog`], filling unset parts from the environment
pub struct CatalogBuilder {
    api_url: Option<String>,
}

impl CatalogBuilder {
    /// Builder with nothing set
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_url: None, // Falls back to RARWE_API_URL
        }
    }

    /// Talk to the API at `api_url` instead of `RARWE_API_URL`
    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Resolve the configuration without building the catalog
    pub fn config(self) -> Result<CatalogConfig> {
        let client = match self.api_url {
            Some(url) => JsonApiClient::from_base_url(&url)?,
            None => JsonApiClient::try_default()?,
        };
        Ok(CatalogConfig { client })
    }

    /// Build the catalog
    pub fn build(self) -> Result<Catalog> {
        Ok(Catalog::new(self.config()?))
    }
}

/// Client-side band and song catalog.
///
/// Holds the records fetched so far and mediates all network access.
/// Every mutating operation takes `&mut self`, so calls on one catalog
/// are serialized by the caller.
pub struct Catalog {
    client: JsonApiClient,
    store: RecordStore,
}

impl Catalog {
    /// Empty catalog using `config`
    #[must_use]
    pub fn new(config: CatalogConfig) -> Self {
        Catalog {
            client: config.client,
            store: RecordStore::default(),
        }
    }

    /// Start building a catalog
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Records fetched so far
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Mutable access to apply local changes, e.g. after [`Catalog::update`]
    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// Listen for store changes
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.store.subscribe()
    }

    /// All bands fetched so far
    #[must_use]
    pub fn bands(&self) -> &[Record] {
        self.store.bands()
    }

    /// All songs fetched so far
    #[must_use]
    pub fn songs(&self) -> &[Record] {
        self.store.songs()
    }

    /// First stored record of `kind` matching `predicate`
    pub fn find<P>(&self, kind: RecordKind, predicate: P) -> Option<&Record>
    where
        P: FnMut(&Record) -> bool,
    {
        self.store.find(kind, predicate)
    }

    // Adds records to the store, skipping known ids. Returns how many were new.
    fn load_all(&mut self, records: impl IntoIterator<Item = Record>) -> usize {
        records
            .into_iter()
            .map(|record| self.store.add(record))
            .filter(|&inserted| inserted)
            .count()
    }

    /// Fetch the whole collection of `kind` and merge it into the store.
    ///
    /// Returns every stored record of `kind`, not only the ones just fetched.
    pub async fn fetch_all(&mut self, kind: RecordKind) -> Result<&[Record]> {
        let url = self.client.collection_url(kind)?;
        let document = self.client.get_document(url.clone()).await?;
        let records = normalize_document(document, url.as_str())?.into_records();

        let fetched = records.len();
        let inserted = self.load_all(records);
        info!("Fetched {fetched} {kind}s, {inserted} new");

        Ok(self.store.all(kind))
    }

    /// Follow the related link of `relationship` on a stored record.
    ///
    /// The fetched records are added to the store and the resolved value is
    /// kept on the record. Calling it again fetches again and overwrites.
    pub async fn fetch_related(
        &mut self,
        kind: RecordKind,
        id: &str,
        relationship: &str,
    ) -> Result<&Relationship> {
        let record = self
            .store
            .get(kind, id)
            .ok_or_else(|| record_not_found(kind, id))?;
        let link = record
            .related_link(relationship)
            .ok_or_else(|| Error::UnknownRelationship {
                kind,
                id: id.to_string(),
                relationship: relationship.to_string(),
            })?;

        let url = self.client.resolve(link)?;
        let document = self.client.get_document(url.clone()).await?;
        let related = normalize_document(document, url.as_str())?;

        let inserted = match &related {
            Related::One(record) => self.load_all([record.clone()]),
            Related::Many(records) => self.load_all(records.iter().cloned()),
        };
        debug!("{kind} {id} {relationship}: {inserted} new records");

        self.store
            .get_mut(kind, id)
            .ok_or_else(|| record_not_found(kind, id))?
            .resolve_relationship(relationship, related)?;
        self.store.notify(CatalogEvent::RelationshipResolved {
            kind,
            id: id.to_string(),
            relationship: relationship.to_string(),
        });

        self.store
            .get(kind, id)
            .and_then(|record| record.relationship(relationship))
            .ok_or_else(|| record_not_found(kind, id))
    }

    /// Create a record on the server, store it and return it
    pub async fn create(
        &mut self,
        kind: RecordKind,
        attributes: Attributes,
        relationships: BTreeMap<String, RelationshipData>,
    ) -> Result<Record> {
        let url = self.client.collection_url(kind)?;
        let payload = creation_payload(kind, attributes, relationships);
        let document = self.client.post_document(url.clone(), &payload).await?;

        let record = match normalize_document(document, url.as_str())? {
            Related::One(record) => record,
            Related::Many(_) => return Err(Error::UnexpectedDocument(url.to_string())),
        };
        info!("Created {} {}", record.kind(), record.id());
        self.store.add(record.clone());
        Ok(record)
    }

    /// Send new attribute values for a record.
    ///
    /// The stored record is left untouched and the response body is ignored;
    /// apply the change locally through [`Catalog::store_mut`] if needed.
    pub async fn update(&self, kind: RecordKind, id: &str, attributes: Attributes) -> Result<()> {
        let url = self.client.member_url(kind, id)?;
        let payload = update_payload(kind, id, attributes);
        self.client.patch(url, &payload).await?;
        info!("Updated {kind} {id}");
        Ok(())
    }
}

fn record_not_found(kind: RecordKind, id: &str) -> Error {
    Error::RecordNotFound {
        kind,
        id: id.to_string(),
    }
}
