//! In-memory record collections.
//!
//! One insertion-ordered list per [`RecordKind`], deduplicated by identifier.
//! Every insert is published on a broadcast channel so views can re-render.

use log::debug;
use tokio::sync::broadcast;

use crate::clients::entities::{Record, RecordKind};

/// Default buffer size of the change channel
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Change notification emitted by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Inserted {
        kind: RecordKind,
        id: String,
    },
    // Also sent when an already resolved relationship is fetched again
    RelationshipResolved {
        kind: RecordKind,
        id: String,
        relationship: String,
    },
}

/// Bands and songs known to the client
#[derive(Debug)]
pub struct RecordStore {
    bands: Vec<Record>,
    songs: Vec<Record>,
    events: broadcast::Sender<CatalogEvent>,
}

impl Default for RecordStore {
    fn default() -> Self {
        RecordStore::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl RecordStore {
    /// Empty store whose change channel buffers `event_capacity` events
    #[must_use]
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        RecordStore {
            bands: Vec::new(),
            songs: Vec::new(),
            events,
        }
    }

    fn collection(&self, kind: RecordKind) -> &Vec<Record> {
        match kind {
            RecordKind::Band => &self.bands,
            RecordKind::Song => &self.songs,
        }
    }

    fn collection_mut(&mut self, kind: RecordKind) -> &mut Vec<Record> {
        match kind {
            RecordKind::Band => &mut self.bands,
            RecordKind::Song => &mut self.songs,
        }
    }

    /// Listen for inserts and relationship resolutions.
    /// Receivers that fall behind get `RecvError::Lagged`.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    pub(crate) fn notify(&self, event: CatalogEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    /// Append `record` unless its kind already has one with the same id.
    /// Returns whether it was inserted.
    pub fn add(&mut self, record: Record) -> bool {
        let kind = record.kind();
        if self.contains(kind, record.id()) {
            debug!("{kind} {} already in catalog, skipping", record.id());
            return false;
        }
        let id = record.id().to_string();
        self.collection_mut(kind).push(record);
        self.notify(CatalogEvent::Inserted { kind, id });
        true
    }

    /// Whether a record with this id is stored
    #[must_use]
    pub fn contains(&self, kind: RecordKind, id: &str) -> bool {
        self.get(kind, id).is_some()
    }

    /// All records of `kind` in insertion order
    #[must_use]
    pub fn all(&self, kind: RecordKind) -> &[Record] {
        self.collection(kind)
    }

    /// All bands in insertion order
    #[must_use]
    pub fn bands(&self) -> &[Record] {
        &self.bands
    }

    /// All songs in insertion order
    #[must_use]
    pub fn songs(&self) -> &[Record] {
        &self.songs
    }

    /// Record by identifier
    #[must_use]
    pub fn get(&self, kind: RecordKind, id: &str) -> Option<&Record> {
        self.collection(kind).iter().find(|r| r.id() == id)
    }

    /// Mutable record by identifier, for applying local changes
    pub fn get_mut(&mut self, kind: RecordKind, id: &str) -> Option<&mut Record> {
        self.collection_mut(kind).iter_mut().find(|r| r.id() == id)
    }

    /// First record of `kind` matching `predicate`
    pub fn find<P>(&self, kind: RecordKind, mut predicate: P) -> Option<&Record>
    where
        P: FnMut(&Record) -> bool,
    {
        self.collection(kind).iter().find(|r| predicate(r))
    }

    /// Number of records of `kind`
    #[must_use]
    pub fn len(&self, kind: RecordKind) -> usize {
        self.collection(kind).len()
    }

    /// Whether no record of `kind` is stored
    #[must_use]
    pub fn is_empty(&self, kind: RecordKind) -> bool {
        self.collection(kind).is_empty()
    }
}
