//! Rarwe Catalog - client-side cache of bands and songs
//!
//! This library fetches bands and songs from a JSON:API backend, keeps them in
//! observable in-memory collections and follows relationship links on demand.

/// Catalog service combining the store and the API client
pub mod catalog;
/// Client modules for talking to the JSON:API backend
pub mod clients;
/// Text helpers used when rendering records
pub mod helpers;
/// In-memory record collections
pub mod store;

pub use catalog::{Catalog, CatalogBuilder, CatalogConfig};
pub use store::{CatalogEvent, RecordStore};
