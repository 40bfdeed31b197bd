/// Record kinds, records and relationship state
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// HTTP transport for the JSON:API backend
pub mod http;
/// JSON:API documents, normalization and write payloads
pub mod jsonapi;

pub use entities::{Attributes, Record, RecordKind, Related, Relationship};
pub use http::JsonApiClient;
