use reqwest::StatusCode;
use thiserror::Error;

use crate::clients::entities::RecordKind;

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while talking to the catalog API or reading its documents
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog API returned {status} for {url}")]
    Status { status: StatusCode, url: String },

    #[error("JSON:API deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // `type` that maps to no record kind
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Document at {0} has no primary data")]
    EmptyDocument(String),

    // A list came back where a single resource was expected
    #[error("Expected a single resource from {0}")]
    UnexpectedDocument(String),

    #[error("No {kind} with id {id} in the catalog")]
    RecordNotFound { kind: RecordKind, id: String },

    #[error("{kind} {id} has no relationship named {relationship}")]
    UnknownRelationship {
        kind: RecordKind,
        id: String,
        relationship: String,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::ConfigurationError(err.to_string())
    }
}
