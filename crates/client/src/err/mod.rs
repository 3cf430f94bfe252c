//! Error types for the STAplus client

use thiserror::Error;

/// Every failure the client can surface to a caller.
///
/// None of these are retried internally; they propagate to whoever called
/// create, fetch-one, fetch-many or stepped a paged iterator.
#[derive(Debug, Error)]
pub enum StaplusError {
    /// A value did not satisfy the declared semantic type of a field.
    #[error("invalid value for {entity}.{field}: expected {expected}")]
    Validation {
        entity: &'static str,
        field: String,
        expected: String,
    },

    /// The server answered with a non-2xx status.
    ///
    /// `entity` names the entity type being written when the failure came
    /// from a create/update/patch/delete.
    #[error("server responded with status {status}: {message}")]
    Server {
        status: u16,
        message: String,
        entity: Option<&'static str>,
    },

    /// The server answered 2xx but the payload was not usable.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// No registry entry for an entity-type name.
    #[error("entity type not found: {0}")]
    UnknownType(String),

    /// Navigation or write-back needs an identifier the entity does not have yet.
    #[error("{0} has no id yet, create it first")]
    MissingId(&'static str),

    /// The entity or collection has no live service attached.
    #[error("no service attached to {0}")]
    Detached(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure raised by a non-reqwest transport.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StaplusError {
    pub(crate) fn validation(
        entity: &'static str,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Validation {
            entity,
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// HTTP status of a server rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_malformed_response(&self) -> bool {
        matches!(self, Self::MalformedResponse(_))
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, StaplusError>;
