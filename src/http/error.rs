//! Error taxonomy for JSON request and response handling.

use axum::http::StatusCode;
use thiserror::Error;

/// Why a request body could not be decoded.
///
/// The `Display` text is the message sent back to the client, so it carries
/// the offsets, field names and limits a caller needs to fix the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A Content-Type header was sent and it is not `application/json`.
    #[error("the Content-Type header is not application/json")]
    WrongContentType,

    /// Invalid JSON at a known position.
    #[error("body contains badly-formed JSON (at character {offset})")]
    MalformedSyntax { offset: usize },

    /// The body ended in the middle of a value.
    #[error("body contains badly-formed JSON")]
    TruncatedInput,

    /// A value had the wrong JSON type for its destination field.
    #[error("body contains incorrect JSON type for field {field:?} at offset {offset}")]
    TypeMismatch { field: String, offset: usize },

    /// Nothing but whitespace was sent.
    #[error("body must not be empty")]
    EmptyBody,

    /// Strict mode saw a key the destination does not declare.
    #[error("body contains unknown key \"{0}\"")]
    UnknownField(String),

    /// The body ran past the configured ceiling.
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The destination type itself refused to be decoded into.
    #[error("error unmarshalling json: {0}")]
    InvalidDestination(String),

    /// A well-formed value was followed by more data.
    #[error("body must only contain a single JSON value")]
    MultipleValues,

    /// Anything else, passed through unchanged.
    #[error("{0}")]
    Unclassified(String),
}

impl DecodeError {
    /// Status code used when this error is rendered as a response.
    pub fn status(&self) -> StatusCode {
        match self {
            DecodeError::WrongContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            DecodeError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Failure to produce a JSON response. The serializer's error is kept as is.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
