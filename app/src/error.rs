//! Error types for the booking sheet and the repositories

use thiserror::Error;

/// Errors raised while mapping sheet rows to booking records
#[derive(Debug, Error)]
pub enum CodecError {
    /// Body is not a JSON array of eight-key objects
    #[error("malformed booking rows: {0}")]
    Json(#[from] serde_json::Error),

    /// A field is present but its content does not parse
    #[error("invalid value {value:?} in column {field}")]
    InvalidField {
        /// Column header of the offending field
        field: &'static str,
        /// Raw value as received
        value: String,
    },
}

/// Errors that can occur when talking to the booking sheet
#[derive(Debug, Error)]
pub enum BookingServiceError {
    /// Connection or protocol failure below HTTP status level
    #[error("request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The endpoint answered with an unexpected status
    ///
    /// The status code is logged by the client, not carried here.
    #[error("bad server response")]
    BadServerResponse,

    /// The response body could not be decoded
    #[error("response decoding failed: {0}")]
    Decode(#[from] CodecError),

    /// The backend has no way to perform this operation
    #[error("{operation} is not supported by this booking backend")]
    Unsupported {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// No booking matches the target of an update or delete
    #[error("booking not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for BookingServiceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Transport(format!("body could not be read: {error}"))
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Booking service result
pub type ServiceResult<T> = Result<T, BookingServiceError>;

/// Errors raised by theater and showtime repositories
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// No entity with this id
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// An entity with this id already exists
    #[error("{entity} {id} already exists")]
    Conflict {
        /// Entity kind
        entity: &'static str,
        /// Identifier that collided
        id: String,
    },
}

/// Repository result
pub type RepositoryResult<T> = Result<T, RepositoryError>;
