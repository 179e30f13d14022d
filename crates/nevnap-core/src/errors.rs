//! Error types for the name day lookup pipeline.
//!
//! Every variant is recoverable at the client boundary: a failed lookup is
//! reported to the collaborator and the client stays usable for the next
//! navigation call. There is no retry policy; a new attempt only happens on
//! the next explicit navigation or refresh.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum NameDayError {
    #[error("network request failed: {0}")]
    Network(String),
    #[error("service answered {status} for key '{key}'")]
    HttpStatus { status: u16, key: String },
    #[error("response body is not a JSON object: {0}")]
    MalformedResponse(String),
    #[error("response carries no name list for key '{0}'")]
    MissingKey(String),
}

impl From<reqwest::Error> for NameDayError {
    fn from(err: reqwest::Error) -> Self {
        NameDayError::Network(err.to_string())
    }
}
