use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Every way a fetch can fail, as seen by a view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("conference '{id}' not found")]
    NotFound { id: String },
    #[error("server responded {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Maps an in-process API failure onto the same taxonomy an HTTP fetch
    /// would produce.
    pub(crate) fn from_api(error: ApiError, id: Option<&str>) -> Self {
        match (error.code, id) {
            (ErrorCode::NotFound, Some(id)) => Self::NotFound { id: id.to_string() },
            (ErrorCode::NotFound, None) => Self::Status {
                status: 404,
                message: error.message,
            },
            (ErrorCode::Validation, _) => Self::Status {
                status: 400,
                message: error.message,
            },
            (ErrorCode::Internal, _) => Self::Status {
                status: 500,
                message: error.message,
            },
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(value: url::ParseError) -> Self {
        Self::InvalidUrl(value.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Network(value.to_string())
        }
    }
}
