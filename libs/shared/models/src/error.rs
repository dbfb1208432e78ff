use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Maps a non-2xx HTTP status and its body onto the matching variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let message = body.into();
        match status {
            404 => AppError::NotFound(message),
            400 | 422 => AppError::BadRequest(message),
            _ => AppError::Upstream { status, message },
        }
    }

    /// True when the failure came out of a network exchange rather than local checks.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Network(_)
                | AppError::NotFound(_)
                | AppError::BadRequest(_)
                | AppError::Upstream { .. }
                | AppError::Decode(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}
