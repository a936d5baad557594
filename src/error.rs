//! Request-level errors and their HTTP mapping.

use lambda_http::http::StatusCode;

/// Everything that can go wrong handling a submission. Each variant's
/// `Display` text is the `error` string the client sees, except `Internal`,
/// whose real cause is only surfaced in development mode.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Method not allowed")]
    Method,

    #[error("Server configuration error - missing Google Sheets credentials")]
    Configuration,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Method => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Configuration | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
