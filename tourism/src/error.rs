use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;

#[derive(Error, Debug)]
pub enum TourismError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Empty or invalid text, observation sets, or request parameters.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No trained model bundle is available. Callers should train rather than retry.
    #[error("Models not trained: {0}")]
    NotTrained(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An optional analyzer (advanced sentiment or emotion model) could not be reached.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Forecasting error: {0}")]
    Forecasting(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl TourismError {
    pub fn not_trained() -> Self {
        Self::NotTrained("no trained model bundle is available, train the forecaster first".into())
    }
}

impl From<validator::ValidationErrors> for TourismError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl IntoResponse for TourismError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, TourismError>;
