//! Sentiment request DTOs. Responses reuse the domain models.

use serde::Deserialize;

/// Largest batch accepted by `POST /v1/sentiment:batch` and `:insights`.
pub const MAX_SENTIMENT_BATCH: usize = 100;

/// Request body for `POST /v1/sentiment:analyze`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct AnalyzeSentimentRequest {
    /// Text to score. Blank text yields a neutral zero-confidence result.
    pub text: String,
}

/// Request body for `POST /v1/sentiment:batch` and `POST /v1/sentiment:insights`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct BatchSentimentRequest {
    pub texts: Vec<String>,
}
