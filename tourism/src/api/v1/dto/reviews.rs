use serde::Deserialize;

fn default_process_limit() -> usize {
    100
}

/// Request body for `POST /v1/reviews:process`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ProcessReviewsRequest {
    /// Restrict processing to one business.
    #[serde(default)]
    pub business_id: Option<String>,
    /// Reviews to score in this call (default 100, capped at 500).
    #[serde(default = "default_process_limit")]
    pub limit: usize,
}
