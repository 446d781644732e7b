//! Intent classification DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Intent, IntentResult};

/// Request body for `POST /v1/intents:classify`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ClassifyIntentRequest {
    pub text: String,
    /// Also run entity extraction for the detected intent.
    #[serde(default)]
    pub extract_entities: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ClassifyIntentResponse {
    #[serde(flatten)]
    pub classification: IntentResult,
    /// Entity kind to extracted values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<BTreeMap<String, Vec<String>>>,
}

/// Request body for `POST /v1/intents:entities`.
///
/// Without an `intent` the text is classified first.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ExtractEntitiesRequest {
    pub text: String,
    #[serde(default)]
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ExtractEntitiesResponse {
    pub intent: Intent,
    pub entities: BTreeMap<String, Vec<String>>,
}
