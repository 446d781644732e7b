use serde::Deserialize;

/// Request body for `POST /v1/leads/{leadId}/convert`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct ConvertLeadRequest {
    /// Booking value. Keeps any stored value when absent.
    #[serde(default)]
    pub conversion_value: Option<f64>,
}
