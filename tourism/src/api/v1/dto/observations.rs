use serde::Deserialize;

use crate::models::TimeSeriesObservation;

/// Largest import accepted by `POST /v1/observations:batch`.
pub const MAX_OBSERVATION_BATCH: usize = 10_000;

/// Request body for `POST /v1/observations:batch`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct BatchObservationsRequest {
    pub observations: Vec<TimeSeriesObservation>,
}
