//! v1 API Data Transfer Objects.
//!
//! Request bodies and query parameters for the v1 REST API. Responses
//! serialize the domain models from `src/models/` directly.

pub mod common;
pub mod forecasting;
pub mod intents;
pub mod leads;
pub mod observations;
pub mod reviews;
pub mod sentiment;

pub use common::*;
pub use forecasting::*;
pub use intents::*;
pub use leads::*;
pub use observations::*;
pub use reviews::*;
pub use sentiment::*;
