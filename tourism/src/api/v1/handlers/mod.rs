pub mod analytics;
pub mod forecasting;
pub(crate) mod health;
pub mod intents;
pub mod observations;
pub mod reviews;
pub mod sentiment;

pub use health::health_check;
