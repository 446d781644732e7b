//! Visitor demand forecasting.
//!
//! [`DemandForecaster`] trains three regressors on daily visitor counts, keeps
//! the fitted bundle in memory behind an `Arc` swap, and persists it through a
//! [`ModelStore`](crate::db::ModelStore) as a single blob.

mod bundle;
pub mod calendar;
mod features;
mod forecaster;
pub mod metrics;
mod regressors;
mod training;

pub use bundle::{TrainedModelSet, BUNDLE_FORMAT_VERSION};
pub use features::{
    CategoryEncoders, LabelEncoder, StandardScaler, VisitorHistory, FEATURE_COLUMNS,
    HISTORY_TAIL_DAYS,
};
pub use forecaster::DemandForecaster;
pub use regressors::{Estimator, ModelKind, Regressor, TrainingParams};
pub use training::fit_bundle;
