//! Tourism analytics core.
//!
//! Demand forecasting over daily visitor observations, review sentiment
//! scoring, chat intent classification and the per-business dashboards built
//! on them. [`api`] exposes everything over a REST API.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forecasting;
pub mod intent;
pub mod models;
pub mod sentiment;
pub mod services;

pub use error::{Result, TourismError};
