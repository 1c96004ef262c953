//! PredictADH: probability of SIADH from four routine lab values.
//!
//! [`inference`] holds the pure ridge/logistic score. The other modules wrap it
//! in a small actix-web service that serves the calculator page.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;
pub mod stats;

pub use inference::predict;
pub use models::{ClinicalInput, PredictionResult, RiskCategory};
