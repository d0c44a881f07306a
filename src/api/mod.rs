//! HTTP access to the processing backend (upload, plot data, predictions,
//! anomaly detection).

pub mod client;
pub mod models;
