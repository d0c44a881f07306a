use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Response from `GET /plot-data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    #[serde(default)]
    pub timestamps: Vec<f64>,
    #[serde(default)]
    pub battv: Vec<f64>,
    #[serde(default)]
    pub strains: BTreeMap<String, Vec<f64>>,
}

/// What kind of CSV is being uploaded; sent as the `type` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Battery,
    Strain,
}

impl UploadKind {
    pub fn form_value(self) -> &'static str {
        match self {
            Self::Battery => "battv",
            Self::Strain => "strain",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Battery => write!(f, "Battery"),
            Self::Strain => write!(f, "Strain"),
        }
    }
}

/// Response from `POST /upload`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadReceipt {
    pub success_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub database_count: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Regression metrics and forecast for one series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResult {
    pub r2_score: f64,
    pub rmse: f64,
    #[serde(default)]
    pub future_predictions: Vec<f64>,
    /// `good`, `moderate` or `poor`.
    #[serde(default)]
    pub model_quality: Option<String>,
}

/// The backend reports per-series failures inline instead of failing the
/// whole `/predict` call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Prediction {
    Ready(PredictionResult),
    Failed {
        error: String,
        #[serde(default)]
        min_required: Option<u64>,
        #[serde(default)]
        current_points: Option<u64>,
    },
}

impl Prediction {
    /// Human-readable failure text, including the sample shortfall if given.
    pub fn failure_text(&self) -> Option<String> {
        match self {
            Self::Ready(_) => None,
            Self::Failed {
                error,
                min_required: Some(required),
                current_points: Some(current),
            } => Some(format!("{error} ({current} of {required} points)")),
            Self::Failed { error, .. } => Some(error.clone()),
        }
    }
}

/// Response from `GET /predict`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Predictions {
    #[serde(default)]
    pub battery: Option<Prediction>,
    #[serde(default)]
    pub strains: BTreeMap<String, Prediction>,
}

/// Response from `GET /detect-anomalies`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnomalyReport {
    #[serde(default)]
    pub is_anomaly: Vec<bool>,
    #[serde(default)]
    pub anomaly_dates: Vec<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub reconstruction_error: Vec<f64>,
}

/// Response from `GET /`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub message: String,
}

/// Response from `GET /verify-data`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseSummary {
    #[serde(default)]
    pub battery_data_count: u64,
    #[serde(default)]
    pub strain_data_counts: Vec<StrainCount>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrainCount {
    pub strain_type: String,
    pub count: u64,
}

impl DatabaseSummary {
    pub fn strain_total(&self) -> u64 {
        self.strain_data_counts.iter().map(|c| c.count).sum()
    }
}

/// `{"error": "..."}` body used by every endpoint on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
