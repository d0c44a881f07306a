use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::api::models::{
    AnomalyReport, DatabaseSummary, ErrorBody, HealthStatus, PlotData, Predictions, UploadReceipt,
};
use crate::config::Config;
use crate::data::upload::UploadCandidate;
use crate::error::ApiError;

/// Blocking client for the processing backend. Calls are meant to run on a
/// worker thread, never on the UI thread.
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        // No overall request timeout: prediction and anomaly training can
        // take as long as the backend needs.
        let http_client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /` – liveness probe.
    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get(&self.url("/"))
    }

    /// `GET /plot-data` – every stored battery and strain sample.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the server's message when the
    /// database is empty (404) or the query fails.
    pub fn plot_data(&self) -> Result<PlotData, ApiError> {
        self.get(&self.url("/plot-data"))
    }

    /// `GET /predict` – regression metrics and forecasts for every series.
    pub fn predictions(&self) -> Result<Predictions, ApiError> {
        self.get(&self.url("/predict"))
    }

    /// `GET /detect-anomalies?strain_type=<channel>`.
    pub fn detect_anomalies(&self, channel: &str) -> Result<AnomalyReport, ApiError> {
        let response = self
            .http_client
            .get(self.url("/detect-anomalies"))
            .query(&[("strain_type", channel)])
            .send()
            .map_err(transport)?;
        decode(response)
    }

    /// `GET /verify-data` – row counts per table.
    pub fn verify_data(&self) -> Result<DatabaseSummary, ApiError> {
        self.get(&self.url("/verify-data"))
    }

    /// `POST /upload` as multipart with `file` and `type` fields.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Io` if the file cannot be opened, otherwise the
    /// usual transport/backend errors.
    pub fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, ApiError> {
        let form = multipart::Form::new()
            .text("type", candidate.kind.form_value())
            .file("file", &candidate.path)?;

        let response = self
            .http_client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .map_err(transport)?;
        decode(response)
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self.http_client.get(url).send().map_err(transport)?;
        decode(response)
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .map_err(|e| ApiError::Transport(format!("Failed to read response body: {e}")))?;
    decode_body(status, &text)
}

/// Turn a status and body into a typed value or the most useful error.
///
/// An `{"error": ...}` body wins over the status line, whatever the status.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ApiError> {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(text) {
        return Err(ApiError::Backend(error));
    }

    if !status.is_success() {
        let preview: String = text.chars().take(200).collect();
        return Err(ApiError::Backend(format!("HTTP {status}: {preview}")));
    }

    serde_json::from_str(text).map_err(|e| {
        log::error!(
            "Failed to parse backend response: {e}; body starts with {:?}",
            text.chars().take(500).collect::<String>()
        );
        ApiError::Decode(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_wins_over_status() {
        let err = decode_body::<PlotData>(
            StatusCode::NOT_FOUND,
            r#"{"error": "No data available in the database. Please upload data first."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No data available in the database. Please upload data first."
        );

        // Even with a 200 the error body is surfaced.
        let err = decode_body::<UploadReceipt>(StatusCode::OK, r#"{"error": "bad"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Backend(msg) if msg == "bad"));
    }

    #[test]
    fn non_json_failure_reports_status() {
        let err = decode_body::<PlotData>(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway: upstream down");
    }

    #[test]
    fn malformed_success_is_decode_error() {
        let err = decode_body::<UploadReceipt>(StatusCode::OK, r#"{"rows": 3}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn success_body_decodes() {
        let receipt: UploadReceipt = decode_body(
            StatusCode::OK,
            r#"{"message": "File processed", "success_count": 42, "error_count": 1, "database_count": 42}"#,
        )
        .unwrap();
        assert_eq!(receipt.success_count, 42);
        assert_eq!(receipt.database_count, Some(42));
    }

    #[test]
    fn urls_join_base_and_path() {
        let config = Config {
            api_url: "http://bridge.local:5001".to_string(),
            ..Config::default()
        };
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(client.url("/plot-data"), "http://bridge.local:5001/plot-data");
        assert_eq!(client.base_url(), "http://bridge.local:5001");
    }
}
