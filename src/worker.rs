use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use eframe::egui;

use crate::api::client::BackendClient;
use crate::api::models::{
    AnomalyReport, DatabaseSummary, HealthStatus, PlotData, Predictions, UploadKind,
    UploadReceipt,
};
use crate::data::model::Dataset;
use crate::data::upload::UploadCandidate;
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The backend operations the dashboard needs.
pub trait Backend: Send + Sync {
    fn health(&self) -> Result<HealthStatus, ApiError>;
    fn plot_data(&self) -> Result<PlotData, ApiError>;
    fn predictions(&self) -> Result<Predictions, ApiError>;
    fn detect_anomalies(&self, channel: &str) -> Result<AnomalyReport, ApiError>;
    fn verify_data(&self) -> Result<DatabaseSummary, ApiError>;
    fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, ApiError>;
}

impl Backend for BackendClient {
    fn health(&self) -> Result<HealthStatus, ApiError> {
        BackendClient::health(self)
    }
    fn plot_data(&self) -> Result<PlotData, ApiError> {
        BackendClient::plot_data(self)
    }
    fn predictions(&self) -> Result<Predictions, ApiError> {
        BackendClient::predictions(self)
    }
    fn detect_anomalies(&self, channel: &str) -> Result<AnomalyReport, ApiError> {
        BackendClient::detect_anomalies(self, channel)
    }
    fn verify_data(&self) -> Result<DatabaseSummary, ApiError> {
        BackendClient::verify_data(self)
    }
    fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, ApiError> {
        BackendClient::upload(self, candidate)
    }
}

// ---------------------------------------------------------------------------
// Jobs and events
// ---------------------------------------------------------------------------

/// Work requested by the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    /// Health probe, then a full refresh.
    Startup(ChannelChoice),
    /// Refetch data, summary, predictions and anomalies.
    Reload(ChannelChoice),
    /// Upload a file, then refetch whatever it affects.
    Upload {
        candidate: UploadCandidate,
        channels: ChannelChoice,
    },
    Anomalies { channel: String },
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Startup(_) => "startup",
            Self::Reload(_) => "reload",
            Self::Upload { .. } => "upload",
            Self::Anomalies { .. } => "anomalies",
        }
    }
}

/// Strain channels on offer and the one on screen when a job was queued.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelChoice {
    pub options: Vec<String>,
    pub selected: String,
}

impl ChannelChoice {
    /// Channel whose anomaly report to fetch after loading `dataset`.
    fn anomaly_channel<'a>(&'a self, dataset: &Dataset) -> Option<&'a str> {
        dataset.preferred_channel(&self.selected, &self.options)
    }
}

/// Which part of a `/predict` response the UI should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionScope {
    All,
    Battery,
    Strain,
}

/// Results delivered back to the UI thread.
#[derive(Debug)]
pub enum Event {
    BackendOnline(String),
    DataLoaded(Dataset),
    /// Loading existing data failed (empty database, backend down).
    DataUnavailable(String),
    Summary(DatabaseSummary),
    Uploaded {
        kind: UploadKind,
        receipt: UploadReceipt,
    },
    UploadFailed {
        kind: UploadKind,
        error: ApiError,
    },
    UploadFinished(UploadKind),
    Predictions {
        scope: PredictionScope,
        predictions: Predictions,
    },
    Anomalies {
        channel: String,
        report: AnomalyReport,
    },
    /// A secondary request failed; logged, never shown as a banner.
    RequestFailed {
        what: &'static str,
        error: ApiError,
    },
}

// ---------------------------------------------------------------------------
// Job execution
// ---------------------------------------------------------------------------

/// Run one job to completion, emitting events as results arrive.
pub fn run(backend: &dyn Backend, job: Job, emit: &dyn Fn(Event)) {
    match job {
        Job::Startup(channels) => {
            match backend.health() {
                Ok(status) => emit(Event::BackendOnline(status.message)),
                Err(error) => emit(Event::RequestFailed {
                    what: "health check",
                    error,
                }),
            }
            refresh(backend, &channels, emit);
        }
        Job::Reload(channels) => refresh(backend, &channels, emit),
        Job::Upload {
            candidate,
            channels,
        } => {
            upload(backend, &candidate, &channels, emit);
            emit(Event::UploadFinished(candidate.kind));
        }
        Job::Anomalies { channel } => fetch_anomalies(backend, &channel, emit),
    }
}

fn refresh(backend: &dyn Backend, channels: &ChannelChoice, emit: &dyn Fn(Event)) {
    let Some(dataset) = load_dataset(backend, emit) else {
        return;
    };
    fetch_summary(backend, emit);
    if dataset.is_empty() {
        return;
    }
    fetch_predictions(backend, PredictionScope::All, emit);
    if let Some(channel) = channels.anomaly_channel(&dataset) {
        fetch_anomalies(backend, channel, emit);
    }
}

fn upload(
    backend: &dyn Backend,
    candidate: &UploadCandidate,
    channels: &ChannelChoice,
    emit: &dyn Fn(Event),
) {
    let kind = candidate.kind;
    match backend.upload(candidate) {
        Ok(receipt) => {
            log::info!(
                "{kind} upload accepted: {} rows ({} rejected)",
                receipt.success_count,
                receipt.error_count
            );
            emit(Event::Uploaded { kind, receipt });
        }
        Err(error) => {
            log::warn!("{kind} upload failed: {error}");
            emit(Event::UploadFailed { kind, error });
            return;
        }
    }

    let Some(dataset) = load_dataset(backend, emit) else {
        return;
    };
    fetch_summary(backend, emit);

    match kind {
        UploadKind::Battery => {
            if dataset.primary.has_values() {
                fetch_predictions(backend, PredictionScope::Battery, emit);
            }
        }
        UploadKind::Strain => {
            if let Some(channel) = channels.anomaly_channel(&dataset) {
                fetch_predictions(backend, PredictionScope::Strain, emit);
                fetch_anomalies(backend, channel, emit);
            }
        }
    }
}

/// Fetch `/plot-data` and emit it. Returns the dataset for follow-up calls.
fn load_dataset(backend: &dyn Backend, emit: &dyn Fn(Event)) -> Option<Dataset> {
    let result = backend
        .plot_data()
        .and_then(|data| Dataset::try_from(data).map_err(|e| ApiError::Decode(e.to_string())));

    match result {
        Ok(dataset) => {
            log::info!(
                "Loaded {} timestamps and {} strain channels",
                dataset.primary.len(),
                dataset.channels.values().filter(|v| !v.is_empty()).count()
            );
            emit(Event::DataLoaded(dataset.clone()));
            Some(dataset)
        }
        Err(error) => {
            log::info!("No existing data loaded: {error}");
            emit(Event::DataUnavailable(error.to_string()));
            None
        }
    }
}

fn fetch_summary(backend: &dyn Backend, emit: &dyn Fn(Event)) {
    match backend.verify_data() {
        Ok(summary) => emit(Event::Summary(summary)),
        Err(error) => emit(Event::RequestFailed {
            what: "database summary",
            error,
        }),
    }
}

fn fetch_predictions(backend: &dyn Backend, scope: PredictionScope, emit: &dyn Fn(Event)) {
    match backend.predictions() {
        Ok(predictions) => emit(Event::Predictions { scope, predictions }),
        Err(error) => emit(Event::RequestFailed {
            what: "predictions",
            error,
        }),
    }
}

fn fetch_anomalies(backend: &dyn Backend, channel: &str, emit: &dyn Fn(Event)) {
    match backend.detect_anomalies(channel) {
        Ok(report) => emit(Event::Anomalies {
            channel: channel.to_string(),
            report,
        }),
        Err(error) => emit(Event::RequestFailed {
            what: "anomaly detection",
            error,
        }),
    }
}

// ---------------------------------------------------------------------------
// Worker – one thread per job, events over a channel
// ---------------------------------------------------------------------------

/// Runs jobs off the UI thread. Jobs are independent: each gets its own
/// thread and their results may arrive in any order.
pub struct Worker {
    backend: Arc<dyn Backend>,
    ctx: egui::Context,
    tx: Sender<Event>,
    rx: Receiver<Event>,
}

impl Worker {
    pub fn new(backend: Arc<dyn Backend>, ctx: egui::Context) -> Self {
        let (tx, rx) = unbounded();
        Self {
            backend,
            ctx,
            tx,
            rx,
        }
    }

    pub fn submit(&self, job: Job) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        let name = job.name();

        let spawned = std::thread::Builder::new()
            .name(format!("backend-{name}"))
            .spawn(move || {
                let emit = |event: Event| {
                    // The receiver only goes away when the app shuts down.
                    if tx.send(event).is_ok() {
                        ctx.request_repaint();
                    }
                };
                run(backend.as_ref(), job, &emit);
            });

        if let Err(e) = spawned {
            log::error!("Failed to start {name} request thread: {e}");
        }
    }

    /// Events received since the last call.
    pub fn drain(&self) -> Vec<Event> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;

    /// Canned backend that records the calls it receives.
    #[derive(Default)]
    pub(crate) struct StubBackend {
        pub plot: Option<PlotData>,
        pub fail_upload: bool,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubBackend {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Backend for StubBackend {
        fn health(&self) -> Result<HealthStatus, ApiError> {
            self.record("health");
            Ok(HealthStatus {
                message: "Server is running".to_string(),
            })
        }
        fn plot_data(&self) -> Result<PlotData, ApiError> {
            self.record("plot-data");
            self.plot.clone().ok_or_else(|| {
                ApiError::Backend(
                    "No data available in the database. Please upload data first.".to_string(),
                )
            })
        }
        fn predictions(&self) -> Result<Predictions, ApiError> {
            self.record("predict");
            Ok(Predictions::default())
        }
        fn detect_anomalies(&self, channel: &str) -> Result<AnomalyReport, ApiError> {
            self.record(format!("anomalies {channel}"));
            Ok(AnomalyReport {
                is_anomaly: vec![false, true],
                anomaly_dates: vec!["2024-03-01".to_string()],
                threshold: Some(0.05),
                reconstruction_error: Vec::new(),
            })
        }
        fn verify_data(&self) -> Result<DatabaseSummary, ApiError> {
            self.record("verify-data");
            Ok(DatabaseSummary::default())
        }
        fn upload(&self, candidate: &UploadCandidate) -> Result<UploadReceipt, ApiError> {
            self.record(format!("upload {}", candidate.kind.form_value()));
            if self.fail_upload {
                return Err(ApiError::Backend("TIMESTAMP column not found in CSV".to_string()));
            }
            Ok(UploadReceipt {
                success_count: 3,
                error_count: 0,
                database_count: Some(3),
                message: None,
            })
        }
    }

    pub(crate) fn strain_plot() -> PlotData {
        PlotData {
            timestamps: vec![100.0, 200.0],
            battv: Vec::new(),
            strains: [
                ("Strain(1)".to_string(), Vec::new()),
                ("Strain(2)".to_string(), vec![1.0, 2.0]),
            ]
            .into(),
        }
    }

    fn run_collect(backend: &StubBackend, job: Job) -> Vec<Event> {
        let events = RefCell::new(Vec::new());
        run(backend, job, &|event: Event| events.borrow_mut().push(event));
        events.into_inner()
    }

    fn candidate(kind: UploadKind) -> UploadCandidate {
        UploadCandidate {
            path: PathBuf::from("strain.csv"),
            kind,
            columns: vec!["TIMESTAMP".to_string(), "Strain(2)".to_string()],
        }
    }

    fn channels() -> ChannelChoice {
        choice("Strain(1)")
    }

    fn choice(selected: &str) -> ChannelChoice {
        ChannelChoice {
            options: crate::data::model::strain_channel_names(17),
            selected: selected.to_string(),
        }
    }

    #[test]
    fn startup_with_empty_database_stops_after_plot_data() {
        let backend = StubBackend::default();
        let events = run_collect(&backend, Job::Startup(channels()));

        assert_eq!(backend.calls(), vec!["health", "plot-data"]);
        assert!(matches!(events[0], Event::BackendOnline(_)));
        assert!(matches!(events[1], Event::DataUnavailable(_)));
    }

    #[test]
    fn reload_fetches_anomalies_for_first_channel_with_data() {
        let backend = StubBackend {
            plot: Some(strain_plot()),
            ..StubBackend::default()
        };
        let events = run_collect(&backend, Job::Reload(channels()));

        assert_eq!(
            backend.calls(),
            vec!["plot-data", "verify-data", "predict", "anomalies Strain(2)"]
        );
        assert!(events.iter().any(|e| matches!(
            e,
            Event::Predictions {
                scope: PredictionScope::All,
                ..
            }
        )));
    }

    #[test]
    fn strain_upload_chain() {
        let backend = StubBackend {
            plot: Some(strain_plot()),
            ..StubBackend::default()
        };
        let events = run_collect(
            &backend,
            Job::Upload {
                candidate: candidate(UploadKind::Strain),
                channels: channels(),
            },
        );

        assert_eq!(
            backend.calls(),
            vec![
                "upload strain",
                "plot-data",
                "verify-data",
                "predict",
                "anomalies Strain(2)"
            ]
        );
        assert!(matches!(
            events.first(),
            Some(Event::Uploaded {
                kind: UploadKind::Strain,
                ..
            })
        ));
        assert!(matches!(
            events.last(),
            Some(Event::UploadFinished(UploadKind::Strain))
        ));
    }

    #[test]
    fn battery_upload_without_readings_skips_predictions() {
        let backend = StubBackend {
            plot: Some(strain_plot()),
            ..StubBackend::default()
        };
        run_collect(
            &backend,
            Job::Upload {
                candidate: candidate(UploadKind::Battery),
                channels: channels(),
            },
        );
        assert_eq!(
            backend.calls(),
            vec!["upload battv", "plot-data", "verify-data"]
        );
    }

    #[test]
    fn failed_upload_does_not_refetch() {
        let backend = StubBackend {
            plot: Some(strain_plot()),
            fail_upload: true,
            ..StubBackend::default()
        };
        let events = run_collect(
            &backend,
            Job::Upload {
                candidate: candidate(UploadKind::Strain),
                channels: channels(),
            },
        );

        assert_eq!(backend.calls(), vec!["upload strain"]);
        assert!(matches!(events[0], Event::UploadFailed { .. }));
        assert!(matches!(events[1], Event::UploadFinished(UploadKind::Strain)));
    }

    #[test]
    fn reload_fetches_anomalies_for_selected_channel_when_it_has_data() {
        let mut plot = strain_plot();
        plot.strains.insert("Strain(5)".to_string(), vec![3.0, 4.0]);
        let backend = StubBackend {
            plot: Some(plot),
            ..StubBackend::default()
        };
        run_collect(&backend, Job::Reload(choice("Strain(5)")));
        assert_eq!(backend.calls().last().map(String::as_str), Some("anomalies Strain(5)"));

        // A selection without samples falls back to the first channel with data.
        let backend = StubBackend {
            plot: Some(strain_plot()),
            ..StubBackend::default()
        };
        run_collect(&backend, Job::Reload(choice("Strain(7)")));
        assert_eq!(backend.calls().last().map(String::as_str), Some("anomalies Strain(2)"));
    }
}
