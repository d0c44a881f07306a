use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate};

use crate::api::models::{AnomalyReport, DatabaseSummary, Prediction, Predictions, UploadKind};
use crate::color::ChannelPalette;
use crate::config::Config;
use crate::data::model::{channel_order, strain_channel_names, AnomalyAnnotation, Dataset};
use crate::data::projector::{anomaly_markers, TimeRangeProjector};
use crate::data::range::{DateTimeBound, RangeFilter};
use crate::data::upload::preflight;
use crate::worker::{ChannelChoice, Event, Job, PredictionScope};

// ---------------------------------------------------------------------------
// Filter form
// ---------------------------------------------------------------------------

/// Contents of the date & time filter form, before it is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeDraft {
    pub start_date: Option<NaiveDate>,
    pub start_clock: String,
    pub end_date: Option<NaiveDate>,
    pub end_clock: String,
}

impl RangeDraft {
    pub fn to_filter(&self) -> RangeFilter {
        let bound = |date: Option<NaiveDate>, clock: &str| {
            date.map(|d| {
                let bound = DateTimeBound::new(d);
                if clock.trim().is_empty() {
                    bound
                } else {
                    bound.with_clock(clock.trim())
                }
            })
        };
        RangeFilter::new(
            bound(self.start_date, &self.start_clock),
            bound(self.end_date, &self.end_clock),
        )
    }

    /// Any field has been filled in.
    pub fn is_touched(&self) -> bool {
        self.start_date.is_some()
            || self.end_date.is_some()
            || !self.start_clock.trim().is_empty()
            || !self.end_clock.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Anomaly report for one channel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyView {
    pub annotation: AnomalyAnnotation,
    pub anomaly_dates: Vec<String>,
    pub threshold: Option<f64>,
}

impl AnomalyView {
    pub fn from_report(channel: impl Into<String>, report: AnomalyReport) -> Self {
        Self {
            annotation: AnomalyAnnotation::new(channel, report.is_anomaly),
            anomaly_dates: report.anomaly_dates,
            threshold: report.threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Source dataset, active bounds and the filtered view.
    pub projector: TimeRangeProjector,

    /// Strain channels offered in the selector, in natural order.
    pub channel_options: Vec<String>,
    pub selected_channel: String,
    pub palette: ChannelPalette,

    pub predictions: Predictions,
    /// Anomaly reports by channel, for the current dataset.
    pub anomalies: BTreeMap<String, AnomalyView>,
    pub summary: Option<DatabaseSummary>,

    pub draft: RangeDraft,
    pub filter_window_open: bool,

    /// Error banner.
    pub error_message: Option<String>,
    /// Success banner.
    pub success_message: Option<String>,
    /// Informational note about the active filter.
    pub filter_notice: Option<String>,

    /// Upload currently in progress.
    pub uploading: Option<UploadKind>,
    pub backend_status: Option<String>,
    pub compact: bool,

    /// Jobs queued for the worker; drained by the app every frame.
    pending_jobs: Vec<Job>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let channel_options = strain_channel_names(config.strain_channels);
        let selected_channel = channel_options.first().cloned().unwrap_or_default();
        Self {
            projector: TimeRangeProjector::new(config.zone),
            palette: ChannelPalette::new(&channel_options),
            channel_options,
            selected_channel,
            predictions: Predictions::default(),
            anomalies: BTreeMap::new(),
            summary: None,
            draft: RangeDraft::default(),
            filter_window_open: false,
            error_message: None,
            success_message: None,
            filter_notice: None,
            uploading: None,
            backend_status: None,
            compact: config.compact,
            pending_jobs: Vec::new(),
        }
    }

    /// Queue the initial health probe and data load.
    pub fn startup(&mut self) {
        self.pending_jobs.push(Job::Startup(self.channel_choice()));
    }

    pub fn reload(&mut self) {
        self.pending_jobs.push(Job::Reload(self.channel_choice()));
    }

    fn channel_choice(&self) -> ChannelChoice {
        ChannelChoice {
            options: self.channel_options.clone(),
            selected: self.selected_channel.clone(),
        }
    }

    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.pending_jobs)
    }

    pub fn has_data(&self) -> bool {
        !self.projector.source().is_empty()
    }

    pub fn has_battery_data(&self) -> bool {
        self.projector.source().primary.has_values()
    }

    pub fn selected_has_data(&self) -> bool {
        !self.projector.source().channel(&self.selected_channel).is_empty()
    }

    /// Ingest a freshly fetched dataset. The selected channel is kept while it
    /// has samples; otherwise the first channel with data is selected.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let mut unknown: Vec<String> = dataset
            .channels
            .keys()
            .filter(|name| !self.channel_options.contains(name))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            self.channel_options.append(&mut unknown);
            self.channel_options.sort_by(|a, b| channel_order(a, b));
            self.palette = ChannelPalette::new(&self.channel_options);
        }

        let preferred = dataset
            .preferred_channel(&self.selected_channel, &self.channel_options)
            .map(str::to_string);
        if let Some(channel) = preferred {
            if channel != self.selected_channel {
                log::info!(
                    "Auto-selected {channel} with {} data points",
                    dataset.channel(&channel).len()
                );
                self.selected_channel = channel;
            }
        }

        // Flags are tail-aligned to the old samples; refetched per channel.
        self.anomalies.clear();
        self.projector.set_source(dataset);
    }

    /// Switch the strain channel, fetching its anomaly report if it has data.
    pub fn select_channel(&mut self, channel: &str) {
        if channel == self.selected_channel {
            return;
        }
        self.selected_channel = channel.to_string();
        if self.selected_has_data() {
            self.pending_jobs.push(Job::Anomalies {
                channel: channel.to_string(),
            });
        }
    }

    /// Check a file locally and queue its upload.
    pub fn begin_upload(&mut self, path: &Path, kind: UploadKind) {
        if self.uploading.is_some() {
            return;
        }
        self.error_message = None;
        self.success_message = None;

        match preflight(path, kind) {
            Ok(candidate) => {
                log::info!("Uploading {} as {kind} data", path.display());
                self.uploading = Some(kind);
                let channels = self.channel_choice();
                self.pending_jobs.push(Job::Upload {
                    candidate,
                    channels,
                });
            }
            Err(e) => {
                log::warn!("Rejected upload {}: {e}", path.display());
                self.error_message = Some(e.to_string());
            }
        }
    }

    // -- Date & time filter --

    /// Whether "Clear filter" should be offered.
    pub fn filter_active(&self) -> bool {
        self.draft.is_touched() || self.projector.is_filtered()
    }

    /// Apply the form contents to the view and close the filter window.
    pub fn apply_filter(&mut self) {
        let filter = self.draft.to_filter();
        self.filter_notice = if filter.is_half_open() {
            Some("Set both a start and an end date to filter; showing all data.".to_string())
        } else {
            None
        };

        let kept = self.projector.apply_range(filter).primary.len();
        if self.projector.window().is_some() && kept == 0 {
            self.filter_notice = Some("No samples fall inside the selected range.".to_string());
        }
        self.filter_window_open = false;
    }

    pub fn clear_filter(&mut self) {
        self.draft = RangeDraft::default();
        self.filter_notice = None;
        self.projector.clear_range();
    }

    /// Default dates offered when a date field is switched on: the first and
    /// last day of the data, or today.
    pub fn default_dates(&self) -> (NaiveDate, NaiveDate) {
        let zone = self.projector.zone();
        let to_date = |seconds: f64| {
            DateTime::from_timestamp(seconds as i64, 0).map(|instant| zone.date_of(instant))
        };
        let today = chrono::Local::now().date_naive();
        match self.projector.extent() {
            Some((first, last)) => (
                to_date(first).unwrap_or(today),
                to_date(last).unwrap_or(today),
            ),
            None => (today, today),
        }
    }

    // -- Derived views for rendering --

    pub fn battery_prediction(&self) -> Option<&Prediction> {
        self.predictions.battery.as_ref()
    }

    pub fn strain_prediction(&self) -> Option<&Prediction> {
        self.predictions.strains.get(&self.selected_channel)
    }

    /// Anomaly report for the selected channel.
    pub fn selected_anomalies(&self) -> Option<&AnomalyView> {
        self.anomalies.get(&self.selected_channel)
    }

    /// Anomaly marker points for the selected channel inside the active window.
    pub fn anomaly_points(&self) -> Vec<[f64; 2]> {
        let Some(view) = self.selected_anomalies() else {
            return Vec::new();
        };
        let source = self.projector.source();
        anomaly_markers(
            source.primary.timestamps(),
            source.channel(&self.selected_channel),
            &view.annotation,
            self.projector.window(),
        )
    }

    // -- Worker results --

    pub fn apply_event(&mut self, event: Event) {
        match event {
            Event::BackendOnline(message) => {
                log::info!("Backend reachable: {message}");
                self.backend_status = Some(message);
            }
            Event::DataLoaded(dataset) => self.set_dataset(dataset),
            Event::DataUnavailable(reason) => {
                log::info!("No existing data found or error loading data: {reason}");
            }
            Event::Summary(summary) => self.summary = Some(summary),
            Event::Uploaded { kind, receipt } => {
                self.success_message = Some(format!(
                    "{kind} data processed successfully: {} rows processed",
                    receipt.success_count
                ));
            }
            Event::UploadFailed { kind, error } => {
                self.error_message = Some(format!(
                    "Failed to upload {} data: {error}",
                    kind.to_string().to_lowercase()
                ));
            }
            Event::UploadFinished(_) => self.uploading = None,
            Event::Predictions { scope, predictions } => match scope {
                PredictionScope::All => self.predictions = predictions,
                PredictionScope::Battery => self.predictions.battery = predictions.battery,
                PredictionScope::Strain => self.predictions.strains = predictions.strains,
            },
            Event::Anomalies { channel, report } => {
                let view = AnomalyView::from_report(channel.clone(), report);
                self.anomalies.insert(channel, view);
            }
            Event::RequestFailed { what, error } => {
                log::warn!("Error fetching {what}: {error}");
            }
        }
    }
}
