use chrono::{DateTime, Utc};

use super::model::{AnomalyAnnotation, ChannelSet, Dataset, TimeSeries};
use super::range::{DisplayZone, RangeFilter, Window};

// ---------------------------------------------------------------------------
// Range filtering
// ---------------------------------------------------------------------------

/// Restrict `primary` and `channels` to the filter's window.
///
/// Unless both bounds are set the data is returned unchanged. Channel samples
/// are kept when the *primary* timestamp at the same index is in the window;
/// samples past the end of the timeline are dropped.
pub fn filter_by_range(
    primary: &TimeSeries,
    channels: &ChannelSet,
    filter: &RangeFilter,
    zone: DisplayZone,
) -> (TimeSeries, ChannelSet) {
    match filter.window(zone) {
        Some(window) => project_window(primary, channels, window),
        None => (primary.clone(), channels.clone()),
    }
}

/// Same as [`filter_by_range`] with an already resolved window.
pub fn project_window(
    primary: &TimeSeries,
    channels: &ChannelSet,
    window: Window,
) -> (TimeSeries, ChannelSet) {
    let timestamps = primary.timestamps();
    let in_window = |i: usize| timestamps.get(i).is_some_and(|&t| window.contains(t));

    let kept: Vec<usize> = (0..timestamps.len()).filter(|&i| in_window(i)).collect();

    let channels = channels
        .iter()
        .map(|(name, values)| {
            let retained = values
                .iter()
                .enumerate()
                .filter(|&(i, _)| in_window(i))
                .map(|(_, &v)| v)
                .collect();
            (name.clone(), retained)
        })
        .collect();

    (primary.select(&kept), channels)
}

// ---------------------------------------------------------------------------
// Display projection
// ---------------------------------------------------------------------------

/// Epoch seconds → display instants (millisecond precision).
///
/// Values that cannot be represented (non-finite, out of range) map to the
/// Unix epoch.
pub fn to_display_timestamps(series: &[f64]) -> Vec<DateTime<Utc>> {
    series
        .iter()
        .map(|&seconds| {
            DateTime::from_timestamp_millis((seconds * 1000.0) as i64).unwrap_or_default()
        })
        .collect()
}

/// Axis / tooltip label for one epoch-second value.
pub fn display_label(seconds: f64, zone: DisplayZone) -> String {
    to_display_timestamps(&[seconds])
        .first()
        .map(|instant| zone.format(*instant, "%m/%d/%Y %H:%M"))
        .unwrap_or_default()
}

/// `[timestamp, value]` points of flagged samples, restricted to `window`.
///
/// `timestamps` and `values` are the unfiltered timeline and channel; the
/// annotation is tail-aligned to `values`. Indices missing from either array
/// are skipped.
pub fn anomaly_markers(
    timestamps: &[f64],
    values: &[f64],
    annotation: &AnomalyAnnotation,
    window: Option<Window>,
) -> Vec<[f64; 2]> {
    annotation
        .flagged_indices(values.len())
        .filter_map(|i| Some([*timestamps.get(i)?, *values.get(i)?]))
        .filter(|[t, _]| window.map_or(true, |w| w.contains(*t)))
        .collect()
}

// ---------------------------------------------------------------------------
// TimeRangeProjector – owned filtering context
// ---------------------------------------------------------------------------

/// Holds the source dataset, the active bounds and the derived view.
///
/// The view is always recomputed from the source; the source is never
/// modified by filtering.
#[derive(Debug, Clone, Default)]
pub struct TimeRangeProjector {
    source: Dataset,
    range: RangeFilter,
    view: Dataset,
    zone: DisplayZone,
}

impl TimeRangeProjector {
    pub fn new(zone: DisplayZone) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    /// Replace the source (after a refetch), re-applying the current bounds.
    pub fn set_source(&mut self, dataset: Dataset) {
        self.source = dataset;
        self.refresh();
    }

    /// Store new bounds and recompute the view.
    pub fn apply_range(&mut self, range: RangeFilter) -> &Dataset {
        self.range = range;
        self.refresh();
        log::debug!(
            "range {:?} keeps {} of {} samples",
            self.window(),
            self.view.primary.len(),
            self.source.primary.len()
        );
        &self.view
    }

    /// Drop the bounds and show the unfiltered source again.
    pub fn clear_range(&mut self) -> &Dataset {
        self.range = RangeFilter::default();
        self.view = self.source.clone();
        &self.view
    }

    fn refresh(&mut self) {
        let (primary, channels) = filter_by_range(
            &self.source.primary,
            &self.source.channels,
            &self.range,
            self.zone,
        );
        self.view = Dataset::new(primary, channels);
    }

    pub fn source(&self) -> &Dataset {
        &self.source
    }

    pub fn view(&self) -> &Dataset {
        &self.view
    }

    pub fn range(&self) -> &RangeFilter {
        &self.range
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// The resolved window, when both bounds are set.
    pub fn window(&self) -> Option<Window> {
        self.range.window(self.zone)
    }

    /// Any bound is stored, so clearing would change something.
    pub fn is_filtered(&self) -> bool {
        !self.range.is_unset()
    }

    /// First and last source timestamps.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let timestamps = self.source.primary.timestamps();
        Some((*timestamps.first()?, *timestamps.last()?))
    }
}
