use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::api::models::PlotData;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// TimeSeries – one timestamp column with its value column
// ---------------------------------------------------------------------------

/// Timestamps (epoch seconds) paired by index with one value column.
///
/// `values` is either empty, meaning the series only carries a timeline, or
/// exactly as long as `timestamps`. The backend sends a timeline without
/// battery readings when only strain data has been uploaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<f64>,
    values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<f64>, values: Vec<f64>) -> Result<Self, DataError> {
        if !values.is_empty() && values.len() != timestamps.len() {
            return Err(DataError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        Ok(Self { timestamps, values })
    }

    /// A series with timestamps only.
    pub fn timeline(timestamps: Vec<f64>) -> Self {
        Self {
            timestamps,
            values: Vec::new(),
        }
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Keep only the samples at `indices` (which must be in bounds), in order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        let timestamps = indices.iter().map(|&i| self.timestamps[i]).collect();
        let values = if self.has_values() {
            indices.iter().map(|&i| self.values[i]).collect()
        } else {
            Vec::new()
        };
        Self { timestamps, values }
    }

    /// `[timestamp, value]` pairs for plotting. Empty for a bare timeline.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&t, &v)| [t, v])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ChannelSet / Dataset
// ---------------------------------------------------------------------------

/// Channel name → values, aligned by index with the primary timestamps.
///
/// Lengths are not enforced: the backend drops invalid readings per channel,
/// so a channel may be shorter (or longer) than the timeline.
pub type ChannelSet = BTreeMap<String, Vec<f64>>;

/// Battery series plus strain channels, as served by `/plot-data`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub primary: TimeSeries,
    pub channels: ChannelSet,
}

impl Dataset {
    pub fn new(primary: TimeSeries, channels: ChannelSet) -> Self {
        Self { primary, channels }
    }

    /// No timestamps and no channel samples.
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.channels.values().all(Vec::is_empty)
    }

    /// Values of one channel; empty when the channel is unknown.
    pub fn channel(&self, name: &str) -> &[f64] {
        self.channels.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First of `candidates` that has at least one sample.
    pub fn first_channel_with_data<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .find(|name| !self.channel(name).is_empty())
            .map(String::as_str)
    }

    /// `selected` if it has samples here, otherwise the first candidate that does.
    pub fn preferred_channel<'a>(
        &self,
        selected: &'a str,
        candidates: &'a [String],
    ) -> Option<&'a str> {
        if self.channel(selected).is_empty() {
            self.first_channel_with_data(candidates)
        } else {
            Some(selected)
        }
    }

    /// `[timestamp, value]` pairs for a channel, stopping at whichever of the
    /// timeline or the channel runs out first.
    pub fn channel_points(&self, name: &str) -> Vec<[f64; 2]> {
        self.primary
            .timestamps()
            .iter()
            .zip(self.channel(name))
            .map(|(&t, &v)| [t, v])
            .collect()
    }
}

impl TryFrom<PlotData> for Dataset {
    type Error = DataError;

    fn try_from(data: PlotData) -> Result<Self, Self::Error> {
        let primary = TimeSeries::new(data.timestamps, data.battv)?;
        Ok(Self::new(primary, data.strains))
    }
}

// ---------------------------------------------------------------------------
// Channel naming
// ---------------------------------------------------------------------------

/// `Strain(1)` .. `Strain(count)`.
pub fn strain_channel_names(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Strain({i})")).collect()
}

/// Number inside the parentheses of a name like `Strain(12)`.
fn channel_number(name: &str) -> Option<u32> {
    let open = name.find('(')?;
    let close = name[open..].find(')')? + open;
    name[open + 1..close].trim().parse().ok()
}

/// Natural order for channel names, so `Strain(2)` sorts before `Strain(10)`.
pub fn channel_order(a: &str, b: &str) -> Ordering {
    match (channel_number(a), channel_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// AnomalyAnnotation
// ---------------------------------------------------------------------------

/// Per-sample anomaly flags for one channel, as computed by the backend.
///
/// The backend scores sliding windows, so it may return fewer flags than the
/// channel has samples; the flags line up with the *tail* of the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyAnnotation {
    channel: String,
    flags: Vec<bool>,
}

impl AnomalyAnnotation {
    pub fn new(channel: impl Into<String>, flags: Vec<bool>) -> Self {
        Self {
            channel: channel.into(),
            flags,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// One flag per scored window.
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn flagged_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Sample indices flagged as anomalous in a channel of `sample_count` samples.
    pub fn flagged_indices(&self, sample_count: usize) -> impl Iterator<Item = usize> + '_ {
        let flag_count = self.flags.len();
        self.flags
            .iter()
            .enumerate()
            .filter(|&(_, &flagged)| flagged)
            .filter_map(move |(k, _)| (k + sample_count).checked_sub(flag_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_series_rejects_misaligned_columns() {
        let err = TimeSeries::new(vec![1.0, 2.0, 3.0], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            DataError::LengthMismatch {
                timestamps: 3,
                values: 1
            }
        );
    }

    #[test]
    fn time_series_accepts_bare_timeline() {
        let series = TimeSeries::new(vec![1.0, 2.0], Vec::new()).unwrap();
        assert!(!series.has_values());
        assert_eq!(series.len(), 2);
        assert!(series.points().is_empty());
    }

    #[test]
    fn dataset_from_plot_data() {
        let data = PlotData {
            timestamps: vec![100.0, 200.0],
            battv: vec![12.5, 12.4],
            strains: [("Strain(1)".to_string(), vec![1.0, 2.0])].into(),
        };
        let dataset = Dataset::try_from(data).unwrap();
        assert_eq!(dataset.primary.values(), &[12.5, 12.4]);
        assert_eq!(dataset.channel("Strain(1)"), &[1.0, 2.0]);
        assert!(dataset.channel("Strain(9)").is_empty());
        assert!(!dataset.is_empty());
    }

    #[test]
    fn dataset_with_only_empty_channels_is_empty() {
        let dataset = Dataset::new(
            TimeSeries::default(),
            [("Strain(1)".to_string(), Vec::new())].into(),
        );
        assert!(dataset.is_empty());
    }

    #[test]
    fn first_channel_with_data_follows_candidate_order() {
        let dataset = Dataset::new(
            TimeSeries::timeline(vec![1.0]),
            [
                ("Strain(1)".to_string(), Vec::new()),
                ("Strain(3)".to_string(), vec![0.5]),
                ("Strain(10)".to_string(), vec![0.7]),
            ]
            .into(),
        );
        let names = strain_channel_names(17);
        assert_eq!(dataset.first_channel_with_data(&names), Some("Strain(3)"));
        assert_eq!(dataset.first_channel_with_data(&names[..2]), None);

        assert_eq!(dataset.preferred_channel("Strain(10)", &names), Some("Strain(10)"));
        assert_eq!(dataset.preferred_channel("Strain(1)", &names), Some("Strain(3)"));
        assert_eq!(dataset.preferred_channel("Strain(1)", &names[..2]), None);
    }

    #[test]
    fn channel_points_stop_at_shorter_column() {
        let dataset = Dataset::new(
            TimeSeries::timeline(vec![1.0, 2.0, 3.0]),
            [("Strain(1)".to_string(), vec![10.0, 20.0])].into(),
        );
        assert_eq!(
            dataset.channel_points("Strain(1)"),
            vec![[1.0, 10.0], [2.0, 20.0]]
        );
    }

    #[test]
    fn channels_sort_naturally() {
        let mut names = vec!["Strain(10)", "Strain(2)", "BattV", "Strain(1)"];
        names.sort_by(|a, b| channel_order(a, b));
        assert_eq!(names, vec!["Strain(1)", "Strain(2)", "Strain(10)", "BattV"]);
    }

    #[test]
    fn anomaly_flags_align_to_tail() {
        // 3 flags over 5 samples: flag k belongs to sample k + 2.
        let annotation = AnomalyAnnotation::new("Strain(1)", vec![true, false, true]);
        let indices: Vec<usize> = annotation.flagged_indices(5).collect();
        assert_eq!(indices, vec![2, 4]);
        assert_eq!(annotation.flagged_count(), 2);
        assert_eq!(annotation.flags().len(), 3);
    }

    #[test]
    fn anomaly_flags_longer_than_channel_drop_leading_flags() {
        let annotation = AnomalyAnnotation::new("Strain(1)", vec![true, true, false, true]);
        let indices: Vec<usize> = annotation.flagged_indices(2).collect();
        // Flags 2 and 3 map to samples 0 and 1; only flag 3 is set.
        assert_eq!(indices, vec![1]);
    }
}
