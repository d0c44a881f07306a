use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

// ---------------------------------------------------------------------------
// DisplayZone – where wall-clock bounds and axis labels live
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

impl DisplayZone {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "utc" | "z" => Some(Self::Utc),
            _ => None,
        }
    }

    /// Epoch seconds of a wall-clock time in this zone.
    ///
    /// `None` when the time does not exist in the zone (DST gap). Ambiguous
    /// times resolve to the earlier instant.
    pub fn epoch_seconds(self, wall: NaiveDateTime) -> Option<f64> {
        match self {
            Self::Local => earliest_seconds(Local.from_local_datetime(&wall)),
            Self::Utc => Some(wall.and_utc().timestamp() as f64),
        }
    }

    /// Calendar date of an instant in this zone.
    pub fn date_of(self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Self::Local => instant.with_timezone(&Local).date_naive(),
            Self::Utc => instant.date_naive(),
        }
    }

    pub fn format(self, instant: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(fmt).to_string(),
            Self::Utc => instant.format(fmt).to_string(),
        }
    }
}

fn earliest_seconds<Tz: TimeZone>(resolved: LocalResult<DateTime<Tz>>) -> Option<f64> {
    resolved.earliest().map(|instant| instant.timestamp() as f64)
}

// ---------------------------------------------------------------------------
// DateTimeBound – one side of a range filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundEdge {
    Start,
    End,
}

impl BoundEdge {
    /// Seconds component applied when a clock time is given. The end edge is
    /// pinned to :59 so the final minute is included.
    fn seconds(self) -> u32 {
        match self {
            Self::Start => 0,
            Self::End => 59,
        }
    }
}

/// A calendar date with an optional `HH:MM` clock time.
///
/// The clock text is kept as typed; it is only interpreted when the bound is
/// resolved, and unparsable text resolves to an invalid instant (NaN).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeBound {
    pub date: NaiveDate,
    pub clock: Option<String>,
}

impl DateTimeBound {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, clock: None }
    }

    pub fn with_clock(mut self, clock: impl Into<String>) -> Self {
        self.clock = Some(clock.into());
        self
    }

    /// Resolve to epoch seconds. Without a clock time the bound sits at
    /// midnight of its date, whichever edge it is.
    pub fn epoch_seconds(&self, edge: BoundEdge, zone: DisplayZone) -> f64 {
        let clock = self.clock.as_deref().map(str::trim).filter(|c| !c.is_empty());
        let time = match clock {
            None => NaiveTime::MIN,
            Some(text) => match parse_clock(text, edge.seconds()) {
                Some(time) => time,
                None => return f64::NAN,
            },
        };
        zone.epoch_seconds(self.date.and_time(time)).unwrap_or(f64::NAN)
    }
}

/// Parse `HH:MM` (anything after a second colon is ignored).
pub fn parse_clock(text: &str, seconds: u32) -> Option<NaiveTime> {
    let mut parts = text.split(':');
    let hours: u32 = parts.next()?.trim().parse().ok()?;
    let minutes: u32 = parts.next()?.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

// ---------------------------------------------------------------------------
// RangeFilter / Window
// ---------------------------------------------------------------------------

/// Inclusive epoch-second interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f64,
    pub end: f64,
}

impl Window {
    /// Inclusive on both ends. A NaN bound contains nothing.
    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Optional start and end bounds. Filtering only happens when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeFilter {
    pub start: Option<DateTimeBound>,
    pub end: Option<DateTimeBound>,
}

impl RangeFilter {
    pub fn new(start: Option<DateTimeBound>, end: Option<DateTimeBound>) -> Self {
        Self { start, end }
    }

    pub fn between(start: DateTimeBound, end: DateTimeBound) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn is_unset(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Exactly one of the two bounds is set.
    pub fn is_half_open(&self) -> bool {
        self.start.is_some() != self.end.is_some()
    }

    /// The resolved window, or `None` (no filtering) unless both bounds are set.
    pub fn window(&self, zone: DisplayZone) -> Option<Window> {
        let (start, end) = (self.start.as_ref()?, self.end.as_ref()?);
        Some(Window {
            start: start.epoch_seconds(BoundEdge::Start, zone),
            end: end.epoch_seconds(BoundEdge::End, zone),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_only_bounds_sit_at_midnight() {
        let bound = DateTimeBound::new(date(2024, 3, 1));
        // 2024-03-01T00:00:00Z
        assert_eq!(bound.epoch_seconds(BoundEdge::Start, DisplayZone::Utc), 1_709_251_200.0);
        assert_eq!(bound.epoch_seconds(BoundEdge::End, DisplayZone::Utc), 1_709_251_200.0);
    }

    #[test]
    fn clock_overrides_midnight_and_end_is_pinned_to_59() {
        let start = DateTimeBound::new(date(2024, 3, 1)).with_clock("08:30");
        let end = DateTimeBound::new(date(2024, 3, 1)).with_clock("17:45");
        let base = 1_709_251_200.0;

        assert_eq!(
            start.epoch_seconds(BoundEdge::Start, DisplayZone::Utc),
            base + 8.0 * 3600.0 + 30.0 * 60.0
        );
        assert_eq!(
            end.epoch_seconds(BoundEdge::End, DisplayZone::Utc),
            base + 17.0 * 3600.0 + 45.0 * 60.0 + 59.0
        );
    }

    #[test]
    fn blank_clock_text_is_ignored() {
        let bound = DateTimeBound::new(date(2024, 3, 1)).with_clock("  ");
        assert_eq!(bound.epoch_seconds(BoundEdge::End, DisplayZone::Utc), 1_709_251_200.0);
    }

    #[test]
    fn malformed_clock_resolves_to_nan() {
        for text in ["noon", "8", "25:00", "08:75", "ab:cd"] {
            let bound = DateTimeBound::new(date(2024, 3, 1)).with_clock(text);
            assert!(
                bound.epoch_seconds(BoundEdge::Start, DisplayZone::Utc).is_nan(),
                "{text} should not resolve"
            );
        }
    }

    #[test]
    fn parse_clock_accepts_seconds_suffix_and_padding() {
        assert_eq!(parse_clock("7:05", 0), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_clock(" 07 : 05 :30", 59), NaiveTime::from_hms_opt(7, 5, 59));
    }

    #[test]
    fn window_requires_both_bounds() {
        let start = DateTimeBound::new(date(2024, 3, 1));
        assert_eq!(RangeFilter::default().window(DisplayZone::Utc), None);
        assert!(RangeFilter::default().is_unset());

        let half = RangeFilter::new(Some(start.clone()), None);
        assert!(half.is_half_open());
        assert_eq!(half.window(DisplayZone::Utc), None);

        let full = RangeFilter::between(start.clone(), DateTimeBound::new(date(2024, 3, 2)));
        let window = full.window(DisplayZone::Utc).unwrap();
        assert_eq!(window.end - window.start, 86_400.0);
    }

    #[test]
    fn window_is_inclusive_and_nan_contains_nothing() {
        let window = Window { start: 10.0, end: 20.0 };
        assert!(window.contains(10.0));
        assert!(window.contains(20.0));
        assert!(!window.contains(20.5));

        let broken = Window { start: f64::NAN, end: 20.0 };
        assert!(!broken.contains(15.0));
    }

    #[test]
    fn zone_parsing_and_formatting() {
        assert_eq!(DisplayZone::parse("Local"), Some(DisplayZone::Local));
        assert_eq!(DisplayZone::parse("utc"), Some(DisplayZone::Utc));
        assert_eq!(DisplayZone::parse("cet"), None);

        let instant = DateTime::from_timestamp(1_709_280_000, 0).unwrap();
        assert_eq!(
            DisplayZone::Utc.format(instant, "%m/%d/%Y %H:%M"),
            "03/01/2024 08:00"
        );
        assert_eq!(DisplayZone::Utc.date_of(instant), date(2024, 3, 1));
    }

    #[test]
    fn local_bounds_round_trip_through_local_labels() {
        // Noon in mid-January exists exactly once in every zone.
        let wall = date(2024, 1, 15).and_hms_opt(12, 0, 0).unwrap();
        let seconds = DisplayZone::Local.epoch_seconds(wall).unwrap();
        let instant = DateTime::from_timestamp(seconds as i64, 0).unwrap();

        assert_eq!(
            DisplayZone::Local.format(instant, "%m/%d/%Y %H:%M"),
            "01/15/2024 12:00"
        );
        assert_eq!(DisplayZone::Local.date_of(instant), date(2024, 1, 15));

        let bound = DateTimeBound::new(date(2024, 1, 15)).with_clock("12:00");
        assert_eq!(bound.epoch_seconds(BoundEdge::Start, DisplayZone::Local), seconds);
        assert_eq!(bound.epoch_seconds(BoundEdge::End, DisplayZone::Local), seconds + 59.0);
    }

    #[test]
    fn gap_resolves_to_none_and_overlap_to_earlier_instant() {
        let wall = date(2024, 11, 3).and_hms_opt(1, 30, 0).unwrap();
        let edt = FixedOffset::west_opt(4 * 3600).unwrap();
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let first = edt.from_local_datetime(&wall).unwrap();
        let second = est.from_local_datetime(&wall).unwrap();

        assert_eq!(
            earliest_seconds(LocalResult::Ambiguous(first, second)),
            Some(first.timestamp() as f64)
        );
        assert_eq!(
            earliest_seconds(LocalResult::Single(second)),
            Some(second.timestamp() as f64)
        );
        assert_eq!(earliest_seconds::<FixedOffset>(LocalResult::None), None);
    }
}
