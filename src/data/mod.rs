/// Data layer: telemetry types, range filtering, and upload checks.
///
/// Architecture:
/// ```text
///   GET /plot-data
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Dataset = TimeSeries (battery) + ChannelSet (strain)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐      ┌─────────┐
///   │ projector  │ ◄── │  range   │  date + clock bounds → epoch window
///   └───────────┘      └─────────┘
///        │
///        ▼
///   filtered view + display timestamps → charts
/// ```

pub mod model;
pub mod projector;
pub mod range;
pub mod upload;
