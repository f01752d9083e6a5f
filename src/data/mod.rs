/// Data layer: loading, classification and aggregates.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  identifier / subject / categorical → ScoreTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  total score, average score, ranking
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ analysis  │  the above plus correlation and summaries, per load
///   └──────────┘
/// ```

pub mod aggregate;
pub mod analysis;
pub mod classify;
pub mod error;
pub mod loader;
pub mod model;
