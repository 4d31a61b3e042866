/// Data layer: core types, loading, coercion and classification.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / .xlsx
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (raw cells)
///   └──────────┘
///        │   + TypeSpec
///        ▼
///   ┌──────────┐
///   │  coerce   │  drop incomplete rows, convert → TypedDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  split by semantic type → ColumnViews
///   └──────────┘
/// ```

pub mod classify;
pub mod coerce;
pub mod loader;
pub mod model;
