/// Data layer: core types, result sources and loading.
///
/// Architecture:
/// ```text
///  .json / .csv / .parquet        (.cst → external library)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SimulationResults
///   └──────────┘
///        │  ResultSource
///        ▼
///   ┌──────────┐
///   │  Dataset  │  shared frequencies, Vec<Run>, parameter names
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod source;
