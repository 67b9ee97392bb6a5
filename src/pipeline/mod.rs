//! Result transformation pipeline.
//!
//! ```text
//!   Dataset
//!      │
//!      ▼
//!   range     frequency window, falls back to the full series
//!      │
//!      ├──────► decimate   preview only
//!      ▼
//!   table     records × selected columns, display-mode conversion
//!      │
//!      ▼
//!   export    CSV / XLSX
//! ```

pub mod decimate;
pub mod display;
pub mod export;
pub mod range;
pub mod summary;
pub mod table;
