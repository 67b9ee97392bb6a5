//! Browse, filter and export S11 simulation sweeps.
//!
//! Results are loaded into a [`data::model::Dataset`], narrowed to a
//! frequency window, converted to a display mode and written out as CSV
//! or XLSX by the [`pipeline`]. [`state::Session`] ties the steps together.

pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod state;

pub use error::{Error, Result};
