use std::fmt;

use super::display::magnitude_db;
use crate::data::model::{Dataset, ParamCombination};

/// Deepest S11 dip over all runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimumS11 {
    pub db: f64,
    pub frequency: f64,
    pub parameters: ParamCombination,
}

/// Overview of a loaded dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub frequency_range: Option<(f64, f64)>,
    pub n_points: usize,
    pub n_runs: usize,
    pub parameter_names: Vec<String>,
    /// `None` when every sample has zero magnitude or there are no samples.
    pub minimum: Option<MinimumS11>,
}

impl Summary {
    pub fn of(dataset: &Dataset) -> Self {
        let mut minimum: Option<MinimumS11> = None;
        for run in dataset.runs() {
            for (&frequency, &z) in dataset.frequencies().iter().zip(&run.s11) {
                let Some(db) = magnitude_db(z) else { continue };
                if minimum.as_ref().map_or(true, |m| db < m.db) {
                    minimum = Some(MinimumS11 {
                        db,
                        frequency,
                        parameters: run.parameters.clone(),
                    });
                }
            }
        }

        Summary {
            frequency_range: dataset.frequency_bounds(),
            n_points: dataset.n_points(),
            n_runs: dataset.len(),
            parameter_names: dataset.parameter_names().to_vec(),
            minimum,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Data Summary ===")?;
        if let Some((lo, hi)) = self.frequency_range {
            writeln!(f, "Frequency Range: {lo:.6} GHz to {hi:.6} GHz")?;
        }
        writeln!(f, "Number of Frequency Points: {}", self.n_points)?;
        writeln!(f, "Parameter Combinations: {}", self.n_runs)?;
        if !self.parameter_names.is_empty() {
            writeln!(f, "Parameters: {}", self.parameter_names.join(", "))?;
        }
        if let Some(m) = &self.minimum {
            writeln!(f, "Minimum S11: {:.2} dB at {:.6} GHz", m.db, m.frequency)?;
            if !m.parameters.is_empty() {
                let params: Vec<String> = m
                    .parameters
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                writeln!(f, "Parameters at minimum S11: {}", params.join(", "))?;
            }
        }
        Ok(())
    }
}
