use std::fmt;

use indexmap::IndexMap;
use num_complex::Complex64;

use super::source::ResultSource;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// ParamValue – a single parameter of a run's combination
// ---------------------------------------------------------------------------

/// A dynamically-typed sweep parameter value.
///
/// Floats compare and hash by bit pattern: long-form rows carrying a `NaN`
/// parameter group into one run, while `0.0` and `-0.0` stay distinct.
#[derive(Debug, Clone)]
pub enum ParamValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Hash so we can key a HashMap with ParamValue --

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        use ParamValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a), Float(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl std::hash::Hash for ParamValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParamValue::String(s) => s.hash(state),
            ParamValue::Integer(i) => i.hash(state),
            ParamValue::Float(f) => f.to_bits().hash(state),
            ParamValue::Bool(b) => b.hash(state),
            ParamValue::Null => {}
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) => write!(f, "{s}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Null => Ok(()),
        }
    }
}

impl ParamValue {
    /// Guess the type of a textual cell (CSV input).
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return ParamValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return ParamValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return ParamValue::Float(f);
        }
        if s == "true" || s == "false" {
            return ParamValue::Bool(s == "true");
        }
        ParamValue::String(s.to_string())
    }
}

/// Parameter name → value for one run, in the order the source lists them.
pub type ParamCombination = IndexMap<String, ParamValue>;

/// Identifier of a simulation run, as reported by the result source.
pub type RunId = u32;

// ---------------------------------------------------------------------------
// Run – one parameter combination and its S11 sweep
// ---------------------------------------------------------------------------

/// One simulation execution under a specific parameter combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: RunId,
    pub parameters: ParamCombination,
    /// S11 samples, aligned index-for-index with the dataset frequencies.
    pub s11: Vec<Complex64>,
}

impl Run {
    /// Value of a parameter, `Null` when the run does not carry it.
    pub fn parameter(&self, name: &str) -> &ParamValue {
        self.parameters.get(name).unwrap_or(&ParamValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – all runs sharing one frequency series
// ---------------------------------------------------------------------------

/// The validated set of runs sharing one frequency axis (GHz).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    frequencies: Vec<f64>,
    runs: Vec<Run>,
    parameter_names: Vec<String>,
}

impl Dataset {
    /// Validate and assemble a dataset.
    ///
    /// Frequencies must be finite and non-decreasing, and every run must
    /// carry exactly one finite S11 sample per frequency.
    pub fn new(frequencies: Vec<f64>, runs: Vec<Run>) -> Result<Self> {
        if let Some(i) = frequencies.iter().position(|f| !f.is_finite()) {
            return Err(Error::InvalidDataset(format!(
                "frequency[{i}] is not finite"
            )));
        }
        if let Some(i) = frequencies.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::InvalidDataset(format!(
                "frequencies are not monotonic at index {}",
                i + 1
            )));
        }
        for run in &runs {
            if run.s11.len() != frequencies.len() {
                return Err(Error::InvalidDataset(format!(
                    "run {} has {} S11 samples but there are {} frequencies",
                    run.id,
                    run.s11.len(),
                    frequencies.len()
                )));
            }
            if let Some(i) = run.s11.iter().position(|z| !z.is_finite()) {
                return Err(Error::InvalidDataset(format!(
                    "run {}: S11[{i}] is not finite",
                    run.id
                )));
            }
        }

        let mut parameter_names: Vec<String> = Vec::new();
        for name in runs.iter().flat_map(|r| r.parameters.keys()) {
            if !parameter_names.contains(name) {
                parameter_names.push(name.clone());
            }
        }

        Ok(Dataset {
            frequencies,
            runs,
            parameter_names,
        })
    }

    /// Pull every run out of a result source and validate the result.
    pub fn from_source<S: ResultSource + ?Sized>(source: &S) -> Result<Self> {
        let frequencies = source.frequencies()?;
        let ids = source.run_ids()?;
        let mut runs = Vec::with_capacity(ids.len());
        for id in ids {
            runs.push(Run {
                id,
                parameters: source.parameters(id)?,
                s11: source.s11(id)?,
            });
        }
        Self::new(frequencies, runs)
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Union of the parameter names over all runs, in first-seen order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the dataset holds no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Number of frequency points per run.
    pub fn n_points(&self) -> usize {
        self.frequencies.len()
    }

    /// `(min, max)` of the frequency series, `None` when it is empty.
    pub fn frequency_bounds(&self) -> Option<(f64, f64)> {
        let first = *self.frequencies.first()?;
        let last = *self.frequencies.last()?;
        Some((first, last))
    }

    /// Keep only the given frequency indices (ascending) in every run.
    pub(crate) fn select_points(&self, indices: &[usize]) -> Dataset {
        let frequencies = indices.iter().map(|&i| self.frequencies[i]).collect();
        let runs = self
            .runs
            .iter()
            .map(|run| Run {
                id: run.id,
                parameters: run.parameters.clone(),
                s11: indices.iter().map(|&i| run.s11[i]).collect(),
            })
            .collect();
        Dataset {
            frequencies,
            runs,
            parameter_names: self.parameter_names.clone(),
        }
    }
}
