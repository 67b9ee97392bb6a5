use num_complex::Complex64;

use super::model::{ParamCombination, RunId};
use crate::error::{Error, Result};

/// A provider of simulation results.
///
/// Mirrors what the simulator's result reader exposes: one shared frequency
/// list, the run identifiers, and per run the S11 trace and the parameter
/// combination it was computed for.
pub trait ResultSource {
    /// Ordered frequency list in GHz.
    fn frequencies(&self) -> Result<Vec<f64>>;

    /// Identifiers of the available runs, in result order.
    fn run_ids(&self) -> Result<Vec<RunId>>;

    /// S11 trace of one run, aligned to [`ResultSource::frequencies`].
    fn s11(&self, run: RunId) -> Result<Vec<Complex64>>;

    /// Parameter combination of one run.
    fn parameters(&self, run: RunId) -> Result<ParamCombination>;
}

/// One run as delivered by a source, before validation.
#[derive(Debug, Clone, Default)]
pub struct RawRun {
    pub id: RunId,
    pub parameters: ParamCombination,
    pub s11: Vec<Complex64>,
}

/// In-memory results, produced by the file loaders.
#[derive(Debug, Clone, Default)]
pub struct SimulationResults {
    pub frequencies: Vec<f64>,
    pub runs: Vec<RawRun>,
}

impl SimulationResults {
    fn run(&self, id: RunId) -> Result<&RawRun> {
        self.runs
            .iter()
            .find(|r| r.id == id)
            .ok_or(Error::UnknownRun(id))
    }
}

impl ResultSource for SimulationResults {
    fn frequencies(&self) -> Result<Vec<f64>> {
        Ok(self.frequencies.clone())
    }

    fn run_ids(&self) -> Result<Vec<RunId>> {
        Ok(self.runs.iter().map(|r| r.id).collect())
    }

    fn s11(&self, run: RunId) -> Result<Vec<Complex64>> {
        Ok(self.run(run)?.s11.clone())
    }

    fn parameters(&self, run: RunId) -> Result<ParamCombination> {
        Ok(self.run(run)?.parameters.clone())
    }
}
