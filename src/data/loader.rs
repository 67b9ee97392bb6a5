use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int32Type, Int64Type, UInt32Type,
};
use num_complex::Complex64;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::model::{Dataset, ParamCombination, ParamValue, RunId};
use super::source::{RawRun, SimulationResults};
use crate::config::Config;
use crate::error::Error;
use crate::pipeline::display::{S11_IMAG_HEADER, S11_REAL_HEADER};
use crate::pipeline::table::{FREQUENCY_HEADER, RUN_ID_HEADER};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a result file into a validated [`Dataset`].  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `{ "frequencies": [...], "runs": [{ "id", "parameters", "s11": [[re, im], ...] }] }`
/// * `.csv`     – long-form table (one row per run × frequency), as written by the exporter
/// * `.parquet` – same long-form layout as CSV
/// * `.cst`     – native project, read through the external simulation library
pub fn load_file(path: &Path, config: &Config) -> Result<Dataset> {
    let results = read_results(path, config)?;
    let dataset = Dataset::from_source(&results)
        .with_context(|| format!("validating {}", path.display()))?;
    log::info!(
        "Loaded {} runs × {} frequency points from {}",
        dataset.len(),
        dataset.n_points(),
        path.display()
    );
    Ok(dataset)
}

/// Parse a result file without validating it.
pub fn read_results(path: &Path, config: &Config) -> Result<SimulationResults> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        "cst" => {
            let library = config.validated_library_path()?;
            Err(Error::ExternalReader {
                project: path.to_path_buf(),
                library,
            }
            .into())
        }
        other => Err(Error::UnsupportedFormat(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// JSON result document.
///
/// ```json
/// {
///   "frequencies": [1.0, 1.01, ...],
///   "runs": [
///     { "id": 1, "parameters": { "width": 2.5 }, "s11": [[0.41, -0.12], ...] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub frequencies: Vec<f64>,
    pub runs: Vec<RunDocument>,
}

/// One run inside a [`ResultsDocument`]; `id` defaults to the 1-based position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RunId>,
    #[serde(default)]
    pub parameters: JsonMap<String, JsonValue>,
    /// `[re, im]` pairs.
    pub s11: Vec<[f64; 2]>,
}

fn load_json(path: &Path) -> Result<SimulationResults> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let doc: ResultsDocument = serde_json::from_str(&text).context("parsing JSON")?;

    let runs = doc
        .runs
        .into_iter()
        .enumerate()
        .map(|(i, run)| RawRun {
            id: run.id.unwrap_or(i as RunId + 1),
            parameters: run
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), json_to_param(v)))
                .collect(),
            s11: run.s11.iter().map(|&[re, im]| Complex64::new(re, im)).collect(),
        })
        .collect();

    Ok(SimulationResults {
        frequencies: doc.frequencies,
        runs,
    })
}

fn json_to_param(val: &JsonValue) -> ParamValue {
    match val {
        JsonValue::String(s) => ParamValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParamValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                ParamValue::Float(f)
            } else {
                ParamValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => ParamValue::Bool(*b),
        JsonValue::Null => ParamValue::Null,
        other => ParamValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Long-form tables (CSV, Parquet)
// ---------------------------------------------------------------------------

/// How rows of a long-form table are grouped into runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RunKey {
    Id(RunId),
    Params(Vec<(String, ParamValue)>),
}

#[derive(Debug, Default)]
struct PendingRun {
    key: Option<RunKey>,
    parameters: ParamCombination,
    frequencies: Vec<f64>,
    s11: Vec<Complex64>,
}

/// Collects long-form rows and regroups them into runs sharing one frequency list.
#[derive(Debug, Default)]
struct LongFormBuilder {
    runs: Vec<PendingRun>,
    index: HashMap<RunKey, usize>,
}

impl LongFormBuilder {
    fn push(
        &mut self,
        run_id: Option<RunId>,
        parameters: ParamCombination,
        frequency: f64,
        s11: Complex64,
    ) {
        let key = match run_id {
            Some(id) => RunKey::Id(id),
            None => RunKey::Params(
                parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
        };
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.runs.push(PendingRun {
                    key: Some(key.clone()),
                    parameters,
                    ..Default::default()
                });
                self.index.insert(key, self.runs.len() - 1);
                self.runs.len() - 1
            }
        };
        let run = &mut self.runs[slot];
        run.frequencies.push(frequency);
        run.s11.push(s11);
    }

    fn finish(self) -> Result<SimulationResults> {
        let frequencies = self
            .runs
            .first()
            .map(|r| r.frequencies.clone())
            .unwrap_or_default();

        let mut runs = Vec::with_capacity(self.runs.len());
        for (i, pending) in self.runs.into_iter().enumerate() {
            let id = match pending.key {
                Some(RunKey::Id(id)) => id,
                _ => i as RunId + 1,
            };
            if pending.frequencies != frequencies {
                bail!(
                    "run {id} has a different frequency list ({} points, expected {})",
                    pending.frequencies.len(),
                    frequencies.len()
                );
            }
            runs.push(RawRun {
                id,
                parameters: pending.parameters,
                s11: pending.s11,
            });
        }

        Ok(SimulationResults { frequencies, runs })
    }
}

/// Positions of the fixed long-form columns within a header.
struct LongFormColumns {
    frequency: usize,
    re: usize,
    im: usize,
    run_id: Option<usize>,
}

impl LongFormColumns {
    fn locate<'a>(headers: impl Iterator<Item = &'a str> + Clone) -> Result<Self> {
        let find = |name: &str| headers.clone().position(|h| h == name);
        Ok(LongFormColumns {
            frequency: find(FREQUENCY_HEADER)
                .with_context(|| format!("missing '{FREQUENCY_HEADER}' column"))?,
            re: find(S11_REAL_HEADER)
                .with_context(|| format!("missing '{S11_REAL_HEADER}' column"))?,
            im: find(S11_IMAG_HEADER)
                .with_context(|| format!("missing '{S11_IMAG_HEADER}' column"))?,
            run_id: find(RUN_ID_HEADER),
        })
    }

    fn is_fixed(&self, idx: usize) -> bool {
        idx == self.frequency || idx == self.re || idx == self.im || Some(idx) == self.run_id
    }
}

/// A `Run ID` cell must hold a whole number that fits a [`RunId`].
fn to_run_id(value: f64) -> Result<RunId> {
    if value.fract() != 0.0 || value < 0.0 || value > RunId::MAX as f64 {
        bail!("'{value}' is not a valid {RUN_ID_HEADER}");
    }
    Ok(value as RunId)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, then one row per run × frequency with the
/// `Frequency (GHz)`, `S11 Real` and `S11 Imaginary` columns. An optional
/// `Run ID` column groups rows into runs; otherwise rows sharing the same
/// parameter values form one run. All other columns are parameters.
fn load_csv(path: &Path) -> Result<SimulationResults> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let cols = LongFormColumns::locate(headers.iter().map(String::as_str))
        .context("CSV is not a long-form S11 table")?;

    let mut builder = LongFormBuilder::default();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let number = |idx: usize| -> Result<f64> {
            let cell = record.get(idx).unwrap_or("").trim();
            cell.parse::<f64>().with_context(|| {
                format!("Row {row_no}, {}: '{cell}' is not a number", headers[idx])
            })
        };

        let frequency = number(cols.frequency)?;
        let s11 = Complex64::new(number(cols.re)?, number(cols.im)?);
        let run_id = match cols.run_id {
            Some(idx) => {
                let id = to_run_id(number(idx)?).with_context(|| format!("Row {row_no}"))?;
                Some(id)
            }
            None => None,
        };

        let mut parameters = ParamCombination::new();
        for (col_idx, value) in record.iter().enumerate() {
            if cols.is_fixed(col_idx) {
                continue;
            }
            parameters.insert(headers[col_idx].clone(), ParamValue::guess(value));
        }

        builder.push(run_id, parameters, frequency, s11);
    }

    builder.finish()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the long-form layout of the CSV loader.
///
/// Numeric columns may be Float64, Float32, Int64 or Int32; parameter
/// columns may additionally be strings or booleans.
fn load_parquet(path: &Path) -> Result<SimulationResults> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut long_form = LongFormBuilder::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let cols = LongFormColumns::locate(schema.fields().iter().map(|f| f.name().as_str()))
            .context("Parquet file is not a long-form S11 table")?;

        let param_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| !cols.is_fixed(*i))
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        for row in 0..batch.num_rows() {
            let number = |idx: usize| -> Result<f64> {
                extract_f64(batch.column(idx).as_ref(), row).with_context(|| {
                    format!("Row {row}: failed to read '{}'", schema.field(idx).name())
                })
            };

            let frequency = number(cols.frequency)?;
            let s11 = Complex64::new(number(cols.re)?, number(cols.im)?);
            let run_id = match cols.run_id {
                Some(idx) => {
                    let id = to_run_id(number(idx)?).with_context(|| format!("Row {row}"))?;
                    Some(id)
                }
                None => None,
            };

            let parameters = param_cols
                .iter()
                .map(|(idx, name)| (name.clone(), extract_param_value(batch.column(*idx).as_ref(), row)))
                .collect();

            long_form.push(run_id, parameters, frequency, s11);
        }
    }

    long_form.finish()
}

// -- Arrow helpers --

/// Read a numeric cell as `f64`.
fn extract_f64(col: &dyn Array, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row) as f64,
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row) as f64,
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row) as f64,
        DataType::UInt32 => col.as_primitive::<UInt32Type>().value(row) as f64,
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(value)
}

/// Extract a single parameter value from an Arrow column at a given row.
fn extract_param_value(col: &dyn Array, row: usize) -> ParamValue {
    if col.is_null(row) {
        return ParamValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => ParamValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => ParamValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => ParamValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => ParamValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt32 => ParamValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::Float32 => ParamValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => ParamValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => ParamValue::Bool(col.as_boolean().value(row)),
        other => ParamValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(width: f64) -> ParamCombination {
        [("width".to_string(), ParamValue::Float(width))].into_iter().collect()
    }

    #[test]
    fn builder_groups_by_parameters_in_first_seen_order() {
        let mut b = LongFormBuilder::default();
        for &w in &[2.0, 1.0] {
            for &f in &[1.0, 2.0] {
                b.push(None, params(w), f, Complex64::new(w, f));
            }
        }
        let results = b.finish().unwrap();
        assert_eq!(results.frequencies, [1.0, 2.0]);
        assert_eq!(results.runs.len(), 2);
        assert_eq!(results.runs[0].id, 1);
        assert_eq!(results.runs[0].parameters, params(2.0));
        assert_eq!(results.runs[1].s11[1], Complex64::new(1.0, 2.0));
    }

    #[test]
    fn builder_prefers_explicit_run_ids() {
        let mut b = LongFormBuilder::default();
        b.push(Some(5), params(1.0), 1.0, Complex64::new(0.1, 0.0));
        b.push(Some(7), params(1.0), 1.0, Complex64::new(0.2, 0.0));
        let results = b.finish().unwrap();
        let ids: Vec<RunId> = results.runs.iter().map(|r| r.id).collect();
        assert_eq!(ids, [5, 7]);
    }

    #[test]
    fn builder_rejects_mismatched_frequency_lists() {
        let mut b = LongFormBuilder::default();
        b.push(Some(1), params(1.0), 1.0, Complex64::new(0.1, 0.0));
        b.push(Some(1), params(1.0), 2.0, Complex64::new(0.1, 0.0));
        b.push(Some(2), params(2.0), 1.0, Complex64::new(0.1, 0.0));
        assert!(b.finish().is_err());
    }

    #[test]
    fn builder_groups_nan_parameters_into_one_run() {
        let mut b = LongFormBuilder::default();
        for &f in &[1.0, 2.0] {
            b.push(None, params(f64::NAN), f, Complex64::new(0.1, f));
        }
        let results = b.finish().unwrap();
        assert_eq!(results.runs.len(), 1);
        assert_eq!(results.runs[0].s11.len(), 2);
    }

    #[test]
    fn run_ids_must_be_whole_non_negative_numbers() {
        assert_eq!(to_run_id(7.0).unwrap(), 7);
        assert_eq!(to_run_id(0.0).unwrap(), 0);
        assert!(to_run_id(-1.0).is_err());
        assert!(to_run_id(1.7).is_err());
        assert!(to_run_id(f64::NAN).is_err());
        assert!(to_run_id(f64::INFINITY).is_err());
        assert!(to_run_id(5e9).is_err());
    }

    #[test]
    fn json_numbers_keep_integer_type() {
        assert_eq!(json_to_param(&serde_json::json!(4)), ParamValue::Integer(4));
        assert_eq!(json_to_param(&serde_json::json!(0.5)), ParamValue::Float(0.5));
        assert_eq!(json_to_param(&serde_json::json!(null)), ParamValue::Null);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = read_results(Path::new("results.txt"), &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    #[test]
    fn native_project_requires_library_path() {
        let err = read_results(Path::new("antenna.cst"), &Config::default()).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingLibraryPath)));
    }
}
