use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use super::display::DisplayMode;
use crate::data::model::{Dataset, ParamValue};
use crate::error::{Error, Result};

pub const FREQUENCY_HEADER: &str = "Frequency (GHz)";

/// Optional grouping column understood by the long-form loaders.
pub const RUN_ID_HEADER: &str = "Run ID";

// ---------------------------------------------------------------------------
// Cells and column selection
// ---------------------------------------------------------------------------

/// One output cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Frequency or a converted S11 field.
    Number(f64),
    /// A sweep parameter value.
    Param(ParamValue),
    /// No value (dB of a zero magnitude).
    Empty,
}

impl Cell {
    /// Text rendering: numbers with 6 decimals, parameters as-is, empty cells blank.
    pub fn text(&self) -> String {
        match self {
            Cell::Number(v) => format!("{v:.6}"),
            Cell::Param(p) => p.to_string(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }
}

/// Which columns end up in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnSelection {
    #[default]
    All,
    /// Named subset; emitted in header order regardless of the order given.
    Only(Vec<String>),
}

impl ColumnSelection {
    /// Positions of the selected columns within `headers`.
    pub fn resolve(&self, headers: &[String]) -> Result<Vec<usize>> {
        let names = match self {
            ColumnSelection::All => return Ok((0..headers.len()).collect()),
            ColumnSelection::Only(names) => names,
        };
        if names.is_empty() {
            return Err(Error::EmptySelection);
        }
        if let Some(unknown) = names.iter().find(|n| !headers.contains(n)) {
            return Err(Error::UnknownColumn {
                name: unknown.clone(),
                available: headers.join(", "),
            });
        }
        Ok(headers
            .iter()
            .enumerate()
            .filter(|(_, h)| names.contains(h))
            .map(|(i, _)| i)
            .collect())
    }
}

/// Full header for a dataset: frequency, parameters, converted fields.
pub fn all_headers(dataset: &Dataset, mode: DisplayMode) -> Vec<String> {
    std::iter::once(FREQUENCY_HEADER.to_string())
        .chain(dataset.parameter_names().iter().cloned())
        .chain(mode.headers().iter().map(|h| h.to_string()))
        .collect()
}

// ---------------------------------------------------------------------------
// Table – the assembled record set
// ---------------------------------------------------------------------------

/// Records of a dataset, one per (run, frequency) pair, runs outermost.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Assemble the record set for `dataset` in `mode`, restricted to `selection`.
    pub fn assemble(
        dataset: &Dataset,
        mode: DisplayMode,
        selection: &ColumnSelection,
    ) -> Result<Table> {
        let all = all_headers(dataset, mode);
        let keep = selection.resolve(&all)?;
        let headers = keep.iter().map(|&i| all[i].clone()).collect();

        let mut rows = Vec::with_capacity(dataset.len() * dataset.n_points());
        let mut empty_cells = 0usize;
        for run in dataset.runs() {
            let params: Vec<Cell> = dataset
                .parameter_names()
                .iter()
                .map(|name| Cell::Param(run.parameter(name).clone()))
                .collect();

            for (&freq, &z) in dataset.frequencies().iter().zip(&run.s11) {
                let mut full = Vec::with_capacity(all.len());
                full.push(Cell::Number(freq));
                full.extend(params.iter().cloned());
                full.extend(mode.convert(z).fields().into_iter().map(Cell::from));

                let row: Vec<Cell> = keep.iter().map(|&i| full[i].clone()).collect();
                empty_cells += row.iter().filter(|c| **c == Cell::Empty).count();
                rows.push(row);
            }
        }
        if empty_cells > 0 {
            log::warn!("{empty_cells} samples have zero magnitude; their dB cells are left empty");
        }

        Ok(Table { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text cells of the table as an Arrow batch of string columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields: Vec<Field> = self
            .headers
            .iter()
            .map(|h| Field::new(h, DataType::Utf8, false))
            .collect();
        let columns: Vec<ArrayRef> = (0..self.headers.len())
            .map(|col| {
                let values: Vec<String> = self.rows.iter().map(|r| r[col].text()).collect();
                Arc::new(StringArray::from(values)) as ArrayRef
            })
            .collect();
        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }

    /// Render as a boxed text table.
    pub fn render(&self) -> Result<String> {
        let batch = self.to_record_batch()?;
        Ok(pretty_format_batches(&[batch])?.to_string())
    }
}
