use std::path::Path;

use crate::config::Config;
use crate::data::loader::load_file;
use crate::data::model::Dataset;
use crate::pipeline::decimate::{MAX_PREVIEW_ROWS, decimate};
use crate::pipeline::display::DisplayMode;
use crate::pipeline::export::{ExportFormat, export};
use crate::pipeline::range::{FrequencyRange, filter_range};
use crate::pipeline::summary::Summary;
use crate::pipeline::table::{ColumnSelection, Table, all_headers};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The currently loaded dataset and how it is being viewed.
pub struct Session {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Requested frequency window.
    pub range: FrequencyRange,

    /// How S11 samples are shown and exported.
    pub mode: DisplayMode,

    /// Columns kept in preview and export.
    pub columns: ColumnSelection,

    /// Frequency points per run in the preview.
    pub max_preview_rows: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            dataset: None,
            range: FrequencyRange::all(),
            mode: DisplayMode::default(),
            columns: ColumnSelection::All,
            max_preview_rows: MAX_PREVIEW_ROWS,
        }
    }
}

impl Session {
    /// Load a result file. The current dataset is only replaced on success.
    pub fn load(&mut self, path: &Path, config: &Config) -> anyhow::Result<&Dataset> {
        let dataset = load_file(path, config)?;
        Ok(self.set_dataset(dataset))
    }

    /// Ingest a dataset, resetting the column selection.
    pub fn set_dataset(&mut self, dataset: Dataset) -> &Dataset {
        self.columns = ColumnSelection::All;
        self.dataset.insert(dataset)
    }

    fn require_dataset(&self) -> anyhow::Result<&Dataset> {
        self.dataset
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No data loaded"))
    }

    /// All columns available in the current display mode.
    pub fn available_columns(&self) -> anyhow::Result<Vec<String>> {
        Ok(all_headers(self.require_dataset()?, self.mode))
    }

    /// The dataset restricted to the frequency window.
    pub fn filtered(&self) -> anyhow::Result<Dataset> {
        Ok(filter_range(self.require_dataset()?, &self.range))
    }

    /// Decimated table for on-screen inspection.
    pub fn preview(&self) -> anyhow::Result<Table> {
        let shown = decimate(&self.filtered()?, self.max_preview_rows);
        Ok(Table::assemble(&shown, self.mode, &self.columns)?)
    }

    /// Full filtered table, as exported.
    pub fn table(&self) -> anyhow::Result<Table> {
        Ok(Table::assemble(&self.filtered()?, self.mode, &self.columns)?)
    }

    /// Export the full filtered range to `path`.
    pub fn export(&self, path: &Path, format: ExportFormat) -> anyhow::Result<Table> {
        let table = self.table()?;
        export(&table, path, format)?;
        Ok(table)
    }

    pub fn summary(&self) -> anyhow::Result<Summary> {
        Ok(Summary::of(self.require_dataset()?))
    }
}
