use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_xlsxwriter::{Format, Workbook};

use super::table::{Cell, Table};
use crate::data::model::ParamValue;
use crate::error::{Error, Result};

/// Data rows available on one worksheet (the header takes the first row).
pub const XLSX_MAX_DATA_ROWS: usize = 1_048_575;

const XLSX_NUMBER_FORMAT: &str = "0.000000";

// ---------------------------------------------------------------------------
// Export format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ExportFormat::Csv),
            "xlsx" => Some(ExportFormat::Xlsx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// `path` with this format's extension appended when it is missing.
    pub fn with_extension(&self, path: &Path) -> PathBuf {
        if ExportFormat::from_path(path) == Some(*self) {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_os_string();
            name.push(".");
            name.push(self.extension());
            PathBuf::from(name)
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(format!("unknown export format '{other}' (expected csv or xlsx)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write `table` to `path`.
///
/// The data goes to a hidden sibling file first and is renamed into place
/// once complete, so a failed export never leaves a truncated file at `path`.
pub fn export(table: &Table, path: &Path, format: ExportFormat) -> Result<()> {
    let staging = staging_path(path);
    let written = match format {
        ExportFormat::Csv => write_csv(table, &staging),
        ExportFormat::Xlsx => write_xlsx(table, &staging),
    };
    let placed = written.and_then(|()| std::fs::rename(&staging, path).map_err(Error::from));
    if let Err(e) = placed {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }
    log::info!(
        "Exported {} rows × {} columns to {}",
        table.len(),
        table.headers().len(),
        path.display()
    );
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

/// Comma-delimited, header row first, cells rendered by [`Cell::text`].
fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(Cell::text))?;
    }
    writer.flush()?;
    Ok(())
}

/// One worksheet with a bold header; numbers stay numeric with 6 decimals shown.
fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    if table.len() > XLSX_MAX_DATA_ROWS {
        return Err(Error::TooManyRows {
            rows: table.len(),
            limit: XLSX_MAX_DATA_ROWS,
        });
    }

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let number = Format::new().set_num_format(XLSX_NUMBER_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name("S11")?;

    for (col, header) in table.headers().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &bold)?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Number(v) => {
                    sheet.write_number_with_format(r, col, *v, &number)?;
                }
                Cell::Param(ParamValue::Integer(i)) => {
                    sheet.write_number(r, col, *i as f64)?;
                }
                Cell::Param(ParamValue::Float(v)) => {
                    sheet.write_number(r, col, *v)?;
                }
                Cell::Param(ParamValue::Bool(b)) => {
                    sheet.write_boolean(r, col, *b)?;
                }
                Cell::Param(ParamValue::String(s)) => {
                    sheet.write_string(r, col, s)?;
                }
                Cell::Param(ParamValue::Null) | Cell::Empty => {}
            }
        }
    }

    std::fs::write(path, workbook.save_to_buffer()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/out.CSV")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("out.xlsx")), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn missing_extension_is_appended() {
        assert_eq!(
            ExportFormat::Xlsx.with_extension(Path::new("dir/result")),
            PathBuf::from("dir/result.xlsx")
        );
        assert_eq!(
            ExportFormat::Csv.with_extension(Path::new("result.csv")),
            PathBuf::from("result.csv")
        );
    }

    #[test]
    fn staging_file_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("out/s11.csv")),
            PathBuf::from("out/.s11.csv.part")
        );
    }

    #[test]
    fn format_names_parse() {
        assert_eq!("Excel".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
        assert_eq!("csv".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert!("ods".parse::<ExportFormat>().is_err());
    }
}
