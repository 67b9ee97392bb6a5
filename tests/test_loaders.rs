//! Loader tests: JSON documents, long-form CSV / Parquet tables and custom sources.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use num_complex::Complex64;
use parquet::arrow::ArrowWriter;

use s11_export::config::{Config, LIBRARY_PACKAGE_DIR};
use s11_export::data::loader::load_file;
use s11_export::data::model::{Dataset, ParamCombination, ParamValue, RunId};
use s11_export::data::source::ResultSource;
use s11_export::pipeline::display::DisplayMode;
use s11_export::pipeline::table::{ColumnSelection, Table};
use s11_export::Error;

#[test]
fn test_load_json_document() {
    let dir = common::scratch_dir("json");
    let path = dir.join("results.json");
    std::fs::write(
        &path,
        r#"{
            "frequencies": [1.0, 1.5, 2.0],
            "runs": [
                { "id": 4, "parameters": { "width": 2.5, "substrate": "FR4" },
                  "s11": [[0.5, 0.0], [0.0, 0.5], [-0.1, 0.2]] },
                { "parameters": { "width": 3 },
                  "s11": [[0.4, 0.1], [0.3, 0.2], [0.2, 0.3]] }
            ]
        }"#,
    )
    .unwrap();

    let ds = load_file(&path, &Config::default()).unwrap();
    assert_eq!(ds.frequencies(), [1.0, 1.5, 2.0]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.parameter_names(), ["width", "substrate"]);

    let first = &ds.runs()[0];
    assert_eq!(first.id, 4);
    assert_eq!(first.parameter("width"), &ParamValue::Float(2.5));
    assert_eq!(first.parameter("substrate"), &ParamValue::String("FR4".into()));
    assert_relative_eq!(first.s11[1].im, 0.5);

    let second = &ds.runs()[1];
    assert_eq!(second.id, 2);
    assert_eq!(second.parameter("width"), &ParamValue::Integer(3));
    assert_eq!(second.parameter("substrate"), &ParamValue::Null);
}

#[test]
fn test_json_with_misaligned_run_is_rejected() {
    let dir = common::scratch_dir("json-bad");
    let path = dir.join("results.json");
    std::fs::write(
        &path,
        r#"{ "frequencies": [1.0, 2.0], "runs": [ { "s11": [[0.1, 0.0]] } ] }"#,
    )
    .unwrap();

    let err = load_file(&path, &Config::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidDataset(_))
    ));
}

#[test]
fn test_load_csv_with_run_ids() {
    let dir = common::scratch_dir("csv-ids");
    let path = dir.join("long.csv");
    std::fs::write(
        &path,
        "Run ID,Frequency (GHz),gap,S11 Real,S11 Imaginary\n\
         7,1.0,1,0.1,0.2\n\
         7,2.0,1,0.3,0.4\n\
         9,1.0,1,0.5,0.6\n\
         9,2.0,1,0.7,0.8\n",
    )
    .unwrap();

    let ds = load_file(&path, &Config::default()).unwrap();
    let ids: Vec<RunId> = ds.runs().iter().map(|r| r.id).collect();
    assert_eq!(ids, [7, 9]);
    assert_eq!(ds.parameter_names(), ["gap"]);
    assert_eq!(ds.runs()[1].s11[1], Complex64::new(0.7, 0.8));
}

#[test]
fn test_csv_parameter_columns_keep_file_order() {
    let dir = common::scratch_dir("csv-order");
    let path = dir.join("order.csv");
    std::fs::write(
        &path,
        "Frequency (GHz),width,gap,S11 Real,S11 Imaginary\n\
         1.0,2.5,1,0.1,0.2\n\
         2.0,2.5,1,0.3,0.4\n",
    )
    .unwrap();

    let ds = load_file(&path, &Config::default()).unwrap();
    assert_eq!(ds.parameter_names(), ["width", "gap"]);
    let table = Table::assemble(&ds, DisplayMode::Complex, &ColumnSelection::All).unwrap();
    assert_eq!(
        table.headers(),
        ["Frequency (GHz)", "width", "gap", "S11 Real", "S11 Imaginary"]
    );
}

#[test]
fn test_csv_nan_parameter_forms_one_run() {
    let dir = common::scratch_dir("csv-nan");
    let path = dir.join("nan.csv");
    std::fs::write(
        &path,
        "Frequency (GHz),width,S11 Real,S11 Imaginary\n\
         1.0,NaN,0.1,0.2\n\
         2.0,NaN,0.3,0.4\n\
         1.0,1.5,0.5,0.6\n\
         2.0,1.5,0.7,0.8\n",
    )
    .unwrap();

    let ds = load_file(&path, &Config::default()).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.n_points(), 2);
    assert!(matches!(ds.runs()[0].parameter("width"), ParamValue::Float(v) if v.is_nan()));
    assert_eq!(ds.runs()[1].parameter("width"), &ParamValue::Float(1.5));
}

#[test]
fn test_csv_fractional_or_negative_run_id_is_rejected() {
    let dir = common::scratch_dir("csv-bad-ids");
    for (name, id) in [("negative.csv", "-1"), ("fractional.csv", "1.7")] {
        let path = dir.join(name);
        std::fs::write(
            &path,
            format!(
                "Run ID,Frequency (GHz),S11 Real,S11 Imaginary\n\
                 1,1.0,0.1,0.2\n\
                 {id},1.0,0.3,0.4\n"
            ),
        )
        .unwrap();
        let err = load_file(&path, &Config::default()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Row 1"), "{message}");
        assert!(message.contains("Run ID"), "{message}");
    }
}

#[test]
fn test_csv_missing_s11_column_is_rejected() {
    let dir = common::scratch_dir("csv-missing");
    let path = dir.join("short.csv");
    std::fs::write(&path, "Frequency (GHz),S11 Magnitude\n1.0,0.5\n").unwrap();
    let err = load_file(&path, &Config::default()).unwrap_err();
    assert!(format!("{err:#}").contains("S11 Real"));
}

#[test]
fn test_load_parquet_long_form() {
    let dir = common::scratch_dir("parquet");
    let path = dir.join("long.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("Frequency (GHz)", DataType::Float64, false),
        Field::new("feed", DataType::Utf8, false),
        Field::new("offset", DataType::Int64, false),
        Field::new("S11 Real", DataType::Float64, false),
        Field::new("S11 Imaginary", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(vec![1.0, 2.0, 1.0, 2.0])),
        Arc::new(StringArray::from(vec!["coax", "coax", "inset", "inset"])),
        Arc::new(Int64Array::from(vec![3, 3, 5, 5])),
        Arc::new(Float64Array::from(vec![0.1, 0.2, 0.3, 0.4])),
        Arc::new(Float64Array::from(vec![-0.1, -0.2, -0.3, -0.4])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
    let file = std::fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(&path, &Config::default()).unwrap();
    assert_eq!(ds.frequencies(), [1.0, 2.0]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.parameter_names(), ["feed", "offset"]);
    let inset = &ds.runs()[1];
    assert_eq!(inset.id, 2);
    assert_eq!(inset.parameter("feed"), &ParamValue::String("inset".into()));
    assert_eq!(inset.parameter("offset"), &ParamValue::Integer(5));
    assert_eq!(inset.s11[0], Complex64::new(0.3, -0.3));
}

#[test]
fn test_native_project_with_valid_library_defers_to_external_reader() {
    let dir = common::scratch_dir("native");
    let lib = dir.join("lib");
    std::fs::create_dir_all(lib.join(LIBRARY_PACKAGE_DIR)).unwrap();
    let config = Config {
        library_path: Some(lib),
    };

    let err = load_file(&dir.join("antenna.cst"), &config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ExternalReader { .. })
    ));

    let broken = Config {
        library_path: Some(dir.join("nowhere")),
    };
    let err = load_file(&dir.join("antenna.cst"), &broken).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidLibraryPath { .. })
    ));
}

/// A provider computing its traces on demand, like a live simulator binding.
struct AnalyticSource {
    points: usize,
}

impl ResultSource for AnalyticSource {
    fn frequencies(&self) -> s11_export::Result<Vec<f64>> {
        Ok((0..self.points).map(|i| 2.0 + i as f64 * 0.5).collect())
    }

    fn run_ids(&self) -> s11_export::Result<Vec<RunId>> {
        Ok(vec![10, 20])
    }

    fn s11(&self, run: RunId) -> s11_export::Result<Vec<Complex64>> {
        let scale = run as f64 / 100.0;
        Ok((0..self.points).map(|i| Complex64::new(scale, i as f64 * scale)).collect())
    }

    fn parameters(&self, run: RunId) -> s11_export::Result<ParamCombination> {
        Ok([("run_scale".to_string(), ParamValue::Integer(run as i64))]
            .into_iter()
            .collect())
    }
}

#[test]
fn test_dataset_from_custom_source() {
    let ds = Dataset::from_source(&AnalyticSource { points: 4 }).unwrap();
    assert_eq!(ds.n_points(), 4);
    assert_eq!(ds.frequency_bounds(), Some((2.0, 3.5)));
    assert_eq!(ds.runs()[1].parameter("run_scale"), &ParamValue::Integer(20));
    assert_relative_eq!(ds.runs()[1].s11[3].im, 0.6, epsilon = 1e-12);
}
