//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use num_complex::Complex64;
use s11_export::data::model::{Dataset, ParamValue, Run};

/// Fresh, empty scratch directory unique to this test process.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("s11-export-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// Two parameters × three runs over 1.0..=2.0 GHz in `points` steps.
pub fn sweep(points: usize) -> Dataset {
    let step = 1.0 / (points - 1) as f64;
    let freqs: Vec<f64> = (0..points).map(|i| 1.0 + i as f64 * step).collect();
    let runs = [(0.5, 2_i64), (1.5, 2), (1.5, 4)]
        .iter()
        .enumerate()
        .map(|(k, &(width, gap))| Run {
            id: k as u32 + 1,
            parameters: [
                ("gap".to_string(), ParamValue::Integer(gap)),
                ("width".to_string(), ParamValue::Float(width)),
            ]
            .into_iter()
            .collect(),
            s11: freqs
                .iter()
                .map(|&f| Complex64::from_polar(0.2 + 0.1 * k as f64, (f * width).sin()))
                .collect(),
        })
        .collect();
    Dataset::new(freqs, runs).expect("valid sweep")
}
