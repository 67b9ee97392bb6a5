use std::f64::consts::PI;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use num_complex::Complex64;
use parquet::arrow::ArrowWriter;
use serde_json::json;

use s11_export::data::loader::{ResultsDocument, RunDocument};
use s11_export::pipeline::display::{S11_IMAG_HEADER, S11_REAL_HEADER};
use s11_export::pipeline::table::{FREQUENCY_HEADER, RUN_ID_HEADER};

const Z0: f64 = 50.0;

/// Reflection of a series RLC resonator terminating a 50 Ω line.
fn resonator_s11(f_ghz: f64, f0_ghz: f64, q: f64, r: f64) -> Complex64 {
    let w = 2.0 * PI * f_ghz * 1e9;
    let w0 = 2.0 * PI * f0_ghz * 1e9;
    let l = q * r / w0;
    let c = 1.0 / (w0 * w0 * l);
    let z = Complex64::new(r, w * l - 1.0 / (w * c));
    (z - Z0) / (z + Z0)
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [-amplitude, amplitude).
    fn jitter(&mut self, amplitude: f64) -> f64 {
        (self.next_f64() * 2.0 - 1.0) * amplitude
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    // 1.0 → 4.0 GHz, 3 MHz step
    let frequencies: Vec<f64> = (0..1001).map(|i| 1.0 + i as f64 * 0.003).collect();

    let patch_lengths = [28.0, 30.0, 32.0];
    let feed_offsets: [i64; 2] = [4, 6];

    let mut doc = ResultsDocument {
        frequencies: frequencies.clone(),
        runs: Vec::new(),
    };

    // Long-form columns
    let mut run_ids: Vec<u32> = Vec::new();
    let mut freq_col: Vec<f64> = Vec::new();
    let mut length_col: Vec<f64> = Vec::new();
    let mut offset_col: Vec<i64> = Vec::new();
    let mut re_col: Vec<f64> = Vec::new();
    let mut im_col: Vec<f64> = Vec::new();

    let mut run_id: u32 = 0;
    for &length in &patch_lengths {
        for &offset in &feed_offsets {
            run_id += 1;
            // Longer patches resonate lower; the feed offset sets the match.
            let f0 = 2.4 * 30.0 / length;
            let r = Z0 * offset as f64 / 5.0;

            let s11: Vec<Complex64> = frequencies
                .iter()
                .map(|&f| resonator_s11(f, f0, 40.0, r) + Complex64::new(rng.jitter(1e-3), rng.jitter(1e-3)))
                .collect();

            for (&f, z) in frequencies.iter().zip(&s11) {
                run_ids.push(run_id);
                freq_col.push(f);
                length_col.push(length);
                offset_col.push(offset);
                re_col.push(z.re);
                im_col.push(z.im);
            }

            let parameters: serde_json::Map<String, serde_json::Value> = [
                ("patch_length".to_string(), json!(length)),
                ("feed_offset".to_string(), json!(offset)),
            ]
            .into_iter()
            .collect();
            doc.runs.push(RunDocument {
                id: Some(run_id),
                parameters,
                s11: s11.iter().map(|z| [z.re, z.im]).collect(),
            });
        }
    }

    // Parquet (long form)
    let schema = Arc::new(Schema::new(vec![
        Field::new(RUN_ID_HEADER, DataType::UInt32, false),
        Field::new(FREQUENCY_HEADER, DataType::Float64, false),
        Field::new("patch_length", DataType::Float64, false),
        Field::new("feed_offset", DataType::Int64, false),
        Field::new(S11_REAL_HEADER, DataType::Float64, false),
        Field::new(S11_IMAG_HEADER, DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(run_ids)),
        Arc::new(Float64Array::from(freq_col)),
        Arc::new(Float64Array::from(length_col)),
        Arc::new(Int64Array::from(offset_col)),
        Arc::new(Float64Array::from(re_col)),
        Arc::new(Float64Array::from(im_col)),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let parquet_path = "sample_s11.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    // JSON
    let json_path = "sample_s11.json";
    std::fs::write(json_path, serde_json::to_string(&doc)?).context("writing JSON output")?;

    println!(
        "Wrote {run_id} runs ({} frequency points each) to {parquet_path} and {json_path}",
        frequencies.len()
    );
    Ok(())
}
