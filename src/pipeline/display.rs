use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;

pub const S11_REAL_HEADER: &str = "S11 Real";
pub const S11_IMAG_HEADER: &str = "S11 Imaginary";
pub const S11_MAGNITUDE_HEADER: &str = "S11 Magnitude";
pub const S11_DB_HEADER: &str = "S11 (dB)";
pub const PHASE_HEADER: &str = "Phase (degrees)";

// ---------------------------------------------------------------------------
// Display mode
// ---------------------------------------------------------------------------

/// How a complex S11 sample is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Real and imaginary parts.
    #[default]
    Complex,
    /// |z|
    Magnitude,
    /// 20·log10|z|
    MagnitudeDb,
    /// |z| and phase in degrees.
    MagnitudeAndPhase,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Complex,
        DisplayMode::Magnitude,
        DisplayMode::MagnitudeDb,
        DisplayMode::MagnitudeAndPhase,
    ];

    /// Column headers of the converted fields, in output order.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            DisplayMode::Complex => &[S11_REAL_HEADER, S11_IMAG_HEADER],
            DisplayMode::Magnitude => &[S11_MAGNITUDE_HEADER],
            DisplayMode::MagnitudeDb => &[S11_DB_HEADER],
            DisplayMode::MagnitudeAndPhase => &[S11_MAGNITUDE_HEADER, PHASE_HEADER],
        }
    }

    /// Convert one sample.
    pub fn convert(&self, z: Complex64) -> Converted {
        match self {
            DisplayMode::Complex => Converted::Two(z.re, z.im),
            DisplayMode::Magnitude => Converted::One(Some(z.norm())),
            DisplayMode::MagnitudeDb => Converted::One(magnitude_db(z)),
            DisplayMode::MagnitudeAndPhase => Converted::Two(z.norm(), phase_degrees(z)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayMode::Complex => "complex",
            DisplayMode::Magnitude => "magnitude",
            DisplayMode::MagnitudeDb => "db",
            DisplayMode::MagnitudeAndPhase => "magnitude-phase",
        };
        f.write_str(name)
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "complex" | "ri" => Ok(DisplayMode::Complex),
            "magnitude" | "mag" => Ok(DisplayMode::Magnitude),
            "db" | "magnitude-db" => Ok(DisplayMode::MagnitudeDb),
            "magnitude-phase" | "ma" | "phase" => Ok(DisplayMode::MagnitudeAndPhase),
            other => Err(format!(
                "unknown display mode '{other}' (expected complex, magnitude, db or magnitude-phase)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Converted fields
// ---------------------------------------------------------------------------

/// The one or two real fields a sample converts to.
///
/// A `None` field is the sentinel for a value that does not exist,
/// i.e. the dB level of a zero magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Converted {
    One(Option<f64>),
    Two(f64, f64),
}

impl Converted {
    /// Fields in header order.
    pub fn fields(&self) -> Vec<Option<f64>> {
        match *self {
            Converted::One(a) => vec![a],
            Converted::Two(a, b) => vec![Some(a), Some(b)],
        }
    }
}

/// 20·log10|z|, `None` when |z| is zero.
pub fn magnitude_db(z: Complex64) -> Option<f64> {
    let mag = z.norm();
    if mag > 0.0 {
        Some(20.0 * mag.log10())
    } else {
        None
    }
}

/// atan2(im, re) in degrees.
pub fn phase_degrees(z: Complex64) -> f64 {
    z.im.atan2(z.re).to_degrees()
}
