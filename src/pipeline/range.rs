use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Frequency window
// ---------------------------------------------------------------------------

/// Requested frequency window in GHz. `None` bounds mean "not given".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrequencyRange {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl FrequencyRange {
    /// The whole frequency series.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(start: f64, end: f64) -> Self {
        FrequencyRange {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Resolve against a dataset: the requested window if it is usable,
    /// otherwise the full `(min, max)` of the frequency series.
    ///
    /// A window is unusable when a bound is missing or not finite, when
    /// `start > end`, or when no frequency point falls inside it.
    /// Returns `None` only for an empty frequency series.
    pub fn resolve(&self, dataset: &Dataset) -> Option<(f64, f64)> {
        let full = dataset.frequency_bounds()?;

        let (start, end) = match (self.start, self.end) {
            (Some(s), Some(e)) if s.is_finite() && e.is_finite() && s <= e => (s, e),
            (None, None) => return Some(full),
            _ => {
                log::warn!("Invalid frequency range {self:?}, using full range");
                return Some(full);
            }
        };

        if !dataset.frequencies().iter().any(|&f| f >= start && f <= end) {
            log::warn!("No frequency points in [{start}, {end}] GHz, using full range");
            return Some(full);
        }
        Some((start, end))
    }
}

/// Parse a user-entered bound, accepting a comma as decimal separator.
/// Unparseable text means "no bound".
pub fn parse_bound(text: &str) -> Option<f64> {
    text.trim().replace(',', ".").parse::<f64>().ok()
}

/// Restrict every run to the frequencies inside the (resolved) window, inclusive.
pub fn filter_range(dataset: &Dataset, range: &FrequencyRange) -> Dataset {
    let Some((start, end)) = range.resolve(dataset) else {
        return dataset.clone();
    };
    let indices: Vec<usize> = dataset
        .frequencies()
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f >= start && f <= end)
        .map(|(i, _)| i)
        .collect();
    log::debug!(
        "Frequency window [{start}, {end}] GHz keeps {} of {} points",
        indices.len(),
        dataset.n_points()
    );
    dataset.select_points(&indices)
}
