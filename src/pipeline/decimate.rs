use crate::data::model::Dataset;

/// Default number of preview rows per run.
pub const MAX_PREVIEW_ROWS: usize = 500;

/// Stride that keeps at most `max_rows` of `len` samples.
///
/// Rounds `len / max_rows` up: a floored stride can emit up to
/// `2 * max_rows - 1` samples. A `max_rows` of zero is treated as one so
/// the first sample survives.
pub fn stride(len: usize, max_rows: usize) -> usize {
    let max_rows = max_rows.max(1);
    len.div_ceil(max_rows).max(1)
}

/// Indices kept by decimation: `0, k, 2k, ...`.
pub fn decimated_indices(len: usize, max_rows: usize) -> Vec<usize> {
    (0..len).step_by(stride(len, max_rows)).collect()
}

/// Thin every run to at most `max_rows` frequency points for preview.
/// Never used for export.
pub fn decimate(dataset: &Dataset, max_rows: usize) -> Dataset {
    let indices = decimated_indices(dataset.n_points(), max_rows);
    if indices.len() == dataset.n_points() {
        return dataset.clone();
    }
    log::debug!(
        "Decimated preview to {} of {} points",
        indices.len(),
        dataset.n_points()
    );
    dataset.select_points(&indices)
}
