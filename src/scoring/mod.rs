//! Row scoring for display order
//!
//! Scores never modify the matrix; they only feed [`RowOrder`].

use ndarray::{Array1, ArrayView2, Axis};
use statrs::statistics::Statistics;

use crate::data::RowOrder;

/// TIP ("target identification from profiles") z-scores, one per row
///
/// Each element is weighted by its column mean, weighted rows are summed, and
/// the sums are z-normalized across rows with the population standard
/// deviation. Rows whose signal lines up with the average profile score high.
///
/// If every row has the same weighted sum the standard deviation is zero and
/// all scores are NaN; callers ordering by these scores get ties.
pub fn tip_zscores(diff: ArrayView2<f64>) -> Array1<f64> {
    if diff.nrows() == 0 {
        return Array1::zeros(0);
    }

    let col_means = diff
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(diff.ncols()));
    let scores = diff.dot(&col_means);

    let mean = scores.iter().mean();
    let sd = scores.iter().population_std_dev();
    if sd == 0.0 {
        log::debug!("TIP scores have zero variance across {} rows", scores.len());
    }

    scores.mapv(|s| (s - mean) / sd)
}

/// Rows ordered by descending TIP z-score
pub fn tip_order(diff: ArrayView2<f64>) -> RowOrder {
    let scores = tip_zscores(diff);
    RowOrder::descending(&scores.to_vec())
}
