//! Strand cross-correlation shift estimation
//!
//! Plus- and minus-strand reads of a ChIP-seq library pile up on either side
//! of each binding site. Correlating the two strand signals over random
//! genomic windows and locating the peak of the mean correlation gives an
//! estimate of the fragment footprint, which can then be fed back as
//! `shift_width` when building arrays.

use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;

use crate::data::Strand;
use crate::error::{ChipseqError, Result};
use crate::signal::{ArrayParams, CoverageParams, RegionSampler, SignalSource};
use crate::stats::argmax;

/// Normalized cross-correlation of two equal-length signals
///
/// Entry `i` is the correlation at lag `k = i - max_lag`:
/// `sum_n x[n + k] * y[n] / sqrt(x.x * y.y)`. Lags reaching past the signal
/// length, and any lag of an all-zero signal, are 0.
pub fn xcorr(x: ArrayView1<f64>, y: ArrayView1<f64>, max_lag: usize) -> Result<Array1<f64>> {
    let n = x.len();
    if y.len() != n {
        return Err(ChipseqError::LengthMismatch {
            expected: format!("{} values", n),
            got: format!("{} values", y.len()),
        });
    }

    let norm = (x.dot(&x) * y.dot(&y)).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Ok(Array1::zeros(2 * max_lag + 1));
    }

    let lag_sum = |k: isize| -> f64 {
        let shift = k.unsigned_abs();
        if shift >= n {
            return 0.0;
        }
        if k >= 0 {
            x.slice(s![shift..]).dot(&y.slice(s![..n - shift]))
        } else {
            x.slice(s![..n - shift]).dot(&y.slice(s![shift..]))
        }
    };

    let max_lag = max_lag as isize;
    Ok((-max_lag..=max_lag).map(|k| lag_sum(k) / norm).collect())
}

/// Parameters for [`estimate_shift`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftParams {
    /// Size of each sampled window
    pub window_size: u64,
    /// Number of windows to sample
    pub n_windows: usize,
    /// Minimum mean coverage on each strand for a window to be used
    pub threshold: f64,
    /// Largest lag examined in each direction
    pub max_lag: usize,
    /// Bins per window; `None` means one bin per base
    pub bins: Option<usize>,
    pub fragment_size: Option<u64>,
    pub shift_width: u64,
    pub processes: Option<usize>,
    pub chunksize: Option<usize>,
}

impl Default for ShiftParams {
    fn default() -> Self {
        Self {
            window_size: 5000,
            n_windows: 1000,
            threshold: 0.0,
            max_lag: 500,
            bins: None,
            fragment_size: None,
            shift_width: 0,
            processes: None,
            chunksize: None,
        }
    }
}

impl ShiftParams {
    /// Array parameters for one strand; any strand filter given elsewhere is replaced
    pub fn array_params(&self, strand: Strand) -> ArrayParams {
        ArrayParams {
            coverage: CoverageParams {
                bins: self.bins.unwrap_or(self.window_size as usize),
                fragment_size: self.fragment_size,
                shift_width: self.shift_width,
                read_strand: Some(strand),
            },
            processes: self.processes,
            chunksize: self.chunksize,
        }
    }
}

/// Lags and per-window correlations
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftEstimate {
    /// `-max_lag..=max_lag`
    pub lags: Array1<i64>,
    /// One row per window that passed the coverage threshold
    pub correlations: Array2<f64>,
}

impl ShiftEstimate {
    pub fn n_windows(&self) -> usize {
        self.correlations.nrows()
    }

    /// Correlation averaged over windows; `None` when no window passed
    pub fn mean_correlation(&self) -> Option<Array1<f64>> {
        self.correlations.mean_axis(Axis(0))
    }

    /// Lag with the highest mean correlation
    pub fn best_lag(&self) -> Option<i64> {
        let mean = self.mean_correlation()?;
        let i = argmax(mean.as_slice()?)?;
        Some(self.lags[i])
    }
}

/// Cross-correlate plus- and minus-strand signal over random windows
///
/// Windows are kept only when the mean coverage of BOTH strands exceeds
/// `threshold`; the rest are dropped, so the result may have zero rows.
pub fn estimate_shift(
    signal: &dyn SignalSource,
    sampler: &dyn RegionSampler,
    params: &ShiftParams,
) -> Result<ShiftEstimate> {
    let windows = sampler.sample_windows(params.window_size, params.n_windows)?;
    let width = 2 * params.max_lag + 1;
    let max_lag = params.max_lag as i64;
    let lags: Array1<i64> = (-max_lag..=max_lag).collect();

    log::info!("Getting plus-strand signal for {} regions", windows.len());
    let plus = signal.array(&windows, &params.array_params(Strand::Plus))?;
    log::info!("Getting minus-strand signal for {} regions", windows.len());
    let minus = signal.array(&windows, &params.array_params(Strand::Minus))?;

    if plus.dim() != minus.dim() {
        return Err(ChipseqError::ShapeMismatch {
            expected: format!("{:?}", plus.dim()),
            got: format!("{:?}", minus.dim()),
        });
    }

    let passes = |row: ArrayView1<f64>| row.mean().map_or(false, |m| m > params.threshold);
    let kept: Vec<usize> = (0..plus.nrows())
        .filter(|&i| passes(plus.row(i)) && passes(minus.row(i)))
        .collect();
    log::info!(
        "Running cross-correlation on {} regions that passed threshold",
        kept.len()
    );

    let rows = kept
        .par_iter()
        .map(|&i| xcorr(plus.row(i), minus.row(i), params.max_lag))
        .collect::<Result<Vec<_>>>()?;

    let mut correlations = Array2::zeros((rows.len(), width));
    for (mut out, row) in correlations.axis_iter_mut(Axis(0)).zip(&rows) {
        out.assign(row);
    }

    Ok(ShiftEstimate { lags, correlations })
}
