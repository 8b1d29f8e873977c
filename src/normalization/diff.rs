//! Differencing of normalized IP and control matrices

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{ChipseqError, Result};

/// Sign-preserving log compression: `sign(x) * log2(1 + |x|)`
///
/// Monotonic, odd, and defined everywhere with `nice_log(0) == 0`.
pub fn nice_log(x: f64) -> f64 {
    let v = (x.abs() + 1.0).log2();
    if x < 0.0 {
        -v
    } else {
        v
    }
}

/// Transform applied to `ip - control`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DiffTransform {
    /// `sign(x) * log2(1 + |x|)`
    #[default]
    NiceLog,
    /// Leave the difference as is
    Identity,
    /// Multiply by a constant
    Scale(f64),
}

impl DiffTransform {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            DiffTransform::NiceLog => nice_log(x),
            DiffTransform::Identity => x,
            DiffTransform::Scale(k) => k * x,
        }
    }
}

/// `transform(ip - control)` elementwise
///
/// Fails when the two matrices differ in shape; no broadcasting is done.
pub fn diff(
    ip: ArrayView2<f64>,
    control: ArrayView2<f64>,
    transform: DiffTransform,
) -> Result<Array2<f64>> {
    diff_with(ip, control, |x| transform.apply(x))
}

/// Like [`diff`] with an arbitrary transform
pub fn diff_with<F>(ip: ArrayView2<f64>, control: ArrayView2<f64>, transform: F) -> Result<Array2<f64>>
where
    F: Fn(f64) -> f64,
{
    if ip.dim() != control.dim() {
        return Err(ChipseqError::ShapeMismatch {
            expected: format!("control matrix of shape {:?}", ip.dim()),
            got: format!("{:?}", control.dim()),
        });
    }

    Ok(Zip::from(&ip)
        .and(&control)
        .map_collect(|&a, &b| transform(a - b)))
}
