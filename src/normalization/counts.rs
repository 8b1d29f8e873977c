//! Library-size normalization
//!
//! Scales raw coverage to reads per million mapped reads (RPMMR).

use ndarray::{Array2, ArrayView2};

use crate::error::{ChipseqError, Result};

/// Scale a raw coverage matrix to reads per million mapped reads
///
/// Every element is divided by `library_size / 1e6`. The output has the same
/// shape as the input.
///
/// # Arguments
/// * `raw` - Raw coverage matrix (features x bins)
/// * `library_size` - Total mapped reads of the library
pub fn normalize(raw: ArrayView2<f64>, library_size: f64) -> Result<Array2<f64>> {
    if !library_size.is_finite() || library_size <= 0.0 {
        return Err(ChipseqError::InvalidInput {
            reason: format!(
                "Library size must be a positive finite number, got {}",
                library_size
            ),
        });
    }

    let million = library_size / 1e6;
    Ok(raw.mapv(|x| x / million))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_normalize_rpm() {
        let raw = array![[10.0, 20.0], [0.0, 5.0], [1.0, 2.0]];
        let result = normalize(raw.view(), 2e6).unwrap();
        assert_eq!(result.dim(), raw.dim());
        assert!((result[[0, 0]] - 5.0).abs() < 1e-12);
        assert!((result[[0, 1]] - 10.0).abs() < 1e-12);
        assert!((result[[1, 1]] - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_doubling_library_halves_output() {
        let raw = array![[3.0, 7.0, 11.0], [13.0, 17.0, 19.0]];
        let once = normalize(raw.view(), 1.5e6).unwrap();
        let twice = normalize(raw.view(), 3e6).unwrap();
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!((a / 2.0 - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invalid_library_size() {
        let raw = array![[1.0]];
        assert!(normalize(raw.view(), 0.0).is_err());
        assert!(normalize(raw.view(), -5.0).is_err());
        assert!(normalize(raw.view(), f64::NAN).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let raw = Array2::<f64>::zeros((0, 4));
        let result = normalize(raw.view(), 1e6).unwrap();
        assert_eq!(result.dim(), (0, 4));
    }
}
