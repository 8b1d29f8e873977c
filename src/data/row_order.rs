//! Display order of matrix rows

use std::cmp::Ordering;

use crate::error::{ChipseqError, Result};

/// A permutation of row indices used to display a matrix
///
/// `order[r]` is the matrix row shown at display rank `r` (rank 0 at the top).
/// It is a view only: the matrix itself is never reordered in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOrder {
    order: Vec<usize>,
}

impl RowOrder {
    /// Validate that `order` is a permutation of `0..n_rows`
    pub fn new(order: Vec<usize>, n_rows: usize) -> Result<Self> {
        if order.len() != n_rows {
            return Err(ChipseqError::InvalidRowOrder {
                reason: format!("{} indices given for {} rows", order.len(), n_rows),
            });
        }
        let mut seen = vec![false; n_rows];
        for &i in &order {
            if i >= n_rows {
                return Err(ChipseqError::InvalidRowOrder {
                    reason: format!("row index {} out of range for {} rows", i, n_rows),
                });
            }
            if seen[i] {
                return Err(ChipseqError::InvalidRowOrder {
                    reason: format!("row index {} appears more than once", i),
                });
            }
            seen[i] = true;
        }
        Ok(Self { order })
    }

    /// Rows in their original order
    pub fn identity(n_rows: usize) -> Self {
        Self {
            order: (0..n_rows).collect(),
        }
    }

    /// Order rows by descending score
    ///
    /// The sort is stable. Equal scores are ties and NaN scores go last, so a
    /// uniform matrix (all scores NaN or equal) keeps its original order.
    pub fn descending(scores: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| nan_last(scores[a], scores[b], |x, y| y.total_cmp(&x)));
        Self { order }
    }

    /// Order rows by ascending score; NaN scores go last
    pub fn ascending(scores: &[f64]) -> Self {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| nan_last(scores[a], scores[b], |x, y| x.total_cmp(&y)));
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    /// Matrix row shown at display rank `rank` (0 = top)
    pub fn row_at_rank(&self, rank: usize) -> Option<usize> {
        self.order.get(rank).copied()
    }

    /// Matrix row under strip point `pick`
    ///
    /// Strip points are laid out bottom-up (`y = pick + 0.5`) while rank 0 is
    /// drawn at the top, so a pick counts ranks from the bottom.
    pub fn row_for_pick(&self, pick: usize) -> Option<usize> {
        let n = self.order.len();
        if pick >= n {
            return None;
        }
        self.row_at_rank(n - 1 - pick)
    }
}

/// Compare two scores with NaN after every number; `0.0` and `-0.0` tie
fn nan_last(a: f64, b: f64, cmp: impl Fn(f64, f64) -> Ordering) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ if a == b => Ordering::Equal,
        _ => cmp(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_permutation() {
        assert!(RowOrder::new(vec![2, 0, 1], 3).is_ok());
        assert!(RowOrder::new(vec![0, 1], 3).is_err());
        assert!(RowOrder::new(vec![0, 1, 3], 3).is_err());
        assert!(RowOrder::new(vec![0, 1, 1], 3).is_err());
    }

    #[test]
    fn test_descending_order() {
        let order = RowOrder::descending(&[0.5, 2.0, -1.0, 1.0]);
        assert_eq!(order.as_slice(), &[1, 3, 0, 2]);

        let order = RowOrder::ascending(&[0.5, 2.0, -1.0, 1.0]);
        assert_eq!(order.as_slice(), &[2, 0, 3, 1]);
    }

    #[test]
    fn test_ties_and_nan_do_not_error() {
        let order = RowOrder::descending(&[f64::NAN; 5]);
        assert_eq!(order.as_slice(), &[0, 1, 2, 3, 4]);

        let order = RowOrder::descending(&[1.0, 1.0, 1.0]);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_nan_scores_sort_last() {
        let scores = [1.0, f64::NAN, 3.0, f64::NAN, 2.0];
        assert_eq!(RowOrder::descending(&scores).as_slice(), &[2, 4, 0, 1, 3]);
        assert_eq!(RowOrder::ascending(&scores).as_slice(), &[0, 4, 2, 1, 3]);

        let order = RowOrder::descending(&[0.0, f64::NAN, -0.0, 5.0]);
        assert_eq!(order.as_slice(), &[3, 0, 2, 1]);
    }

    #[test]
    fn test_row_for_pick_counts_from_bottom() {
        let order = RowOrder::new(vec![2, 0, 1], 3).unwrap();
        assert_eq!(order.row_for_pick(0), Some(1));
        assert_eq!(order.row_for_pick(1), Some(0));
        assert_eq!(order.row_for_pick(2), Some(2));
        assert_eq!(order.row_for_pick(3), None);
    }
}
