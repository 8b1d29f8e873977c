//! Small numeric helpers shared across modules

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Index of the largest non-NaN value; the first one wins ties
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// (min, max) over finite values
pub fn finite_range<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Widen a degenerate range so it can be drawn
pub fn padded_range(range: Option<(f64, f64)>) -> (f64, f64) {
    match range {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((v, _)) => (v - 0.5, v + 0.5),
        None => (0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(-500.0, 500.0, 3), vec![-500.0, 0.0, 500.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
        let x = linspace(-1000.0, 1000.0, 100);
        assert_eq!(x.len(), 100);
        assert!((x[99] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.2]), Some(1));
        assert_eq!(argmax(&[f64::NAN, -1.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN]), None);
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_ranges() {
        assert_eq!(finite_range(&[3.0, f64::NAN, -2.0, f64::INFINITY]), Some((-2.0, 3.0)));
        assert_eq!(finite_range(&Vec::<f64>::new()), None);
        assert_eq!(padded_range(Some((2.0, 2.0))), (1.5, 2.5));
        assert_eq!(padded_range(None), (0.0, 1.0));
    }
}
