//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::DVector;

/// Produce a vector of `num_points` evenly spaced values between `start` and
/// `end` (inclusive).
///
/// If `num_points` is 1 the vector contains only `start`.
pub fn linspace(start: f64, end: f64, num_points: usize) -> DVector<f64> {
    if num_points == 1 {
        return DVector::from_element(1, start);
    }

    let step = (end - start) / ((num_points - 1) as f64);
    DVector::from_fn(num_points, |i, _| start + step * (i as f64))
}

/// Find the first index whose time point is not less than `t`.
///
/// This is a linear forward scan over `ts`, which is assumed to be sorted in
/// increasing order. If `t` is greater than every time point `None` is
/// returned.
pub fn first_at_or_after(ts: &DVector<f64>, t: f64) -> Option<usize> {
    (0..ts.len()).find(|&i| ts[i] >= t)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_linspace() {
        let ts = linspace(0.0, 2.0, 5);
        assert_eq!(ts.len(), 5);
        assert_eq!(ts[0], 0.0);
        assert_eq!(ts[2], 1.0);
        assert_eq!(ts[4], 2.0);

        let single = linspace(3.0, 7.0, 1);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0], 3.0);
    }

    #[test]
    fn test_first_at_or_after() {
        let ts = DVector::from_vec(vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(first_at_or_after(&ts, 0.0), Some(0));
        assert_eq!(first_at_or_after(&ts, 0.6), Some(2));
        assert_eq!(first_at_or_after(&ts, 1.0), Some(2));
        assert_eq!(first_at_or_after(&ts, 1.5), Some(3));
        assert_eq!(first_at_or_after(&ts, 2.0), None);
    }
}
