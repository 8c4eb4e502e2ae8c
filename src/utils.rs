use std::cmp::Ordering;

/// Computes the area under a curve with the trapezoidal rule
///
/// # Arguments
///
/// * `x` - x-coordinates, normally sorted in increasing order
/// * `y` - y-coordinates matching `x`
///
/// # Returns
///
/// The signed area `Σ (x[i]-x[i-1]) * (y[i]+y[i-1]) / 2`, or 0.0 with fewer than two points.
/// Decreasing x segments contribute negative terms. Only the common prefix of `x` and `y` is used.
///
/// # Examples
///
/// ```
/// # use pauc::utils::trapezoidal_area;
/// let x = vec![0.0, 0.5, 1.0, 1.5, 2.0];
/// let y = vec![0.0, 0.7, 0.9, 0.95, 1.0];
/// assert!((trapezoidal_area(&x, &y) - 1.525).abs() < 1e-12);
/// ```
pub fn trapezoidal_area(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return 0.0;
    }

    let sum: f64 = (1..n)
        .map(|i| (x[i] - x[i - 1]) * (y[i] + y[i - 1]))
        .sum();

    0.5 * sum
}

/// Keeps the finite values of a sample, preserving their order
pub fn finite_values(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

/// Sorts (x, y) pairs ascending by x and returns the two coordinate vectors.
/// The sort is stable: ties in x keep their original relative order.
pub fn sort_by_x(pairs: &mut [(f64, f64)]) -> (Vec<f64>, Vec<f64>) {
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    pairs.iter().cloned().unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoidal_area_too_few_points() {
        assert_eq!(trapezoidal_area(&[], &[]), 0.0, "empty curve should have no area");
        assert_eq!(trapezoidal_area(&[], &[1.0, 2.0]), 0.0, "empty x has no area");
        assert_eq!(trapezoidal_area(&[0.3], &[0.8]), 0.0, "a single point should have no area");
    }

    #[test]
    fn test_trapezoidal_area_known_curve() {
        let x = vec![0.0, 0.5, 1.0, 1.5, 2.0];
        let y = vec![0.0, 0.7, 0.9, 0.95, 1.0];
        assert!((trapezoidal_area(&x, &y) - 1.525).abs() < 1e-12, "bad reference area");
    }

    #[test]
    fn test_trapezoidal_area_diagonal_closed_form() {
        let x: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        assert!((trapezoidal_area(&x, &x) - 0.5).abs() < 1e-12, "diagonal over [0,1] is 1/2");

        let x = vec![0.0, 0.1, 0.35, 0.6];
        let expected = 0.6_f64.powi(2) / 2.0;
        assert!((trapezoidal_area(&x, &x) - expected).abs() < 1e-12, "diagonal from 0 is max^2/2");

        let x = vec![0.9, 0.92, 0.97, 1.0];
        let expected = (1.0 - 0.9_f64.powi(2)) / 2.0;
        assert!((trapezoidal_area(&x, &x) - expected).abs() < 1e-12, "(b^2-a^2)/2");
    }

    #[test]
    fn test_trapezoidal_area_decreasing_x_is_signed() {
        let x = vec![1.0, 0.0];
        let y = vec![1.0, 1.0];
        assert_eq!(trapezoidal_area(&x, &y), -1.0, "decreasing x should give a negative area");
        let back_and_forth = trapezoidal_area(&[0.0, 1.0, 0.0], &[1.0, 1.0, 1.0]);
        assert_eq!(back_and_forth, 0.0, "back and forth should cancel out");
    }

    #[test]
    fn test_finite_values() {
        let values = vec![f64::NAN, 0.2, f64::INFINITY, -1.0, f64::NEG_INFINITY];
        assert_eq!(finite_values(&values), vec![0.2, -1.0], "order is kept");
        assert!(finite_values(&[f64::NAN]).is_empty());
    }

    #[test]
    fn test_sort_by_x_is_stable() {
        let mut pairs = vec![(0.5, 0.1), (0.0, 0.2), (0.5, 0.3), (0.0, 0.4)];
        let (x, y) = sort_by_x(&mut pairs);
        assert_eq!(x, vec![0.0, 0.0, 0.5, 0.5]);
        assert_eq!(y, vec![0.2, 0.4, 0.1, 0.3], "ties should keep their input order");
    }
}
