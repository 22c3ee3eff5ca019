//! Rolling Pearson correlation over weekly return series.
//!
//! Pure functions, no I/O: each window is recomputed in full. At a few
//! hundred weekly points the O(W) per position cost is immaterial.

/// Pearson correlation coefficient of two equal-length samples.
///
/// Returns None when either sample has zero variance (the coefficient
/// is undefined) or the slices are empty/mismatched. The result is
/// clamped to [-1, 1] to absorb floating-point drift.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Trailing-window correlation between two aligned series with gaps.
///
/// One output per input position: None for positions before the first
/// full window (i < window - 1) and for any window containing a gap in
/// either series; otherwise the Pearson coefficient of the trailing
/// `window` pairs ending at that position.
pub fn rolling_correlation(
    primary: &[Option<f64>],
    asset: &[Option<f64>],
    window: usize,
) -> Vec<Option<f64>> {
    debug_assert_eq!(primary.len(), asset.len());
    debug_assert!(window >= 2);

    let n = primary.len().min(asset.len());
    let mut result = vec![None; n];

    for i in 0..n {
        if i + 1 < window {
            continue;
        }
        let lo = i + 1 - window;

        let mut xs = Vec::with_capacity(window);
        let mut ys = Vec::with_capacity(window);
        let mut full = true;
        for j in lo..=i {
            match (primary[j], asset[j]) {
                (Some(x), Some(y)) => {
                    xs.push(x);
                    ys.push(y);
                }
                _ => {
                    full = false;
                    break;
                }
            }
        }

        if full {
            result[i] = pearson(&xs, &ys);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|&v| Some(v)).collect()
    }

    #[test]
    fn perfectly_correlated_series() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let c = pearson(&x, &y).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn perfectly_anticorrelated_series() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 2.0, 1.0];
        let c = pearson(&x, &y).unwrap();
        assert!((c + 1.0).abs() < 1e-12);
    }

    #[test]
    fn hand_computed_coefficient() {
        // cov = 5, var_x = 5, var_y = 10 -> r = 5/sqrt(50) = 1/sqrt(2)
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 4.0, 2.0, 5.0];
        let c = pearson(&x, &y).unwrap();
        assert!((c - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12, "got {c}");
    }

    #[test]
    fn constant_series_has_no_coefficient() {
        let x = [1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0];
        assert_eq!(pearson(&x, &y), None);
        assert_eq!(pearson(&y, &x), None);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(pearson(&[], &[]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), None);
    }

    #[test]
    fn rolling_warmup_is_null() {
        let x = some(&[0.1, 0.2, -0.1, 0.3, 0.0]);
        let y = some(&[0.2, 0.1, -0.2, 0.1, 0.1]);
        let r = rolling_correlation(&x, &y, 3);

        assert_eq!(r.len(), 5);
        assert_eq!(r[0], None);
        assert_eq!(r[1], None);
        assert!(r[2].is_some());
        assert!(r[3].is_some());
        assert!(r[4].is_some());
    }

    #[test]
    fn rolling_matches_pearson_on_each_window() {
        let xv = [0.1, 0.2, -0.1, 0.3, 0.0, -0.2];
        let yv = [0.05, 0.1, -0.15, 0.2, 0.05, -0.1];
        let r = rolling_correlation(&some(&xv), &some(&yv), 4);

        for i in 3..xv.len() {
            let expected = pearson(&xv[i - 3..=i], &yv[i - 3..=i]);
            assert_eq!(r[i], expected, "window ending at {i}");
        }
    }

    #[test]
    fn gap_inside_window_is_null() {
        let x = some(&[0.1, 0.2, -0.1, 0.3, 0.0]);
        let mut y = some(&[0.2, 0.1, -0.2, 0.1, 0.1]);
        y[2] = None;

        let r = rolling_correlation(&x, &y, 3);
        // windows ending at 2, 3, 4 all cover index 2
        assert_eq!(r[2], None);
        assert_eq!(r[3], None);
        assert_eq!(r[4], None);
    }

    #[test]
    fn window_longer_than_series_is_all_null() {
        let x = some(&[0.1, 0.2]);
        let y = some(&[0.2, 0.1]);
        assert_eq!(rolling_correlation(&x, &y, 3), vec![None, None]);
    }

    proptest! {
        #[test]
        fn coefficient_is_bounded(
            values in prop::collection::vec((-0.5f64..0.5, -0.5f64..0.5), 2..60),
            window in 2usize..10,
        ) {
            let x: Vec<Option<f64>> = values.iter().map(|&(a, _)| Some(a)).collect();
            let y: Vec<Option<f64>> = values.iter().map(|&(_, b)| Some(b)).collect();

            for c in rolling_correlation(&x, &y, window).into_iter().flatten() {
                prop_assert!((-1.0..=1.0).contains(&c));
            }
        }

        #[test]
        fn warmup_positions_are_always_null(
            len in 1usize..40,
            window in 2usize..10,
        ) {
            let x: Vec<Option<f64>> = (0..len).map(|i| Some(i as f64 * 0.01)).collect();
            let r = rolling_correlation(&x, &x, window);
            for (i, v) in r.iter().enumerate() {
                if i + 1 < window {
                    prop_assert_eq!(*v, None);
                }
            }
        }
    }
}
