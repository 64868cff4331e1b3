//! Numeric building blocks: least squares, correlation, scaling, DBSCAN, KDE

use crate::error::{Error, Result};

/// Ordinary least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn check_pairs(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::Statistics(format!(
            "Series length mismatch: {} vs {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(Error::Statistics("No observations".into()));
    }
    Ok(())
}

/// Fit `y` on `x`. A constant `x` yields a flat line through the mean of `y`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearFit> {
    check_pairs(x, y)?;
    let mx = mean(x);
    let my = mean(y);
    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
    Ok(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Pearson product-moment correlation coefficient
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    check_pairs(x, y)?;
    if x.len() < 2 {
        return Err(Error::Statistics(
            "Correlation needs at least two observations".into(),
        ));
    }
    let mx = mean(x);
    let my = mean(y);
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    let syy: f64 = y.iter().map(|v| (v - my).powi(2)).sum();
    if sxx == 0.0 || syy == 0.0 {
        return Err(Error::Statistics(
            "Correlation is undefined for a constant series".into(),
        ));
    }
    Ok((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Each value's fraction of the total
pub fn shares(values: &[f64]) -> Result<Vec<f64>> {
    let total: f64 = values.iter().sum();
    if total == 0.0 || !total.is_finite() {
        return Err(Error::Statistics(format!(
            "Cannot compute shares of a total of {}",
            total
        )));
    }
    Ok(values.iter().map(|v| v / total).collect())
}

/// Zero mean, unit (population) variance; constant columns are only centred
pub fn standardize(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len().max(1) as f64;
    let scale = if var > 0.0 { var.sqrt() } else { 1.0 };
    values.iter().map(|v| (v - m) / scale).collect()
}

/// Label reserved for points that belong to no cluster
pub const NOISE: i64 = -1;

/// Density-based clustering over 2-D points (Euclidean distance)
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within `eps`. Clusters grow from core points in index order;
/// border points join the first cluster that reaches them.
pub fn dbscan(points: &[[f64; 2]], eps: f64, min_samples: usize) -> Vec<i64> {
    let n = points.len();
    let neighbours: Vec<Vec<usize>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| {
                    let dx = points[i][0] - points[j][0];
                    let dy = points[i][1] - points[j][1];
                    (dx * dx + dy * dy).sqrt() <= eps
                })
                .collect()
        })
        .collect();
    let core: Vec<bool> = neighbours.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut labels = vec![NOISE; n];
    let mut next_label = 0;
    for start in 0..n {
        if labels[start] != NOISE || !core[start] {
            continue;
        }
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            if labels[i] != NOISE {
                continue;
            }
            labels[i] = next_label;
            if core[i] {
                stack.extend(neighbours[i].iter().copied().filter(|&j| labels[j] == NOISE));
            }
        }
        next_label += 1;
    }
    labels
}

/// Gaussian kernel density estimate evaluated on an even grid
///
/// Bandwidth follows Scott's rule (`n^(-1/5)` times the sample standard
/// deviation); the grid spans `cut` bandwidths beyond the data range. Returns
/// `None` when the density is undefined (fewer than two finite values or zero
/// spread).
pub fn gaussian_kde(values: &[f64], grid_size: usize, cut: f64) -> Option<(Vec<f64>, Vec<f64>)> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = data.len();
    if n < 2 || grid_size < 2 {
        return None;
    }
    let m = mean(&data);
    let std = (data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();
    if std == 0.0 {
        return None;
    }
    let bw = std * (n as f64).powf(-0.2);

    let lo = data.iter().copied().fold(f64::INFINITY, f64::min) - cut * bw;
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bw;
    let step = (hi - lo) / (grid_size - 1) as f64;
    let norm = 1.0 / (n as f64 * bw * (2.0 * std::f64::consts::PI).sqrt());

    let xs: Vec<f64> = (0..grid_size).map(|i| lo + step * i as f64).collect();
    let ys = xs
        .iter()
        .map(|x| {
            norm * data
                .iter()
                .map(|d| (-0.5 * ((x - d) / bw).powi(2)).exp())
                .sum::<f64>()
        })
        .collect();
    Some((xs, ys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression_exact_line() {
        let fit = linear_regression(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_regression_single_point_is_flat() {
        let fit = linear_regression(&[5.0], &[9.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.predict(100.0), 9.0);
    }

    #[test]
    fn test_regression_length_mismatch() {
        assert!(linear_regression(&[1.0], &[1.0, 2.0]).is_err());
        assert!(linear_regression(&[], &[]).is_err());
    }

    #[test]
    fn test_slope_sign_invariant_to_positive_scaling() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [10.0, 7.0, 9.0, 4.0, 3.0];
        let base = linear_regression(&x, &y).unwrap().slope;
        for factor in [0.001, 3.0, 1e6] {
            let scaled: Vec<f64> = y.iter().map(|v| v * factor).collect();
            let slope = linear_regression(&x, &scaled).unwrap().slope;
            assert_eq!(slope >= 0.0, base >= 0.0);
        }
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 2.0], &[5.0, 5.0]).is_err());
        assert!(pearson(&[1.0], &[5.0]).is_err());
    }

    #[test]
    fn test_shares_sum_to_one() {
        let s = shares(&[3.0, 1.0, 7.5, 0.25]).unwrap();
        assert!((s.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(shares(&[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_standardize() {
        let z = standardize(&[1.0, 2.0, 3.0, 4.0]);
        assert!(mean(&z).abs() < 1e-12);
        let var = z.iter().map(|v| v * v).sum::<f64>() / 4.0;
        assert!((var - 1.0).abs() < 1e-12);
        assert_eq!(standardize(&[7.0, 7.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_dbscan_two_clusters_and_noise() {
        let mut points = Vec::new();
        for i in 0..5 {
            points.push([0.0 + i as f64 * 0.05, 0.0]);
        }
        for i in 0..5 {
            points.push([5.0, 5.0 + i as f64 * 0.05]);
        }
        points.push([20.0, -20.0]);

        let labels = dbscan(&points, 0.3, 5);
        assert!(labels[..5].iter().all(|&l| l == 0));
        assert!(labels[5..10].iter().all(|&l| l == 1));
        assert_eq!(labels[10], NOISE);
    }

    #[test]
    fn test_dbscan_sparse_points_are_noise() {
        let points = [[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        assert_eq!(dbscan(&points, 0.3, 5), vec![NOISE; 3]);
    }

    #[test]
    fn test_dbscan_border_point_joins_cluster() {
        // The last point has only three neighbours, so it is a border point
        // reached from the core point at the origin.
        let points = [[0.0, 0.0], [0.1, 0.0], [0.0, 0.1], [0.1, 0.1], [-0.25, 0.0]];
        let labels = dbscan(&points, 0.3, 5);
        assert_eq!(labels, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_gaussian_kde_integrates_to_one() {
        let (xs, ys) = gaussian_kde(&[1.0, 2.0, 2.5, 4.0, 7.0], 200, 3.0).unwrap();
        assert_eq!(xs.len(), 200);
        let step = xs[1] - xs[0];
        let area: f64 = ys.iter().sum::<f64>() * step;
        assert!((area - 1.0).abs() < 0.02);
        assert!(xs[0] < 1.0 && xs[199] > 7.0);
    }

    #[test]
    fn test_gaussian_kde_degenerate() {
        assert!(gaussian_kde(&[3.0, 3.0, 3.0], 200, 3.0).is_none());
        assert!(gaussian_kde(&[3.0], 200, 3.0).is_none());
    }
}
