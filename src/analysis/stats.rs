//! Descriptive statistics for response and count series.

use serde::Serialize;
use std::cmp::Ordering;

/// Population statistics for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub variance: f64,
}

impl ColumnStats {
    /// Compute statistics from values, ignoring non-finite entries.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals = sorted_finite(values);
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let mean = vals.iter().sum::<f64>() / count as f64;
        let variance = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(ColumnStats {
            count,
            min: vals[0],
            max: vals[count - 1],
            mean,
            median: quantile_sorted(&vals, 0.5),
            std_dev: variance.sqrt(),
            variance,
        })
    }
}

/// Summary in the style of a data-frame `describe()`.
///
/// `std` is the sample standard deviation and is `NaN` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Describe {
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals = sorted_finite(values);
        if vals.is_empty() {
            return None;
        }

        let count = vals.len();
        let mean = vals.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            (vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Some(Describe {
            count,
            mean,
            std,
            min: vals[0],
            q25: quantile_sorted(&vals, 0.25),
            q50: quantile_sorted(&vals, 0.5),
            q75: quantile_sorted(&vals, 0.75),
            max: vals[count - 1],
        })
    }
}

/// Equal-width histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `bins + 1` bin edges, ascending.
    pub edges: Vec<f64>,
    /// Number of values per bin.
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin finite values into `bins` equal-width bins spanning min..=max.
    ///
    /// Every bin is half-open except the last, which also takes the maximum.
    /// If all values are equal the range is widened by 0.5 on each side.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let vals = sorted_finite(values);
        if bins == 0 || vals.is_empty() {
            return None;
        }

        let (mut lo, mut hi) = (vals[0], vals[vals.len() - 1]);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let width = (hi - lo) / bins as f64;

        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0; bins];
        for v in &vals {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Histogram { edges, counts })
    }

    /// Largest bin count.
    pub fn peak(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Five-number summary with whiskers and outliers, as drawn by a boxplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Smallest value within `q1 - 1.5 * iqr`.
    pub lower_whisker: f64,
    /// Largest value within `q3 + 1.5 * iqr`.
    pub upper_whisker: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals = sorted_finite(values);
        if vals.is_empty() {
            return None;
        }

        let q1 = quantile_sorted(&vals, 0.25);
        let median = quantile_sorted(&vals, 0.5);
        let q3 = quantile_sorted(&vals, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = vals
            .iter()
            .copied()
            .filter(|v| (lo_fence..=hi_fence).contains(v))
            .collect();
        let outliers = vals
            .iter()
            .copied()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect();

        // The quartiles always lie inside the fences, so `inside` is non-empty.
        let lower_whisker = inside.first().copied().unwrap_or(q1);
        let upper_whisker = inside.last().copied().unwrap_or(q3);

        Some(BoxSummary {
            q1,
            median,
            q3,
            iqr,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Pearson correlation coefficient of two equally long series.
///
/// `None` when lengths differ, fewer than two points exist, or either
/// series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x * var_y).sqrt())
}

/// Linear-interpolated quantile of already sorted, non-empty values.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    vals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_column_stats() {
        let stats = ColumnStats::compute(&[4.0, 4.0, 11.0, 3.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 5.5);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.min, 3.0);
        assert_eq!(stats.max, 11.0);
        assert!(approx(stats.variance, 10.25));
        assert!(approx(stats.std_dev, 3.2015621187164243));
    }

    #[test]
    fn test_column_stats_ignores_nan() {
        let stats = ColumnStats::compute(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.median, 2.0);
        assert!(ColumnStats::compute(&[]).is_none());
    }

    #[test]
    fn test_describe() {
        let summary = Describe::compute(&[4.0, 4.0, 11.0, 3.0]).unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, 5.5);
        assert!(approx(summary.std, (41.0f64 / 3.0).sqrt()));
        assert_eq!(summary.min, 3.0);
        assert_eq!(summary.q25, 3.75);
        assert_eq!(summary.q50, 4.0);
        assert_eq!(summary.q75, 5.75);
        assert_eq!(summary.max, 11.0);
    }

    #[test]
    fn test_describe_single_value() {
        let summary = Describe::compute(&[7.0]).unwrap();
        assert!(summary.std.is_nan());
        assert_eq!(summary.q25, 7.0);
    }

    #[test]
    fn test_histogram() {
        let hist = Histogram::new(&[1.0, 2.0, 2.0, 3.0, 4.0], 3).unwrap();
        assert_eq!(hist.edges, vec![1.0, 2.0, 3.0, 4.0]);
        // Last bin is closed: 3.0 and 4.0 both land there.
        assert_eq!(hist.counts, vec![1, 2, 2]);
        assert_eq!(hist.peak(), 2);
    }

    #[test]
    fn test_histogram_constant_values() {
        let hist = Histogram::new(&[5.0, 5.0], 2).unwrap();
        assert_eq!(hist.edges, vec![4.5, 5.0, 5.5]);
        assert_eq!(hist.counts, vec![0, 2]);
    }

    #[test]
    fn test_histogram_degenerate_inputs() {
        assert!(Histogram::new(&[], 10).is_none());
        assert!(Histogram::new(&[1.0], 0).is_none());
    }

    #[test]
    fn test_box_summary_outliers() {
        let summary = BoxSummary::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.25);
        assert_eq!(summary.median, 3.5);
        assert_eq!(summary.q3, 4.75);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 5.0);
        assert_eq!(summary.outliers, vec![100.0]);
    }

    #[test]
    fn test_pearson() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!(approx(r, 1.0));
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!(approx(r, -1.0));
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(pearson(&[1.0], &[2.0]).is_none());
        assert!(pearson(&[1.0, 2.0], &[2.0]).is_none());
    }
}
