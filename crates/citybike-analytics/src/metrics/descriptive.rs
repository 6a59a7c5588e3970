//! Descriptive statistics over numeric column views, plus the planar distance
//! helper used for station coordinates.

use serde::Serialize;

/// Summary statistics for one numeric column.
///
/// `std_dev` is the population standard deviation. An empty input yields the
/// zero-valued struct rather than NaNs, so the report can always render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl DescriptiveStats {
    fn zeroed() -> Self {
        Self {
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

/// Compute descriptive statistics over the non-null values of a column view.
pub fn describe(values: &[Option<f64>]) -> DescriptiveStats {
    let mut data: Vec<f64> = values.iter().flatten().copied().collect();
    if data.is_empty() {
        return DescriptiveStats::zeroed();
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;

    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = data.len() / 2;
    let median = if data.len() % 2 == 1 {
        data[mid]
    } else {
        (data[mid - 1] + data[mid]) / 2.0
    };

    DescriptiveStats {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: data[0],
        max: data[data.len() - 1],
    }
}

/// Planar euclidean distance between two coordinate pairs.
///
/// Good enough for ranking nearby stations; not a geodesic.
pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== describe tests ====================

    #[test]
    fn test_describe_known_values() {
        let values: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)];
        let stats = describe(&values);

        assert!((stats.mean - 3.0).abs() < 1e-9);
        assert!((stats.median - 3.0).abs() < 1e-9);
        // Population std dev of 1..5 is sqrt(2)
        assert!((stats.std_dev - 2.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
    }

    #[test]
    fn test_describe_even_length_median() {
        let values: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let stats = describe(&values);
        assert!((stats.median - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_describe_ignores_nulls() {
        let values: Vec<Option<f64>> = vec![Some(10.0), None, Some(20.0), None];
        let stats = describe(&values);
        assert!((stats.mean - 15.0).abs() < 1e-9);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 20.0);
    }

    #[test]
    fn test_describe_empty_is_zeroed() {
        let stats = describe(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 0.0);
    }

    #[test]
    fn test_describe_single_value() {
        let stats = describe(&[Some(7.5)]);
        assert_eq!(stats.mean, 7.5);
        assert_eq!(stats.median, 7.5);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.min, 7.5);
        assert_eq!(stats.max, 7.5);
    }

    // ==================== euclidean_distance tests ====================

    #[test]
    fn test_euclidean_distance_3_4_5() {
        assert!((euclidean_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_euclidean_distance_same_point() {
        assert_eq!(euclidean_distance(50.45, 30.52, 50.45, 30.52), 0.0);
    }
}
