/// Descriptive statistics of a non-empty sample of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    /// Sum of all values.
    pub total: f32,
    pub mean: f32,
    /// Middle value; the mean of the two middle values for even-sized samples.
    pub median: f32,
    /// Population standard deviation.
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Computes statistics from unsorted values.
    ///
    /// Returns `None` for an empty sample.
    ///
    /// # Examples
    ///
    /// ```
    /// # use neuroflap_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.median, 2.5);
    /// assert!(DescriptiveStats::new(std::iter::empty()).is_none());
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f32::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes statistics from values already sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f32]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f32;
        let total = sorted_values.iter().copied().sum::<f32>();
        let mean = total / n;
        let mid = count / 2;
        let median = if count % 2 == 0 {
            f32::midpoint(sorted_values[mid - 1], sorted_values[mid])
        } else {
            sorted_values[mid]
        };
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f32>()
            / n;

        Some(Self {
            count,
            min,
            max,
            total,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sample() {
        assert_eq!(DescriptiveStats::new(std::iter::empty()), None);
        assert_eq!(DescriptiveStats::from_sorted(&[]), None);
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([7.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, 7.0);
        assert_eq!(stats.max, 7.0);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_squared_scores() {
        let stats = DescriptiveStats::new([25.0, 0.0, 100.0, 0.0, 25.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.total, 150.0);
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 25.0);
        // squared deviations: 900, 900, 25, 25, 4900
        assert!((stats.std_dev - 1_350.0_f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "sorted")]
    fn test_from_sorted_requires_order() {
        let _ = DescriptiveStats::from_sorted(&[2.0, 1.0]);
    }
}
