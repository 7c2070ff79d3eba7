/// Summary of a set of `f64` samples, such as the fitness values of one generation.
///
/// Variance is the population variance (divided by `count`, not `count - 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Midpoint of the two middle samples when `count` is even.
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Summarizes `values` in any order. Returns `None` when there are no samples.
    ///
    /// ```
    /// # use minevo_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!((stats.min, stats.max), (1.0, 5.0));
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut samples: Vec<f64> = values.into_iter().collect();
        samples.sort_by(f64::total_cmp);
        Self::from_sorted(&samples)
    }

    /// Summarizes samples already in ascending order.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(samples: &[f64]) -> Option<Self> {
        assert!(
            samples.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        let (&min, &max) = (samples.first()?, samples.last()?);

        let count = samples.len();
        let half = count / 2;
        let median = match count % 2 {
            0 => f64::midpoint(samples[half - 1], samples[half]),
            _ => samples[half],
        };

        // Welford's update keeps the squared deviations numerically stable.
        let (mean, m2) = samples
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(mean, m2), (i, &x)| {
                let delta = x - mean;
                let mean = mean + delta / (i + 1) as f64;
                (mean, m2 + delta * (x - mean))
            });
        let variance = m2 / count as f64;

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}
