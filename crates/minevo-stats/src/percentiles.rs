/// Values of a sample at a fixed set of percentile points.
///
/// ```
/// use minevo_stats::percentiles::Percentiles;
///
/// let fitness = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let quartiles = Percentiles::new(&fitness, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(quartiles.get(50.0), Some(6.0));
/// assert_eq!(quartiles.get(25.0), Some(3.0));
/// assert_eq!(quartiles.get(90.0), None);
/// ```
#[derive(Debug, Clone)]
pub struct Percentiles {
    points: Vec<f64>,
    values: Vec<f64>,
}

impl Percentiles {
    /// Looks up each of `points` (0 to 100) in `sorted_values`.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        Self {
            points: points.to_vec(),
            values: points
                .iter()
                .map(|&p| compute_percentile(sorted_values, p))
                .collect(),
        }
    }

    #[must_use]
    pub fn new(values: &[f64], points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, points)
    }

    /// Returns the value at `point`, or `None` if it was not one of the requested points.
    #[must_use]
    pub fn get(&self, point: f64) -> Option<f64> {
        let idx = self
            .points
            .iter()
            .position(|p| (p - point).abs() < f64::EPSILON)?;
        Some(self.values[idx])
    }

    /// Iterates `(point, value)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied().zip(self.values.iter().copied())
    }
}

/// Nearest-rank percentile: the sample at `floor(n * point / 100)`, clamped to the last
/// sample. `NAN` for an empty slice.
///
/// ```
/// use minevo_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&values, 25.0), 2.0);
/// assert_eq!(compute_percentile(&values, 100.0), 5.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], point: f64) -> f64 {
    let Some(last) = sorted_values.len().checked_sub(1) else {
        return f64::NAN;
    };
    let rank = (sorted_values.len() as f64 * point / 100.0) as usize;
    sorted_values[rank.min(last)]
}
