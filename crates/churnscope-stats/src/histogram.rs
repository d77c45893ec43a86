use std::ops::Range;

/// A histogram representation of a dataset's distribution.
///
/// The observed range `[min, max]` is divided into equal-width bins. Every
/// bin is half-open except the last one, which also holds `max`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates an equal-width histogram.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points. Non-finite values are ignored.
    /// * `num_bins` - The number of bins to create.
    /// * `bounds` - If provided, overrides the observed `(min, max)`. Values
    ///   outside the bounds are not counted.
    ///
    /// # Examples
    ///
    /// ```
    /// # use churnscope_stats::histogram::Histogram;
    /// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
    /// let histogram = Histogram::new(values, 3, None);
    /// assert_eq!(histogram.bins.len(), 3);
    /// assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<u64>(), 10);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn new<I>(values: I, num_bins: usize, bounds: Option<(f64, f64)>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let (min, max) = bounds.unwrap_or_else(|| {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        });
        if min > max {
            return Self { bins: vec![] };
        }

        // Degenerate distribution concentrated at one value: unit-wide bins
        let width = if max - min < f64::EPSILON {
            1.0 / num_bins as f64
        } else {
            (max - min) / num_bins as f64
        };

        let mut bins = (0..num_bins)
            .map(|idx| {
                // Recompute edges from the origin to avoid accumulation errors
                let start = min + idx as f64 * width;
                let end = min + (idx + 1) as f64 * width;
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for val in values {
            if val < min || val > max {
                continue;
            }
            let idx = (((val - min) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Total number of values counted across all bins.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_lands_in_last_bin() {
        let histogram = Histogram::new([0.0, 5.0, 10.0], 2, None);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[1].count, 2);
    }

    #[test]
    fn test_constant_values_single_bin() {
        let histogram = Histogram::new([3.0; 4], 5, None);
        assert_eq!(histogram.bins.len(), 5);
        assert_eq!(histogram.bins[0].count, 4);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn test_explicit_bounds_drop_outliers() {
        let histogram = Histogram::new([-1.0, 0.5, 1.5, 9.0], 2, Some((0.0, 2.0)));
        assert_eq!(histogram.total(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(Histogram::new([], 10, None).bins.is_empty());
        assert!(Histogram::new([1.0], 0, None).bins.is_empty());
    }
}
