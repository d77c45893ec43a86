//! Survival estimates for time-to-event data.
//!
//! Two estimators are provided:
//!
//! - [`KaplanMeierCurve`]: non-parametric survival function that accounts for
//!   right-censored observations (subjects whose event has not happened yet).
//! - [`LifeTable`]: per-interval retention and hazard percentages over a
//!   fixed integer time axis `1..=max_time`.
//!
//! Observations are `(time, is_censored)` pairs. For subscription data the
//! time is the tenure in months, and a customer who has not churned is
//! censored at their current tenure.

/// Kaplan-Meier survival curve.
///
/// The curve stores parallel vectors sampled at the times where at least one
/// event occurred.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct KaplanMeierCurve {
    /// Time points where events occurred.
    pub times: Vec<usize>,
    /// Survival probability right after each time point, in `0.0..=1.0`.
    pub survival_prob: Vec<f64>,
    /// Number of subjects at risk at each time point.
    pub at_risk: Vec<usize>,
    /// Number of events at each time point.
    pub events: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve.
    ///
    /// # Examples
    ///
    /// ```
    /// # use churnscope_stats::survival::KaplanMeierCurve;
    /// // (time, is_censored)
    /// let data = vec![(10, false), (20, true), (30, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// assert_eq!(curve.times, vec![10, 30]);
    /// assert_eq!(curve.survival_prob[1], 0.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(mut data: Vec<(usize, bool)>) -> Self {
        data.sort_by_key(|(time, _)| *time);

        let mut curve = Self::default();
        let mut survival = 1.0;
        let mut seen = 0;
        let total = data.len();

        for group in data.chunk_by(|a, b| a.0 == b.0) {
            let at_risk = total - seen;
            seen += group.len();

            let events = group.iter().filter(|(_, censored)| !censored).count();
            if events == 0 {
                continue;
            }
            survival *= 1.0 - events as f64 / at_risk as f64;

            curve.times.push(group[0].0);
            curve.survival_prob.push(survival);
            curve.at_risk.push(at_risk);
            curve.events.push(events);
        }

        curve
    }

    /// Returns the median survival time.
    ///
    /// The median is the time at which survival drops to 50% or below,
    /// linearly interpolated between neighbouring event times. Returns `None`
    /// if survival never reaches 50%.
    ///
    /// ```
    /// # use churnscope_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(10, false), (20, false)]);
    /// assert_eq!(curve.median_survival(), Some(10.0));
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&s| s <= 0.5)?;
        if i == 0 {
            return Some(self.times[0] as f64);
        }
        let (t0, t1) = (self.times[i - 1] as f64, self.times[i] as f64);
        let (s0, s1) = (self.survival_prob[i - 1], self.survival_prob[i]);
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Returns the survival probability at a specific time (step function).
    ///
    /// ```
    /// # use churnscope_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(10, false), (20, false)]);
    /// assert_eq!(curve.survival_at(5), 1.0);
    /// assert_eq!(curve.survival_at(15), 0.5);
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: usize) -> f64 {
        let idx = self.times.partition_point(|&t| t <= time);
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }
}

/// Per-interval retention and hazard over the time axis `1..=max_time`.
///
/// - `retention[t]`: percentage of subjects whose time is strictly greater
///   than `t`.
/// - `hazard[t]`: percentage of subjects at risk at `t` (time `>= t`) whose
///   event happened exactly at `t`; `0.0` when nobody is at risk.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct LifeTable {
    /// Time points `1..=max_time`.
    pub times: Vec<usize>,
    /// Retention percentage at each time point.
    pub retention: Vec<f64>,
    /// Hazard percentage at each time point.
    pub hazard: Vec<f64>,
}

impl LifeTable {
    /// Builds a life table from `(time, is_censored)` observations.
    ///
    /// An empty input produces an empty table.
    ///
    /// ```
    /// # use churnscope_stats::survival::LifeTable;
    /// let table = LifeTable::from_data(&[(1, false), (2, true), (2, false), (4, true)], 4);
    /// assert_eq!(table.times, vec![1, 2, 3, 4]);
    /// assert_eq!(table.retention, vec![75.0, 25.0, 25.0, 0.0]);
    /// assert!((table.hazard[1] - 100.0 / 3.0).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn from_data(data: &[(usize, bool)], max_time: usize) -> Self {
        Self::with_population(data, data.len(), max_time)
    }

    /// Like [`Self::from_data`], with retention taken as a share of
    /// `population` subjects.
    ///
    /// Subjects beyond `data` have no observed time: they count towards the
    /// population but are never remaining nor at risk. A zero population
    /// produces an empty table.
    ///
    /// ```
    /// # use churnscope_stats::survival::LifeTable;
    /// // four subjects, one without an observed time
    /// let table = LifeTable::with_population(&[(1, false), (3, true), (3, true)], 4, 3);
    /// assert_eq!(table.retention, vec![50.0, 50.0, 0.0]);
    /// assert!((table.hazard[0] - 100.0 / 3.0).abs() < 1e-9);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn with_population(data: &[(usize, bool)], population: usize, max_time: usize) -> Self {
        debug_assert!(population >= data.len());
        if population == 0 {
            return Self::default();
        }

        let total = population as f64;
        let mut table = Self::default();
        for t in 1..=max_time {
            let remaining = data.iter().filter(|(time, _)| *time > t).count();
            let at_risk = data.iter().filter(|(time, _)| *time >= t).count();
            let events = data
                .iter()
                .filter(|(time, censored)| *time == t && !censored)
                .count();

            table.times.push(t);
            table.retention.push(remaining as f64 / total * 100.0);
            table.hazard.push(if at_risk > 0 {
                events as f64 / at_risk as f64 * 100.0
            } else {
                0.0
            });
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_km_empty() {
        let curve = KaplanMeierCurve::from_data(vec![]);
        assert!(curve.times.is_empty());
        assert_eq!(curve.median_survival(), None);
        assert_eq!(curve.survival_at(100), 1.0);
    }

    #[test]
    fn test_km_all_censored_never_drops() {
        let curve = KaplanMeierCurve::from_data(vec![(3, true), (5, true)]);
        assert!(curve.times.is_empty());
        assert_eq!(curve.survival_at(10), 1.0);
    }

    #[test]
    fn test_km_censoring_reduces_at_risk() {
        // 4 subjects: event at 1, censored at 2, events at 3 and 3
        let curve = KaplanMeierCurve::from_data(vec![(3, false), (1, false), (2, true), (3, false)]);
        assert_eq!(curve.times, vec![1, 3]);
        assert_eq!(curve.at_risk, vec![4, 2]);
        assert_eq!(curve.events, vec![1, 2]);
        assert!((curve.survival_prob[0] - 0.75).abs() < 1e-12);
        assert!(curve.survival_prob[1].abs() < 1e-12);
    }

    #[test]
    fn test_life_table_hazard_zero_when_nobody_at_risk() {
        let table = LifeTable::from_data(&[(1, false)], 3);
        assert_eq!(table.hazard, vec![100.0, 0.0, 0.0]);
        assert_eq!(table.retention, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_life_table_population_dilutes_retention() {
        let observed = [(2, true), (2, false)];
        let plain = LifeTable::from_data(&observed, 2);
        let diluted = LifeTable::with_population(&observed, 4, 2);
        assert_eq!(plain.retention, vec![100.0, 0.0]);
        assert_eq!(diluted.retention, vec![50.0, 0.0]);
        assert_eq!(plain.hazard, diluted.hazard);
    }

    #[test]
    fn test_life_table_only_unobserved_subjects() {
        let table = LifeTable::with_population(&[], 3, 2);
        assert_eq!(table.times, vec![1, 2]);
        assert_eq!(table.retention, vec![0.0, 0.0]);
        assert_eq!(table.hazard, vec![0.0, 0.0]);
    }

    #[test]
    fn test_life_table_empty() {
        let table = LifeTable::from_data(&[], 12);
        assert!(table.times.is_empty());
    }
}
