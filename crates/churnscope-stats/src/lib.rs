//! Statistical building blocks for churn analysis.
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Percentiles**: nearest-rank percentile lookup (quartiles for box plots)
//! - **Histograms**: equal-width frequency distributions
//! - **Survival analysis**: Kaplan-Meier curves and per-interval life tables
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use churnscope_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Analyzing retention
//!
//! ```
//! use churnscope_stats::survival::{KaplanMeierCurve, LifeTable};
//!
//! // (tenure, is_censored): censored customers are still subscribed
//! let data = vec![(10, false), (20, true), (30, false)];
//! let curve = KaplanMeierCurve::from_data(data.clone());
//! let table = LifeTable::from_data(&data, 30);
//! assert_eq!(curve.times, vec![10, 30]);
//! assert_eq!(table.times.len(), 30);
//! ```

pub mod descriptive;
pub mod histogram;
pub mod percentiles;
pub mod survival;
