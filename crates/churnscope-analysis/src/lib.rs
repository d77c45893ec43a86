//! Derived analyses over a filtered churn view.
//!
//! Every analysis consumes a [`FilteredView`](churnscope_data::view::FilteredView)
//! or its customer table and never touches the cached dataset directly.
//!
//! - [`retention`]: retention and hazard curves plus Kaplan-Meier estimates
//!   per customer group
//! - [`breakdown`]: hierarchical counts, tenure histograms, monthly charge
//!   distributions and lifecycle flows
//! - [`heatmap`]: mean predicted risk by charge bin and tenure bucket
//! - [`segmentation`]: seeded k-means segments of the probability view
//!
//! The last two need the probability dataset and report
//! [`AnalysisError::ProbabilitiesUnavailable`] when it was not loaded.
//!
//! # Examples
//!
//! ```
//! use churnscope_analysis::retention::RetentionReport;
//! use churnscope_data::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::text("InternetService", [Some("DSL"), Some("DSL"), Some("No")]),
//!     Column::integer("tenure", [Some(1), Some(3), Some(2)]),
//!     Column::text("Churn", [Some("Yes"), Some("No"), Some("No")]),
//! ]);
//! let report = RetentionReport::from_table(&table, "InternetService")?;
//! assert_eq!(report.groups.len(), 2);
//! assert_eq!(report.groups[0].life_table.retention, vec![50.0, 50.0, 0.0]);
//! # Ok::<(), churnscope_analysis::AnalysisError>(())
//! ```

pub use self::frame::AnalysisError;

pub mod breakdown;
mod frame;
pub mod heatmap;
pub mod retention;
pub mod segmentation;
