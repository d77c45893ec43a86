//! Retention and hazard curves per customer group.
//!
//! Each customer contributes one observation: their tenure, censored when
//! they have not churned. Curves run over `1..=max_tenure` where
//! `max_tenure` is taken over the whole view, so every group shares the same
//! time axis.
//!
//! Retention is a share of every customer in the group. Customers without a
//! tenure stay in that denominator but are never remaining or at risk, and
//! are left out of the Kaplan-Meier estimate.

use churnscope_data::{columns, metrics, table::Table};
use churnscope_stats::survival::{KaplanMeierCurve, LifeTable};

use crate::frame::{self, AnalysisError};

/// Columns offered for grouping.
pub const GROUP_COLUMNS: [&str; 6] = [
    columns::CONTRACT,
    columns::PAYMENT_METHOD,
    columns::INTERNET_SERVICE,
    "TechSupport",
    "OnlineSecurity",
    "DeviceProtection",
];

pub const DEFAULT_GROUP_COLUMN: &str = columns::INTERNET_SERVICE;

#[derive(Debug, Clone, serde::Serialize)]
pub struct GroupRetention {
    pub group: String,
    /// All customers of the group, including those without a tenure.
    pub customers: usize,
    pub churned: usize,
    pub life_table: LifeTable,
    pub km_curve: KaplanMeierCurve,
    /// Tenure at which Kaplan-Meier survival first drops to one half.
    pub median_survival: Option<f64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RetentionReport {
    pub group_column: String,
    pub max_tenure: usize,
    pub groups: Vec<GroupRetention>,
}

impl RetentionReport {
    /// Builds retention curves for `table` grouped by `group_column`.
    ///
    /// An empty view yields a report without groups.
    pub fn from_table(table: &Table, group_column: &str) -> Result<Self, AnalysisError> {
        let group = frame::require(table, group_column)?;
        let tenure = frame::require_numeric(table, columns::TENURE)?;
        let churn = frame::require(table, columns::CHURN)?;

        let observation = |pos: usize| {
            frame::tenure_months(tenure.get(pos)).map(|t| (t, !metrics::is_churned(churn.get(pos))))
        };
        let max_tenure = (0..table.row_count())
            .filter_map(|pos| observation(pos).map(|(t, _)| t))
            .max()
            .unwrap_or(0);

        let groups = frame::group_positions(group, 0..table.row_count())
            .into_iter()
            .map(|(name, positions)| {
                let churned = positions
                    .iter()
                    .filter(|&&pos| metrics::is_churned(churn.get(pos)))
                    .count();
                let data = positions
                    .iter()
                    .filter_map(|&pos| observation(pos))
                    .collect::<Vec<_>>();
                let km_curve = KaplanMeierCurve::from_data(data.clone());
                GroupRetention {
                    group: name,
                    customers: positions.len(),
                    churned,
                    life_table: LifeTable::with_population(&data, positions.len(), max_tenure),
                    median_survival: km_curve.median_survival(),
                    km_curve,
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            column = group_column,
            groups = groups.len(),
            max_tenure,
            "retention curves built"
        );
        Ok(Self {
            group_column: group_column.to_owned(),
            max_tenure,
            groups,
        })
    }
}
