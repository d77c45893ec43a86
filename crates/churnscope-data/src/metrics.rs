//! Scalar summary of a filtered view.

use churnscope_stats::descriptive;

use crate::{
    columns,
    table::{Cell, Table},
};

/// Whether a decoded churn cell marks a churned customer.
#[must_use]
pub fn is_churned(cell: Cell<'_>) -> bool {
    columns::CHURNED_LABELS.contains(&cell.render().as_str())
}

/// Headline numbers shown above every chart.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SummaryMetrics {
    pub total: usize,
    pub churn_count: usize,
    /// Fraction in `[0, 1]`, zero for an empty view.
    pub churn_rate: f64,
    /// Mean over non-missing charges, zero when there are none.
    pub mean_monthly_charge: f64,
}

impl SummaryMetrics {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_table(table: &Table) -> Self {
        let total = table.row_count();
        let churn_count = table
            .column(columns::CHURN)
            .map_or(0, |c| c.cells().filter(|&cell| is_churned(cell)).count());
        let churn_rate = if total == 0 {
            0.0
        } else {
            churn_count as f64 / total as f64
        };
        let mean_monthly_charge = table
            .column(columns::MONTHLY_CHARGES)
            .map_or(0.0, |c| descriptive::mean_or_zero(c.numbers()));
        Self {
            total,
            churn_count,
            churn_rate,
            mean_monthly_charge,
        }
    }
}
