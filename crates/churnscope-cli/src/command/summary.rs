use std::io::Write as _;

use churnscope_data::{metrics::SummaryMetrics, table::Table, view::ProbabilityView};

use super::view::{OutputArg, ViewArg};
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummaryArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,
}

#[derive(Debug, serde::Serialize)]
struct SummaryReport {
    #[serde(flatten)]
    metrics: SummaryMetrics,
    dataset_customers: usize,
    /// `None` when no probability dataset was loaded.
    probability_rows: Option<usize>,
}

pub(crate) fn run(arg: &SummaryArg) -> anyhow::Result<()> {
    let (loaded, view) = arg.view.filtered()?;
    let report = SummaryReport {
        metrics: SummaryMetrics::from_table(&view.customers),
        dataset_customers: loaded.dataset.customers().row_count(),
        probability_rows: view.probabilities.table().map(Table::row_count),
    };

    let mut output = arg.output.open()?;
    if arg.output.json {
        return output.write_json(&report);
    }
    output.write_report(|out| {
        let metrics = &report.metrics;
        writeln!(
            out,
            "Customers:        {} of {}",
            metrics.total, report.dataset_customers
        )?;
        writeln!(out, "Churned:          {}", metrics.churn_count)?;
        writeln!(out, "Churn rate:       {}", util::percent(metrics.churn_rate))?;
        writeln!(out, "Avg monthly fee:  ${:.2}", metrics.mean_monthly_charge)?;
        match &view.probabilities {
            ProbabilityView::Absent => writeln!(out, "Probabilities:    not loaded")?,
            ProbabilityView::Loaded(table) => {
                writeln!(out, "Probabilities:    {} rows", table.row_count())?;
            }
        }
        Ok(())
    })
}
