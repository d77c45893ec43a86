use std::io::Write as _;

use churnscope_analysis::retention::{DEFAULT_GROUP_COLUMN, GROUP_COLUMNS, RetentionReport};
use clap::builder::PossibleValuesParser;

use super::view::{OutputArg, ViewArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RetentionArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,

    /// Column to group customers by
    #[arg(long, default_value = DEFAULT_GROUP_COLUMN, value_parser = PossibleValuesParser::new(GROUP_COLUMNS))]
    pub by: String,

    /// Months between rows of the text report
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u64).range(1..))]
    pub step: u64,
}

pub(crate) fn run(arg: &RetentionArg) -> anyhow::Result<()> {
    let (_, view) = arg.view.filtered()?;
    let report = RetentionReport::from_table(&view.customers, &arg.by)?;

    let mut output = arg.output.open()?;
    if arg.output.json {
        return output.write_json(&report);
    }
    output.write_report(|out| {
        if report.groups.is_empty() {
            writeln!(out, "No customers match the current filters.")?;
            return Ok(());
        }

        writeln!(out, "Retention by {}", report.group_column)?;
        writeln!(
            out,
            "  {:<28} {:>9} {:>8} {:>12}",
            "Group", "Customers", "Churned", "Median(KM)"
        )?;
        writeln!(out, "  {}", "-".repeat(60))?;
        for group in &report.groups {
            let median = group
                .median_survival
                .map_or("N/A".to_string(), |m| format!("{m:.1}"));
            writeln!(
                out,
                "  {:<28} {:>9} {:>8} {:>12}",
                group.group, group.customers, group.churned, median
            )?;
        }

        for group in &report.groups {
            writeln!(out)?;
            writeln!(out, "{}", group.group)?;
            writeln!(out, "  {:>6} {:>10} {:>8} {:>8}", "Month", "Retention", "Hazard", "KM")?;
            let table = &group.life_table;
            for (i, &t) in table.times.iter().enumerate() {
                if t as u64 % arg.step != 0 && t != report.max_tenure {
                    continue;
                }
                writeln!(
                    out,
                    "  {:>6} {:>9.1}% {:>7.1}% {:>8.3}",
                    t,
                    table.retention[i],
                    table.hazard[i],
                    group.km_curve.survival_at(t)
                )?;
            }
        }
        Ok(())
    })
}
