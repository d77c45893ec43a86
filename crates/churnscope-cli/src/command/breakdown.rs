use std::io::{self, Write as _};

use churnscope_analysis::breakdown::{
    self, DEFAULT_HIERARCHY, FLOW_SOURCE_COLUMNS, FlowWeight, TENURE_HISTOGRAM_BINS,
};
use churnscope_data::table::Table;
use clap::builder::PossibleValuesParser;

use super::view::{OutputArg, ViewArg};
use crate::util::{self, Output};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum BreakdownKind {
    /// Nested counts along `--path`
    #[default]
    Hierarchy,
    /// Tenure histograms per churn label and internet service
    Tenure,
    /// Monthly charge distribution per contract and churn label
    Charges,
    /// Source column, tenure group and churn label flows
    Flow,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum WeightArg {
    #[default]
    Customers,
    Revenue,
}

impl From<WeightArg> for FlowWeight {
    fn from(weight: WeightArg) -> Self {
        match weight {
            WeightArg::Customers => FlowWeight::Customers,
            WeightArg::Revenue => FlowWeight::Revenue,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BreakdownArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,

    /// Breakdown to compute: hierarchy, tenure, charges or flow
    #[arg(long, default_value = "hierarchy")]
    pub kind: BreakdownKind,

    /// Column path of the hierarchy breakdown (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = DEFAULT_HIERARCHY)]
    pub path: Vec<String>,

    /// Number of tenure histogram bins
    #[arg(long, default_value_t = TENURE_HISTOGRAM_BINS)]
    pub bins: usize,

    /// Starting column of the lifecycle flow
    #[arg(long, default_value = FLOW_SOURCE_COLUMNS[0], value_parser = PossibleValuesParser::new(FLOW_SOURCE_COLUMNS))]
    pub source: String,

    /// Flow thickness: customers or revenue
    #[arg(long, default_value = "customers")]
    pub weight: WeightArg,
}

pub(crate) fn run(arg: &BreakdownArg) -> anyhow::Result<()> {
    let (_, view) = arg.view.filtered()?;
    let table = &view.customers;
    let mut output = arg.output.open()?;
    match arg.kind {
        BreakdownKind::Hierarchy => hierarchy(arg, table, &mut output),
        BreakdownKind::Tenure => tenure(arg, table, &mut output),
        BreakdownKind::Charges => charges(arg, table, &mut output),
        BreakdownKind::Flow => flow(arg, table, &mut output),
    }
}

fn hierarchy(arg: &BreakdownArg, table: &Table, output: &mut Output) -> anyhow::Result<()> {
    let path = arg.path.iter().map(String::as_str).collect::<Vec<_>>();
    let nodes = breakdown::hierarchy(table, &path)?;
    if arg.output.json {
        return output.write_json(&nodes);
    }
    output.write_report(|out| {
        writeln!(out, "{}", path.join(" > "))?;
        for node in &nodes {
            let depth = node.path.len() - 1;
            let label = node.path.last().map_or("", String::as_str);
            writeln!(
                out,
                "{:indent$}{:<w$} {:>7} {:>7}",
                "",
                label,
                node.count,
                util::percent(node.share_of_parent),
                indent = depth * 2,
                w = 32_usize.saturating_sub(depth * 2),
            )?;
        }
        Ok(())
    })
}

fn tenure(arg: &BreakdownArg, table: &Table, output: &mut Output) -> anyhow::Result<()> {
    let facets = breakdown::tenure_histograms(table, arg.bins)?;
    if arg.output.json {
        return output.write_json(&facets);
    }
    output.write_report(|out| {
        for facet in &facets {
            writeln!(
                out,
                "Churn={} InternetService={} ({} customers)",
                facet.churn,
                facet.internet_service,
                facet.histogram.total()
            )?;
            let max = facet
                .histogram
                .bins
                .iter()
                .map(|b| b.count)
                .max()
                .unwrap_or(0);
            for bin in facet.histogram.bins.iter().filter(|b| b.count > 0) {
                writeln!(
                    out,
                    "  {:>6.1}..{:<6.1} {:>5} {}",
                    bin.range.start,
                    bin.range.end,
                    bin.count,
                    bar(bin.count, max)
                )?;
            }
        }
        Ok(())
    })
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bar(count: u64, max: u64) -> String {
    const WIDTH: f64 = 40.0;
    if max == 0 {
        return String::new();
    }
    "#".repeat(((count as f64 / max as f64) * WIDTH).ceil() as usize)
}

fn charges(arg: &BreakdownArg, table: &Table, output: &mut Output) -> anyhow::Result<()> {
    let distributions = breakdown::charge_distributions(table)?;
    if arg.output.json {
        return output.write_json(&distributions);
    }
    output.write_report(|out| {
        writeln!(
            out,
            "  {:<16} {:<6} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "Contract", "Churn", "Count", "Mean", "P25", "P50", "P75", "StdDev"
        )?;
        for dist in &distributions {
            let q = |p| dist.quartiles.get(p).unwrap_or(f64::NAN);
            writeln!(
                out,
                "  {:<16} {:<6} {:>6} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
                dist.contract,
                dist.churn,
                dist.stats.count,
                dist.stats.mean,
                q(25.0),
                q(50.0),
                q(75.0),
                dist.stats.std_dev
            )?;
        }
        Ok(())
    })
}

fn flow(arg: &BreakdownArg, table: &Table, output: &mut Output) -> anyhow::Result<()> {
    let flow = breakdown::lifecycle_flow(table, &arg.source, arg.weight.into())?;
    if arg.output.json {
        return output.write_json(&flow);
    }
    output.write_report(|out| -> io::Result<()> {
        for link in &flow.links {
            writeln!(
                out,
                "  {:<28} -> {:<14} {:>6} customers  ${:>10.2}",
                link.source, link.target, link.customers, link.revenue
            )?;
        }
        Ok(())
    })
}
