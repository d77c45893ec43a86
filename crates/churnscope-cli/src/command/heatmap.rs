use std::{io::Write as _, num::NonZeroU32};

use churnscope_analysis::{
    AnalysisError,
    heatmap::{DEFAULT_CHARGE_BIN_WIDTH, RiskHeatmap},
};

use super::view::{OutputArg, ViewArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HeatmapArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,

    /// Width of the monthly charge bins in dollars
    #[arg(long, default_value_t = DEFAULT_CHARGE_BIN_WIDTH)]
    pub bin_width: NonZeroU32,
}

pub(crate) fn run(arg: &HeatmapArg) -> anyhow::Result<()> {
    let (_, view) = arg.view.filtered()?;
    let heatmap = match RiskHeatmap::from_view(&view, arg.bin_width) {
        Ok(heatmap) => Some(heatmap),
        Err(AnalysisError::ProbabilitiesUnavailable) => {
            tracing::warn!("risk heatmap needs a probability dataset (--probs)");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let mut output = arg.output.open()?;
    if arg.output.json {
        return output.write_json(&heatmap);
    }
    output.write_report(|out| {
        let Some(heatmap) = &heatmap else {
            return writeln!(out, "Risk heatmap unavailable: no probability data loaded");
        };
        write!(out, "{:<12}", "Charges")?;
        for bucket in &heatmap.tenure_buckets {
            write!(out, " {bucket:>13}")?;
        }
        writeln!(out)?;
        for row in &heatmap.rows {
            write!(out, "{:<12}", row.charge_bin)?;
            for (risk, count) in row.mean_risk.iter().zip(&row.counts) {
                match risk {
                    Some(risk) => write!(out, " {:>6.1}% ({count:>3})", risk * 100.0)?,
                    None => write!(out, " {:>13}", "-")?,
                }
            }
            writeln!(out)?;
        }
        Ok(())
    })
}
