use std::io::Write as _;

use churnscope_analysis::{
    AnalysisError,
    segmentation::{DEFAULT_CLUSTERS, Segmentation, SegmentationError},
};

use super::view::{OutputArg, ViewArg};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SegmentsArg {
    #[clap(flatten)]
    pub view: ViewArg,
    #[clap(flatten)]
    pub output: OutputArg,

    /// Number of customer segments
    #[arg(long, default_value_t = DEFAULT_CLUSTERS)]
    pub clusters: usize,
}

pub(crate) fn run(arg: &SegmentsArg) -> anyhow::Result<()> {
    let (_, view) = arg.view.filtered()?;
    let segmentation = match Segmentation::from_view(&view, arg.clusters) {
        Ok(segmentation) => Some(segmentation),
        Err(SegmentationError::Analysis(AnalysisError::ProbabilitiesUnavailable)) => {
            tracing::warn!("segmentation needs a probability dataset (--probs)");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let mut output = arg.output.open()?;
    if arg.output.json {
        return output.write_json(&segmentation);
    }
    output.write_report(|out| {
        let Some(segmentation) = &segmentation else {
            return writeln!(out, "Segmentation unavailable: no probability data loaded");
        };
        writeln!(
            out,
            "{} customers, {} segments, inertia {:.3}",
            segmentation.rows,
            segmentation.segments.len(),
            segmentation.inertia
        )?;
        write!(out, "{:<8} {:>6}", "Segment", "Size")?;
        for feature in &segmentation.features {
            write!(out, " {feature:>18}")?;
        }
        writeln!(out)?;
        for segment in &segmentation.segments {
            write!(out, "{:<8} {:>6}", segment.cluster, segment.size)?;
            for (mean, normalized) in segment.means.iter().zip(&segment.normalized_means) {
                write!(out, " {mean:>10.2} ({normalized:.2})")?;
            }
            writeln!(out)?;
        }
        Ok(())
    })
}
