//! Mean predicted churn risk by monthly charge and tenure.

use std::num::NonZeroU32;

use churnscope_data::{columns, view::FilteredView};

use crate::frame::{self, AnalysisError};

pub const DEFAULT_CHARGE_BIN_WIDTH: NonZeroU32 = NonZeroU32::new(10).unwrap();
/// Charge bin edges stop below this value.
const CHARGE_EDGE_LIMIT: u32 = 140;

/// Tenure buckets `(lower, upper]` in months.
pub const TENURE_BUCKETS: [(f64, f64, &str); 4] = [
    (0.0, 12.0, "0-12 Months"),
    (12.0, 24.0, "12-24 Months"),
    (24.0, 48.0, "24-48 Months"),
    (48.0, 1000.0, "48+ Months"),
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HeatmapRow {
    /// Charge interval label such as `[20, 30)`.
    pub charge_bin: String,
    /// Mean churn probability per tenure bucket, `None` for an empty cell.
    pub mean_risk: Vec<Option<f64>>,
    pub counts: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RiskHeatmap {
    pub tenure_buckets: Vec<String>,
    /// Only charge bins holding at least one customer, ascending.
    pub rows: Vec<HeatmapRow>,
}

impl RiskHeatmap {
    /// Builds the heatmap from the probability side of `view`.
    ///
    /// Rows with a missing feature or falling outside every bin are skipped.
    /// A width of 140 or more leaves no bins, so the heatmap has no rows.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn from_view(view: &FilteredView, bin_width: NonZeroU32) -> Result<Self, AnalysisError> {
        let charges = frame::risk_feature(view, columns::MONTHLY_CHARGES)?;
        let tenure = frame::risk_feature(view, columns::TENURE)?;
        let risk = frame::risk_feature(view, columns::CHURN_PROBABILITY)?;

        let edges = (0..CHARGE_EDGE_LIMIT)
            .step_by(bin_width.get() as usize)
            .collect::<Vec<_>>();
        let num_bins = edges.len().saturating_sub(1);
        let upper = f64::from(edges.last().copied().unwrap_or(0));
        let width = f64::from(bin_width.get());

        let mut sums = vec![[0.0; TENURE_BUCKETS.len()]; num_bins];
        let mut counts = vec![[0_usize; TENURE_BUCKETS.len()]; num_bins];
        let mut skipped = 0_usize;
        for ((charge, tenure), risk) in charges.into_iter().zip(tenure).zip(risk) {
            let (Some(charge), Some(tenure), Some(risk)) = (charge, tenure, risk) else {
                skipped += 1;
                continue;
            };
            let Some(bucket) = TENURE_BUCKETS
                .iter()
                .position(|(lower, upper, _)| *lower < tenure && tenure <= *upper)
            else {
                skipped += 1;
                continue;
            };
            if !(0.0..upper).contains(&charge) {
                skipped += 1;
                continue;
            }
            let bin = (charge / width).floor() as usize;
            sums[bin][bucket] += risk;
            counts[bin][bucket] += 1;
        }
        tracing::debug!(skipped, bins = num_bins, "risk heatmap built");

        let rows = edges
            .windows(2)
            .zip(sums.iter().zip(&counts))
            .filter(|(_, (_, counts))| counts.iter().any(|&c| c > 0))
            .map(|(edge, (sums, counts))| HeatmapRow {
                charge_bin: format!("[{}, {})", edge[0], edge[1]),
                mean_risk: sums
                    .iter()
                    .zip(counts)
                    .map(|(&sum, &count)| (count > 0).then(|| sum / count as f64))
                    .collect(),
                counts: counts.to_vec(),
            })
            .collect();

        Ok(Self {
            tenure_buckets: TENURE_BUCKETS
                .iter()
                .map(|(_, _, label)| (*label).to_owned())
                .collect(),
            rows,
        })
    }
}
