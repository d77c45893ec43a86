//! Distribution breakdowns of the customer view.

use std::collections::BTreeMap;

use churnscope_data::{
    columns,
    table::{Column, Table},
};
use churnscope_stats::{
    descriptive::DescriptiveStats, histogram::Histogram, percentiles::Percentiles,
};

use crate::frame::{self, AnalysisError};

/// Default drill-down path of the hierarchy breakdown.
pub const DEFAULT_HIERARCHY: [&str; 3] = [
    columns::INTERNET_SERVICE,
    columns::PAYMENT_METHOD,
    columns::CHURN,
];

pub const TENURE_HISTOGRAM_BINS: usize = 50;

/// One node of a hierarchical count breakdown.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HierarchyNode {
    /// Labels from the root down to this node.
    pub path: Vec<String>,
    pub count: usize,
    /// Fraction of the parent node's customers, or of the whole view at the
    /// top level.
    pub share_of_parent: f64,
}

/// Counts along `path`, depth first, children in order of first appearance.
pub fn hierarchy(table: &Table, path: &[&str]) -> Result<Vec<HierarchyNode>, AnalysisError> {
    let columns = path
        .iter()
        .map(|name| frame::require(table, name))
        .collect::<Result<Vec<_>, _>>()?;
    let mut nodes = vec![];
    descend(
        &columns,
        &[],
        (0..table.row_count()).collect(),
        &mut nodes,
    );
    Ok(nodes)
}

#[expect(clippy::cast_precision_loss)]
fn descend(
    columns: &[&Column],
    prefix: &[String],
    positions: Vec<usize>,
    nodes: &mut Vec<HierarchyNode>,
) {
    let Some((column, rest)) = columns.split_first() else {
        return;
    };
    let parent = positions.len();
    for (label, members) in frame::group_positions(column, positions) {
        let mut path = prefix.to_vec();
        path.push(label);
        nodes.push(HierarchyNode {
            path: path.clone(),
            count: members.len(),
            share_of_parent: members.len() as f64 / parent as f64,
        });
        descend(rest, &path, members, nodes);
    }
}

/// Tenure histogram of one churn label and internet service combination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TenureFacet {
    pub churn: String,
    pub internet_service: String,
    pub histogram: Histogram,
}

/// Tenure histograms faceted by churn label and internet service.
///
/// All facets share the bin edges of the view's overall tenure range.
pub fn tenure_histograms(table: &Table, bins: usize) -> Result<Vec<TenureFacet>, AnalysisError> {
    let tenure = frame::require_numeric(table, columns::TENURE)?;
    let churn = frame::require(table, columns::CHURN)?;
    let internet = frame::require(table, columns::INTERNET_SERVICE)?;
    let Some(bounds) = tenure.numeric_range() else {
        return Ok(vec![]);
    };

    let mut facets = vec![];
    for (churn_label, by_churn) in frame::group_positions(churn, 0..table.row_count()) {
        for (service, members) in frame::group_positions(internet, by_churn) {
            let values = members.iter().filter_map(|&pos| tenure.get(pos).as_f64());
            facets.push(TenureFacet {
                churn: churn_label.clone(),
                internet_service: service,
                histogram: Histogram::new(values, bins, Some(bounds)),
            });
        }
    }
    Ok(facets)
}

/// Monthly charge distribution of one contract and churn combination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChargeDistribution {
    pub contract: String,
    pub churn: String,
    pub stats: DescriptiveStats,
    /// 25th, 50th and 75th percentiles.
    pub quartiles: Percentiles,
}

/// Monthly charge statistics per contract and churn label. Groups without
/// any charge value are left out.
pub fn charge_distributions(table: &Table) -> Result<Vec<ChargeDistribution>, AnalysisError> {
    let charges = frame::require_numeric(table, columns::MONTHLY_CHARGES)?;
    let contract = frame::require(table, columns::CONTRACT)?;
    let churn = frame::require(table, columns::CHURN)?;

    let mut distributions = vec![];
    for (contract_label, by_contract) in frame::group_positions(contract, 0..table.row_count()) {
        for (churn_label, members) in frame::group_positions(churn, by_contract) {
            let mut values = members
                .iter()
                .filter_map(|&pos| charges.get(pos).as_f64())
                .collect::<Vec<_>>();
            values.sort_by(f64::total_cmp);
            let Some(stats) = DescriptiveStats::from_sorted(&values) else {
                continue;
            };
            distributions.push(ChargeDistribution {
                contract: contract_label.clone(),
                churn: churn_label,
                stats,
                quartiles: Percentiles::from_sorted(&values, &[25.0, 50.0, 75.0]),
            });
        }
    }
    Ok(distributions)
}

/// Columns offered as the starting stage of the lifecycle flow.
pub const FLOW_SOURCE_COLUMNS: [&str; 4] = [
    columns::CONTRACT,
    columns::INTERNET_SERVICE,
    columns::PAYMENT_METHOD,
    "TechSupport",
];

/// Tenure groups `[lower, upper)` in months.
pub const TENURE_GROUPS: [(f64, f64, &str); 5] = [
    (0.0, 12.0, "0-1 Year"),
    (12.0, 24.0, "1-2 Years"),
    (24.0, 48.0, "2-4 Years"),
    (48.0, 72.0, "4-6 Years"),
    (72.0, 100.0, "6+ Years"),
];

fn tenure_group(tenure: f64) -> Option<&'static str> {
    TENURE_GROUPS
        .iter()
        .find(|(lower, upper, _)| (*lower..*upper).contains(&tenure))
        .map(|(_, _, label)| *label)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowWeight {
    #[default]
    Customers,
    Revenue,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FlowLink {
    pub source: String,
    pub target: String,
    /// Customer count or summed monthly charges, depending on the weight.
    pub value: f64,
    pub customers: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LifecycleFlow {
    /// Node labels: source values, then tenure groups, then churn labels,
    /// each stage in order of first appearance.
    pub nodes: Vec<String>,
    pub links: Vec<FlowLink>,
}

#[derive(Default)]
struct LinkTotals {
    customers: usize,
    revenue: f64,
}

/// Flows from `source_column` through tenure groups to churn labels.
///
/// Rows with a missing source, tenure outside every group or missing churn
/// label are left out. Links whose weight is zero are dropped.
#[expect(clippy::cast_precision_loss)]
pub fn lifecycle_flow(
    table: &Table,
    source_column: &str,
    weight: FlowWeight,
) -> Result<LifecycleFlow, AnalysisError> {
    let source = frame::require(table, source_column)?;
    let tenure = frame::require_numeric(table, columns::TENURE)?;
    let churn = frame::require(table, columns::CHURN)?;
    let charges = frame::require_numeric(table, columns::MONTHLY_CHARGES)?;

    let mut stages: [Vec<String>; 3] = Default::default();
    let mut first_stage = BTreeMap::<(String, String), LinkTotals>::new();
    let mut second_stage = BTreeMap::<(String, String), LinkTotals>::new();
    for pos in 0..table.row_count() {
        let (src, tenure_cell, churn_cell) = (source.get(pos), tenure.get(pos), churn.get(pos));
        if src.is_missing() || churn_cell.is_missing() {
            continue;
        }
        let Some(group) = tenure_cell.as_f64().and_then(tenure_group) else {
            continue;
        };
        let labels = [
            src.render(),
            group.to_owned(),
            format!("Churn: {}", churn_cell.render()),
        ];
        for (stage, label) in stages.iter_mut().zip(&labels) {
            if !stage.contains(label) {
                stage.push(label.clone());
            }
        }

        // missing charges add nothing to revenue
        let revenue = charges.get(pos).as_f64().unwrap_or(0.0);
        let [source_label, group_label, churn_label] = labels;
        for totals in [
            first_stage
                .entry((source_label, group_label.clone()))
                .or_default(),
            second_stage.entry((group_label, churn_label)).or_default(),
        ] {
            totals.customers += 1;
            totals.revenue += revenue;
        }
    }

    let links = first_stage
        .into_iter()
        .chain(second_stage)
        .filter_map(|((source, target), totals)| {
            let value = match weight {
                FlowWeight::Customers => totals.customers as f64,
                FlowWeight::Revenue => totals.revenue,
            };
            (value > 0.0).then_some(FlowLink {
                source,
                target,
                value,
                customers: totals.customers,
                revenue: totals.revenue,
            })
        })
        .collect();

    Ok(LifecycleFlow {
        nodes: stages.into_iter().flatten().collect(),
        links,
    })
}
