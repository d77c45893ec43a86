use clap::{Parser, Subcommand};

use self::{
    breakdown::BreakdownArg, catalog::CatalogArg, heatmap::HeatmapArg, retention::RetentionArg,
    segments::SegmentsArg, summary::SummaryArg,
};
use crate::logging;

mod breakdown;
mod catalog;
mod heatmap;
mod retention;
mod segments;
mod summary;
mod view;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// What to report on the filtered customers
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Show headline churn metrics of the filtered customers
    Summary(#[clap(flatten)] SummaryArg),
    /// List the filter controls derived from the dataset
    Catalog(#[clap(flatten)] CatalogArg),
    /// Show retention and hazard curves per customer group
    Retention(#[clap(flatten)] RetentionArg),
    /// Break the filtered customers down by category, tenure or charges
    Breakdown(#[clap(flatten)] BreakdownArg),
    /// Show mean predicted churn risk by monthly charge and tenure
    Heatmap(#[clap(flatten)] HeatmapArg),
    /// Cluster the filtered customers into segments with k-means
    Segments(#[clap(flatten)] SegmentsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init(&args.log_level);
    match args.mode {
        Mode::Summary(arg) => summary::run(&arg)?,
        Mode::Catalog(arg) => catalog::run(&arg)?,
        Mode::Retention(arg) => retention::run(&arg)?,
        Mode::Breakdown(arg) => breakdown::run(&arg)?,
        Mode::Heatmap(arg) => heatmap::run(&arg)?,
        Mode::Segments(arg) => segments::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_command_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_filter_flags() {
        let args = CommandArgs::try_parse_from([
            "churnscope",
            "summary",
            "--data",
            "customers.csv",
            "--contract",
            "Month-to-month,One year",
            "--tenure",
            "12..24",
            "--filter",
            "gender=Male",
            "--filter",
            "MonthlyCharges=20..80",
            "--json",
        ])
        .unwrap();
        let Mode::Summary(arg) = args.mode else {
            panic!("expected summary");
        };
        assert_eq!(
            arg.view.contract,
            Some(vec!["Month-to-month".to_owned(), "One year".to_owned()])
        );
        assert_eq!(arg.view.tenure, Some((12, 24)));
        assert_eq!(arg.view.filters.len(), 2);
        assert!(arg.output.json);
    }

    #[test]
    fn test_breakdown_defaults_and_kinds() {
        let args =
            CommandArgs::try_parse_from(["churnscope", "breakdown", "--data", "c.csv"]).unwrap();
        let Mode::Breakdown(arg) = args.mode else {
            panic!("expected breakdown");
        };
        assert_eq!(arg.kind, breakdown::BreakdownKind::Hierarchy);
        assert_eq!(arg.path, ["InternetService", "PaymentMethod", "Churn"]);
        assert_eq!(arg.source, "Contract");

        let args = CommandArgs::try_parse_from([
            "churnscope",
            "breakdown",
            "--data",
            "c.csv",
            "--kind",
            "flow",
            "--weight",
            "revenue",
            "--source",
            "PaymentMethod",
        ])
        .unwrap();
        let Mode::Breakdown(arg) = args.mode else {
            panic!("expected breakdown");
        };
        assert_eq!(arg.kind, breakdown::BreakdownKind::Flow);
        assert_eq!(arg.weight, breakdown::WeightArg::Revenue);

        assert!(
            CommandArgs::try_parse_from([
                "churnscope",
                "breakdown",
                "--data",
                "c.csv",
                "--source",
                "gender",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_heatmap_rejects_zero_bin_width() {
        assert!(
            CommandArgs::try_parse_from([
                "churnscope",
                "heatmap",
                "--data",
                "c.csv",
                "--bin-width",
                "0",
            ])
            .is_err()
        );

        let args =
            CommandArgs::try_parse_from(["churnscope", "heatmap", "--data", "c.csv"]).unwrap();
        let Mode::Heatmap(arg) = args.mode else {
            panic!("expected heatmap");
        };
        assert_eq!(arg.bin_width.get(), 10);
    }

    #[test]
    fn test_data_is_required() {
        assert!(CommandArgs::try_parse_from(["churnscope", "summary"]).is_err());
    }
}
