//! Dataset and filter options shared by every subcommand.

use std::{collections::BTreeSet, path::PathBuf, str::FromStr};

use anyhow::Context;
use churnscope_data::{
    catalog::{FilterCatalog, FilterKind},
    selection::{FilterSelection, Selection},
    store::{DatasetStore, LoadedDataset},
    view::FilteredView,
};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ViewArg {
    /// Path to the customer CSV file
    #[arg(long)]
    pub data: PathBuf,

    /// Path to the churn probability CSV file, row-aligned with the customer file
    #[arg(long)]
    pub probs: Option<PathBuf>,

    /// Saved filter selection (JSON); the flags below override it
    #[arg(long)]
    pub selection: Option<PathBuf>,

    /// Contract types to keep (comma-separated, "" keeps none)
    #[arg(long, value_delimiter = ',')]
    pub contract: Option<Vec<String>>,

    /// Internet service types to keep (comma-separated, "" keeps none)
    #[arg(long, value_delimiter = ',')]
    pub internet: Option<Vec<String>>,

    /// Inclusive tenure range in months, as MIN..MAX
    #[arg(long, value_parser = parse_tenure)]
    pub tenure: Option<(i64, i64)>,

    /// Dynamic filter as COLUMN=a,b,c or COLUMN=LOW..HIGH (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<FilterOverride>,
}

/// A `COLUMN=VALUE` filter flag, interpreted against the column's catalog kind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterOverride {
    column: String,
    value: String,
}

impl FromStr for FilterOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected COLUMN=VALUE, got '{s}'"))?;
        if column.is_empty() {
            return Err(format!("missing column name in '{s}'"));
        }
        Ok(Self {
            column: column.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl FilterOverride {
    fn resolve(&self, catalog: &FilterCatalog) -> anyhow::Result<Selection> {
        let spec = catalog
            .spec(&self.column)
            .with_context(|| format!("'{}' has no filter", self.column))?;
        match spec.kind {
            FilterKind::Range { .. } => {
                let (lower, upper) = parse_range::<f64>(&self.value)
                    .with_context(|| format!("invalid range for '{}'", self.column))?;
                Ok(Selection::Range { lower, upper })
            }
            FilterKind::DiscreteSet { .. } => Ok(Selection::Set(value_set(std::slice::from_ref(
                &self.value,
            )))),
        }
    }
}

fn parse_range<T>(s: &str) -> anyhow::Result<(T, T)>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let (lower, upper) = s
        .split_once("..")
        .with_context(|| format!("expected LOW..HIGH, got '{s}'"))?;
    Ok((lower.trim().parse()?, upper.trim().parse()?))
}

fn parse_tenure(s: &str) -> Result<(i64, i64), String> {
    parse_range(s).map_err(|e| format!("{e:#}"))
}

/// Splits comma-separated values; empty items are dropped, so `""` selects
/// nothing.
fn value_set(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .collect()
}

impl ViewArg {
    /// Loads the cached dataset.
    pub(crate) fn load(&self) -> anyhow::Result<&'static LoadedDataset> {
        DatasetStore::global()
            .load_once(&self.data, self.probs.as_deref())
            .with_context(|| format!("Failed to load dataset {}", self.data.display()))
    }

    /// Builds the effective selection: catalog defaults, then the saved
    /// selection file, then individual flags.
    pub(crate) fn selection(&self, loaded: &LoadedDataset) -> anyhow::Result<FilterSelection> {
        let mut selection = match &self.selection {
            Some(path) => util::read_selection_file(path)?,
            None => loaded.default_selection(),
        };
        if let Some(contract) = &self.contract {
            selection.core.contract = value_set(contract);
        }
        if let Some(internet) = &self.internet {
            selection.core.internet = value_set(internet);
        }
        if let Some(tenure) = self.tenure {
            selection.core.tenure = tenure;
        }
        for filter in &self.filters {
            selection
                .dynamic
                .insert(filter.column.clone(), filter.resolve(&loaded.catalog)?);
        }
        Ok(selection)
    }

    /// Loads the dataset and runs one filter cycle.
    pub(crate) fn filtered(&self) -> anyhow::Result<(&'static LoadedDataset, FilteredView)> {
        let loaded = self.load()?;
        let selection = self.selection(loaded)?;
        let view = loaded
            .apply(&selection)
            .context("Failed to apply filter selection")?;
        tracing::info!(
            customers = view.customers.row_count(),
            of = loaded.dataset.customers().row_count(),
            "filter applied"
        );
        Ok((loaded, view))
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct OutputArg {
    /// Print JSON instead of a text report
    #[arg(long)]
    pub json: bool,

    /// Output file path (stdout by default)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl OutputArg {
    pub(crate) fn open(&self) -> anyhow::Result<util::Output> {
        util::Output::create(self.output.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use churnscope_data::catalog::{CoreOptions, FilterSpec};

    use super::*;

    fn catalog() -> FilterCatalog {
        FilterCatalog {
            core: CoreOptions {
                contract: vec![],
                internet: vec![],
                tenure: (0, 72),
            },
            dynamic: vec![
                FilterSpec {
                    column: "MonthlyCharges".to_owned(),
                    kind: FilterKind::Range {
                        min: 18.25,
                        max: 118.75,
                    },
                },
                FilterSpec {
                    column: "PaymentMethod".to_owned(),
                    kind: FilterKind::DiscreteSet {
                        domain: vec!["Electronic check".to_owned(), "Mailed check".to_owned()],
                    },
                },
            ],
        }
    }

    #[test]
    fn test_parse_filter_flag() {
        let filter = "PaymentMethod=Electronic check,Mailed check"
            .parse::<FilterOverride>()
            .unwrap();
        assert_eq!(
            filter.resolve(&catalog()).unwrap(),
            Selection::Set(
                ["Electronic check", "Mailed check"]
                    .map(str::to_owned)
                    .into()
            )
        );
        assert!("nocolumn".parse::<FilterOverride>().is_err());
    }

    #[test]
    fn test_range_filter_flag() {
        let filter = "MonthlyCharges=20..70.5".parse::<FilterOverride>().unwrap();
        assert_eq!(
            filter.resolve(&catalog()).unwrap(),
            Selection::Range {
                lower: 20.0,
                upper: 70.5
            }
        );
        let bad = "MonthlyCharges=cheap".parse::<FilterOverride>().unwrap();
        assert!(bad.resolve(&catalog()).is_err());
    }

    #[test]
    fn test_empty_value_selects_nothing() {
        let filter = "PaymentMethod=".parse::<FilterOverride>().unwrap();
        assert_eq!(
            filter.resolve(&catalog()).unwrap(),
            Selection::Set(BTreeSet::new())
        );
        assert!(value_set(&[String::new()]).is_empty());
    }

    #[test]
    fn test_parse_tenure() {
        assert_eq!(parse_tenure("12..24"), Ok((12, 24)));
        assert!(parse_tenure("12-24").is_err());
    }

    #[test]
    fn test_unknown_filter_column() {
        let filter = "Nope=1".parse::<FilterOverride>().unwrap();
        assert!(filter.resolve(&catalog()).is_err());
    }
}
