//! Data-driven filter catalog.
//!
//! Every column outside [`columns::CORE_FILTERED`] is inspected and, when it
//! qualifies, gets a [`FilterSpec`]:
//!
//! - numeric with more than [`RANGE_MIN_DISTINCT`] distinct values and a
//!   non-degenerate range → [`FilterKind::Range`]
//! - otherwise fewer than [`DISCRETE_MAX_DISTINCT`] distinct values →
//!   [`FilterKind::DiscreteSet`]
//! - otherwise no filter
//!
//! The three core filters (contract, internet service, tenure) get their
//! options from [`CoreOptions`].

use crate::{
    columns,
    table::{Column, Table},
};

/// Numeric columns need strictly more distinct values than this to become a range.
pub const RANGE_MIN_DISTINCT: usize = 15;
/// Discrete-set columns need strictly fewer distinct values than this.
pub const DISCRETE_MAX_DISTINCT: usize = 50;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    /// Inclusive numeric bounds; the default selection is the whole range.
    Range { min: f64, max: f64 },
    /// Sorted rendered values; the default selection is all of them.
    DiscreteSet { domain: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FilterSpec {
    pub column: String,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterSpec {
    /// Classifies a column, returning `None` when it gets no filter.
    #[must_use]
    pub fn classify(column: &Column) -> Option<Self> {
        let distinct = column.distinct_count();
        let kind = if column.is_numeric() && distinct > RANGE_MIN_DISTINCT {
            let (min, max) = column.numeric_range()?;
            if min >= max {
                return None;
            }
            FilterKind::Range { min, max }
        } else if distinct < DISCRETE_MAX_DISTINCT {
            FilterKind::DiscreteSet {
                domain: column.rendered_domain(),
            }
        } else {
            return None;
        };
        Some(Self {
            column: column.name().to_owned(),
            kind,
        })
    }
}

/// Options of the fixed filters every view exposes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CoreOptions {
    pub contract: Vec<String>,
    pub internet: Vec<String>,
    /// Observed `(min, max)` tenure in whole months.
    pub tenure: (i64, i64),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FilterCatalog {
    pub core: CoreOptions,
    /// Dynamic filters in dataset column order.
    pub dynamic: Vec<FilterSpec>,
}

impl FilterCatalog {
    /// Builds the catalog from a decoded table.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn build(table: &Table) -> Self {
        let domain = |name: &str| {
            table
                .column(name)
                .map(Column::rendered_domain)
                .unwrap_or_default()
        };
        let tenure = table
            .column(columns::TENURE)
            .and_then(Column::numeric_range)
            .map_or((0, 0), |(lo, hi)| (lo as i64, hi as i64));
        let core = CoreOptions {
            contract: domain(columns::CONTRACT),
            internet: domain(columns::INTERNET_SERVICE),
            tenure,
        };

        let mut dynamic = vec![];
        for column in table.columns() {
            if columns::CORE_FILTERED.contains(&column.name()) {
                continue;
            }
            match FilterSpec::classify(column) {
                Some(spec) => dynamic.push(spec),
                None => tracing::debug!(column = column.name(), "no filter generated"),
            }
        }

        tracing::debug!(filters = dynamic.len(), "filter catalog built");
        Self { core, dynamic }
    }

    #[must_use]
    pub fn spec(&self, column: &str) -> Option<&FilterSpec> {
        self.dynamic.iter().find(|s| s.column == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_numeric_is_range() {
        let column = Column::float("MonthlyCharges", (0..20).map(|i| Some(f64::from(i) + 0.5)));
        let spec = FilterSpec::classify(&column).unwrap();
        assert_eq!(spec.kind, FilterKind::Range { min: 0.5, max: 19.5 });
    }

    #[test]
    fn test_narrow_numeric_is_discrete() {
        let column = Column::integer("SeniorCitizen", [Some(1), Some(0), Some(1)]);
        let spec = FilterSpec::classify(&column).unwrap();
        assert_eq!(
            spec.kind,
            FilterKind::DiscreteSet {
                domain: vec!["0".to_owned(), "1".to_owned()]
            }
        );
    }

    #[test]
    fn test_high_cardinality_text_excluded() {
        let column = Column::text("note", (0..60).map(|i| Some(format!("n{i}"))));
        assert!(FilterSpec::classify(&column).is_none());
    }

    #[test]
    fn test_sixteen_distinct_numeric_is_range_fifteen_is_discrete() {
        let sixteen = Column::integer("x", (0..16).map(Some));
        assert!(matches!(
            FilterSpec::classify(&sixteen).unwrap().kind,
            FilterKind::Range { .. }
        ));
        let fifteen = Column::integer("x", (0..15).map(Some));
        assert!(matches!(
            FilterSpec::classify(&fifteen).unwrap().kind,
            FilterKind::DiscreteSet { .. }
        ));
    }

    #[test]
    fn test_core_columns_excluded_and_order_kept() {
        let table = Table::new(vec![
            Column::text("customerID", [Some("a"), Some("b")]),
            Column::text("gender", [Some("Male"), Some("Female")]),
            Column::text("Contract", [Some("One year"), Some("Month-to-month")]),
            Column::integer("tenure", [Some(3), Some(40)]),
            Column::text("Partner", [Some("No"), Some("Yes")]),
        ]);
        let catalog = FilterCatalog::build(&table);
        let names = catalog
            .dynamic
            .iter()
            .map(|s| s.column.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["gender", "Partner"]);
        assert_eq!(catalog.core.contract, vec!["Month-to-month", "One year"]);
        assert_eq!(catalog.core.tenure, (3, 40));
        assert!(catalog.core.internet.is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let table = Table::new(vec![Column::text(
            "PaymentMethod",
            [Some("Mailed check"), Some("Electronic check"), Some("Mailed check")],
        )]);
        assert_eq!(FilterCatalog::build(&table), FilterCatalog::build(&table));
    }
}
