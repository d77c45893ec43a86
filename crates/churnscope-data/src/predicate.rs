//! Compiles a [`FilterSelection`] into a single row predicate.
//!
//! The predicate is the conjunction of
//!
//! 1. `Contract ∈ contract set`
//! 2. `InternetService ∈ internet set`
//! 3. `tenure_min <= tenure <= tenure_max`
//! 4. one clause per dynamic filter, in catalog order
//!
//! Discrete clauses compare rendered cell values. Range clauses are
//! inclusive and reject missing cells. If any dynamic discrete-set selection
//! is empty the whole predicate matches nothing, whatever the other filters
//! say.

use std::collections::BTreeSet;

use crate::{
    catalog::{FilterCatalog, FilterKind},
    columns,
    selection::{FilterSelection, Selection},
    table::Table,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CompileError {
    #[display("filter column '{column}' is not in the table")]
    UnknownColumn { column: String },
    #[display("filter '{column}' expects a {expected} selection, got {actual}")]
    SelectionKind {
        column: String,
        expected: &'static str,
        actual: &'static str,
    },
}

#[derive(Debug, Clone)]
enum Clause {
    Membership {
        column: usize,
        allowed: BTreeSet<String>,
    },
    Between {
        column: usize,
        lower: f64,
        upper: f64,
    },
}

impl Clause {
    fn matches(&self, table: &Table, row: usize) -> bool {
        match self {
            Self::Membership { column, allowed } => {
                allowed.contains(&table.columns()[*column].get(row).render())
            }
            Self::Between {
                column,
                lower,
                upper,
            } => table.columns()[*column]
                .get(row)
                .as_f64()
                .is_some_and(|v| *lower <= v && v <= *upper),
        }
    }
}

/// A compiled row filter bound to the column layout of one table.
#[derive(Debug, Clone)]
pub struct RowPredicate {
    clauses: Vec<Clause>,
    matches_nothing: bool,
}

impl RowPredicate {
    /// Compiles the core and dynamic selections against `table`.
    ///
    /// `table` must share the column layout of the table the predicate is
    /// later evaluated on.
    #[expect(clippy::cast_precision_loss)]
    pub fn compile(
        table: &Table,
        catalog: &FilterCatalog,
        selection: &FilterSelection,
    ) -> Result<Self, CompileError> {
        let position = |name: &str| {
            table
                .column_position(name)
                .ok_or_else(|| CompileError::UnknownColumn {
                    column: name.to_owned(),
                })
        };

        let core = &selection.core;
        let mut clauses = vec![
            Clause::Membership {
                column: position(columns::CONTRACT)?,
                allowed: core.contract.clone(),
            },
            Clause::Membership {
                column: position(columns::INTERNET_SERVICE)?,
                allowed: core.internet.clone(),
            },
            Clause::Between {
                column: position(columns::TENURE)?,
                lower: core.tenure.0 as f64,
                upper: core.tenure.1 as f64,
            },
        ];
        let mut matches_nothing = false;

        for spec in &catalog.dynamic {
            let column = position(&spec.column)?;
            let chosen = selection.dynamic.get(&spec.column);
            let clause = match (&spec.kind, chosen) {
                (FilterKind::Range { min, max }, None) => Clause::Between {
                    column,
                    lower: *min,
                    upper: *max,
                },
                (FilterKind::Range { .. }, Some(Selection::Range { lower, upper })) => {
                    Clause::Between {
                        column,
                        lower: *lower,
                        upper: *upper,
                    }
                }
                (FilterKind::DiscreteSet { domain }, None) => Clause::Membership {
                    column,
                    allowed: domain.iter().cloned().collect(),
                },
                (FilterKind::DiscreteSet { .. }, Some(Selection::Set(allowed))) => {
                    if allowed.is_empty() {
                        tracing::debug!(column = %spec.column, "empty selection, view is empty");
                        matches_nothing = true;
                    }
                    Clause::Membership {
                        column,
                        allowed: allowed.clone(),
                    }
                }
                (kind, Some(actual)) => {
                    return Err(CompileError::SelectionKind {
                        column: spec.column.clone(),
                        expected: match kind {
                            FilterKind::Range { .. } => "range",
                            FilterKind::DiscreteSet { .. } => "set",
                        },
                        actual: actual.kind_name(),
                    });
                }
            };
            clauses.push(clause);
        }

        for column in selection.dynamic.keys() {
            if catalog.spec(column).is_none() {
                tracing::debug!(%column, "selection for unknown filter ignored");
            }
        }

        Ok(Self {
            clauses,
            matches_nothing,
        })
    }

    /// Whether the row at `row` passes every clause. Total for every row.
    #[must_use]
    pub fn matches(&self, table: &Table, row: usize) -> bool {
        !self.matches_nothing && self.clauses.iter().all(|c| c.matches(table, row))
    }

    /// Positions of all rows that pass, in table order.
    #[must_use]
    pub fn retained_positions(&self, table: &Table) -> Vec<usize> {
        if self.matches_nothing {
            return vec![];
        }
        (0..table.row_count())
            .filter(|&row| self.matches(table, row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::text("Contract", [Some("Month-to-month"), Some("One year"), Some("Two year")]),
            Column::text("InternetService", [Some("DSL"), Some("Fiber optic"), Some("No")]),
            Column::integer("tenure", [Some(1), Some(12), Some(60)]),
            Column::float("MonthlyCharges", [Some(20.0), Some(70.5), None]),
            Column::text("gender", [Some("Male"), Some("Female"), Some("Male")]),
        ])
    }

    fn setup() -> (Table, FilterCatalog, FilterSelection) {
        let table = table();
        let mut catalog = FilterCatalog::build(&table);
        // Three rows are too few for an automatic range filter
        for spec in &mut catalog.dynamic {
            if spec.column == "MonthlyCharges" {
                spec.kind = FilterKind::Range {
                    min: 20.0,
                    max: 70.5,
                };
            }
        }
        let selection = FilterSelection::defaults(&catalog);
        (table, catalog, selection)
    }

    fn retained(table: &Table, catalog: &FilterCatalog, selection: &FilterSelection) -> Vec<usize> {
        RowPredicate::compile(table, catalog, selection)
            .unwrap()
            .retained_positions(table)
    }

    #[test]
    fn test_defaults_drop_missing_range_values() {
        let (table, catalog, selection) = setup();
        assert_eq!(retained(&table, &catalog, &selection), vec![0, 1]);
    }

    #[test]
    fn test_tenure_bounds_inclusive() {
        let (table, catalog, mut selection) = setup();
        selection.core.tenure = (12, 60);
        assert_eq!(retained(&table, &catalog, &selection), vec![1]);
    }

    #[test]
    fn test_inverted_bounds_select_nothing() {
        let (table, catalog, selection) = setup();
        let selection = selection.with(
            "MonthlyCharges",
            Selection::Range {
                lower: 80.0,
                upper: 10.0,
            },
        );
        assert!(retained(&table, &catalog, &selection).is_empty());
    }

    #[test]
    fn test_empty_dynamic_set_short_circuits() {
        let (table, catalog, selection) = setup();
        let selection = selection.with("gender", Selection::Set(BTreeSet::new()));
        let predicate = RowPredicate::compile(&table, &catalog, &selection).unwrap();
        assert!(predicate.retained_positions(&table).is_empty());
        assert!((0..table.row_count()).all(|row| !predicate.matches(&table, row)));
    }

    #[test]
    fn test_empty_core_set_selects_nothing() {
        let (table, catalog, mut selection) = setup();
        selection.core.internet.clear();
        assert!(retained(&table, &catalog, &selection).is_empty());
    }

    #[test]
    fn test_selection_kind_mismatch_rejected() {
        let (table, catalog, selection) = setup();
        let selection = selection.with(
            "gender",
            Selection::Range {
                lower: 0.0,
                upper: 1.0,
            },
        );
        let err = RowPredicate::compile(&table, &catalog, &selection).unwrap_err();
        assert!(matches!(err, CompileError::SelectionKind { expected: "set", .. }));
    }
}
