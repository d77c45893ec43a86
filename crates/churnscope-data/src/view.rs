//! Filtered views of a [`Dataset`].
//!
//! The customer table is filtered by a [`RowPredicate`]. The probability
//! table is never filtered by content: it is restricted to the rows whose
//! load-time identity survived in the customer view.

use std::collections::HashSet;

use crate::{
    load::Dataset,
    predicate::RowPredicate,
    table::Table,
};

/// The probability side of a filtered view.
///
/// `Absent` means no probability dataset was loaded at all, which is a
/// different signal from a loaded table that ended up with zero rows.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum ProbabilityView {
    Absent,
    Loaded(Table),
}

impl ProbabilityView {
    #[must_use]
    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Absent => None,
            Self::Loaded(table) => Some(table),
        }
    }
}

/// The retained customers and their aligned probability rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView {
    pub customers: Table,
    pub probabilities: ProbabilityView,
}

impl FilteredView {
    /// Position in `customers` of the row with the given load-time identity.
    #[must_use]
    pub fn customer_position(&self, identity: usize) -> Option<usize> {
        // retained rows keep load order, so identities are ascending
        self.customers.row_index().binary_search(&identity).ok()
    }
}

/// Applies `predicate` to the customer table and aligns the probability
/// table to the retained identities.
#[must_use]
pub fn materialize(dataset: &Dataset, predicate: &RowPredicate) -> FilteredView {
    let positions = predicate.retained_positions(dataset.customers());
    let customers = dataset.customers().select_rows(&positions);
    let probabilities = match dataset.probabilities() {
        Some(table) => ProbabilityView::Loaded(align_rows(&customers, table)),
        None => ProbabilityView::Absent,
    };
    tracing::debug!(
        customers = customers.row_count(),
        probabilities = probabilities.table().map_or(0, Table::row_count),
        "materialized filtered view"
    );
    FilteredView {
        customers,
        probabilities,
    }
}

/// Rows of `secondary` whose identity is also in `retained`.
///
/// Rows keep the order of `secondary` and appear at most once each.
#[must_use]
pub fn align_rows(retained: &Table, secondary: &Table) -> Table {
    let keep = retained.row_index().iter().copied().collect::<HashSet<_>>();
    let mut seen = HashSet::new();
    let positions = secondary
        .row_index()
        .iter()
        .enumerate()
        .filter(|(_, id)| keep.contains(*id) && seen.insert(**id))
        .map(|(pos, _)| pos)
        .collect::<Vec<_>>();
    secondary.select_rows(&positions)
}
