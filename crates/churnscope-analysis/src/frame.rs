//! Column access shared by the analyses.

use churnscope_data::{
    table::{Cell, Column, Table},
    view::FilteredView,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("column '{column}' is not in the view")]
    MissingColumn { column: String },
    #[display("column '{column}' must be numeric")]
    NonNumericColumn { column: String },
    #[display("churn probabilities are unavailable")]
    ProbabilitiesUnavailable,
}

pub(crate) fn require<'a>(table: &'a Table, name: &str) -> Result<&'a Column, AnalysisError> {
    table
        .column(name)
        .ok_or_else(|| AnalysisError::MissingColumn {
            column: name.to_owned(),
        })
}

pub(crate) fn require_numeric<'a>(
    table: &'a Table,
    name: &str,
) -> Result<&'a Column, AnalysisError> {
    let column = require(table, name)?;
    if !column.is_numeric() {
        return Err(AnalysisError::NonNumericColumn {
            column: name.to_owned(),
        });
    }
    Ok(column)
}

/// Row positions grouped by rendered value, groups in order of first
/// appearance. Missing cells belong to no group.
pub(crate) fn group_positions<I>(column: &Column, positions: I) -> Vec<(String, Vec<usize>)>
where
    I: IntoIterator<Item = usize>,
{
    let mut groups: Vec<(String, Vec<usize>)> = vec![];
    for pos in positions {
        let cell = column.get(pos);
        if cell.is_missing() {
            continue;
        }
        let key = cell.render();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(pos),
            None => groups.push((key, vec![pos])),
        }
    }
    groups
}

/// Whole months of tenure. Missing and negative values yield `None`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn tenure_months(cell: Cell<'_>) -> Option<usize> {
    cell.as_f64()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .map(|t| t as usize)
}

/// One numeric feature per probability row.
///
/// The probability table is consulted first; columns it lacks are taken from
/// the customer row with the same identity.
pub(crate) fn risk_feature(
    view: &FilteredView,
    name: &str,
) -> Result<Vec<Option<f64>>, AnalysisError> {
    let probs = view
        .probabilities
        .table()
        .ok_or(AnalysisError::ProbabilitiesUnavailable)?;
    if probs.column(name).is_some() {
        let column = require_numeric(probs, name)?;
        return Ok(column.cells().map(Cell::as_f64).collect());
    }
    let column = require_numeric(&view.customers, name)?;
    Ok(probs
        .row_index()
        .iter()
        .map(|&id| {
            view.customer_position(id)
                .and_then(|pos| column.get(pos).as_f64())
        })
        .collect())
}
