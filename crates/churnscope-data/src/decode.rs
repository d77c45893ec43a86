//! Integer category codes to human-readable labels.
//!
//! A column is remapped only when it is present and numeric. Textual columns
//! are left alone, so decoding an already decoded table is a no-op. Codes
//! outside a mapping are kept as their rendered value rather than dropped.

use std::collections::BTreeMap;

use crate::{
    columns,
    table::{Column, ColumnValues, Table, render_float},
};

/// Code-to-label mapping for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMapping {
    pub column: String,
    pub labels: BTreeMap<i64, String>,
}

impl CodeMapping {
    pub fn new<I, S>(column: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            labels: labels.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }

    fn label_for_integer(&self, code: i64) -> String {
        self.labels
            .get(&code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    #[expect(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn label_for_float(&self, code: f64) -> String {
        let integral = code.trunc();
        if integral == code && integral.abs() < 9.0e15 {
            if let Some(label) = self.labels.get(&(integral as i64)) {
                return label.clone();
            }
        }
        render_float(code)
    }

    fn apply(&self, column: &Column) -> Option<Column> {
        let decoded = match column.values() {
            ColumnValues::Integer(values) => values
                .iter()
                .map(|v| v.map(|code| self.label_for_integer(code)))
                .collect(),
            ColumnValues::Float(values) => values
                .iter()
                .map(|v| v.map(|code| self.label_for_float(code)))
                .collect(),
            ColumnValues::Text(_) => return None,
        };
        Some(Column::new(column.name(), ColumnValues::Text(decoded)))
    }
}

const YES_NO: [(i64, &str); 2] = [(0, "No"), (1, "Yes")];
const INTERNET_ADDON: [(i64, &str); 3] = [(0, "No"), (1, "No internet service"), (2, "Yes")];

/// The fixed code tables of the telecom customer dataset.
#[must_use]
pub fn default_mappings() -> Vec<CodeMapping> {
    let mut mappings = vec![];
    for column in [
        "Partner",
        "Dependents",
        "PhoneService",
        "PaperlessBilling",
        "SeniorCitizen",
    ] {
        mappings.push(CodeMapping::new(column, YES_NO));
    }
    mappings.push(CodeMapping::new("gender", [(0, "Female"), (1, "Male")]));
    for column in [
        "OnlineSecurity",
        "DeviceProtection",
        "TechSupport",
        "StreamingTV",
        "StreamingMovies",
        "OnlineBackup",
    ] {
        mappings.push(CodeMapping::new(column, INTERNET_ADDON));
    }
    mappings.push(CodeMapping::new(
        "MultipleLines",
        [(0, "No"), (1, "No phone service"), (2, "Yes")],
    ));
    mappings.push(CodeMapping::new(
        columns::PAYMENT_METHOD,
        [
            (0, "Bank transfer (automatic)"),
            (1, "Credit card (automatic)"),
            (2, "Electronic check"),
            (3, "Mailed check"),
        ],
    ));
    mappings.push(CodeMapping::new(
        columns::CONTRACT,
        [(0, "Month-to-month"), (1, "One year"), (2, "Two year")],
    ));
    mappings.push(CodeMapping::new(
        columns::INTERNET_SERVICE,
        [(0, "DSL"), (1, "Fiber optic"), (2, "No")],
    ));
    mappings.push(CodeMapping::new(columns::CHURN, YES_NO));
    mappings
}

/// Returns a decoded copy of `table`. The input is left untouched.
#[must_use]
pub fn decode(table: &Table, mappings: &[CodeMapping]) -> Table {
    let mut decoded = table.clone();
    for mapping in mappings {
        let Some(column) = table.column(&mapping.column) else {
            tracing::trace!(column = %mapping.column, "column absent, skipping decode");
            continue;
        };
        match mapping.apply(column) {
            Some(column) => {
                tracing::debug!(column = %mapping.column, "decoded categorical codes");
                decoded = decoded.with_column(column);
            }
            None => tracing::trace!(column = %mapping.column, "column already textual"),
        }
    }
    decoded
}
