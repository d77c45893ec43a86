//! CSV loading and dataset preparation.
//!
//! Loading the customer dataset is the only fatal step of the pipeline: a
//! missing or unreadable file stops everything before any filter runs. The
//! probability dataset is optional; when its file does not exist the dataset
//! is simply absent.

use std::{
    collections::HashSet,
    fs::File,
    io,
    path::{Path, PathBuf},
};

use crate::{
    columns,
    decode::{self, CodeMapping},
    table::{Column, ColumnValues, Table},
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("dataset not found: {}", path.display())]
    DatasetNotFound { path: PathBuf },
    #[display("failed to open dataset {}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to parse CSV {}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[display("required column '{column}' is missing")]
    MissingColumn { column: String },
    #[display("column '{column}' must be numeric")]
    NonNumericColumn { column: String },
    #[display("duplicate customer identifier '{id}'")]
    DuplicateIdentifier { id: String },
    #[display("invalid churn probability at row {row}: {reason}")]
    InvalidProbability { row: usize, reason: String },
}

/// Cell spellings read as a missing value, besides the empty cell.
///
/// Matching is exact and case-sensitive.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing_token(field: &str) -> bool {
    field.is_empty() || MISSING_TOKENS.contains(&field)
}

/// Reads a CSV document into a table, inferring one type per column.
///
/// Empty cells and [`MISSING_TOKENS`] are missing. A column is `Integer`
/// when every remaining cell parses as `i64`, `Float` when every remaining
/// cell parses as `f64`, and `Text` otherwise. Floats that parse to NaN are
/// missing as well.
pub fn read_table<R>(reader: R) -> Result<Table, csv::Error>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut raw = vec![Vec::<Option<String>>::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (cells, field) in raw.iter_mut().zip(record.iter()) {
            cells.push((!is_missing_token(field)).then(|| field.to_owned()));
        }
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Table::new(columns))
}

fn infer_column(name: &str, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten();
    if present().all(|c| c.parse::<i64>().is_ok()) {
        return Column::integer(
            name,
            cells.iter().map(|c| c.as_deref().and_then(|c| c.parse().ok())),
        );
    }
    if present().all(|c| c.parse::<f64>().is_ok()) {
        return Column::float(
            name,
            cells.iter().map(|c| {
                c.as_deref()
                    .and_then(|c| c.parse::<f64>().ok())
                    .filter(|v| !v.is_nan())
            }),
        );
    }
    Column::text(name, cells)
}

/// Reads a CSV file into a table.
pub fn read_table_file<P>(path: P) -> Result<Table, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::DatasetNotFound {
                path: path.to_owned(),
            }
        } else {
            LoadError::Open {
                path: path.to_owned(),
                source,
            }
        }
    })?;
    read_table(io::BufReader::new(file)).map_err(|source| LoadError::Csv {
        path: path.to_owned(),
        source,
    })
}

/// Converts a column to floats, turning unparsable text into missing values.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn coerce_numeric(column: &Column) -> Column {
    let values: Vec<Option<f64>> = match column.values() {
        ColumnValues::Integer(v) => v.iter().map(|x| x.map(|x| x as f64)).collect(),
        ColumnValues::Float(v) => v.iter().map(|x| x.filter(|x| !x.is_nan())).collect(),
        ColumnValues::Text(v) => v
            .iter()
            .map(|x| {
                x.as_deref()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .filter(|v| !v.is_nan())
            })
            .collect(),
    };
    Column::float(column.name(), values)
}

fn coerce_total_charges(table: Table) -> Table {
    match table.column(columns::TOTAL_CHARGES) {
        Some(column) if !matches!(column.values(), ColumnValues::Float(_)) => {
            let coerced = coerce_numeric(column);
            let missing = coerced.cells().filter(|c| c.is_missing()).count();
            tracing::debug!(missing, "coerced TotalCharges to numeric");
            table.with_column(coerced)
        }
        _ => table,
    }
}

/// The decoded customer table plus the optional probability table.
///
/// Both tables are immutable once built; filtered views are derived copies.
#[derive(Debug, Clone)]
pub struct Dataset {
    customers: Table,
    probabilities: Option<Table>,
}

impl Dataset {
    /// Loads and prepares both datasets from disk.
    ///
    /// A missing customer file is fatal. A probability path that does not
    /// exist leaves the probability dataset absent.
    pub fn load(customers: &Path, probabilities: Option<&Path>) -> Result<Self, LoadError> {
        tracing::info!(path = %customers.display(), "loading customer dataset");
        let raw = read_table_file(customers)?;

        let probabilities = match probabilities {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "loading probability dataset");
                Some(read_table_file(path)?)
            }
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "probability dataset not found, risk views unavailable"
                );
                None
            }
            None => None,
        };

        Self::from_tables(raw, probabilities, &decode::default_mappings())
    }

    /// Prepares already-parsed tables: coerces `TotalCharges`, validates the
    /// required columns and decodes categorical codes.
    pub fn from_tables(
        raw_customers: Table,
        raw_probabilities: Option<Table>,
        mappings: &[CodeMapping],
    ) -> Result<Self, LoadError> {
        let customers = coerce_total_charges(raw_customers);
        validate_customers(&customers)?;
        let customers = decode::decode(&customers, mappings);

        let probabilities = raw_probabilities
            .map(|table| {
                let table = coerce_total_charges(table);
                validate_probabilities(&table)?;
                Ok::<_, LoadError>(decode::decode(&table, mappings))
            })
            .transpose()?;

        tracing::info!(
            rows = customers.row_count(),
            columns = customers.columns().len(),
            probabilities = ?probabilities.as_ref().map(Table::row_count),
            "dataset ready"
        );
        Ok(Self {
            customers,
            probabilities,
        })
    }

    /// The decoded customer table.
    #[must_use]
    pub fn customers(&self) -> &Table {
        &self.customers
    }

    /// The decoded probability table, `None` when it was not supplied.
    #[must_use]
    pub fn probabilities(&self) -> Option<&Table> {
        self.probabilities.as_ref()
    }
}

fn validate_customers(table: &Table) -> Result<(), LoadError> {
    for name in columns::REQUIRED {
        if table.column(name).is_none() {
            return Err(LoadError::MissingColumn {
                column: name.to_owned(),
            });
        }
    }
    for name in [columns::TENURE, columns::MONTHLY_CHARGES] {
        if table.column(name).is_some_and(|c| !c.is_numeric()) {
            return Err(LoadError::NonNumericColumn {
                column: name.to_owned(),
            });
        }
    }

    if let Some(ids) = table.column(columns::CUSTOMER_ID) {
        let mut seen = HashSet::new();
        for cell in ids.cells() {
            let id = cell.render();
            if !seen.insert(id.clone()) {
                return Err(LoadError::DuplicateIdentifier { id });
            }
        }
    }
    Ok(())
}

fn validate_probabilities(table: &Table) -> Result<(), LoadError> {
    let column =
        table
            .column(columns::CHURN_PROBABILITY)
            .ok_or_else(|| LoadError::MissingColumn {
                column: columns::CHURN_PROBABILITY.to_owned(),
            })?;
    if !column.is_numeric() {
        return Err(LoadError::NonNumericColumn {
            column: columns::CHURN_PROBABILITY.to_owned(),
        });
    }
    for (row, cell) in column.cells().enumerate() {
        if let Some(p) = cell.as_f64().filter(|p| !(0.0..=1.0).contains(p)) {
            return Err(LoadError::InvalidProbability {
                row,
                reason: format!("{p} is outside [0, 1]"),
            });
        }
    }
    Ok(())
}
