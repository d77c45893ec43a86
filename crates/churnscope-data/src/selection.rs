//! User-chosen filter values.
//!
//! A [`FilterSelection`] mirrors a [`FilterCatalog`]: the three core
//! selections plus one [`Selection`] per dynamic filter. It is a plain value,
//! replaced wholesale whenever a control changes, and round-trips through JSON
//! so the interaction layer can persist or hand it over.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{FilterCatalog, FilterKind, FilterSpec};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Inclusive bounds. Inverted bounds select nothing.
    Range { lower: f64, upper: f64 },
    /// Chosen rendered values. The empty set selects nothing at all.
    Set(BTreeSet<String>),
}

impl Selection {
    /// The default selection of a filter: the whole range or every value.
    #[must_use]
    pub fn default_for(spec: &FilterSpec) -> Self {
        match &spec.kind {
            FilterKind::Range { min, max } => Self::Range {
                lower: *min,
                upper: *max,
            },
            FilterKind::DiscreteSet { domain } => Self::Set(domain.iter().cloned().collect()),
        }
    }

    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Range { .. } => "range",
            Self::Set(_) => "set",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CoreSelection {
    pub contract: BTreeSet<String>,
    pub internet: BTreeSet<String>,
    /// Inclusive `(min, max)` tenure in months.
    pub tenure: (i64, i64),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterSelection {
    pub core: CoreSelection,
    /// Selection per dynamic filter column. Columns without an entry use the
    /// catalog default.
    #[serde(default)]
    pub dynamic: BTreeMap<String, Selection>,
}

impl FilterSelection {
    /// Selection with every control at its catalog default.
    #[must_use]
    pub fn defaults(catalog: &FilterCatalog) -> Self {
        Self {
            core: CoreSelection {
                contract: catalog.core.contract.iter().cloned().collect(),
                internet: catalog.core.internet.iter().cloned().collect(),
                tenure: catalog.core.tenure,
            },
            dynamic: catalog
                .dynamic
                .iter()
                .map(|spec| (spec.column.clone(), Selection::default_for(spec)))
                .collect(),
        }
    }

    /// Returns a new selection with one dynamic filter replaced.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, selection: Selection) -> Self {
        self.dynamic.insert(column.into(), selection);
        self
    }
}
