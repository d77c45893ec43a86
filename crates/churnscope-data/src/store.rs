//! Load-once dataset handle.
//!
//! The decoded dataset and its filter catalog are computed on first access
//! and never invalidated. Every later filter cycle reads the same immutable
//! values, so catalog defaults stay stable across interactions.

use std::{path::Path, sync::OnceLock};

use crate::{
    catalog::FilterCatalog,
    load::{Dataset, LoadError},
    predicate::{CompileError, RowPredicate},
    selection::FilterSelection,
    view::{self, FilteredView},
};

/// A dataset together with the catalog derived from it.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub catalog: FilterCatalog,
}

impl LoadedDataset {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        let catalog = FilterCatalog::build(dataset.customers());
        Self { dataset, catalog }
    }

    /// Selection with every control at its default.
    #[must_use]
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::defaults(&self.catalog)
    }

    /// Runs one full filter cycle: compile the selection, then materialize.
    pub fn apply(&self, selection: &FilterSelection) -> Result<FilteredView, CompileError> {
        let predicate = RowPredicate::compile(self.dataset.customers(), &self.catalog, selection)?;
        Ok(view::materialize(&self.dataset, &predicate))
    }
}

/// Single-assignment cache of a [`LoadedDataset`].
#[derive(Debug, Default)]
pub struct DatasetStore {
    loaded: OnceLock<LoadedDataset>,
}

impl DatasetStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loaded: OnceLock::new(),
        }
    }

    /// The process-wide store.
    #[must_use]
    pub fn global() -> &'static Self {
        static STORE: DatasetStore = DatasetStore::new();
        &STORE
    }

    /// Returns the cached dataset, loading it from disk on first call.
    ///
    /// Paths passed after the first successful load are ignored. A failed
    /// load leaves the store empty.
    pub fn load_once(
        &self,
        customers: &Path,
        probabilities: Option<&Path>,
    ) -> Result<&LoadedDataset, LoadError> {
        self.get_or_try_init(|| Dataset::load(customers, probabilities))
    }

    /// Like [`Self::load_once`] with an arbitrary dataset source.
    pub fn get_or_try_init<F>(&self, load: F) -> Result<&LoadedDataset, LoadError>
    where
        F: FnOnce() -> Result<Dataset, LoadError>,
    {
        if let Some(loaded) = self.loaded.get() {
            tracing::trace!("dataset served from cache");
            return Ok(loaded);
        }
        let loaded = LoadedDataset::new(load()?);
        Ok(self.loaded.get_or_init(|| loaded))
    }

    #[must_use]
    pub fn get(&self) -> Option<&LoadedDataset> {
        self.loaded.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, load::read_table};

    const CSV: &str = "\
customerID,Contract,InternetService,tenure,MonthlyCharges,TotalCharges,Churn
a,0,1,1,29.85,29.85,1
b,1,0,34,56.95,1889.5,0
";

    fn dataset() -> Result<Dataset, LoadError> {
        let raw = read_table(CSV.as_bytes()).map_err(|source| LoadError::Csv {
            path: "inline".into(),
            source,
        })?;
        Dataset::from_tables(raw, None, &decode::default_mappings())
    }

    #[test]
    fn test_loads_exactly_once() {
        let store = DatasetStore::new();
        let mut calls = 0;
        store
            .get_or_try_init(|| {
                calls += 1;
                dataset()
            })
            .unwrap();
        store
            .get_or_try_init(|| {
                calls += 1;
                dataset()
            })
            .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(store.get().unwrap().dataset.customers().row_count(), 2);
    }

    #[test]
    fn test_failed_load_leaves_store_empty() {
        let store = DatasetStore::new();
        let err = store
            .load_once(Path::new("/nonexistent/customers.csv"), None)
            .unwrap_err();
        assert!(matches!(err, LoadError::DatasetNotFound { .. }));
        assert!(store.get().is_none());
    }

    #[test]
    fn test_default_selection_keeps_everything() {
        let loaded = LoadedDataset::new(dataset().unwrap());
        let view = loaded.apply(&loaded.default_selection()).unwrap();
        assert_eq!(view.customers.row_count(), 2);
        assert!(view.probabilities.is_absent());
    }
}
