//! Filter-and-derive pipeline over the telecom customer dataset.
//!
//! The pipeline runs in this order:
//!
//! 1. [`load`]: read the customer CSV (fatal when missing) and the optional
//!    probability CSV, coerce `TotalCharges`, validate required columns
//! 2. [`decode`]: replace integer category codes with labels
//! 3. [`catalog`]: derive one filter control per eligible column
//! 4. [`predicate`]: compile the user's [`selection`] into a row predicate
//! 5. [`view`]: filter the customers and align the probability rows by
//!    load-time identity
//! 6. [`metrics`]: headline counts and rates of the filtered view
//!
//! [`store`] caches steps 1 to 3 for the lifetime of the process.
//!
//! # Examples
//!
//! ```
//! use churnscope_data::{
//!     decode,
//!     load::{self, Dataset},
//!     metrics::SummaryMetrics,
//!     store::LoadedDataset,
//! };
//!
//! let csv = "\
//! customerID,Contract,InternetService,tenure,MonthlyCharges,TotalCharges,Churn
//! a,0,1,3,70.0,210.0,1
//! b,2,0,60,20.0,1200.0,0
//! ";
//! let raw = load::read_table(csv.as_bytes())?;
//! let dataset = Dataset::from_tables(raw, None, &decode::default_mappings())?;
//! let loaded = LoadedDataset::new(dataset);
//!
//! let mut selection = loaded.default_selection();
//! selection.core.contract = ["Month-to-month".to_owned()].into();
//! let view = loaded.apply(&selection)?;
//!
//! let metrics = SummaryMetrics::from_table(&view.customers);
//! assert_eq!(metrics.total, 1);
//! assert_eq!(metrics.churn_count, 1);
//! assert!(view.probabilities.is_absent());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod columns;
pub mod decode;
pub mod load;
pub mod metrics;
pub mod predicate;
pub mod selection;
pub mod store;
pub mod table;
pub mod view;
