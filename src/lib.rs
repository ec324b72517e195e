//! # douane-insight
//!
//! Browse and summarize customs/trade spreadsheets filed as
//! `<data-root>/<category>/<year>/<MM>.xlsx`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use douane_insight::analyser::{summarize, DashboardOptions, TrendView};
//! use douane_insight::config::CatalogConfig;
//!
//! # fn main() -> douane_insight::error::Result<()> {
//! let config = CatalogConfig::default().with_env_overrides();
//! let catalog = config.catalog();
//!
//! for category in catalog.list_categories()? {
//!     for year in catalog.list_years(&category)? {
//!         println!("{category}/{year}: {:?}", catalog.list_month_files(&category, &year)?);
//!     }
//! }
//!
//! let df = catalog.load("Agroalimentaire", "2023", "01.xlsx")?;
//! let report = summarize(&df, &DashboardOptions::from_config(&config))?;
//! if let TrendView::Unavailable { reason } = &report.trend {
//!     println!("No trend chart: {reason}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`catalog`]: discovery, load and store over the folder convention
//! - [`analyser`]: column classification, statistics, filtering and chart data
//! - [`config`]: data root, file extension and engine settings
//! - [`error`]: error types and handling utilities
//! - `logging`: `env_logger` setup for embedding programs
//!
//! Nothing in this crate keeps state between calls: the catalog re-scans the
//! filesystem each time and every table is loaded fresh.

#![warn(clippy::all, rust_2018_idioms)]

pub mod analyser;
pub mod catalog;
pub mod config;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;

pub use catalog::{CatalogEntry, DatasetCatalog};
pub use error::{DouaneError, Result};
