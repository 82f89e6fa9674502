//! `bomcheck-recon`: BOM consolidation and part-number reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables, returns the merged BOM and
//! the annotated reconciliation. No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod consolidate;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod normalize;

pub use config::ReconConfig;
pub use consolidate::consolidate;
pub use engine::{assemble, reconcile, run};
pub use error::ReconError;
pub use model::{Cell, ConsolidatedTable, NamedTable, ReconResult, ReconciledTable, Table};
pub use normalize::{normalize_key, KeyNormalizer};
