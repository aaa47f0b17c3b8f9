//! Core extraction and reconciliation engine.
//!
//! - `evaluate`: conservative literal evaluation of key expressions
//! - `extract`: grammar adapters and the file-dispatch orchestrator
//! - `po`: the accumulating PO-style message catalog
//! - `locale`: per-language catalog readers/writers
//! - `reconcile`: missing/unused classification
//! - `diagnostics`: the warning sink threaded through extraction

pub mod diagnostics;
pub mod evaluate;
pub mod extract;
pub mod locale;
pub mod po;
pub mod reconcile;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use extract::{Extraction, Extractor, Grammar, KeyUsage, Marker, RuleSet};
pub use locale::{Format, LocaleEntry, LocaleMessages};
pub use po::{CatalogError, PoCatalog, PoEntry, PoEntryBuilder};
pub use reconcile::{Reconciliation, UNTRANSLATED_PLACEHOLDER, reconcile};
