//! vintl - vue-i18n catalog extraction and reconciliation
//!
//! vintl is a CLI tool and library that extracts translation keys from Vue
//! single-file components and JS/TS modules, accumulates them into a
//! PO-style message catalog, and reconciles them against per-locale
//! translation files to report missing and unused keys.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (commands, reporting, file scan)
//! - `config`: Configuration file loading and the extraction rule set
//! - `core`: Extraction and reconciliation engine
//! - `issues`: Classification record types and reporting traits
//! - `utils`: Shared line-mapping utilities

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
