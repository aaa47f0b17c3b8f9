//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `check`: extract keys and reconcile them against the locale catalogs
//! - `extract`: write the accumulated message catalog in PO form
//! - `init`: create a `.vintlrc.json` configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Common arguments shared by the scanning commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Source code root directory (overrides config file)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Locale catalogs directory (overrides config file)
    #[arg(long)]
    pub languages_root: Option<PathBuf>,

    /// Comma-separated locale list (overrides config file)
    #[arg(long)]
    pub locales: Option<String>,

    /// Locale catalog format: json, yaml or js (overrides config file)
    #[arg(long)]
    pub language_format: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Write the untranslated placeholder into the locale files for every
    /// new missing key (default is report-only)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Write the PO catalog to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report missing and unused translation keys per locale
    Check(CheckCommand),
    /// Extract all message keys into a PO catalog
    Extract(ExtractCommand),
    /// Initialize a new .vintlrc.json configuration file
    Init,
}
