//! Command orchestration: config loading, extraction, reconciliation,
//! reporting and write-back.

use std::env;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;

use super::args::{Arguments, CheckCommand, Command, CommonArgs, ExtractCommand};
use super::exit_status::ExitStatus;
use super::{file_scanner, report};
use crate::config::{self, CONFIG_FILE_NAME, Config};
use crate::core::locale::{Format, read, write};
use crate::core::{Diagnostics, Extraction, Extractor, reconcile};

pub fn run_cli(args: Arguments) -> Result<ExitCode> {
    let command = match args.with_command_or_help() {
        Some(args) => args.command,
        None => None,
    };
    match command {
        Some(Command::Check(cmd)) => run_check(cmd),
        Some(Command::Extract(cmd)) => run_extract(cmd),
        Some(Command::Init) => run_init(),
        None => Ok(ExitStatus::Success.into()),
    }
}

fn load_config_with_overrides(common: &CommonArgs) -> Result<Config> {
    let cwd = env::current_dir().context("Failed to resolve current directory")?;
    let mut config = config::load_config(&cwd)?.config;

    if let Some(source_root) = &common.source_root {
        config.source_root = source_root.to_string_lossy().into_owned();
    }
    if let Some(languages_root) = &common.languages_root {
        config.languages_root = languages_root.to_string_lossy().into_owned();
    }
    if let Some(locales) = &common.locales {
        config.locales = locales
            .split(',')
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
    }
    if let Some(format) = &common.language_format {
        config.language_format = Format::parse(format)
            .with_context(|| format!("Unknown language format '{}'", format))?;
    }
    Ok(config)
}

/// Scan the source tree and run one extraction pass over it, in sorted
/// file order. Unreadable files warn and are skipped.
fn run_extraction(config: &Config, verbose: bool) -> Result<(Extraction, usize)> {
    let rules = config.rule_set()?;
    let scan = file_scanner::scan_files(
        &config.source_root,
        &config.includes,
        &config.ignores,
        &config.extensions,
        verbose,
    );

    let mut extractor = Extractor::new(&rules, &config.extensions);
    for file in &scan.files {
        match fs::read_to_string(file) {
            Ok(source) => extractor
                .extract_file(file, &source)
                .with_context(|| format!("Fatal catalog error in '{}'", file))?,
            Err(err) => extractor.warn(file, None, format!("failed to read file: {}", err)),
        }
    }
    Ok((extractor.finish(), scan.files.len()))
}

fn run_check(cmd: CheckCommand) -> Result<ExitCode> {
    let config = load_config_with_overrides(&cmd.common)?;
    // Locale catalogs are read first: an unreadable languages root is a
    // configuration error and aborts before any extraction work.
    let mut locale_diagnostics = Diagnostics::new();
    let locales = read::read_locales(
        Path::new(&config.languages_root),
        &config.locales,
        config.language_format,
        &config.key_separator,
        &mut locale_diagnostics,
    )?;

    let (extraction, file_count) = run_extraction(&config, cmd.common.verbose)?;

    let reconciliation = reconcile(&extraction.usages, &locales);

    report::print_warnings(&extraction.diagnostics);
    report::print_warnings(&locale_diagnostics);
    report::print_report(&reconciliation);
    if reconciliation.is_empty() {
        report::print_success(file_count, locales.len());
    }

    if cmd.apply {
        let summary = write::write_missing(
            Path::new(&config.languages_root),
            config.language_format,
            &config.key_separator,
            &reconciliation.missing,
            config.sort,
        )?;
        if summary.keys_added > 0 {
            println!(
                "{} {} missing key(s) added to {} language file(s)",
                "Updated:".green().bold(),
                summary.keys_added,
                summary.files_written
            );
        }
    }

    Ok(if reconciliation.is_empty() {
        ExitStatus::Success.into()
    } else {
        ExitStatus::Failure.into()
    })
}

fn run_extract(cmd: ExtractCommand) -> Result<ExitCode> {
    let config = load_config_with_overrides(&cmd.common)?;
    let (extraction, _) = run_extraction(&config, cmd.common.verbose)?;

    report::print_warnings(&extraction.diagnostics);
    let catalog = extraction.catalog.serialize();
    match &cmd.output {
        Some(path) => fs::write(path, catalog)
            .with_context(|| format!("Failed to write catalog to '{}'", path.display()))?,
        None => print!("{}", catalog),
    }
    Ok(ExitStatus::Success.into())
}

fn run_init() -> Result<ExitCode> {
    let path = Path::new(CONFIG_FILE_NAME);
    if path.exists() {
        println!("{} already exists", CONFIG_FILE_NAME);
        return Ok(ExitStatus::Success.into());
    }
    fs::write(path, config::default_config_json()?)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!(
        "{} {}",
        report::SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );
    Ok(ExitStatus::Success.into())
}
