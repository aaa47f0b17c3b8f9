//! Report formatting and printing.
//!
//! Missing and unused keys are displayed as aligned tables, warnings go to
//! stderr, and a cargo-style summary closes the run. Separate from core
//! logic so vintl can be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::Reconciliation;
use crate::core::diagnostics::Diagnostics;
use crate::issues::{Report, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print the reconciliation report to stdout.
pub fn print_report(report: &Reconciliation) {
    report_to(report, &mut io::stdout().lock());
}

/// Print the reconciliation report to a custom writer.
pub fn report_to<W: Write>(report: &Reconciliation, writer: &mut W) {
    if report.missing.is_empty() {
        let _ = writeln!(writer, "{}", "No missing keys!".green());
    } else {
        let _ = writeln!(writer, "{}", "Missing keys:".magenta().bold());
        let rows: Vec<Vec<String>> = report
            .missing
            .iter()
            .map(|issue| {
                vec![
                    issue.key.clone(),
                    issue.locale.clone(),
                    format!("{}:{}", issue.file_path, issue.line),
                    if issue.is_new { "new" } else { "tracked" }.to_string(),
                ]
            })
            .collect();
        print_table(writer, &["key", "locale", "location", "status"], &rows);
    }

    let _ = writeln!(writer);
    if report.unused.is_empty() {
        let _ = writeln!(writer, "{}", "No unused keys!".green());
    } else {
        let _ = writeln!(writer, "{}", "Unused keys:".magenta().bold());
        let rows: Vec<Vec<String>> = report
            .unused
            .iter()
            .map(|issue| {
                vec![
                    issue.key.clone(),
                    issue.locale.clone(),
                    issue.value.clone(),
                    issue.file_path.clone(),
                ]
            })
            .collect();
        print_table(writer, &["key", "locale", "value", "file"], &rows);
    }

    print_summary(report, writer);
}

/// Print an aligned table; column widths follow display width so CJK
/// values stay lined up.
fn print_table<W: Write>(writer: &mut W, headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| UnicodeWidthStr::width(*h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let render = |cells: Vec<String>, writer: &mut W| {
        let mut line = String::from("  ");
        for (i, cell) in cells.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < cells.len() {
                let padding = widths[i] - UnicodeWidthStr::width(cell.as_str()) + 2;
                line.push_str(&" ".repeat(padding));
            }
        }
        let _ = writeln!(writer, "{}", line.trim_end());
    };

    render(
        headers.iter().map(|h| h.dimmed().to_string()).collect(),
        writer,
    );
    for row in rows {
        render(row.clone(), writer);
    }
}

fn print_summary<W: Write>(report: &Reconciliation, writer: &mut W) {
    let issues = report.issues();
    if issues.is_empty() {
        return;
    }
    let errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let warnings = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Warning)
        .count();

    let _ = writeln!(
        writer,
        "\n{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        errors,
        if errors == 1 { "error" } else { "errors" }.red(),
        warnings,
        if warnings == 1 { "warning" } else { "warnings" }.yellow()
    );
}

/// Print a success message when extraction and reconciliation are clean.
pub fn print_success(source_files: usize, locale_files: usize) {
    print_success_to(source_files, locale_files, &mut io::stdout().lock());
}

pub fn print_success_to<W: Write>(source_files: usize, locale_files: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Checked {} source {} against {} locale {}",
            source_files,
            if source_files == 1 { "file" } else { "files" },
            locale_files,
            if locale_files == 1 { "catalog" } else { "catalogs" }
        )
        .green()
    );
}

/// Print collected extraction warnings to stderr.
pub fn print_warnings(diagnostics: &Diagnostics) {
    print_warnings_to(diagnostics, &mut io::stderr().lock());
}

pub fn print_warnings_to<W: Write>(diagnostics: &Diagnostics, writer: &mut W) {
    for warning in diagnostics.warnings() {
        let _ = writeln!(writer, "{} {}", "warning:".bold().yellow(), warning);
    }
}
