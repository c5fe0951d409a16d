//! CO2 report browsing.
//!
//! Lists the CSV reports the backend stores, newest first, with preview
//! (truncated client-side) and download-to-disk. The listing footer
//! carries the same summary the dashboard shows: task count, estimated
//! total CO2 saved, and the display-only cloud billing estimate.

use std::cmp::Ordering;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::api::{ApiClient, Report};
use crate::cli::OutputFormat;
use crate::config::{self, GridwatchConfig};
use crate::util;

/// Preview size: one header line plus ten data rows.
pub const PREVIEW_MAX_LINES: usize = 11;

/// Demo-grade estimate of CO2 saved per completed task (grams).
///
/// The real figure would come from parsing each report's `co2_saved`
/// column; the original UI ships this flat average instead.
pub const AVG_SAVED_PER_TASK_G: f64 = 5.5;

// ---------------------------------------------------------------------------
// Sorting / truncation (pure)
// ---------------------------------------------------------------------------

/// Sort reports by `modified` descending.
///
/// Stable: ties (and unparseable stamps, which sort last) keep the
/// backend's listing order.
pub fn sort_reports(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        match (
            util::parse_timestamp(&a.modified),
            util::parse_timestamp(&b.modified),
        ) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Truncate a report body to at most `max_lines` lines.
pub fn preview_lines(body: &str, max_lines: usize) -> String {
    body.lines()
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Billing estimate
// ---------------------------------------------------------------------------

/// Read the locally stored cloud-hours counter.
///
/// The file `~/.gridwatch/cloud-hours` holds a numeric string maintained
/// outside this tool; missing or malformed reads as 0. Never written
/// here — the estimate is display-only.
pub fn stored_cloud_hours() -> f64 {
    cloud_hours_path()
        .and_then(|p| fs::read_to_string(p).ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn cloud_hours_path() -> Option<PathBuf> {
    config::state_dir().map(|dir| dir.join("cloud-hours"))
}

/// Cost estimate for the given hours at the configured hourly rate.
pub fn billing_estimate(hours: f64, hourly_rate_usd: f64) -> f64 {
    hours * hourly_rate_usd
}

// ---------------------------------------------------------------------------
// gridwatch reports list
// ---------------------------------------------------------------------------

/// Fetch, sort, and print the report listing.
pub fn run_list(client: &ApiClient, config: &GridwatchConfig, format: OutputFormat) -> Result<()> {
    let mut reports = client.reports().context("failed to load reports")?;
    sort_reports(&mut reports);

    if reports.is_empty() {
        println!(
            "{}",
            "No reports found. Run some tasks to generate reports!".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_list_json(&reports)?,
        OutputFormat::Csv => print_list_csv(&reports),
        OutputFormat::Table => print_list_table(&reports, config),
    }

    Ok(())
}

fn print_list_table(reports: &[Report], config: &GridwatchConfig) {
    println!("{}", "CO2 Reports".bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<34} {:>10} {:<20}",
        "Report", "Size", "Modified"
    );
    println!("  {}", "-".repeat(68));

    for (i, report) in reports.iter().enumerate() {
        let line = format!(
            "  {:<34} {:>10} {:<20}",
            util::truncate(&report.filename, 34),
            util::format_file_size(report.size),
            util::format_timestamp(&report.modified),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }

    let total_saved = reports.len() as f64 * AVG_SAVED_PER_TASK_G;
    let hours = stored_cloud_hours();
    let cost = billing_estimate(hours, config.hourly_rate_usd);

    println!();
    println!("  {} {}", "Tasks completed:".bold(), reports.len());
    println!(
        "  {} {:.2} g {}",
        "Est. CO2 saved: ".bold(),
        total_saved,
        "(flat average, not measured)".dimmed()
    );
    println!(
        "  {} {hours:.2} h → ${cost:.2}",
        "Cloud billing:  ".bold()
    );
}

fn print_list_json(reports: &[Report]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

fn print_list_csv(reports: &[Report]) {
    println!("filename,size,modified");
    for r in reports {
        println!("{},{},{}", r.filename, r.size, r.modified);
    }
}

// ---------------------------------------------------------------------------
// gridwatch reports preview | download
// ---------------------------------------------------------------------------

/// Fetch one report and print its first [`PREVIEW_MAX_LINES`] lines.
pub fn run_preview(client: &ApiClient, filename: &str) -> Result<()> {
    let body = client.report_body(filename)?;
    let preview = preview_lines(&body, PREVIEW_MAX_LINES);
    let total_lines = body.lines().count();

    println!("{}", filename.bold().cyan());
    println!("{}", "=".repeat(60));
    println!("{preview}");
    if total_lines > PREVIEW_MAX_LINES {
        println!();
        println!(
            "  {}",
            format!(
                "Showing first {} of {total_lines} lines. Download for the full report.",
                PREVIEW_MAX_LINES
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Download one report to disk (default: the report's own filename).
pub fn run_download(client: &ApiClient, filename: &str, out: Option<PathBuf>) -> Result<()> {
    let body = client.report_body(filename)?;
    let dest = out.unwrap_or_else(|| PathBuf::from(filename));
    fs::write(&dest, body).with_context(|| format!("failed to write {}", dest.display()))?;
    println!("{} Saved {}", "✓".green().bold(), dest.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
