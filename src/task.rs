//! Task upload and execution.
//!
//! A run is a strictly linear workflow against the backend:
//!
//! ```text
//! Idle → Uploading → Uploaded → Executing → Completed
//!                 \__________ any failure ________→ Failed
//! ```
//!
//! One run at a time — the runner is consumed by a single `run` call and
//! a new invocation builds a fresh one, so there is nothing to re-enable
//! and no concurrent-run hazard. Every transition appends to a visible
//! transcript; failures land in the transcript too and never panic.
//!
//! After a completed run a carbon report is persisted. Its execution
//! time and savings are **fabricated** (random, not measured) — the
//! transcript labels them as estimates, and [`build_report`] is pure so
//! a real measurement pipeline can replace [`fabricate_estimates`] at
//! one call site.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use rand::Rng;

use crate::api::{ApiClient, CarbonReading, CarbonReport};
use crate::config::GridwatchConfig;
use crate::notify;
use crate::util;

/// States of a single task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Uploading,
    Uploaded,
    Executing,
    Completed,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Executing => "executing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Report estimates
// ---------------------------------------------------------------------------

/// Fabricated per-run figures. Stand-ins, not telemetry.
#[derive(Debug, Clone, Copy)]
pub struct ReportEstimates {
    /// Pretend execution time, seconds.
    pub execution_time_s: f64,
    /// Pretend CO2 saved versus a dirtier grid, grams.
    pub co2_saved_g: f64,
}

/// Fabricate the estimate figures: 50–150 s runtime, 0–10 g saved.
pub fn fabricate_estimates<R: Rng>(rng: &mut R) -> ReportEstimates {
    ReportEstimates {
        execution_time_s: rng.gen_range(50.0..150.0),
        co2_saved_g: rng.gen_range(0.0..10.0),
    }
}

/// Build the report record from a reading and the estimate figures.
///
/// `energy_kwh = power_watts × t / (3600 × 1000)`, emissions follow from
/// the reading. Field formatting matches what the report store writes
/// into its CSVs.
pub fn build_report(
    task_name: &str,
    reading: &CarbonReading,
    estimates: ReportEstimates,
    power_watts: f64,
) -> CarbonReport {
    let energy_kwh = power_watts * estimates.execution_time_s / (3600.0 * 1000.0);
    let co2_grams = energy_kwh * reading.carbon_intensity;

    CarbonReport {
        task_name: task_name.to_string(),
        region: reading.region.clone(),
        carbon_intensity: reading.carbon_intensity,
        execution_time: format!("{:.2}", estimates.execution_time_s),
        energy_kwh: format!("{energy_kwh:.6}"),
        co2_grams: format!("{co2_grams:.4}"),
        co2_saved: format!("{:.4}", estimates.co2_saved_g),
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// One task run: state, transcript, and the eventual download link.
#[derive(Debug)]
pub struct TaskRunner<'a> {
    client: &'a ApiClient,
    config: &'a GridwatchConfig,
    state: RunState,
    transcript: Vec<String>,
    download_url: Option<String>,
}

impl<'a> TaskRunner<'a> {
    pub fn new(client: &'a ApiClient, config: &'a GridwatchConfig) -> Self {
        Self {
            client,
            config,
            state: RunState::Idle,
            transcript: Vec::new(),
            download_url: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Download link for the output archive, set on completion.
    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    /// Execute the full workflow for one local archive.
    ///
    /// Returns the terminal state. Rejects non-`.zip` paths before any
    /// network traffic (state stays `Idle`).
    pub fn run(&mut self, path: &Path) -> RunState {
        if !is_zip(path) {
            notify::error("Please select a ZIP file");
            return self.state;
        }

        // Upload
        self.state = RunState::Uploading;
        self.log("Uploading task file...");
        let receipt = match self.client.upload_task(path) {
            Ok(receipt) => receipt,
            Err(e) => return self.fail(&e),
        };
        self.state = RunState::Uploaded;
        self.log(format!("File uploaded: {}", receipt.filename));
        self.log(format!("Size: {}", util::format_file_size(receipt.size)));
        self.log("");

        // Execute
        self.state = RunState::Executing;
        self.log("Starting task execution...");
        self.log("This may take a few moments...");
        self.log("");
        let outcome = match self.client.run_task(&receipt.filename) {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(&e),
        };

        self.log("Task completed successfully!");
        self.log("");
        self.log("Output logs:");
        self.log("-".repeat(50));
        if outcome.logs.is_empty() {
            self.log("No logs found in output");
        } else {
            for entry in &outcome.logs {
                self.log(format!("{}:", entry.filename));
                self.log(entry.content.clone());
                self.log("");
            }
        }
        self.log("-".repeat(50));

        let url = self.client.output_download_url(&outcome.output_file);
        self.log(format!("Output archive: {url}"));
        self.download_url = Some(url);

        self.state = RunState::Completed;
        notify::success("Task completed successfully!");

        // Post-hoc carbon report, on completion only. A failure here is
        // logged but does not demote the completed run.
        let task_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        if let Err(e) = self.save_carbon_report(task_name) {
            self.log(format!("Could not save carbon report: {e:#}"));
        }

        self.state
    }

    /// Fetch a fresh reading, fabricate the figures, persist the report.
    fn save_carbon_report(&mut self, task_name: &str) -> Result<()> {
        let reading = self
            .client
            .carbon_intensity(&self.config.region)
            .context("no carbon reading for the report")?;
        let estimates = fabricate_estimates(&mut rand::thread_rng());
        let report = build_report(task_name, &reading, estimates, self.config.power_watts);

        self.client.save_carbon_report(&report)?;
        self.log(format!(
            "Carbon report saved: {} g CO2 emitted (estimated, not measured)",
            report.co2_grams
        ));
        Ok(())
    }

    fn fail(&mut self, error: &anyhow::Error) -> RunState {
        self.state = RunState::Failed;
        self.log("");
        self.log(format!("Error: {error:#}"));
        notify::error("Task execution failed");
        self.state
    }

    /// Append to the transcript and echo to the terminal.
    fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        println!("  {line}");
        self.transcript.push(line);
    }
}

/// Only `.zip` archives are accepted (case-insensitive).
fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// `gridwatch task FILE.zip` — run the workflow and report the outcome.
pub fn run_command(client: &ApiClient, config: &GridwatchConfig, path: &Path) -> Result<()> {
    println!("{}", "Task Execution".bold().cyan());
    println!("{}", "=".repeat(50));

    let mut runner = TaskRunner::new(client, config);
    match runner.run(path) {
        RunState::Completed => Ok(()),
        RunState::Idle => anyhow::bail!("{} is not a .zip archive", path.display()),
        _ => anyhow::bail!("task run did not complete"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn zip_extension_check() {
        assert!(is_zip(Path::new("task.zip")));
        assert!(is_zip(Path::new("TASK.ZIP")));
        assert!(!is_zip(Path::new("task.tar.gz")));
        assert!(!is_zip(Path::new("task")));
        assert!(!is_zip(Path::new("zip")));
    }

    #[test]
    fn estimates_stay_in_their_bands() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let est = fabricate_estimates(&mut rng);
            assert!((50.0..150.0).contains(&est.execution_time_s));
            assert!((0.0..10.0).contains(&est.co2_saved_g));
        }
    }

    #[test]
    fn report_arithmetic_and_formatting() {
        let reading = CarbonReading {
            region: "IN-WE".to_string(),
            carbon_intensity: 700.0,
        };
        let estimates = ReportEstimates {
            execution_time_s: 100.0,
            co2_saved_g: 5.0,
        };

        let report = build_report("train.zip", &reading, estimates, 65.0);

        assert_eq!(report.task_name, "train.zip");
        assert_eq!(report.region, "IN-WE");
        assert_eq!(report.carbon_intensity, 700.0);
        assert_eq!(report.execution_time, "100.00");
        // 65 W × 100 s / 3.6e6 = 0.001806 kWh; × 700 g/kWh = 1.2639 g
        assert_eq!(report.energy_kwh, "0.001806");
        assert_eq!(report.co2_grams, "1.2639");
        assert_eq!(report.co2_saved, "5.0000");
    }
}
