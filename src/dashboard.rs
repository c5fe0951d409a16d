//! Live dashboard and carbon trend views.
//!
//! The dashboard repaints from per-panel view-models on three
//! independent cadences: the header carbon line (30 s), the live chart
//! (60 s), and the stats panel (60 s). A failed fetch leaves its panel's
//! last value on screen — stale beats blank — and the other panels keep
//! their own schedules. Fetching, state, and rendering are separate:
//! every panel renders via a pure function over its view-model.

use std::time::{Duration, Instant};

use anyhow::Result;
use colored::Colorize;

use crate::api::{ApiClient, CarbonReading};
use crate::carbon;
use crate::config::GridwatchConfig;
use crate::notify;
use crate::reports::AVG_SAVED_PER_TASK_G;
use crate::series::{self, CarbonSeries, HISTORY_HOURS};

/// Reference intensity for Stockholm (SE-SE4), gCO2/kWh.
const STOCKHOLM_REFERENCE_G: f64 = 50.0;

/// Bar width of the terminal charts, in cells.
const CHART_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// View-models
// ---------------------------------------------------------------------------

/// Stats panel state. `None` fields have never been fetched successfully.
#[derive(Debug, Default)]
pub struct StatsView {
    pub reading: Option<CarbonReading>,
    pub task_count: Option<usize>,
    pub co2_saved_g: Option<f64>,
}

/// The whole dashboard: one state struct owned by the view loop,
/// passed explicitly to every refresh and render step.
#[derive(Debug)]
pub struct DashboardState {
    pub header: Option<CarbonReading>,
    pub stats: StatsView,
    pub live: CarbonSeries,
}

impl DashboardState {
    pub fn new(chart_window: usize) -> Self {
        Self {
            header: None,
            stats: StatsView::default(),
            live: CarbonSeries::with_capacity(chart_window),
        }
    }
}

/// Best-region recommendation: the current region while it stays within
/// 20 % of the Stockholm reference, otherwise Stockholm.
pub fn best_region(reading: &CarbonReading) -> String {
    if reading.carbon_intensity < STOCKHOLM_REFERENCE_G * 1.2 {
        reading.region.clone()
    } else {
        "SE-SE4 (Stockholm)".to_string()
    }
}

// ---------------------------------------------------------------------------
// Render (pure)
// ---------------------------------------------------------------------------

/// Header carbon line.
pub fn render_header(header: &Option<CarbonReading>) -> String {
    match header {
        Some(reading) => {
            let status = carbon::classify(reading.carbon_intensity);
            format!(
                "{}  {}",
                "Grid Carbon".bold(),
                status.paint(&format!("{:.1} gCO2/kWh", reading.carbon_intensity))
            )
        }
        None => format!("{}  {}", "Grid Carbon".bold(), "—".dimmed()),
    }
}

/// Stats panel lines.
pub fn render_stats(stats: &StatsView) -> Vec<String> {
    let mut lines = Vec::new();

    match &stats.reading {
        Some(reading) => {
            let status = carbon::classify(reading.carbon_intensity);
            lines.push(format!(
                "  {} {} — {}",
                "Carbon intensity:".bold(),
                carbon::describe(reading.carbon_intensity),
                status.paint(status.guidance()),
            ));
            lines.push(format!(
                "  {} {}",
                "Region:          ".bold(),
                reading.region
            ));
            lines.push(format!(
                "  {} {}",
                "Best region:     ".bold(),
                best_region(reading)
            ));
        }
        None => lines.push(format!("  {}", "Waiting for first carbon reading...".dimmed())),
    }

    if let Some(count) = stats.task_count {
        lines.push(format!("  {} {}", "Tasks completed: ".bold(), count));
    }
    if let Some(saved) = stats.co2_saved_g {
        lines.push(format!(
            "  {} {:.2} g {}",
            "Est. CO2 saved:  ".bold(),
            saved,
            "(flat average)".dimmed()
        ));
    }

    lines
}

/// Chart panel: one horizontal bar row per point, colored by status.
pub fn render_chart(series: &CarbonSeries) -> Vec<String> {
    if series.is_empty() {
        return vec![format!("  {}", "No data points yet.".dimmed())];
    }

    let max = series.max_value().max(1.0);
    series
        .labels()
        .iter()
        .zip(series.values())
        .map(|(label, &value)| {
            let cells = ((value / max) * CHART_WIDTH as f64).round() as usize;
            let bar = "█".repeat(cells.max(1));
            let status = carbon::classify(value);
            format!(
                "  {label}  {} {:.1}",
                status.paint(&format!("{bar:<width$}", width = CHART_WIDTH)),
                value
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Refresh (one network fetch per tick, stale-on-failure)
// ---------------------------------------------------------------------------

fn refresh_header(state: &mut DashboardState, client: &ApiClient, config: &GridwatchConfig) {
    match client.carbon_intensity(&config.region) {
        Ok(reading) => state.header = Some(reading),
        Err(e) => notify::error(&format!("header refresh: {e:#}")),
    }
}

fn refresh_chart(state: &mut DashboardState, client: &ApiClient, config: &GridwatchConfig) {
    match client.carbon_intensity(&config.region) {
        Ok(reading) => state
            .live
            .push(series::now_label(), reading.carbon_intensity),
        Err(e) => notify::error(&format!("live chart refresh: {e:#}")),
    }
}

fn refresh_stats(state: &mut DashboardState, client: &ApiClient, config: &GridwatchConfig) {
    match client.carbon_intensity(&config.region) {
        Ok(reading) => state.stats.reading = Some(reading),
        Err(e) => notify::error(&format!("stats refresh: {e:#}")),
    }
}

/// Report summary, fetched once at startup (like the page load).
fn load_report_summary(state: &mut DashboardState, client: &ApiClient) {
    match client.reports() {
        Ok(reports) => {
            state.stats.task_count = Some(reports.len());
            state.stats.co2_saved_g = Some(reports.len() as f64 * AVG_SAVED_PER_TASK_G);
        }
        Err(e) => notify::error(&format!("report summary: {e:#}")),
    }
}

// ---------------------------------------------------------------------------
// gridwatch dashboard
// ---------------------------------------------------------------------------

/// `gridwatch dashboard [--once]` — paint the dashboard, then keep the
/// three panels fresh on their own cadences until interrupted.
pub fn run(client: &ApiClient, config: &GridwatchConfig, once: bool) -> Result<()> {
    let mut state = DashboardState::new(config.chart_window);

    refresh_header(&mut state, client, config);
    refresh_chart(&mut state, client, config);
    refresh_stats(&mut state, client, config);
    load_report_summary(&mut state, client);
    paint(&state, once);

    if once {
        return Ok(());
    }

    let header_every = Duration::from_secs(config.header_refresh_secs);
    let chart_every = Duration::from_secs(config.chart_refresh_secs);
    let stats_every = Duration::from_secs(config.stats_refresh_secs);

    let mut header_due = Instant::now() + header_every;
    let mut chart_due = Instant::now() + chart_every;
    let mut stats_due = Instant::now() + stats_every;

    loop {
        let next = header_due.min(chart_due).min(stats_due);
        std::thread::sleep(next.saturating_duration_since(Instant::now()));

        let now = Instant::now();
        let mut repaint = false;
        if now >= header_due {
            refresh_header(&mut state, client, config);
            header_due = now + header_every;
            repaint = true;
        }
        if now >= chart_due {
            refresh_chart(&mut state, client, config);
            chart_due = now + chart_every;
            repaint = true;
        }
        if now >= stats_due {
            refresh_stats(&mut state, client, config);
            stats_due = now + stats_every;
            repaint = true;
        }

        if repaint {
            paint(&state, false);
        }
    }
}

fn paint(state: &DashboardState, once: bool) {
    if !once {
        // Full repaint; each panel renders from its own state, so a
        // failed fetch simply re-renders the previous value.
        print!("\x1b[2J\x1b[H");
    }

    println!("{}", render_header(&state.header));
    println!("{}", "=".repeat(60));
    println!();
    for line in render_stats(&state.stats) {
        println!("{line}");
    }
    println!();
    println!("  {}", "Live carbon intensity".bold().cyan());
    for line in render_chart(&state.live) {
        println!("{line}");
    }
    if !once {
        println!();
        println!(
            "  {}",
            format!(
                "Updated {} — Ctrl+C to exit",
                chrono::Local::now().format("%H:%M:%S")
            )
            .dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// gridwatch carbon
// ---------------------------------------------------------------------------

/// `gridwatch carbon [--region R]` — current reading plus a simulated
/// 24-hour trend (decorative noise around the live value; there is no
/// historical backend).
pub fn run_carbon(client: &ApiClient, config: &GridwatchConfig, region: Option<String>) -> Result<()> {
    let region = region.unwrap_or_else(|| config.region.clone());
    let reading = client.carbon_intensity(&region)?;
    let status = carbon::classify(reading.carbon_intensity);

    println!("{}", "Carbon Intensity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();
    println!(
        "  {}",
        status.paint(&format!("{:.1}", reading.carbon_intensity)).bold()
    );
    println!("  gCO2eq/kWh");
    println!(
        "  {} — {}",
        status.paint(status.label()),
        status.paint(status.guidance())
    );
    println!("  Region: {}", reading.region);
    println!();

    let history = series::simulate_history(&reading, HISTORY_HOURS, &mut rand::thread_rng());
    println!(
        "  {} {}",
        "Last 24 hours".bold().cyan(),
        "(simulated around the live reading)".dimmed()
    );
    for line in render_chart(&history) {
        println!("{line}");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
