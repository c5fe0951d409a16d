//! CLI plumbing shared across subcommands, plus diagnostics.
//!
//! - [`OutputFormat`] — table/json/csv selection for listing commands
//! - `gridwatch health` — config, backend, and state-file checks
//! - `gridwatch config show | init` — configuration management

use anyhow::Result;
use colored::Colorize;

use crate::api::ApiClient;
use crate::config::{self, GridwatchConfig};
use crate::reports;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// gridwatch health
// ---------------------------------------------------------------------------

/// Check config, backend reachability, and local state.
pub fn run_health(client: &ApiClient, config: &GridwatchConfig) -> Result<()> {
    println!("{}", "gridwatch Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let config_exists = config::config_file_path()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Config file",
        config_exists,
        if config_exists {
            "~/.gridwatch/config.toml found"
        } else {
            "not found (run `gridwatch config init` to create)"
        },
    );
    print_health_item("Backend URL", true, &config.api_base_url);
    print_health_item("Region", true, &config.region);

    match client.carbon_intensity(&config.region) {
        Ok(reading) => print_health_item(
            "Carbon endpoint",
            true,
            &format!("{:.1} gCO2/kWh for {}", reading.carbon_intensity, reading.region),
        ),
        Err(e) => print_health_item("Carbon endpoint", false, &format!("{e:#}")),
    }

    match client.reports() {
        Ok(list) => print_health_item("Report store", true, &format!("{} reports", list.len())),
        Err(e) => print_health_item("Report store", false, &format!("{e:#}")),
    }

    let hours = reports::stored_cloud_hours();
    print_health_item(
        "Cloud hours state",
        true,
        &if hours > 0.0 {
            format!("{hours:.2} h recorded")
        } else {
            "none recorded (optional)".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// gridwatch config show | init
// ---------------------------------------------------------------------------

/// Show the effective (fully resolved) configuration.
pub fn run_config_show() -> Result<()> {
    println!("{}", "Effective gridwatch Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{}", config::show_effective_config());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    println!("  {} ~/.gridwatch/config.toml", "·".dimmed());
    println!("  {} GRIDWATCH_* environment variables", "·".dimmed());
    Ok(())
}

/// Write the annotated default config file.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    Ok(())
}
