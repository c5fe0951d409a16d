/// Configuration for gridwatch.
///
/// Layered resolution, lowest to highest precedence:
///
/// 1. **Built-in defaults** — hardcoded in [`GridwatchConfig::default()`]
/// 2. **User config file** — `~/.gridwatch/config.toml`
/// 3. **Environment variables** — `GRIDWATCH_*`
///
/// The config file only needs the keys being changed; everything else
/// falls through to the previous layer. A malformed file is ignored
/// rather than aborting the command.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default backend base URL (the Flask-side API).
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

/// Default grid region queried by the dashboard and header.
const DEFAULT_REGION: &str = "IN-WE";

/// Default per-request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default refresh cadences (seconds): header line, live chart, stats panel.
const DEFAULT_HEADER_REFRESH_SECS: u64 = 30;
const DEFAULT_CHART_REFRESH_SECS: u64 = 60;
const DEFAULT_STATS_REFRESH_SECS: u64 = 60;

/// Default live chart sliding-window size (points).
const DEFAULT_CHART_WINDOW: usize = 20;

/// Assumed device draw (watts) for the synthetic carbon report.
const DEFAULT_POWER_WATTS: f64 = 65.0;

/// Cloud billing rate (USD per hour) for the display-only cost estimate.
const DEFAULT_HOURLY_RATE_USD: f64 = 0.05;

// ---------------------------------------------------------------------------
// Resolved config
// ---------------------------------------------------------------------------

/// Fully resolved gridwatch configuration.
#[derive(Debug, Clone)]
pub struct GridwatchConfig {
    /// Backend API base URL.
    pub api_base_url: String,
    /// Grid region code for the dashboard and header (e.g. `IN-WE`).
    pub region: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Header carbon line refresh cadence (seconds).
    pub header_refresh_secs: u64,
    /// Live chart refresh cadence (seconds).
    pub chart_refresh_secs: u64,
    /// Stats panel refresh cadence (seconds).
    pub stats_refresh_secs: u64,
    /// Live chart sliding-window size in points.
    pub chart_window: usize,
    /// Assumed device power draw for report estimates (watts).
    pub power_watts: f64,
    /// Cloud billing rate for the cost estimate (USD/hour).
    pub hourly_rate_usd: f64,
}

impl Default for GridwatchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            header_refresh_secs: DEFAULT_HEADER_REFRESH_SECS,
            chart_refresh_secs: DEFAULT_CHART_REFRESH_SECS,
            stats_refresh_secs: DEFAULT_STATS_REFRESH_SECS,
            chart_window: DEFAULT_CHART_WINDOW,
            power_watts: DEFAULT_POWER_WATTS,
            hourly_rate_usd: DEFAULT_HOURLY_RATE_USD,
        }
    }
}

impl GridwatchConfig {
    /// Load the fully resolved configuration:
    /// defaults → `~/.gridwatch/config.toml` → `GRIDWATCH_*` env vars.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(file_cfg) = FileConfig::load() {
            file_cfg.apply_to(&mut config);
        }

        Self::apply_env_overrides(&mut config);
        config
    }

    /// Apply environment-variable overrides (highest precedence).
    ///
    /// Supported: `GRIDWATCH_API_URL`, `GRIDWATCH_REGION`,
    /// `GRIDWATCH_TIMEOUT_MS`.
    fn apply_env_overrides(config: &mut Self) {
        if let Ok(val) = std::env::var("GRIDWATCH_API_URL")
            && !val.is_empty()
        {
            config.api_base_url = val;
        }
        if let Ok(val) = std::env::var("GRIDWATCH_REGION")
            && !val.is_empty()
        {
            config.region = val;
        }
        if let Ok(val) = std::env::var("GRIDWATCH_TIMEOUT_MS")
            && let Ok(ms) = val.parse::<u64>()
        {
            config.timeout_ms = ms;
        }
    }
}

// ---------------------------------------------------------------------------
// TOML config file schema
// ---------------------------------------------------------------------------

/// On-disk schema for `~/.gridwatch/config.toml`.
///
/// All fields optional — only present keys override the defaults.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    region: Option<String>,
    timeout_ms: Option<u64>,
    header_refresh_secs: Option<u64>,
    chart_refresh_secs: Option<u64>,
    stats_refresh_secs: Option<u64>,
    chart_window: Option<usize>,
    power_watts: Option<f64>,
    hourly_rate_usd: Option<f64>,
}

impl FileConfig {
    /// Attempt to load `~/.gridwatch/config.toml`.
    /// Returns `None` if the file doesn't exist or is malformed.
    fn load() -> Option<Self> {
        let path = config_file_path()?;
        let contents = fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }

    /// Merge file-level overrides into the resolved config.
    fn apply_to(&self, config: &mut GridwatchConfig) {
        if let Some(ref url) = self.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(ref region) = self.region {
            config.region = region.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(secs) = self.header_refresh_secs {
            config.header_refresh_secs = secs;
        }
        if let Some(secs) = self.chart_refresh_secs {
            config.chart_refresh_secs = secs;
        }
        if let Some(secs) = self.stats_refresh_secs {
            config.stats_refresh_secs = secs;
        }
        if let Some(window) = self.chart_window {
            config.chart_window = window;
        }
        if let Some(watts) = self.power_watts {
            config.power_watts = watts;
        }
        if let Some(rate) = self.hourly_rate_usd {
            config.hourly_rate_usd = rate;
        }
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the config file: `~/.gridwatch/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.toml"))
}

/// The gridwatch state directory: `~/.gridwatch/`.
pub fn state_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".gridwatch"))
}

// ---------------------------------------------------------------------------
// config show | init
// ---------------------------------------------------------------------------

/// Annotated default config, written by `gridwatch config init`.
fn default_toml() -> String {
    let d = GridwatchConfig::default();
    format!(
        r#"# gridwatch configuration

# Backend API base URL.
api_base_url = "{}"

# Grid region queried by the dashboard and header.
region = "{}"

# Per-request timeout (milliseconds).
timeout_ms = {}

# Refresh cadences (seconds). The three timers are independent.
header_refresh_secs = {}
chart_refresh_secs = {}
stats_refresh_secs = {}

# Live chart sliding window (points).
chart_window = {}

# Assumed device power draw for report estimates (watts).
power_watts = {}

# Cloud billing rate for the display-only cost estimate (USD/hour).
hourly_rate_usd = {}
"#,
        d.api_base_url,
        d.region,
        d.timeout_ms,
        d.header_refresh_secs,
        d.chart_refresh_secs,
        d.stats_refresh_secs,
        d.chart_window,
        d.power_watts,
        d.hourly_rate_usd,
    )
}

/// Write the annotated default config to `~/.gridwatch/config.toml`.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = config_file_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.gridwatch/ directory")?;
    }
    fs::write(&path, default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Render the effective (fully resolved) config for `gridwatch config show`.
pub fn show_effective_config() -> String {
    let c = GridwatchConfig::load();
    format!(
        "api_base_url = \"{}\"\nregion = \"{}\"\ntimeout_ms = {}\n\
         header_refresh_secs = {}\nchart_refresh_secs = {}\nstats_refresh_secs = {}\n\
         chart_window = {}\npower_watts = {}\nhourly_rate_usd = {}\n",
        c.api_base_url,
        c.region,
        c.timeout_ms,
        c.header_refresh_secs,
        c.chart_refresh_secs,
        c.stats_refresh_secs,
        c.chart_window,
        c.power_watts,
        c.hourly_rate_usd,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GridwatchConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.region, "IN-WE");
        assert_eq!(config.header_refresh_secs, 30);
        assert_eq!(config.chart_refresh_secs, 60);
        assert_eq!(config.stats_refresh_secs, 60);
        assert_eq!(config.chart_window, 20);
        assert_eq!(config.power_watts, 65.0);
    }

    #[test]
    fn file_overlay_applies_partial_overrides() {
        let mut config = GridwatchConfig::default();
        let file: FileConfig = toml::from_str(
            r#"
            region = "SE-SE4"
            chart_window = 40
            "#,
        )
        .unwrap();

        file.apply_to(&mut config);

        assert_eq!(config.region, "SE-SE4");
        assert_eq!(config.chart_window, 40);
        assert_eq!(config.api_base_url, "http://localhost:5000"); // unchanged
        assert_eq!(config.timeout_ms, 10_000); // unchanged
    }

    #[test]
    fn empty_file_changes_nothing() {
        let mut config = GridwatchConfig::default();
        let file: FileConfig = toml::from_str("").unwrap();
        file.apply_to(&mut config);
        assert_eq!(config.region, "IN-WE");
    }

    #[test]
    fn default_toml_round_trips() {
        let parsed: FileConfig = toml::from_str(&default_toml()).unwrap();
        assert_eq!(parsed.region.as_deref(), Some("IN-WE"));
        assert_eq!(parsed.chart_window, Some(20));
    }
}
