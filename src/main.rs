use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gridwatch::api::ApiClient;
use gridwatch::config::GridwatchConfig;
use gridwatch::{chat, cli, dashboard, reports, task, zones};

#[derive(Debug, Parser)]
#[command(name = "gridwatch")]
#[command(about = "Grid carbon dashboard, carbon-aware task runs, and CO2 reports")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard: carbon stats and a polling intensity chart
    Dashboard {
        /// Render a single refresh and exit instead of polling
        #[arg(long)]
        once: bool,
    },
    /// Current carbon reading plus a simulated 24-hour trend
    Carbon {
        /// Grid region code (defaults to the configured region)
        #[arg(long)]
        region: Option<String>,
    },
    /// Survey carbon intensity across world grid zones
    Zones,
    /// Chat with the Green AI assistant (interactive without a question)
    Chat {
        /// One-shot question; omit for an interactive session
        question: Option<String>,
    },
    /// Browse the stored CO2 reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Upload a task archive, execute it, and save a carbon report
    Task {
        /// Path to a .zip task archive
        file: PathBuf,
    },
    /// Check backend reachability, config, and local state
    Health,
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ReportCommands {
    /// List all reports, newest first
    List {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Print the first rows of a report
    Preview {
        /// Report filename as shown by `reports list`
        filename: String,
    },
    /// Download a report to disk
    Download {
        /// Report filename as shown by `reports list`
        filename: String,
        /// Destination path (defaults to the report's filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective (merged) configuration
    Show,
    /// Write the annotated default config to ~/.gridwatch/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let app = App::parse();
    let config = GridwatchConfig::load();
    let client = ApiClient::from_config(&config);

    match app.command {
        Commands::Dashboard { once } => dashboard::run(&client, &config, once),
        Commands::Carbon { region } => dashboard::run_carbon(&client, &config, region),
        Commands::Zones => zones::run(&client),
        Commands::Chat { question } => chat::run(&client, question),
        Commands::Reports { command } => match command {
            ReportCommands::List { format } => {
                let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                reports::run_list(&client, &config, fmt)
            }
            ReportCommands::Preview { filename } => reports::run_preview(&client, &filename),
            ReportCommands::Download { filename, out } => {
                reports::run_download(&client, &filename, out)
            }
        },
        Commands::Task { file } => task::run_command(&client, &config, &file),
        Commands::Health => cli::run_health(&client, &config),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::run_config_show(),
            ConfigCommands::Init { force } => cli::run_config_init(force),
        },
    }
}
