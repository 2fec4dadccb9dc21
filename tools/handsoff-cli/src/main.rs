//! HandsOff CLI: hand-near-head detection from landmark streams.
//!
//! Usage:
//!   handsoff watch [OPTIONS]          Replay a landmark stream and report events
//!   handsoff beautify <IN> <OUT>      Apply the beauty filter to an image
//!   handsoff stats [--week N]         Show daily trigger statistics
//!   handsoff config [--write-default] Show or create the configuration file
//!
//! Events are written to stdout as JSON lines; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use handsoff_common::config::{config_file_path, AppConfig, RetriggerPolicy};

mod commands;

#[derive(Parser)]
#[command(
    name = "handsoff",
    about = "Detect and report hand-near-head habits from pose landmarks",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/handsoff/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Fire again after every further time threshold of contact
    Periodic,
    /// Fire once per continuous contact
    Once,
}

impl From<PolicyArg> for RetriggerPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Periodic => RetriggerPolicy::Periodic,
            PolicyArg::Once => RetriggerPolicy::OncePerEpisode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL landmark stream through the detector
    Watch {
        /// Landmark stream (`-` or omitted for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Enable the beauty filter
        #[arg(long, conflicts_with = "no_beauty")]
        beauty: bool,

        /// Disable the beauty filter
        #[arg(long)]
        no_beauty: bool,

        /// Screenshot directory
        #[arg(long)]
        screenshots: Option<PathBuf>,

        /// Daily statistics file
        #[arg(long)]
        stats_file: Option<PathBuf>,

        /// Retrigger policy while contact continues
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Append events to this file instead of stdout
        #[arg(long)]
        events_file: Option<PathBuf>,
    },

    /// Apply the beauty filter to an image file
    Beautify {
        /// Input image
        input: PathBuf,

        /// Output image (format from extension)
        output: PathBuf,
    },

    /// Show today's count and one week of daily statistics
    Stats {
        /// Week offset: 0 is this week, -1 last week, down to -11
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        week: i32,

        /// Daily statistics file
        #[arg(long)]
        stats_file: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        write_default: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(config_file_path);

    let mut logging = AppConfig::try_load(&config_path)
        .ok()
        .flatten()
        .map(|config| config.logging)
        .unwrap_or_default();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    handsoff_common::logging::init_logging(&logging);

    let config = AppConfig::load_from(&config_path);

    match cli.command {
        Commands::Watch {
            input,
            beauty,
            no_beauty,
            screenshots,
            stats_file,
            policy,
            events_file,
        } => {
            let beauty = match (beauty, no_beauty) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::watch::run(
                config,
                commands::watch::WatchOverrides {
                    input,
                    beauty,
                    screenshots,
                    stats_file,
                    policy: policy.map(Into::into),
                    events_file,
                },
            )
            .await
        }
        Commands::Beautify { input, output } => commands::beautify::run(&config, input, output),
        Commands::Stats { week, stats_file } => commands::stats::run(&config, week, stats_file),
        Commands::Config { write_default } => {
            commands::config::run(&config, &config_path, write_default)
        }
    }
}
