//! MultiMon entry point.
//!
//! Switches between named multi-display arrangements by driving xrandr.
//!
//! # Usage
//!
//! ```text
//! multimon [OPTIONS] <COMMAND>
//!
//! Commands:
//!   apply      Switch to an arrangement
//!   command    Print the command an arrangement would run
//!   detect     Print the arrangement currently in effect
//!   list       List the arrangements the configured displays allow
//!   configure  Save the display setup
//!
//! Options:
//!   --config <PATH>  Config file [env: MULTIMON_CONFIG]
//!   --tool <NAME>    Display tool to invoke [env: MULTIMON_TOOL]
//! ```
//!
//! Logs go to stderr; `RUST_LOG` overrides the configured `log_level`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use multimon::application::apply_arrangement::ApplyArrangementUseCase;
use multimon::application::detect_arrangement::DetectArrangementUseCase;
use multimon::infrastructure::display_tool::ProcessCommandRunner;
use multimon::infrastructure::live_query::XrandrLiveQuery;
use multimon::infrastructure::storage::config::{
    config_file_path, load_config_from, replace_displays, AppConfig, DisplayEntry,
};
use multimon_core::Arrangement;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Multi-display arrangement switcher.
#[derive(Debug, Parser)]
#[command(
    name = "multimon",
    about = "Switch between named multi-display arrangements",
    version
)]
struct Cli {
    /// Path of the TOML config file.
    ///
    /// Defaults to `$XDG_CONFIG_HOME/multimon/config.toml` on Linux.
    #[arg(long, global = true, env = "MULTIMON_CONFIG")]
    config: Option<PathBuf>,

    /// Display tool to invoke instead of the configured one.
    #[arg(long, global = true, env = "MULTIMON_TOOL")]
    tool: Option<String>,

    #[command(subcommand)]
    command: Action,
}

#[derive(Debug, Subcommand)]
enum Action {
    /// Switch to an arrangement, e.g. `tv_extended`.
    Apply { arrangement: Arrangement },

    /// Print the command an arrangement would run, without running it.
    Command { arrangement: Arrangement },

    /// Print the arrangement currently in effect, or `none`.
    Detect,

    /// List the arrangements the configured displays allow.
    ///
    /// The arrangement currently in effect is marked with `*`.
    List,

    /// Replace the display setup and save it.
    Configure {
        /// One display, left to right, as `PORT:RESOLUTION:RATE:ROLE`.
        #[arg(long = "display", required = true)]
        displays: Vec<DisplayEntry>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = match cli.config.clone() {
        Some(path) => path,
        None => config_file_path().context("cannot locate the config file")?,
    };
    let loaded = load_config_from(&path);

    // Initialise structured logging.  `RUST_LOG` wins over the config file.
    let fallback_level = loaded
        .as_ref()
        .map(|cfg| cfg.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let tool_override = cli.tool.clone();
    let load = || -> anyhow::Result<AppConfig> {
        let mut config =
            loaded.with_context(|| format!("failed to load config from {}", path.display()))?;
        if let Some(tool) = tool_override {
            config.general.tool = tool;
        }
        Ok(config)
    };

    match cli.command {
        Action::Configure { displays } => {
            // An unreadable file is replaced, not reported.
            let saved = replace_displays(&path, displays, cli.tool)
                .with_context(|| format!("failed to save config to {}", path.display()))?;
            info!(path = %path.display(), displays = saved.displays.len(), "display setup saved");
            Ok(())
        }
        Action::Apply { arrangement } => {
            let use_case = apply_use_case(&load()?)?;
            use_case
                .switch_to(arrangement)
                .with_context(|| format!("failed to apply {arrangement}"))
        }
        Action::Command { arrangement } => {
            let use_case = apply_use_case(&load()?)?;
            let command = use_case.command_for_arrangement(arrangement)?;
            println!("{command}");
            Ok(())
        }
        Action::Detect => {
            let detected = detect_use_case(&load()?)?.detect();
            match detected {
                Some(arrangement) => println!("{arrangement}"),
                None => println!("none"),
            }
            Ok(())
        }
        Action::List => {
            let config = load()?;
            let detected = detect_use_case(&config)?.detect();
            for arrangement in apply_use_case(&config)?.available() {
                let marker = if Some(arrangement) == detected { '*' } else { ' ' };
                println!(
                    "{marker} {:<22} {}",
                    arrangement.label(),
                    arrangement.description()
                );
            }
            Ok(())
        }
    }
}

fn apply_use_case(config: &AppConfig) -> anyhow::Result<ApplyArrangementUseCase> {
    let registry = config.registry().context("display setup is not usable")?;
    Ok(ApplyArrangementUseCase::new(
        registry,
        config.general.tool.as_str(),
        Arc::new(ProcessCommandRunner::new()),
    ))
}

fn detect_use_case(config: &AppConfig) -> anyhow::Result<DetectArrangementUseCase> {
    let registry = config.registry().context("display setup is not usable")?;
    let query = XrandrLiveQuery::new(
        config.general.tool.as_str(),
        Arc::new(ProcessCommandRunner::new()),
    );
    Ok(DetectArrangementUseCase::new(registry, Arc::new(query)))
}
