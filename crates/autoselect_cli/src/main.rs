//! autoselect CLI
//!
//! Replay scripted field sessions and inspect menu filtering.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autoselect::{filter_options, FieldConfig};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod script;

use script::Script;

#[derive(Parser)]
#[command(name = "autoselect")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Option-bound text field adapter tools", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scripted session and print the field state after each step
    Replay {
        /// Script file (TOML)
        script: PathBuf,
    },

    /// Print the menu a query would produce
    Filter {
        /// Field configuration file (TOML)
        config: PathBuf,

        /// Text typed into the field
        #[arg(default_value = "")]
        query: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Replay { script } => cmd_replay(&script),
        Commands::Filter { config, query } => cmd_filter(&config, &query),
    }
}

fn cmd_replay(path: &Path) -> Result<()> {
    let script = Script::load(path)?;
    info!(
        "Replaying {} steps against {} options",
        script.steps.len(),
        script.field.options.len()
    );

    for snapshot in script::run(script) {
        println!("{}", snapshot);
    }
    Ok(())
}

fn cmd_filter(path: &Path, query: &str) -> Result<()> {
    let config = FieldConfig::<String>::load(path)?;
    config
        .validate()
        .with_context(|| format!("Cannot filter with {}", path.display()))?;

    let visible = filter_options(&config.options, query);
    info!(
        "{} of {} options match {:?}",
        visible.len(),
        config.options.len(),
        query
    );
    for option in visible {
        println!("{}\t{}", option.label, option.value);
    }
    Ok(())
}
