//! Dropline CLI
//!
//! Mount the home page headlessly, replay interaction scripts against it, and
//! validate options files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dropline_app::config::{DroplineConfig, CONFIG_FILE};
use dropline_app::script::parse_script;
use dropline_app::{HomePage, JsonFileSource, OptionSource};

#[derive(Parser)]
#[command(name = "dropline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless dropdown select demo", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Options file (overrides the config)
    #[arg(short, long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the mounted home page
    Show,

    /// Replay an interaction script against the home page
    Run {
        /// Script file, one interaction per line
        script: PathBuf,
    },

    /// Validate the options file
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = DroplineConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(options) = cli.options {
        config.options.path = options;
    }

    match cli.command {
        Commands::Show => cmd_show(&config),
        Commands::Run { script } => cmd_run(&config, &script),
        Commands::Check => cmd_check(&config),
    }
}

fn load_page(config: &DroplineConfig) -> Result<HomePage> {
    let source = JsonFileSource::new(&config.options.path);
    pollster::block_on(HomePage::load(config, &source))
        .with_context(|| format!("Failed to build page from {}", source.path().display()))
}

fn cmd_show(config: &DroplineConfig) -> Result<()> {
    let page = load_page(config)?;
    print!("{}", page.render());
    Ok(())
}

fn cmd_run(config: &DroplineConfig, script_path: &Path) -> Result<()> {
    let text = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let steps = parse_script(&text)
        .with_context(|| format!("Failed to parse {}", script_path.display()))?;

    let mut page = load_page(config)?;
    info!("Replaying {} steps from {}", steps.len(), script_path.display());
    print!("{}", page.render());

    for step in &steps {
        let before = page.published().len();
        page.apply(&step.interaction)
            .with_context(|| format!("Step at line {} failed", step.line))?;

        println!("\n> {} (line {})", step.interaction, step.line);
        print!("{}", page.render());
        println!("{}", page.status());
        for value in &page.published()[before..] {
            println!("selected <- {value:?}");
        }
    }

    println!("\nform value: {:?}", page.form_value());
    Ok(())
}

fn cmd_check(config: &DroplineConfig) -> Result<()> {
    let source = JsonFileSource::new(&config.options.path);
    let options = pollster::block_on(source.fetch_options())
        .with_context(|| format!("Failed to load {}", source.path().display()))?;

    info!("{} options in {}", options.len(), source.path().display());
    if options.is_empty() {
        warn!("No options; the select will start empty");
    }

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for option in &options {
        *counts.entry(option.value.as_str()).or_default() += 1;
        if option.label.is_empty() {
            warn!("Option '{}' has an empty label", option.value);
        }
    }

    let duplicates: Vec<&str> = counts
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(value, _)| *value)
        .collect();
    for value in &duplicates {
        warn!("Value '{}' appears {} times; only the first is selectable", value, counts[value]);
    }

    if !duplicates.is_empty() {
        anyhow::bail!("{} duplicate option values", duplicates.len());
    }

    println!("ok");
    Ok(())
}
