#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Burrow navigators over grid layouts.

mod layout_transfer;
mod session;
mod settings;

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use burrow_rendering::{RenderingBackend, TextBackend};
use burrow_system_scenario::{generate, GeneratorConfig, Layout};
use clap::{Parser, Subcommand};
use tracing::Level;

use crate::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "burrow", version, about = "Local grid navigation playground")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Drive every red agent of a layout toward its first target.
    Run {
        /// Layout file, or a layout transfer string.
        layout: String,
        /// TOML file with [navigation] and [world] tables.
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Override the tick limit from the settings file.
        #[arg(long)]
        max_ticks: Option<u32>,
        /// Print a frame after every tick.
        #[arg(long)]
        render: bool,
    },
    /// Generate a random layout from a seed.
    Generate {
        /// Seed of the random stream.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Columns of the grid.
        #[arg(long, default_value_t = 24)]
        width: u32,
        /// Rows of the grid.
        #[arg(long, default_value_t = 12)]
        height: u32,
        /// Probability of a cell becoming a wall.
        #[arg(long, default_value_t = 0.2)]
        wall_density: f64,
        /// Probability of a cell becoming removable terrain.
        #[arg(long, default_value_t = 0.1)]
        dirt_density: f64,
        /// Print a layout transfer string instead of the ASCII grid.
        #[arg(long)]
        encode: bool,
    },
    /// Print the ASCII grid stored in a layout transfer string.
    Decode {
        /// String produced by `generate --encode`.
        value: String,
    },
}

/// Entry point for the Burrow command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        CliCommand::Run {
            layout,
            settings,
            max_ticks,
            render,
        } => run(&layout, settings, max_ticks, render),
        CliCommand::Generate {
            seed,
            width,
            height,
            wall_density,
            dirt_density,
            encode,
        } => {
            let config = GeneratorConfig {
                width,
                height,
                seed,
                wall_density,
                dirt_density,
            };
            let layout = generate(&config).context("failed to generate layout")?;
            if encode {
                println!("{}", layout_transfer::encode(&layout)?);
            } else {
                println!("{layout}");
            }
            Ok(())
        }
        CliCommand::Decode { value } => {
            let layout = layout_transfer::decode(&value).context("failed to decode layout")?;
            println!("{layout}");
            Ok(())
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn run(
    source: &str,
    settings: Option<PathBuf>,
    max_ticks: Option<u32>,
    render: bool,
) -> Result<()> {
    let layout = load_layout(source)?;
    let mut settings = match settings {
        Some(path) => Settings::load(&path)?,
        None => Settings::default(),
    };
    if let Some(max_ticks) = max_ticks {
        settings.world.max_ticks = max_ticks;
    }

    let mut frames = TextBackend::new(io::stdout().lock());
    let backend: Option<&mut dyn RenderingBackend> = if render { Some(&mut frames) } else { None };
    let summary = session::run(&layout, &settings, backend)?;
    drop(frames);

    let report = serde_json::to_string_pretty(&summary).context("failed to serialise report")?;
    println!("{report}");
    Ok(())
}

fn load_layout(source: &str) -> Result<Layout> {
    if layout_transfer::is_transfer_string(source) {
        return layout_transfer::decode(source).context("failed to decode layout string");
    }
    let text = fs::read_to_string(source)
        .with_context(|| format!("failed to read layout from {source}"))?;
    Layout::parse(&text).with_context(|| format!("invalid layout in {source}"))
}
