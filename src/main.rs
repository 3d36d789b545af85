//! CLI entry point for zmk-overlay
//!
//! Parses flags, starts the input monitor and hands control to the
//! GTK4 overlay. The `stats` subcommand prints accumulated key
//! statistics without starting the GUI.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use zmk_overlay::input::KeyboardMonitor;
use zmk_overlay::stats::StatsStore;
use zmk_overlay::ui::{App, Controller, OverlayOptions, Session};
use zmk_overlay::zmk::{LayerSource, SimScanner};

#[derive(Parser)]
#[command(name = "zmk-overlay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose logging and SVG dumps to the temp directory
    #[arg(short, long, global = true)]
    debug: bool,

    /// Keymap YAML file (keymap-drawer format); omit for the built-in layout
    #[arg(short, long)]
    keymap: Option<String>,

    /// Treat every key as learned and cycle layers automatically
    #[arg(short, long)]
    testing: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-key accuracy statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Some(Commands::Stats) => print_stats(),
        None => run_overlay(cli),
    }
}

fn init_logging(debug: bool) {
    let default = if debug {
        "zmk_overlay=debug"
    } else {
        "zmk_overlay=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .init();
}

fn run_overlay(cli: Cli) -> anyhow::Result<()> {
    let keymap_path = cli
        .keymap
        .as_deref()
        .map(|raw| PathBuf::from(shellexpand::tilde(raw).into_owned()));

    let controller = Controller::new(OverlayOptions {
        keymap_path,
        testing: cli.testing,
        debug: cli.debug,
    })?;

    zmk_overlay::keymap::KeymapRenderer::new()
        .preflight()
        .context("keymap-drawer is required to render the overlay")?;

    let (monitor, key_events) = KeyboardMonitor::start()?;

    // In testing mode a simulated keyboard cycles through the layers.
    let (layer_events, layer_source) = if cli.testing {
        let mut scanner = SimScanner::new(controller.layer_names(), Duration::from_secs(5));
        let rx = scanner.start();
        (Some(rx), Some(Box::new(scanner) as Box<dyn LayerSource>))
    } else {
        (None, None)
    };

    App::new(controller).run(Session {
        key_events,
        monitor,
        layer_events,
        layer_source,
    });

    info!("overlay closed");
    Ok(())
}

/// Print accumulated key statistics to the terminal
fn print_stats() -> anyhow::Result<()> {
    let store = StatsStore::load(StatsStore::default_path()?);

    if store.is_empty() {
        println!("{}", "No key statistics recorded yet.".yellow());
        return Ok(());
    }

    println!("{}\n", "Key accuracy".bold());

    let mut entries: Vec<_> = store.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (key, stat) in entries {
        let marker = if stat.is_learned() {
            "✓".green()
        } else {
            " ".normal()
        };

        println!(
            "{} {:<10} {:>5.1}%  ({}/{} correct)",
            marker,
            key.as_str().cyan(),
            stat.accuracy() * 100.0,
            stat.correct,
            stat.attempts,
        );
    }

    println!("\n{} {}", "✓".green(), store.summary());

    Ok(())
}
