// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Clashframe Inc.

//! Clashframe CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use clashframe::boolean::BackendKind;
use clashframe::clash::{emit, ConsoleSink, MemorySink, ReportFormat};
use clashframe::{run_files, ClashConfig};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clashframe")]
#[command(about = "Clashframe - clash detection between building models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect clashes between a reference and a candidate model
    Detect {
        /// Reference model (JSON)
        #[arg(short, long, value_name = "FILE")]
        reference: PathBuf,

        /// Candidate model (JSON)
        #[arg(short, long, value_name = "FILE")]
        candidate: PathBuf,

        /// Configuration file (defaults to ./clash.toml when present)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Report format (grouped, per-clash)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Mesh boolean backend (clip, parry, null)
        #[arg(short, long)]
        backend: Option<BackendKind>,

        /// Clearance tolerance
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Worker threads
        #[arg(long)]
        threads: Option<usize>,

        /// Intersect every mesh pair without bounding-box rejection
        #[arg(long)]
        no_broad_phase: bool,

        /// Print findings and summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            reference,
            candidate,
            config,
            format,
            backend,
            tolerance,
            threads,
            no_broad_phase,
            json,
        } => {
            let mut settings = ClashConfig::load(config.as_deref())?;
            if let Some(format) = format {
                settings.report_format = format;
            }
            if let Some(backend) = backend {
                settings.backend = backend;
            }
            if let Some(tolerance) = tolerance {
                settings.tolerance = tolerance;
            }
            if let Some(threads) = threads {
                settings.parallelism = (threads > 0).then_some(threads);
            }
            if no_broad_phase {
                settings.broad_phase = false;
            }
            detect_command(&reference, &candidate, &settings, json)?;
        }
        Commands::Version => {
            println!("Clashframe v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn detect_command(reference: &Path, candidate: &Path, config: &ClashConfig, as_json: bool) -> Result<()> {
    for input in [reference, candidate] {
        if !input.exists() {
            eprintln!("{} Input file not found: {}", "Error:".red(), input.display());
            std::process::exit(1);
        }
    }

    let run = run_files(reference, candidate, config, !as_json)?;
    if !run.has_objects() {
        eprintln!("{}", "Clash detection failed. No objects to compare.".red());
        std::process::exit(1);
    }

    let aggregator = config.report_format.aggregator();

    if as_json {
        let mut sink = MemorySink::new();
        emit(aggregator.as_ref(), &run.records, &mut sink)?;
        let output = json!({
            "format": config.report_format,
            "findings": sink.findings,
            "records": run.records,
            "summary": run.summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "═".repeat(80).bright_black());
    println!(
        "{} {} vs {}",
        "Clash detection".bold(),
        reference.display().to_string().cyan(),
        candidate.display().to_string().cyan()
    );
    println!("{}", "═".repeat(80).bright_black());

    let mut sink = ConsoleSink::stdout();
    let count = emit(aggregator.as_ref(), &run.records, &mut sink)?;
    if count == 0 {
        println!("  {}", "No clashes found".green());
    }

    println!("{}", "═".repeat(80).bright_black());
    println!("Clash detection completed. {}", run.summary);
    Ok(())
}
