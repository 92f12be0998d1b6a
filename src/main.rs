//! smcron - social media cron
//!
//! Prune stale tweets and inactive friends, and plot follower activity.

use std::fs::OpenOptions;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

use smcron::Result;
use smcron::app::AppContext;
use smcron::cli::{Cli, Commands};
use smcron::config::{Config, LoggingConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.robot {
                // Robot mode: JSON error output to stdout
                let error_json = serde_json::json!({
                    "error": true,
                    "code": e.code(),
                    "message": e.to_string(),
                });
                println!("{}", serde_json::to_string(&error_json).unwrap_or_default());
            } else {
                eprintln!("{} {e}", "Error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Commands::Completions(args) = &cli.command {
        return smcron::cli::commands::completions::run(args);
    }

    let loaded = Config::load(cli.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    let _guard = init_tracing(cli, &logging);

    let ctx = AppContext::with_config(cli, loaded?);
    smcron::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli, logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = match cli.verbose {
        0 => "warn,smcron=info",
        1 => "info,smcron=debug",
        2 => "debug,smcron=trace",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if !cli.quiet {
        if cli.robot || logging.json {
            // JSON logging for robot mode
            layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
        } else {
            layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
        }
    }

    // File sink, appended across runs
    let mut guard = None;
    let mut file_error = None;
    if let Some(path) = &logging.file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (writer, worker) = tracing_appender::non_blocking(file);
                guard = Some(worker);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                if logging.json {
                    layers.push(layer.json().boxed());
                } else {
                    layers.push(layer.boxed());
                }
            }
            Err(err) => file_error = Some(format!("{}: {err}", path.display())),
        }
    }

    if layers.is_empty() {
        return None;
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    if let Some(message) = file_error {
        warn!("Cannot open log file {message}");
    }
    guard
}
