//! API Battle - comparative endpoint benchmarking
//!
//! A CLI tool that measures two functionally identical document-processing
//! services side by side and declares a winner.
//!
//! ## Features
//!
//! - Single-shot latency comparison (one endpoint or both concurrently)
//! - Concurrent load tests with requests/second and mean latency
//! - Winner and speedup factor for each comparison
//! - Multiple output formats (Table, JSON, CSV, Summary)
//!
//! ## Usage
//!
//! ```bash
//! # Compare one request per endpoint
//! api-battle single --text "some document"
//!
//! # 500 concurrent requests per endpoint
//! api-battle load --file document.txt
//!
//! # Both, against custom addresses
//! api-battle battle --file document.txt --endpoint-a http://10.0.0.1:8080 --endpoint-b http://10.0.0.2:8081
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

mod benchmark;
mod cli;
mod compare;
mod config;
mod error;
mod http;
mod models;
mod output;
mod state;
mod utils;

use benchmark::SingleTarget;
use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use http::EndpointClient;
use models::Document;
use output::{OutputFormat, ResultFormatter, SingleShotReport, ThroughputReport};
use state::BattleSession;
use utils::{init_logger, LogLevel};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    let verbose = args.verbose || env.verbose.unwrap_or(false);
    init_logger(LogLevel::resolve(args.log_level.as_deref(), verbose));

    match &args.command {
        cli::Command::Single(single_args) => {
            let config = resolve_config(&args, &env)?;
            let target = SingleTarget::from_str(&single_args.target)
                .ok_or_else(|| anyhow::anyhow!("Unknown target: {}", single_args.target))?;
            let document = read_document(&single_args.document)?;

            let session = build_session(&config)?;
            run_single(&session, target, &document, &formatter(&args, &env)).await?;
        }
        cli::Command::Load(load_args) => {
            let mut config = resolve_config(&args, &env)?;
            apply_load_overrides(&mut config, load_args.batch_size, load_args.sequential)?;
            let document = read_document(&load_args.document)?;

            let session = build_session(&config)?;
            run_load(&session, &document, &formatter(&args, &env)).await?;
        }
        cli::Command::Battle(battle_args) => {
            let mut config = resolve_config(&args, &env)?;
            apply_load_overrides(&mut config, battle_args.batch_size, battle_args.sequential)?;
            let document = read_document(&battle_args.document)?;

            let session = build_session(&config)?;
            let formatter = formatter(&args, &env);
            run_single(&session, SingleTarget::Both, &document, &formatter).await?;
            run_load(&session, &document, &formatter).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(&args, &env, &config_args.action)?;
        }
    }

    Ok(())
}

/// Defaults < config file < environment < command line
fn resolve_config(args: &Args, env: &EnvConfig) -> Result<AppConfig> {
    let path = args.config.clone().or_else(|| env.config_file.clone());
    let mut config = ConfigFile::resolve(path.as_deref())?.app;

    config.apply_env(env);
    if let Some(url) = &args.endpoint_a {
        config.endpoint_a.url = url.clone();
    }
    if let Some(url) = &args.endpoint_b {
        config.endpoint_b.url = url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

fn apply_load_overrides(
    config: &mut AppConfig,
    batch_size: Option<usize>,
    sequential: bool,
) -> Result<()> {
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    if sequential {
        config.sequential_load = true;
    }
    config.validate()
}

fn build_session(config: &AppConfig) -> Result<BattleSession> {
    let client = EndpointClient::with_timeout(config.timeout_secs)?;
    let endpoints = config.endpoints();

    info!(
        "Endpoint A: {} | Endpoint B: {} | timeout {}s",
        endpoints.a, endpoints.b, config.timeout_secs
    );

    Ok(BattleSession::new(Arc::new(client), endpoints)
        .with_batch_size(config.batch_size)
        .with_pair_mode(config.pair_mode()))
}

fn formatter(args: &Args, env: &EnvConfig) -> ResultFormatter {
    let format = args.format.clone().unwrap_or_else(|| env.format_or("table"));
    let formatter =
        ResultFormatter::new(OutputFormat::from_str(&format).unwrap_or(OutputFormat::Table));

    if args.no_color || !std::io::stdout().is_terminal() {
        formatter.no_color()
    } else {
        formatter
    }
}

/// Document from `--text`, `--file` (`-` is stdin), or piped stdin
fn read_document(args: &cli::DocumentArgs) -> Result<Document> {
    if let Some(text) = &args.text {
        return Ok(Document::new(text.clone()));
    }

    match args.file.as_deref() {
        Some("-") => read_stdin(),
        Some(path) => std::fs::read_to_string(path)
            .map(Document::from)
            .with_context(|| format!("Failed to read document: {path}")),
        None if !std::io::stdin().is_terminal() => read_stdin(),
        None => Ok(Document::default()),
    }
}

fn read_stdin() -> Result<Document> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read document from stdin")?;
    Ok(Document::from(text))
}

async fn run_single(
    session: &BattleSession,
    target: SingleTarget,
    document: &Document,
    formatter: &ResultFormatter,
) -> Result<()> {
    session.run_single(target, document).await?;
    let state = session.snapshot().await;

    let report = SingleShotReport::from_state(&state, session.endpoints(), target);
    println!("{}", formatter.format_single(&report));

    Ok(())
}

async fn run_load(
    session: &BattleSession,
    document: &Document,
    formatter: &ResultFormatter,
) -> Result<()> {
    info!(
        "Load testing both endpoints with {} requests each",
        session.batch_size()
    );

    let run = session.run_throughput(document).await?;
    let state = session.snapshot().await;

    let report = ThroughputReport::from_state(&state, session.batch_size(), &run.failures);
    println!("{}", formatter.format_throughput(&report));

    if run.results.is_empty() {
        anyhow::bail!("Load test produced no results for either endpoint");
    }

    Ok(())
}

fn manage_config(args: &Args, env: &EnvConfig, action: &cli::ConfigAction) -> Result<()> {
    match action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            ConfigFile::example().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env: show_env } => {
            if *show_env {
                env.print_summary();
                println!();
                config::print_env_help();
            } else {
                let config = resolve_config(args, env)?;
                let json = args.format.as_deref() == Some("json");
                let output = if json {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = match file {
                Some(file) => file.clone(),
                None => ConfigFile::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./api-battle.yaml".to_string()),
            };

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
