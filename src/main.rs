mod audit;
mod batch;
mod cli;
mod config;
mod error;
mod fetch;
mod guardrails;
mod orchestrator;
mod report;
mod scoring;
mod types;

use crate::audit::AuditLog;
use crate::error::DeepSignalError;
use crate::fetch::{ProfileSource, SnapshotDir, Unavailable};
use crate::orchestrator::Orchestrator;
use crate::types::report::{AnalysisReport, RiskLevel};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const BLOCKING: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
    pub const REJECTED: i32 = 4;
}

fn init_tracing(quiet: bool, verbose: u8) -> Result<(), DeepSignalError> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };

    let filter =
        EnvFilter::try_from_env("DEEPSIGNAL_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| {
            DeepSignalError::Configuration(format!("failed to initialize tracing: {error}"))
        })
}

fn exit_code_for(level: RiskLevel) -> i32 {
    match level {
        RiskLevel::Low => exit_code::SUCCESS,
        RiskLevel::Medium => exit_code::WARNINGS,
        RiskLevel::High | RiskLevel::Critical => exit_code::BLOCKING,
    }
}

fn profile_source(snapshots: Option<&Path>) -> Result<Arc<dyn ProfileSource>, DeepSignalError> {
    match snapshots {
        Some(dir) if !dir.is_dir() => Err(DeepSignalError::InputNotFound(
            dir.display().to_string(),
        )),
        Some(dir) => Ok(Arc::new(SnapshotDir::new(dir))),
        None => Ok(Arc::new(Unavailable)),
    }
}

fn build_orchestrator(scoring: &cli::ScoringArgs) -> Result<Orchestrator, DeepSignalError> {
    let settings = config::load_settings(scoring.config.as_deref())?;
    let source = profile_source(scoring.snapshots.as_deref())?;
    Ok(Orchestrator::new(&settings, source))
}

fn record_audit(path: Option<&Path>, reports: &[&AnalysisReport]) -> Result<(), DeepSignalError> {
    let Some(path) = path else {
        return Ok(());
    };
    let mut log = AuditLog::open(path)?;
    for report in reports {
        log.record(report)?;
    }
    Ok(())
}

fn run() -> Result<i32, DeepSignalError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match cli.command {
        cli::Commands::Analyze(cmd) => {
            let orchestrator = build_orchestrator(&cmd.scoring)?;
            let candidate = batch::load_candidate(&cmd.candidate)?;
            let analysis = orchestrator.analyze(&candidate)?;

            let output_format = match cmd.format {
                cli::ReportFormat::Json => report::OutputFormat::Json,
                cli::ReportFormat::Md => report::OutputFormat::Md,
            };
            let rendered = report::render(&analysis, output_format)?;
            println!("{rendered}");

            record_audit(cmd.audit_log.as_deref(), &[&analysis])?;
            Ok(exit_code_for(analysis.risk_level))
        }
        cli::Commands::Batch(cmd) => {
            if !cmd.dir.is_dir() {
                return Err(DeepSignalError::InputNotFound(cmd.dir.display().to_string()));
            }
            let orchestrator = build_orchestrator(&cmd.scoring)?;
            let files = batch::list_candidate_files(&cmd.dir);
            if files.is_empty() {
                println!("batch: no candidate files under {}", cmd.dir.display());
                return Ok(exit_code::SUCCESS);
            }

            let outcomes = batch::run(&orchestrator, &files, Utc::now());

            let mut code = exit_code::SUCCESS;
            let mut analysed = Vec::new();
            for outcome in &outcomes {
                let name = outcome.path.display();
                match &outcome.result {
                    Ok(analysis) => {
                        println!(
                            "{name}: {} score {:.2} {}",
                            analysis.candidate_id, analysis.credit_score, analysis.risk_level
                        );
                        code = code.max(exit_code_for(analysis.risk_level));
                        analysed.push(analysis);
                    }
                    Err(error @ DeepSignalError::PiiDetected(_)) => {
                        println!("{name}: rejected: {error}");
                        code = code.max(exit_code::REJECTED);
                    }
                    Err(error) => {
                        println!("{name}: error: {error}");
                        code = code.max(exit_code::RUNTIME_FAILURE);
                    }
                }
            }

            record_audit(cmd.audit_log.as_deref(), &analysed)?;
            println!("batch: {} of {} analysed", analysed.len(), outcomes.len());
            Ok(code)
        }
        cli::Commands::Config(cmd) => {
            let settings = config::load_settings(cmd.config.as_deref())?;
            print!("{}", config::render_settings(&settings)?);
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Agents(cmd) => {
            let orchestrator = build_orchestrator(&cmd.scoring)?;
            for status in orchestrator.agent_status() {
                println!("{} [{}]: {}", status.name, status.key, status.status);
            }
            Ok(exit_code::SUCCESS)
        }
        cli::Commands::Audit(cli::AuditCommand::Verify { log }) => {
            if !log.is_file() {
                return Err(DeepSignalError::InputNotFound(log.display().to_string()));
            }
            let entries = audit::verify_chain(&log)?;
            println!("audit: {entries} entries verified in {}", log.display());
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e @ DeepSignalError::PiiDetected(_)) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::REJECTED);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
