use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "deepsignal",
    version,
    about = "Candidate screening: skill decay, contribution authenticity and a weighted credit score"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score one anonymised candidate profile
    Analyze(AnalyzeCommand),
    /// Score every candidate profile under a directory
    Batch(BatchCommand),
    /// Print the effective, validated settings
    Config(ConfigCommand),
    /// Show readiness of each agent
    Agents(AgentsCommand),
    /// Inspect an audit log
    #[command(subcommand)]
    Audit(AuditCommand),
}

/// Options shared by every command that builds an orchestrator.
#[derive(Args, Clone, Debug)]
pub struct ScoringArgs {
    /// Config file (defaults to ./deepsignal.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory of `<username>.json` code-hosting snapshots
    #[arg(long)]
    pub snapshots: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeCommand {
    pub candidate: PathBuf,
    #[command(flatten)]
    pub scoring: ScoringArgs,
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: ReportFormat,
    /// Append the score trace to this JSON-lines audit log
    #[arg(long)]
    pub audit_log: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchCommand {
    pub dir: PathBuf,
    #[command(flatten)]
    pub scoring: ScoringArgs,
    #[arg(long)]
    pub audit_log: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct AgentsCommand {
    #[command(flatten)]
    pub scoring: ScoringArgs,
}

#[derive(Subcommand)]
pub enum AuditCommand {
    /// Check the hash chain of an audit log
    Verify { log: PathBuf },
}

#[derive(Clone, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}
