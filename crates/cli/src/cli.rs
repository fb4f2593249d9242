//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use config_loader::Override;

/// Stagehand - staged ML pipeline orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "stagehand",
    author,
    version,
    about = "Run a fixed multi-stage ML pipeline",
    long_about = "Runs the download, preprocess, check_data, segregate, random_forest and \n\
                  evaluate stages as external jobs, wiring each stage's output artifact \n\
                  into the next stage's input.\n\n\
                  Configuration values can be overridden with key.path=value arguments, \n\
                  e.g. main.execute_steps=download,preprocess"
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STAGEHAND_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STAGEHAND_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected pipeline stages
    Run(RunArgs),

    /// Show the stages that would run and their parameters
    Plan(PlanArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),
}

/// Configuration source shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (YAML, TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.yaml",
        env = "STAGEHAND_CONFIG"
    )]
    pub config: PathBuf,

    /// Configuration overrides (key.path=value)
    #[arg(value_name = "OVERRIDES")]
    pub overrides: Vec<Override>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Directory holding one job project per stage
    #[arg(long, default_value = ".", env = "STAGEHAND_PROJECT_ROOT")]
    pub project_root: PathBuf,

    /// Job runtime executable used to launch stages
    #[arg(long, default_value = stage_runner::process::DEFAULT_PROGRAM, env = "STAGEHAND_RUNNER")]
    pub runner: String,

    /// Directory receiving the derived model configuration
    #[arg(long, default_value = ".", env = "STAGEHAND_DERIVED_CONFIG_DIR")]
    pub derived_config_dir: PathBuf,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "STAGEHAND_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `plan` command
#[derive(Parser, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Directory holding one job project per stage
    #[arg(long, default_value = ".", env = "STAGEHAND_PROJECT_ROOT")]
    pub project_root: PathBuf,

    /// Directory receiving the derived model configuration
    #[arg(long, default_value = ".", env = "STAGEHAND_DERIVED_CONFIG_DIR")]
    pub derived_config_dir: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also print the effective configuration, overrides applied
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub resolved: Option<ResolvedFormat>,
}

/// Format of the effective configuration printed by `validate --resolved`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedFormat {
    Yaml,
    Toml,
    Json,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
