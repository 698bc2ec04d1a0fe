//! CLI surface: every flag also bound to an environment variable via
//! `env = ENV_...`, mirroring the teacher's `Cli` + `CliConfig` + `parse()`
//! split (`Cli` is what `clap` derives against; `CliConfig` is the plain
//! struct the rest of the application consumes).

use std::path::PathBuf;

use clap::Parser;

use super::constants::{
    ENV_BATCH_SIZE, ENV_BROKER_HOST, ENV_BROKER_PORT, ENV_CLIENT_KIND, ENV_CLIENT_KWARGS,
    ENV_CONCURRENCY_N, ENV_DATASET, ENV_DRY_RUN, ENV_LOG_LEVEL, ENV_OUTPUT_DIRECTORY,
    ENV_SHUFFLE_DATASET,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrokerKind {
    #[default]
    Redis,
    /// In-process queue, for local runs and dry-run-adjacent smoke tests
    /// without a live Redis.
    Memory,
}

fn parse_broker_kind(s: &str) -> Result<BrokerKind, String> {
    match s.to_uppercase().as_str() {
        "REDIS" => Ok(BrokerKind::Redis),
        "MEMORY" => Ok(BrokerKind::Memory),
        _ => Err(format!("Invalid client '{s}'. Valid options: REDIS, MEMORY")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Translated into a `tracing`/`EnvFilter` directive; `CRITICAL` has no
    /// direct `tracing` equivalent and maps to `error`.
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "error",
        }
    }
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    match s.to_uppercase().as_str() {
        "DEBUG" => Ok(LogLevel::Debug),
        "INFO" => Ok(LogLevel::Info),
        "WARNING" => Ok(LogLevel::Warning),
        "ERROR" => Ok(LogLevel::Error),
        "CRITICAL" => Ok(LogLevel::Critical),
        _ => Err(format!(
            "Invalid log level '{s}'. Valid options: DEBUG, INFO, WARNING, ERROR, CRITICAL"
        )),
    }
}

#[derive(Parser)]
#[command(name = super::constants::APP_NAME)]
#[command(version, about = "Ingestion job-dispatch core", long_about = None)]
pub struct Cli {
    /// Documents per batch submitted to the worker pool
    #[arg(long, default_value_t = super::constants::DEFAULT_BATCH_SIZE, env = ENV_BATCH_SIZE)]
    pub batch_size: usize,

    /// A document to ingest (repeatable)
    #[arg(long = "doc")]
    pub docs: Vec<PathBuf>,

    /// A newline-delimited file of document paths to ingest
    #[arg(long, env = ENV_DATASET)]
    pub dataset: Option<PathBuf>,

    /// Broker backend
    #[arg(long, default_value = "REDIS", env = ENV_CLIENT_KIND, value_parser = parse_broker_kind)]
    pub client: BrokerKind,

    /// Broker host
    #[arg(long, env = ENV_BROKER_HOST)]
    pub client_host: String,

    /// Broker port
    #[arg(long, default_value_t = super::constants::DEFAULT_BROKER_PORT, env = ENV_BROKER_PORT)]
    pub client_port: u16,

    /// Extra broker client kwargs, as a JSON object
    #[arg(long, default_value = "{}", env = ENV_CLIENT_KWARGS)]
    pub client_kwargs: String,

    /// Maximum number of jobs in flight at once
    #[arg(long, default_value_t = super::constants::DEFAULT_CONCURRENCY_N, env = ENV_CONCURRENCY_N)]
    pub concurrency_n: usize,

    /// Validate tasks and the dataset without contacting the broker
    #[arg(long, env = ENV_DRY_RUN)]
    pub dry_run: bool,

    /// Directory results are written to (in-memory/counters-only if absent)
    #[arg(long, env = ENV_OUTPUT_DIRECTORY)]
    pub output_directory: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, default_value = "INFO", env = ENV_LOG_LEVEL, value_parser = parse_log_level)]
    pub log_level: LogLevel,

    /// Shuffle the dataset before batching
    #[arg(long, default_value_t = true, env = ENV_SHUFFLE_DATASET)]
    pub shuffle_dataset: bool,

    /// A task to run, as `NAME:{JSON}` (repeatable)
    #[arg(long = "task")]
    pub tasks: Vec<String>,
}

/// Configuration derived from CLI arguments.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub batch_size: usize,
    pub docs: Vec<PathBuf>,
    pub dataset: Option<PathBuf>,
    pub client: BrokerKind,
    pub client_host: String,
    pub client_port: u16,
    pub client_kwargs: String,
    pub concurrency_n: usize,
    pub dry_run: bool,
    pub output_directory: Option<PathBuf>,
    pub log_level: LogLevel,
    pub shuffle_dataset: bool,
    pub tasks: Vec<String>,
}

pub fn parse() -> CliConfig {
    let cli = Cli::parse();
    CliConfig {
        batch_size: cli.batch_size,
        docs: cli.docs,
        dataset: cli.dataset,
        client: cli.client,
        client_host: cli.client_host,
        client_port: cli.client_port,
        client_kwargs: cli.client_kwargs,
        concurrency_n: cli.concurrency_n,
        dry_run: cli.dry_run,
        output_directory: cli.output_directory,
        log_level: cli.log_level,
        shuffle_dataset: cli.shuffle_dataset,
        tasks: cli.tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broker_kind_accepts_redis_case_insensitively() {
        assert_eq!(parse_broker_kind("redis"), Ok(BrokerKind::Redis));
        assert!(parse_broker_kind("kafka").is_err());
    }

    #[test]
    fn log_level_maps_to_filter_directives() {
        assert_eq!(parse_log_level("WARNING").unwrap().as_filter_directive(), "warn");
        assert!(parse_log_level("bogus").is_err());
    }
}
