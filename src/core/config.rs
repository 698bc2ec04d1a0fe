//! Application configuration, assembled from `CliConfig` plus the
//! environment-driven defaults in `constants.rs`.

use super::cli::{BrokerKind, CliConfig, LogLevel};
use super::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY_N, DEFAULT_CONNECTION_TIMEOUT_SECS,
    DEFAULT_JOB_TTL_SECS, DEFAULT_MAX_BACKOFF_SECS, DEFAULT_MAX_RETRIES,
};

#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub kind: BrokerKind,
    pub host: String,
    pub port: u16,
    /// Parsed from `--client_kwargs`; currently only `max_retries`,
    /// `max_backoff_secs`, `connection_timeout_secs` are recognized, the
    /// rest pass through unread (forward-compatible with broker-specific
    /// knobs the original CLI surface leaves open-ended).
    pub max_retries: u32,
    pub max_backoff_secs: u64,
    pub connection_timeout_secs: u64,
}

impl BrokerConfig {
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }

    fn from_cli(cli: &CliConfig) -> Self {
        let kwargs: serde_json::Value =
            serde_json::from_str(&cli.client_kwargs).unwrap_or(serde_json::Value::Null);
        let max_retries = kwargs
            .get("max_retries")
            .and_then(serde_json::Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(DEFAULT_MAX_RETRIES);
        let max_backoff_secs = kwargs
            .get("max_backoff_secs")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(DEFAULT_MAX_BACKOFF_SECS);
        let connection_timeout_secs = kwargs
            .get("connection_timeout_secs")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS);

        Self {
            kind: cli.client,
            host: cli.client_host.clone(),
            port: cli.client_port,
            max_retries,
            max_backoff_secs,
            connection_timeout_secs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub batch_size: usize,
    pub concurrency_n: usize,
    pub job_ttl_secs: u64,
    pub output_directory: Option<std::path::PathBuf>,
}

impl OrchestratorConfig {
    fn from_cli(cli: &CliConfig) -> Self {
        Self {
            batch_size: if cli.batch_size == 0 {
                DEFAULT_BATCH_SIZE
            } else {
                cli.batch_size
            },
            concurrency_n: if cli.concurrency_n == 0 {
                DEFAULT_CONCURRENCY_N
            } else {
                cli.concurrency_n
            },
            job_ttl_secs: DEFAULT_JOB_TTL_SECS,
            output_directory: cli.output_directory.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub broker: BrokerConfig,
    pub orchestrator: OrchestratorConfig,
    pub log_level: LogLevel,
    pub dry_run: bool,
    pub docs: Vec<std::path::PathBuf>,
    pub dataset: Option<std::path::PathBuf>,
    pub shuffle_dataset: bool,
    pub raw_tasks: Vec<String>,
}

impl AppConfig {
    pub fn load(cli: &CliConfig) -> Self {
        Self {
            broker: BrokerConfig::from_cli(cli),
            orchestrator: OrchestratorConfig::from_cli(cli),
            log_level: cli.log_level,
            dry_run: cli.dry_run,
            docs: cli.docs.clone(),
            dataset: cli.dataset.clone(),
            shuffle_dataset: cli.shuffle_dataset,
            raw_tasks: cli.tasks.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_cli() -> CliConfig {
        CliConfig {
            batch_size: 10,
            docs: vec![],
            dataset: None,
            client: BrokerKind::Redis,
            client_host: "localhost".to_string(),
            client_port: 6379,
            client_kwargs: "{}".to_string(),
            concurrency_n: 10,
            dry_run: false,
            output_directory: None,
            log_level: LogLevel::Info,
            shuffle_dataset: true,
            tasks: vec![],
        }
    }

    #[test]
    fn broker_config_parses_kwargs_overrides() {
        let mut cli = base_cli();
        cli.client_kwargs = r#"{"max_retries": 5, "max_backoff_secs": 60}"#.to_string();
        let config = AppConfig::load(&cli);
        assert_eq!(config.broker.max_retries, 5);
        assert_eq!(config.broker.max_backoff_secs, 60);
        assert_eq!(config.broker.redis_url(), "redis://localhost:6379");
    }

    #[test]
    fn broker_config_defaults_on_empty_kwargs() {
        let cli = base_cli();
        let config = AppConfig::load(&cli);
        assert_eq!(config.broker.max_retries, DEFAULT_MAX_RETRIES);
    }
}
