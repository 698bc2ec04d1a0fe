//! Core application: CLI parsing, logging, dataset assembly, task
//! validation, orchestrator wiring, and the final statistics report.

use std::path::PathBuf;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::broker::{BrokerClient, MemoryBrokerClient, RedisBrokerClient};
use crate::core::cli::{self, BrokerKind, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG, ENV_OTEL_EXPORTER_OTLP_ENDPOINT};
use crate::core::shutdown::ShutdownService;
use crate::error::IngestError;
use crate::model::{Task, TaskEnvironment};
use crate::orchestrator::{self, RunStats};
use crate::service::{IngestService, RedisIngestService};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
}

impl CoreApp {
    /// Run the application end to end, returning the process exit code.
    pub async fn run() -> anyhow::Result<i32> {
        dotenvy::dotenv().ok();

        let cli_config = cli::parse();
        Self::init_logging(&cli_config);
        tracing::debug!("application starting");
        if let Ok(endpoint) = std::env::var(ENV_OTEL_EXPORTER_OTLP_ENDPOINT) {
            tracing::debug!(endpoint, "OTLP endpoint configured; no exporter is wired up");
        }

        let app = Self::init(cli_config);
        app.shutdown.install_signal_handlers();

        match app.execute().await {
            Ok(exit_code) => Ok(exit_code),
            Err(e) => {
                tracing::error!(error = %e, "run aborted");
                Ok(e.exit_code())
            }
        }
    }

    fn init(cli: CliConfig) -> Self {
        let config = AppConfig::load(&cli);
        let shutdown = ShutdownService::new();
        Self { shutdown, config }
    }

    fn init_logging(cli: &CliConfig) {
        let default_filter = format!(
            "{},{}={}",
            cli.log_level.as_filter_directive(),
            APP_NAME_LOWER,
            cli.log_level.as_filter_directive()
        );
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Resolve the dataset (explicit `--doc` flags plus an optional
    /// `--dataset` file of newline-delimited paths), validate every
    /// `--task`, and — unless `dry_run` — drive the orchestrator. Task
    /// validation and dataset resolution happen entirely before any broker
    /// call, so a malformed `--task` or missing dataset aborts with exit
    /// code 1 and never touches the network.
    async fn execute(&self) -> Result<i32, IngestError> {
        let mut docs = self.config.docs.clone();
        if let Some(dataset_path) = &self.config.dataset {
            docs.extend(Self::load_dataset(dataset_path)?);
        }
        if self.config.shuffle_dataset {
            docs.shuffle(&mut rand::thread_rng());
        }

        let tasks = Self::parse_tasks(&self.config.raw_tasks)?;

        if self.config.dry_run {
            tracing::info!(documents = docs.len(), tasks = tasks.len(), "dry run: validation only");
            return Ok(0);
        }

        let broker = self.connect_broker().await?;
        let env = Arc::new(TaskEnvironment::from_process_env());
        let service: Arc<dyn IngestService> = Arc::new(RedisIngestService::new(
            broker,
            env,
            self.config.orchestrator.job_ttl_secs,
        ));

        let stats = orchestrator::create_and_process_jobs(
            &docs,
            &tasks,
            self.config.orchestrator.output_directory.as_deref(),
            self.config.orchestrator.batch_size,
            self.config.orchestrator.concurrency_n,
            service,
            &self.shutdown,
        )
        .await?;

        Self::print_report(&stats);
        self.shutdown.shutdown().await;
        Ok(stats.exit_code())
    }

    fn load_dataset(path: &PathBuf) -> Result<Vec<PathBuf>, IngestError> {
        if !path.exists() {
            return Err(crate::model::ModelError::MissingDataset(path.display().to_string()).into());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IngestError::Dataset(format!("reading '{}': {e}", path.display())))?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    fn parse_tasks(raw_tasks: &[String]) -> Result<Vec<Task>, IngestError> {
        raw_tasks
            .iter()
            .map(|raw| Self::parse_one_task(raw))
            .collect()
    }

    fn parse_one_task(raw: &str) -> Result<Task, IngestError> {
        let (name, json_str) = raw.split_once(':').ok_or_else(|| {
            IngestError::Dataset(format!("malformed --task '{raw}': expected 'NAME:{{JSON}}'"))
        })?;
        let value: serde_json::Value = serde_json::from_str(json_str).map_err(|source| {
            crate::model::ModelError::MalformedTaskJson {
                name: name.to_string(),
                source,
            }
        })?;
        Ok(Task::from_name_and_json(name, &value)?)
    }

    async fn connect_broker(&self) -> Result<Arc<dyn BrokerClient>, IngestError> {
        match self.config.broker.kind {
            BrokerKind::Redis => {
                let broker = RedisBrokerClient::new(
                    &self.config.broker.redis_url(),
                    self.config.broker.max_retries,
                    self.config.broker.max_backoff_secs,
                    self.config.broker.connection_timeout_secs,
                )?;
                broker.connect_and_verify().await?;
                Ok(Arc::new(broker))
            }
            BrokerKind::Memory => {
                tracing::debug!("using in-process memory broker");
                Ok(Arc::new(MemoryBrokerClient::new()))
            }
        }
    }

    fn print_report(stats: &RunStats) {
        println!("{}", stats.report());
    }
}
