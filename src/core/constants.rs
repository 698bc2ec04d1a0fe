//! Centralized constants: environment variable names and defaults.

// --- Application identity ---
pub const APP_NAME: &str = "ingestd";
pub const APP_NAME_LOWER: &str = "ingestd";

// --- Environment variables - logging ---
pub const ENV_LOG: &str = "INGESTD_LOG";

// --- Environment variables - broker connection ---
pub const ENV_BROKER_HOST: &str = "BROKER_HOST";
pub const ENV_BROKER_PORT: &str = "BROKER_PORT";
pub const ENV_CLIENT_KIND: &str = "INGESTD_CLIENT";
pub const ENV_CLIENT_KWARGS: &str = "INGESTD_CLIENT_KWARGS";

// --- Environment variables - orchestrator ---
pub const ENV_CONCURRENCY_N: &str = "INGESTD_CONCURRENCY_N";
pub const ENV_BATCH_SIZE: &str = "INGESTD_BATCH_SIZE";
pub const ENV_OUTPUT_DIRECTORY: &str = "INGESTD_OUTPUT_DIRECTORY";
pub const ENV_DATASET: &str = "INGESTD_DATASET";
pub const ENV_LOG_LEVEL: &str = "INGESTD_LOG_LEVEL";
pub const ENV_SHUFFLE_DATASET: &str = "INGESTD_SHUFFLE_DATASET";
pub const ENV_DRY_RUN: &str = "INGESTD_DRY_RUN";

// --- Environment variables - telemetry (ambient; no exporter is mandated) ---
pub const ENV_OTEL_EXPORTER_OTLP_ENDPOINT: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

// --- Environment variables - task-specific knobs (`extract` task, eclair method) ---
pub const ENV_ECLAIR_TRITON_HOST: &str = "ECLAIR_TRITON_HOST";
pub const ENV_ECLAIR_TRITON_PORT: &str = "ECLAIR_TRITON_PORT";
pub const ENV_ECLAIR_BATCH_SIZE: &str = "ECLAIR_BATCH_SIZE";
pub const ENV_UNSTRUCTURED_API_KEY: &str = "UNSTRUCTURED_API_KEY";
pub const ENV_UNSTRUCTURED_URL: &str = "UNSTRUCTURED_URL";

// --- Broker defaults ---
pub const DEFAULT_BROKER_PORT: u16 = 6379;
pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 300;
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 300;

/// Multiplier applied to a job's TTL to derive `submit_job`'s blocking-pop
/// timeout. Preserved verbatim from the original client; see DESIGN.md.
pub const SUBMIT_JOB_TTL_MULTIPLIER: u64 = 9;

/// Blocking-pop timeout for `fetch_job`'s poll. A timeout of 0 means "block
/// forever" under Redis BLPOP semantics, not "return immediately" — this is
/// the shortest timeout that still behaves as a bounded poll.
pub const FETCH_JOB_POLL_TIMEOUT_SECS: u64 = 1;

// --- Orchestrator defaults ---
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_CONCURRENCY_N: usize = 10;
pub const DEFAULT_JOB_TTL_SECS: u64 = 60;
