//! Environment-derived parameters read once at task-factory construction and
//! injected at serialization time, never re-read per call.
//!
//! The original client reads `ECLAIR_TRITON_HOST`/`ECLAIR_TRITON_PORT`/
//! `ECLAIR_BATCH_SIZE` and `unstructured_local`'s api key/url from the
//! environment on every `to_dict()` call. Reading them once here keeps the
//! exposed wire shape identical while making task serialization pure and
//! deterministic in tests.

use crate::core::constants::{
    ENV_ECLAIR_BATCH_SIZE, ENV_ECLAIR_TRITON_HOST, ENV_ECLAIR_TRITON_PORT,
    ENV_UNSTRUCTURED_API_KEY, ENV_UNSTRUCTURED_URL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEnvironment {
    pub eclair_triton_host: String,
    pub eclair_triton_port: String,
    pub eclair_batch_size: String,
    pub unstructured_api_key: String,
    pub unstructured_url: String,
}

impl Default for TaskEnvironment {
    fn default() -> Self {
        Self::from_process_env()
    }
}

impl TaskEnvironment {
    /// Snapshot the relevant environment variables once.
    pub fn from_process_env() -> Self {
        Self {
            eclair_triton_host: std::env::var(ENV_ECLAIR_TRITON_HOST)
                .unwrap_or_else(|_| "localhost".to_string()),
            eclair_triton_port: std::env::var(ENV_ECLAIR_TRITON_PORT)
                .unwrap_or_else(|_| "8001".to_string()),
            eclair_batch_size: std::env::var(ENV_ECLAIR_BATCH_SIZE)
                .unwrap_or_else(|_| "16".to_string()),
            unstructured_api_key: std::env::var(ENV_UNSTRUCTURED_API_KEY).unwrap_or_default(),
            unstructured_url: std::env::var(ENV_UNSTRUCTURED_URL).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_defaults_when_unset() {
        let env = TaskEnvironment {
            eclair_triton_host: "localhost".into(),
            eclair_triton_port: "8001".into(),
            eclair_batch_size: "16".into(),
            unstructured_api_key: String::new(),
            unstructured_url: String::new(),
        };
        assert_eq!(env.eclair_triton_host, "localhost");
    }
}
