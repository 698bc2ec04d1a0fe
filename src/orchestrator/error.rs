//! Orchestrator-level errors: everything that can abort a run outright.
//! Per-job outcomes (timeout, worker error) are not modeled as errors here —
//! they're recorded in `RunStats` and reported, never propagated.

use thiserror::Error;

use crate::broker::BrokerError;
use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("broker unavailable: {0}")]
    Broker(#[from] BrokerError),

    #[error("failed to read document '{path}': {source}")]
    ReadDocument {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write result for '{path}': {source}")]
    WriteResult {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported document extension for '{0}'")]
    UnsupportedExtension(String),
}
