//! Crate-boundary error taxonomy: composes every leaf error into the six-way
//! classification the CLI's exit code is derived from.
//!
//! Propagation policy: transient broker errors are recovered locally inside
//! `BrokerClient`; `JobTimeout`/`JobError` are per-job and surface only in
//! the final report; `UserInputError` and `BrokerFatalError` abort the run
//! immediately.

use thiserror::Error;

use crate::broker::BrokerError;
use crate::model::ModelError;
use crate::orchestrator::OrchestratorError;
use crate::trace::AggregationError;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed task JSON, unsupported `document_type`, method/type
    /// mismatch, missing dataset. Fatal at submission time.
    #[error(transparent)]
    UserInput(#[from] ModelError),

    /// Retries exhausted on a broker operation. Aborts the run.
    #[error("broker unavailable: {0}")]
    BrokerFatal(BrokerError),

    /// Anything else the orchestrator surfaces as fatal (I/O, unsupported
    /// extension).
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("dataset error: {0}")]
    Dataset(String),
}

impl From<BrokerError> for IngestError {
    fn from(e: BrokerError) -> Self {
        IngestError::BrokerFatal(e)
    }
}

impl IngestError {
    /// `1` user-input error, `2` broker unavailable. `JobTimeout`/`JobError`/
    /// `AggregationError` never reach this type — they're per-job outcomes
    /// recorded in `RunStats`, which derives exit code `3` itself.
    pub fn exit_code(&self) -> i32 {
        match self {
            IngestError::UserInput(_) | IngestError::Dataset(_) => 1,
            IngestError::BrokerFatal(_) => 2,
            IngestError::Orchestrator(OrchestratorError::Broker(_)) => 2,
            IngestError::Orchestrator(_) => 1,
        }
    }
}

/// Log an aggregation error and drop it from the span tree — never fatal.
pub fn log_aggregation_error(job_id: &str, err: &AggregationError) {
    tracing::warn!(job_id, error = %err, "trace aggregation error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_error_exits_one() {
        let err = IngestError::UserInput(ModelError::InvalidSplitLength(0));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn broker_fatal_exits_two() {
        let err = IngestError::BrokerFatal(BrokerError::Timeout);
        assert_eq!(err.exit_code(), 2);
    }
}
