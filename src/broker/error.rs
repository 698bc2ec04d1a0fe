//! Broker client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    /// Connection loss, ping failure, or other bounded transient condition.
    /// Retried locally with capped exponential backoff.
    #[error("transient broker error: {0}")]
    Transient(String),

    /// Retries exhausted. Aborts the run.
    #[error("broker unavailable after {attempts} attempts: {source}")]
    Fatal { source: String, attempts: u32 },

    /// `submit_job`'s response channel did not receive within its TTL budget.
    #[error("job timed out waiting for response")]
    Timeout,

    #[error("failed to serialize job payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("broker configuration error: {0}")]
    Config(String),
}

impl BrokerError {
    /// Whether this error should be retried locally rather than surfaced.
    pub fn is_transient(&self) -> bool {
        matches!(self, BrokerError::Transient(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_is_transient() {
        assert!(BrokerError::Transient("blip".into()).is_transient());
    }

    #[test]
    fn fatal_is_not_transient() {
        assert!(
            !BrokerError::Fatal {
                source: "down".into(),
                attempts: 3
            }
            .is_transient()
        );
    }
}
