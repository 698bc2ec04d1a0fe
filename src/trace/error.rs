//! Trace aggregation errors. Always logged and dropped from the span tree;
//! never fatal to the job or the run.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("stage '{stage}' is missing its entry/exit pair")]
    MissingPair { stage: String },

    #[error("stage '{stage}' has entry ({entry}) after exit ({exit}); clamped")]
    EntryAfterExit {
        stage: String,
        entry: u64,
        exit: u64,
    },
}
