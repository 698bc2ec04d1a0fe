//! Validation errors raised while constructing a `Task` or `JobSpec`.
//!
//! All variants here map to the `UserInputError` leg of the error taxonomy:
//! fatal at submission time, never retried, no broker interaction.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported document type '{0}'")]
    UnsupportedDocumentType(String),

    #[error("extract method '{method}' is not valid for document type '{document_type}'")]
    InvalidExtractMethod {
        method: String,
        document_type: String,
    },

    #[error("extract task document_type '{task}' does not match job document_type '{job}'")]
    DocumentTypeMismatch { task: String, job: String },

    #[error("invalid split_by value '{0}'")]
    InvalidSplitBy(String),

    #[error("split_length must be > 0, got {0}")]
    InvalidSplitLength(i64),

    #[error("sentence_window_size is only valid when split_by = sentence")]
    SentenceWindowRequiresSentenceSplit,

    #[error("batch_size must be > 0, got {0}")]
    InvalidBatchSize(i64),

    #[error("unknown task type '{0}'")]
    UnknownTaskType(String),

    #[error("malformed task JSON for '{name}': {source}")]
    MalformedTaskJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("dataset not found at '{0}'")]
    MissingDataset(String),

    #[error("unexpected property '{property}' for task '{task}'")]
    UnexpectedProperty { task: String, property: String },
}
