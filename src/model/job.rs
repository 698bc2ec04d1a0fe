//! `JobSpec`: the immutable, submitter-owned description of one
//! document-processing request.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::document::DocumentType;
use super::env::TaskEnvironment;
use super::error::ModelError;
use super::payload::Base64Payload;
use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracingOptions {
    pub trace: bool,
    pub ts_send: u64,
}

impl TracingOptions {
    pub fn now(trace: bool) -> Self {
        let ts_send = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self { trace, ts_send }
    }
}

/// One document plus its ordered pipeline of tasks. Immutable once built;
/// the submitter owns it exclusively until `submit_job` succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub job_id: String,
    pub document_type: DocumentType,
    pub payload: Base64Payload,
    pub source_id: String,
    pub source_name: String,
    pub tasks: Vec<Task>,
    pub tracing_options: TracingOptions,
}

impl JobSpec {
    pub fn new(
        job_id: String,
        document_type: DocumentType,
        payload: Base64Payload,
        source_id: String,
        source_name: String,
        tasks: Vec<Task>,
        tracing_options: TracingOptions,
    ) -> Result<Self, ModelError> {
        for task in &tasks {
            if let Task::Extract(extract) = task
                && extract.document_type != document_type
            {
                return Err(ModelError::DocumentTypeMismatch {
                    task: extract.document_type.as_str().to_string(),
                    job: document_type.as_str().to_string(),
                });
            }
        }
        Ok(Self {
            job_id,
            document_type,
            payload,
            source_id,
            source_name,
            tasks,
            tracing_options,
        })
    }

    /// `{ job_id, job_payload: { source_id, source_name, document_type,
    /// content: [base64], tasks: [task.to_dict()...] }, tracing_options }`
    pub fn to_wire(&self, env: &TaskEnvironment) -> Value {
        json!({
            "job_id": self.job_id,
            "job_payload": {
                "source_id": self.source_id,
                "source_name": self.source_name,
                "document_type": self.document_type.as_str(),
                "content": [base64_of(&self.payload)],
                "tasks": self.tasks.iter().map(|t| t.to_wire(env)).collect::<Vec<_>>(),
            },
            "tracing_options": {
                "trace": self.tracing_options.trace,
                "ts_send": self.tracing_options.ts_send,
            },
        })
    }
}

fn base64_of(payload: &Base64Payload) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(payload.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::ExtractTask;

    fn sample_job(document_type: DocumentType) -> JobSpec {
        JobSpec::new(
            "job-1".to_string(),
            document_type,
            Base64Payload(b"%PDF-1.4".to_vec()),
            "source-1".to_string(),
            "source-1.pdf".to_string(),
            vec![],
            TracingOptions::now(true),
        )
        .unwrap()
    }

    #[test]
    fn rejects_extract_task_with_mismatched_document_type() {
        let extract =
            Task::Extract(ExtractTask::new(DocumentType::Docx, None, true, true, false, None).unwrap());
        let err = JobSpec::new(
            "job-1".to_string(),
            DocumentType::Pdf,
            Base64Payload::default(),
            "source-1".to_string(),
            "source-1.pdf".to_string(),
            vec![extract],
            TracingOptions::now(false),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DocumentTypeMismatch { .. }));
    }

    #[test]
    fn to_wire_matches_expected_shape() {
        let job = sample_job(DocumentType::Pdf);
        let env = TaskEnvironment::default();
        let wire = job.to_wire(&env);
        assert_eq!(wire["job_id"], "job-1");
        assert_eq!(wire["job_payload"]["document_type"], "pdf");
        assert_eq!(wire["job_payload"]["content"][0], "JVBERi0xLjQ=");
    }
}
