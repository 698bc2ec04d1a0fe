//! Submission/Fetch API: the narrow surface exposed to a front-end.
//!
//! Grounded on the "Dependency-injected service" design note and the
//! original `submit_job`/`fetch_job` pair in
//! `nv_ingest/api/v1/ingest.py` / `IngestServiceMeta`: a constructor-injected
//! interface rather than a process-wide singleton, with one concrete
//! implementation wrapping the broker client.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::broker::{BrokerClient, BrokerError};
use crate::core::constants::FETCH_JOB_POLL_TIMEOUT_SECS;
use crate::model::{JobSpec, ResultEnvelope, TaskEnvironment};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Narrow front-end surface: submit a job, fetch its result by id.
#[async_trait]
pub trait IngestService: Send + Sync {
    /// Allocate a response channel, serialize `job_spec`, and delegate to
    /// the broker's `submit_job`. Blocks until a result is present or the
    /// job's TTL budget is exhausted.
    async fn submit_job(&self, job_spec: &JobSpec) -> Result<ResultEnvelope, ServiceError>;

    /// Short bounded-wait check on the response channel correlated with
    /// `job_id`. Returns `Ok(None)` (not `Err`) when no result shows up
    /// within the wait window — a caller polling for completion is the
    /// expected case, not a failure.
    async fn fetch_job(&self, job_id: &str) -> Result<Option<ResultEnvelope>, ServiceError>;
}

pub struct RedisIngestService {
    broker: Arc<dyn BrokerClient>,
    env: Arc<TaskEnvironment>,
    job_ttl_secs: u64,
}

impl RedisIngestService {
    pub fn new(broker: Arc<dyn BrokerClient>, env: Arc<TaskEnvironment>, job_ttl_secs: u64) -> Self {
        Self {
            broker,
            env,
            job_ttl_secs,
        }
    }

    fn response_channel(job_id: &str) -> String {
        format!("response_{job_id}")
    }
}

#[async_trait]
impl IngestService for RedisIngestService {
    async fn submit_job(&self, job_spec: &JobSpec) -> Result<ResultEnvelope, ServiceError> {
        let wire = job_spec.to_wire(&self.env);
        let payload = serde_json::to_vec(&wire)?;
        let response_channel = Self::response_channel(&job_spec.job_id);

        let response_bytes = self
            .broker
            .submit_job("task_queue", payload, &response_channel, self.job_ttl_secs)
            .await?;
        Ok(serde_json::from_slice(&response_bytes)?)
    }

    async fn fetch_job(&self, job_id: &str) -> Result<Option<ResultEnvelope>, ServiceError> {
        let response_channel = Self::response_channel(job_id);
        match self
            .broker
            .fetch_message(&response_channel, FETCH_JOB_POLL_TIMEOUT_SECS)
            .await
        {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(BrokerError::Timeout) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Allocate a fresh, never-reused job id.
pub fn new_job_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::MemoryBrokerClient;
    use crate::model::{Base64Payload, DocumentType, JobStatus, TracingOptions};

    fn sample_job(job_id: &str) -> JobSpec {
        JobSpec::new(
            job_id.to_string(),
            DocumentType::Pdf,
            Base64Payload(b"%PDF-1.4".to_vec()),
            "source-1".to_string(),
            "source-1.pdf".to_string(),
            vec![],
            TracingOptions::now(false),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_job_returns_none_when_not_ready() {
        let broker = Arc::new(MemoryBrokerClient::new());
        let service = RedisIngestService::new(broker, Arc::new(TaskEnvironment::default()), 5);
        let result = service.fetch_job("missing-job").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn submit_job_returns_worker_response() {
        let broker = Arc::new(MemoryBrokerClient::new());
        let worker_broker = broker.clone();
        let job = sample_job("job-42");
        let job_id = job.job_id.clone();

        tokio::spawn(async move {
            loop {
                if let Ok(payload) = worker_broker.fetch_message("task_queue", 5).await {
                    let wire: serde_json::Value = serde_json::from_slice(&payload).unwrap();
                    let job_id = wire["job_id"].as_str().unwrap().to_string();
                    let envelope = ResultEnvelope {
                        job_id: job_id.clone(),
                        status: JobStatus::Ok,
                        trace_records: Default::default(),
                        data: serde_json::json!({}),
                    };
                    let bytes = serde_json::to_vec(&envelope).unwrap();
                    worker_broker
                        .submit_message(&format!("response_{job_id}"), bytes)
                        .await
                        .unwrap();
                    break;
                }
            }
        });

        let service = RedisIngestService::new(broker, Arc::new(TaskEnvironment::default()), 5);
        let envelope = service.submit_job(&job).await.unwrap();
        assert_eq!(envelope.job_id, job_id);
        assert_eq!(envelope.status, JobStatus::Ok);
    }

    #[test]
    fn new_job_id_is_never_reused() {
        let a = new_job_id();
        let b = new_job_id();
        assert_ne!(a, b);
    }
}
