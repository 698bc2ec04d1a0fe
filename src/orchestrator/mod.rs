//! Client orchestrator: bounded worker pool, per-job state machine, batch
//! scheduler, and fetch-with-timeout loop.
//!
//! Grounded on `domain/traces/pipeline.rs`'s batching/worker-loop structure,
//! generalized from a Redis-stream consumer to a document-submission loop
//! driving the injected `IngestService`'s `submit_job`.

pub mod error;
pub mod job_state;
pub mod stats;

pub use error::OrchestratorError;
pub use job_state::JobState;
pub use stats::RunStats;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::core::shutdown::ShutdownService;
use crate::model::{Base64Payload, DocumentType, JobSpec, ResultEnvelope, Task, TracingOptions};
use crate::service::{IngestService, ServiceError, new_job_id};

/// One document's outcome, reported back to the caller as it finalizes.
/// The batch scheduler's ordering guarantee is weak: completions may occur
/// in any order; `job_id <-> source_id` correlation is the only determinism.
#[derive(Debug)]
pub enum JobOutcome {
    Completed {
        source_id: String,
        envelope: ResultEnvelope,
        spans: crate::trace::SpanTree,
    },
    TimedOut {
        source_id: String,
    },
    Errored {
        source_id: String,
        reason: String,
    },
}

/// Drive `docs` through the injected `IngestService`, respecting
/// `concurrency_n` in-flight jobs at a time. Returns aggregate statistics; a
/// single document failure never aborts the batch, but a broker error
/// propagates and aborts the run. Checked once per batch boundary, `shutdown`
/// stops new batches from starting while letting the in-flight one drain.
pub async fn create_and_process_jobs(
    docs: &[PathBuf],
    tasks: &[Task],
    output_dir: Option<&Path>,
    batch_size: usize,
    concurrency_n: usize,
    service: Arc<dyn IngestService>,
    shutdown: &ShutdownService,
) -> Result<RunStats, OrchestratorError> {
    let batch_size = batch_size.max(1);
    let concurrency_n = concurrency_n.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency_n));

    let mut stats = RunStats::default();

    for batch in docs.chunks(batch_size) {
        if shutdown.is_triggered() {
            tracing::info!(skipped = docs.len() - stats.submitted as usize, "shutdown requested, not submitting further batches");
            break;
        }
        let mut join_set = tokio::task::JoinSet::new();

        for doc_path in batch {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore not closed");
            let service = service.clone();
            let tasks = tasks.to_vec();
            let doc_path = doc_path.clone();
            let output_dir = output_dir.map(Path::to_path_buf);

            join_set.spawn(async move {
                let _permit = permit;
                process_one_document(&doc_path, &tasks, output_dir.as_deref(), service).await
            });
        }

        while let Some(joined) = join_set.join_next().await {
            let outcome = joined.expect("worker task panicked");
            stats.submitted += 1;
            match outcome? {
                JobOutcome::Completed { envelope, spans, .. } => {
                    let pages = envelope
                        .data
                        .get("pages")
                        .and_then(serde_json::Value::as_u64)
                        .unwrap_or(0);
                    tracing::debug!(
                        trace_id = %spans.trace_id,
                        spans = spans.children.len(),
                        "job trace aggregated"
                    );
                    let stage_latencies = stage_latencies_from(&envelope.trace_records);
                    stats.record_completion(stage_latencies, pages);
                }
                JobOutcome::TimedOut { .. } => stats.record_timeout(),
                JobOutcome::Errored { .. } => stats.record_error(),
            }
        }
    }

    Ok(stats)
}

async fn process_one_document(
    doc_path: &Path,
    tasks: &[Task],
    output_dir: Option<&Path>,
    service: Arc<dyn IngestService>,
) -> Result<JobOutcome, OrchestratorError> {
    let source_id = doc_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| doc_path.to_string_lossy().to_string());
    let source_name = doc_path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| source_id.clone());

    let document_type = match infer_document_type(doc_path) {
        Ok(document_type) => document_type,
        Err(err) => {
            return Ok(JobOutcome::Errored {
                source_id,
                reason: err.to_string(),
            });
        }
    };

    let bytes = match std::fs::read(doc_path) {
        Ok(bytes) => bytes,
        Err(source) => {
            let err = OrchestratorError::ReadDocument {
                path: doc_path.display().to_string(),
                source,
            };
            return Ok(JobOutcome::Errored {
                source_id,
                reason: err.to_string(),
            });
        }
    };

    let mut state = JobState::Built;

    let job_id = new_job_id();
    let job_spec = match JobSpec::new(
        job_id.clone(),
        document_type,
        Base64Payload(bytes),
        source_id.clone(),
        source_name,
        tasks.to_vec(),
        TracingOptions::now(true),
    ) {
        Ok(job_spec) => job_spec,
        Err(model_err) => {
            let err = OrchestratorError::Model(model_err);
            return Ok(JobOutcome::Errored {
                source_id,
                reason: err.to_string(),
            });
        }
    };

    state = JobState::Submitted;
    tracing::debug!(job_id, source_id, ?state, "job submitted");

    let outcome = match service.submit_job(&job_spec).await {
        Ok(envelope) => match envelope.status {
            crate::model::JobStatus::Ok => {
                state = JobState::Completed;
                if let Some(dir) = output_dir {
                    write_result_atomically(dir, &source_id, &envelope)?;
                }
                let (spans, aggregation_errors) =
                    crate::trace::aggregate(&job_id, &envelope.trace_records, None);
                for err in &aggregation_errors {
                    crate::error::log_aggregation_error(&job_id, err);
                }
                Ok(JobOutcome::Completed {
                    source_id: source_id.clone(),
                    envelope,
                    spans,
                })
            }
            crate::model::JobStatus::Timeout => {
                state = JobState::TimedOut;
                Ok(JobOutcome::TimedOut { source_id: source_id.clone() })
            }
            crate::model::JobStatus::Error => {
                state = JobState::Errored;
                Ok(JobOutcome::Errored {
                    source_id: source_id.clone(),
                    reason: "worker reported status=error".to_string(),
                })
            }
        },
        Err(ServiceError::Broker(crate::broker::BrokerError::Timeout)) => {
            state = JobState::TimedOut;
            Ok(JobOutcome::TimedOut { source_id: source_id.clone() })
        }
        Err(ServiceError::Broker(e @ crate::broker::BrokerError::Fatal { .. })) => {
            state = JobState::Errored;
            Err(OrchestratorError::Broker(e))
        }
        Err(e) => {
            state = JobState::Errored;
            Ok(JobOutcome::Errored {
                source_id: source_id.clone(),
                reason: e.to_string(),
            })
        }
    };

    tracing::debug!(job_id, source_id, ?state, "job reached terminal state");
    debug_assert!(state.is_terminal());
    outcome
}

fn infer_document_type(path: &Path) -> Result<DocumentType, OrchestratorError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    let normalized = match ext.as_str() {
        "pdf" => "pdf",
        "docx" => "docx",
        "pptx" => "pptx",
        "html" | "htm" => "html",
        "xml" => "xml",
        "xlsx" | "xls" => "excel",
        "csv" => "csv",
        "parquet" => "parquet",
        other => return Err(OrchestratorError::UnsupportedExtension(other.to_string())),
    };
    DocumentType::parse(normalized).ok_or_else(|| OrchestratorError::UnsupportedExtension(ext.clone()))
}

/// Atomic write: write to a sibling temp file, then rename — the result file
/// is never partially written.
fn write_result_atomically(
    output_dir: &Path,
    source_id: &str,
    envelope: &ResultEnvelope,
) -> Result<(), OrchestratorError> {
    std::fs::create_dir_all(output_dir).map_err(|source| OrchestratorError::WriteResult {
        path: output_dir.display().to_string(),
        source,
    })?;
    let final_path = output_dir.join(format!("{source_id}.json"));
    let tmp_path = output_dir.join(format!(".{source_id}.json.tmp"));

    let json = serde_json::to_vec_pretty(envelope).expect("ResultEnvelope always serializes");
    std::fs::write(&tmp_path, json).map_err(|source| OrchestratorError::WriteResult {
        path: tmp_path.display().to_string(),
        source,
    })?;
    std::fs::rename(&tmp_path, &final_path).map_err(|source| OrchestratorError::WriteResult {
        path: final_path.display().to_string(),
        source,
    })?;
    Ok(())
}

fn stage_latencies_from(trace_records: &BTreeMap<String, u64>) -> BTreeMap<String, u64> {
    let mut entries: BTreeMap<String, u64> = BTreeMap::new();
    let mut exits: BTreeMap<String, u64> = BTreeMap::new();
    for (key, &value) in trace_records {
        if let Some(stage) = key.strip_prefix("trace::entry::") {
            entries.insert(stage.to_string(), value);
        } else if let Some(stage) = key.strip_prefix("trace::exit::") {
            exits.insert(stage.to_string(), value);
        }
    }
    entries
        .into_iter()
        .filter_map(|(stage, entry)| exits.get(&stage).map(|&exit| (stage, exit.saturating_sub(entry))))
        .collect()
}
