//! Result envelope: what a worker posts back to a job's response channel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Ok,
    Timeout,
    Error,
}

/// `{ job_id, status, trace: mapping<string, nanoseconds>, data }`
///
/// `trace` keys are namespaced `trace::entry::<stage>` /
/// `trace::exit::<stage>`; stages appear in pairs (see `crate::trace`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(default, rename = "trace")]
    pub trace_records: BTreeMap<String, u64>,
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let mut trace_records = BTreeMap::new();
        trace_records.insert("trace::entry::extract".to_string(), 100);
        trace_records.insert("trace::exit::extract".to_string(), 200);

        let envelope = ResultEnvelope {
            job_id: "job-1".to_string(),
            status: JobStatus::Ok,
            trace_records,
            data: serde_json::json!({"pages": 3}),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let back: ResultEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id, envelope.job_id);
        assert_eq!(back.trace_records, envelope.trace_records);
    }

    #[test]
    fn deserializes_wire_trace_key() {
        let wire = serde_json::json!({
            "job_id": "job-1",
            "status": "ok",
            "trace": {"trace::entry::extract": 100, "trace::exit::extract": 200},
            "data": {"pages": 3}
        });
        let envelope: ResultEnvelope = serde_json::from_value(wire).unwrap();
        assert_eq!(envelope.trace_records.len(), 2);
        assert_eq!(envelope.trace_records["trace::entry::extract"], 100);
    }
}
