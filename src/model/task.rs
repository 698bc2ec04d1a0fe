//! Tagged-variant task model.
//!
//! The original client models tasks as a class hierarchy with an overridden
//! `to_dict()`. Re-architected per the "dynamic task dispatch" design note as
//! a single `Task` enum — one validated record per variant, serialization is
//! a plain function over the variant instead of virtual dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::document::DocumentType;
use super::env::TaskEnvironment;
use super::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitBy {
    Word,
    Sentence,
    Passage,
    Page,
    Size,
}

impl SplitBy {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "word" => Some(SplitBy::Word),
            "sentence" => Some(SplitBy::Sentence),
            "passage" => Some(SplitBy::Passage),
            "page" => Some(SplitBy::Page),
            "size" => Some(SplitBy::Size),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SplitBy::Word => "word",
            SplitBy::Sentence => "sentence",
            SplitBy::Passage => "passage",
            SplitBy::Page => "page",
            SplitBy::Size => "size",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractTask {
    pub document_type: DocumentType,
    pub method: String,
    pub extract_text: bool,
    pub extract_images: bool,
    pub extract_tables: bool,
    pub text_depth: String,
}

impl ExtractTask {
    pub fn new(
        document_type: DocumentType,
        method: Option<String>,
        extract_text: bool,
        extract_images: bool,
        extract_tables: bool,
        text_depth: Option<String>,
    ) -> Result<Self, ModelError> {
        let method = method.unwrap_or_else(|| document_type.default_method().to_string());
        if !document_type.allowed_methods().contains(&method.as_str()) {
            return Err(ModelError::InvalidExtractMethod {
                method,
                document_type: document_type.as_str().to_string(),
            });
        }
        Ok(Self {
            document_type,
            method,
            extract_text,
            extract_images,
            extract_tables,
            text_depth: text_depth.unwrap_or_else(|| "document".to_string()),
        })
    }

    fn to_wire(&self, env: &TaskEnvironment) -> Value {
        let mut params = Map::new();
        params.insert("extract_text".into(), json!(self.extract_text));
        params.insert("extract_images".into(), json!(self.extract_images));
        params.insert("extract_tables".into(), json!(self.extract_tables));
        params.insert("text_depth".into(), json!(self.text_depth));

        match self.method.as_str() {
            "unstructured_local" => {
                params.insert("api_key".into(), json!(env.unstructured_api_key));
                params.insert("unstructured_url".into(), json!(env.unstructured_url));
            }
            "eclair" => {
                params.insert("eclair_triton_host".into(), json!(env.eclair_triton_host));
                params.insert("eclair_triton_port".into(), json!(env.eclair_triton_port));
                params.insert("eclair_batch_size".into(), json!(env.eclair_batch_size));
            }
            _ => {}
        }

        json!({
            "type": "extract",
            "task_properties": {
                "method": self.method,
                "document_type": self.document_type.as_str(),
                "params": params,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitTask {
    pub split_by: SplitBy,
    pub split_length: u32,
    pub split_overlap: u32,
    pub max_character_length: Option<u32>,
    pub sentence_window_size: Option<u32>,
}

impl SplitTask {
    pub fn new(
        split_by: SplitBy,
        split_length: i64,
        split_overlap: i64,
        max_character_length: Option<i64>,
        sentence_window_size: Option<i64>,
    ) -> Result<Self, ModelError> {
        if split_length <= 0 {
            return Err(ModelError::InvalidSplitLength(split_length));
        }
        if let Some(window) = sentence_window_size
            && window > 0
            && split_by != SplitBy::Sentence
        {
            return Err(ModelError::SentenceWindowRequiresSentenceSplit);
        }
        Ok(Self {
            split_by,
            split_length: split_length as u32,
            split_overlap: split_overlap.max(0) as u32,
            max_character_length: max_character_length.map(|v| v.max(0) as u32),
            sentence_window_size: sentence_window_size.map(|v| v.max(0) as u32),
        })
    }

    fn to_wire(&self, _env: &TaskEnvironment) -> Value {
        json!({
            "type": "split",
            "task_properties": {
                "split_by": self.split_by.as_str(),
                "split_length": self.split_length,
                "split_overlap": self.split_overlap,
                "max_character_length": self.max_character_length,
                "sentence_window_size": self.sentence_window_size,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoreTask {
    pub params: Map<String, Value>,
}

impl StoreTask {
    fn to_wire(&self, _env: &TaskEnvironment) -> Value {
        json!({ "type": "store", "task_properties": self.params })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedTask {
    pub params: Map<String, Value>,
}

impl EmbedTask {
    fn to_wire(&self, _env: &TaskEnvironment) -> Value {
        json!({ "type": "embed", "task_properties": self.params })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VdbUploadTask {
    pub filter_errors: bool,
}

impl VdbUploadTask {
    fn to_wire(&self, _env: &TaskEnvironment) -> Value {
        json!({
            "type": "vdb_upload",
            "task_properties": { "filter_errors": self.filter_errors }
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTask {
    pub batch_size: u32,
    pub model_name: String,
    pub endpoint_url: String,
}

impl Default for CaptionTask {
    fn default() -> Self {
        Self {
            batch_size: 8,
            model_name: "deberta_large".to_string(),
            endpoint_url: "triton:8001".to_string(),
        }
    }
}

impl CaptionTask {
    pub fn new(
        batch_size: Option<i64>,
        model_name: Option<String>,
        endpoint_url: Option<String>,
    ) -> Result<Self, ModelError> {
        let default = Self::default();
        let batch_size = match batch_size {
            Some(b) if b > 0 => b as u32,
            Some(b) => return Err(ModelError::InvalidBatchSize(b)),
            None => default.batch_size,
        };
        Ok(Self {
            batch_size,
            model_name: model_name.unwrap_or(default.model_name),
            endpoint_url: endpoint_url.unwrap_or(default.endpoint_url),
        })
    }

    fn to_wire(&self, _env: &TaskEnvironment) -> Value {
        json!({
            "type": "caption",
            "task_properties": {
                "batch_size": self.batch_size,
                "model_name": self.model_name,
                "endpoint_url": self.endpoint_url,
            }
        })
    }
}

/// A single stage in a job's pipeline. Serialization is a plain function
/// over the variant — no virtual dispatch, no class hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Extract(ExtractTask),
    Split(SplitTask),
    Store(StoreTask),
    Embed(EmbedTask),
    VdbUpload(VdbUploadTask),
    Caption(CaptionTask),
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Extract(_) => "extract",
            Task::Split(_) => "split",
            Task::Store(_) => "store",
            Task::Embed(_) => "embed",
            Task::VdbUpload(_) => "vdb_upload",
            Task::Caption(_) => "caption",
        }
    }

    /// Environment knobs are injected here, at serialization time, never at
    /// construction — the same `Task` value is portable across environments.
    pub fn to_wire(&self, env: &TaskEnvironment) -> Value {
        match self {
            Task::Extract(t) => t.to_wire(env),
            Task::Split(t) => t.to_wire(env),
            Task::Store(t) => t.to_wire(env),
            Task::Embed(t) => t.to_wire(env),
            Task::VdbUpload(t) => t.to_wire(env),
            Task::Caption(t) => t.to_wire(env),
        }
    }

    /// Build a task from the CLI's `'NAME:{JSON}'` surface, rejecting unknown
    /// task names and properties outside the declared set for each variant.
    ///
    /// `store`/`embed` have no declared property schema of their own — their
    /// whole JSON object is the pass-through `task_properties` payload — so
    /// the declared-set check does not apply to them.
    pub fn from_name_and_json(name: &str, json: &Value) -> Result<Self, ModelError> {
        let obj = json.as_object().cloned().unwrap_or_default();
        match name {
            "extract" => {
                reject_unexpected_properties(
                    "extract",
                    &obj,
                    &[
                        "document_type",
                        "method",
                        "extract_text",
                        "extract_images",
                        "extract_tables",
                        "text_depth",
                    ],
                )?;
                let document_type = obj
                    .get("document_type")
                    .and_then(Value::as_str)
                    .and_then(DocumentType::parse)
                    .ok_or_else(|| {
                        ModelError::UnsupportedDocumentType(
                            obj.get("document_type")
                                .and_then(Value::as_str)
                                .unwrap_or("")
                                .to_string(),
                        )
                    })?;
                let method = obj
                    .get("method")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string());
                let extract_text = obj.get("extract_text").and_then(Value::as_bool).unwrap_or(true);
                let extract_images = obj
                    .get("extract_images")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                let extract_tables = obj
                    .get("extract_tables")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let text_depth = obj
                    .get("text_depth")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string());
                Ok(Task::Extract(ExtractTask::new(
                    document_type,
                    method,
                    extract_text,
                    extract_images,
                    extract_tables,
                    text_depth,
                )?))
            }
            "split" => {
                reject_unexpected_properties(
                    "split",
                    &obj,
                    &[
                        "split_by",
                        "split_length",
                        "split_overlap",
                        "max_character_length",
                        "sentence_window_size",
                    ],
                )?;
                let split_by = obj
                    .get("split_by")
                    .and_then(Value::as_str)
                    .and_then(SplitBy::parse)
                    .ok_or_else(|| {
                        ModelError::InvalidSplitBy(
                            obj.get("split_by")
                                .and_then(Value::as_str)
                                .unwrap_or("")
                                .to_string(),
                        )
                    })?;
                let split_length = obj.get("split_length").and_then(Value::as_i64).unwrap_or(60);
                let split_overlap = obj.get("split_overlap").and_then(Value::as_i64).unwrap_or(10);
                let max_character_length = obj.get("max_character_length").and_then(Value::as_i64);
                let sentence_window_size = obj.get("sentence_window_size").and_then(Value::as_i64);
                Ok(Task::Split(SplitTask::new(
                    split_by,
                    split_length,
                    split_overlap,
                    max_character_length,
                    sentence_window_size,
                )?))
            }
            "store" => Ok(Task::Store(StoreTask { params: obj })),
            "embed" => Ok(Task::Embed(EmbedTask { params: obj })),
            "vdb_upload" => {
                reject_unexpected_properties("vdb_upload", &obj, &["filter_errors"])?;
                let filter_errors = obj
                    .get("filter_errors")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                Ok(Task::VdbUpload(VdbUploadTask { filter_errors }))
            }
            "caption" => {
                reject_unexpected_properties(
                    "caption",
                    &obj,
                    &["batch_size", "model_name", "endpoint_url"],
                )?;
                let batch_size = obj.get("batch_size").and_then(Value::as_i64);
                let model_name = obj
                    .get("model_name")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string());
                let endpoint_url = obj
                    .get("endpoint_url")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string());
                Ok(Task::Caption(CaptionTask::new(
                    batch_size,
                    model_name,
                    endpoint_url,
                )?))
            }
            other => Err(ModelError::UnknownTaskType(other.to_string())),
        }
    }
}

/// Reject any key in `obj` outside `allowed`, mirroring the original
/// schema's `extra = "forbid"`.
fn reject_unexpected_properties(
    task: &str,
    obj: &Map<String, Value>,
    allowed: &[&str],
) -> Result<(), ModelError> {
    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ModelError::UnexpectedProperty {
                task: task.to_string(),
                property: key.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_defaults_method_from_document_type() {
        let task = ExtractTask::new(DocumentType::Pdf, None, true, true, false, None).unwrap();
        assert_eq!(task.method, "pymupdf");
    }

    #[test]
    fn extract_rejects_method_not_in_allow_list() {
        let err =
            ExtractTask::new(DocumentType::Docx, Some("eclair".into()), true, true, false, None)
                .unwrap_err();
        assert!(matches!(err, ModelError::InvalidExtractMethod { .. }));
    }

    #[test]
    fn extract_injects_eclair_env_at_serialization_time() {
        let task = ExtractTask::new(DocumentType::Pdf, Some("eclair".into()), true, true, false, None)
            .unwrap();
        let env = TaskEnvironment {
            eclair_triton_host: "triton-host".into(),
            eclair_triton_port: "9001".into(),
            eclair_batch_size: "32".into(),
            unstructured_api_key: String::new(),
            unstructured_url: String::new(),
        };
        let wire = task.to_wire(&env);
        assert_eq!(
            wire["task_properties"]["params"]["eclair_triton_host"],
            "triton-host"
        );
        assert_eq!(
            wire["task_properties"]["params"]["eclair_batch_size"],
            "32"
        );
    }

    #[test]
    fn split_rejects_nonpositive_length() {
        let err = SplitTask::new(SplitBy::Word, 0, 10, None, None).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSplitLength(0)));
    }

    #[test]
    fn sentence_window_requires_sentence_split() {
        let err = SplitTask::new(SplitBy::Word, 60, 10, None, Some(5)).unwrap_err();
        assert!(matches!(
            err,
            ModelError::SentenceWindowRequiresSentenceSplit
        ));
    }

    #[test]
    fn sentence_window_zero_is_allowed_for_any_split_by() {
        let task = SplitTask::new(SplitBy::Word, 60, 10, None, Some(0)).unwrap();
        assert_eq!(task.sentence_window_size, Some(0));
    }

    #[test]
    fn caption_defaults_match_original_schema() {
        let task = CaptionTask::new(None, None, None).unwrap();
        assert_eq!(task.batch_size, 8);
        assert_eq!(task.model_name, "deberta_large");
        assert_eq!(task.endpoint_url, "triton:8001");
    }

    #[test]
    fn from_name_and_json_rejects_unknown_task() {
        let err = Task::from_name_and_json("bogus", &json!({})).unwrap_err();
        assert!(matches!(err, ModelError::UnknownTaskType(_)));
    }

    #[test]
    fn from_name_and_json_round_trips_extract() {
        let task = Task::from_name_and_json(
            "extract",
            &json!({"document_type": "pdf", "method": "pymupdf", "extract_text": true}),
        )
        .unwrap();
        assert_eq!(task.name(), "extract");
    }

    #[test]
    fn from_name_and_json_rejects_unknown_extract_property() {
        let err = Task::from_name_and_json(
            "extract",
            &json!({"document_type": "pdf", "bogus_field": true}),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedProperty { task, property }
            if task == "extract" && property == "bogus_field"));
    }

    #[test]
    fn from_name_and_json_rejects_unknown_split_property() {
        let err = Task::from_name_and_json(
            "split",
            &json!({"split_by": "word", "split_length": 60, "bogus_field": 1}),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedProperty { property, .. } if property == "bogus_field"));
    }

    #[test]
    fn from_name_and_json_rejects_unknown_vdb_upload_property() {
        let err =
            Task::from_name_and_json("vdb_upload", &json!({"bogus_field": true})).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedProperty { property, .. } if property == "bogus_field"));
    }

    #[test]
    fn from_name_and_json_rejects_unknown_caption_property() {
        let err =
            Task::from_name_and_json("caption", &json!({"bogus_field": true})).unwrap_err();
        assert!(matches!(err, ModelError::UnexpectedProperty { property, .. } if property == "bogus_field"));
    }

    #[test]
    fn from_name_and_json_allows_arbitrary_store_properties() {
        let task = Task::from_name_and_json("store", &json!({"anything": "goes"})).unwrap();
        assert_eq!(task.name(), "store");
    }
}
