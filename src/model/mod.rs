//! Wire envelope and task model: validated, serializable definitions of a
//! `JobSpec` and each `Task` variant.

pub mod document;
pub mod env;
pub mod error;
pub mod job;
pub mod payload;
pub mod result;
pub mod task;

pub use document::DocumentType;
pub use env::TaskEnvironment;
pub use error::ModelError;
pub use job::{JobSpec, TracingOptions};
pub use payload::Base64Payload;
pub use result::{JobStatus, ResultEnvelope};
pub use task::{CaptionTask, EmbedTask, ExtractTask, SplitBy, SplitTask, StoreTask, Task, VdbUploadTask};
