//! Run Context - 远端任务限界上下文
//!
//! 职责:
//! - 任务模式与状态机
//! - 进度快照
//! - 结果归一化
//! - 模式输入构造与预检

mod entities;
mod inputs;
mod outcome;
mod progress;
mod value_objects;

pub use entities::Run;
pub use inputs::{build_inputs, placeholder_text, ModeInputs, ModeRequest};
pub use outcome::{ArtifactKind, ExportArtifact, GeneratedChapter, Outcome, Timings, Transport};
pub use progress::{node_label, ProgressSnapshot};
pub use value_objects::{RunMode, RunStatus};
