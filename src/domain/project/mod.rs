//! Project Context - 远端项目限界上下文
//!
//! 职责:
//! - 远端项目与章节记录
//! - 双区元数据的合并规则

mod entities;
mod metadata;

pub use entities::{RemoteChapter, RemoteProject};
pub use metadata::{seed_protected_zone, ProjectMetadata, LLM_RUNTIME_KEY, USER_CONCEPT_KEY};
