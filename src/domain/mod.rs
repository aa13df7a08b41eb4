//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Draft Context: 本地草稿
//! - Project Context: 远端项目与章节
//! - Run Context: 远端任务与结果

pub mod draft;
pub mod project;
pub mod run;
