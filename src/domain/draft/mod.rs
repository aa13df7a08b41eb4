//! Draft Context - 本地草稿限界上下文
//!
//! 职责:
//! - 书籍档案与输入校验
//! - 大纲与章节内容
//! - 受保护区快照的计算

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::LocalDraft;
pub use entities::{Outline, OutlineChapter};
pub use errors::DraftError;
pub use value_objects::{
    BookProfile, ExportFormat, ProfileUpdate, MAX_TARGET_WORDS, MIN_TARGET_WORDS,
};
