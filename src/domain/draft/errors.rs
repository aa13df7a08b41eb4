//! Draft Context - Errors

use thiserror::Error;

/// 草稿校验错误（发起远端调用前的本地预检）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("book length cannot exceed {max} words")]
    LengthTooLarge { max: u32 },

    #[error("feedback is required for refine_toc mode")]
    MissingFeedback,

    #[error("an approved outline is required for {0} mode")]
    MissingOutline(&'static str),

    #[error("chapter {0} is not part of the outline")]
    ChapterOutOfRange(u32),

    #[error("invalid outline: {0}")]
    InvalidOutline(String),

    #[error("unknown export format: {0} (expected pdf | docx | both)")]
    UnknownExportFormat(String),
}
