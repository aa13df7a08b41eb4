//! Draft Queries

/// 查看当前草稿
#[derive(Debug, Clone, Default)]
pub struct GetDraft;
