//! Draft Store Port - 本地草稿持久化抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::draft::LocalDraft;

/// 草稿存储错误
///
/// 只用于写入/清除；读取时的损坏永远恢复为默认草稿
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Draft Store Port
#[async_trait]
pub trait DraftStorePort: Send + Sync {
    /// 读取草稿；缺失或损坏时返回默认草稿
    async fn load(&self) -> LocalDraft;

    /// 持久化草稿
    async fn save(&self, draft: &LocalDraft) -> Result<(), StoreError>;

    /// 删除已保存的草稿
    async fn clear(&self) -> Result<(), StoreError>;
}
