//! In-Memory Draft Store Implementation

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{DraftStorePort, StoreError};
use crate::domain::draft::LocalDraft;

/// 内存草稿存储（测试与临时会话使用）
#[derive(Default)]
pub struct InMemoryDraftStore {
    draft: RwLock<Option<LocalDraft>>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: LocalDraft) -> Self {
        Self {
            draft: RwLock::new(Some(draft)),
        }
    }
}

#[async_trait]
impl DraftStorePort for InMemoryDraftStore {
    async fn load(&self) -> LocalDraft {
        self.draft.read().await.clone().unwrap_or_default()
    }

    async fn save(&self, draft: &LocalDraft) -> Result<(), StoreError> {
        *self.draft.write().await = Some(draft.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.draft.write().await = None;
        Ok(())
    }
}
