//! Sled-based Local Draft Store
//!
//! 单条版本化记录 `{version, draft}`，以 JSON 编码存放在固定键下。
//! 缺失、无法解码或版本不符时返回默认草稿，不报错。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;

use crate::application::ports::{DraftStorePort, StoreError};
use crate::domain::draft::LocalDraft;

/// 当前记录格式版本
pub const DRAFT_RECORD_VERSION: u32 = 1;

/// Sled 草稿存储配置
#[derive(Debug, Clone)]
pub struct SledDraftStoreConfig {
    /// 数据库路径
    pub db_path: String,
    /// 记录键
    pub key: String,
}

impl Default for SledDraftStoreConfig {
    fn default() -> Self {
        Self {
            db_path: "data/folio.sled".to_string(),
            key: "folio_draft_v1".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DraftRecord {
    version: u32,
    draft: LocalDraft,
}

/// Sled 草稿存储
pub struct SledDraftStore {
    db: Db,
    key: String,
}

impl SledDraftStore {
    pub fn new(config: &SledDraftStoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.db_path).map_err(|e| StoreError::Storage(e.to_string()))?;

        tracing::info!(
            db_path = %config.db_path,
            key = %config.key,
            "SledDraftStore initialized"
        );

        Ok(Self {
            db,
            key: config.key.clone(),
        })
    }

    pub fn open<P: AsRef<Path>>(path: P, key: impl Into<String>) -> Result<Self, StoreError> {
        let config = SledDraftStoreConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            key: key.into(),
        };
        Self::new(&config)
    }

    fn decode(&self, bytes: &[u8]) -> Option<LocalDraft> {
        match serde_json::from_slice::<DraftRecord>(bytes) {
            Ok(record) if record.version == DRAFT_RECORD_VERSION => Some(record.draft),
            Ok(record) => {
                tracing::warn!(
                    key = %self.key,
                    version = record.version,
                    expected = DRAFT_RECORD_VERSION,
                    "Stored draft has an unknown version, using defaults"
                );
                None
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored draft is corrupt, using defaults");
                None
            }
        }
    }
}

#[async_trait]
impl DraftStorePort for SledDraftStore {
    async fn load(&self) -> LocalDraft {
        match self.db.get(&self.key) {
            Ok(Some(bytes)) => self.decode(&bytes).unwrap_or_default(),
            Ok(None) => LocalDraft::default(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read draft, using defaults");
                LocalDraft::default()
            }
        }
    }

    async fn save(&self, draft: &LocalDraft) -> Result<(), StoreError> {
        let record = DraftRecord {
            version: DRAFT_RECORD_VERSION,
            draft: draft.clone(),
        };
        let bytes =
            serde_json::to_vec(&record).map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.db
            .insert(&self.key, bytes)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        tracing::debug!(key = %self.key, project_id = ?draft.project_id(), "Draft saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.db
            .remove(&self.key)
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }
}
