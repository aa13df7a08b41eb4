//! Draft Query Handlers

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::DraftStorePort;
use crate::application::queries::GetDraft;
use crate::domain::draft::{BookProfile, LocalDraft};

// ============================================================================
// Response DTOs
// ============================================================================

/// 大纲中一章的状态
#[derive(Debug, Clone, Serialize)]
pub struct ChapterStatus {
    pub number: u32,
    pub title: String,
    pub drafted: bool,
    pub words: usize,
}

/// 草稿概览
#[derive(Debug, Clone, Serialize)]
pub struct DraftSummary {
    pub profile: BookProfile,
    pub project_id: Option<Uuid>,
    pub synopsis: Option<String>,
    pub chapters: Vec<ChapterStatus>,
    pub profile_finalize_pending: bool,
    pub runtime_keys: Vec<String>,
    pub updated_at: String,
}

impl From<&LocalDraft> for DraftSummary {
    fn from(draft: &LocalDraft) -> Self {
        let chapters = draft
            .outline()
            .map(|outline| {
                outline
                    .chapters
                    .iter()
                    .map(|chapter| {
                        let content = draft.chapter_content(chapter.number).unwrap_or_default();
                        ChapterStatus {
                            number: chapter.number,
                            title: chapter.title.clone(),
                            drafted: !content.trim().is_empty(),
                            words: content.split_whitespace().count(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            profile: draft.profile().clone(),
            project_id: draft.project_id(),
            synopsis: draft
                .outline()
                .map(|o| o.synopsis.clone())
                .filter(|s| !s.is_empty()),
            chapters,
            profile_finalize_pending: draft.profile_finalize_pending(),
            runtime_keys: draft.metadata().llm_runtime().keys().cloned().collect(),
            updated_at: draft.updated_at().to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetDraft Handler
pub struct GetDraftHandler {
    store: Arc<dyn DraftStorePort>,
}

impl GetDraftHandler {
    pub fn new(store: Arc<dyn DraftStorePort>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, _query: GetDraft) -> DraftSummary {
        let draft = self.store.load().await;
        DraftSummary::from(&draft)
    }
}
