//! Project Synchronizer
//!
//! 确保远端项目存在并反映本地草稿。
//!
//! - 草稿已关联项目时先 PATCH；404 说明本地指针过期，清除后改为创建
//! - 成功后合并回显的运行时区，受保护区只在定稿时落地

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::remote_api::{ProjectPayload, RemoteBookApi};
use crate::application::error::WorkflowError;
use crate::application::ports::{DraftStorePort, WorkflowEvent, WorkflowEventPort};
use crate::domain::draft::LocalDraft;

pub struct ProjectSynchronizer {
    api: Arc<RemoteBookApi>,
    store: Arc<dyn DraftStorePort>,
    events: Arc<dyn WorkflowEventPort>,
}

impl ProjectSynchronizer {
    pub fn new(
        api: Arc<RemoteBookApi>,
        store: Arc<dyn DraftStorePort>,
        events: Arc<dyn WorkflowEventPort>,
    ) -> Self {
        Self { api, store, events }
    }

    pub async fn ensure_project(&self, draft: &mut LocalDraft) -> Result<Uuid, WorkflowError> {
        let protected = draft.protected_snapshot();
        let payload = project_payload(draft);

        let (project, created) = match draft.project_id() {
            Some(project_id) => match self.api.update_project(project_id, &payload).await {
                Ok(project) => (project, false),
                Err(e) if e.is_not_found() => {
                    tracing::warn!(
                        project_id = %project_id,
                        "Linked project no longer exists, creating a new one"
                    );
                    draft.unlink_project();
                    self.store.save(draft).await?;
                    (self.api.create_project(&payload).await?, true)
                }
                Err(e) => return Err(e.into()),
            },
            None => (self.api.create_project(&payload).await?, true),
        };

        let project_id = match (project.id, draft.project_id()) {
            (Some(id), _) => id,
            (None, Some(existing)) if !created => existing,
            _ => {
                return Err(WorkflowError::Protocol(
                    "project response carried no id".to_string(),
                ))
            }
        };

        if draft.profile_finalize_pending() {
            draft.commit_protected_zone(protected);
        }
        draft.absorb_remote_metadata(&project.metadata());
        draft.link_project(project_id);
        self.store.save(draft).await?;

        tracing::info!(project_id = %project_id, created, "Project synced");
        self.events
            .publish(WorkflowEvent::ProjectSynced { project_id, created });

        Ok(project_id)
    }
}

/// 上行项目请求体
pub fn project_payload(draft: &LocalDraft) -> ProjectPayload {
    let profile = draft.profile();
    let outline_json = draft
        .outline()
        .and_then(|outline| serde_json::to_value(outline).ok())
        .unwrap_or_else(|| json!({"synopsis": "", "chapters": []}));

    ProjectPayload {
        title: profile.title.clone(),
        genre: profile.genre.clone(),
        target_audience: profile.target_audience.clone(),
        language: profile.language.clone(),
        tone: profile.tone.clone(),
        target_word_count: profile.target_word_count,
        outline_json,
        metadata_json: draft.outgoing_metadata().to_wire(),
    }
}
