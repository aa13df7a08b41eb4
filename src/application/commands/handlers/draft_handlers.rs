//! Draft Command Handlers - 档案编辑、定稿与重置

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::generate_handler::InFlightGuard;
use crate::application::commands::{FinalizeProfile, ResetDraft, UpdateProfile};
use crate::application::error::WorkflowError;
use crate::application::ports::{DraftStorePort, WorkflowEvent, WorkflowEventPort};
use crate::application::services::{ProjectSynchronizer, RemoteBookApi};
use crate::domain::draft::LocalDraft;

// ============================================================================
// UpdateProfile
// ============================================================================

pub struct UpdateProfileHandler {
    store: Arc<dyn DraftStorePort>,
}

impl UpdateProfileHandler {
    pub fn new(store: Arc<dyn DraftStorePort>) -> Self {
        Self { store }
    }

    /// 只修改本地草稿，不发起远端调用
    pub async fn handle(&self, command: UpdateProfile) -> Result<LocalDraft, WorkflowError> {
        let mut draft = self.store.load().await;
        draft.update_profile(&command.update);
        self.store.save(&draft).await?;
        Ok(draft)
    }
}

// ============================================================================
// FinalizeProfile (后台同步)
// ============================================================================

pub struct FinalizeProfileHandler {
    projects: Arc<ProjectSynchronizer>,
    store: Arc<dyn DraftStorePort>,
    events: Arc<dyn WorkflowEventPort>,
    in_flight: Arc<AtomicBool>,
}

impl FinalizeProfileHandler {
    pub fn new(
        projects: Arc<ProjectSynchronizer>,
        store: Arc<dyn DraftStorePort>,
        events: Arc<dyn WorkflowEventPort>,
    ) -> Self {
        Self {
            projects,
            store,
            events,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 应用定稿并启动后台同步
    ///
    /// 已有同步在进行时不做任何修改，返回 None
    pub async fn handle(
        &self,
        command: FinalizeProfile,
    ) -> Result<Option<JoinHandle<()>>, WorkflowError> {
        let Some(guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("Profile sync already in flight, ignoring finalize");
            return Ok(None);
        };

        let mut draft = self.store.load().await;
        draft.finalize_profile(&command.update);
        self.store.save(&draft).await?;

        let projects = self.projects.clone();
        let store = self.store.clone();
        let events = self.events.clone();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            let mut draft = store.load().await;
            let event = match projects.ensure_project(&mut draft).await {
                Ok(project_id) => {
                    tracing::info!(project_id = %project_id, "Finalized profile synced");
                    WorkflowEvent::ProfileSyncFinished {
                        ok: true,
                        message: format!("Profile saved to project {}", project_id),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Background profile sync failed");
                    WorkflowEvent::ProfileSyncFinished {
                        ok: false,
                        message: e.user_message(),
                    }
                }
            };
            events.publish(event);
        });

        Ok(Some(handle))
    }
}

// ============================================================================
// ResetDraft
// ============================================================================

/// 重置结果
#[derive(Debug, Clone, Default)]
pub struct ResetReport {
    /// 已删除的远端项目
    pub deleted_project: Option<Uuid>,
    /// 远端删除失败的原因（本地仍然重置）
    pub remote_error: Option<String>,
}

pub struct ResetDraftHandler {
    api: Arc<RemoteBookApi>,
    store: Arc<dyn DraftStorePort>,
}

impl ResetDraftHandler {
    pub fn new(api: Arc<RemoteBookApi>, store: Arc<dyn DraftStorePort>) -> Self {
        Self { api, store }
    }

    pub async fn handle(&self, _command: ResetDraft) -> Result<ResetReport, WorkflowError> {
        let draft = self.store.load().await;
        let mut report = ResetReport::default();

        if let Some(project_id) = draft.project_id() {
            match self.api.delete_project(project_id).await {
                Ok(()) => report.deleted_project = Some(project_id),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(project_id = %project_id, "Remote project already gone");
                }
                Err(e) => {
                    let error = WorkflowError::from(e);
                    tracing::warn!(
                        project_id = %project_id,
                        error = %error,
                        "Failed to delete remote project, resetting locally anyway"
                    );
                    report.remote_error = Some(error.user_message());
                }
            }
        }

        self.store.clear().await?;
        tracing::info!(deleted_project = ?report.deleted_project, "Draft reset");
        Ok(report)
    }
}
