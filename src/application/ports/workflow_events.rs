//! Workflow Events Port - 工作流事件发布

use serde::Serialize;
use uuid::Uuid;

use crate::domain::run::{ProgressSnapshot, RunMode, Transport};

/// 工作流事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// 远端项目已创建或更新
    ProjectSynced { project_id: Uuid, created: bool },
    /// 章节推送完成
    ChaptersSynced {
        project_id: Uuid,
        created: usize,
        updated: usize,
    },
    /// 任务已创建
    RunCreated {
        project_id: Uuid,
        run_id: Uuid,
        mode: RunMode,
    },
    /// 轮询得到的进度
    Progress {
        run_id: Uuid,
        snapshot: ProgressSnapshot,
    },
    /// 本次请求实际使用的传输
    TransportSelected { mode: RunMode, transport: Transport },
    /// 后台档案同步结束
    ProfileSyncFinished { ok: bool, message: String },
}

/// Workflow Event Port
pub trait WorkflowEventPort: Send + Sync {
    fn publish(&self, event: WorkflowEvent);
}
