//! Run Launcher & Poller
//!
//! 顺序执行: 项目同步 → (导出模式) 章节同步 → 创建任务 → 轮询。
//!
//! 轮询是一个显式状态机，唯一的挂起点是 "sleep 后重读"：
//! ```text
//! queued ──> running ──> completed
//!   │           └──────> failed
//!   └──> completed / failed
//! ```
//! 截止时间从任务创建时刻开始计算，超时不会取消服务端任务。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use super::chapter_sync::ChapterSynchronizer;
use super::project_sync::ProjectSynchronizer;
use super::remote_api::{CreateRun, RemoteBookApi};
use crate::application::error::WorkflowError;
use crate::application::ports::{WorkflowEvent, WorkflowEventPort};
use crate::domain::draft::LocalDraft;
use crate::domain::run::{ModeInputs, Outcome, ProgressSnapshot, Run, RunMode, RunStatus};

/// 进度回调
pub type ProgressObserver = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// 轮询策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub default_deadline: Duration,
    /// 章节生成包含服务端的多轮审阅，允许更长时间
    pub chapter_deadline: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1200),
            default_deadline: Duration::from_secs(240),
            chapter_deadline: Duration::from_secs(480),
        }
    }
}

impl PollPolicy {
    pub fn deadline_for(&self, mode: RunMode) -> Duration {
        match mode {
            RunMode::Chapter => self.chapter_deadline,
            _ => self.default_deadline,
        }
    }
}

pub struct RunLauncher {
    api: Arc<RemoteBookApi>,
    projects: Arc<ProjectSynchronizer>,
    chapters: Arc<ChapterSynchronizer>,
    events: Arc<dyn WorkflowEventPort>,
    policy: PollPolicy,
}

impl RunLauncher {
    pub fn new(
        api: Arc<RemoteBookApi>,
        projects: Arc<ProjectSynchronizer>,
        chapters: Arc<ChapterSynchronizer>,
        events: Arc<dyn WorkflowEventPort>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            projects,
            chapters,
            events,
            policy,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// 执行一次任务并等待其结束
    pub async fn run_job(
        &self,
        draft: &mut LocalDraft,
        inputs: &ModeInputs,
        observer: Option<&ProgressObserver>,
    ) -> Result<Outcome, WorkflowError> {
        let mode = inputs.mode;
        let project_id = self.projects.ensure_project(draft).await?;

        if mode.implies_export() {
            self.chapters.sync_chapters(project_id, draft).await?;
        }

        let created = self
            .api
            .create_run(&CreateRun {
                project_id,
                mode,
                inputs: inputs.payload.clone(),
            })
            .await?;
        let run_id = created.id.ok_or_else(|| {
            WorkflowError::Protocol("run creation response carried no id".to_string())
        })?;
        let started = Instant::now();

        tracing::info!(
            project_id = %project_id,
            run_id = %run_id,
            mode = %mode,
            trace_id = ?created.trace_id,
            status = %created.status,
            "Run created"
        );
        self.events.publish(WorkflowEvent::RunCreated {
            project_id,
            run_id,
            mode,
        });

        let deadline = self.policy.deadline_for(mode);
        let mut run = created;
        loop {
            self.report_progress(run_id, &run, observer);

            if run.status.is_terminal() {
                break;
            }

            let elapsed = started.elapsed();
            if elapsed > deadline {
                tracing::warn!(
                    run_id = %run_id,
                    mode = %mode,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Run polling timed out, leaving server job untouched"
                );
                return Err(WorkflowError::Timeout {
                    run_id,
                    mode,
                    elapsed_secs: elapsed.as_secs(),
                });
            }

            tokio::time::sleep(self.policy.interval).await;

            let next = self.api.get_run(run_id).await?;
            if !run.status.can_advance_to(next.status) {
                return Err(WorkflowError::Protocol(format!(
                    "run {} moved from {} back to {}",
                    run_id, run.status, next.status
                )));
            }
            if next.status != run.status {
                tracing::debug!(
                    run_id = %run_id,
                    from = %run.status,
                    to = %next.status,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Run status changed"
                );
            }
            run = next;
        }

        finish(run_id, run, started.elapsed())
    }

    fn report_progress(&self, run_id: Uuid, run: &Run, observer: Option<&ProgressObserver>) {
        let snapshot = ProgressSnapshot::from_run(run);
        if let Some(observer) = observer {
            observer(&snapshot);
        }
        self.events
            .publish(WorkflowEvent::Progress { run_id, snapshot });
    }
}

/// 终态 → Outcome
fn finish(run_id: Uuid, run: Run, elapsed: Duration) -> Result<Outcome, WorkflowError> {
    match run.status {
        RunStatus::Failed => {
            let message = run
                .error_text()
                .map(str::to_string)
                .or_else(|| {
                    run.output_payload
                        .as_ref()
                        .and_then(|payload| {
                            Outcome::classify(payload).primary_error().map(str::to_string)
                        })
                })
                .unwrap_or_else(|| "Run failed without an error message.".to_string());
            tracing::warn!(
                run_id = %run_id,
                trace_id = ?run.trace_id,
                error = %message,
                "Run failed"
            );
            Err(WorkflowError::RunFailed {
                message,
                trace_id: run.trace_id,
            })
        }
        RunStatus::Completed => {
            let payload = match (&run.output_payload, run.has_output()) {
                (Some(payload), true) => payload,
                _ => {
                    return Err(WorkflowError::Protocol(format!(
                        "run {} completed without an output payload",
                        run_id
                    )))
                }
            };
            let mut outcome = Outcome::classify(payload);
            if outcome.trace_id.is_none() {
                outcome.trace_id = run.trace_id.clone();
            }
            tracing::info!(
                run_id = %run_id,
                trace_id = ?outcome.trace_id,
                success = outcome.success,
                elapsed_ms = elapsed.as_millis() as u64,
                "Run completed"
            );
            Ok(outcome)
        }
        other => Err(WorkflowError::Protocol(format!(
            "run {} left polling in non-terminal state {}",
            run_id, other
        ))),
    }
}
