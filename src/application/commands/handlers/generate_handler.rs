//! Generate Handler - 一次用户触发的生成操作
//!
//! 读取草稿 → 本地预检 → (主传输 | 旧版回退) → 写回草稿

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::commands::Generate;
use crate::application::error::WorkflowError;
use crate::application::ports::DraftStorePort;
use crate::application::services::TransportFallbackCoordinator;
use crate::domain::run::{build_inputs, Outcome};

/// 进行中标记，离开作用域时自动清除
pub(crate) struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct GenerateHandler {
    coordinator: Arc<TransportFallbackCoordinator>,
    store: Arc<dyn DraftStorePort>,
    in_flight: Arc<AtomicBool>,
}

impl GenerateHandler {
    pub fn new(
        coordinator: Arc<TransportFallbackCoordinator>,
        store: Arc<dyn DraftStorePort>,
    ) -> Self {
        Self {
            coordinator,
            store,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 同一草稿同时只允许一次生成，重复触发返回 [`WorkflowError::Busy`]
    pub async fn handle(&self, command: Generate) -> Result<Outcome, WorkflowError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(WorkflowError::Busy)?;

        let mut draft = self.store.load().await;
        let inputs = build_inputs(&draft, &command.request)?;

        let mut outcome = self
            .coordinator
            .execute(&mut draft, &inputs, command.observer.as_ref())
            .await?;

        if !inputs.warnings.is_empty() {
            let mut warnings = inputs.warnings.clone();
            warnings.append(&mut outcome.warnings);
            outcome.warnings = warnings;
        }

        // 轮询期间草稿可能被编辑过，写回前重新读取
        if outcome.success {
            draft = self.store.load().await;
            draft
                .apply_outcome(&command.request, &outcome)
                .map_err(|e| WorkflowError::Protocol(format!("unusable result: {}", e)))?;
            self.store.save(&draft).await?;
        }

        tracing::info!(
            mode = %inputs.mode,
            project_id = ?draft.project_id(),
            success = outcome.success,
            transport = outcome.transport.as_str(),
            warnings = outcome.warnings.len(),
            "Generation finished"
        );

        Ok(outcome)
    }
}
