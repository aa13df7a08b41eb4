//! Transport Fallback Coordinator
//!
//! 主传输（创建任务 + 轮询）的任务路由在当前服务端不存在时，
//! 改用旧版同步接口重发同一逻辑请求。其它任何失败都直接返回。
//! 选择结果只记录，不缓存：每次调用都先尝试主传输。

use serde_json::Value;
use std::sync::Arc;

use super::remote_api::RemoteBookApi;
use super::run_launcher::{ProgressObserver, RunLauncher};
use crate::application::error::WorkflowError;
use crate::application::ports::{WorkflowEvent, WorkflowEventPort};
use crate::domain::draft::LocalDraft;
use crate::domain::run::{ModeInputs, Outcome, Transport};

pub struct TransportFallbackCoordinator {
    launcher: Arc<RunLauncher>,
    api: Arc<RemoteBookApi>,
    events: Arc<dyn WorkflowEventPort>,
}

impl TransportFallbackCoordinator {
    pub fn new(
        launcher: Arc<RunLauncher>,
        api: Arc<RemoteBookApi>,
        events: Arc<dyn WorkflowEventPort>,
    ) -> Self {
        Self {
            launcher,
            api,
            events,
        }
    }

    pub async fn execute(
        &self,
        draft: &mut LocalDraft,
        inputs: &ModeInputs,
        observer: Option<&ProgressObserver>,
    ) -> Result<Outcome, WorkflowError> {
        let mode = inputs.mode;

        let (outcome, transport) = match self.launcher.run_job(draft, inputs, observer).await {
            Ok(outcome) => (outcome, Transport::Primary),
            Err(e) if e.is_transport_incompatibility() => {
                tracing::warn!(
                    mode = %mode,
                    error = %e,
                    "Run endpoints unavailable, falling back to legacy execute"
                );
                let raw = self.api.legacy_execute(&legacy_inputs(inputs)).await?;
                (Outcome::classify(&raw), Transport::Legacy)
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            mode = %mode,
            transport = transport.as_str(),
            success = outcome.success,
            trace_id = ?outcome.trace_id,
            "Transport selected"
        );
        self.events
            .publish(WorkflowEvent::TransportSelected { mode, transport });

        Ok(outcome.with_transport(transport))
    }
}

/// 旧版接口从 inputs 中读取 mode
fn legacy_inputs(inputs: &ModeInputs) -> Value {
    let mut payload = inputs.payload.clone();
    if let Value::Object(map) = &mut payload {
        map.insert("mode".to_string(), Value::String(inputs.mode.as_str().to_string()));
    }
    payload
}
