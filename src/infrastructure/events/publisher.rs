//! Event Publisher Implementation
//!
//! 工作流事件广播

use tokio::sync::broadcast;

use crate::application::ports::{WorkflowEvent, WorkflowEventPort};

const CHANNEL_CAPACITY: usize = 256;

/// 事件发布器
pub struct EventPublisher {
    /// Global broadcast channel (all events)
    global_channel: broadcast::Sender<WorkflowEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            global_channel: global_tx,
        }
    }

    /// 订阅全部事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.global_channel.subscribe()
    }
}

impl WorkflowEventPort for EventPublisher {
    fn publish(&self, event: WorkflowEvent) {
        if let Err(e) = self.global_channel.send(event) {
            tracing::trace!(error = %e, "Workflow event dropped (no receivers)");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
