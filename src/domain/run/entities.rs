//! Run Context - Entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::RunStatus;

/// 远端任务记录
///
/// 客户端只创建和重读，从不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub trace_id: Option<String>,
    #[serde(default)]
    pub project: Option<Uuid>,
    #[serde(default)]
    pub mode: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub output_payload: Option<Value>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Run {
    /// 是否携带真正的结果（只有 progress 不算）
    pub fn has_output(&self) -> bool {
        match &self.output_payload {
            Some(Value::Object(map)) => map.keys().any(|key| key != "progress"),
            _ => false,
        }
    }

    pub fn error_text(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}
