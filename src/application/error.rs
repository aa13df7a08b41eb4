//! 应用层错误定义
//!
//! - [`ApiError`]: 单次逻辑调用（经过候选端点解析）的失败
//! - [`WorkflowError`]: 一次用户操作的失败，对应错误分类的每一类

use http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::application::ports::{StoreError, TransportError};
use crate::domain::draft::DraftError;
use crate::domain::run::{Outcome, RunMode};

const HTML_PAGE_MESSAGE: &str = "Server returned an HTML error page. Check server logs.";

/// 远端调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 所有候选路径都返回 404
    #[error("No compatible endpoint for {operation} (tried: {})", .tried.join(", "))]
    NoCompatibleEndpoint {
        operation: &'static str,
        tried: Vec<String>,
    },

    /// 非 404 的非 2xx 响应
    #[error("{operation} failed with HTTP {status}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        detail: Option<String>,
        html: bool,
    },

    #[error("{operation} transport failure: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("{operation} returned an undecodable body: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    /// 版本不匹配或资源不存在
    pub fn is_not_found(&self) -> bool {
        match self {
            ApiError::NoCompatibleEndpoint { .. } => true,
            ApiError::Status { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    pub fn operation(&self) -> Option<&'static str> {
        match self {
            ApiError::NoCompatibleEndpoint { operation, .. }
            | ApiError::Status { operation, .. }
            | ApiError::Transport { operation, .. }
            | ApiError::Decode { operation, .. } => Some(*operation),
            ApiError::Encode(_) => None,
        }
    }
}

/// 工作流错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 版本不匹配：所有候选端点都是 404
    #[error("No compatible endpoint for {operation} (tried: {tried})")]
    VersionMismatch {
        operation: &'static str,
        tried: String,
    },

    /// 领域/校验失败：其它非 2xx 响应
    #[error("{operation} rejected by server (HTTP {status})")]
    Remote {
        operation: &'static str,
        status: u16,
        detail: Option<String>,
        html: bool,
    },

    #[error("Network failure during {operation}: {message}")]
    Network {
        operation: &'static str,
        message: String,
    },

    /// 协议违规：终态缺少输出、状态倒退、缺少 id
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// 轮询超时；服务端任务不会被取消
    #[error(
        "{mode} run {run_id} timed out after {elapsed_secs}s. The server may still finish it; try again later."
    )]
    Timeout {
        run_id: Uuid,
        mode: RunMode,
        elapsed_secs: u64,
    },

    /// 服务端报告的失败
    #[error("Run failed: {message}")]
    RunFailed {
        message: String,
        trace_id: Option<String>,
    },

    /// 本地预检失败
    #[error("Validation error: {0}")]
    Validation(String),

    /// 同一草稿已有操作在进行中
    #[error("Another operation is already in progress for this draft")]
    Busy,

    #[error("Local storage error: {0}")]
    Store(String),
}

impl WorkflowError {
    /// 单行用户可读消息
    ///
    /// 优先使用服务端给出的 detail，其次是通用描述；HTML 错误页替换为固定提示
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::Remote { html: true, .. } => HTML_PAGE_MESSAGE.to_string(),
            WorkflowError::Remote {
                detail: Some(detail),
                ..
            } => detail.clone(),
            WorkflowError::Remote {
                operation, status, ..
            } => format!("Request failed for {} (HTTP {}).", operation, status),
            WorkflowError::VersionMismatch { operation, .. } => format!(
                "The server does not expose a compatible API for {}.",
                operation
            ),
            other => other.to_string(),
        }
    }

    /// 是否为主传输不可用（触发旧版同步接口回退的唯一条件）
    pub fn is_transport_incompatibility(&self) -> bool {
        use crate::application::services::operation as op;

        match self {
            WorkflowError::VersionMismatch { operation, .. } => {
                matches!(*operation, op::RUN_CREATE | op::RUN_READ)
            }
            WorkflowError::Remote {
                operation, status, ..
            } => {
                *status == StatusCode::NOT_FOUND.as_u16()
                    && matches!(*operation, op::RUN_CREATE | op::RUN_READ)
            }
            _ => false,
        }
    }

    /// HTTP 成功但结果归一化为失败时转为错误
    pub fn from_failed_outcome(outcome: &Outcome) -> Self {
        WorkflowError::RunFailed {
            message: outcome.failure_reason(),
            trace_id: outcome.trace_id.clone(),
        }
    }

    pub fn trace_id(&self) -> Option<&str> {
        match self {
            WorkflowError::RunFailed { trace_id, .. } => trace_id.as_deref(),
            _ => None,
        }
    }
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NoCompatibleEndpoint { operation, tried } => WorkflowError::VersionMismatch {
                operation,
                tried: tried.join(", "),
            },
            ApiError::Status {
                operation,
                status,
                detail,
                html,
            } => WorkflowError::Remote {
                operation,
                status: status.as_u16(),
                detail,
                html,
            },
            ApiError::Transport { operation, source } => WorkflowError::Network {
                operation,
                message: source.to_string(),
            },
            ApiError::Decode { operation, message } => {
                WorkflowError::Protocol(format!("{} returned an undecodable body: {}", operation, message))
            }
            ApiError::Encode(message) => WorkflowError::Protocol(message),
        }
    }
}

impl From<DraftError> for WorkflowError {
    fn from(err: DraftError) -> Self {
        WorkflowError::Validation(err.to_string())
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        WorkflowError::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::operation;

    fn remote(operation: &'static str, status: u16, detail: Option<&str>, html: bool) -> WorkflowError {
        WorkflowError::Remote {
            operation,
            status,
            detail: detail.map(str::to_string),
            html,
        }
    }

    #[test]
    fn test_user_message_prefers_detail() {
        let err = remote(operation::PROJECT_CREATE, 400, Some("title: This field is required."), false);
        assert_eq!(err.user_message(), "title: This field is required.");

        let err = remote(operation::PROJECT_CREATE, 500, None, false);
        assert!(err.user_message().contains("HTTP 500"));
    }

    #[test]
    fn test_user_message_hides_html() {
        let err = remote(operation::RUN_READ, 502, Some("<html>"), true);
        assert_eq!(err.user_message(), HTML_PAGE_MESSAGE);
    }

    #[test]
    fn test_transport_incompatibility_only_for_run_routes() {
        assert!(remote(operation::RUN_CREATE, 404, None, false).is_transport_incompatibility());
        assert!(!remote(operation::RUN_CREATE, 422, None, false).is_transport_incompatibility());
        assert!(!remote(operation::PROJECT_UPDATE, 404, None, false).is_transport_incompatibility());

        let mismatch: WorkflowError = ApiError::NoCompatibleEndpoint {
            operation: operation::RUN_READ,
            tried: vec!["/api/agents/runs/x/".to_string()],
        }
        .into();
        assert!(mismatch.is_transport_incompatibility());
    }

    #[test]
    fn test_timeout_message_mentions_timed_out() {
        let err = WorkflowError::Timeout {
            run_id: Uuid::nil(),
            mode: RunMode::Chapter,
            elapsed_secs: 482,
        };
        assert!(err.user_message().contains("timed out"));
    }

    #[test]
    fn test_failed_outcome_becomes_run_failed() {
        let outcome = Outcome::classify(&serde_json::json!({
            "status": "error",
            "errors": ["Outline rejected"],
            "trace_id": "trace-7"
        }));
        let err = WorkflowError::from_failed_outcome(&outcome);

        assert_eq!(err.user_message(), "Run failed: Outline rejected");
        assert_eq!(err.trace_id(), Some("trace-7"));
    }
}
