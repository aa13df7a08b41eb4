//! Endpoint Resolver
//!
//! 服务端可能以两种路径前缀部署。对同一逻辑操作按顺序尝试候选路径：
//! - 404 表示该版本没有这个路由，继续下一个
//! - 其它任何失败立即返回，不再尝试
//! - 全部 404 时返回 [`ApiError::NoCompatibleEndpoint`]

use http::Method;
use serde_json::Value;
use std::sync::Arc;

use crate::application::error::ApiError;
use crate::application::ports::{ApiRequest, ApiResponse, HttpTransportPort};

pub struct EndpointResolver {
    transport: Arc<dyn HttpTransportPort>,
}

impl EndpointResolver {
    pub fn new(transport: Arc<dyn HttpTransportPort>) -> Self {
        Self { transport }
    }

    /// 按顺序尝试候选路径，返回第一个 2xx 响应
    pub async fn resolve(
        &self,
        operation: &'static str,
        method: Method,
        candidates: &[String],
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let mut tried = Vec::with_capacity(candidates.len());

        for path in candidates {
            let mut request = ApiRequest::new(method.clone(), path.clone());
            if let Some(body) = body {
                request = request.with_body(body.clone());
            }

            let response = self
                .transport
                .send(request)
                .await
                .map_err(|source| ApiError::Transport { operation, source })?;

            if response.status == http::StatusCode::NOT_FOUND {
                tracing::debug!(
                    operation,
                    method = %method,
                    path = %path,
                    "Endpoint not found, trying next candidate"
                );
                tried.push(path.clone());
                continue;
            }

            if !response.status.is_success() {
                let html = looks_like_html(&response.body);
                let detail = if html { None } else { extract_detail(&response.body) };
                tracing::warn!(
                    operation,
                    method = %method,
                    path = %path,
                    status = response.status.as_u16(),
                    "Remote call rejected"
                );
                return Err(ApiError::Status {
                    operation,
                    status: response.status,
                    detail,
                    html,
                });
            }

            return Ok(response);
        }

        tracing::warn!(operation, tried = ?tried, "No compatible endpoint");
        Err(ApiError::NoCompatibleEndpoint { operation, tried })
    }

    /// resolve + JSON 解码
    pub async fn resolve_json(
        &self,
        operation: &'static str,
        method: Method,
        candidates: &[String],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let response = self.resolve(operation, method, candidates, body).await?;
        response.json().map_err(|e| ApiError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

pub(crate) fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(64).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

/// 从错误响应体中提取服务端的说明文字
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.chars().take(300).collect());
    };

    for key in ["detail", "error", "message"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.trim().to_string());
            }
        }
    }

    if let Some(first) = value
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.iter().find_map(Value::as_str))
    {
        return Some(first.to_string());
    }

    // 字段级校验错误: {"field": ["message", ...]}
    value.as_object().and_then(|fields| {
        fields.iter().find_map(|(field, messages)| {
            let message = match messages {
                Value::Array(items) => items.iter().find_map(Value::as_str),
                Value::String(text) => Some(text.as_str()),
                _ => None,
            }?;
            Some(format!("{}: {}", field, message))
        })
    })
}
