//! HTTP Transport Port - 远端书籍服务的传输抽象
//!
//! 端口只负责把一个请求送达并取回原始响应；状态码的解释在 EndpointResolver 中完成

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// 传输错误（请求未能得到任何 HTTP 响应）
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 单个 HTTP 请求
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// 以 `/` 开头的路径，不含 base url
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// 原始响应
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

/// HTTP Transport Port
#[async_trait]
pub trait HttpTransportPort: Send + Sync {
    /// 发送请求；任何 HTTP 状态码都返回 Ok，只有拿不到响应时返回 Err
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
