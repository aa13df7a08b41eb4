//! Reqwest Transport - 通过 HTTP 调用远端书籍服务
//!
//! 实现 HttpTransportPort：JSON 请求体、DRF Token 认证、单请求超时。
//! 任何 HTTP 状态码都原样返回，由上层解释。

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::application::ports::{ApiRequest, ApiResponse, HttpTransportPort, TransportError};

/// HTTP 客户端配置
#[derive(Debug, Clone)]
pub struct ReqwestTransportConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// DRF Token（以 `Authorization: Token <t>` 发送）
    pub token: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for ReqwestTransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout_secs: 60,
        }
    }
}

impl ReqwestTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Reqwest HTTP 传输
pub struct ReqwestTransport {
    client: Client,
    config: ReqwestTransportConfig,
}

impl ReqwestTransport {
    pub fn new(config: ReqwestTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl HttpTransportPort for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);

        tracing::debug!(
            method = %request.method,
            url = %url,
            has_body = request.body.is_some(),
            "Sending API request"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else if e.is_connect() {
                TransportError::NetworkError(format!("Cannot connect to book service: {}", e))
            } else {
                TransportError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::InvalidResponse(format!("Failed to read body: {}", e)))?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            status = status.as_u16(),
            body_len = body.len(),
            "API response received"
        );

        Ok(ApiResponse { status, body })
    }
}
