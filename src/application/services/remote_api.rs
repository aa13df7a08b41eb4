//! Remote Book API
//!
//! 远端书籍服务的逻辑操作。每个操作对应一组按顺序尝试的候选路径，
//! 由 [`EndpointResolver`] 负责挑选。

use http::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::EndpointResolver;
use crate::application::error::ApiError;
use crate::application::ports::HttpTransportPort;
use crate::domain::project::{RemoteChapter, RemoteProject};
use crate::domain::run::{Run, RunMode};

/// 逻辑操作名（日志和错误中使用）
pub mod operation {
    pub const PROJECT_CREATE: &str = "project.create";
    pub const PROJECT_UPDATE: &str = "project.update";
    pub const PROJECT_DELETE: &str = "project.delete";
    pub const CHAPTER_LIST: &str = "chapter.list";
    pub const CHAPTER_CREATE: &str = "chapter.create";
    pub const CHAPTER_READ: &str = "chapter.read";
    pub const CHAPTER_UPDATE: &str = "chapter.update";
    pub const RUN_CREATE: &str = "run.create";
    pub const RUN_READ: &str = "run.read";
    pub const LEGACY_EXECUTE: &str = "legacy.execute";
}

/// 候选路径表
#[derive(Debug, Clone)]
pub struct RouteTable {
    books_prefixes: Vec<String>,
    runs_prefixes: Vec<String>,
    legacy_execute_path: String,
}

impl RouteTable {
    pub fn new(
        books_prefixes: Vec<String>,
        runs_prefixes: Vec<String>,
        legacy_execute_path: impl Into<String>,
    ) -> Self {
        fn normalize(prefixes: Vec<String>) -> Vec<String> {
            prefixes
                .into_iter()
                .map(|p| p.trim().trim_end_matches('/').to_string())
                .collect()
        }
        Self {
            books_prefixes: normalize(books_prefixes),
            runs_prefixes: normalize(runs_prefixes),
            legacy_execute_path: legacy_execute_path.into(),
        }
    }

    fn books(&self, suffix: &str) -> Vec<String> {
        self.books_prefixes
            .iter()
            .map(|prefix| format!("{}{}", prefix, suffix))
            .collect()
    }

    fn runs(&self, suffix: &str) -> Vec<String> {
        self.runs_prefixes
            .iter()
            .map(|prefix| format!("{}{}", prefix, suffix))
            .collect()
    }

    pub fn projects(&self) -> Vec<String> {
        self.books("/projects/")
    }

    pub fn project(&self, id: Uuid) -> Vec<String> {
        self.books(&format!("/projects/{}/", id))
    }

    pub fn project_chapters(&self, id: Uuid) -> Vec<String> {
        self.books(&format!("/projects/{}/chapters/", id))
    }

    pub fn chapter(&self, id: Uuid) -> Vec<String> {
        self.books(&format!("/chapters/{}/", id))
    }

    pub fn runs_collection(&self) -> Vec<String> {
        self.runs("/runs/")
    }

    pub fn run(&self, id: Uuid) -> Vec<String> {
        self.runs(&format!("/runs/{}/", id))
    }

    pub fn legacy_execute(&self) -> Vec<String> {
        vec![self.legacy_execute_path.clone()]
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(
            vec!["/api/books".to_string(), "/api".to_string()],
            vec!["/api/agents".to_string(), "/api".to_string()],
            "/api/agents/book-writing/execute/",
        )
    }
}

/// 项目创建/更新请求体
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPayload {
    pub title: String,
    pub genre: String,
    pub target_audience: String,
    pub language: String,
    pub tone: String,
    pub target_word_count: u32,
    pub outline_json: Value,
    pub metadata_json: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterCreate {
    pub number: u32,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterUpdate {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRun {
    pub project_id: Uuid,
    pub mode: RunMode,
    pub inputs: Value,
}

/// 远端书籍服务客户端
pub struct RemoteBookApi {
    resolver: EndpointResolver,
    routes: RouteTable,
}

impl RemoteBookApi {
    pub fn new(transport: Arc<dyn HttpTransportPort>, routes: RouteTable) -> Self {
        Self {
            resolver: EndpointResolver::new(transport),
            routes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn create_project(&self, payload: &ProjectPayload) -> Result<RemoteProject, ApiError> {
        self.call(
            operation::PROJECT_CREATE,
            Method::POST,
            &self.routes.projects(),
            Some(encode(payload)?),
        )
        .await
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        payload: &ProjectPayload,
    ) -> Result<RemoteProject, ApiError> {
        self.call(
            operation::PROJECT_UPDATE,
            Method::PATCH,
            &self.routes.project(id),
            Some(encode(payload)?),
        )
        .await
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), ApiError> {
        self.resolver
            .resolve(
                operation::PROJECT_DELETE,
                Method::DELETE,
                &self.routes.project(id),
                None,
            )
            .await?;
        Ok(())
    }

    /// 列出项目下的章节，兼容纯数组和分页 `{results: [...]}` 两种形状
    pub async fn list_chapters(&self, project_id: Uuid) -> Result<Vec<RemoteChapter>, ApiError> {
        let body = self
            .resolver
            .resolve_json(
                operation::CHAPTER_LIST,
                Method::GET,
                &self.routes.project_chapters(project_id),
                None,
            )
            .await?;
        let rows = match body {
            Value::Object(mut page) => page.remove("results").unwrap_or(Value::Array(vec![])),
            other => other,
        };
        decode(operation::CHAPTER_LIST, rows)
    }

    pub async fn create_chapter(
        &self,
        project_id: Uuid,
        chapter: &ChapterCreate,
    ) -> Result<RemoteChapter, ApiError> {
        self.call(
            operation::CHAPTER_CREATE,
            Method::POST,
            &self.routes.project_chapters(project_id),
            Some(encode(chapter)?),
        )
        .await
    }

    pub async fn get_chapter(&self, chapter_id: Uuid) -> Result<RemoteChapter, ApiError> {
        self.call(
            operation::CHAPTER_READ,
            Method::GET,
            &self.routes.chapter(chapter_id),
            None,
        )
        .await
    }

    pub async fn update_chapter(
        &self,
        chapter_id: Uuid,
        chapter: &ChapterUpdate,
    ) -> Result<RemoteChapter, ApiError> {
        self.call(
            operation::CHAPTER_UPDATE,
            Method::PATCH,
            &self.routes.chapter(chapter_id),
            Some(encode(chapter)?),
        )
        .await
    }

    pub async fn create_run(&self, request: &CreateRun) -> Result<Run, ApiError> {
        self.call(
            operation::RUN_CREATE,
            Method::POST,
            &self.routes.runs_collection(),
            Some(encode(request)?),
        )
        .await
    }

    pub async fn get_run(&self, run_id: Uuid) -> Result<Run, ApiError> {
        self.call(operation::RUN_READ, Method::GET, &self.routes.run(run_id), None)
            .await
    }

    /// 旧版同步执行：请求体只有 `{inputs}`，直接返回结果
    pub async fn legacy_execute(&self, inputs: &Value) -> Result<Value, ApiError> {
        let body = serde_json::json!({ "inputs": inputs });
        self.resolver
            .resolve_json(
                operation::LEGACY_EXECUTE,
                Method::POST,
                &self.routes.legacy_execute(),
                Some(&body),
            )
            .await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        candidates: &[String],
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let value = self
            .resolver
            .resolve_json(operation, method, candidates, body.as_ref())
            .await?;
        decode(operation, value)
    }
}

fn encode<T: Serialize>(body: &T) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(operation: &'static str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        operation,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ApiResponse;
    use crate::testing::ScriptedTransport;
    use http::StatusCode;

    #[test]
    fn test_route_candidates_in_prefix_order() {
        let routes = RouteTable::new(
            vec!["/api/books/".to_string(), "/api".to_string()],
            vec!["/api/agents".to_string()],
            "/legacy/",
        );
        let id = Uuid::nil();
        assert_eq!(
            routes.project_chapters(id),
            vec![
                format!("/api/books/projects/{}/chapters/", id),
                format!("/api/projects/{}/chapters/", id),
            ]
        );
        assert_eq!(routes.run(id), vec![format!("/api/agents/runs/{}/", id)]);
        assert_eq!(routes.legacy_execute(), vec!["/legacy/".to_string()]);
    }

    #[tokio::test]
    async fn test_list_chapters_accepts_paginated_body() {
        let chapter_id = Uuid::new_v4();
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::new(
            StatusCode::OK,
            serde_json::json!({
                "count": 1,
                "results": [{"id": chapter_id, "number": 1, "title": "One", "content": ""}]
            })
            .to_string(),
        ))]);
        let api = RemoteBookApi::new(transport, RouteTable::default());

        let chapters = api.list_chapters(Uuid::new_v4()).await.unwrap();
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].id, chapter_id);
    }

    #[tokio::test]
    async fn test_legacy_execute_wraps_inputs() {
        let transport = ScriptedTransport::new(vec![Ok(ApiResponse::new(
            StatusCode::OK,
            r#"{"status": "success"}"#,
        ))]);
        let api = RemoteBookApi::new(transport.clone(), RouteTable::default());

        api.legacy_execute(&serde_json::json!({"mode": "toc"}))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].path, "/api/agents/book-writing/execute/");
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({"inputs": {"mode": "toc"}}))
        );
    }
}
