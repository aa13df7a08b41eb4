//! 测试替身
//!
//! - `ScriptedTransport`: 按顺序返回预置响应
//! - `FakeBookService`: 内存版远端书籍服务，只挂在 `/api/books` 与 `/api/agents` 前缀下

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::application::ports::{ApiRequest, ApiResponse, HttpTransportPort, TransportError};

const BOOKS_PREFIX: &str = "/api/books";
const AGENTS_PREFIX: &str = "/api/agents";

/// 按脚本顺序应答，脚本耗尽后一律 404
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Result<ApiResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl HttpTransportPort for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")))
    }
}

struct Override {
    method: Method,
    fragment: String,
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct ServiceState {
    projects: HashMap<Uuid, Value>,
    chapters: HashMap<Uuid, Value>,
    runs: HashMap<Uuid, Value>,
    run_script: VecDeque<Value>,
    runs_disabled: bool,
    legacy_response: Option<Value>,
    runtime_stamp: Map<String, Value>,
    overrides: Vec<Override>,
    requests: Vec<ApiRequest>,
}

/// 内存版远端书籍服务
pub(crate) struct FakeBookService {
    state: Mutex<ServiceState>,
}

impl FakeBookService {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(ServiceState::default()),
        })
    }

    // ========================================================================
    // 场景设置
    // ========================================================================

    /// 之后所有 `method` 且路径包含 `fragment` 的请求都返回固定响应
    pub(crate) fn override_response(
        &self,
        method: Method,
        fragment: &str,
        status: u16,
        body: &str,
    ) {
        let status = StatusCode::from_u16(status).unwrap();
        self.state.lock().unwrap().overrides.push(Override {
            method,
            fragment: fragment.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// 模拟服务端在每次保存项目时写入运行时区
    pub(crate) fn stamp_runtime(&self, key: &str, value: Value) {
        self.state
            .lock()
            .unwrap()
            .runtime_stamp
            .insert(key.to_string(), value);
    }

    /// 任务状态脚本：每次读取弹出一条并合并进任务记录，最后一条重复使用
    pub(crate) fn script_runs(&self, script: Vec<Value>) {
        self.state.lock().unwrap().run_script = script.into();
    }

    /// 任务路由不存在（旧版服务端）
    pub(crate) fn disable_runs(&self) {
        self.state.lock().unwrap().runs_disabled = true;
    }

    pub(crate) fn set_legacy_response(&self, body: Value) {
        self.state.lock().unwrap().legacy_response = Some(body);
    }

    pub(crate) fn seed_project(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().projects.insert(
            id,
            json!({"id": id, "title": "Seeded", "outline_json": {}, "metadata_json": {}}),
        );
        id
    }

    pub(crate) fn seed_chapter(&self, project: Uuid, number: u32, title: &str, content: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().chapters.insert(
            id,
            json!({
                "id": id,
                "project": project,
                "number": number,
                "title": title,
                "content": content,
                "status": "draft"
            }),
        );
        id
    }

    // ========================================================================
    // 断言辅助
    // ========================================================================

    pub(crate) fn project_count(&self) -> usize {
        self.state.lock().unwrap().projects.len()
    }

    pub(crate) fn project(&self, id: Uuid) -> Option<Value> {
        self.state.lock().unwrap().projects.get(&id).cloned()
    }

    pub(crate) fn chapter_count(&self, project: Uuid) -> usize {
        let project = json!(project);
        self.state
            .lock()
            .unwrap()
            .chapters
            .values()
            .filter(|c| c["project"] == project)
            .count()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub(crate) fn request_log(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    fn matching(&self, method: &Method, fragment: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == *method && r.path.contains(fragment))
            .collect()
    }

    pub(crate) fn request_bodies(&self, method: &Method, fragment: &str) -> Vec<Value> {
        self.matching(method, fragment)
            .into_iter()
            .map(|r| r.body.unwrap_or(Value::Null))
            .collect()
    }

    pub(crate) fn request_paths(&self, method: &Method, fragment: &str) -> Vec<String> {
        self.matching(method, fragment)
            .into_iter()
            .map(|r| r.path)
            .collect()
    }

    pub(crate) fn count_requests(&self, method: &Method, fragment: &str) -> usize {
        self.matching(method, fragment).len()
    }
}

#[async_trait]
impl HttpTransportPort for FakeBookService {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if let Some(o) = state
            .overrides
            .iter()
            .find(|o| o.method == request.method && request.path.contains(&o.fragment))
        {
            return Ok(ApiResponse::new(o.status, o.body.clone()));
        }

        Ok(route(&mut state, &request))
    }
}

fn route(state: &mut ServiceState, request: &ApiRequest) -> ApiResponse {
    let body = request.body.clone().unwrap_or(Value::Null);

    if let Some(rest) = request.path.strip_prefix(BOOKS_PREFIX) {
        let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();
        return match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["projects"]) => create_project(state, body),
            ("PATCH", ["projects", id]) => update_project(state, id, body),
            ("GET", ["projects", id]) => match parse(id).and_then(|id| state.projects.get(&id)) {
                Some(project) => reply(StatusCode::OK, project.clone()),
                None => not_found(),
            },
            ("DELETE", ["projects", id]) => delete_project(state, id),
            ("GET", ["projects", id, "chapters"]) => list_chapters(state, id),
            ("POST", ["projects", id, "chapters"]) => create_chapter(state, id, body),
            ("GET", ["chapters", id]) => match parse(id).and_then(|id| state.chapters.get(&id)) {
                Some(chapter) => reply(StatusCode::OK, chapter.clone()),
                None => not_found(),
            },
            ("PATCH", ["chapters", id]) => update_chapter(state, id, body),
            _ => not_found(),
        };
    }

    if let Some(rest) = request.path.strip_prefix(AGENTS_PREFIX) {
        let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();
        return match (request.method.as_str(), segments.as_slice()) {
            ("POST", ["book-writing", "execute"]) => match &state.legacy_response {
                Some(response) => reply(StatusCode::OK, response.clone()),
                None => not_found(),
            },
            _ if state.runs_disabled => not_found(),
            ("POST", ["runs"]) => create_run(state, body),
            ("GET", ["runs", id]) => read_run(state, id),
            _ => not_found(),
        };
    }

    not_found()
}

fn create_project(state: &mut ServiceState, body: Value) -> ApiResponse {
    let id = Uuid::new_v4();
    let mut record = match body {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    record.insert("id".to_string(), json!(id));
    record.insert("status".to_string(), json!("draft"));
    stamp(&mut record, &state.runtime_stamp);

    let record = Value::Object(record);
    state.projects.insert(id, record.clone());
    reply(StatusCode::CREATED, record)
}

fn update_project(state: &mut ServiceState, id: &str, body: Value) -> ApiResponse {
    let Some(record) = parse(id).and_then(|id| state.projects.get_mut(&id)) else {
        return not_found();
    };
    if let (Value::Object(record), Value::Object(patch)) = (&mut *record, body) {
        // metadata_json 整体替换
        for (key, value) in patch {
            record.insert(key, value);
        }
        stamp(record, &state.runtime_stamp);
    }
    reply(StatusCode::OK, record.clone())
}

fn delete_project(state: &mut ServiceState, id: &str) -> ApiResponse {
    let Some(id) = parse(id).filter(|id| state.projects.contains_key(id)) else {
        return not_found();
    };
    state.projects.remove(&id);
    let project = json!(id);
    state.chapters.retain(|_, c| c["project"] != project);
    ApiResponse::new(StatusCode::NO_CONTENT, "")
}

fn list_chapters(state: &ServiceState, id: &str) -> ApiResponse {
    let Some(id) = parse(id).filter(|id| state.projects.contains_key(id)) else {
        return not_found();
    };
    let project = json!(id);
    let mut rows: Vec<Value> = state
        .chapters
        .values()
        .filter(|c| c["project"] == project)
        .cloned()
        .collect();
    rows.sort_by_key(|c| c["number"].as_u64());
    reply(StatusCode::OK, Value::Array(rows))
}

fn create_chapter(state: &mut ServiceState, id: &str, body: Value) -> ApiResponse {
    let Some(project_id) = parse(id).filter(|id| state.projects.contains_key(id)) else {
        return not_found();
    };
    let project = json!(project_id);
    let number = body["number"].clone();
    if state
        .chapters
        .values()
        .any(|c| c["project"] == project && c["number"] == number)
    {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"non_field_errors": ["The fields project, number must make a unique set."]}),
        );
    }

    let chapter_id = Uuid::new_v4();
    let record = json!({
        "id": chapter_id,
        "project": project_id,
        "number": number,
        "title": body["title"].clone(),
        "content": body["content"].clone(),
        "status": "draft"
    });
    state.chapters.insert(chapter_id, record.clone());
    reply(StatusCode::CREATED, record)
}

fn update_chapter(state: &mut ServiceState, id: &str, body: Value) -> ApiResponse {
    let Some(record) = parse(id).and_then(|id| state.chapters.get_mut(&id)) else {
        return not_found();
    };
    if let (Value::Object(record), Value::Object(patch)) = (&mut *record, body) {
        for (key, value) in patch {
            record.insert(key, value);
        }
    }
    reply(StatusCode::OK, record.clone())
}

fn create_run(state: &mut ServiceState, body: Value) -> ApiResponse {
    let id = Uuid::new_v4();
    let record = json!({
        "id": id,
        "trace_id": Uuid::new_v4().to_string(),
        "project": body["project_id"].clone(),
        "mode": body["mode"].clone(),
        "status": "queued",
        "output_payload": null,
        "error_message": null
    });
    state.runs.insert(id, record.clone());
    reply(StatusCode::CREATED, record)
}

fn read_run(state: &mut ServiceState, id: &str) -> ApiResponse {
    let next = if state.run_script.len() > 1 {
        state.run_script.pop_front()
    } else {
        state.run_script.front().cloned()
    };
    let Some(record) = parse(id).and_then(|id| state.runs.get_mut(&id)) else {
        return not_found();
    };
    if let (Value::Object(record), Some(Value::Object(update))) = (&mut *record, next) {
        for (key, value) in update {
            record.insert(key, value);
        }
    }
    reply(StatusCode::OK, record.clone())
}

fn stamp(record: &mut Map<String, Value>, runtime: &Map<String, Value>) {
    if runtime.is_empty() {
        return;
    }
    let metadata = record
        .entry("metadata_json".to_string())
        .or_insert_with(|| json!({}));
    if !metadata.is_object() {
        *metadata = json!({});
    }
    let zone = &mut metadata["llm_runtime"];
    if !zone.is_object() {
        *zone = json!({});
    }
    if let Value::Object(zone) = zone {
        for (key, value) in runtime {
            zone.insert(key.clone(), value.clone());
        }
    }
}

fn parse(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

fn reply(status: StatusCode, body: Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

fn not_found() -> ApiResponse {
    reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
}
