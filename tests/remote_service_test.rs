//! Remote Service Integration Tests
//!
//! 真实的 ReqwestTransport 对接 axum 模拟服务。模拟服务只挂在 `/api` 前缀下，
//! 且没有任务路由，用来覆盖前缀回退和旧版同步接口回退。

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

use folio::application::ports::{DraftStorePort, HttpTransportPort, WorkflowEventPort};
use folio::application::services::{
    ChapterCreate, ChapterSynchronizer, PollPolicy, ProjectSynchronizer, RemoteBookApi,
    RouteTable, RunLauncher, TransportFallbackCoordinator,
};
use folio::application::{Generate, GenerateHandler, WorkflowError};
use folio::domain::draft::{BookProfile, LocalDraft};
use folio::domain::run::{ModeRequest, Transport};
use folio::infrastructure::{
    EventPublisher, InMemoryDraftStore, ReqwestTransport, ReqwestTransportConfig,
};

#[derive(Default)]
struct MockState {
    projects: HashMap<Uuid, Value>,
    chapters: HashMap<Uuid, Value>,
    auth_headers: Vec<Option<String>>,
    legacy_bodies: Vec<Value>,
}

type Shared = Arc<Mutex<MockState>>;

fn record_auth(state: &Shared, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().auth_headers.push(auth);
}

async fn create_project(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record_auth(&state, &headers);
    let id = Uuid::new_v4();
    let mut record = body;
    record["id"] = json!(id);
    state.lock().unwrap().projects.insert(id, record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn update_project(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut state = state.lock().unwrap();
    let record = state.projects.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let (Value::Object(record), Value::Object(patch)) = (&mut *record, body) {
        record.extend(patch);
    }
    Ok(Json(record.clone()))
}

async fn list_chapters(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
) -> Json<Value> {
    let project = json!(id);
    let rows: Vec<Value> = state
        .lock()
        .unwrap()
        .chapters
        .values()
        .filter(|c| c["project"] == project)
        .cloned()
        .collect();
    Json(json!({"count": rows.len(), "results": rows}))
}

async fn create_chapter(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let chapter_id = Uuid::new_v4();
    let record = json!({
        "id": chapter_id,
        "project": id,
        "number": body["number"],
        "title": body["title"],
        "content": body["content"],
        "status": "draft"
    });
    state.lock().unwrap().chapters.insert(chapter_id, record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn get_chapter(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, StatusCode> {
    state
        .lock()
        .unwrap()
        .chapters
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn legacy_execute(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    state.lock().unwrap().legacy_bodies.push(body);
    Json(json!({
        "status": "success",
        "outline": {
            "synopsis": "A practical guide.",
            "chapters": [
                {"number": 1, "title": "Foundations"},
                {"number": 2, "title": "Practice"}
            ]
        },
        "next_steps": ["Review the outline"]
    }))
}

async fn broken() -> (StatusCode, Html<&'static str>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<!DOCTYPE html><html><body><h1>Server Error (500)</h1></body></html>"),
    )
}

struct TestServer {
    addr: SocketAddr,
    state: Shared,
    _handle: tokio::task::JoinHandle<()>,
}

async fn start_server() -> TestServer {
    let state: Shared = Arc::new(Mutex::new(MockState::default()));
    let app = Router::new()
        .route("/api/projects/", post(create_project))
        .route("/api/projects/:id/", axum::routing::patch(update_project))
        .route(
            "/api/projects/:id/chapters/",
            get(list_chapters).post(create_chapter),
        )
        .route("/api/chapters/:id/", get(get_chapter))
        .route("/api/agents/book-writing/execute/", post(legacy_execute))
        .route("/broken/projects/", post(broken))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Failed to get addr");
    let handle = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .expect("Server failed");
    });

    TestServer {
        addr,
        state,
        _handle: handle,
    }
}

fn transport(addr: SocketAddr) -> Arc<dyn HttpTransportPort> {
    let config = ReqwestTransportConfig::new(format!("http://{}", addr))
        .with_timeout(5)
        .with_token("test-token");
    Arc::new(ReqwestTransport::new(config).expect("Failed to build transport"))
}

#[tokio::test]
async fn test_project_create_falls_through_to_second_prefix() {
    let server = start_server().await;
    let api = Arc::new(RemoteBookApi::new(transport(server.addr), RouteTable::default()));
    let store = Arc::new(InMemoryDraftStore::new());
    let sync = ProjectSynchronizer::new(api, store, Arc::new(EventPublisher::new()));

    let mut draft = LocalDraft::default();
    let first = sync.ensure_project(&mut draft).await.unwrap();
    let second = sync.ensure_project(&mut draft).await.unwrap();

    assert_eq!(first, second);
    let state = server.state.lock().unwrap();
    assert_eq!(state.projects.len(), 1);
    assert_eq!(
        state.auth_headers,
        vec![Some("Token test-token".to_string())]
    );
    assert_eq!(
        state.projects[&first]["metadata_json"]["user_concept"]["title"],
        "Untitled Book"
    );
}

#[tokio::test]
async fn test_generate_uses_legacy_execute_when_runs_are_missing() {
    let server = start_server().await;
    let transport = transport(server.addr);
    let store = Arc::new(InMemoryDraftStore::with_draft(LocalDraft::new(BookProfile {
        title: "Ops Primer".to_string(),
        ..Default::default()
    })));
    let events: Arc<dyn WorkflowEventPort> = Arc::new(EventPublisher::new());
    let api = Arc::new(RemoteBookApi::new(transport, RouteTable::default()));
    let projects = Arc::new(ProjectSynchronizer::new(api.clone(), store.clone(), events.clone()));
    let chapters = Arc::new(ChapterSynchronizer::new(api.clone(), events.clone()));
    let launcher = Arc::new(RunLauncher::new(
        api.clone(),
        projects,
        chapters,
        events.clone(),
        PollPolicy::default(),
    ));
    let coordinator = Arc::new(TransportFallbackCoordinator::new(launcher, api, events));
    let handler = GenerateHandler::new(coordinator, store.clone());

    let outcome = handler.handle(Generate::new(ModeRequest::Outline)).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.transport, Transport::Legacy);
    assert_eq!(outcome.next_steps, vec!["Review the outline".to_string()]);

    let state = server.state.lock().unwrap();
    assert_eq!(state.legacy_bodies.len(), 1);
    assert_eq!(state.legacy_bodies[0]["inputs"]["mode"], "toc");
    assert_eq!(state.legacy_bodies[0]["inputs"]["book_title"], "Ops Primer");
    drop(state);

    let saved = store.load().await;
    assert_eq!(saved.outline().unwrap().chapters.len(), 2);
}

#[tokio::test]
async fn test_chapter_round_trip_through_fallback_prefix() {
    let server = start_server().await;
    let api = RemoteBookApi::new(transport(server.addr), RouteTable::default());
    let project_id = Uuid::new_v4();
    server
        .state
        .lock()
        .unwrap()
        .projects
        .insert(project_id, json!({"id": project_id}));

    let created = api
        .create_chapter(
            project_id,
            &ChapterCreate {
                number: 1,
                title: "Foundations".to_string(),
                content: "Body".to_string(),
            },
        )
        .await
        .unwrap();
    let fetched = api.get_chapter(created.id).await.unwrap();
    let listed = api.list_chapters(project_id).await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Foundations");
}

#[tokio::test]
async fn test_html_error_page_is_summarized() {
    let server = start_server().await;
    let routes = RouteTable::new(
        vec!["/broken".to_string()],
        vec!["/api/agents".to_string()],
        "/api/agents/book-writing/execute/",
    );
    let api = Arc::new(RemoteBookApi::new(transport(server.addr), routes));
    let sync = ProjectSynchronizer::new(
        api,
        Arc::new(InMemoryDraftStore::new()),
        Arc::new(EventPublisher::new()),
    );

    let mut draft = LocalDraft::default();
    let err = sync.ensure_project(&mut draft).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Remote { status: 500, html: true, .. }));
    assert_eq!(
        err.user_message(),
        "Server returned an HTML error page. Check server logs."
    );
}
