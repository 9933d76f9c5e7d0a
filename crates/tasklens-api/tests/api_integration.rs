use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use tasklens_api::{create_router, AppState};
use tasklens_core::{
    ContextAnalysis, ContextEntry, MemoryContextStore, NewTask, Result, Settings, Suggestion,
    Task, TaskId, TaskLensError, TaskPatch, TaskStore,
};

fn server() -> TestServer {
    server_with(Settings::default())
}

fn server_with(settings: Settings) -> TestServer {
    let state = AppState::new(settings);
    TestServer::new(create_router(state)).expect("test server")
}

async fn create_task(server: &TestServer, body: Value) -> Task {
    let resp = server.post("/tasks").json(&body).await;
    assert_eq!(resp.status_code(), 201);
    resp.json()
}

async fn create_context(server: &TestServer, body: Value) -> ContextEntry {
    let resp = server.post("/contexts").json(&body).await;
    assert_eq!(resp.status_code(), 201);
    resp.json()
}

#[tokio::test]
async fn root_and_health_respond() {
    let server = server();

    let root = server.get("/").await;
    assert_eq!(root.status_code(), 200);
    assert!(root.text().contains("running"));

    let health = server.get("/health").await;
    assert_eq!(health.status_code(), 200);
    let body: Value = health.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tasks"], 0);
}

#[tokio::test]
async fn task_crud_round_trip() {
    let server = server();

    let task = create_task(
        &server,
        json!({"title": "Write report", "priority": "high", "dueDate": "2030-01-01T10:00:00Z"}),
    )
    .await;
    assert!(!task.completed);
    assert_eq!(task.description, "");

    let fetched: Task = server.get(&format!("/tasks/{}", task.id)).await.json();
    assert_eq!(fetched, task);

    let resp = server
        .put(&format!("/tasks/{}", task.id))
        .json(&json!({"completed": true, "dueDate": null, "id": "ignored"}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let updated: Task = resp.json();
    assert!(updated.completed);
    assert!(updated.due_date.is_none());
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.created_at, task.created_at);

    let removed = server.delete(&format!("/tasks/{}", task.id)).await;
    assert_eq!(removed.status_code(), 200);
    assert_eq!(removed.json::<Task>().id, task.id);

    let listed: Vec<Task> = server.get("/tasks").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn tasks_list_newest_first() {
    let server = server();
    let first = create_task(&server, json!({"title": "first"})).await;
    let second = create_task(&server, json!({"title": "second"})).await;

    let listed: Vec<Task> = server.get("/tasks").await.json();
    let ids: Vec<TaskId> = listed.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let server = server();
    let missing = TaskId::new_v4();

    let resp = server
        .put(&format!("/tasks/{}", missing))
        .json(&json!({"completed": true}))
        .await;
    assert_eq!(resp.status_code(), 404);
    let body: Value = resp.json();
    assert_eq!(body["error"], "Task not found");
    assert_eq!(body["status"], 404);

    let resp = server.delete(&format!("/contexts/{}", missing)).await;
    assert_eq!(resp.status_code(), 404);
    assert_eq!(resp.json::<Value>()["error"], "Context entry not found");

    let resp = server.get("/tasks/not-a-uuid").await;
    assert_eq!(resp.status_code(), 400);

    let resp = server.get("/nowhere").await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let server = server();
    let resp = server.post("/tasks").json(&json!({"title": "  "})).await;
    assert_eq!(resp.status_code(), 400);

    let task = create_task(&server, json!({"title": "keep"})).await;
    let resp = server
        .put(&format!("/tasks/{}", task.id))
        .json(&json!({"title": ""}))
        .await;
    assert_eq!(resp.status_code(), 400);
}

#[tokio::test]
async fn list_filters_and_sorts() {
    let server = server();
    create_task(&server, json!({"title": "low", "priority": "low"})).await;
    let done = create_task(&server, json!({"title": "done", "priority": "high"})).await;
    create_task(&server, json!({"title": "urgent", "priority": "high", "category": "Work"})).await;
    create_task(
        &server,
        json!({"title": "suggested", "priority": "medium", "aiSuggested": true}),
    )
    .await;
    server
        .put(&format!("/tasks/{}", done.id))
        .json(&json!({"completed": true}))
        .await;

    let titles = |tasks: Vec<Task>| -> Vec<String> { tasks.into_iter().map(|t| t.title).collect() };

    let pending_high: Vec<Task> = server
        .get("/tasks?status=pending&priority=high")
        .await
        .json();
    assert_eq!(titles(pending_high), vec!["urgent"]);

    let work: Vec<Task> = server.get("/tasks?category=Work&priority=all").await.json();
    assert_eq!(titles(work), vec!["urgent"]);

    let ai: Vec<Task> = server.get("/tasks?aiSuggested=true").await.json();
    assert_eq!(titles(ai), vec!["suggested"]);

    let search: Vec<Task> = server.get("/tasks?search=URG").await.json();
    assert_eq!(titles(search), vec!["urgent"]);

    let sorted: Vec<Task> = server.get("/tasks?sorted=true").await.json();
    assert_eq!(titles(sorted), vec!["urgent", "suggested", "low", "done"]);

    let resp = server.get("/tasks?priority=urgent").await;
    assert_eq!(resp.status_code(), 400);
    let body: Value = resp.json();
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("unknown priority"));

    let resp = server.get("/tasks?sorted=maybe").await;
    assert_eq!(resp.status_code(), 400);
    assert_eq!(resp.json::<Value>()["status"], 400);
}

#[tokio::test]
async fn priority_accepts_any_case() {
    let server = server();
    let task = create_task(&server, json!({"title": "shout", "priority": "High"})).await;
    assert_eq!(task.priority, tasklens_core::Priority::High);

    let updated: Task = server
        .put(&format!("/tasks/{}", task.id))
        .json(&json!({"priority": "LOW"}))
        .await
        .json();
    assert_eq!(updated.priority, tasklens_core::Priority::Low);

    let resp = server
        .post("/tasks")
        .json(&json!({"title": "bad", "priority": "urgent"}))
        .await;
    assert!(resp.status_code().is_client_error());
}

#[tokio::test]
async fn overdue_filter_and_stats() {
    let server = server();
    create_task(
        &server,
        json!({"title": "late", "dueDate": "2001-01-01T00:00:00Z"}),
    )
    .await;
    create_task(
        &server,
        json!({"title": "future", "dueDate": "2999-01-01T00:00:00Z"}),
    )
    .await;

    let overdue: Vec<Task> = server.get("/tasks?due=overdue").await.json();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].title, "late");

    let upcoming: Vec<Task> = server.get("/tasks?dueDateFilter=upcoming").await.json();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].title, "future");

    let stats: Value = server.get("/tasks/stats").await.json();
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["overdue"], 1);
    assert_eq!(stats["completionRate"], 0);
    assert_eq!(stats["byPriority"]["medium"], 2);
}

#[tokio::test]
async fn context_crud_and_processing() {
    let server = server();

    let entry = create_context(
        &server,
        json!({"content": "Urgent: call the client about the project", "source": "email"}),
    )
    .await;
    assert!(!entry.processed);

    let resp = server
        .post(&format!("/contexts/{}/process", entry.id))
        .await;
    assert_eq!(resp.status_code(), 200);
    let analysis: ContextAnalysis = resp.json();
    assert_eq!(analysis.suggested_tasks.len(), 1);
    assert_eq!(analysis.suggested_tasks[0].title, "Prepare for upcoming meeting");
    assert!(analysis.suggested_tasks[0].context_based);
    assert!(analysis.insights.starts_with("⚡ Urgent action items detected"));

    let listed: Vec<ContextEntry> = server.get("/contexts").await.json();
    assert!(listed[0].processed);
    assert_eq!(listed[0].insights.as_deref(), Some(analysis.insights.as_str()));

    let updated: ContextEntry = server
        .put(&format!("/contexts/{}", entry.id))
        .json(&json!({"content": "buy a new laptop"}))
        .await
        .json();
    assert_eq!(updated.content, "buy a new laptop");

    let removed = server.delete(&format!("/contexts/{}", entry.id)).await;
    assert_eq!(removed.status_code(), 200);
    let listed: Vec<ContextEntry> = server.get("/contexts").await.json();
    assert!(listed.is_empty());

    let resp = server
        .post(&format!("/contexts/{}/process", entry.id))
        .await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn processing_respects_configured_limit() {
    let mut settings = Settings::default();
    settings.suggestions.context_limit = 2;
    let server = server_with(settings);

    let entry = create_context(
        &server,
        json!({"content": "meeting, then buy snacks, then study"}),
    )
    .await;
    let analysis: ContextAnalysis = server
        .post(&format!("/contexts/{}/process", entry.id))
        .await
        .json();
    assert_eq!(analysis.suggested_tasks.len(), 2);
}

#[tokio::test]
async fn suggestions_track_task_list_and_can_be_accepted() {
    let server = server();

    let suggestions: Vec<Suggestion> = server.get("/ai/suggestions").await.json();
    assert_eq!(suggestions.len(), 5);
    assert_eq!(suggestions[0].title, "Daily Exercise");
    assert!(suggestions.iter().all(|s| s.ai_suggested));

    // Accepting a suggestion is posting it back as a task.
    let accepted = create_task(&server, serde_json::to_value(&suggestions[0]).unwrap()).await;
    assert!(accepted.ai_suggested);
    assert_eq!(accepted.category.as_deref(), Some("Health"));

    let suggestions: Vec<Suggestion> = server.get("/ai/suggestions").await.json();
    assert!(suggestions.iter().all(|s| s.title != "Daily Exercise"));
}

#[tokio::test]
async fn insights_reflect_counts() {
    let server = server();
    let task = create_task(&server, json!({"title": "t"})).await;
    server
        .put(&format!("/tasks/{}", task.id))
        .json(&json!({"completed": true}))
        .await;
    create_context(&server, json!({"content": "note"})).await;

    let insights: Vec<Value> = server.get("/ai/insights").await.json();
    let kinds: Vec<&str> = insights
        .iter()
        .filter_map(|i| i["kind"].as_str())
        .collect();
    assert_eq!(kinds, vec!["productivity", "context"]);
    assert_eq!(insights[0]["tone"], "positive");
}

#[tokio::test]
async fn metrics_endpoint_exposes_counters() {
    tasklens_api::metrics::register_metrics();
    let server = server();
    create_task(&server, json!({"title": "counted"})).await;

    let resp = server.get("/metrics").await;
    assert_eq!(resp.status_code(), 200);
    assert!(resp.text().contains("tasks_created_total"));
}

struct FailingTaskStore;

#[async_trait]
impl TaskStore for FailingTaskStore {
    async fn list(&self) -> Result<Vec<Task>> {
        Err(TaskLensError::Io(std::io::Error::other("disk on fire")))
    }
    async fn get(&self, _id: TaskId) -> Result<Option<Task>> {
        Ok(None)
    }
    async fn create(&self, _new: NewTask) -> Result<Task> {
        Err(TaskLensError::Io(std::io::Error::other("disk on fire")))
    }
    async fn update(&self, _id: TaskId, _patch: TaskPatch) -> Result<Task> {
        Err(TaskLensError::Io(std::io::Error::other("disk on fire")))
    }
    async fn delete(&self, _id: TaskId) -> Result<Task> {
        Err(TaskLensError::Io(std::io::Error::other("disk on fire")))
    }
    async fn count(&self) -> Result<usize> {
        Ok(0)
    }
}

#[tokio::test]
async fn store_failures_surface_as_500() {
    let state = AppState::with_stores(
        Settings::default(),
        Arc::new(FailingTaskStore),
        Arc::new(MemoryContextStore::new()),
    );
    let server = TestServer::new(create_router(state)).expect("test server");

    let resp = server.get("/tasks").await;
    assert_eq!(resp.status_code(), 500);
    let body: Value = resp.json();
    assert_eq!(body["status"], 500);

    let resp = server.get("/ai/suggestions").await;
    assert_eq!(resp.status_code(), 500);
}

mod cors {
    use axum::body::Body;
    use http::{header, Method, Request, StatusCode};
    use tasklens_api::{create_router, AppState};
    use tasklens_core::Settings;
    use tower::ServiceExt;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/tasks")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn any_origin_by_default() {
        let app = create_router(AppState::new(Settings::default()));
        let resp = app.oneshot(preflight("http://localhost:3000")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn configured_origins_are_echoed() {
        let mut settings = Settings::default();
        settings.security.allowed_origins = vec!["http://app.example".to_string()];
        let app = create_router(AppState::new(settings));

        let resp = app.oneshot(preflight("http://app.example")).await.unwrap();
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://app.example"
        );
    }
}
