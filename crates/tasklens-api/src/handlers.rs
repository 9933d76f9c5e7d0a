use crate::{metrics, ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tasklens_core::{
    dashboard_insights, sort_tasks, ContextAnalysis, ContextEntry, ContextPatch, Insight,
    NewContextEntry, NewTask, RecordKind, Suggestion, Task, TaskFilter, TaskLensError, TaskPatch,
    TaskStats,
};
use tracing::info;
use uuid::Uuid;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tasks: usize,
    pub contexts: usize,
}

/// Ordering flag for `GET /tasks`, read next to [`TaskFilter`] from the same query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrder {
    #[serde(default)]
    pub sorted: bool,
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid ID format: {}", raw)))
}

pub async fn root() -> &'static str {
    "TaskLens backend is running!"
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tasks: state.tasks.count().await?,
        contexts: state.contexts.count().await?,
    }))
}

pub async fn metrics_text() -> ApiResult<impl IntoResponse> {
    let body = metrics::render().map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(([(CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

// -------- Tasks --------

pub async fn list_tasks(
    State(state): State<AppState>,
    filter: Result<Query<TaskFilter>, QueryRejection>,
    order: Result<Query<ListOrder>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(filter) = filter?;
    let Query(order) = order?;
    let mut tasks = state.tasks.list().await?;
    if filter.is_active() {
        tasks = filter.apply(tasks, Utc::now());
    }
    if order.sorted {
        sort_tasks(&mut tasks);
    }
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(new): Json<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tasks.create(new).await?;
    metrics::TASKS_CREATED_TOTAL.inc();
    info!(id = %task.id, title = %task.title, "Created task");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let task = state
        .tasks
        .get(id)
        .await?
        .ok_or(TaskLensError::NotFound(RecordKind::Task))?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let task = state.tasks.update(id, patch).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let removed = state.tasks.delete(id).await?;
    info!(id = %removed.id, "Deleted task");
    Ok(Json(removed))
}

pub async fn task_stats(State(state): State<AppState>) -> ApiResult<Json<TaskStats>> {
    let tasks = state.tasks.list().await?;
    Ok(Json(TaskStats::compute(&tasks, Utc::now())))
}

// -------- Contexts --------

pub async fn list_contexts(State(state): State<AppState>) -> ApiResult<Json<Vec<ContextEntry>>> {
    Ok(Json(state.contexts.list().await?))
}

pub async fn create_context(
    State(state): State<AppState>,
    Json(new): Json<NewContextEntry>,
) -> ApiResult<(StatusCode, Json<ContextEntry>)> {
    let entry = state.contexts.create(new).await?;
    metrics::CONTEXTS_CREATED_TOTAL.inc();
    info!(id = %entry.id, source = %entry.source, "Created context entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_context(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ContextPatch>,
) -> ApiResult<Json<ContextEntry>> {
    let id = parse_id(&id)?;
    Ok(Json(state.contexts.update(id, patch).await?))
}

pub async fn delete_context(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContextEntry>> {
    let id = parse_id(&id)?;
    let removed = state.contexts.delete(id).await?;
    info!(id = %removed.id, "Deleted context entry");
    Ok(Json(removed))
}

pub async fn process_context(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContextAnalysis>> {
    let id = parse_id(&id)?;
    let entry = state
        .contexts
        .get(id)
        .await?
        .ok_or(TaskLensError::NotFound(RecordKind::ContextEntry))?;

    let analysis = state.engine.from_context(&entry.content, Utc::now());
    state
        .contexts
        .mark_processed(id, analysis.insights.clone())
        .await?;
    metrics::CONTEXTS_PROCESSED_TOTAL.inc();
    info!(
        id = %id,
        suggestions = analysis.suggested_tasks.len(),
        "Processed context entry"
    );
    Ok(Json(analysis))
}

// -------- AI --------

pub async fn suggestions(State(state): State<AppState>) -> ApiResult<Json<Vec<Suggestion>>> {
    let tasks = state.tasks.list().await?;
    metrics::SUGGESTION_REQUESTS_TOTAL.inc();
    Ok(Json(state.engine.from_task_list(&tasks, Utc::now())))
}

pub async fn insights(State(state): State<AppState>) -> ApiResult<Json<Vec<Insight>>> {
    let tasks = state.tasks.list().await?;
    let contexts = state.contexts.list().await?;
    Ok(Json(dashboard_insights(&tasks, &contexts, Utc::now())))
}
