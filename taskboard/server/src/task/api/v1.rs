use crate::clock::format_timestamp;
use crate::task::{
    CreateTask, Task, TaskChanges, TaskFilter, TaskPriority, TaskService, TaskServiceError,
    TaskStatus,
};
use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

/// Shared state for the task routes.
pub struct TaskState {
    pub service: TaskService,
}

impl TaskState {
    pub fn new(service: TaskService) -> Self {
        Self { service }
    }
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Sequential identifier, starting at 1
    id: u64,
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    /// RFC 3339 creation time
    created_at: String,
    /// RFC 3339 time of the last change
    updated_at: String,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            status: task.status(),
            priority: task.priority(),
            created_at: format_timestamp(task.created_at()),
            updated_at: format_timestamp(task.updated_at()),
        }
    }
}

/// Request body for POST /api/tasks.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    /// One of todo, in-progress, done
    status: Option<String>,
    /// One of low, medium, high
    priority: Option<String>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(request: CreateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
        }
    }
}

/// Request body for PUT and PATCH /api/tasks/{id}.
///
/// Omitted fields are left untouched. A field sent as `null` counts as supplied.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(default, deserialize_with = "supplied")]
    #[schema(value_type = Option<String>)]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    #[schema(value_type = Option<String>)]
    description: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    #[schema(value_type = Option<String>)]
    status: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    #[schema(value_type = Option<String>)]
    priority: Option<Option<String>>,
}

/// Marks a present field as supplied, keeping `null` apart from a missing key.
fn supplied<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
        }
    }
}

/// Query parameters for filtering tasks.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskQuery {
    /// Only return tasks with this status
    status: Option<String>,
    /// Only return tasks with this priority
    priority: Option<String>,
}

impl From<TaskQuery> for TaskFilter {
    fn from(query: TaskQuery) -> Self {
        Self {
            status: query.status,
            priority: query.priority,
        }
    }
}

/// JSON response for task API errors.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// JSON response for DELETE /api/tasks/{id}.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteTaskResponse {
    message: String,
    task: TaskJson,
}

/// JSON response carrying only a message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    message: String,
}

/// Errors returned by the task endpoints.
#[derive(Debug, thiserror::Error)]
pub enum TaskApiError {
    /// The id path segment is not an integer.
    #[error("Invalid task ID")]
    InvalidId,
    /// The id is an integer no task can have.
    #[error("Task with ID {0} not found")]
    NegativeId(i64),
    /// The request body is not JSON of the expected shape.
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Service(#[from] TaskServiceError),
}

impl From<JsonRejection> for TaskApiError {
    fn from(rejection: JsonRejection) -> Self {
        TaskApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for TaskApiError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            TaskApiError::InvalidId => (StatusCode::BAD_REQUEST, "Invalid task ID".to_string()),
            TaskApiError::NegativeId(_)
            | TaskApiError::Service(TaskServiceError::TaskNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Task not found".to_string())
            }
            TaskApiError::MalformedBody(message) => (StatusCode::BAD_REQUEST, message),
            TaskApiError::Service(TaskServiceError::Validation(error)) => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
        };
        (status_code, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Parses the id path segment. Non-integers are invalid; negative integers match no task.
fn parse_task_id(raw_id: &str) -> Result<u64, TaskApiError> {
    let id: i64 = raw_id.parse().map_err(|_| TaskApiError::InvalidId)?;
    u64::try_from(id).map_err(|_| TaskApiError::NegativeId(id))
}

/// Turns an update body into changes once the task is known to exist.
///
/// A request without a JSON content type carries no changes. Any other body
/// rejection is reported only after the id has been looked up, so a missing
/// task is always a 404.
async fn read_changes(
    state: &TaskState,
    id: u64,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<TaskChanges, TaskApiError> {
    match payload {
        Ok(Json(request)) => Ok(request.into()),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(TaskChanges::default()),
        Err(rejection) => {
            state.service.get_task(id).await?;
            Err(rejection.into())
        }
    }
}

/// Handler for GET /api/tasks - Returns tasks matching the optional filters.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskQuery),
    responses(
        (status = 200, description = "Tasks in creation order", body = [TaskJson])
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
    Query(query): Query<TaskQuery>,
) -> Json<Vec<TaskJson>> {
    let tasks = state.service.list_tasks(&TaskFilter::from(query)).await;
    Json(tasks.into_iter().map(TaskJson::from).collect())
}

/// Handler for GET /api/tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = TaskJson),
        (status = 400, description = "Invalid task ID", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let id = parse_task_id(&id)?;
    let task = state.service.get_task(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /api/tasks.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), TaskApiError> {
    let Json(request) = payload?;
    let task = state.service.create_task(request.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for PUT /api/tasks/{id}.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Invalid ID or validation failed", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn replace_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let id = parse_task_id(&id)?;
    let changes = read_changes(&state, id, payload).await?;
    let task = state.service.replace_task(id, changes).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PATCH /api/tasks/{id}.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    patch,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Invalid ID or validation failed", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn patch_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, TaskApiError> {
    let id = parse_task_id(&id)?;
    let changes = read_changes(&state, id, payload).await?;
    let task = state.service.patch_task(id, changes).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /api/tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = DeleteTaskResponse),
        (status = 400, description = "Invalid task ID", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTaskResponse>, TaskApiError> {
    let id = parse_task_id(&id)?;
    let task = state.service.delete_task(id).await?;
    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
        task: TaskJson::from(task),
    }))
}

/// Handler for DELETE /api/tasks - Removes every task and restarts ids at 1.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks",
    responses(
        (status = 200, description = "All tasks deleted", body = MessageResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_all_tasks_handler(State(state): State<Arc<TaskState>>) -> Json<MessageResponse> {
    let count = state.service.delete_all_tasks().await;
    Json(MessageResponse {
        message: format!("Deleted {} tasks", count),
    })
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route(
            "/tasks",
            get(list_tasks_handler)
                .post(create_task_handler)
                .delete(delete_all_tasks_handler),
        )
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(replace_task_handler)
                .patch(patch_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
