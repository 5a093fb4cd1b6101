use std::sync::Arc;

use crate::item::api::v1::ItemState;
use crate::task::api::v1::TaskState;

use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

/// OpenAPI description of the JSON API.
#[derive(OpenApi)]
#[openapi(
    paths(
        hello_handler,
        crate::task::api::v1::list_tasks_handler,
        crate::task::api::v1::get_task_handler,
        crate::task::api::v1::create_task_handler,
        crate::task::api::v1::replace_task_handler,
        crate::task::api::v1::patch_task_handler,
        crate::task::api::v1::delete_task_handler,
        crate::task::api::v1::delete_all_tasks_handler,
        crate::item::api::v1::get_items_handler,
        crate::item::api::v1::get_item_handler,
        crate::item::api::v1::create_item_handler,
    ),
    tags(
        (name = "Tasks", description = "In-memory task board"),
        (name = "Items", description = "Sample item catalogue"),
        (name = "Hello", description = "Connectivity check")
    )
)]
pub struct ApiDoc;

#[derive(Debug, Serialize, ToSchema)]
pub struct HelloResponse {
    message: String,
}

/// Handler for GET /api/hello.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/api/hello",
    responses((status = 200, description = "Greeting", body = HelloResponse)),
    tag = "Hello"
)]
pub async fn hello_handler() -> Json<HelloResponse> {
    Json(HelloResponse {
        message: "Hello from the API!".to_string(),
    })
}

/// Handler for GET /api-docs/openapi.json.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>, item_state: Arc<ItemState>) -> Router {
    let tasks_router = crate::task::api::v1::create_api_router(task_state);
    let items_router = crate::item::api::v1::create_api_router(item_state);
    let api_routes = Router::new()
        .route("/hello", get(hello_handler))
        .merge(tasks_router)
        .merge(items_router);
    Router::new()
        .nest("/api", api_routes)
        .route("/api-docs/openapi.json", get(openapi_handler))
}
