use crate::clock::format_timestamp;
use crate::item::{Item, ItemService, ItemServiceError};
use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the item routes.
pub struct ItemState {
    pub service: ItemService,
}

impl ItemState {
    pub fn new(service: ItemService) -> Self {
        Self { service }
    }
}

/// JSON representation of an Item for API responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemJson {
    id: String,
    name: String,
    description: String,
    created_at: String,
}

impl From<Item> for ItemJson {
    fn from(item: Item) -> Self {
        Self {
            id: item.id().to_string(),
            name: item.name().to_string(),
            description: item.description().to_string(),
            created_at: format_timestamp(item.created_at()),
        }
    }
}

/// Successful single-item response: `{success: true, data}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemResponse {
    success: bool,
    data: ItemJson,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            success: true,
            data: ItemJson::from(item),
        }
    }
}

/// Successful list response: `{success: true, data: [...]}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemsResponse {
    success: bool,
    data: Vec<ItemJson>,
}

impl From<Vec<Item>> for ItemsResponse {
    fn from(items: Vec<Item>) -> Self {
        Self {
            success: true,
            data: items.into_iter().map(ItemJson::from).collect(),
        }
    }
}

/// Failed item response: `{success: false, error}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ItemErrorResponse {
    success: bool,
    error: String,
}

/// Request body for POST /api/items.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    name: Option<String>,
    description: Option<String>,
}

/// Errors returned by the item endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ItemApiError {
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Service(#[from] ItemServiceError),
}

impl From<JsonRejection> for ItemApiError {
    fn from(rejection: JsonRejection) -> Self {
        ItemApiError::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ItemApiError {
    fn into_response(self) -> Response {
        let (status_code, message) = match self {
            ItemApiError::MalformedBody(message) => (StatusCode::BAD_REQUEST, message),
            ItemApiError::Service(ItemServiceError::NameRequired) => (
                StatusCode::BAD_REQUEST,
                ItemServiceError::NameRequired.to_string(),
            ),
            ItemApiError::Service(ItemServiceError::ItemNotFound(_)) => {
                (StatusCode::NOT_FOUND, "Item not found".to_string())
            }
        };
        let body = ItemErrorResponse {
            success: false,
            error: message,
        };
        (status_code, Json(body)).into_response()
    }
}

/// Handler for GET /api/items.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "All items", body = ItemsResponse)
    ),
    tag = "Items"
)]
pub async fn get_items_handler(
    State(state): State<Arc<ItemState>>,
) -> Json<ItemsResponse> {
    let items = state.service.get_all_items().await;
    Json(ItemsResponse::from(items))
}

/// Handler for GET /api/items/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "The item", body = ItemResponse),
        (status = 404, description = "Item not found", body = ItemErrorResponse)
    ),
    tag = "Items"
)]
pub async fn get_item_handler(
    State(state): State<Arc<ItemState>>,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ItemApiError> {
    let item = state.service.get_item_by_id(&id).await?;
    Ok(Json(ItemResponse::from(item)))
}

/// Handler for POST /api/items.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Name is required", body = ItemErrorResponse)
    ),
    tag = "Items"
)]
pub async fn create_item_handler(
    State(state): State<Arc<ItemState>>,
    payload: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), ItemApiError> {
    let Json(request) = payload?;
    let item = state
        .service
        .create_item(request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(ItemResponse::from(item))))
}

/// Creates and returns the items API router.
pub fn create_api_router(state: Arc<ItemState>) -> Router {
    Router::new()
        .route("/items", get(get_items_handler).post(create_item_handler))
        .route("/items/{id}", get(get_item_handler))
        .with_state(state)
}
