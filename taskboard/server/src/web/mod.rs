use axum::Router;
use axum::response::Json;
use axum::routing::get;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clock::format_timestamp;
use crate::config::Config;
use crate::item::ItemService;
use crate::item::api::v1::ItemState;
use crate::task::TaskService;
use crate::task::api::v1::TaskState;

pub mod api;

/// Shared state handed to every router.
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<TaskState>,
    pub items: Arc<ItemState>,
}

impl AppState {
    /// Builds fresh in-memory stores according to `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            tasks: Arc::new(TaskState::new(TaskService::in_memory())),
            items: Arc::new(ItemState::new(ItemService::from_seed_flag(
                config.seed_sample_items,
            ))),
        }
    }
}

/// JSON response for the health check.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Assembles the full application: health check, API routes, tracing and CORS.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check_handler))
        .merge(api::create_api_router(state.tasks, state.items))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = config.server_address();
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let app = create_app(AppState::from_config(&config));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tracing::instrument]
pub async fn health_check_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: format_timestamp(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn can_report_healthy_status() {
        let Json(health) = health_check_handler().await;

        assert_eq!(health.status, "ok");
        assert!(health.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn can_build_state_without_sample_items() {
        let config = Config {
            seed_sample_items: false,
            ..Config::default()
        };

        let state = AppState::from_config(&config);

        assert!(state.items.service.get_all_items().await.is_empty());
    }
}
