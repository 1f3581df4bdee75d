pub mod config;
pub mod drawing;
pub mod error;
pub mod gateway;
pub mod preview;
pub mod room;
pub mod websocket;

use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use config::Config;
use gateway::SessionGateway;
use room::RoomRegistry;

/// Application state shared across all connections
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<RwLock<SessionGateway>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, RoomRegistry::new())
    }

    pub fn with_registry(config: Config, registry: RoomRegistry) -> Self {
        Self {
            gateway: Arc::new(RwLock::new(SessionGateway::new(registry))),
            config: Arc::new(config),
        }
    }
}

/// Build the HTTP router: socket endpoint, page previews and the static client.
pub fn app(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/ws", get(websocket::handler::ws_handler))
        .route(
            "/rooms/:room_id/pages/:page_id/preview.png",
            get(preview::page_preview),
        )
        .fallback_service(static_files)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
