use crate::router::MessageRouter;
use crate::session::vision_socket;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// WebSocket endpoint path.
pub const VISION_PATH: &str = "/ws/vision";

/// State shared by every connection.
#[derive(Clone)]
pub struct AppState {
    pub router: MessageRouter,
}

/// HTTP application: the vision socket behind a permissive CORS layer.
pub fn app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route(VISION_PATH, get(vision_socket))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until the listener fails or the future is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}
