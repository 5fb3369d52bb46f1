use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use chess_bot_core::{ControllerConfig, MoveController, Opponent, RemoteOpponent};

mod routes;

pub struct AppState<O: Opponent> {
    pub controller: MoveController<O>,
}

pub fn app<O: Opponent>(state: Arc<AppState<O>>) -> Router {
    Router::new()
        .route("/", get(routes::index::<O>))
        .route("/move", post(routes::move_form::<O>))
        .route("/reset", post(routes::reset_form::<O>))
        .route("/undo", post(routes::undo_form::<O>))
        .route("/health", get(routes::health))
        .route("/api/game", get(routes::game::snapshot::<O>))
        .route("/api/game/drag", post(routes::game::drag::<O>))
        .route("/api/game/drop", post(routes::game::drop_piece::<O>))
        .route("/api/game/reset", post(routes::game::reset::<O>))
        .route("/api/game/undo", post(routes::game::undo::<O>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ControllerConfig::from_env().expect("Invalid configuration");
    let opponent = RemoteOpponent::new(&config).expect("Failed to create HTTP client");
    info!(endpoint = opponent.endpoint(), "bot opponent configured");

    let state = Arc::new(AppState {
        controller: MoveController::standard(opponent, config),
    });

    let addr = std::env::var("CHESS_WEB_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    info!("Server running at http://{}", addr);

    axum::serve(listener, app(state)).await.expect("Server error");
}
