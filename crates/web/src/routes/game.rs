//! JSON API mirroring the board widget events

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use chess_bot_core::{DropOutcome, MoveController, Opponent};

use crate::AppState;

// ============================================================================
// BODIES
// ============================================================================

#[derive(Deserialize)]
pub struct DragRequest {
    pub piece: String,
}

#[derive(Serialize)]
pub struct DragResponse {
    pub allowed: bool,
}

#[derive(Deserialize)]
pub struct DropRequest {
    pub source: String,
    pub target: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropResult {
    Snapback,
    Accepted,
}

#[derive(Serialize)]
pub struct DropResponse {
    pub result: DropResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
    pub game: GameView,
}

#[derive(Serialize)]
pub struct GameView {
    pub fen: String,
    pub history: Vec<String>,
    pub status: String,
    pub pending: bool,
    pub board: String,
}

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn snapshot<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Json<GameView> {
    Json(game_view(&state.controller))
}

pub async fn drag<O: Opponent>(
    State(state): State<Arc<AppState<O>>>,
    Json(body): Json<DragRequest>,
) -> Json<DragResponse> {
    Json(DragResponse {
        allowed: state.controller.drag_start(&body.piece),
    })
}

pub async fn drop_piece<O: Opponent>(
    State(state): State<Arc<AppState<O>>>,
    Json(body): Json<DropRequest>,
) -> Json<DropResponse> {
    let (result, san) = match state.controller.drop_piece(&body.source, &body.target) {
        DropOutcome::Snapback => (DropResult::Snapback, None),
        DropOutcome::Accepted { san, .. } => (DropResult::Accepted, Some(san)),
    };

    Json(DropResponse {
        result,
        san,
        game: game_view(&state.controller),
    })
}

pub async fn reset<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Json<GameView> {
    state.controller.reset();
    Json(game_view(&state.controller))
}

pub async fn undo<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Json<GameView> {
    state.controller.undo();
    Json(game_view(&state.controller))
}

// ============================================================================
// HELPERS
// ============================================================================

fn game_view<O: Opponent>(controller: &MoveController<O>) -> GameView {
    controller.with_session(|s| GameView {
        fen: s.fen(),
        history: s.history().as_slice().to_vec(),
        status: s.status().to_string(),
        pending: s.is_waiting_for_bot(),
        board: s.board().placement(),
    })
}
