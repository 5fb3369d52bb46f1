use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use tracing::{debug, error};

use chess_bot_core::{DropOutcome, Opponent};

use crate::AppState;

pub mod game;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub status: String,
    pub moves: Vec<String>,
    pub board: String,
    pub fen: String,
    pub pending: bool,
}

#[derive(serde::Deserialize)]
pub struct MoveForm {
    pub source: String,
    pub target: String,
}

pub async fn index<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Response {
    let template = state.controller.with_session(|s| IndexTemplate {
        title: "Chess Bot".to_string(),
        status: s.status().to_string(),
        moves: s.history().as_slice().to_vec(),
        board: s.board().render(),
        fen: s.fen(),
        pending: s.is_waiting_for_bot(),
    });

    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render index: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Form flavour of a drag and drop: the drag check runs on the piece at `source`.
pub async fn move_form<O: Opponent>(
    State(state): State<Arc<AppState<O>>>,
    Form(form): Form<MoveForm>,
) -> Redirect {
    let source = form.source.trim();
    let target = form.target.trim();

    match state.controller.with_session(|s| s.piece_at(source)) {
        Some(piece) if state.controller.drag_start(&piece) => {
            if state.controller.drop_piece(source, target) == DropOutcome::Snapback {
                debug!(source, target, "form move rejected");
            }
        }
        _ => debug!(source, "drag refused"),
    }

    Redirect::to("/")
}

pub async fn reset_form<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Redirect {
    state.controller.reset();
    Redirect::to("/")
}

pub async fn undo_form<O: Opponent>(State(state): State<Arc<AppState<O>>>) -> Redirect {
    state.controller.undo();
    Redirect::to("/")
}

pub async fn health() -> &'static str {
    "OK"
}
