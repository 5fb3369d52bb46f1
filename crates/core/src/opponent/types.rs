//! Wire types for the move-suggestion endpoint

use serde::{Deserialize, Serialize};
use shakmaty::Color;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMoveRequest {
    /// Move history in SAN, space separated.
    pub board: String,
    /// Side the bot plays, `"White"` or `"Black"`.
    pub color: String,
}

impl BotMoveRequest {
    pub fn new(board: impl Into<String>, side: Color) -> Self {
        Self {
            board: board.into(),
            color: side_label(side).to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMoveResponse {
    #[serde(rename = "move", default)]
    pub mv: Option<String>,
}

impl BotMoveResponse {
    pub fn with_move(mv: impl Into<String>) -> Self {
        Self { mv: Some(mv.into()) }
    }
}

pub fn side_label(side: Color) -> &'static str {
    match side {
        Color::White => "White",
        Color::Black => "Black",
    }
}
