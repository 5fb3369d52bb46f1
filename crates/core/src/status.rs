//! Status line derivation

use shakmaty::Color;

use crate::rules::RulesEngine;

pub const BOT_REQUEST_FAILED: &str = "Error: Failed to get bot move";
pub const BOT_MOVE_UNUSABLE: &str = "Error: Bot returned an unusable move";

/// Human-readable status for the current position.
pub fn describe<R: RulesEngine + ?Sized>(rules: &R) -> String {
    let turn = rules.turn();

    if rules.is_checkmate() {
        format!("Game over, {} wins by checkmate.", color_name(!turn))
    } else if rules.is_draw() {
        "Game over, drawn position".to_string()
    } else {
        let mut status = format!("{} to move", capitalized(turn));
        if rules.is_check() {
            status.push_str(&format!(", {} is in check", color_name(turn)));
        }
        status
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

fn capitalized(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
