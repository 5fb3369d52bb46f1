//! Board widget adapter

use shakmaty::{Board, File, Rank, Square};
use tracing::warn;

/// What the controller needs from a board display.
pub trait BoardWidget {
    /// Shows the starting position.
    fn start(&mut self);

    /// Re-syncs the display to a FEN.
    fn set_position(&mut self, fen: &str);

    /// Reverts a drag that the rules engine rejected.
    fn snapback(&mut self, source: &str, target: &str);
}

/// Text board used by the terminal and web front ends.
#[derive(Debug, Clone, Default)]
pub struct TextBoard {
    placement: Board,
    snapbacks: Vec<(String, String)>,
    syncs: usize,
}

impl TextBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Piece placement currently shown, in FEN board notation.
    pub fn placement(&self) -> String {
        self.placement.to_string()
    }

    /// Drags reverted so far, oldest first.
    pub fn snapbacks(&self) -> &[(String, String)] {
        &self.snapbacks
    }

    /// Number of times the display was re-synced or restarted.
    pub fn sync_count(&self) -> usize {
        self.syncs
    }

    /// ASCII diagram from White's side, rank 8 first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for rank in Rank::ALL.iter().rev() {
            out.push(rank.char());
            out.push(' ');
            for file in File::ALL {
                let square = Square::from_coords(file, *rank);
                let symbol = self.placement.piece_at(square).map_or('.', |p| p.char());
                out.push(symbol);
                if file != File::H {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h");
        out
    }
}

impl BoardWidget for TextBoard {
    fn start(&mut self) {
        self.placement = Board::default();
        self.syncs += 1;
    }

    fn set_position(&mut self, fen: &str) {
        let field = fen.split_whitespace().next().unwrap_or_default();
        match field.parse::<Board>() {
            Ok(board) => {
                self.placement = board;
                self.syncs += 1;
            }
            Err(e) => warn!("ignoring unreadable position '{}': {}", fen, e),
        }
    }

    fn snapback(&mut self, source: &str, target: &str) {
        self.snapbacks.push((source.to_string(), target.to_string()));
    }
}
