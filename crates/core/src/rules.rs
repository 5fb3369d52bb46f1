//! Rules engine adapter
//!
//! The controller never touches a position directly. Everything goes through
//! [`RulesEngine`], which `ShakmatyRules` implements on top of `shakmaty`.

use shakmaty::{
    fen::Fen, san::San, Bitboard, Board, CastlingMode, Chess, Color, EnPassantMode, File, Move,
    Piece, Position, Role, Square,
};

use crate::error::{Error, Result};
use crate::notation::MoveDescriptor;

/// Operations the move controller needs from a chess rules engine.
pub trait RulesEngine {
    /// Side to move.
    fn turn(&self) -> Color;

    fn is_check(&self) -> bool;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    fn is_checkmate(&self) -> bool;

    /// Stalemate, insufficient material, fifty-move rule or threefold repetition.
    fn is_draw(&self) -> bool;

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }

    /// Plays the move from `from` to `to`. `promotion` is only used when the
    /// move is a pawn promotion. Returns the SAN of the move, or `None` if it
    /// is illegal.
    fn play_squares(&mut self, from: Square, to: Square, promotion: Role) -> Option<String>;

    /// Plays a move given in SAN or castling notation. Returns the SAN of the
    /// move as the engine writes it, or `None` if it is malformed, ambiguous
    /// or illegal.
    fn play_notation(&mut self, notation: &str) -> Option<String>;

    /// Plays the only legal move matching the descriptor's piece, destination
    /// and promotion. Returns `None` if no move or more than one move matches.
    fn play_reduced(&mut self, descriptor: &MoveDescriptor) -> Option<String>;

    /// Takes back the last half-move. Returns false if there is nothing to undo.
    fn undo(&mut self) -> bool;

    /// Back to the starting position with no history.
    fn reset(&mut self);

    /// FEN of the current position.
    fn fen(&self) -> String;
}

/// Key used for repetition detection.
type RepetitionKey = (Board, Color, Bitboard, Option<Square>);

/// [`RulesEngine`] backed by `shakmaty::Chess`.
#[derive(Debug, Clone, Default)]
pub struct ShakmatyRules {
    position: Chess,
    /// Positions before each played half-move, oldest first.
    undo_stack: Vec<Chess>,
}

impl ShakmatyRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an arbitrary position. Undo cannot go past it.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let parsed: Fen = fen
            .parse()
            .map_err(|e| Error::Position(format!("bad FEN '{}': {}", fen, e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| Error::Position(format!("illegal FEN '{}': {}", fen, e)))?;

        Ok(Self {
            position,
            undo_stack: Vec::new(),
        })
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Number of half-moves that can be taken back.
    pub fn ply(&self) -> usize {
        self.undo_stack.len()
    }

    fn apply(&mut self, m: Move) -> Option<String> {
        let san = San::from_move(&self.position, m.clone());
        let next = self.position.clone().play(m).ok()?;

        let suffix = if next.is_checkmate() {
            "#"
        } else if next.is_check() {
            "+"
        } else {
            ""
        };

        let previous = std::mem::replace(&mut self.position, next);
        self.undo_stack.push(previous);

        Some(format!("{}{}", san, suffix))
    }

    fn is_threefold_repetition(&self) -> bool {
        let current = repetition_key(&self.position);
        let earlier = self
            .undo_stack
            .iter()
            .filter(|pos| repetition_key(pos) == current)
            .count();
        earlier + 1 >= 3
    }
}

impl RulesEngine for ShakmatyRules {
    fn turn(&self) -> Color {
        self.position.turn()
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_draw(&self) -> bool {
        self.position.is_stalemate()
            || self.position.is_insufficient_material()
            || self.position.halfmoves() >= 100
            || self.is_threefold_repetition()
    }

    fn play_squares(&mut self, from: Square, to: Square, promotion: Role) -> Option<String> {
        let m = self.position.legal_moves().into_iter().find(|m| {
            m.from() == Some(from)
                && destination(m) == to
                && m.promotion().map_or(true, |role| role == promotion)
        })?;
        self.apply(m)
    }

    fn play_notation(&mut self, notation: &str) -> Option<String> {
        let san: San = notation.parse().ok()?;
        let m = san.to_move(&self.position).ok()?;
        self.apply(m)
    }

    fn play_reduced(&mut self, descriptor: &MoveDescriptor) -> Option<String> {
        let mut candidates = self.position.legal_moves().into_iter().filter(|m| {
            !m.is_castle()
                && m.role() == descriptor.piece
                && m.to() == descriptor.destination
                && m.promotion() == descriptor.promotion
        });

        let m = candidates.next()?;
        if candidates.next().is_some() {
            return None;
        }
        self.apply(m)
    }

    fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.position = previous;
                true
            }
            None => false,
        }
    }

    fn reset(&mut self) {
        self.position = Chess::default();
        self.undo_stack.clear();
    }

    fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }
}

/// Square the king lands on for castling, the target square otherwise.
fn destination(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() { File::G } else { File::C };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

fn repetition_key(position: &Chess) -> RepetitionKey {
    let setup = position.to_setup(EnPassantMode::Legal);
    (setup.board, setup.turn, setup.castling_rights, setup.ep_square)
}
