//! Game session: rules engine, board widget, move history and status line
//!
//! Every handler here is synchronous. Scheduling the bot request is left to
//! [`MoveController`](crate::MoveController), which hands the reply back
//! through [`GameSession::apply_bot_reply`].

use serde::Serialize;
use shakmaty::{Color, Role, Square};
use tracing::{debug, error, info, warn};

use crate::board::{BoardWidget, TextBoard};
use crate::error::Result;
use crate::notation::{self, BotMove};
use crate::opponent::{BotMoveRequest, BotMoveResponse};
use crate::rules::{RulesEngine, ShakmatyRules};
use crate::status::{self, BOT_MOVE_UNUSABLE, BOT_REQUEST_FAILED};

/// SAN of every half-move played, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MoveHistory(Vec<String>);

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, san: impl Into<String>) {
        self.0.push(san.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// History as sent to the bot: moves separated by single spaces.
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// A bot request waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotTicket {
    pub generation: u64,
    pub request: BotMoveRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Illegal drop; the board was told to revert the drag.
    Snapback,
    /// The move was played. `reply` is set unless the move ended the game.
    Accepted { san: String, reply: Option<BotTicket> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied(String),
    /// A reset, undo or newer move superseded the request.
    Stale,
    /// Transport or HTTP failure.
    Failed,
    /// The reply could not be turned into a legal move.
    Unusable,
}

/// Serializable view of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub fen: String,
    pub history: MoveHistory,
    pub status: String,
    pub pending: bool,
}

pub struct GameSession<R = ShakmatyRules, B = TextBoard> {
    rules: R,
    board: B,
    history: MoveHistory,
    status: String,
    bot_side: Color,
    /// Bumped by every accepted player move, reset and undo.
    generation: u64,
    /// Generation of the outstanding bot request, if any.
    pending: Option<u64>,
}

impl GameSession {
    /// Standard game against a bot playing `bot_side`.
    pub fn standard(bot_side: Color) -> Self {
        Self::new(ShakmatyRules::new(), TextBoard::new(), bot_side)
    }

    /// Game starting from a FEN instead of the initial position.
    pub fn from_fen(fen: &str, bot_side: Color) -> Result<Self> {
        Ok(Self::new(ShakmatyRules::from_fen(fen)?, TextBoard::new(), bot_side))
    }
}

impl<R: RulesEngine, B: BoardWidget> GameSession<R, B> {
    pub fn new(rules: R, mut board: B, bot_side: Color) -> Self {
        board.set_position(&rules.fen());
        let status = status::describe(&rules);

        Self {
            rules,
            board,
            history: MoveHistory::new(),
            status,
            bot_side,
            generation: 0,
            pending: None,
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn fen(&self) -> String {
        self.rules.fen()
    }

    pub fn bot_side(&self) -> Color {
        self.bot_side
    }

    pub fn is_waiting_for_bot(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            fen: self.rules.fen(),
            history: self.history.clone(),
            status: self.status.clone(),
            pending: self.is_waiting_for_bot(),
        }
    }

    /// Whether a drag of `piece` (`"wP"`, `"bN"`, ...) may start.
    pub fn can_drag(&self, piece: &str) -> bool {
        if self.rules.is_game_over() || self.is_waiting_for_bot() {
            return false;
        }

        match piece.chars().next().and_then(Color::from_char) {
            Some(color) => color == self.rules.turn(),
            None => false,
        }
    }

    /// Board-widget piece code (`wP`, `bN`, ...) on `square`, if any.
    pub fn piece_at(&self, square: &str) -> Option<String> {
        let square: Square = square.parse().ok()?;
        self.rules
            .piece_at(square)
            .map(|p| format!("{}{}", p.color.char(), p.role.upper_char()))
    }

    /// Plays a dropped piece, promoting pawns to a queen.
    pub fn drop_piece(&mut self, source: &str, target: &str) -> DropOutcome {
        let played = match (source.parse::<Square>(), target.parse::<Square>()) {
            (Ok(from), Ok(to)) if !self.is_waiting_for_bot() => {
                self.rules.play_squares(from, to, Role::Queen)
            }
            _ => None,
        };

        let Some(san) = played else {
            debug!(source, target, "illegal drop");
            self.board.snapback(source, target);
            return DropOutcome::Snapback;
        };

        self.history.push(san.clone());
        self.generation += 1;
        self.board.set_position(&self.rules.fen());

        let reply = if self.rules.is_game_over() {
            None
        } else {
            self.pending = Some(self.generation);
            Some(BotTicket {
                generation: self.generation,
                request: BotMoveRequest::new(self.history.joined(), self.bot_side),
            })
        };

        self.update_status();
        info!(san = %san, status = %self.status, "player move");

        DropOutcome::Accepted { san, reply }
    }

    /// Applies the result of the bot request issued with `generation`.
    pub fn apply_bot_reply(
        &mut self,
        generation: u64,
        result: Result<BotMoveResponse>,
    ) -> ReplyOutcome {
        if self.pending != Some(generation) {
            debug!(generation, current = self.generation, "ignoring stale bot reply");
            return ReplyOutcome::Stale;
        }
        self.pending = None;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("Error making bot move: {}", e);
                self.status = BOT_REQUEST_FAILED.to_string();
                return ReplyOutcome::Failed;
            }
        };

        let Some(text) = response.mv else {
            warn!("bot reply carried no move");
            self.status = BOT_MOVE_UNUSABLE.to_string();
            return ReplyOutcome::Unusable;
        };

        let played = match notation::reduce(&text) {
            Ok(BotMove::Castle(side)) => {
                self.rules.play_notation(&BotMove::Castle(side).to_string())
            }
            Ok(BotMove::Reduced(descriptor)) => self.rules.play_reduced(&descriptor),
            Err(e) => {
                warn!("cannot read bot move '{}': {}", text, e);
                None
            }
        };

        match played {
            Some(san) => {
                self.history.push(san.clone());
                self.board.set_position(&self.rules.fen());
                self.update_status();
                info!(san = %san, status = %self.status, "bot move");
                ReplyOutcome::Applied(san)
            }
            None => {
                warn!("bot move '{}' rejected in {}", text, self.rules.fen());
                self.status = BOT_MOVE_UNUSABLE.to_string();
                ReplyOutcome::Unusable
            }
        }
    }

    /// New game. Any outstanding bot reply becomes stale.
    pub fn reset(&mut self) {
        self.rules.reset();
        self.board.start();
        self.history.clear();
        self.invalidate_pending();
        self.update_status();
        info!("game reset");
    }

    /// Takes back the last player move and bot reply. Needs at least two
    /// history entries and no bot reply pending; returns false and does
    /// nothing otherwise.
    pub fn undo(&mut self) -> bool {
        if self.history.len() < 2 || self.is_waiting_for_bot() {
            return false;
        }

        self.rules.undo();
        self.rules.undo();
        self.history.pop();
        self.history.pop();
        self.board.set_position(&self.rules.fen());
        self.invalidate_pending();
        self.update_status();
        info!(moves = self.history.len(), "undo");
        true
    }

    fn invalidate_pending(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn update_status(&mut self) {
        self.status = status::describe(&self.rules);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn session() -> GameSession {
        GameSession::standard(Color::Black)
    }

    fn ticket(outcome: DropOutcome) -> BotTicket {
        match outcome {
            DropOutcome::Accepted { reply: Some(ticket), .. } => ticket,
            other => panic!("expected a scheduled reply, got {:?}", other),
        }
    }

    fn reply(session: &mut GameSession, ticket: &BotTicket, mv: &str) -> ReplyOutcome {
        session.apply_bot_reply(ticket.generation, Ok(BotMoveResponse::with_move(mv)))
    }

    fn play_pair(session: &mut GameSession, source: &str, target: &str, bot: &str) {
        let t = ticket(session.drop_piece(source, target));
        assert!(matches!(reply(session, &t, bot), ReplyOutcome::Applied(_)));
    }

    #[test]
    fn test_new_session() {
        let s = session();
        assert_eq!(s.status(), "White to move");
        assert!(s.history().is_empty());
        assert!(!s.is_waiting_for_bot());
        assert_eq!(s.board().sync_count(), 1);
    }

    #[test]
    fn test_drag_only_side_to_move() {
        let s = session();
        assert!(s.can_drag("wP"));
        assert!(s.can_drag("wN"));
        assert!(!s.can_drag("bP"));
        assert!(!s.can_drag("xP"));
        assert!(!s.can_drag(""));
    }

    #[test]
    fn test_drag_refused_when_game_over() {
        let s = GameSession::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", Color::Black).unwrap();
        assert!(!s.can_drag("bK"));
        assert!(!s.can_drag("wQ"));
    }

    #[test]
    fn test_drag_refused_while_bot_thinks() {
        let mut s = session();
        s.drop_piece("e2", "e4");
        assert!(!s.can_drag("wP"));
        assert!(!s.can_drag("bP"));
    }

    #[test]
    fn test_illegal_drop_snaps_back() {
        let mut s = session();
        assert_eq!(s.drop_piece("e2", "e5"), DropOutcome::Snapback);
        assert_eq!(s.drop_piece("z9", "e4"), DropOutcome::Snapback);
        assert!(s.history().is_empty());
        assert_eq!(s.board().snapbacks().len(), 2);
        assert_eq!(s.status(), "White to move");
    }

    #[test]
    fn test_legal_drop_schedules_bot() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        assert_eq!(t.request, BotMoveRequest::new("e4", Color::Black));
        assert_eq!(s.history().as_slice(), &["e4"]);
        assert_eq!(s.status(), "Black to move");
        assert!(s.is_waiting_for_bot());
        assert_eq!(
            s.board().placement(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_drop_refused_while_bot_thinks() {
        let mut s = session();
        s.drop_piece("e2", "e4");
        assert_eq!(s.drop_piece("e7", "e5"), DropOutcome::Snapback);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_bot_reply_applied() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        assert_eq!(reply(&mut s, &t, "e5"), ReplyOutcome::Applied("e5".to_string()));
        assert_eq!(s.history().as_slice(), &["e4", "e5"]);
        assert_eq!(s.status(), "White to move");
        assert!(!s.is_waiting_for_bot());
        assert_eq!(
            s.board().placement(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR"
        );
    }

    #[test]
    fn test_bot_capture_with_disambiguation() {
        let mut s = session();
        play_pair(&mut s, "e2", "e4", "d5");
        let t = ticket(s.drop_piece("b1", "c3"));
        assert_eq!(reply(&mut s, &t, "d5xe4"), ReplyOutcome::Applied("dxe4".to_string()));
        assert_eq!(s.history().joined(), "e4 d5 Nc3 dxe4");
    }

    #[test]
    fn test_bot_castles() {
        let mut s = session();
        play_pair(&mut s, "e2", "e4", "e5");
        play_pair(&mut s, "g1", "f3", "Nc6");
        play_pair(&mut s, "f1", "c4", "Nf6");
        play_pair(&mut s, "d2", "d3", "Bc5");
        let t = ticket(s.drop_piece("c1", "g5"));
        assert_eq!(reply(&mut s, &t, "O-O"), ReplyOutcome::Applied("O-O".to_string()));
        assert_eq!(s.history().len(), 10);
        assert!(s.board().placement().starts_with("r1bq1rk1/"));
    }

    #[test]
    fn test_player_castles_by_dragging_king() {
        let mut s = session();
        play_pair(&mut s, "e2", "e4", "e5");
        play_pair(&mut s, "g1", "f3", "Nc6");
        play_pair(&mut s, "f1", "c4", "Bc5");
        match s.drop_piece("e1", "g1") {
            DropOutcome::Accepted { san, .. } => assert_eq!(san, "O-O"),
            other => panic!("castling rejected: {:?}", other),
        }
        assert!(s.board().placement().ends_with("RNBQ1RK1"));
    }

    #[test]
    fn test_bot_http_failure() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        let outcome =
            s.apply_bot_reply(t.generation, Err(Error::Opponent("HTTP error! status: 500".into())));
        assert_eq!(outcome, ReplyOutcome::Failed);
        assert_eq!(s.history().as_slice(), &["e4"]);
        assert_eq!(s.status(), "Error: Failed to get bot move");
    }

    #[test]
    fn test_bot_illegal_move_is_dropped() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        let syncs = s.board().sync_count();
        assert_eq!(reply(&mut s, &t, "Nf3"), ReplyOutcome::Unusable);
        assert_eq!(s.history().as_slice(), &["e4"]);
        assert_eq!(s.board().sync_count(), syncs);
        assert_eq!(s.status(), BOT_MOVE_UNUSABLE);
    }

    #[test]
    fn test_bot_reply_without_move() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        let outcome = s.apply_bot_reply(t.generation, Ok(BotMoveResponse::default()));
        assert_eq!(outcome, ReplyOutcome::Unusable);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_stale_reply_after_reset() {
        let mut s = session();
        let t = ticket(s.drop_piece("e2", "e4"));
        s.reset();
        assert_eq!(reply(&mut s, &t, "e5"), ReplyOutcome::Stale);
        assert!(s.history().is_empty());
        assert_eq!(s.status(), "White to move");
    }

    #[test]
    fn test_mating_move_schedules_nothing() {
        let mut s = GameSession::from_fen(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4",
            Color::Black,
        )
        .unwrap();
        match s.drop_piece("h5", "f7") {
            DropOutcome::Accepted { san, reply } => {
                assert_eq!(san, "Qxf7#");
                assert!(reply.is_none());
            }
            other => panic!("mate rejected: {:?}", other),
        }
        assert!(!s.is_waiting_for_bot());
        assert_eq!(s.status(), "Game over, white wins by checkmate.");
    }

    #[test]
    fn test_auto_queen_promotion() {
        let mut s = GameSession::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1", Color::Black).unwrap();
        match s.drop_piece("e7", "e8") {
            DropOutcome::Accepted { san, .. } => assert_eq!(san, "e8=Q"),
            other => panic!("promotion rejected: {:?}", other),
        }
    }

    #[test]
    fn test_undo_needs_two_moves() {
        let mut s = session();
        assert!(!s.undo());
        s.drop_piece("e2", "e4");
        assert!(!s.undo());
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_undo_refused_while_bot_thinks() {
        let mut s = session();
        play_pair(&mut s, "e2", "e4", "e5");
        let t = ticket(s.drop_piece("g1", "f3"));

        assert!(!s.undo());
        assert_eq!(s.history().as_slice(), &["e4", "e5", "Nf3"]);
        assert!(s.is_waiting_for_bot());
        assert_eq!(s.status(), "Black to move");

        assert_eq!(reply(&mut s, &t, "Nc6"), ReplyOutcome::Applied("Nc6".to_string()));
        assert!(s.undo());
        assert_eq!(s.history().as_slice(), &["e4", "e5"]);
        assert_eq!(s.status(), "White to move");
    }

    #[test]
    fn test_piece_at() {
        let s = session();
        assert_eq!(s.piece_at("e1").as_deref(), Some("wK"));
        assert_eq!(s.piece_at("g8").as_deref(), Some("bN"));
        assert_eq!(s.piece_at("e4"), None);
        assert_eq!(s.piece_at("zz"), None);
    }

    #[test]
    fn test_undo_takes_back_a_pair() {
        let mut s = session();
        play_pair(&mut s, "e2", "e4", "e5");
        let fen_after_first_pair = s.fen();
        play_pair(&mut s, "g1", "f3", "Nc6");

        assert!(s.undo());
        assert_eq!(s.history().as_slice(), &["e4", "e5"]);
        assert_eq!(s.fen(), fen_after_first_pair);
        assert_eq!(s.status(), "White to move");

        assert!(s.undo());
        assert!(s.history().is_empty());
        assert_eq!(s.board().placement(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = session();
        play_pair(&mut s, "d2", "d4", "d5");
        s.reset();
        assert!(s.history().is_empty());
        assert_eq!(s.status(), "White to move");
        assert_eq!(s.fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn test_snapshot() {
        let mut s = session();
        s.drop_piece("e2", "e4");
        let snapshot = s.snapshot();
        assert!(snapshot.pending);
        assert_eq!(snapshot.history.as_slice(), &["e4"]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["history"], serde_json::json!(["e4"]));
    }
}
