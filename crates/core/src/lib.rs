//! Chess Bot Core Library
//!
//! Play a game against a remote bot: a session object binds a rules engine
//! and a board widget to drag/drop input, and a controller fetches the bot's
//! replies over HTTP.

pub mod board;
pub mod config;
pub mod controller;
pub mod error;
pub mod notation;
pub mod opponent;
pub mod rules;
pub mod session;
pub mod status;

pub use board::{BoardWidget, TextBoard};
pub use config::ControllerConfig;
pub use controller::{MoveController, SharedSession};
pub use error::{Error, Result};
pub use opponent::{BotMoveRequest, BotMoveResponse, Opponent, RemoteOpponent};
pub use rules::{RulesEngine, ShakmatyRules};
pub use session::{DropOutcome, GameSession, GameSnapshot, MoveHistory, ReplyOutcome};
