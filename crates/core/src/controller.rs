//! Move controller: a shared session plus the delayed bot request
//!
//! Each accepted player move spawns one tokio task that waits for the
//! configured delay, asks the opponent for a reply and applies it. The task
//! handle is kept so that reset, undo or a newer move can abort it; replies
//! that still arrive late are dropped by the session's generation check.
//!
//! Methods that can schedule a bot request must be called inside a tokio
//! runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::board::{BoardWidget, TextBoard};
use crate::config::ControllerConfig;
use crate::opponent::Opponent;
use crate::rules::{RulesEngine, ShakmatyRules};
use crate::session::{BotTicket, DropOutcome, GameSession, GameSnapshot};

pub type SharedSession<R = ShakmatyRules, B = TextBoard> = Arc<Mutex<GameSession<R, B>>>;

pub struct MoveController<O, R = ShakmatyRules, B = TextBoard> {
    session: SharedSession<R, B>,
    opponent: Arc<O>,
    config: ControllerConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<O: Opponent> MoveController<O> {
    /// Controller for a standard game, bot side taken from `config`.
    pub fn standard(opponent: O, config: ControllerConfig) -> Self {
        let session = GameSession::standard(config.bot_side);
        Self::new(session, opponent, config)
    }
}

impl<O, R, B> MoveController<O, R, B>
where
    O: Opponent,
    R: RulesEngine + Send + 'static,
    B: BoardWidget + Send + 'static,
{
    pub fn new(session: GameSession<R, B>, opponent: O, config: ControllerConfig) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            opponent: Arc::new(opponent),
            config,
            task: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Runs `f` with the session locked. Do not hold on to anything across an await.
    pub fn with_session<T>(&self, f: impl FnOnce(&GameSession<R, B>) -> T) -> T {
        f(&lock(&self.session))
    }

    pub fn snapshot(&self) -> GameSnapshot {
        lock(&self.session).snapshot()
    }

    pub fn drag_start(&self, piece: &str) -> bool {
        lock(&self.session).can_drag(piece)
    }

    /// Plays the drop and, if the game goes on, schedules the bot reply.
    pub fn drop_piece(&self, source: &str, target: &str) -> DropOutcome {
        let outcome = lock(&self.session).drop_piece(source, target);

        if let DropOutcome::Accepted {
            reply: Some(ticket),
            ..
        } = &outcome
        {
            self.schedule(ticket.clone());
        }

        outcome
    }

    pub fn reset(&self) {
        self.cancel();
        lock(&self.session).reset();
    }

    pub fn undo(&self) -> bool {
        let undone = lock(&self.session).undo();
        if undone {
            self.cancel();
        }
        undone
    }

    /// Waits for the outstanding bot request, if any, to finish.
    pub async fn settle(&self) {
        let handle = lock(&self.task).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                debug!("bot task ended early: {}", e);
            }
        }
    }

    fn schedule(&self, ticket: BotTicket) {
        let session = Arc::clone(&self.session);
        let opponent = Arc::clone(&self.opponent);
        let delay = self.config.reply_delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let result = opponent.request_move(&ticket.request).await;
            lock(&session).apply_bot_reply(ticket.generation, result);
        });

        if let Some(previous) = lock(&self.task).replace(handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        if let Some(handle) = lock(&self.task).take() {
            debug!("cancelling pending bot request");
            handle.abort();
        }
    }
}

impl<O, R, B> Drop for MoveController<O, R, B> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
