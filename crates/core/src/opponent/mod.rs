//! Remote opponent service: request/response types and HTTP client

mod client;
mod types;

pub use client::{Opponent, RemoteOpponent};
pub use types::*;
