//! Reduction of bot move text to a minimal move descriptor
//!
//! The remote service answers with human-readable notation (`"Nbxd7+"`,
//! `"exd5"`, `"e8=Q"`, `"O-O"`). Origin disambiguation, capture markers and
//! annotations are dropped; the rules engine resolves the remaining
//! descriptor against its current position.

use shakmaty::{CastlingSide, Role, Square};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty move text")]
    Empty,

    #[error("unsupported move text: {0}")]
    Unsupported(String),

    #[error("no destination square in: {0}")]
    MissingDestination(String),

    #[error("bad promotion in: {0}")]
    BadPromotion(String),
}

/// Piece, destination and promotion of a non-castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDescriptor {
    pub piece: Role,
    pub destination: Square,
    pub promotion: Option<Role>,
}

impl fmt::Display for MoveDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.piece != Role::Pawn {
            write!(f, "{}", self.piece.upper_char())?;
        }
        write!(f, "{}", self.destination)?;
        if let Some(role) = self.promotion {
            write!(f, "={}", role.upper_char())?;
        }
        Ok(())
    }
}

/// A bot move after reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotMove {
    /// Handed to the rules engine verbatim as `O-O` / `O-O-O`.
    Castle(CastlingSide),
    Reduced(MoveDescriptor),
}

impl fmt::Display for BotMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotMove::Castle(CastlingSide::KingSide) => f.write_str("O-O"),
            BotMove::Castle(CastlingSide::QueenSide) => f.write_str("O-O-O"),
            BotMove::Reduced(descriptor) => write!(f, "{}", descriptor),
        }
    }
}

/// Parses bot move text into a [`BotMove`].
pub fn reduce(text: &str) -> Result<BotMove, NotationError> {
    let trimmed = text
        .trim()
        .trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));

    if trimmed.is_empty() {
        return Err(NotationError::Empty);
    }
    if !trimmed.is_ascii() {
        return Err(NotationError::Unsupported(text.to_string()));
    }

    match trimmed {
        "O-O" | "0-0" => return Ok(BotMove::Castle(CastlingSide::KingSide)),
        "O-O-O" | "0-0-0" => return Ok(BotMove::Castle(CastlingSide::QueenSide)),
        _ => {}
    }

    let (piece, rest) = match trimmed.as_bytes()[0] {
        b'N' => (Role::Knight, &trimmed[1..]),
        b'B' => (Role::Bishop, &trimmed[1..]),
        b'R' => (Role::Rook, &trimmed[1..]),
        b'Q' => (Role::Queen, &trimmed[1..]),
        b'K' => (Role::King, &trimmed[1..]),
        _ => (Role::Pawn, trimmed),
    };

    let (body, promotion) = split_promotion(rest, text)?;
    if promotion.is_some() && piece != Role::Pawn {
        return Err(NotationError::BadPromotion(text.to_string()));
    }

    if body.len() < 2 {
        return Err(NotationError::MissingDestination(text.to_string()));
    }
    let (prefix, dest) = body.split_at(body.len() - 2);
    let destination: Square = dest
        .parse()
        .map_err(|_| NotationError::MissingDestination(text.to_string()))?;

    // Whatever sits between the piece and the destination is origin
    // disambiguation or a capture marker.
    if !prefix
        .chars()
        .all(|c| matches!(c, 'a'..='h' | '1'..='8' | 'x' | '-' | ':'))
    {
        return Err(NotationError::Unsupported(text.to_string()));
    }

    Ok(BotMove::Reduced(MoveDescriptor {
        piece,
        destination,
        promotion,
    }))
}

/// Splits `=Q` style or trailing-letter (`e8Q`, `e7e8q`) promotions off the move body.
fn split_promotion<'a>(
    rest: &'a str,
    original: &str,
) -> Result<(&'a str, Option<Role>), NotationError> {
    if let Some((body, suffix)) = rest.split_once('=') {
        let mut chars = suffix.chars();
        let role = match (chars.next().and_then(promotion_role), chars.next()) {
            (Some(role), None) => role,
            _ => return Err(NotationError::BadPromotion(original.to_string())),
        };
        return Ok((body, Some(role)));
    }

    let bytes = rest.as_bytes();
    if bytes.len() >= 3 && bytes[bytes.len() - 2].is_ascii_digit() {
        if let Some(role) = promotion_role(bytes[bytes.len() - 1] as char) {
            return Ok((&rest[..rest.len() - 1], Some(role)));
        }
    }

    Ok((rest, None))
}

fn promotion_role(c: char) -> Option<Role> {
    match c.to_ascii_uppercase() {
        'N' => Some(Role::Knight),
        'B' => Some(Role::Bishop),
        'R' => Some(Role::Rook),
        'Q' => Some(Role::Queen),
        _ => None,
    }
}
