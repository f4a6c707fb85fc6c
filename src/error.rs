//! Error types for the host boundary
//!
//! The rules and search code are total over the values they produce
//! themselves, so these errors only show up where text typed by a player
//! is turned into squares and moves.

use crate::piece::PieceType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChessError {
    /// Square text outside `a1`..`h8`
    #[error("invalid coordinate: {0:?} (expected a1..h8)")]
    InvalidCoordinate(String),

    /// Move text that is not `<from><to>[promotion]`
    #[error("malformed move: {0:?} (expected e.g. e2e4 or e7e8q)")]
    MalformedMove(String),

    /// A well formed move that is not in the legal move list
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A promotion choice was attached to a move that does not promote
    #[error("move does not promote a pawn")]
    NotAPromotion,

    /// A pawn can only become a queen, rook, bishop or knight
    #[error("a pawn cannot promote to {0:?}")]
    InvalidPromotion(PieceType),

    #[error("console input failed: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("bad command pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type ChessResult<T> = Result<T, ChessError>;
