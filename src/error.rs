use thiserror::Error;

use crate::piece::PieceType;
use crate::position::Position;

/// Errors raised for malformed input. Illegal moves are not errors; they come
/// back as [`crate::game::MoveOutcome::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("square ({row}, {col}) is off the board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("invalid square notation: {0:?}")]
    InvalidSquare(String),

    #[error("piece on {cell} claims to stand on {stored}")]
    MisplacedPiece { cell: Position, stored: Position },

    #[error("unknown piece: {0:?}")]
    UnknownPiece(String),

    #[error("no pawn is waiting for promotion")]
    NoPromotionPending,

    #[error("cannot promote to {0:?}")]
    InvalidPromotion(PieceType),
}
