use serde::{Deserialize, Serialize};

use crate::position::Position;

/// A from/to pair, as recorded for the last move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub to: Position,
}

impl Move {
    /// Coordinate notation, e.g. "e2e4".
    pub fn to_coordinate(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// Parse coordinate notation; trailing characters (a promotion letter)
    /// are ignored.
    pub fn from_coordinate(s: &str) -> Option<Move> {
        let from = Position::from_algebraic(s.get(0..2)?).ok()?;
        let to = Position::from_algebraic(s.get(2..4)?).ok()?;
        Some(Move { from, to })
    }
}

/// En-passant state, valid for exactly the move after a double pawn push.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnPassant {
    /// Square the pawn passed over.
    pub target: Option<Position>,
    /// Square the double-pushed pawn landed on; this is the pawn removed by
    /// an en-passant capture.
    pub double_moved_pawn: Option<Position>,
}

impl EnPassant {
    pub fn clear(&mut self) {
        *self = EnPassant::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// Column of the rook on its home square.
    pub fn rook_col(self) -> usize {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    /// Column the king lands on.
    pub fn king_target_col(self) -> usize {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    /// Column the rook lands on, next to the king on the inner side.
    pub fn rook_target_col(self) -> usize {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }

    pub fn notation(self) -> &'static str {
        match self {
            CastleSide::KingSide => "O-O",
            CastleSide::QueenSide => "O-O-O",
        }
    }
}

/// Why a command was refused. The board is unchanged in every case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    NoPiece,
    WrongTurn,
    /// The piece cannot move that way.
    IllegalMove,
    /// The move would leave the mover's own king in check.
    ExposesKing,
    CastlingNotAllowed,
    /// A pawn is waiting for its promotion choice.
    PromotionPending,
}

/// Result of [`crate::game::Game::move_piece`] and
/// [`crate::game::Game::castle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Applied,
    /// The pawn reached the last rank. The board changed but the turn did
    /// not advance; [`crate::game::Game::promote`] completes the move.
    PendingPromotion,
    Rejected(Rejection),
}

impl MoveOutcome {
    /// True only for a completed move with the turn advanced.
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, MoveOutcome::Rejected(_))
    }
}
