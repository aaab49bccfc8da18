pub mod board;
pub mod error;
pub mod game;
pub mod moves;
pub mod piece;
pub mod position;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::Board;
pub use error::ChessError;
pub use game::{Game, GameStatus};
pub use moves::{CastleSide, MoveOutcome, Rejection};
pub use piece::{Color, Piece, PieceType};
pub use position::Position;

/// Build time stamped by build.rs, shown by the binaries and the wasm bridge.
pub const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP");
