use crate::error::ChessError;
use crate::game::Game;
use crate::moves::{CastleSide, MoveOutcome};
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::snapshot::GameView;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct CommandResult {
    outcome: Option<MoveOutcome>,
    #[serde(flatten)]
    state: Option<GameView>,
    error: Option<String>,
}

#[derive(Serialize)]
struct TargetJson {
    row: usize,
    col: usize,
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn error_result(err: ChessError) -> JsValue {
    to_js(&CommandResult {
        outcome: None,
        state: None,
        error: Some(err.to_string()),
    })
}

/// Browser-facing handle on one match.
#[wasm_bindgen]
pub struct GameHandle {
    game: Game,
}

#[wasm_bindgen]
impl GameHandle {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GameHandle {
        GameHandle { game: Game::new() }
    }

    /// Start a fresh match.
    pub fn restart(&mut self) {
        self.game = Game::new();
    }

    pub fn get_state(&self) -> JsValue {
        to_js(&GameView::of(&self.game))
    }

    pub fn move_piece(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    ) -> JsValue {
        let squares = Position::new(from_row, from_col)
            .and_then(|from| Position::new(to_row, to_col).map(|to| (from, to)));
        match squares {
            Ok((from, to)) => {
                let outcome = self.game.move_piece(from, to);
                self.result(outcome)
            }
            Err(err) => error_result(err),
        }
    }

    pub fn castle(&mut self, white: bool, king_side: bool) -> JsValue {
        let color = if white { Color::White } else { Color::Black };
        let side = if king_side {
            CastleSide::KingSide
        } else {
            CastleSide::QueenSide
        };
        let outcome = self.game.castle(color, side);
        self.result(outcome)
    }

    /// Complete a pending promotion with "Queen", "Rook", "Bishop" or
    /// "Knight" (or their letters).
    pub fn promote(&mut self, piece: &str) -> JsValue {
        let Some(piece_type) = PieceType::from_name(piece) else {
            return error_result(ChessError::UnknownPiece(piece.to_string()));
        };
        match self.game.promote(piece_type) {
            Ok(()) => self.result(MoveOutcome::Applied),
            Err(err) => error_result(err),
        }
    }

    pub fn get_legal_targets(&mut self, row: usize, col: usize) -> JsValue {
        let targets: Vec<TargetJson> = match Position::new(row, col) {
            Ok(from) => self
                .game
                .legal_targets(from)
                .into_iter()
                .map(|p| TargetJson {
                    row: p.row(),
                    col: p.col(),
                })
                .collect(),
            Err(_) => Vec::new(),
        };
        to_js(&targets)
    }

    pub fn build_info(&self) -> String {
        crate::BUILD_TIMESTAMP.to_string()
    }
}

impl GameHandle {
    fn result(&self, outcome: MoveOutcome) -> JsValue {
        to_js(&CommandResult {
            outcome: Some(outcome),
            state: Some(GameView::of(&self.game)),
            error: None,
        })
    }
}

impl Default for GameHandle {
    fn default() -> Self {
        Self::new()
    }
}
