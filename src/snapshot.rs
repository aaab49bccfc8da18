use serde::Serialize;

use crate::game::{Game, GameStatus, PendingPromotion};
use crate::moves::Move;
use crate::piece::{Color, PieceType};
use crate::position::Position;

/// What a renderer needs to know about one occupied square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SquareView {
    pub piece_type: PieceType,
    pub color: Color,
}

/// Everything the presentation layer reads once per frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameView {
    /// Row 0 is rank 8.
    pub squares: Vec<Vec<Option<SquareView>>>,
    pub side_to_move: Color,
    pub white_in_check: bool,
    pub black_in_check: bool,
    pub white_king: Option<Position>,
    pub black_king: Option<Position>,
    pub waiting_for_promotion_selection: bool,
    pub pending_promotion: Option<PendingPromotion>,
    pub en_passant_target: Option<Position>,
    pub status: GameStatus,
    pub last_move: Option<Move>,
    pub last_move_notation: Option<String>,
}

impl GameView {
    pub fn of(game: &Game) -> Self {
        let squares = game
            .board()
            .squares()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.map(|p| SquareView {
                            piece_type: p.piece_type,
                            color: p.color,
                        })
                    })
                    .collect()
            })
            .collect();

        GameView {
            squares,
            side_to_move: game.side_to_move(),
            white_in_check: game.is_in_check(Color::White),
            black_in_check: game.is_in_check(Color::Black),
            white_king: game.king_position(Color::White),
            black_king: game.king_position(Color::Black),
            waiting_for_promotion_selection: game.waiting_for_promotion_selection(),
            pending_promotion: game.pending_promotion(),
            en_passant_target: game.en_passant_target(),
            status: game.status(),
            last_move: game.last_move(),
            last_move_notation: game.last_move_notation().map(str::to_string),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    #[test]
    fn view_of_the_start_position() {
        let view = GameView::of(&Game::new());
        assert_eq!(view.squares.len(), 8);
        assert_eq!(
            view.squares[7][4],
            Some(SquareView {
                piece_type: PieceType::King,
                color: Color::White
            })
        );
        assert_eq!(view.squares[4][4], None);
        assert_eq!(view.side_to_move, Color::White);
        assert!(!view.white_in_check && !view.black_in_check);
        assert_eq!(view.white_king, Some(sq("e1")));
    }

    #[test]
    fn json_shape() {
        let mut game = Game::new();
        game.move_piece(sq("e2"), sq("e4"));
        let value: Value = serde_json::from_str(&GameView::of(&game).to_json().unwrap()).unwrap();
        assert_eq!(value["side_to_move"], json!("Black"));
        assert_eq!(value["en_passant_target"], json!({"row": 5, "col": 4}));
        assert_eq!(value["squares"][4][4], json!({"piece_type": "Pawn", "color": "White"}));
        assert_eq!(value["squares"][6][4], Value::Null);
        assert_eq!(value["status"], json!("Ongoing"));
        assert_eq!(value["last_move_notation"], json!("e4"));
        assert_eq!(value["waiting_for_promotion_selection"], json!(false));
    }

    #[test]
    fn checkmate_is_visible_in_the_view() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            game.move_piece(sq(from), sq(to));
        }
        let view = GameView::of(&game);
        assert!(view.white_in_check);
        assert_eq!(view.status, GameStatus::Checkmate { winner: Color::Black });
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["status"], json!({"Checkmate": {"winner": "Black"}}));
    }
}
