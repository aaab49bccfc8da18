use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::EnPassant;
use crate::position::Position;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a forward pawn step. White starts on row 6 and moves
    /// toward row 0.
    pub fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    pub fn back_rank(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_rank(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The rank a pawn of this color promotes on.
    pub fn promotion_rank(self) -> usize {
        self.opposite().back_rank()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Letter used in move notation; pawns have none.
    pub fn notation_letter(self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            PieceType::Knight => Some('N'),
            PieceType::Bishop => Some('B'),
            PieceType::Rook => Some('R'),
            PieceType::Queen => Some('Q'),
            PieceType::King => Some('K'),
        }
    }

    pub fn from_letter(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Parse a full name ("Queen") or a lone notation letter ("q").
    pub fn from_name(s: &str) -> Option<PieceType> {
        match s {
            "Pawn" => Some(PieceType::Pawn),
            "Knight" => Some(PieceType::Knight),
            "Bishop" => Some(PieceType::Bishop),
            "Rook" => Some(PieceType::Rook),
            "Queen" => Some(PieceType::Queen),
            "King" => Some(PieceType::King),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_letter(c),
                    _ => None,
                }
            }
        }
    }

    pub fn can_promote_to(self) -> bool {
        !matches!(self, PieceType::Pawn | PieceType::King)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
    /// Always equal to the board cell holding this piece.
    pub position: Position,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color, position: Position) -> Self {
        Piece {
            piece_type,
            color,
            position,
        }
    }

    /// Unicode glyph for terminal output.
    pub fn symbol(&self) -> char {
        match (self.color, self.piece_type) {
            (Color::White, PieceType::King) => '♔',
            (Color::White, PieceType::Queen) => '♕',
            (Color::White, PieceType::Rook) => '♖',
            (Color::White, PieceType::Bishop) => '♗',
            (Color::White, PieceType::Knight) => '♘',
            (Color::White, PieceType::Pawn) => '♙',
            (Color::Black, PieceType::King) => '♚',
            (Color::Black, PieceType::Queen) => '♛',
            (Color::Black, PieceType::Rook) => '♜',
            (Color::Black, PieceType::Bishop) => '♝',
            (Color::Black, PieceType::Knight) => '♞',
            (Color::Black, PieceType::Pawn) => '♟',
        }
    }

    /// Pseudo-legal move test: does the target follow this piece's movement
    /// rule on `board`? King safety is not considered and castling is not a
    /// move of this predicate.
    pub fn is_valid_move(&self, target: Position, board: &Board, en_passant: &EnPassant) -> bool {
        if target == self.position {
            return false;
        }
        match self.piece_type {
            PieceType::Pawn => self.is_valid_pawn_move(target, board, en_passant),
            PieceType::Knight => self.is_valid_knight_move(target, board),
            PieceType::Bishop => self.is_valid_bishop_move(target, board),
            PieceType::Rook => self.is_valid_rook_move(target, board),
            PieceType::Queen => {
                self.is_valid_bishop_move(target, board) || self.is_valid_rook_move(target, board)
            }
            PieceType::King => self.is_valid_king_move(target, board),
        }
    }

    fn deltas(&self, target: Position) -> (i32, i32) {
        (
            target.row() as i32 - self.position.row() as i32,
            target.col() as i32 - self.position.col() as i32,
        )
    }

    /// Destination is empty or holds an opposing piece.
    fn can_land_on(&self, target: Position, board: &Board) -> bool {
        board
            .piece_at(target)
            .map(|p| p.color != self.color)
            .unwrap_or(true)
    }

    fn is_valid_pawn_move(&self, target: Position, board: &Board, en_passant: &EnPassant) -> bool {
        let dir = self.color.forward();
        let (dr, dc) = self.deltas(target);
        let forward = dr * dir;

        // Single push
        if dc == 0 && forward == 1 {
            return board.is_empty(target);
        }

        // Double push from the starting rank, both squares empty
        if dc == 0 && forward == 2 && self.position.row() == self.color.pawn_rank() {
            let passed = self.position.offset(dir, 0);
            return passed.map(|p| board.is_empty(p)).unwrap_or(false) && board.is_empty(target);
        }

        if dc.abs() == 1 && forward == 1 {
            match board.piece_at(target) {
                Some(p) => return p.color != self.color,
                None => return self.is_en_passant_capture(target, board, en_passant),
            }
        }

        false
    }

    fn is_en_passant_capture(
        &self,
        target: Position,
        board: &Board,
        en_passant: &EnPassant,
    ) -> bool {
        if en_passant.target != Some(target) {
            return false;
        }
        en_passant
            .double_moved_pawn
            .and_then(|sq| board.piece_at(sq))
            .map(|p| p.piece_type == PieceType::Pawn && p.color != self.color)
            .unwrap_or(false)
    }

    fn is_valid_knight_move(&self, target: Position, board: &Board) -> bool {
        let (dr, dc) = self.deltas(target);
        matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1)) && self.can_land_on(target, board)
    }

    fn is_valid_bishop_move(&self, target: Position, board: &Board) -> bool {
        let (dr, dc) = self.deltas(target);
        dr.abs() == dc.abs()
            && dr != 0
            && board.path_is_clear(self.position, target)
            && self.can_land_on(target, board)
    }

    fn is_valid_rook_move(&self, target: Position, board: &Board) -> bool {
        let (dr, dc) = self.deltas(target);
        (dr == 0) != (dc == 0)
            && board.path_is_clear(self.position, target)
            && self.can_land_on(target, board)
    }

    fn is_valid_king_move(&self, target: Position, board: &Board) -> bool {
        let (dr, dc) = self.deltas(target);
        dr.abs() <= 1 && dc.abs() <= 1 && (dr, dc) != (0, 0) && self.can_land_on(target, board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn no_ep() -> EnPassant {
        EnPassant::default()
    }

    #[test]
    fn pawn_pushes_from_start_rank() {
        let board = Board::standard();
        let pawn = board.piece_at(sq("e2")).unwrap();
        assert!(pawn.is_valid_move(sq("e3"), &board, &no_ep()));
        assert!(pawn.is_valid_move(sq("e4"), &board, &no_ep()));
        assert!(!pawn.is_valid_move(sq("e5"), &board, &no_ep()));
        // Never backwards or sideways
        assert!(!pawn.is_valid_move(sq("e1"), &board, &no_ep()));
        assert!(!pawn.is_valid_move(sq("d2"), &board, &no_ep()));

        let black = board.piece_at(sq("d7")).unwrap();
        assert!(black.is_valid_move(sq("d5"), &board, &no_ep()));
        assert!(!black.is_valid_move(sq("d8"), &board, &no_ep()));
    }

    /// A piece on the passed-over square blocks the double push.
    #[test]
    fn pawn_double_push_needs_both_squares_empty() {
        let mut board = Board::standard();
        board.place(PieceType::Knight, Color::Black, sq("e3"));
        let pawn = board.piece_at(sq("e2")).unwrap();
        assert!(!pawn.is_valid_move(sq("e3"), &board, &no_ep()));
        assert!(!pawn.is_valid_move(sq("e4"), &board, &no_ep()));
    }

    #[test]
    fn pawn_double_push_only_from_start_rank() {
        let mut board = Board::empty();
        let pawn = board.place(PieceType::Pawn, Color::White, sq("e3"));
        assert!(pawn.is_valid_move(sq("e4"), &board, &no_ep()));
        assert!(!pawn.is_valid_move(sq("e5"), &board, &no_ep()));
    }

    #[test]
    fn pawn_captures_diagonally_only_onto_enemies() {
        let mut board = Board::empty();
        let pawn = board.place(PieceType::Pawn, Color::White, sq("e4"));
        assert!(!pawn.is_valid_move(sq("d5"), &board, &no_ep()));
        board.place(PieceType::Rook, Color::Black, sq("d5"));
        board.place(PieceType::Rook, Color::White, sq("f5"));
        assert!(pawn.is_valid_move(sq("d5"), &board, &no_ep()));
        assert!(!pawn.is_valid_move(sq("f5"), &board, &no_ep()));
        // Straight ahead is not a capture
        board.place(PieceType::Rook, Color::Black, sq("e5"));
        assert!(!pawn.is_valid_move(sq("e5"), &board, &no_ep()));
    }

    #[test]
    fn pawn_en_passant_needs_matching_target_and_enemy_pawn() {
        let mut board = Board::empty();
        let pawn = board.place(PieceType::Pawn, Color::White, sq("e5"));
        board.place(PieceType::Pawn, Color::Black, sq("f5"));
        let ep = EnPassant {
            target: Some(sq("f6")),
            double_moved_pawn: Some(sq("f5")),
        };
        assert!(pawn.is_valid_move(sq("f6"), &board, &ep));
        assert!(!pawn.is_valid_move(sq("d6"), &board, &ep));
        assert!(!pawn.is_valid_move(sq("f6"), &board, &no_ep()));

        // A friendly pawn on the double-move square does not count
        board.place(PieceType::Pawn, Color::White, sq("f5"));
        assert!(!pawn.is_valid_move(sq("f6"), &board, &ep));
    }

    #[test]
    fn knight_moves_in_an_l() {
        let board = Board::standard();
        let knight = board.piece_at(sq("g1")).unwrap();
        assert!(knight.is_valid_move(sq("f3"), &board, &no_ep()));
        assert!(knight.is_valid_move(sq("h3"), &board, &no_ep()));
        // Own pawn on e2
        assert!(!knight.is_valid_move(sq("e2"), &board, &no_ep()));
        assert!(!knight.is_valid_move(sq("g3"), &board, &no_ep()));
    }

    #[test]
    fn sliders_are_blocked_by_intervening_pieces() {
        let mut board = Board::empty();
        let rook = board.place(PieceType::Rook, Color::White, sq("a1"));
        let bishop = board.place(PieceType::Bishop, Color::White, sq("c1"));
        let queen = board.place(PieceType::Queen, Color::White, sq("d4"));
        assert!(rook.is_valid_move(sq("a8"), &board, &no_ep()));
        assert!(!rook.is_valid_move(sq("d1"), &board, &no_ep()));
        assert!(!rook.is_valid_move(sq("b2"), &board, &no_ep()));

        assert!(bishop.is_valid_move(sq("h6"), &board, &no_ep()));
        assert!(!bishop.is_valid_move(sq("c2"), &board, &no_ep()));

        board.place(PieceType::Pawn, Color::Black, sq("f6"));
        assert!(queen.is_valid_move(sq("f6"), &board, &no_ep()));
        assert!(!queen.is_valid_move(sq("g7"), &board, &no_ep()));
        assert!(queen.is_valid_move(sq("d8"), &board, &no_ep()));
        assert!(!queen.is_valid_move(sq("e6"), &board, &no_ep()));
    }

    #[test]
    fn king_steps_once_and_never_castles_here() {
        let mut board = Board::empty();
        let king = board.place(PieceType::King, Color::White, sq("e1"));
        board.place(PieceType::Rook, Color::White, sq("h1"));
        assert!(king.is_valid_move(sq("f2"), &board, &no_ep()));
        assert!(!king.is_valid_move(sq("e1"), &board, &no_ep()));
        assert!(!king.is_valid_move(sq("g1"), &board, &no_ep()));
        assert!(!king.is_valid_move(sq("e3"), &board, &no_ep()));
    }

    #[test]
    fn promotion_choices_exclude_pawn_and_king() {
        assert!(PieceType::Queen.can_promote_to());
        assert!(PieceType::Knight.can_promote_to());
        assert!(!PieceType::Pawn.can_promote_to());
        assert!(!PieceType::King.can_promote_to());
        assert_eq!(PieceType::from_letter('n'), Some(PieceType::Knight));
    }

    #[test]
    fn names_are_whole_words_or_single_letters() {
        assert_eq!(PieceType::from_name("Queen"), Some(PieceType::Queen));
        assert_eq!(PieceType::from_name("n"), Some(PieceType::Knight));
        assert_eq!(PieceType::from_name("R"), Some(PieceType::Rook));
        for bad in ["", "Qwerty", "Qu", "queenx", "x"] {
            assert_eq!(PieceType::from_name(bad), None, "{bad:?}");
        }
    }
}
