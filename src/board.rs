use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// 8×8 mailbox. Each occupied cell holds a piece whose `position` is that
/// cell; every mutator below keeps the two in step.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

#[derive(Deserialize)]
struct RawBoard {
    squares: [[Option<Piece>; 8]; 8],
}

impl TryFrom<RawBoard> for Board {
    type Error = ChessError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let board = Board {
            squares: raw.squares,
        };
        for cell in Position::all() {
            if let Some(piece) = board.piece_at(cell) {
                if piece.position != cell {
                    return Err(ChessError::MisplacedPiece {
                        cell,
                        stored: piece.position,
                    });
                }
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard starting layout: Black on rows 0-1, White on rows 6-7.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            for color in [Color::White, Color::Black] {
                board.place(piece_type, color, Position::at(color.back_rank(), col));
                board.place(PieceType::Pawn, color, Position::at(color.pawn_rank(), col));
            }
        }
        board
    }

    pub fn squares(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.row()][pos.col()]
    }

    pub fn is_empty(&self, pos: Position) -> bool {
        self.piece_at(pos).is_none()
    }

    /// Put a new piece on `pos`, replacing whatever was there.
    pub fn place(&mut self, piece_type: PieceType, color: Color, pos: Position) -> Piece {
        let piece = Piece::new(piece_type, color, pos);
        self.squares[pos.row()][pos.col()] = Some(piece);
        piece
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.squares[pos.row()][pos.col()].take()
    }

    /// Relocate the piece on `from` to `to` without any rule checks and
    /// return whatever stood on `to`. Does nothing if `from` is empty.
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        let Some(mut piece) = self.remove(from) else {
            return None;
        };
        piece.position = to;
        self.squares[to.row()][to.col()].replace(piece)
    }

    /// All pieces, row by row from Black's back rank.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        self.squares.iter().flatten().filter_map(|cell| *cell)
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces_of(color)
            .find(|p| p.piece_type == PieceType::King)
            .map(|p| p.position)
    }

    /// True when every square strictly between `from` and `to` is empty.
    /// Only meaningful for squares sharing a rank, file or diagonal.
    pub fn path_is_clear(&self, from: Position, to: Position) -> bool {
        let dr = (to.row() as i32 - from.row() as i32).signum();
        let dc = (to.col() as i32 - from.col() as i32).signum();
        let mut current = from.offset(dr, dc);
        while let Some(pos) = current {
            if pos == to {
                return true;
            }
            if !self.is_empty(pos) {
                return false;
            }
            current = pos.offset(dr, dc);
        }
        false
    }

    /// Short algebraic display string for moving the piece on `from` to
    /// `to`, computed before the move is made: "e4", "Nf3", "exd5", "Qxh4",
    /// "O-O". Check markers and promotion suffixes are added by the game.
    pub fn notation(&self, from: Position, to: Position) -> String {
        let Some(piece) = self.piece_at(from) else {
            return String::new();
        };
        let col_diff = to.col() as i32 - from.col() as i32;
        if piece.piece_type == PieceType::King && col_diff.abs() == 2 {
            return if col_diff > 0 { "O-O" } else { "O-O-O" }.to_string();
        }
        let mut s = String::new();
        match piece.piece_type.notation_letter() {
            Some(letter) => {
                s.push(letter);
                if !self.is_empty(to) {
                    s.push('x');
                }
            }
            // A diagonal pawn move is always a capture, en passant included
            None if col_diff != 0 => {
                s.push(from.file_char());
                s.push('x');
            }
            None => {}
        }
        s.push_str(&to.to_algebraic());
        s
    }

    /// Apply a move tentatively. The returned guard derefs to the changed
    /// board and restores the exact prior contents when dropped.
    /// `also_remove` lifts an extra piece for the duration of the trial, as
    /// needed for en-passant captures.
    pub fn trial_move(
        &mut self,
        from: Position,
        to: Position,
        also_remove: Option<Position>,
    ) -> TrialMove<'_> {
        let removed = also_remove.and_then(|pos| self.remove(pos));
        let moved = !self.is_empty(from);
        let captured = self.move_piece(from, to);
        TrialMove {
            board: self,
            from,
            to,
            moved,
            captured,
            removed,
        }
    }

    /// Plain text diagram, rank 8 at the top.
    pub fn draw(&self) -> String {
        let mut out = String::new();
        for (row, cells) in self.squares.iter().enumerate() {
            out.push_str(&format!("{} ", 8 - row));
            for cell in cells {
                out.push(cell.map(|p| p.symbol()).unwrap_or('·'));
                out.push(' ');
            }
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.draw())
    }
}

/// A move applied to a board that is undone when this guard drops.
pub struct TrialMove<'a> {
    board: &'a mut Board,
    from: Position,
    to: Position,
    moved: bool,
    captured: Option<Piece>,
    removed: Option<Piece>,
}

impl Deref for TrialMove<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &*self.board
    }
}

impl Drop for TrialMove<'_> {
    fn drop(&mut self) {
        if self.moved {
            self.board.move_piece(self.to, self.from);
        }
        if let Some(captured) = self.captured.take() {
            self.board.squares[self.to.row()][self.to.col()] = Some(captured);
        }
        if let Some(removed) = self.removed.take() {
            let pos = removed.position;
            self.board.squares[pos.row()][pos.col()] = Some(removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    /// Every one of the 64 squares matches the standard setup.
    #[test]
    fn standard_layout() {
        let board = Board::standard();
        for pos in Position::all() {
            let expected = match pos.row() {
                0 => Some((BACK_RANK[pos.col()], Color::Black)),
                1 => Some((PieceType::Pawn, Color::Black)),
                6 => Some((PieceType::Pawn, Color::White)),
                7 => Some((BACK_RANK[pos.col()], Color::White)),
                _ => None,
            };
            let actual = board.piece_at(pos).map(|p| (p.piece_type, p.color));
            assert_eq!(actual, expected, "square {pos}");
        }
        assert_eq!(board.find_king(Color::White), Some(sq("e1")));
        assert_eq!(board.find_king(Color::Black), Some(sq("e8")));
        assert_eq!(board.piece_at(sq("d1")).map(|p| p.piece_type), Some(PieceType::Queen));
    }

    #[test]
    fn stored_positions_match_cells() {
        let board = Board::standard();
        for pos in Position::all() {
            if let Some(p) = board.piece_at(pos) {
                assert_eq!(p.position, pos);
            }
        }
        assert_eq!(board.pieces().count(), 32);
    }

    /// A serialised board whose piece disagrees with its cell is refused.
    #[test]
    fn deserialising_checks_stored_positions() {
        let mut value = serde_json::to_value(Board::standard()).unwrap();
        let round_trip: Board = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(round_trip, Board::standard());

        // Claim the e2 pawn stands on e4
        value["squares"][6][4]["position"]["row"] = serde_json::json!(4);
        let err = serde_json::from_value::<Board>(value).unwrap_err();
        assert!(err.to_string().contains("e2"), "{err}");
    }

    /// Only the two touched squares change, and the moved piece learns its
    /// new square.
    #[test]
    fn move_piece_touches_only_source_and_destination() {
        let mut board = Board::standard();
        let before = board.clone();
        let captured = board.move_piece(sq("b1"), sq("c3"));
        assert_eq!(captured, None);
        for pos in Position::all() {
            if pos == sq("b1") || pos == sq("c3") {
                continue;
            }
            assert_eq!(board.piece_at(pos), before.piece_at(pos));
        }
        assert!(board.is_empty(sq("b1")));
        let knight = board.piece_at(sq("c3")).unwrap();
        assert_eq!(knight.position, sq("c3"));
        assert_eq!(knight.piece_type, PieceType::Knight);
    }

    #[test]
    fn move_piece_returns_the_captured_piece() {
        let mut board = Board::standard();
        let captured = board.move_piece(sq("d1"), sq("d7")).unwrap();
        assert_eq!(captured.piece_type, PieceType::Pawn);
        assert_eq!(captured.color, Color::Black);
        assert_eq!(board.pieces().count(), 31);
    }

    #[test]
    fn move_from_empty_square_is_a_no_op() {
        let mut board = Board::standard();
        let before = board.clone();
        assert_eq!(board.move_piece(sq("e4"), sq("e5")), None);
        assert_eq!(board, before);
    }

    #[test]
    fn path_clearance() {
        let board = Board::standard();
        assert!(board.path_is_clear(sq("a2"), sq("a7")));
        assert!(!board.path_is_clear(sq("a1"), sq("a3")));
        assert!(board.path_is_clear(sq("c1"), sq("b2")));
        assert!(!board.path_is_clear(sq("c1"), sq("h6")));
    }

    #[test]
    fn trial_move_reverts_on_drop() {
        let mut board = Board::standard();
        board.move_piece(sq("e2"), sq("e4"));
        board.move_piece(sq("d7"), sq("d5"));
        let before = board.clone();
        {
            let trial = board.trial_move(sq("e4"), sq("d5"), None);
            assert_eq!(trial.piece_at(sq("d5")).map(|p| p.color), Some(Color::White));
            assert!(trial.is_empty(sq("e4")));
        }
        assert_eq!(board, before);
    }

    #[test]
    fn trial_move_restores_the_extra_removed_piece() {
        let mut board = Board::empty();
        board.place(PieceType::Pawn, Color::White, sq("e5"));
        board.place(PieceType::Pawn, Color::Black, sq("f5"));
        let before = board.clone();
        {
            let trial = board.trial_move(sq("e5"), sq("f6"), Some(sq("f5")));
            assert!(trial.is_empty(sq("f5")));
            assert!(trial.piece_at(sq("f6")).is_some());
        }
        assert_eq!(board, before);
    }

    #[test]
    fn notation_strings() {
        let mut board = Board::standard();
        assert_eq!(board.notation(sq("e2"), sq("e4")), "e4");
        assert_eq!(board.notation(sq("g1"), sq("f3")), "Nf3");
        board.move_piece(sq("e2"), sq("e4"));
        board.move_piece(sq("d7"), sq("d5"));
        assert_eq!(board.notation(sq("e4"), sq("d5")), "exd5");
        board.move_piece(sq("d8"), sq("d6"));
        assert_eq!(board.notation(sq("d6"), sq("h2")), "Qxh2");
        assert_eq!(board.notation(sq("e1"), sq("g1")), "O-O");
        assert_eq!(board.notation(sq("e1"), sq("c1")), "O-O-O");
        assert_eq!(board.notation(sq("e5"), sq("e6")), "");
    }

    #[test]
    fn draw_puts_rank_eight_on_top() {
        let text = Board::standard().draw();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("8 ♜"));
        assert!(text.ends_with("  a b c d e f g h\n"));
    }
}
