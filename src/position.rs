use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// A square on the 8×8 grid.
///
/// Row 0 is Black's back rank (rank 8) and rows grow toward White, so row 7
/// is rank 1. Column 0 is file a.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct Position {
    row: usize,
    col: usize,
}

#[derive(Deserialize)]
struct RawPosition {
    row: usize,
    col: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = ChessError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
    }
}

impl Position {
    pub fn new(row: usize, col: usize) -> Result<Self, ChessError> {
        if row < 8 && col < 8 {
            Ok(Position { row, col })
        } else {
            Err(ChessError::OutOfBounds {
                row: i32::try_from(row).unwrap_or(i32::MAX),
                col: i32::try_from(col).unwrap_or(i32::MAX),
            })
        }
    }

    /// Bounds-checked construction from possibly negative coordinates, as
    /// produced by adding an offset to another square.
    pub fn from_signed(row: i32, col: i32) -> Result<Self, ChessError> {
        if Self::in_bounds(row, col) {
            Ok(Position {
                row: row as usize,
                col: col as usize,
            })
        } else {
            Err(ChessError::OutOfBounds { row, col })
        }
    }

    /// For rule tables whose coordinates are known to be on the board.
    pub(crate) const fn at(row: usize, col: usize) -> Position {
        Position { row, col }
    }

    pub fn in_bounds(row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    /// Step by a signed offset, `None` when it leaves the board.
    pub fn offset(&self, dr: i32, dc: i32) -> Option<Position> {
        Self::from_signed(self.row as i32 + dr, self.col as i32 + dc).ok()
    }

    /// Parse a square such as "e4".
    pub fn from_algebraic(s: &str) -> Result<Self, ChessError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        Self::new((b'8' - rank) as usize, (file - b'a') as usize)
    }

    pub fn to_algebraic(&self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'8' - self.row as u8) as char;
        format!("{file}{rank}")
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.col as u8) as char
    }

    /// Every square, row by row from Black's back rank.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..8).flat_map(|row| (0..8).map(move |col| Position { row, col }))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            Position::new(8, 0),
            Err(ChessError::OutOfBounds { row: 8, col: 0 })
        );
        assert_eq!(
            Position::from_signed(3, -1),
            Err(ChessError::OutOfBounds { row: 3, col: -1 })
        );
        assert!(Position::new(7, 7).is_ok());
    }

    /// Huge indices must not wrap around into a real square.
    #[test]
    fn rejects_indices_beyond_i32() {
        let huge = (1usize << 32) + 3;
        assert!(Position::new(huge, 4).is_err());
        assert_eq!(
            Position::new(2, usize::MAX),
            Err(ChessError::OutOfBounds {
                row: 2,
                col: i32::MAX
            })
        );
    }

    /// Row 0 is rank 8, row 7 is rank 1.
    #[test]
    fn algebraic_follows_row_orientation() {
        let e2 = Position::from_algebraic("e2").unwrap();
        assert_eq!((e2.row(), e2.col()), (6, 4));
        let a8 = Position::from_algebraic("a8").unwrap();
        assert_eq!((a8.row(), a8.col()), (0, 0));
        assert_eq!(Position::new(7, 7).unwrap().to_algebraic(), "h1");
    }

    #[test]
    fn malformed_notation_is_an_error() {
        for bad in ["", "e", "e9", "i1", "e22"] {
            assert_eq!(
                Position::from_algebraic(bad),
                Err(ChessError::InvalidSquare(bad.to_string()))
            );
        }
    }

    #[test]
    fn offset_stops_at_the_edge() {
        let h1 = Position::from_algebraic("h1").unwrap();
        assert_eq!(h1.offset(0, 1), None);
        assert_eq!(h1.offset(-1, -1), Position::from_algebraic("g2").ok());
    }

    #[test]
    fn deserialising_checks_bounds() {
        let ok: Position = serde_json::from_str(r#"{"row":6,"col":4}"#).unwrap();
        assert_eq!(ok.to_algebraic(), "e2");
        assert!(serde_json::from_str::<Position>(r#"{"row":9,"col":4}"#).is_err());
    }

    #[test]
    fn all_squares_are_enumerated_once() {
        let squares: Vec<Position> = Position::all().collect();
        assert_eq!(squares.len(), 64);
        assert_eq!(squares[0], Position::new(0, 0).unwrap());
        assert_eq!(squares[63], Position::new(7, 7).unwrap());
    }
}
