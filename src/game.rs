// =============================================================================
// Game — move orchestration
//
// Owns the board and all match state: side to move, cached king squares,
// castling flags, en-passant state and the pending promotion. A move is legal
// when the piece's own rule accepts it AND a trial of the move on the live
// board leaves the mover's king unattacked. Trials go through
// `Board::trial_move`, whose guard restores the board when it drops.
//
// Coordinate system: row 0 = rank 8 (Black's back rank), col 0 = file a.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::ChessError;
use crate::moves::{CastleSide, EnPassant, Move, MoveOutcome, Rejection};
use crate::piece::{Color, Piece, PieceType};
use crate::position::Position;

/// Column both kings start on.
const KING_HOME_COL: usize = 4;

/// Monotonic "has moved" flags for each king and rook. Once set, a flag is
/// never cleared, whatever the board looks like later.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white_king_moved: bool,
    pub white_kingside_rook_moved: bool,
    pub white_queenside_rook_moved: bool,
    pub black_king_moved: bool,
    pub black_kingside_rook_moved: bool,
    pub black_queenside_rook_moved: bool,
}

impl CastlingRights {
    /// Flags for an arbitrary layout: a king or rook that is not on its home
    /// square counts as moved.
    pub fn from_board(board: &Board) -> Self {
        let mut rights = CastlingRights::default();
        for color in [Color::White, Color::Black] {
            if !has_piece(board, color, PieceType::King, king_home(color)) {
                rights.mark_king_moved(color);
            }
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if !has_piece(board, color, PieceType::Rook, rook_home(color, side)) {
                    rights.mark_rook_moved(color, side);
                }
            }
        }
        rights
    }

    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    pub fn rook_moved(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside_rook_moved,
            (Color::White, CastleSide::QueenSide) => self.white_queenside_rook_moved,
            (Color::Black, CastleSide::KingSide) => self.black_kingside_rook_moved,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside_rook_moved,
        }
    }

    /// Neither the king nor the rook on `side` has moved.
    pub fn allows(&self, color: Color, side: CastleSide) -> bool {
        !self.king_moved(color) && !self.rook_moved(color, side)
    }

    pub fn mark_king_moved(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    pub fn mark_rook_moved(&mut self, color: Color, side: CastleSide) {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside_rook_moved = true,
            (Color::White, CastleSide::QueenSide) => self.white_queenside_rook_moved = true,
            (Color::Black, CastleSide::KingSide) => self.black_kingside_rook_moved = true,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside_rook_moved = true,
        }
    }

    /// Record a move of `piece` from `from` to `to`. A piece leaving or
    /// landing on a rook's home square (a capture of that rook) spends that
    /// rook's right.
    fn record_move(&mut self, piece: &Piece, from: Position, to: Position) {
        if piece.piece_type == PieceType::King {
            self.mark_king_moved(piece.color);
        }
        for color in [Color::White, Color::Black] {
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                let home = rook_home(color, side);
                if from == home || to == home {
                    self.mark_rook_moved(color, side);
                }
            }
        }
    }
}

fn king_home(color: Color) -> Position {
    Position::at(color.back_rank(), KING_HOME_COL)
}

fn rook_home(color: Color, side: CastleSide) -> Position {
    Position::at(color.back_rank(), side.rook_col())
}

fn has_piece(board: &Board, color: Color, piece_type: PieceType, pos: Position) -> bool {
    board
        .piece_at(pos)
        .map(|p| p.color == color && p.piece_type == piece_type)
        .unwrap_or(false)
}

/// A pawn on the last rank waiting for the player's choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPromotion {
    pub position: Position,
    pub color: Color,
}

/// Situation of the side to move, refreshed after every completed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Check(Color),
    Checkmate { winner: Color },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    white_king: Option<Position>,
    black_king: Option<Position>,
    castling: CastlingRights,
    en_passant: EnPassant,
    promotion: Option<PendingPromotion>,
    status: GameStatus,
    last_move: Option<Move>,
    last_move_notation: Option<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A fresh match from the standard layout, White to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Color::White)
    }

    /// A match from a custom layout. Castling flags are inferred from which
    /// kings and rooks stand on their home squares.
    pub fn from_board(board: Board, side_to_move: Color) -> Self {
        let castling = CastlingRights::from_board(&board);
        let mut game = Game {
            board,
            side_to_move,
            white_king: None,
            black_king: None,
            castling,
            en_passant: EnPassant::default(),
            promotion: None,
            status: GameStatus::Ongoing,
            last_move: None,
            last_move_notation: None,
        };
        game.refresh_king_positions();
        game.refresh_status();
        game
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn is_white_turn(&self) -> bool {
        self.side_to_move == Color::White
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
        }
    }

    pub fn castling_rights(&self) -> &CastlingRights {
        &self.castling
    }

    pub fn en_passant(&self) -> &EnPassant {
        &self.en_passant
    }

    pub fn en_passant_target(&self) -> Option<Position> {
        self.en_passant.target
    }

    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.promotion
    }

    pub fn is_promoting(&self) -> bool {
        self.promotion.is_some()
    }

    /// Board input other than the promotion choice is refused while true.
    pub fn waiting_for_promotion_selection(&self) -> bool {
        self.promotion.is_some()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Color> {
        match self.status {
            GameStatus::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Display string of the last move, e.g. "Nf3", "exd5", "O-O", "e8=Q+".
    pub fn last_move_notation(&self) -> Option<&str> {
        self.last_move_notation.as_deref()
    }

    /// Is any opposing piece able to reach `color`'s king?
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_position(color)
            .map(|king| is_attacked(&self.board, king, color.opposite()))
            .unwrap_or(false)
    }

    /// In check with no king-safe move for any piece of `color`.
    pub fn is_checkmate(&mut self, color: Color) -> bool {
        if !self.is_in_check(color) {
            return false;
        }
        let pieces: Vec<Piece> = self.board.pieces_of(color).collect();
        for piece in pieces {
            for target in Position::all() {
                if self.is_legal(&piece, target) {
                    return false;
                }
            }
        }
        true
    }

    /// Squares the piece on `from` may legally move to, castling
    /// destinations included. Empty unless it is that piece's turn.
    pub fn legal_targets(&mut self, from: Position) -> Vec<Position> {
        if self.promotion.is_some() {
            return Vec::new();
        }
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        if piece.color != self.side_to_move {
            return Vec::new();
        }
        let mut targets: Vec<Position> = Position::all()
            .filter(|&to| self.is_legal(&piece, to))
            .collect();
        if piece.piece_type == PieceType::King {
            for side in [CastleSide::KingSide, CastleSide::QueenSide] {
                if self.can_castle(piece.color, side) {
                    targets.push(Position::at(piece.color.back_rank(), side.king_target_col()));
                }
            }
        }
        targets
    }

    /// Every legal from/to pair for the side to move.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let pieces: Vec<Piece> = self.board.pieces_of(self.side_to_move).collect();
        pieces
            .into_iter()
            .flat_map(|piece| {
                self.legal_targets(piece.position)
                    .into_iter()
                    .map(move |to| Move {
                        from: piece.position,
                        to,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Castling preconditions: unmoved king and rook in place, empty squares
    /// between them, and the king neither in check, passing through an
    /// attacked square nor landing on one.
    pub fn can_castle(&mut self, color: Color, side: CastleSide) -> bool {
        if !self.castling.allows(color, side) {
            return false;
        }
        let row = color.back_rank();
        let king_from = king_home(color);
        if !has_piece(&self.board, color, PieceType::King, king_from)
            || !has_piece(&self.board, color, PieceType::Rook, rook_home(color, side))
        {
            return false;
        }

        let (lo, hi) = match side {
            CastleSide::KingSide => (KING_HOME_COL + 1, side.rook_col()),
            CastleSide::QueenSide => (side.rook_col() + 1, KING_HOME_COL),
        };
        if (lo..hi).any(|col| !self.board.is_empty(Position::at(row, col))) {
            return false;
        }

        if self.is_in_check(color) {
            return false;
        }

        // The square crossed (where the rook lands) and the king's destination
        [side.rook_target_col(), side.king_target_col()]
            .into_iter()
            .all(|col| {
                let step = Position::at(row, col);
                let trial = self.board.trial_move(king_from, step, None);
                !is_attacked(&trial, step, color.opposite())
            })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Move the piece on `from` to `to` for the side to move.
    ///
    /// A king moving two columns is treated as castling. A pawn reaching the
    /// last rank yields [`MoveOutcome::PendingPromotion`]: the pawn has moved
    /// but the turn only passes once [`Game::promote`] is called.
    pub fn move_piece(&mut self, from: Position, to: Position) -> MoveOutcome {
        if self.promotion.is_some() {
            return MoveOutcome::Rejected(Rejection::PromotionPending);
        }
        let Some(piece) = self.board.piece_at(from) else {
            return MoveOutcome::Rejected(Rejection::NoPiece);
        };
        if piece.color != self.side_to_move {
            return MoveOutcome::Rejected(Rejection::WrongTurn);
        }

        let col_diff = to.col() as i32 - from.col() as i32;
        if piece.piece_type == PieceType::King && col_diff.abs() == 2 && to.row() == from.row() {
            let side = if col_diff > 0 {
                CastleSide::KingSide
            } else {
                CastleSide::QueenSide
            };
            return self.castle(piece.color, side);
        }

        if !piece.is_valid_move(to, &self.board, &self.en_passant) {
            return MoveOutcome::Rejected(Rejection::IllegalMove);
        }
        if !self.is_king_safe(&piece, to) {
            return MoveOutcome::Rejected(Rejection::ExposesKing);
        }

        let notation = self.board.notation(from, to);
        let en_passant_capture = self.en_passant_capture(&piece, to);
        self.update_en_passant(&piece, to);
        self.castling.record_move(&piece, from, to);
        if let Some(captured) = en_passant_capture {
            self.board.remove(captured);
        }
        self.board.move_piece(from, to);
        self.refresh_king_positions();
        self.last_move = Some(Move { from, to });

        if piece.piece_type == PieceType::Pawn && to.row() == piece.color.promotion_rank() {
            self.promotion = Some(PendingPromotion {
                position: to,
                color: piece.color,
            });
            self.last_move_notation = Some(notation);
            return MoveOutcome::PendingPromotion;
        }

        self.finish_turn(notation);
        MoveOutcome::Applied
    }

    /// Castle `color`'s king toward the rook on `side`.
    pub fn castle(&mut self, color: Color, side: CastleSide) -> MoveOutcome {
        if self.promotion.is_some() {
            return MoveOutcome::Rejected(Rejection::PromotionPending);
        }
        if color != self.side_to_move {
            return MoveOutcome::Rejected(Rejection::WrongTurn);
        }
        if !self.can_castle(color, side) {
            return MoveOutcome::Rejected(Rejection::CastlingNotAllowed);
        }

        let row = color.back_rank();
        let king_from = king_home(color);
        let king_to = Position::at(row, side.king_target_col());
        self.board.move_piece(king_from, king_to);
        self.board
            .move_piece(rook_home(color, side), Position::at(row, side.rook_target_col()));
        self.castling.mark_king_moved(color);
        self.castling.mark_rook_moved(color, side);
        self.en_passant.clear();
        self.refresh_king_positions();
        self.last_move = Some(Move {
            from: king_from,
            to: king_to,
        });

        self.finish_turn(side.notation().to_string());
        MoveOutcome::Applied
    }

    /// Replace the waiting pawn with `piece_type` and pass the turn.
    pub fn promote(&mut self, piece_type: PieceType) -> Result<(), ChessError> {
        let pending = self.promotion.ok_or(ChessError::NoPromotionPending)?;
        if !piece_type.can_promote_to() {
            return Err(ChessError::InvalidPromotion(piece_type));
        }
        self.board.place(piece_type, pending.color, pending.position);
        self.promotion = None;

        let mut notation = self.last_move_notation.take().unwrap_or_default();
        notation.push('=');
        if let Some(letter) = piece_type.notation_letter() {
            notation.push(letter);
        }
        self.finish_turn(notation);
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Pseudo-legal and king-safe.
    fn is_legal(&mut self, piece: &Piece, to: Position) -> bool {
        piece.is_valid_move(to, &self.board, &self.en_passant) && self.is_king_safe(piece, to)
    }

    /// Try the move on the live board and test the mover's king. The board
    /// is restored before this returns.
    fn is_king_safe(&mut self, piece: &Piece, to: Position) -> bool {
        let king = if piece.piece_type == PieceType::King {
            Some(to)
        } else {
            self.king_position(piece.color)
        };
        let Some(king) = king else {
            return true;
        };
        let also_remove = self.en_passant_capture(piece, to);
        let trial = self.board.trial_move(piece.position, to, also_remove);
        !is_attacked(&trial, king, piece.color.opposite())
    }

    /// Square of the pawn taken if this move is an en-passant capture.
    fn en_passant_capture(&self, piece: &Piece, to: Position) -> Option<Position> {
        if piece.piece_type == PieceType::Pawn
            && self.en_passant.target == Some(to)
            && self.board.is_empty(to)
        {
            self.en_passant.double_moved_pawn
        } else {
            None
        }
    }

    /// A double push opens en passant for exactly one reply; any other move
    /// closes it.
    fn update_en_passant(&mut self, piece: &Piece, to: Position) {
        let from = piece.position;
        let is_double_push = piece.piece_type == PieceType::Pawn
            && (to.row() as i32 - from.row() as i32).abs() == 2;
        if is_double_push {
            self.en_passant = EnPassant {
                target: Some(Position::at((from.row() + to.row()) / 2, from.col())),
                double_moved_pawn: Some(to),
            };
        } else {
            self.en_passant.clear();
        }
    }

    fn refresh_king_positions(&mut self) {
        self.white_king = self.board.find_king(Color::White);
        self.black_king = self.board.find_king(Color::Black);
    }

    fn refresh_status(&mut self) {
        let color = self.side_to_move;
        self.status = if self.is_checkmate(color) {
            GameStatus::Checkmate {
                winner: color.opposite(),
            }
        } else if self.is_in_check(color) {
            GameStatus::Check(color)
        } else {
            GameStatus::Ongoing
        };
    }

    fn finish_turn(&mut self, mut notation: String) {
        self.side_to_move = self.side_to_move.opposite();
        self.refresh_status();
        match self.status {
            GameStatus::Checkmate { .. } => notation.push('#'),
            GameStatus::Check(_) => notation.push('+'),
            GameStatus::Ongoing => {}
        }
        self.last_move_notation = Some(notation);
    }
}

/// Does any `attacker` piece's movement rule reach `square`? En passant is
/// ignored since it never captures on an occupied square.
fn is_attacked(board: &Board, square: Position, attacker: Color) -> bool {
    let no_en_passant = EnPassant::default();
    board
        .pieces_of(attacker)
        .any(|p| p.is_valid_move(square, board, &no_en_passant))
}
