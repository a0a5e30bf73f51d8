//! Holds Position struct, the value every other part of the crate is built around.
//! Position represents a chess position.

use std::fmt::{self, Display};

use crate::apply;
use crate::coretypes::{Castling, Color, Move, MoveCount, Piece, Square};
use crate::error;
use crate::fen::Fen;
use crate::mailbox::Mailbox;

/// struct Position
/// A complete data set that can represent any chess position.
/// # Members:
/// * board - a square-centric 8x8 grid of pieces.
/// * side_to_move - Color of player whose turn it is.
/// * castling - Castling rights for both players.
/// * en_passant - Indicates if en passant is possible, and for which square.
/// * halfmoves - Tracker for 50 move draw rule. Resets after capture/pawn move.
/// * fullmoves - Starts at 1, increments after each black player's move.
///
/// Position is `Copy`. Every position derived from another is an independent
/// snapshot, so historical positions can never be changed through a later one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    pub(crate) board: Mailbox,
    pub(crate) side_to_move: Color,
    pub(crate) castling: Castling,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmoves: MoveCount,
    pub(crate) fullmoves: MoveCount,
}

impl Position {
    /// Create a position from its parts.
    pub fn new(
        board: Mailbox,
        side_to_move: Color,
        castling: Castling,
        en_passant: Option<Square>,
        halfmoves: MoveCount,
        fullmoves: MoveCount,
    ) -> Self {
        Self {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmoves,
            fullmoves,
        }
    }

    /// Standard chess start position.
    pub fn start_position() -> Self {
        Self {
            board: Mailbox::start_position(),
            side_to_move: Color::White,
            castling: Castling::start_position(),
            en_passant: None,
            halfmoves: 0,
            fullmoves: 1,
        }
    }

    /// Const getters.
    pub fn board(&self) -> &Mailbox {
        &self.board
    }
    pub fn side_to_move(&self) -> &Color {
        &self.side_to_move
    }
    pub fn castling(&self) -> &Castling {
        &self.castling
    }
    pub fn en_passant(&self) -> &Option<Square> {
        &self.en_passant
    }
    pub fn halfmoves(&self) -> &MoveCount {
        &self.halfmoves
    }
    pub fn fullmoves(&self) -> &MoveCount {
        &self.fullmoves
    }

    /// Returns the piece on a square, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square]
    }

    /// Apply a move to self, in place.
    /// `do_move` does not check if the move is legal or not,
    /// it simply executes it while assuming legality.
    /// If there is no piece on the from square, Err is returned and self is unchanged.
    pub fn do_move(&mut self, move_: Move) -> error::Result<()> {
        *self = apply::apply_move(self, move_)?;
        Ok(())
    }

    /// Generates a new Position from applying move on current Position.
    pub fn make_move(&self, move_: Move) -> error::Result<Self> {
        apply::apply_move(self, move_)
    }
}

/// Defaults to standard chess start position.
impl Default for Position {
    fn default() -> Self {
        Self::start_position()
    }
}

/// Displays pretty-printed chess board and Fen string representing Position.
impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\n Fen: {}\n", self.board, self.to_fen())
    }
}
