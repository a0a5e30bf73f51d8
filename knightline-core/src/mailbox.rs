//! A [mailbox](https://www.chessprogramming.org/Mailbox) is a square-centric
//! representation of a chess board.
//!
//! A Mailbox is an 8x8 grid indexed `[rank][file]` where each cell may contain a
//! chess piece or be empty.

use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use crate::coretypes::{Color, Piece, PieceKind, Square, NUM_FILES, NUM_RANKS};

/// A single rank of the board, indexed by file.
pub type Row = [Option<Piece>; NUM_FILES];

/// Classic 8x8 square board representation of Chess board.
/// Index starts at A1.
/// A1 = [0][0]
/// B1 = [0][1]
/// A2 = [1][0]
/// H8 = [7][7]
///
/// The grid is a plain value, so cloning a Mailbox never shares rows.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Mailbox {
    board: [Row; NUM_RANKS],
}

impl Mailbox {
    /// Creates an empty Mailbox, where all squares are None.
    pub const fn new() -> Self {
        Mailbox {
            board: [[None; NUM_FILES]; NUM_RANKS],
        }
    }

    /// Create Mailbox with pieces arranged in starting chess position.
    pub fn start_position() -> Self {
        use Color::*;
        use PieceKind::*;
        const BACK_RANK: [PieceKind; NUM_FILES] =
            [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut mb = Self::new();

        for (file, piece_kind) in BACK_RANK.into_iter().enumerate() {
            mb.board[0][file] = Some(Piece::new(White, piece_kind));
            mb.board[1][file] = Some(Piece::new(White, Pawn));
            mb.board[6][file] = Some(Piece::new(Black, Pawn));
            mb.board[7][file] = Some(Piece::new(Black, piece_kind));
        }

        mb
    }

    /// The underlying grid, indexed `[rank][file]`.
    pub fn rows(&self) -> &[Row; NUM_RANKS] {
        &self.board
    }

    /// Returns the piece on a square, if any.
    pub fn get(&self, square: Square) -> Option<Piece> {
        self[square]
    }

    /// Removes and returns the piece on a square, if any.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self[square].take()
    }

    /// Returns an iterator over every occupied square and its piece, from A1 to H8.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::ALL
            .into_iter()
            .filter_map(move |square| self[square].map(|piece| (square, piece)))
    }

    /// Returns pretty-printed chess board representation of Self.
    /// The chess board has borders and file/rank indicators.
    pub fn pretty(&self) -> String {
        const RANK_SEP: &str = "+---+---+---+---+---+---+---+---+\n";
        let mut pretty = String::with_capacity(626);

        pretty.push_str(RANK_SEP);
        for (rank, row) in self.board.iter().enumerate().rev() {
            pretty.push_str("| ");

            for cell in row {
                pretty.push(match cell {
                    Some(piece) => char::from(*piece),
                    None => ' ',
                });
                pretty.push_str(" | ");
            }
            pretty.push_str(&(rank + 1).to_string());
            pretty.push('\n');
            pretty.push_str(RANK_SEP);
        }
        pretty.push_str("  a   b   c   d   e   f   g   h\n");

        pretty
    }
}

impl Index<Square> for Mailbox {
    type Output = Option<Piece>;
    fn index(&self, square: Square) -> &Self::Output {
        &self.board[square.rank_u8() as usize][square.file_u8() as usize]
    }
}

impl IndexMut<Square> for Mailbox {
    fn index_mut(&mut self, square: Square) -> &mut Self::Output {
        &mut self.board[square.rank_u8() as usize][square.file_u8() as usize]
    }
}

/// Default value is that of a standard starting chess position.
impl Default for Mailbox {
    fn default() -> Self {
        Mailbox::start_position()
    }
}

impl Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Square::*;

    #[test]
    fn start_position_layout() {
        let mb = Mailbox::start_position();
        assert_eq!(mb[E1], Some(Piece::new(Color::White, PieceKind::King)));
        assert_eq!(mb[D8], Some(Piece::new(Color::Black, PieceKind::Queen)));
        assert_eq!(mb[A2], Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert_eq!(mb[H7], Some(Piece::new(Color::Black, PieceKind::Pawn)));
        assert_eq!(mb[E4], None);
        assert_eq!(mb.pieces().count(), 32);
        assert_eq!(mb.rows()[0][4], mb[E1]);
    }

    #[test]
    fn copies_do_not_share_cells() {
        let original = Mailbox::start_position();
        let mut copy = original;
        copy.take(E2);
        assert_eq!(copy[E2], None);
        assert!(original[E2].is_some());
    }

    #[test]
    fn display_start_position_mailbox() {
        let pretty = Mailbox::start_position().pretty();
        assert!(pretty.starts_with("+---+"));
        assert!(pretty.contains("| r | n | b | q | k | b | n | r | 8"));
        assert!(pretty.ends_with("  a   b   c   d   e   f   g   h\n"));
    }
}
