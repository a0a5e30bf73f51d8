//! Forsyth-Edwards Notation, a standard notation for describing a chess position.
//! <https://en.wikipedia.org/wiki/Forsyth%E2%80%93Edwards_Notation>
//!
//! Example:
//! Starting Chess FEN = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"

use std::convert::TryFrom;
use std::error;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::coretypes::{Castling, Color, MoveCount, Piece, Square, NUM_FILES, NUM_RANKS};
use crate::mailbox::Mailbox;
use crate::position::Position;

/// Fen is a trait for types which can be read from and written to a FEN string.
pub trait Fen: Sized {
    fn parse_fen(s: &str) -> Result<Self, ParseFenError>;
    fn to_fen(&self) -> String;
}

/// The ways a FEN string can fail to parse, one per field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ParseFenError {
    /// Fewer or more than 6 whitespace separated fields.
    FieldCount,
    /// Piece placement is not 8 ranks of 8 files with known piece chars.
    Placement,
    SideToMove,
    Castling,
    EnPassant,
    HalfMoveClock,
    FullMoveNumber,
}

impl ParseFenError {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseFenError::FieldCount => "fen must have 6 fields",
            ParseFenError::Placement => "fen piece placement malformed",
            ParseFenError::SideToMove => "fen side to move malformed",
            ParseFenError::Castling => "fen castling malformed",
            ParseFenError::EnPassant => "fen en passant malformed",
            ParseFenError::HalfMoveClock => "fen halfmove clock malformed",
            ParseFenError::FullMoveNumber => "fen fullmove number malformed",
        }
    }
}

impl Display for ParseFenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for ParseFenError {}

impl Fen for Position {
    fn parse_fen(s: &str) -> Result<Self, ParseFenError> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ParseFenError::FieldCount);
        }

        let board = parse_placement(fields[0])?;
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(ParseFenError::SideToMove),
        };
        let castling = Castling::from_str(fields[2]).map_err(|_| ParseFenError::Castling)?;
        let en_passant = match fields[3] {
            "-" => None,
            square => Some(Square::from_str(square).map_err(|_| ParseFenError::EnPassant)?),
        };
        let halfmoves = MoveCount::from_str(fields[4]).map_err(|_| ParseFenError::HalfMoveClock)?;
        let fullmoves = MoveCount::from_str(fields[5])
            .ok()
            .filter(|fullmoves| *fullmoves > 0)
            .ok_or(ParseFenError::FullMoveNumber)?;

        Ok(Position::new(
            board,
            side_to_move,
            castling,
            en_passant,
            halfmoves,
            fullmoves,
        ))
    }

    fn to_fen(&self) -> String {
        let en_passant = match self.en_passant {
            Some(square) => square.to_string(),
            None => String::from("-"),
        };

        format!(
            "{} {} {} {} {} {}",
            placement(&self.board),
            self.side_to_move,
            self.castling,
            en_passant,
            self.halfmoves,
            self.fullmoves
        )
    }
}

/// Placement ranks are listed from rank 8 down to rank 1, files a through h.
fn parse_placement(s: &str) -> Result<Mailbox, ParseFenError> {
    let ranks: Vec<&str> = s.split('/').collect();
    if ranks.len() != NUM_RANKS {
        return Err(ParseFenError::Placement);
    }

    let mut board = Mailbox::new();
    for (rank_str, rank) in ranks.iter().zip((0..NUM_RANKS as u8).rev()) {
        let mut file = 0u8;

        for ch in rank_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(ParseFenError::Placement);
                }
                file += skip as u8;
            } else {
                let piece = Piece::try_from(ch).map_err(|_| ParseFenError::Placement)?;
                let square = Square::from_coords(file, rank).ok_or(ParseFenError::Placement)?;
                board[square] = Some(piece);
                file += 1;
            }

            if file as usize > NUM_FILES {
                return Err(ParseFenError::Placement);
            }
        }

        if file as usize != NUM_FILES {
            return Err(ParseFenError::Placement);
        }
    }

    Ok(board)
}

fn placement(board: &Mailbox) -> String {
    let mut placement = String::with_capacity(72);

    for (rank, row) in board.rows().iter().enumerate().rev() {
        let mut empty = 0;
        for cell in row {
            match cell {
                Some(piece) => {
                    if empty > 0 {
                        placement.push_str(&empty.to_string());
                        empty = 0;
                    }
                    placement.push(char::from(*piece));
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            placement.push_str(&empty.to_string());
        }
        if rank > 0 {
            placement.push('/');
        }
    }

    placement
}
