//! The fundamental and simple types of `knightline_core`.

use std::convert::TryFrom;
use std::fmt::{self, Display, Write};
use std::ops::{BitOr, Not};
use std::str::FromStr;

use crate::error::{self, ErrorKind};

///////////////
// Constants //
///////////////
pub const NUM_FILES: usize = 8; // A, B, C, D, E, F, G, H
pub const NUM_RANKS: usize = 8; // 1, 2, 3, 4, 5, 6, 7, 8
pub const NUM_SQUARES: usize = NUM_FILES * NUM_RANKS;

// The greatest number of plies a recorded game may hold, 600 ply, or 300 moves.
pub const MAX_HISTORY: usize = 600;

/////////////////////////
// Data and Structures //
/////////////////////////

/// Counter for half-move clock and full-moves.
pub type MoveCount = u16;

/// Color can represent the color of a piece, or a player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Color {
    White,
    Black,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A colored chess piece. Pieces are never mutated in place,
/// a promoted pawn is replaced by a new Piece.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    pub(crate) color: Color,
    pub(crate) piece_kind: PieceKind,
}

/// Observe Castling rights for a position.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Castling(u8);

/// Castling Enum constants.
impl Castling {
    pub const W_KING: Castling = Castling(0b00000001);
    pub const W_QUEEN: Castling = Castling(0b00000010);
    pub const B_KING: Castling = Castling(0b00000100);
    pub const B_QUEEN: Castling = Castling(0b00001000);
    pub const W_SIDE: Castling = Castling(Self::W_KING.0 | Self::W_QUEEN.0);
    pub const B_SIDE: Castling = Castling(Self::B_KING.0 | Self::B_QUEEN.0);
    pub const ALL: Castling = Castling(Self::W_SIDE.0 | Self::B_SIDE.0);
    pub const NONE: Castling = Castling(0u8);
}

/// Enum variant order and discriminant must be contiguous, start from 0,
/// and be in ascending order ABCDEFGH.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[rustfmt::skip]
#[repr(u8)]
pub enum File {
    A, B, C, D, E, F, G, H = 7u8,
}

/// Enum variant order and discriminant must be contiguous, start from 0,
/// and be in ascending order 12345678.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[rustfmt::skip]
#[repr(u8)]
pub enum Rank {
    R1, R2, R3, R4, R5, R6, R7, R8 = 7u8,
}

/// Square
/// Every square on a chess board, identified by a file index and a rank index.
/// `Square::A1 as u8` is 0 and `Square::H8 as u8` is 63, so the discriminant
/// is always `rank * 8 + file`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[rustfmt::skip]
#[repr(u8)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8 = 63u8,
}

/// Move
/// A request to move the piece on `from` to `to`, in Long Algebraic form.
/// Equivalent to a chess "half move", or "ply".
///
/// A Move says nothing about legality. The rules engine decides that.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Move {
    pub(crate) from: Square,
    pub(crate) to: Square,
    pub(crate) promotion: Option<PieceKind>,
}

//////////////////////
/// Implementations //
//////////////////////

impl Color {
    /// FEN compliant conversion.
    pub const fn to_char(&self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Capitalized player name, as shown to a user.
    pub const fn name(&self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Black => "Black",
        }
    }
}

impl Not for Color {
    type Output = Self;
    fn not(self) -> Self::Output {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Not for &Color {
    type Output = Color;
    fn not(self) -> Self::Output {
        Color::not(*self)
    }
}

impl From<Color> for char {
    fn from(color: Color) -> Self {
        color.to_char()
    }
}

impl TryFrom<char> for Color {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch {
            'w' => Ok(Color::White),
            'b' => Ok(Color::Black),
            _ => Err((ErrorKind::ParseColorMalformed, "char is not w|b").into()),
        }
    }
}

impl FromStr for Color {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        match s {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            _ => Err((ErrorKind::ParseColorMalformed, s).into()),
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(char::from(*self))
    }
}

impl PieceKind {
    /// FEN compliant conversion, defaults as white pieces.
    pub const fn to_char(&self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Returns true if a pawn may promote to this kind.
    pub const fn is_promotable(&self) -> bool {
        use PieceKind::*;
        matches!(self, Knight | Bishop | Rook | Queen)
    }

    /// Lowercase promotion suffix used by coordinate notation.
    pub const fn from_promotion_char(ch: char) -> Option<Self> {
        match ch {
            'q' => Some(PieceKind::Queen),
            'r' => Some(PieceKind::Rook),
            'b' => Some(PieceKind::Bishop),
            'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

impl Piece {
    pub const fn new(color: Color, piece_kind: PieceKind) -> Self {
        Piece { color, piece_kind }
    }
    /// Immutable Getters.
    pub const fn color(&self) -> &Color {
        &self.color
    }
    pub const fn piece_kind(&self) -> &PieceKind {
        &self.piece_kind
    }

    pub const fn to_char(&self) -> char {
        match self.color {
            Color::White => self.piece_kind.to_char(),
            Color::Black => self.piece_kind.to_char().to_ascii_lowercase(),
        }
    }
}

impl From<Piece> for char {
    fn from(piece: Piece) -> Self {
        piece.to_char()
    }
}

impl TryFrom<char> for Piece {
    type Error = error::Error;
    fn try_from(value: char) -> error::Result<Self> {
        let color = match value.is_ascii_uppercase() {
            true => Color::White,
            false => Color::Black,
        };
        let piece_kind = match value.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'R' => PieceKind::Rook,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => {
                return Err((
                    ErrorKind::ParsePieceMalformed,
                    "char is not in PRNBQKprnbqk",
                )
                    .into())
            }
        };
        Ok(Piece { color, piece_kind })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(char::from(*self))
    }
}

impl Castling {
    /// Make new Castling with all rights of initial chess position.
    pub const fn start_position() -> Self {
        Self::ALL
    }

    /// Returns true if there are no castling rights.
    pub const fn is_none(&self) -> bool {
        self.0 == 0u8
    }

    /// Returns true if Castling mask has all of provided bits.
    pub const fn has(&self, rights: Castling) -> bool {
        self.0 & rights.0 == rights.0
    }

    /// Set given bits to '1' on Castling mask.
    pub fn set(&mut self, rights: Castling) {
        self.0 |= rights.0;
    }

    /// Set given bits to '0' on Castling mask.
    pub fn clear(&mut self, rights: Castling) {
        self.0 &= !rights.0;
    }
}

/// Defaults to Castling rights for starting chess position, ALL.
impl Default for Castling {
    fn default() -> Self {
        Self::start_position()
    }
}

impl BitOr for Castling {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Displays in FEN-component format.
impl Display for Castling {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_none() {
            return f.write_char('-');
        }
        for (rights, ch) in [
            (Self::W_KING, 'K'),
            (Self::W_QUEEN, 'Q'),
            (Self::B_KING, 'k'),
            (Self::B_QUEEN, 'q'),
        ] {
            if self.has(rights) {
                f.write_char(ch)?;
            }
        }
        Ok(())
    }
}

/// Castling ::= '-' | ['K'] ['Q'] ['k'] ['q']
impl FromStr for Castling {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        if s == "-" {
            return Ok(Castling::NONE);
        }
        if s.is_empty() || s.len() > 4 {
            return Err((ErrorKind::ParseCastlingMalformed, s).into());
        }

        let mut castling_rights = Castling::NONE;
        for ch in s.chars() {
            let rights = match ch {
                'K' => Self::W_KING,
                'Q' => Self::W_QUEEN,
                'k' => Self::B_KING,
                'q' => Self::B_QUEEN,
                _ => return Err((ErrorKind::ParseCastlingMalformed, "char not of -KQkq").into()),
            };
            castling_rights.set(rights);
        }
        Ok(castling_rights)
    }
}

impl File {
    /// File enum variants cover all u8 values from 0-7 inclusive.
    pub const fn from_u8(value: u8) -> Option<Self> {
        use File::*;
        match value {
            0 => Some(A),
            1 => Some(B),
            2 => Some(C),
            3 => Some(D),
            4 => Some(E),
            5 => Some(F),
            6 => Some(G),
            7 => Some(H),
            _ => None,
        }
    }
    /// Get the character representation of File, in lowercase.
    pub const fn to_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl Rank {
    /// Rank enum variants cover all u8 values from 0-7 inclusive.
    pub const fn from_u8(value: u8) -> Option<Self> {
        use Rank::*;
        match value {
            0 => Some(R1),
            1 => Some(R2),
            2 => Some(R3),
            3 => Some(R4),
            4 => Some(R5),
            5 => Some(R6),
            6 => Some(R7),
            7 => Some(R8),
            _ => None,
        }
    }
    pub const fn to_char(&self) -> char {
        (b'1' + *self as u8) as char
    }
    /// Returns true for the first and last rank, where pawns promote.
    pub const fn is_back_rank(&self) -> bool {
        matches!(self, Rank::R1 | Rank::R8)
    }
}

impl TryFrom<char> for File {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch {
            'a'..='h' => Ok(Self::from_u8(ch as u8 - b'a').unwrap_or(File::A)),
            _ => Err((ErrorKind::ParseFileMalformed, "file char not of abcdefgh").into()),
        }
    }
}

impl TryFrom<char> for Rank {
    type Error = error::Error;
    fn try_from(ch: char) -> error::Result<Self> {
        match ch {
            '1'..='8' => Ok(Self::from_u8(ch as u8 - b'1').unwrap_or(Rank::R1)),
            _ => Err((ErrorKind::ParseRankMalformed, "rank char not of 12345678").into()),
        }
    }
}

impl Display for File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(self.to_char())
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_char(self.to_char())
    }
}

impl Square {
    /// Every square in discriminant order.
    #[rustfmt::skip]
    pub const ALL: [Square; NUM_SQUARES] = {
        use Square::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    /// Square enum variants cover all u8 values from 0-63 inclusive.
    pub const fn from_u8(value: u8) -> Option<Self> {
        if (value as usize) < NUM_SQUARES {
            Some(Self::ALL[value as usize])
        } else {
            None
        }
    }

    /// Returns the Square at a 0-based file and rank index, if both are in [0, 7].
    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if (file as usize) < NUM_FILES && (rank as usize) < NUM_RANKS {
            Self::from_u8(rank * NUM_FILES as u8 + file)
        } else {
            None
        }
    }

    pub const fn idx(&self) -> usize {
        *self as usize
    }

    pub fn file(&self) -> File {
        File::from_u8(self.file_u8()).unwrap_or(File::A)
    }

    pub fn rank(&self) -> Rank {
        Rank::from_u8(self.rank_u8()).unwrap_or(Rank::R1)
    }

    /// Returns 0-based file (0,1,2,3,4,5,6,7), not 1-based chess file.
    pub const fn file_u8(&self) -> u8 {
        *self as u8 % NUM_FILES as u8
    }

    /// Returns 0-based rank (0,1,2,3,4,5,6,7), not 1-based chess rank.
    pub const fn rank_u8(&self) -> u8 {
        *self as u8 / NUM_FILES as u8
    }
}

impl From<(File, Rank)> for Square {
    fn from((file, rank): (File, Rank)) -> Self {
        Self::ALL[rank as usize * NUM_FILES + file as usize]
    }
}

/// Square::= <fileLetter><rankNumber>
impl FromStr for Square {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        let mut chars = s.chars();
        let file = File::try_from(chars.next().ok_or(ErrorKind::ParseSquareMalformed)?)?;
        let rank = Rank::try_from(chars.next().ok_or(ErrorKind::ParseSquareMalformed)?)?;
        if chars.next().is_some() {
            return Err((ErrorKind::ParseSquareMalformed, s).into());
        }
        Ok(Square::from((file, rank)))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl Move {
    /// Unchecked constructor, for moves known to be well formed.
    pub const fn new(from: Square, to: Square, promotion: Option<PieceKind>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    /// Checked constructor. Rejects null moves and promotions to pawn or king.
    pub fn try_new(from: Square, to: Square, promotion: Option<PieceKind>) -> error::Result<Self> {
        if from == to {
            return Err((ErrorKind::ParseMoveMalformed, "from and to squares are equal").into());
        }
        if let Some(piece_kind) = promotion {
            if !piece_kind.is_promotable() {
                return Err((ErrorKind::ParseMoveMalformed, "cannot promote to pawn or king").into());
            }
        }
        Ok(Self::new(from, to, promotion))
    }

    // Immutable Getters
    pub const fn from(&self) -> Square {
        self.from
    }
    pub const fn to(&self) -> Square {
        self.to
    }
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }
}

/// Parses `Pure Algebraic Coordinate Notation`.
impl FromStr for Move {
    type Err = error::Error;
    fn from_str(s: &str) -> error::Result<Self> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err((ErrorKind::ParseMoveMalformed, s).into());
        }
        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;

        let promotion = match s.chars().nth(4) {
            Some(ch) => Some(
                PieceKind::from_promotion_char(ch)
                    .ok_or((ErrorKind::ParseMoveMalformed, "promotion not of qrbn"))?,
            ),
            None => None,
        };

        Self::try_new(from, to, promotion)
    }
}

/// # Example
/// Move { from: A7, to: B8, promotion: Some(Queen) } -> `a7b8q`.
impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece_kind) = self.promotion {
            f.write_char(piece_kind.to_char().to_ascii_lowercase())?;
        }
        Ok(())
    }
}
