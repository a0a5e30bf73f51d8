//! Knightline error type.

use std::error;
use std::fmt::{self, Display};
use std::result;

use crate::fen::ParseFenError;

/// Knightline generic result type.
pub type Result<T> = result::Result<T, Error>;

/// A list specifying general errors for Knightline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A move was applied from a square with no piece on it.
    InvalidMoveSource,
    /// A position string could not be parsed.
    MalformedPosition,

    /// Square parse string malformed.
    ParseSquareMalformed,
    /// File parse string malformed.
    ParseFileMalformed,
    /// Rank parse string malformed.
    ParseRankMalformed,
    /// Color parse string malformed.
    ParseColorMalformed,
    /// Piece parse string malformed.
    ParsePieceMalformed,
    /// Castling parse string malformed.
    ParseCastlingMalformed,
    /// Move parse string malformed, or the move itself is not well formed.
    ParseMoveMalformed,
    /// Difficulty parse string malformed.
    ParseDifficultyMalformed,
    /// Game mode parse string malformed.
    ParseGameModeMalformed,

    /// A recorded game can only hold a finite static number of moves.
    /// That limit has been exceeded.
    MoveHistoryExceeded,

    /// The computer player failed to produce a move, or took too long.
    EngineMoveFailure,
    /// Computer player is currently thinking, so another request cannot be started.
    EngineAlreadySearching,

    /// An illegal move was provided to the rules engine.
    GameIllegalMove,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidMoveSource => "invalid move source",
            ErrorKind::MalformedPosition => "malformed position",

            ErrorKind::ParseSquareMalformed => "parse square malformed",
            ErrorKind::ParseFileMalformed => "parse file malformed",
            ErrorKind::ParseRankMalformed => "parse rank malformed",
            ErrorKind::ParseColorMalformed => "parse color malformed",
            ErrorKind::ParsePieceMalformed => "parse piece malformed",
            ErrorKind::ParseCastlingMalformed => "parse castling malformed",
            ErrorKind::ParseMoveMalformed => "parse move malformed",
            ErrorKind::ParseDifficultyMalformed => "parse difficulty malformed",
            ErrorKind::ParseGameModeMalformed => "parse game mode malformed",

            ErrorKind::MoveHistoryExceeded => "move history exceeded",

            ErrorKind::EngineMoveFailure => "engine move failure",
            ErrorKind::EngineAlreadySearching => "engine already searching",

            ErrorKind::GameIllegalMove => "game illegal move",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The primary and general error type for Knightline.
#[derive(Debug)]
pub enum Error {
    Simple(ErrorKind),
    Message(ErrorKind, String),
    Custom(ErrorKind, Box<dyn error::Error + Send + Sync>),
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, inner_error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Custom(error_kind, inner_error.into())
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Simple(error_kind)
            | Error::Message(error_kind, _)
            | Error::Custom(error_kind, _) => *error_kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Simple(error_kind) => {
                write!(f, "{error_kind}")
            }
            Error::Message(error_kind, string) => {
                write!(f, "{error_kind}: {string}")
            }
            Error::Custom(error_kind, ref box_error) => {
                write!(f, "{error_kind}, error: {}", *box_error)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(error_kind: ErrorKind) -> Self {
        Self::Simple(error_kind)
    }
}

impl From<ParseFenError> for Error {
    fn from(error: ParseFenError) -> Self {
        Self::Custom(ErrorKind::MalformedPosition, error.into())
    }
}

impl<S: ToString> From<(ErrorKind, S)> for Error {
    fn from((error_kind, stringable): (ErrorKind, S)) -> Self {
        Self::Message(error_kind, stringable.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_survives_conversion() {
        let simple: Error = ErrorKind::InvalidMoveSource.into();
        assert_eq!(simple.kind(), ErrorKind::InvalidMoveSource);
        assert_eq!(simple.to_string(), "invalid move source");

        let message: Error = (ErrorKind::GameIllegalMove, "e2e5").into();
        assert_eq!(message.kind(), ErrorKind::GameIllegalMove);
        assert_eq!(message.to_string(), "game illegal move: e2e5");

        let fen: Error = ParseFenError::SideToMove.into();
        assert_eq!(fen.kind(), ErrorKind::MalformedPosition);
    }
}
