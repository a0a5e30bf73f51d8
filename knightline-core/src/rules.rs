//! Authoritative chess rules.
//!
//! The display model in [`position`](crate::position) and [`apply`](crate::apply)
//! only relocates pieces. Legal move generation, full move application, SAN and
//! game termination are the job of a [`RulesEngine`]. The crate ships
//! [`ShakmatyRules`], backed by the `shakmaty` crate.

use std::collections::HashMap;

use shakmaty::fen::Fen as ShakmatyFen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as ShakmatyPosition};

use crate::coretypes::{Color, Move, Square};
use crate::error::{self, Error, ErrorKind};

/// Standard chess start position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A move accepted by a rules engine, with the context it was played in.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlayedMove {
    /// The move as played, with a promotion piece filled in if one was implied.
    pub move_: Move,
    /// Standard Algebraic Notation, with `+` or `#` suffix.
    pub san: String,
    /// Color of the player who moved.
    pub color: Color,
    /// True if the move captured a piece.
    pub capture: bool,
}

/// MoveInfo contains extra properties of a legal move in context of an existing position.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MoveInfo {
    pub move_: Move,
    pub capture: bool,
    pub check: bool,
}

/// RulesEngine is the system of record for a live game.
pub trait RulesEngine: Sized {
    /// Create a game from a FEN string. Err with kind `MalformedPosition` if
    /// the string does not parse or does not describe a playable position.
    fn from_fen(fen: &str) -> error::Result<Self>;

    /// Create a game in the standard chess start position.
    fn start_position() -> Self;

    /// FEN the game was created from.
    fn start_fen(&self) -> &str;

    /// FEN of the current position.
    fn fen(&self) -> String;

    /// Player to move.
    fn turn(&self) -> Color;

    /// Every legal move in the current position.
    fn legal_moves(&self) -> Vec<MoveInfo>;

    /// Legal moves of the piece on `square`.
    fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .map(|info| info.move_)
            .filter(|move_| move_.from() == square)
            .collect()
    }

    /// Play a legal move. A pawn move to the last rank without a promotion
    /// piece promotes to a queen. Err with kind `GameIllegalMove` otherwise.
    fn play(&mut self, move_: Move) -> error::Result<PlayedMove>;

    /// Moves played since the start FEN, in order.
    fn history(&self) -> &[PlayedMove];

    /// Move list in SAN with move numbers, for example `1. e4 e5 2. Nf3`.
    fn movetext(&self) -> String;

    fn is_check(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_insufficient_material(&self) -> bool;
    fn is_threefold_repetition(&self) -> bool;
    fn is_fifty_moves(&self) -> bool;

    fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_fifty_moves()
    }

    fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }
}

/// RulesEngine over `shakmaty::Chess`.
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    start_fen: String,
    start_fullmoves: u32,
    chess: Chess,
    history: Vec<PlayedMove>,
    // Occurrences of each position, keyed by placement, turn, castling and en passant.
    repetitions: HashMap<String, u32>,
}

impl ShakmatyRules {
    fn new(chess: Chess) -> Self {
        let mut rules = Self {
            start_fen: String::new(),
            start_fullmoves: chess.fullmoves().get(),
            chess,
            history: Vec::new(),
            repetitions: HashMap::new(),
        };
        rules.start_fen = rules.fen();
        rules.record_repetition();
        rules
    }

    fn record_repetition(&mut self) {
        let key = repetition_key(&self.fen());
        *self.repetitions.entry(key).or_insert(0) += 1;
    }

    fn find_legal(&self, move_: Move) -> Option<shakmaty::Move> {
        let wanted = move_.to_string();
        let implied_queen = format!("{wanted}q");
        let legal = self.chess.legal_moves();

        let exact = legal.iter().find(|m| uci(m) == wanted);
        let promoted = || match move_.promotion() {
            None => legal.iter().find(|m| uci(m) == implied_queen),
            Some(_) => None,
        };
        exact.or_else(promoted).cloned()
    }
}

impl RulesEngine for ShakmatyRules {
    fn from_fen(fen: &str) -> error::Result<Self> {
        let setup: ShakmatyFen = fen
            .trim()
            .parse()
            .map_err(|err| Error::from((ErrorKind::MalformedPosition, err)))?;
        let chess: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|err| Error::from((ErrorKind::MalformedPosition, err)))?;
        Ok(Self::new(chess))
    }

    fn start_position() -> Self {
        Self::new(Chess::default())
    }

    fn start_fen(&self) -> &str {
        &self.start_fen
    }

    fn fen(&self) -> String {
        ShakmatyFen::from_position(self.chess.clone(), EnPassantMode::Legal).to_string()
    }

    fn turn(&self) -> Color {
        from_shakmaty_color(self.chess.turn())
    }

    fn legal_moves(&self) -> Vec<MoveInfo> {
        self.chess
            .legal_moves()
            .iter()
            .filter_map(|m| {
                let move_ = uci(m).parse::<Move>().ok()?;
                let mut after = self.chess.clone();
                after.play_unchecked(m);
                Some(MoveInfo {
                    move_,
                    capture: m.is_capture(),
                    check: after.is_check(),
                })
            })
            .collect()
    }

    fn play(&mut self, move_: Move) -> error::Result<PlayedMove> {
        let m = self
            .find_legal(move_)
            .ok_or((ErrorKind::GameIllegalMove, move_))?;
        let played_move: Move = uci(&m).parse()?;
        let color = self.turn();
        let san = San::from_move(&self.chess, &m).to_string();

        self.chess.play_unchecked(&m);
        self.record_repetition();

        let suffix = if self.chess.is_checkmate() {
            "#"
        } else if self.chess.is_check() {
            "+"
        } else {
            ""
        };

        let played = PlayedMove {
            move_: played_move,
            san: format!("{san}{suffix}"),
            color,
            capture: m.is_capture(),
        };
        self.history.push(played.clone());
        Ok(played)
    }

    fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    fn movetext(&self) -> String {
        let mut tokens = Vec::with_capacity(self.history.len() * 3 / 2 + 1);
        let mut fullmoves = self.start_fullmoves;

        for (idx, played) in self.history.iter().enumerate() {
            match played.color {
                Color::White => tokens.push(format!("{fullmoves}.")),
                Color::Black if idx == 0 => tokens.push(format!("{fullmoves}...")),
                Color::Black => (),
            }
            tokens.push(played.san.clone());
            if played.color == Color::Black {
                fullmoves += 1;
            }
        }

        tokens.join(" ")
    }

    fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    fn is_checkmate(&self) -> bool {
        self.chess.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.chess.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.chess.is_insufficient_material()
    }

    fn is_threefold_repetition(&self) -> bool {
        self.repetitions
            .get(&repetition_key(&self.fen()))
            .map_or(false, |count| *count >= 3)
    }

    fn is_fifty_moves(&self) -> bool {
        self.chess.halfmoves() >= 100
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::start_position()
    }
}

/// Pure coordinate notation of a shakmaty move. Castling is written as a king move.
fn uci(m: &shakmaty::Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

fn from_shakmaty_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn repetition_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}
