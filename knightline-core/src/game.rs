//! Game structure.

use crate::coretypes::Move;
use crate::error::{self, ErrorKind};
use crate::movelist::MoveHistory;
use crate::navigation::compute_position;
use crate::position::Position;
use crate::report;

/// Game contains information for an in progress game:
/// The base position the game started from, the sequence of moves that were
/// played, and the current position.
///
/// `position` is always the result of applying every move in `moves` to
/// `base_position`, in order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Game {
    base_position: Position,
    moves: MoveHistory,
    position: Position,
}

impl Game {
    /// Create a new Game from a base position and a sequence of moves.
    /// This generates the current position by applying the sequence of moves to the base.
    /// If a move in the move history has no piece to move, Err is returned.
    pub fn new(base_position: Position, moves: MoveHistory) -> error::Result<Self> {
        let position = compute_position(&base_position, &moves, None)?;

        Ok(Self {
            base_position,
            moves,
            position,
        })
    }

    /// Create a new game in the standard chess start position.
    pub fn start_position() -> Self {
        Self::from(Position::start_position())
    }

    /// Position the game started from.
    pub fn base_position(&self) -> &Position {
        &self.base_position
    }

    /// Position after every recorded move.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns a copy of the recorded moves.
    /// Changing the copy does not change this game.
    pub fn moves(&self) -> MoveHistory {
        self.moves.clone()
    }

    /// Number of recorded plies.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Record a move and advance the current position.
    /// The next position is computed before anything is recorded,
    /// so on Err the game is unchanged.
    pub fn make_move(&mut self, move_: Move) -> error::Result<()> {
        if self.moves.is_full() {
            return Err(ErrorKind::MoveHistoryExceeded.into());
        }
        let position = self.position.make_move(move_)?;

        self.moves.push(move_);
        self.position = position;
        Ok(())
    }

    /// Remove the most recent move and return it, or None if no moves were played.
    /// The current position is rebuilt from the base position by replaying
    /// the remaining moves. If the replay fails the game is left as it was,
    /// the failure is reported, and None is returned.
    pub fn undo_last_move(&mut self) -> Option<Move> {
        let last_move = self.moves.pop()?;

        match compute_position(&self.base_position, &self.moves, None) {
            Ok(position) => {
                self.position = position;
                Some(last_move)
            }
            Err(err) => {
                self.moves.push(last_move);
                report::error(&format!("undo of {} failed: {}", last_move, err)).ok();
                None
            }
        }
    }
}

/// Convert a position to a Game with no past moves.
impl From<Position> for Game {
    fn from(position: Position) -> Self {
        Self {
            base_position: position,
            moves: MoveHistory::new(),
            position,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::start_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::{Color, Square::*};
    use crate::fen::Fen;

    #[test]
    fn opening_moves_update_turn_and_counters() {
        let mut game = Game::start_position();

        game.make_move(Move::new(E2, E4, None)).unwrap();
        assert_eq!(*game.position().side_to_move(), Color::Black);
        assert_eq!(*game.position().fullmoves(), 1);

        game.make_move(Move::new(E7, E5, None)).unwrap();
        assert_eq!(*game.position().side_to_move(), Color::White);
        assert_eq!(*game.position().fullmoves(), 2);
        assert_eq!(game.len(), 2);
    }

    #[test]
    fn failed_move_is_not_recorded() {
        let mut game = Game::start_position();
        let err = game.make_move(Move::new(E4, E5, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMoveSource);
        assert!(game.is_empty());
        assert_eq!(*game.position(), Position::start_position());
    }

    #[test]
    fn undo_every_move_returns_to_base() {
        let base = Position::parse_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 30").unwrap();
        let mut game = Game::from(base);
        let moves = [
            Move::new(E2, E4, None),
            Move::new(E8, D7, None),
            Move::new(E1, D2, None),
            Move::new(D7, C6, None),
        ];
        for move_ in moves {
            game.make_move(move_).unwrap();
        }

        for expected in moves.iter().rev() {
            assert_eq!(game.undo_last_move(), Some(*expected));
        }
        assert_eq!(*game.position(), base);
        assert!(game.moves().is_empty());
        assert_eq!(game.undo_last_move(), None);
    }

    #[test]
    fn undo_replays_remaining_moves() {
        let mut game = Game::start_position();
        game.make_move(Move::new(D2, D4, None)).unwrap();
        let after_first = *game.position();
        game.make_move(Move::new(G8, F6, None)).unwrap();

        game.undo_last_move();
        assert_eq!(*game.position(), after_first);
    }

    #[test]
    fn moves_returns_a_copy() {
        let mut game = Game::start_position();
        game.make_move(Move::new(E2, E4, None)).unwrap();

        let mut copy = game.moves();
        copy.clear();
        assert_eq!(game.len(), 1);
    }

    #[test]
    fn new_game_replays_history() {
        let moves: MoveHistory = [Move::new(E2, E4, None), Move::new(C7, C5, None)]
            .into_iter()
            .collect();
        let game = Game::new(Position::start_position(), moves).unwrap();
        assert_eq!(game.len(), 2);
        assert!(game.position().piece_at(C5).is_some());

        let bad: MoveHistory = [Move::new(E3, E4, None)].into_iter().collect();
        assert!(Game::new(Position::start_position(), bad).is_err());
    }

    #[test]
    fn full_history_rejects_more_moves() {
        let mut game = Game::start_position();
        let shuffle = [
            Move::new(G1, F3, None),
            Move::new(G8, F6, None),
            Move::new(F3, G1, None),
            Move::new(F6, G8, None),
        ];
        for move_ in shuffle.iter().cycle().take(crate::coretypes::MAX_HISTORY) {
            game.make_move(*move_).unwrap();
        }
        let err = game.make_move(Move::new(G1, F3, None)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MoveHistoryExceeded);
        assert_eq!(game.len(), crate::coretypes::MAX_HISTORY);
    }

    #[test]
    fn undo_keeps_history_that_cannot_be_replayed() {
        // Only reachable by building the fields directly.
        let moves: MoveHistory = [Move::new(A3, A4, None), Move::new(E2, E4, None)]
            .into_iter()
            .collect();
        let mut game = Game {
            base_position: Position::start_position(),
            moves: moves.clone(),
            position: Position::start_position(),
        };

        assert_eq!(game.undo_last_move(), None);
        assert_eq!(game.moves(), moves);
        assert_eq!(*game.position(), Position::start_position());
    }
}
