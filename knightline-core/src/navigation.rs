//! Move list navigation.
//!
//! A [`Navigator`] is a read cursor over a recorded game. It lets a viewer
//! step backward and forward through the moves, and rebuilds the position at
//! the cursor by replaying moves from the base position. Nothing is cached:
//! recorded games are at most a few hundred plies, so replay is cheap.

use crate::coretypes::Move;
use crate::error;
use crate::movelist::MoveHistory;
use crate::position::Position;

/// Returns the position reached by applying `moves[..up_to]` to `base`.
/// If `up_to` is None or past the end, every move is applied.
pub fn compute_position(
    base: &Position,
    moves: &[Move],
    up_to: Option<usize>,
) -> error::Result<Position> {
    let end = up_to.unwrap_or(moves.len()).min(moves.len());

    moves[..end]
        .iter()
        .try_fold(*base, |position, move_| position.make_move(*move_))
}

/// Navigator tracks which ply of a game is being viewed.
///
/// The only state that changes during navigation is `view_index`, which is
/// always in `[0, moves.len()]`. Index 0 views the base position and index
/// `moves.len()` views the position after the final move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Navigator {
    base_position: Position,
    moves: MoveHistory,
    view_index: usize,
}

impl Navigator {
    /// Create a Navigator viewing the base position.
    pub fn new(moves: MoveHistory, base_position: Position) -> Self {
        Self {
            base_position,
            moves,
            view_index: 0,
        }
    }

    /// Create a Navigator viewing the position after the final move.
    pub fn at_end(moves: MoveHistory, base_position: Position) -> Self {
        let mut navigator = Self::new(moves, base_position);
        navigator.go_to_end();
        navigator
    }

    /// Index of the ply being viewed.
    pub fn index(&self) -> usize {
        self.view_index
    }

    /// Number of moves that can be navigated.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn moves(&self) -> &MoveHistory {
        &self.moves
    }

    pub fn base_position(&self) -> &Position {
        &self.base_position
    }

    pub fn can_go_back(&self) -> bool {
        self.view_index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.view_index < self.moves.len()
    }

    /// Move the cursor to `index`, clamped to `[0, len]`.
    /// Out of range values are normal while scrubbing and are not errors.
    pub fn go_to(&mut self, index: isize) {
        self.view_index = index.clamp(0, self.len_isize()) as usize;
    }

    pub fn go_forward(&mut self) {
        self.go_to(self.index_isize().saturating_add(1));
    }

    pub fn go_backward(&mut self) {
        self.go_to(self.index_isize().saturating_sub(1));
    }

    pub fn go_to_start(&mut self) {
        self.go_to(0);
    }

    pub fn go_to_end(&mut self) {
        self.go_to(self.len_isize());
    }

    /// Replace the navigated moves and view the final position,
    /// so the cursor follows a live game until the viewer scrubs back.
    pub fn update_moves(&mut self, moves: MoveHistory) {
        self.moves = moves;
        self.go_to_end();
    }

    /// The move that led to the viewed position, or None at the base position.
    pub fn last_move(&self) -> Option<Move> {
        self.view_index
            .checked_sub(1)
            .and_then(|idx| self.moves.get(idx))
            .copied()
    }

    /// Rebuild the viewed position from the base position.
    /// Err if a replayed move has no piece on its from square.
    pub fn position(&self) -> error::Result<Position> {
        compute_position(&self.base_position, &self.moves, Some(self.view_index))
    }

    fn index_isize(&self) -> isize {
        self.view_index as isize
    }

    // MoveHistory capacity is far below isize::MAX.
    fn len_isize(&self) -> isize {
        self.moves.len() as isize
    }
}

impl From<Position> for Navigator {
    fn from(position: Position) -> Self {
        Self::new(MoveHistory::new(), position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Square::*;

    fn four_moves() -> MoveHistory {
        [
            Move::new(E2, E4, None),
            Move::new(E7, E5, None),
            Move::new(G1, F3, None),
            Move::new(B8, C6, None),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn go_to_clamps_out_of_range() {
        let moves: MoveHistory = four_moves().into_iter().take(3).collect();
        let mut nav = Navigator::new(moves, Position::start_position());

        nav.go_to(-5);
        assert_eq!(nav.index(), 0);
        nav.go_to(10_000);
        assert_eq!(nav.index(), 3);
        nav.go_to(isize::MIN);
        assert_eq!(nav.index(), 0);
        nav.go_to(isize::MAX);
        assert_eq!(nav.index(), 3);
    }

    #[test]
    fn go_to_is_idempotent() {
        let mut nav = Navigator::new(four_moves(), Position::start_position());
        nav.go_to(2);
        let once = nav.clone();
        nav.go_to(2);
        assert_eq!(nav, once);
    }

    #[test]
    fn step_backward_from_end() {
        let mut nav = Navigator::at_end(four_moves(), Position::start_position());
        assert_eq!(nav.index(), 4);
        assert!(!nav.can_go_forward());

        nav.go_backward();
        nav.go_backward();
        assert_eq!(nav.index(), 2);

        let expected = compute_position(&Position::start_position(), &four_moves(), Some(2));
        assert_eq!(nav.position().unwrap(), expected.unwrap());
        assert_eq!(nav.last_move(), Some(Move::new(E7, E5, None)));
    }

    #[test]
    fn ends_match_base_and_full_replay() {
        let moves = four_moves();
        let base = Position::start_position();
        let mut nav = Navigator::new(moves.clone(), base);

        assert_eq!(nav.position().unwrap(), base);
        assert!(!nav.can_go_back());
        assert_eq!(nav.last_move(), None);
        nav.go_backward();
        assert_eq!(nav.index(), 0);

        nav.go_to_end();
        let mut folded = base;
        for move_ in &moves {
            folded.do_move(*move_).unwrap();
        }
        assert_eq!(nav.position().unwrap(), folded);

        nav.go_forward();
        assert_eq!(nav.index(), 4);
        nav.go_to_start();
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn update_moves_snaps_to_end() {
        let mut nav = Navigator::from(Position::start_position());
        assert!(nav.is_empty());
        assert_eq!(nav.index(), 0);

        nav.update_moves(four_moves());
        assert_eq!(nav.index(), 4);

        nav.go_to_start();
        let shorter: MoveHistory = four_moves().into_iter().take(1).collect();
        nav.update_moves(shorter);
        assert_eq!(nav.index(), 1);
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn compute_position_limits() {
        let base = Position::start_position();
        let moves = four_moves();
        assert_eq!(compute_position(&base, &moves, Some(0)).unwrap(), base);
        assert_eq!(
            compute_position(&base, &moves, Some(99)).unwrap(),
            compute_position(&base, &moves, None).unwrap()
        );
        assert!(compute_position(&base, &[Move::new(A3, A4, None)], None).is_err());
    }
}
