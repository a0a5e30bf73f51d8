//! MoveList types used in Knightline.
//!
//! The underlying type of MoveHistory may change at any time during
//! pre-1.0 development, so a type alias makes changes easy.

use std::fmt::Display;

use arrayvec::ArrayVec;

use crate::coretypes::{Move, MAX_HISTORY};

/// MoveHistory is the ordered sequence of moves played in a game,
/// holding at most `MAX_HISTORY` plies.
pub type MoveHistory = ArrayVec<Move, MAX_HISTORY>;

/// Returns a string with the displayed string format of an ArrayVec,
/// items separated by single spaces.
/// Display cannot be implemented on external types, so this stands in for it.
pub fn display<T: Display, const CAP: usize>(arrayvec: &ArrayVec<T, CAP>) -> String {
    let mut displayed = String::new();
    for item in arrayvec.iter() {
        displayed.push_str(&item.to_string());
        displayed.push(' ');
    }
    displayed.pop();

    displayed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coretypes::Square::*;

    #[test]
    fn display_move_history() {
        let mut moves = MoveHistory::new();
        assert_eq!(display(&moves), "");

        moves.push(Move::new(E2, E4, None));
        moves.push(Move::new(E7, E5, None));
        assert_eq!(display(&moves), "e2e4 e7e5");
    }
}
