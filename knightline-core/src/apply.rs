//! Move application for the display model.
//!
//! `apply_move` updates the board, the side to move and the counters. It trusts
//! the caller: the move is assumed to have been accepted by a
//! [`RulesEngine`](crate::rules::RulesEngine) beforehand. Board placement follows
//! the move completely, so a castling king brings its rook along and a pawn
//! captured en passant is removed. The metadata is not recomputed: castling
//! rights are copied, the en passant target is cleared and the halfmove clock
//! is reset. Use the rules engine whenever full chess semantics matter.

use crate::coretypes::{Color, File, Move, Piece, PieceKind, Square};
use crate::error::{self, ErrorKind};
use crate::mailbox::Mailbox;
use crate::position::Position;

/// Returns a new Position with `move_` applied to `position`.
///
/// A pawn landing on the first or last rank is replaced by a piece of the
/// requested promotion kind, or a queen if none was given.
///
/// Err is returned if there is no piece on the from square.
pub fn apply_move(position: &Position, move_: Move) -> error::Result<Position> {
    let mut board = position.board;

    let piece = board
        .take(move_.from)
        .ok_or((ErrorKind::InvalidMoveSource, move_))?;

    match piece.piece_kind {
        PieceKind::King => relocate_castling_rook(&mut board, move_),
        PieceKind::Pawn => remove_en_passant_victim(&mut board, move_),
        _ => (),
    }

    let moved_piece = if piece.piece_kind == PieceKind::Pawn && move_.to.rank().is_back_rank() {
        Piece::new(piece.color, move_.promotion.unwrap_or(PieceKind::Queen))
    } else {
        piece
    };

    // Whatever stood on `to` is overwritten.
    board[move_.to] = Some(moved_piece);

    let fullmoves = match position.side_to_move {
        Color::Black => position.fullmoves.saturating_add(1),
        Color::White => position.fullmoves,
    };

    Ok(Position {
        board,
        side_to_move: !position.side_to_move,
        castling: position.castling,
        en_passant: None,
        halfmoves: 0,
        fullmoves,
    })
}

/// A king stepping two files along its rank castles, and the corner rook on
/// that side lands on the square the king crossed.
fn relocate_castling_rook(board: &mut Mailbox, move_: Move) {
    let (from, to) = (move_.from, move_.to);
    if from.rank() != to.rank() || from.file() != File::E {
        return;
    }
    let (corner, crossed) = match to.file() {
        File::G => (File::H, File::F),
        File::C => (File::A, File::D),
        _ => return,
    };
    let rank = from.rank();
    if let Some(rook) = board.take(Square::from((corner, rank))) {
        board[Square::from((crossed, rank))] = Some(rook);
    }
}

/// A pawn changing file onto an empty square captures en passant. The
/// captured pawn stands beside the origin, on the destination file.
fn remove_en_passant_victim(board: &mut Mailbox, move_: Move) {
    let (from, to) = (move_.from, move_.to);
    if from.file() == to.file() || board[to].is_some() {
        return;
    }
    board[Square::from((to.file(), from.rank()))] = None;
}
