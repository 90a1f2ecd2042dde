//! Pure move generation and application over a [`Board`].
//!
//! Everything here is synchronous and side-effect free apart from mutating
//! the board passed to [`apply`]. Session-level concerns (whose turn it is,
//! pending capture chains, restarts) live in [`crate::session::game`];
//! this module only answers what a single piece may do and what a single
//! move does to the board.
//!
//! Rejections never leave the board changed: every precondition is checked
//! before the first square is touched.

use crate::types::{Board, Color, Piece, Rank, Square};

/// The four diagonal directions as `(row, col)` deltas.
const DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Why a requested move was rejected.
///
/// These are expected outcomes of validating untrusted input, not faults;
/// callers report them to the requesting player and carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// A capture chain is pending and only the chaining piece may move.
    #[error("capture must continue from {square}")]
    ContinuationRequired {
        /// The square the chaining piece currently occupies.
        square: Square,
    },
    /// The game has already been decided.
    #[error("game is already over")]
    GameFinished,
    /// The source square holds no piece.
    #[error("no piece on the source square")]
    EmptySource,
    /// The source piece does not belong to the player to move.
    #[error("piece does not belong to the player to move")]
    NotYourPiece,
    /// The destination square is occupied.
    #[error("destination square is occupied")]
    DestinationOccupied,
    /// An own piece lies on a king's sliding path.
    #[error("own piece blocks the path")]
    PathBlocked,
    /// More than one enemy piece lies on a king's sliding path.
    #[error("a slide may capture at most one piece")]
    MultipleCapturesOnPath,
    /// A man may only step toward its crown row.
    #[error("men may only step toward the far row")]
    BackwardStep,
    /// Plain steps are not allowed while a capture chain is pending.
    #[error("only a jump may continue a capture chain")]
    StepDuringCapture,
    /// The jumped-over square does not hold an opposing piece.
    #[error("jump does not cross an opposing piece")]
    NothingToCapture,
    /// The move matches no legal pattern.
    #[error("move matches no legal pattern")]
    IllegalGeometry,
}

/// What a successfully applied move did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    /// Square of the removed enemy piece, when the move captured.
    pub captured: Option<Square>,
    /// Whether the moving piece was crowned by this move.
    pub promoted: bool,
    /// Whether the same piece has a further jump available and the turn
    /// must not end yet. Only short jumps chain; king slides never do.
    pub chain_continues: bool,
}

/// Destinations reachable from `from` in a single move.
///
/// A man gets its two forward steps onto empty squares plus two-square
/// jumps over an adjacent enemy in all four directions. A king gets a
/// per-direction scan: empty squares along the ray are destinations, and
/// when the first occupied square holds an enemy with an empty square
/// immediately beyond, that landing square is a capture destination. The
/// scan stops at the first piece it meets either way.
///
/// An empty `from` yields no destinations. Order carries no priority.
#[must_use]
pub fn valid_moves(board: &Board, from: Square) -> Vec<Square> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let mut moves = Vec::new();
    match piece.rank {
        Rank::Man => {
            for (d_row, d_col) in DIRECTIONS {
                if d_row == piece.color.forward() {
                    if let Some(step) = from.offset(d_row, d_col) {
                        if board.get(step).is_none() {
                            moves.push(step);
                        }
                    }
                }
                if let (Some(over), Some(landing)) =
                    (from.offset(d_row, d_col), from.offset(2 * d_row, 2 * d_col))
                {
                    if board.get(landing).is_none()
                        && board.get(over).is_some_and(|p| p.color != piece.color)
                    {
                        moves.push(landing);
                    }
                }
            }
        }
        Rank::King => {
            for (d_row, d_col) in DIRECTIONS {
                let mut cursor = from;
                while let Some(next) = cursor.offset(d_row, d_col) {
                    match board.get(next) {
                        None => {
                            moves.push(next);
                            cursor = next;
                        }
                        Some(other) if other.color != piece.color => {
                            if let Some(landing) = next.offset(d_row, d_col) {
                                if board.get(landing).is_none() {
                                    moves.push(landing);
                                }
                            }
                            break;
                        }
                        Some(_) => break,
                    }
                }
            }
        }
    }
    moves
}

/// True when the piece on `from` can make a short jump right now: some
/// adjacent diagonal holds an enemy piece with an empty landing square
/// immediately beyond it, both within the board.
#[must_use]
pub fn can_capture_from(board: &Board, from: Square) -> bool {
    let Some(piece) = board.get(from) else {
        return false;
    };
    DIRECTIONS.iter().any(|&(d_row, d_col)| {
        match (from.offset(d_row, d_col), from.offset(2 * d_row, 2 * d_col)) {
            (Some(over), Some(landing)) => {
                board.get(landing).is_none()
                    && board.get(over).is_some_and(|p| p.color != piece.color)
            }
            _ => false,
        }
    })
}

/// True when any piece of `color` has at least one destination.
#[must_use]
pub fn side_has_moves(board: &Board, color: Color) -> bool {
    board
        .pieces_of(color)
        .any(|(square, _)| !valid_moves(board, square).is_empty())
}

/// Terminal check, run after a turn-ending move with `to_move` being the
/// side whose turn is starting.
///
/// A side with no pieces left loses outright; otherwise a side to move
/// with no legal destination anywhere loses. Returns the winner, or `None`
/// while the game continues.
#[must_use]
pub fn winner(board: &Board, to_move: Color) -> Option<Color> {
    if board.count(Color::Red) == 0 {
        return Some(Color::Blue);
    }
    if board.count(Color::Blue) == 0 {
        return Some(Color::Red);
    }
    if !side_has_moves(board, to_move) {
        return Some(to_move.opposite());
    }
    None
}

/// Validate and apply a single move for `mover`.
///
/// Patterns, in precedence order:
///
/// 1. king diagonal slide of any distance, capturing when exactly one
///    enemy lies on the path;
/// 2. a man's single forward step (rejected while `mid_chain`);
/// 3. a two-square jump over an adjacent enemy, which promotes on the
///    crown row and reports [`Applied::chain_continues`] when a further
///    jump exists from the landing square.
///
/// On rejection the board is untouched.
pub fn apply(
    board: &mut Board,
    mover: Color,
    from: Square,
    to: Square,
    mid_chain: bool,
) -> Result<Applied, MoveError> {
    let piece = board.get(from).ok_or(MoveError::EmptySource)?;
    if piece.color != mover {
        return Err(MoveError::NotYourPiece);
    }
    if board.get(to).is_some() {
        return Err(MoveError::DestinationOccupied);
    }

    let d_row = to.row() as i8 - from.row() as i8;
    let d_col = to.col() as i8 - from.col() as i8;

    if piece.is_king() && d_row.abs() == d_col.abs() {
        return apply_slide(board, piece, from, to, d_row, d_col);
    }

    if d_row.abs() == 1 && d_col.abs() == 1 {
        if mid_chain {
            return Err(MoveError::StepDuringCapture);
        }
        if d_row != mover.forward() {
            return Err(MoveError::BackwardStep);
        }
        let landed = crowned(piece, to);
        board.set(to, Some(landed));
        board.set(from, None);
        return Ok(Applied {
            captured: None,
            promoted: landed.rank != piece.rank,
            chain_continues: false,
        });
    }

    if d_row.abs() == 2 && d_col.abs() == 2 {
        let Some(over) = from.offset(d_row / 2, d_col / 2) else {
            return Err(MoveError::IllegalGeometry);
        };
        return match board.get(over) {
            Some(victim) if victim.color != mover => {
                let landed = crowned(piece, to);
                board.set(to, Some(landed));
                board.set(from, None);
                board.set(over, None);
                Ok(Applied {
                    captured: Some(over),
                    promoted: landed.rank != piece.rank,
                    chain_continues: can_capture_from(board, to),
                })
            }
            _ => Err(MoveError::NothingToCapture),
        };
    }

    Err(MoveError::IllegalGeometry)
}

/// Walk a king's path between `from` and `to` exclusive and move it,
/// removing the single jumped enemy when there is one.
fn apply_slide(
    board: &mut Board,
    piece: Piece,
    from: Square,
    to: Square,
    d_row: i8,
    d_col: i8,
) -> Result<Applied, MoveError> {
    let step_row = d_row.signum();
    let step_col = d_col.signum();

    let mut enemy = None;
    let mut cursor = from;
    loop {
        let Some(next) = cursor.offset(step_row, step_col) else {
            return Err(MoveError::IllegalGeometry);
        };
        if next == to {
            break;
        }
        if let Some(other) = board.get(next) {
            if other.color == piece.color {
                return Err(MoveError::PathBlocked);
            }
            if enemy.is_some() {
                return Err(MoveError::MultipleCapturesOnPath);
            }
            enemy = Some(next);
        }
        cursor = next;
    }

    if let Some(square) = enemy {
        board.set(square, None);
    }
    board.set(to, Some(piece));
    board.set(from, None);
    Ok(Applied {
        captured: enemy,
        promoted: false,
        chain_continues: false,
    })
}

/// The piece as it lands on `to`: crowned when a man reaches its far row.
fn crowned(piece: Piece, to: Square) -> Piece {
    if piece.rank == Rank::Man && to.row() == piece.color.crown_row() {
        piece.promoted()
    } else {
        piece
    }
}
