//! One game of checkers as an explicit state machine.
//!
//! The session owns the board and the turn state; the rules themselves live
//! in [`crate::checkers::engine`]. Illegal states are unrepresentable: the
//! session is always exactly awaiting a move, forcing a capture chain, or
//! finished.

use crate::checkers::engine::{self, MoveError};
use crate::types::{Board, Color, Square};

/// Where the session stands between moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Waiting for `player` to move any of their pieces.
    AwaitingMove {
        /// The side to move.
        player: Color,
    },
    /// `player` captured and must continue jumping with the piece on
    /// `square` before the turn can end.
    ForcedContinuation {
        /// The side mid-chain.
        player: Color,
        /// The only square allowed to move.
        square: Square,
    },
    /// The game is decided. Only a restart leaves this state.
    Finished {
        /// The winning side.
        winner: Color,
    },
}

impl TurnState {
    /// The side currently to move, if the game is still running.
    #[must_use]
    pub const fn player(&self) -> Option<Color> {
        match self {
            Self::AwaitingMove { player } | Self::ForcedContinuation { player, .. } => {
                Some(*player)
            }
            Self::Finished { .. } => None,
        }
    }

    /// The winner, once the game is decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::Finished { winner } => Some(*winner),
            _ => None,
        }
    }
}

/// What a successfully executed move meant for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Square of the captured piece, if the move captured.
    pub captured: Option<Square>,
    /// Whether the moving piece was crowned.
    pub promoted: bool,
    /// False while a capture chain keeps the turn open.
    pub turn_ended: bool,
    /// Set when this move decided the game.
    pub winner: Option<Color>,
}

/// A running game: board plus turn state. Red moves first.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    state: TurnState,
}

impl GameSession {
    /// Start a fresh game on the standard board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::standard(),
            state: TurnState::AwaitingMove { player: Color::Red },
        }
    }

    /// Start from an arbitrary position with `to_move` on turn.
    #[must_use]
    pub fn from_board(board: Board, to_move: Color) -> Self {
        Self {
            board,
            state: TurnState::AwaitingMove { player: to_move },
        }
    }

    /// The current board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The current turn state.
    #[must_use]
    pub const fn state(&self) -> TurnState {
        self.state
    }

    /// The side to move, if the game is still running. Unchanged while a
    /// capture chain is pending.
    #[must_use]
    pub const fn current_player(&self) -> Option<Color> {
        self.state.player()
    }

    /// The winner, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        self.state.winner()
    }

    /// Destinations for the piece on `from`, regardless of whose turn it
    /// is. Used for client-side hinting.
    #[must_use]
    pub fn valid_moves(&self, from: Square) -> Vec<Square> {
        engine::valid_moves(&self.board, from)
    }

    /// Validate and execute a move for the side on turn.
    ///
    /// A finished session rejects everything; a pending capture chain pins
    /// `from` to the chaining piece. When the move ends the turn, the other
    /// side comes on turn and the terminal check runs; a capture that
    /// leaves a further jump open keeps the same side on turn instead.
    ///
    /// Rejections leave board and state untouched.
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
        let (player, mid_chain) = match self.state {
            TurnState::Finished { .. } => return Err(MoveError::GameFinished),
            TurnState::ForcedContinuation { player, square } => {
                if from != square {
                    return Err(MoveError::ContinuationRequired { square });
                }
                (player, true)
            }
            TurnState::AwaitingMove { player } => (player, false),
        };

        let applied = engine::apply(&mut self.board, player, from, to, mid_chain)?;

        if applied.chain_continues {
            self.state = TurnState::ForcedContinuation { player, square: to };
            return Ok(MoveOutcome {
                captured: applied.captured,
                promoted: applied.promoted,
                turn_ended: false,
                winner: None,
            });
        }

        let next = player.opposite();
        let winner = engine::winner(&self.board, next);
        self.state = match winner {
            Some(winner) => TurnState::Finished { winner },
            None => TurnState::AwaitingMove { player: next },
        };
        Ok(MoveOutcome {
            captured: applied.captured,
            promoted: applied.promoted,
            turn_ended: true,
            winner,
        })
    }

    /// Reset to a fresh standard board with red to move.
    pub fn restart(&mut self) {
        *self = Self::new();
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
