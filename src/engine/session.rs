//! One game instance: grid, turn, mode, and the round state machine.

use serde::Serialize;
use tracing::{debug, warn};

use super::bot_strategy::{BotStrategy, HeuristicStrategy};
use super::grid::Grid;
use super::models::{BoardSize, Mark, Mode, SessionId};

pub const WELCOME_MESSAGE: &str = "Welcome to the Fields of Strife";
pub const MOVE_ACCEPTED: &str = "Move accepted.";
pub const INVALID_POSITION: &str = "Invalid input. That is not a valid position.";
pub const POSITION_TAKEN: &str = "Invalid input. That position is taken.";
pub const STALEMATE: &str = "Stalemate";
pub const HUMAN_WINS_VS_COMPUTER: &str = "You win. Congrats!";
pub const COMPUTER_WINS: &str = "You lose. Really?";

/// A game in progress (or finished). Finished sessions are not locked:
/// further rounds are still processed and may overwrite `result`.
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    pub id: SessionId,
    pub size: BoardSize,
    pub mode: Mode,
    pub grid: Grid,
    pub turn: Mark,
    pub message: String,
    pub result: Option<String>,
}

impl GameSession {
    pub fn new(id: impl Into<SessionId>, size: BoardSize, mode: Mode) -> Self {
        Self {
            id: id.into(),
            size,
            mode,
            grid: Grid::new(size),
            turn: Mark::Player1,
            message: WELCOME_MESSAGE.to_string(),
            result: None,
        }
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Play one round with the built-in heuristic opponent.
    pub fn round(&mut self, raw_position: &str) {
        self.round_with(raw_position, &HeuristicStrategy);
    }

    /// Play one round. Rejected input only updates `message`.
    pub fn round_with(&mut self, raw_position: &str, bot: &dyn BotStrategy) {
        let pos = match self.grid.normalize_position(raw_position) {
            Ok(pos) => pos,
            Err(_) => {
                debug!(session_id = %self.id, input = raw_position, "rejected malformed position");
                self.message = INVALID_POSITION.to_string();
                return;
            }
        };
        if self.grid.apply_mark(pos, self.turn).is_err() {
            debug!(session_id = %self.id, position = %pos, "rejected taken position");
            self.message = POSITION_TAKEN.to_string();
            return;
        }
        self.message = MOVE_ACCEPTED.to_string();
        debug!(session_id = %self.id, position = %pos, mark = %self.turn, "move accepted");

        match self.mode {
            Mode::HumanVsHuman => self.turn = self.turn.other(),
            Mode::HumanVsComputer => {
                // `turn` stays with the human in this mode.
                if let Some(reply) = bot.choose_move(&self.grid, Mark::COMPUTER, Mark::Player1) {
                    if self.grid.apply_mark(reply, Mark::COMPUTER).is_err() {
                        warn!(session_id = %self.id, position = %reply, "bot chose a taken cell");
                    }
                }
            }
        }
        self.evaluate_result();
    }

    /// Re-check the grid for a terminal state and record it in `result`.
    /// Leaves `result` untouched when the game is still open.
    pub fn evaluate_result(&mut self) -> Option<&str> {
        let outcome = match self.mode {
            Mode::HumanVsHuman => {
                if self.grid.evaluate_win(Mark::Player1) {
                    Some(format!("{} wins! Congrats!", Mark::Player1))
                } else if self.grid.evaluate_win(Mark::Player2) {
                    Some(format!("{} wins! Congrats!", Mark::Player2))
                } else if self.grid.is_full() {
                    Some(STALEMATE.to_string())
                } else {
                    None
                }
            }
            Mode::HumanVsComputer => {
                if self.grid.evaluate_win(Mark::Player1) {
                    Some(HUMAN_WINS_VS_COMPUTER.to_string())
                } else if self.grid.evaluate_win(Mark::COMPUTER) {
                    Some(COMPUTER_WINS.to_string())
                } else if self.grid.is_full() {
                    Some(STALEMATE.to_string())
                } else {
                    None
                }
            }
        };
        if let Some(outcome) = outcome {
            debug!(session_id = %self.id, result = %outcome, "game finished");
            self.result = Some(outcome);
        }
        self.result.as_deref()
    }
}
