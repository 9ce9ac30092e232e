//! Game state types shared by the engine and every frontend
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::rules::LevelSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Idle,
    Running,
    Won,
    Lost,
}

/// Why the last guess was rejected. Advisory only, the state is otherwise untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum GuessError {
    #[error("Please enter a whole number.")]
    InvalidInput,
    #[error("That number is outside the range.")]
    OutOfRange,
}

/// Feedback shown to the player after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    Welcome,
    NewRound { range_max: u32 },
    TooHigh,
    TooLow,
    Won { target: u32 },
    Lost { target: u32 },
    HintsUnavailable,
    HintNeedsNumber,
    HintLower { reference: i32 },
    HintHigher { reference: i32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Welcome => write!(f, "Welcome! Press Enter to start."),
            Notice::NewRound { range_max } => {
                write!(f, "New round! I'm thinking of a number between 1 and {}.", range_max)
            }
            Notice::TooHigh => write!(f, "Too high!"),
            Notice::TooLow => write!(f, "Too low!"),
            Notice::Won { target } => write!(f, "Correct! The number was {}.", target),
            Notice::Lost { target } => write!(f, "Out of chances! The number was {}.", target),
            Notice::HintsUnavailable => write!(f, "Not enough chances left for a hint."),
            Notice::HintNeedsNumber => write!(f, "Enter a number first, then ask for a hint."),
            Notice::HintLower { reference } => {
                write!(f, "Hint: the number is lower than {}.", reference)
            }
            Notice::HintHigher { reference } => {
                write!(f, "Hint: the number is higher than {}.", reference)
            }
        }
    }
}

/// One session's state. Replaced wholesale by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) level: u32,
    pub(crate) target: u32,
    pub(crate) range_max: u32,
    pub(crate) remaining_chances: u32,
    pub(crate) notice: Notice,
    pub(crate) status: GameStatus,
    pub(crate) error: Option<GuessError>,
}

impl Default for GameState {
    fn default() -> Self {
        let spec = LevelSpec::for_level(1);
        Self {
            level: spec.level,
            target: 0,
            range_max: spec.range_max,
            remaining_chances: spec.chances,
            notice: Notice::Welcome,
            status: GameStatus::Idle,
            error: None,
        }
    }
}

impl GameState {
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn range_max(&self) -> u32 {
        self.range_max
    }

    pub fn remaining_chances(&self) -> u32 {
        self.remaining_chances
    }

    pub fn notice(&self) -> Notice {
        self.notice
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn error(&self) -> Option<GuessError> {
        self.error
    }

    /// The observer-facing view. The target only shows up once the level is over.
    pub fn snapshot(&self) -> Snapshot {
        let revealed = match self.status {
            GameStatus::Won | GameStatus::Lost => Some(self.target),
            GameStatus::Idle | GameStatus::Running => None,
        };
        Snapshot {
            level: self.level,
            range_max: self.range_max,
            remaining_chances: self.remaining_chances,
            message: self.notice.to_string(),
            status: self.status,
            error: self.error,
            revealed,
        }
    }
}

/// What frontends render. Never carries the target of a running level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub level: u32,
    pub range_max: u32,
    pub remaining_chances: u32,
    pub message: String,
    pub status: GameStatus,
    pub error: Option<GuessError>,
    pub revealed: Option<u32>,
}

impl Default for Snapshot {
    fn default() -> Self {
        GameState::default().snapshot()
    }
}

impl Snapshot {
    /// Text for the message area: a rejected guess overrides the last notice.
    pub fn display_message(&self) -> String {
        match self.error {
            Some(GuessError::InvalidInput) => GuessError::InvalidInput.to_string(),
            Some(GuessError::OutOfRange) => {
                format!("Enter a number between 1 and {}.", self.range_max)
            }
            None => self.message.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn can_advance(&self) -> bool {
        self.status == GameStatus::Won
    }

    pub fn can_restart(&self) -> bool {
        matches!(self.status, GameStatus::Won | GameStatus::Lost)
    }
}
