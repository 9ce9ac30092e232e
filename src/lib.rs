pub mod cli;
pub mod console;
pub mod core;
pub mod tui;

// Re-export for convenience
pub use crate::core::command::{parse_command, Command};
pub use crate::core::engine::GameEngine;
pub use crate::core::game::{GameState, GameStatus, GuessError, Notice, Snapshot};
pub use crate::core::rules::LevelSpec;
