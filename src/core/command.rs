//! Text commands understood by the line frontends
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Start,
    Guess(String),
    Hint(Option<String>),
    NextLevel,
    Restart,
}

/// Anything that is not a keyword is taken as a guess, so the engine gets to
/// reject free text the same way it rejects a bad number.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "n" | "next" => Command::NextLevel,
        "r" | "restart" => Command::Restart,
        "h" | "hint" => {
            if rest.is_empty() {
                Command::Hint(None)
            } else {
                Command::Hint(Some(rest.to_string()))
            }
        }
        "g" | "guess" => Command::Guess(rest.to_string()),
        _ => Command::Guess(trimmed.to_string()),
    }
}
