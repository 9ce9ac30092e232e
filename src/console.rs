//! Line-oriented frontend: one command per input line, one snapshot per output line.
//!
//! Works over any reader/writer pair so it can be scripted or piped, and with
//! `--json` every update is a single JSON object.
use std::io::{BufRead, Write};

use anyhow::Result;
use rand::rngs::StdRng;
use rand_core::RngCore;
use tracing::debug;

use crate::core::command::{parse_command, Command};
use crate::core::engine::GameEngine;
use crate::core::game::{GameStatus, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub struct Console<R = StdRng> {
    engine: GameEngine<R>,
    format: OutputFormat,
}

impl<R: RngCore> Console<R> {
    pub fn new(engine: GameEngine<R>, format: OutputFormat) -> Self {
        Self { engine, format }
    }

    /// Starts a game and plays it until EOF or `quit`.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<()> {
        let snap = self.engine.start_game();
        self.print(&mut output, &snap)?;

        for line in input.lines() {
            let line = line?;
            if is_quit(&line) {
                debug!("console quit");
                break;
            }
            let command = parse_command(&line);
            let current = self.engine.snapshot();
            if let Some(reason) = refusal(&command, &current) {
                debug!(?command, status = ?current.status, "console command refused");
                self.refuse(&mut output, reason, &current)?;
                continue;
            }
            debug!(?command, "console command");
            let snap = self.engine.apply(command);
            self.print(&mut output, &snap)?;
        }

        output.flush()?;
        Ok(())
    }

    /// The state is untouched, so JSON consumers just see the same snapshot again.
    fn refuse<W: Write>(&self, out: &mut W, reason: &str, current: &Snapshot) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.print(out, current),
            OutputFormat::Text => {
                writeln!(out, "{}", reason)?;
                Ok(())
            }
        }
    }

    fn print<W: Write>(&self, out: &mut W, snap: &Snapshot) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, snap)?;
                writeln!(out)?;
            }
            OutputFormat::Text => {
                writeln!(
                    out,
                    "[level {} | 1-{} | chances {} | {}] {}",
                    snap.level,
                    snap.range_max,
                    snap.remaining_chances,
                    status_label(snap.status),
                    snap.display_message()
                )?;
                match snap.status {
                    GameStatus::Won => writeln!(
                        out,
                        "Type 'next' for level {} or 'restart'.",
                        snap.level.saturating_add(1)
                    )?,
                    GameStatus::Lost => writeln!(out, "Type 'restart' to play again.")?,
                    GameStatus::Idle | GameStatus::Running => {}
                }
            }
        }
        Ok(())
    }
}

/// Next level only after a win, restart only once the level is over.
fn refusal(command: &Command, current: &Snapshot) -> Option<&'static str> {
    match command {
        Command::NextLevel if !current.can_advance() => {
            Some("Win this level before moving on.")
        }
        Command::Start | Command::Restart
            if !(current.can_restart() || current.status == GameStatus::Idle) =>
        {
            Some("Finish this level before restarting.")
        }
        _ => None,
    }
}

fn is_quit(line: &str) -> bool {
    matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "q" | "quit" | "exit"
    )
}

fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Idle => "idle",
        GameStatus::Running => "running",
        GameStatus::Won => "won",
        GameStatus::Lost => "lost",
    }
}
