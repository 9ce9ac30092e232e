use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind};
use futures_util::StreamExt;
use rand::rngs::StdRng;
use rand_core::RngCore;
use ratatui::DefaultTerminal;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::core::engine::GameEngine;
use crate::core::game::{GameStatus, Snapshot};
use crate::tui::renderer::{self, View};

/// How long the input box stays red after a rejected guess
const FLASH: Duration = Duration::from_millis(400);
const REDRAW: Duration = Duration::from_millis(100);
/// Longest guess that can be typed; i32 has ten digits
const MAX_INPUT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Full-screen frontend: turns key presses into engine commands and draws the
/// latest snapshot it was notified about.
pub struct App<R = StdRng> {
    engine: GameEngine<R>,
    updates: watch::Receiver<Snapshot>,
    view: Snapshot,
    input: String,
    flash_until: Option<Instant>,
}

impl<R: RngCore> App<R> {
    pub fn new(engine: GameEngine<R>) -> Self {
        let updates = engine.subscribe();
        let view = engine.snapshot();
        Self {
            engine,
            updates,
            view,
            input: String::new(),
            flash_until: None,
        }
    }

    pub fn view(&self) -> &Snapshot {
        &self.view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn flashing(&self) -> bool {
        self.flash_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind != KeyEventKind::Press {
            return Flow::Continue;
        }

        let status = self.engine.state().status();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Flow::Quit,
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if status == GameStatus::Running && self.input.len() < MAX_INPUT {
                    self.input.push(c);
                }
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('h') | KeyCode::Char('H') if status == GameStatus::Running => {
                // the typed number stays so the player can guess it next
                self.engine.on_hint(Some(self.input.as_str()));
            }
            KeyCode::Char('n') | KeyCode::Char('N') if status == GameStatus::Won => {
                self.input.clear();
                self.engine.go_next_level();
            }
            KeyCode::Char('r') | KeyCode::Char('R') if status != GameStatus::Running => {
                self.input.clear();
                self.engine.restart_game();
            }
            KeyCode::Enter => self.confirm(status),
            _ => {}
        }

        self.sync();
        Flow::Continue
    }

    /// Enter does whatever the current status calls for
    fn confirm(&mut self, status: GameStatus) {
        match status {
            GameStatus::Idle => {
                self.engine.start_game();
            }
            GameStatus::Running => {
                let guess = std::mem::take(&mut self.input);
                let snap = self.engine.on_guess(&guess);
                if snap.error.is_some() {
                    self.flash_until = Some(Instant::now() + FLASH);
                }
            }
            GameStatus::Won => {
                self.engine.go_next_level();
            }
            GameStatus::Lost => {
                self.engine.restart_game();
            }
        }
    }

    fn sync(&mut self) {
        if self.updates.has_changed().unwrap_or(false) {
            self.view = self.updates.borrow_and_update().clone();
            debug!(status = ?self.view.status, level = self.view.level, "view updated");
        }
    }

    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let mut events = EventStream::new();
        let mut redraw = tokio::time::interval(REDRAW);

        loop {
            let flash = self.flashing();
            terminal.draw(|f| {
                renderer::render(
                    f,
                    &View {
                        snapshot: &self.view,
                        input: &self.input,
                        flash,
                    },
                )
            })?;

            tokio::select! {
                maybe_event = events.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if self.handle_key(key) == Flow::Quit {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => break,
                    }
                }

                Ok(()) = self.updates.changed() => {
                    self.sync();
                }

                _ = redraw.tick() => {
                    if !self.flashing() {
                        self.flash_until = None;
                    }
                }
            }
        }

        info!(level = self.view.level, "leaving game");
        Ok(())
    }
}

/// Take over the terminal, play until the player quits, then hand it back.
pub async fn play<R: RngCore>(engine: GameEngine<R>) -> Result<()> {
    let terminal = ratatui::init();
    let result = App::new(engine).run(terminal).await;
    ratatui::restore();
    result
}
