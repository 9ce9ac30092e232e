//! Pure drawing for the terminal frontend - no game logic in here
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::game::{GameStatus, Snapshot};
use crate::core::rules::LevelSpec;

/// Levels listed on the welcome screen
const PREVIEW_LEVELS: u32 = 5;

/// Everything the renderer needs for one frame
pub struct View<'a> {
    pub snapshot: &'a Snapshot,
    pub input: &'a str,
    /// Rejected guess, input box shakes red
    pub flash: bool,
}

pub fn render(f: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, chunks[0], view.snapshot);
    if view.snapshot.status == GameStatus::Idle {
        render_welcome(f, chunks[1], view.snapshot);
    } else {
        render_message(f, chunks[1], view.snapshot);
    }
    render_input(f, chunks[2], view);

    f.render_widget(
        Paragraph::new(help_text(view.snapshot.status))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray)),
        chunks[3],
    );
}

fn render_header(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let text = format!(
        "Level {}   Range 1-{}   Chances {}",
        snap.level, snap.range_max, snap.remaining_chances
    );
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().title(" NUMGUESS ").borders(Borders::ALL)),
        area,
    );
}

fn render_welcome(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let mut lines = vec![Line::from(snap.display_message()), Line::from("")];
    for spec in LevelSpec::table(PREVIEW_LEVELS) {
        lines.push(Line::from(format!(
            "Level {}: 1-{} with {} chances",
            spec.level, spec.range_max, spec.chances
        )));
    }
    lines.push(Line::from("..."));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().title(" WELCOME ").borders(Borders::ALL)),
        area,
    );
}

fn render_message(f: &mut Frame, area: Rect, snap: &Snapshot) {
    let style = match (snap.error, snap.status) {
        (Some(_), _) => Style::default().fg(Color::Yellow),
        (None, GameStatus::Won) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        (None, GameStatus::Lost) => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        (None, _) => Style::default(),
    };
    f.render_widget(
        Paragraph::new(snap.display_message())
            .style(style)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(Block::default().title(" MESSAGE ").borders(Borders::ALL)),
        area,
    );
}

fn render_input(f: &mut Frame, area: Rect, view: &View) {
    let border = if view.flash {
        Style::default().fg(Color::Red)
    } else if view.snapshot.is_running() {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    f.render_widget(
        Paragraph::new(view.input).block(
            Block::default()
                .title(" YOUR GUESS ")
                .borders(Borders::ALL)
                .border_style(border),
        ),
        area,
    );

    if view.snapshot.is_running() {
        let x = area.x + 1 + view.input.len() as u16;
        f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Only the keys that do something in this status
pub fn help_text(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Idle => "[Enter] Start  [Q] Quit",
        GameStatus::Running => "[0-9] Type  [Enter] Guess  [H] Hint  [Esc] Quit",
        GameStatus::Won => "[Enter/N] Next level  [R] Restart  [Q] Quit",
        GameStatus::Lost => "[Enter/R] Restart  [Q] Quit",
    }
}
