use std::{
    collections::VecDeque,
    io::{self, Stdout},
    time::Duration,
};

use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Terminal,
};
use rochambeau_controller::{command_for_key, CommandSource};
use rochambeau_types::{
    events::{EventPayload, GameEvent},
    hud::{HudView, PhaseKind},
    moves::{Command, Outcome},
    vision::ImageFrame,
    Result, RochambeauError,
};
use rochambeau_vision::{render_error, Renderer};

const MAX_LOG_ENTRIES: usize = 120;

/// Score board and event log drawn in the terminal.
pub struct TerminalHud {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    logs: VecDeque<String>,
    active: bool,
}

impl TerminalHud {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            logs: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            active: true,
        })
    }

    pub fn restore(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.terminal.show_cursor()?;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        Ok(())
    }

    fn draw(&mut self, frame: &ImageFrame, view: &HudView) -> io::Result<()> {
        let logs = &self.logs;
        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Length(5),
                        Constraint::Min(0),
                        Constraint::Length(3),
                    ]
                    .as_ref(),
                )
                .split(f.size());

            let mut header = vec![
                Span::styled(
                    format!("CPU: {}", view.cpu_score),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(
                    format!("Player: {}", view.player_score),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("   "),
                Span::styled(format!("Round {}", view.round), Style::default().fg(Color::Gray)),
            ];
            if let Some(label) = view.cpu_label() {
                header.push(Span::raw("   "));
                header.push(Span::styled("CPU plays", Style::default().fg(Color::Magenta)));
                header.push(Span::raw(" "));
                header.push(Span::styled(
                    label,
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
            }
            let header = Paragraph::new(Line::from(header))
                .block(Block::default().borders(Borders::ALL).title("Rochambeau"));
            f.render_widget(header, chunks[0]);

            let stage = Paragraph::new(stage_lines(view, frame))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(stage, chunks[1]);

            let items: Vec<ListItem> = logs
                .iter()
                .rev()
                .map(|entry| ListItem::new(entry.clone()))
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title("Recent events"));
            f.render_widget(list, chunks[2]);

            let footer = Paragraph::new(view.instruction())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(footer, chunks[3]);
        })?;
        Ok(())
    }
}

impl Renderer for TerminalHud {
    fn render(&mut self, frame: &mut ImageFrame, view: &HudView) -> Result<()> {
        self.draw(frame, view)
            .map_err(|err| render_error(format!("terminal draw failed: {err}")))
    }

    fn on_event(&mut self, event: &GameEvent) {
        if self.logs.len() == MAX_LOG_ENTRIES {
            self.logs.pop_front();
        }
        self.logs.push_back(format_event(event));
    }
}

impl Drop for TerminalHud {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn stage_lines(view: &HudView, frame: &ImageFrame) -> Vec<Line<'static>> {
    let big = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let headline = match (view.phase, view.countdown_stage, view.outcome) {
        (PhaseKind::Idle, _, _) => Line::styled("Ready?", big),
        (PhaseKind::Countdown, Some(stage), _) => Line::styled(stage.to_string(), big),
        (PhaseKind::Countdown, None, _) => Line::raw(""),
        (PhaseKind::ResultShown, _, Some(outcome)) => {
            let player = view.player_move.map(|m| m.label()).unwrap_or("?");
            let cpu = view.cpu_move.map(|m| m.label()).unwrap_or("?");
            Line::styled(format!("{player} vs {cpu}: {}", outcome_text(outcome)), big)
        }
        (PhaseKind::ResultShown, _, None) => Line::raw(""),
    };
    let gesture = match view.gesture {
        Some(mv) => mv.label().to_uppercase(),
        None => "no gesture".to_string(),
    };
    let seen = match view.handedness {
        Some(hand) => format!("Seeing: {gesture} ({hand:?} hand)"),
        None => format!("Seeing: {gesture}"),
    };
    vec![
        headline,
        Line::raw(seen),
        Line::styled(
            format!("frame #{} ({}x{})", frame.sequence, frame.width, frame.height),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

fn outcome_text(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::PlayerWins => "you win",
        Outcome::CpuWins => "CPU wins",
        Outcome::Draw => "draw",
    }
}

fn format_event(event: &GameEvent) -> String {
    let timestamp = event.timestamp.format("%H:%M:%S");
    match &event.payload {
        EventPayload::Lifecycle(lifecycle) => format!(
            "[{}] Lifecycle::{:?} {}",
            timestamp,
            lifecycle.phase,
            lifecycle.details.clone().unwrap_or_default()
        ),
        EventPayload::RoundStarted { round } => format!("[{}] Round {} started", timestamp, round),
        EventPayload::RoundResolved(record) => format!(
            "[{}] Round {}: {} vs {} -> {:?}{}",
            timestamp,
            record.round,
            record.player_move,
            record.cpu_move,
            record.outcome,
            if record.gesture_seen {
                ""
            } else {
                " (no gesture, defaulted)"
            }
        ),
        EventPayload::Ops(ops) => format!(
            "[{}] Ops {} [{}]",
            timestamp,
            ops.message,
            ops.tags.join(", ")
        ),
    }
}

/// Reads `s`/`d`/`q` (and Esc, Ctrl-C) from the terminal without blocking.
#[derive(Debug, Default)]
pub struct KeyboardCommands;

impl CommandSource for KeyboardCommands {
    fn poll(&mut self, _view: &HudView) -> Result<Option<Command>> {
        let io = |err: io::Error| {
            RochambeauError::Other(anyhow::Error::new(err).context("terminal input failed"))
        };
        while event::poll(Duration::ZERO).map_err(io)? {
            let CEvent::Key(key) = event::read().map_err(io)? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let command = match key.code {
                KeyCode::Esc => Some(Command::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Command::Quit)
                }
                KeyCode::Char(c) => command_for_key(c),
                _ => None,
            };
            if command.is_some() {
                return Ok(command);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rochambeau_types::{
        events::{LifecyclePhase, RoundRecord},
        hand::Handedness,
        moves::Move,
    };

    fn resolved(gesture_seen: bool) -> GameEvent {
        GameEvent::new(EventPayload::RoundResolved(RoundRecord {
            round: 3,
            player_move: Move::Rock,
            cpu_move: Move::Paper,
            outcome: Outcome::CpuWins,
            gesture_seen,
            resolved_at: Utc::now(),
        }))
    }

    fn headline(view: &HudView) -> String {
        stage_lines(view, &ImageFrame::blank(4, 4))[0]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn formats_round_results() {
        let line = format_event(&resolved(false));
        assert!(line.contains("Round 3: Rock vs Paper -> CpuWins"));
        assert!(line.ends_with("(no gesture, defaulted)"));
        assert!(!format_event(&resolved(true)).contains("defaulted"));
    }

    #[test]
    fn formats_lifecycle() {
        let line = format_event(&GameEvent::lifecycle(LifecyclePhase::Ready, "camera ready"));
        assert!(line.contains("Lifecycle::Ready camera ready"));
    }

    #[test]
    fn stage_shows_countdown_and_result() {
        let countdown = HudView {
            phase: PhaseKind::Countdown,
            countdown_stage: Some(2),
            ..Default::default()
        };
        assert_eq!(headline(&countdown), "2");

        let result = HudView {
            phase: PhaseKind::ResultShown,
            player_move: Some(Move::Scissors),
            cpu_move: Some(Move::Paper),
            outcome: Some(Outcome::PlayerWins),
            ..Default::default()
        };
        assert_eq!(headline(&result), "Scissors vs Paper: you win");
        assert_eq!(headline(&HudView::default()), "Ready?");
    }

    #[test]
    fn stage_names_the_detected_hand() {
        let view = HudView {
            gesture: Some(Move::Rock),
            handedness: Some(Handedness::Left),
            ..Default::default()
        };
        let lines = stage_lines(&view, &ImageFrame::blank(4, 4));
        let seen: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(seen, "Seeing: ROCK (Left hand)");

        let lines = stage_lines(&HudView::default(), &ImageFrame::blank(4, 4));
        let seen: String = lines[1].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(seen, "Seeing: no gesture");
    }
}
