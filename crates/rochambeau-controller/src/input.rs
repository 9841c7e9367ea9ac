use std::collections::VecDeque;

use rochambeau_types::{
    hud::{HudView, PhaseKind},
    moves::Command,
    Result,
};
use tracing::info;

/// Where player commands come from. Polled once per tick, never blocks.
pub trait CommandSource {
    fn poll(&mut self, view: &HudView) -> Result<Option<Command>>;
}

impl<S: CommandSource + ?Sized> CommandSource for Box<S> {
    fn poll(&mut self, view: &HudView) -> Result<Option<Command>> {
        (**self).poll(view)
    }
}

pub fn command_for_key(key: char) -> Option<Command> {
    match key.to_ascii_lowercase() {
        's' => Some(Command::Start),
        'd' => Some(Command::NextRound),
        'q' => Some(Command::Quit),
        _ => None,
    }
}

/// Replays a fixed list of per-tick inputs, then stays silent.
#[derive(Debug, Default)]
pub struct ScriptedCommands {
    script: VecDeque<Option<Command>>,
}

impl ScriptedCommands {
    pub fn new(script: impl IntoIterator<Item = Option<Command>>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl CommandSource for ScriptedCommands {
    fn poll(&mut self, _view: &HudView) -> Result<Option<Command>> {
        Ok(self.script.pop_front().flatten())
    }
}

/// Plays a fixed number of rounds unattended, then quits.
#[derive(Debug)]
pub struct Autopilot {
    rounds: u32,
    linger_ticks: u32,
    lingered: u32,
}

impl Autopilot {
    pub fn new(rounds: u32, linger_ticks: u32) -> Self {
        Self {
            rounds,
            linger_ticks,
            lingered: 0,
        }
    }
}

impl CommandSource for Autopilot {
    fn poll(&mut self, view: &HudView) -> Result<Option<Command>> {
        let command = match view.phase {
            PhaseKind::Idle if self.rounds == 0 => Some(Command::Quit),
            PhaseKind::Idle => Some(Command::Start),
            PhaseKind::Countdown => None,
            PhaseKind::ResultShown if self.lingered < self.linger_ticks => {
                self.lingered += 1;
                None
            }
            PhaseKind::ResultShown => {
                self.lingered = 0;
                if view.round >= self.rounds {
                    info!("Autopilot finished {} rounds", view.round);
                    Some(Command::Quit)
                } else {
                    Some(Command::NextRound)
                }
            }
        };
        Ok(command)
    }
}
