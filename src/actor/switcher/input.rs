//! Maps raw input onto switcher commands.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::sys::shell::{Key, Modifiers, Shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress {
        key: Key,
        modifiers: Modifiers,
        time: Instant,
    },
    KeyRelease {
        key: Key,
        time: Instant,
    },
    Scroll {
        direction: ScrollDirection,
        time: Instant,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cancel,
    /// Ask the window manager to close the selected window.
    CloseSelected,
    Advance,
    Retreat,
    ShowDesktop,
    /// A key went up; the session checks whether the switch modifier is still held.
    CheckRelease,
}

impl Command {
    pub fn is_directional(self) -> bool { matches!(self, Command::Advance | Command::Retreat) }
}

#[derive(Debug)]
pub struct InputDispatcher {
    min_interval: Duration,
    last_switch: Option<Instant>,
}

impl InputDispatcher {
    pub fn new(min_interval: Duration) -> Self {
        InputDispatcher { min_interval, last_switch: None }
    }

    /// Directional commands closer together than the minimum interval are dropped.
    pub fn dispatch(&mut self, event: &InputEvent, shell: &dyn Shell) -> Option<Command> {
        let (command, time) = self.translate(event, shell)?;
        if command.is_directional() && self.throttled(time) {
            trace!(?command, "dropping switch inside minimum interval");
            return None;
        }
        Some(command)
    }

    fn translate(&self, event: &InputEvent, shell: &dyn Shell) -> Option<(Command, Instant)> {
        let translated = match *event {
            InputEvent::KeyRelease { time, .. } => (Command::CheckRelease, time),
            InputEvent::Scroll { direction: ScrollDirection::Up, time } => (Command::Advance, time),
            InputEvent::Scroll { direction: ScrollDirection::Down, time } => {
                (Command::Retreat, time)
            }
            InputEvent::KeyPress { key, modifiers, time } => match key {
                Key::Escape => (Command::Cancel, time),
                Key::Char('q' | 'Q') => (Command::CloseSelected, time),
                Key::Char('d' | 'D') => (Command::ShowDesktop, time),
                Key::Right | Key::Down => (Command::Advance, time),
                Key::Left | Key::Up => (Command::Retreat, time),
                _ => {
                    let action = shell.keybinding_action(key, modifiers)?;
                    if action.is_backward() || modifiers.contains(Modifiers::SHIFT) {
                        (Command::Retreat, time)
                    } else {
                        (Command::Advance, time)
                    }
                }
            },
        };
        Some(translated)
    }

    /// Records `time` as the latest switch unless it falls inside the interval.
    fn throttled(&mut self, time: Instant) -> bool {
        if let Some(last) = self.last_switch {
            if time.saturating_duration_since(last) < self.min_interval {
                return true;
            }
        }
        self.last_switch = Some(time);
        false
    }
}
