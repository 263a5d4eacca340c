use std::time::{Duration, Instant};

use super::*;
use crate::common::config::Settings;
use crate::model::cursor::Direction;
use crate::sys::headless::{HeadlessShell, HeadlessTracker, sample_window};
use crate::sys::shell::Key;
use crate::sys::timer::{ManualTimers, TimerKind};
use crate::ui::headless::{ActorRecord, HeadlessStage};

pub const PANELS: usize = 1;

pub fn window(id: u64) -> WindowId { WindowId::new(id) }

/// A shell with windows `1..=count` on one monitor and the switch modifier held.
pub fn shell_with_windows(count: u64) -> HeadlessShell {
    let shell = HeadlessShell::single_monitor();
    for id in 1..=count {
        shell.add_window(sample_window(id, &format!("window {id}")));
    }
    shell.set_modifiers(Modifiers::ALT);
    shell
}

/// Drives one session by hand: timers fire and animations finish only when asked.
pub struct Harness {
    pub shell: HeadlessShell,
    pub tracker: HeadlessTracker,
    pub stage: HeadlessStage,
    pub timers: ManualTimers,
    pub session: Session,
    now: Instant,
}

impl Harness {
    pub fn start(shell: HeadlessShell, start_index: usize) -> Harness {
        Harness::start_with(shell, start_index, Config::default().settings)
    }

    pub fn start_with(shell: HeadlessShell, start_index: usize, settings: Settings) -> Harness {
        let windows = shell.state().windows.iter().map(|w| w.id).collect();
        let tracker = HeadlessTracker::new();
        let stage = HeadlessStage::new(PANELS);
        let timers = ManualTimers::new();
        let ctx = SessionContext {
            shell: Box::new(shell.clone()),
            tracker: Box::new(tracker.clone()),
            stage: Box::new(stage.clone()),
            timers: Box::new(timers.clone()),
        };
        let session =
            Session::start(SessionId(1), windows, Modifiers::ALT, start_index, settings, ctx);
        Harness {
            shell,
            tracker,
            stage,
            timers,
            session,
            now: Instant::now(),
        }
    }

    /// Starts a session on `count` windows and lets the initial delay run out.
    pub fn shown(count: u64, start_index: usize) -> Harness {
        let mut h = Harness::start(shell_with_windows(count), start_index);
        h.fire_initial_delay();
        h
    }

    pub fn fire_initial_delay(&mut self) {
        let timer = self.timers.fire(TimerKind::InitialDelay).expect("initial delay pending");
        self.session.timer_fired(timer.id, timer.kind);
    }

    pub fn fire_destroy_check(&mut self, window: WindowId) {
        let kind = TimerKind::CheckDestroyed(window);
        let timer = self.timers.fire(kind).expect("destroy check pending");
        self.session.timer_fired(timer.id, timer.kind);
    }

    /// Presses `key` well after the previous press, so throttling never applies.
    pub fn press(&mut self, key: Key) {
        self.now += Duration::from_secs(1);
        self.press_at(key, self.now);
    }

    pub fn press_at(&mut self, key: Key, time: Instant) {
        self.session.handle_input(InputEvent::KeyPress {
            key,
            modifiers: Modifiers::ALT,
            time,
        });
    }

    pub fn now(&self) -> Instant { self.now }

    pub fn release(&mut self) {
        self.shell.set_modifiers(Modifiers::empty());
        self.now += Duration::from_millis(10);
        self.session.handle_input(InputEvent::KeyRelease { key: Key::Other(0), time: self.now });
    }

    /// Delivers finished animations until nothing new is queued. Returns the
    /// number of delivery rounds.
    pub fn settle(&mut self) -> usize {
        let mut rounds = 0;
        loop {
            let completions = self.stage.take_completions();
            if completions.is_empty() {
                return rounds;
            }
            rounds += 1;
            assert!(rounds < 100, "animation completions never settled");
            for (_, completion) in completions {
                self.session.animation_completed(completion);
            }
        }
    }

    pub fn index(&self) -> usize { self.session.index() }

    pub fn selected(&self) -> WindowId { self.session.windows()[self.session.index()] }

    pub fn preview(&self, window: WindowId) -> ActorRecord {
        self.stage.preview_for(window).expect("preview exists").1
    }

    pub fn chaining(&self, direction: Direction) -> bool {
        self.session.chain() == ChainState::Chaining { direction }
    }
}
