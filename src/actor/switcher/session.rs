//! One invocation of the switcher, from modal grab to disposal.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, info, trace, warn};

use super::input::{Command, InputDispatcher, InputEvent};
use crate::common::collections::HashMap;
use crate::common::config::Settings;
use crate::model::cursor::{Direction, Removal, Transition, WindowList};
use crate::sys::shell::{Modifiers, Monitor, Shell, SignalId, WindowId, WindowTracker};
use crate::sys::timer::{TimerId, TimerKind, Timers};
use crate::ui::coverflow::{Coverflow, RefreshTag};
use crate::ui::scene::{Completion, CompletionKind, Stage};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    Created,
    /// Grab held, waiting out the initial delay before the first paint.
    AwaitingInitialGrab,
    Showing,
    Interactive,
    /// Close animation running.
    Closing,
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Idle,
    /// A wrap-around is in flight; the tail preview's completion continues it.
    Chaining { direction: Direction },
}

/// Collaborators handed to a session when it starts.
pub struct SessionContext {
    pub shell: Box<dyn Shell>,
    pub tracker: Box<dyn WindowTracker>,
    pub stage: Box<dyn Stage>,
    pub timers: Box<dyn Timers>,
}

pub struct Session {
    id: SessionId,
    phase: Phase,
    list: WindowList,
    modifiers: Modifiers,
    settings: Settings,
    input: InputDispatcher,
    chain: ChainState,
    generation: u64,
    coverflow: Option<Coverflow>,
    grabbed: bool,
    signals: Option<SignalId>,
    initial_delay: Option<TimerId>,
    destroy_checks: HashMap<TimerId, WindowId>,
    ctx: SessionContext,
}

impl Session {
    /// Grabs input and arms the initial delay, or activates at once when that is impossible.
    pub fn start(
        id: SessionId,
        windows: Vec<WindowId>,
        modifiers: Modifiers,
        start_index: usize,
        settings: Settings,
        ctx: SessionContext,
    ) -> Session {
        let mut session = Session {
            id,
            phase: Phase::Created,
            list: WindowList::new(windows, start_index),
            modifiers: modifiers.primary(),
            input: InputDispatcher::new(settings.switch_interval()),
            settings,
            chain: ChainState::Idle,
            generation: 0,
            coverflow: None,
            grabbed: false,
            signals: None,
            initial_delay: None,
            destroy_checks: HashMap::default(),
            ctx,
        };
        debug!(session = ?id, windows = session.list.len(), start_index, "session created");

        if session.list.is_empty() {
            debug!("no windows to switch between");
            session.phase = Phase::Disposed;
            return session;
        }

        session.signals = Some(session.ctx.shell.connect_window_signals());

        if let Err(err) = session.ctx.shell.push_modal() {
            debug!(%err, "no modal grab; activating directly");
            session.activate_selected();
            return session;
        }
        session.grabbed = true;

        // The modifier may have been released before the grab took effect, in
        // which case no release event will ever arrive.
        if !session.ctx.shell.pointer().modifiers.intersects(session.modifiers) {
            debug!("modifier released before grab; activating directly");
            session.activate_selected();
            return session;
        }

        let delay = session.settings.initial_delay();
        session.initial_delay = Some(session.ctx.timers.schedule(delay, TimerKind::InitialDelay));
        session.phase = Phase::AwaitingInitialGrab;
        session
    }

    pub fn id(&self) -> SessionId { self.id }

    pub fn phase(&self) -> Phase { self.phase }

    pub fn index(&self) -> usize { self.list.index() }

    pub fn windows(&self) -> &[WindowId] { self.list.windows() }

    pub fn chain(&self) -> ChainState { self.chain }

    pub fn is_disposed(&self) -> bool { self.phase == Phase::Disposed }

    pub fn is_shown(&self) -> bool { self.coverflow.is_some() }

    fn accepts_input(&self) -> bool {
        matches!(self.phase, Phase::AwaitingInitialGrab | Phase::Interactive)
    }

    fn pick_monitor(&self) -> Monitor {
        let shell = &self.ctx.shell;
        let pointer = shell.pointer().position;
        match shell.monitor_at(pointer) {
            Ok(Some(monitor)) => monitor,
            Ok(None) => shell.primary_monitor(),
            Err(err) => {
                warn!(%err, "monitor lookup failed; using primary monitor");
                shell.primary_monitor()
            }
        }
    }

    fn show(&mut self) {
        self.initial_delay = None;
        self.phase = Phase::Showing;

        // Windows with nothing to draw are dropped up front so that preview
        // `i` and window `i` stay the same window for the whole session.
        let mut shown = Vec::with_capacity(self.list.len());
        for window in self.list.windows().to_vec() {
            match self.ctx.shell.window(window) {
                Some(info) => match info.thumbnail {
                    Some(thumbnail) => shown.push((info, thumbnail)),
                    None => {
                        trace!(?window, "no thumbnail; skipping");
                        if self.list.remove(window) == Removal::Last {
                            self.close();
                            return;
                        }
                    }
                },
                None => {
                    trace!(?window, "window vanished before first paint");
                    if self.list.remove(window) == Removal::Last {
                        self.close();
                        return;
                    }
                }
            }
        }

        let monitor = self.pick_monitor();
        let workspace = self.ctx.shell.active_workspace();
        self.coverflow = Some(Coverflow::open(
            &self.settings,
            monitor,
            &shown,
            workspace,
            self.ctx.stage.as_mut(),
        ));
        self.phase = Phase::Interactive;
        info!(session = ?self.id, windows = self.list.len(), "switcher shown");

        let transition = self.list.advance(false);
        self.render(transition);
    }

    fn render(&mut self, transition: Transition) {
        self.chain = match transition {
            Transition { direction: Some(direction), looping: true } => {
                ChainState::Chaining { direction }
            }
            _ => ChainState::Idle,
        };
        self.generation += 1;
        trace!(index = self.list.index(), ?transition, chain = ?self.chain, "cursor moved");

        let Some(coverflow) = self.coverflow.as_mut() else {
            return;
        };
        let tag = RefreshTag { session: self.id, generation: self.generation };
        coverflow.refresh(
            &self.list,
            transition,
            tag,
            self.ctx.shell.as_ref(),
            self.ctx.tracker.as_ref(),
            self.ctx.stage.as_mut(),
        );
    }

    /// A user-driven move. Only stepping off either end starts a loop chain.
    fn step(&mut self, direction: Direction) {
        let wraps = match direction {
            Direction::Next => self.list.index() == self.list.last_index(),
            Direction::Previous => self.list.index() == 0,
        };
        if self.coverflow.is_none() {
            // Not painted yet: move the cursor only. The first paint renders it.
            self.move_cursor(direction, false);
            return;
        }
        let transition = self.move_cursor(direction, wraps);
        self.render(transition);
    }

    fn move_cursor(&mut self, direction: Direction, loop_hint: bool) -> Transition {
        match direction {
            Direction::Next => self.list.advance(loop_hint),
            Direction::Previous => self.list.retreat(loop_hint),
        }
    }

    pub fn animation_completed(&mut self, completion: Completion) {
        if completion.session != self.id {
            trace!(?completion, "completion for another session");
            return;
        }
        match completion.kind {
            CompletionKind::BackgroundRestored => {
                if self.phase != Phase::Closing {
                    return;
                }
                if let Some(coverflow) = self.coverflow.take() {
                    coverflow.teardown(self.ctx.stage.as_mut());
                }
                self.phase = Phase::Disposed;
                debug!(session = ?self.id, "session disposed");
            }
            CompletionKind::PreviewSettled { looping, direction, index } => {
                if self.phase != Phase::Interactive || completion.generation != self.generation {
                    return;
                }
                // The chain's tail is detected as the last list index, which only
                // works while the right-most preview is always the last window.
                if !looping || index != self.list.last_index() {
                    return;
                }
                let ChainState::Chaining { direction: chained } = self.chain else {
                    return;
                };
                debug_assert_eq!(direction, Some(chained));
                trace!(?chained, "continuing wrap-around");
                let transition = self.move_cursor(chained, true);
                self.render(transition);
            }
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.accepts_input() {
            trace!(phase = %self.phase, "ignoring input");
            return;
        }
        let Some(command) = self.input.dispatch(&event, self.ctx.shell.as_ref()) else {
            return;
        };
        trace!(?command, "input");
        match command {
            Command::Cancel => self.close(),
            Command::CloseSelected => self.close_selected(),
            Command::Advance => self.step(Direction::Next),
            Command::Retreat => self.step(Direction::Previous),
            Command::ShowDesktop => self.show_desktop(),
            Command::CheckRelease => self.check_release(),
        }
    }

    /// Closes the whole session without activating anything.
    pub fn cancel(&mut self) {
        if self.accepts_input() {
            self.close();
        }
    }

    fn close_selected(&mut self) {
        let Some(window) = self.list.selected() else {
            return;
        };
        debug!(?window, "requesting close");
        self.ctx.shell.request_close(window);
        // The destroy notification may never come; check back ourselves.
        let delay = self.settings.check_destroyed_delay();
        let id = self.ctx.timers.schedule(delay, TimerKind::CheckDestroyed(window));
        self.destroy_checks.insert(id, window);
    }

    fn check_release(&mut self) {
        let held = self.ctx.shell.pointer().modifiers;
        if held.intersects(self.modifiers) {
            return;
        }
        if self.initial_delay.is_some() {
            // A quick tap picks the next window.
            self.list.bump();
        }
        self.activate_selected();
    }

    pub fn timer_fired(&mut self, id: TimerId, kind: TimerKind) {
        match kind {
            TimerKind::InitialDelay => {
                if self.initial_delay == Some(id) && self.phase == Phase::AwaitingInitialGrab {
                    self.show();
                }
            }
            TimerKind::CheckDestroyed(window) => {
                if self.destroy_checks.remove(&id).is_some() && self.accepts_input() {
                    trace!(?window, "destroy check fired");
                    self.remove_window(window);
                }
            }
        }
    }

    pub fn window_destroyed(&mut self, window: WindowId) {
        if self.accepts_input() {
            self.remove_window(window);
        }
    }

    /// Another window got mapped, e.g. by a launcher; honour the selection.
    pub fn window_mapped(&mut self, window: WindowId) {
        if self.accepts_input() {
            trace!(?window, "window mapped");
            self.activate_selected();
        }
    }

    fn remove_window(&mut self, window: WindowId) {
        match self.list.remove(window) {
            Removal::Absent => trace!(?window, "already removed"),
            Removal::Last => {
                debug!(?window, "last window gone");
                self.close();
            }
            Removal::Removed { position } => {
                debug!(?window, position, index = self.list.index(), "window removed");
                if let Some(coverflow) = self.coverflow.as_mut() {
                    coverflow.remove_preview(position);
                }
                self.render(Transition::STATIC);
            }
        }
    }

    fn show_desktop(&mut self) {
        for &window in self.list.windows() {
            let minimized = self.ctx.shell.window(window).is_none_or(|info| info.minimized);
            if !minimized {
                self.ctx.shell.minimize(window);
            }
        }
        self.close();
    }

    fn activate_selected(&mut self) {
        if let Some(window) = self.list.selected() {
            info!(?window, index = self.list.index(), "activating");
            self.ctx.shell.activate(window);
        }
        self.close();
    }

    /// Releases everything the session holds and starts the close animation if shown.
    fn close(&mut self) {
        if matches!(self.phase, Phase::Closing | Phase::Disposed) {
            return;
        }

        if self.grabbed {
            self.ctx.shell.pop_modal();
            self.grabbed = false;
        }
        if let Some(id) = self.initial_delay.take() {
            self.ctx.timers.cancel(id);
        }
        for (id, _) in self.destroy_checks.drain() {
            self.ctx.timers.cancel(id);
        }
        if let Some(signals) = self.signals.take() {
            self.ctx.shell.disconnect(signals);
        }
        self.chain = ChainState::Idle;
        self.generation += 1;

        match self.coverflow.as_mut() {
            Some(coverflow) => {
                let tag = RefreshTag { session: self.id, generation: self.generation };
                coverflow.close(
                    self.list.index(),
                    tag,
                    self.ctx.shell.as_ref(),
                    self.ctx.stage.as_mut(),
                );
                self.phase = Phase::Closing;
                debug!(session = ?self.id, "closing");
            }
            None => {
                self.ctx.stage.remove_overlay();
                self.phase = Phase::Disposed;
                debug!(session = ?self.id, "session disposed before first paint");
            }
        }
    }
}

