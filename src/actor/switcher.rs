//! The switcher actor: hosts at most one [`Session`] and feeds it events in arrival order.

pub mod input;
pub mod session;

#[cfg(test)]
mod testing;

use tracing::{debug, instrument, trace};

pub use self::input::{Command, InputDispatcher, InputEvent, ScrollDirection};
pub use self::session::{ChainState, Phase, Session, SessionContext, SessionId};
use crate::actor;
use crate::common::config::Config;
use crate::sys::shell::{Modifiers, WindowId};
use crate::sys::timer::{TimerId, TimerKind};
use crate::ui::scene::Completion;

#[derive(Debug)]
pub enum Event {
    /// Opens a session unless one is already live.
    Show {
        windows: Vec<WindowId>,
        modifiers: Modifiers,
        start_index: usize,
    },
    Dismiss,
    Input(InputEvent),
    WindowDestroyed(WindowId),
    WindowMapped(WindowId),
    TimerFired {
        id: TimerId,
        kind: TimerKind,
    },
    AnimationCompleted(Completion),
    /// Applies to the next session; a live session keeps its snapshot.
    UpdateConfig(Config),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

/// Supplies platform collaborators to each new session.
pub trait Backend {
    fn session_context(&mut self) -> SessionContext;

    /// Called after every handled event, e.g. to deliver finished animations.
    fn pump(&mut self) {}
}

pub struct SwitcherActor<B: Backend> {
    config: Config,
    rx: Receiver,
    backend: B,
    session: Option<Session>,
    next_session: u64,
    oneshot: bool,
}

impl<B: Backend> SwitcherActor<B> {
    pub fn new(config: Config, rx: Receiver, backend: B) -> Self {
        Self {
            config,
            rx,
            backend,
            session: None,
            next_session: 1,
            oneshot: false,
        }
    }

    /// Stop [`run`](Self::run) once the first session has been disposed.
    pub fn oneshot(mut self) -> Self {
        self.oneshot = true;
        self
    }

    pub fn session(&self) -> Option<&Session> { self.session.as_ref() }

    pub fn backend(&self) -> &B { &self.backend }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.rx.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
            if self.oneshot && self.session.is_none() && self.next_session > 1 {
                debug!("switcher finished");
                break;
            }
        }
    }

    #[instrument(name = "switcher::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Show { windows, modifiers, start_index } => {
                self.show(windows, modifiers, start_index);
            }
            Event::UpdateConfig(config) => self.config = config,
            Event::Dismiss => self.with_session(Session::cancel),
            Event::Input(input) => self.with_session(|s| s.handle_input(input)),
            Event::WindowDestroyed(window) => self.with_session(|s| s.window_destroyed(window)),
            Event::WindowMapped(window) => self.with_session(|s| s.window_mapped(window)),
            Event::TimerFired { id, kind } => self.with_session(|s| s.timer_fired(id, kind)),
            Event::AnimationCompleted(completion) => {
                self.with_session(|s| s.animation_completed(completion))
            }
        }

        if self.session.as_ref().is_some_and(Session::is_disposed) {
            debug!("dropping disposed session");
            self.session = None;
        }
        self.backend.pump();
    }

    fn with_session(&mut self, f: impl FnOnce(&mut Session)) {
        match self.session.as_mut() {
            Some(session) => f(session),
            None => trace!("no live session"),
        }
    }

    fn show(&mut self, windows: Vec<WindowId>, modifiers: Modifiers, start_index: usize) {
        if self.session.is_some() {
            debug!("switcher already showing; ignoring");
            return;
        }
        let id = SessionId(self.next_session);
        self.next_session += 1;
        let context = self.backend.session_context();
        self.session = Some(Session::start(
            id,
            windows,
            modifiers,
            start_index,
            self.config.settings.clone(),
            context,
        ));
    }
}
