//! In-memory shell and window tracker, for tests and the demo binary.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::actor::switcher::{self, Backend, SessionContext};
use crate::common::collections::HashMap;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::shell::{
    Icon, Key, Modifiers, Monitor, PointerState, Shell, ShellError, SignalId, SwitchAction,
    Thumbnail, WindowId, WindowInfo, WindowTracker, WorkspaceId,
};
use crate::sys::timer::TokioTimers;
use crate::ui::headless::HeadlessStage;

#[derive(Debug)]
pub struct ShellState {
    pub windows: Vec<WindowInfo>,
    /// When false, `push_modal` fails.
    pub modal_available: bool,
    pub modal_held: bool,
    pub pointer: PointerState,
    pub monitors: Vec<Monitor>,
    pub monitor_query_fails: bool,
    pub workspace: WorkspaceId,
    pub activated: Vec<WindowId>,
    pub minimized: Vec<WindowId>,
    pub close_requests: Vec<WindowId>,
    /// Whether a close request destroys the window right away.
    pub close_destroys: bool,
    pub connected: Vec<SignalId>,
    next_signal: u64,
    notify: Option<switcher::Sender>,
}

/// A [`Shell`] whose state is plain data. Clones share state.
#[derive(Clone, Debug)]
pub struct HeadlessShell {
    state: Rc<RefCell<ShellState>>,
}

impl HeadlessShell {
    pub fn new(monitors: Vec<Monitor>) -> Self {
        let state = ShellState {
            windows: Vec::new(),
            modal_available: true,
            modal_held: false,
            pointer: PointerState { position: Point::new(10.0, 10.0), modifiers: Modifiers::empty() },
            monitors,
            monitor_query_fails: false,
            workspace: WorkspaceId(0),
            activated: Vec::new(),
            minimized: Vec::new(),
            close_requests: Vec::new(),
            close_destroys: true,
            connected: Vec::new(),
            next_signal: 1,
            notify: None,
        };
        HeadlessShell { state: Rc::new(RefCell::new(state)) }
    }

    /// One 1920x1080 monitor at the origin.
    pub fn single_monitor() -> Self {
        HeadlessShell::new(vec![Monitor {
            index: 0,
            frame: Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0),
        }])
    }

    /// Destroy notifications for closed windows go to `tx` while signals are connected.
    pub fn notify(&self, tx: switcher::Sender) { self.state.borrow_mut().notify = Some(tx); }

    pub fn state(&self) -> std::cell::Ref<'_, ShellState> { self.state.borrow() }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, ShellState> { self.state.borrow_mut() }

    pub fn add_window(&self, info: WindowInfo) { self.state.borrow_mut().windows.push(info); }

    pub fn set_modifiers(&self, modifiers: Modifiers) {
        self.state.borrow_mut().pointer.modifiers = modifiers;
    }

    pub fn remove_window(&self, id: WindowId) {
        self.state.borrow_mut().windows.retain(|w| w.id != id);
    }
}

/// A normal window on workspace 0 with an 800x600 thumbnail, cascaded by id.
pub fn sample_window(id: u64, title: &str) -> WindowInfo {
    let offset = 40.0 * id as f64;
    WindowInfo {
        id: WindowId::new(id),
        title: title.to_string(),
        minimized: false,
        workspace: Some(WorkspaceId(0)),
        on_all_workspaces: false,
        thumbnail: Some(Thumbnail {
            texture_size: Size::new(800.0, 600.0),
            frame: Rect::from_xywh(100.0 + offset, 80.0 + offset, 800.0, 600.0),
        }),
    }
}

impl Shell for HeadlessShell {
    fn push_modal(&mut self) -> Result<(), ShellError> {
        let mut state = self.state.borrow_mut();
        if !state.modal_available || state.modal_held {
            return Err(ShellError::GrabUnavailable);
        }
        state.modal_held = true;
        Ok(())
    }

    fn pop_modal(&mut self) { self.state.borrow_mut().modal_held = false; }

    fn pointer(&self) -> PointerState { self.state.borrow().pointer }

    fn monitor_at(&self, point: Point) -> Result<Option<Monitor>, ShellError> {
        let state = self.state.borrow();
        if state.monitor_query_fails {
            return Err(ShellError::MonitorQuery("no monitor manager".to_string()));
        }
        Ok(state.monitors.iter().find(|m| m.frame.contains(point)).copied())
    }

    fn primary_monitor(&self) -> Monitor {
        self.state.borrow().monitors.first().copied().unwrap_or(Monitor {
            index: 0,
            frame: Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0),
        })
    }

    fn active_workspace(&self) -> WorkspaceId { self.state.borrow().workspace }

    fn window(&self, id: WindowId) -> Option<WindowInfo> {
        self.state.borrow().windows.iter().find(|w| w.id == id).cloned()
    }

    fn activate(&mut self, id: WindowId) {
        debug!(?id, "activate");
        self.state.borrow_mut().activated.push(id);
    }

    fn minimize(&mut self, id: WindowId) {
        let mut state = self.state.borrow_mut();
        if let Some(info) = state.windows.iter_mut().find(|w| w.id == id) {
            info.minimized = true;
        }
        state.minimized.push(id);
    }

    fn request_close(&mut self, id: WindowId) {
        let mut state = self.state.borrow_mut();
        state.close_requests.push(id);
        if !state.close_destroys {
            return;
        }
        state.windows.retain(|w| w.id != id);
        if !state.connected.is_empty() {
            if let Some(tx) = &state.notify {
                trace!(?id, "window destroyed");
                tx.send(switcher::Event::WindowDestroyed(id));
            }
        }
    }

    fn keybinding_action(&self, key: Key, modifiers: Modifiers) -> Option<SwitchAction> {
        match key {
            Key::Tab if modifiers.contains(Modifiers::SHIFT) => {
                Some(SwitchAction::SwitchWindowsBackward)
            }
            Key::Tab => Some(SwitchAction::SwitchWindows),
            Key::Char('`') => Some(SwitchAction::SwitchGroup),
            _ => None,
        }
    }

    fn connect_window_signals(&mut self) -> SignalId {
        let mut state = self.state.borrow_mut();
        let id = SignalId(state.next_signal);
        state.next_signal += 1;
        state.connected.push(id);
        id
    }

    fn disconnect(&mut self, id: SignalId) { self.state.borrow_mut().connected.retain(|&s| s != id); }
}

/// Application icons by window. Clones share the table.
#[derive(Clone, Debug, Default)]
pub struct HeadlessTracker {
    icons: Rc<RefCell<HashMap<WindowId, Icon>>>,
}

impl HeadlessTracker {
    pub fn new() -> Self { Self::default() }

    pub fn set_icon(&self, window: WindowId, icon: Icon) {
        self.icons.borrow_mut().insert(window, icon);
    }
}

impl WindowTracker for HeadlessTracker {
    fn app_icon(&self, window: WindowId) -> Option<Icon> {
        self.icons.borrow().get(&window).cloned()
    }
}

/// Runs sessions against the headless shell and stage, with real timers.
///
/// Finished animations are delivered back through the actor channel after
/// their nominal duration.
pub struct HeadlessBackend {
    tx: switcher::Sender,
    pub shell: HeadlessShell,
    pub tracker: HeadlessTracker,
    pub stage: HeadlessStage,
}

impl HeadlessBackend {
    pub fn new(
        tx: switcher::Sender,
        shell: HeadlessShell,
        tracker: HeadlessTracker,
        stage: HeadlessStage,
    ) -> Self {
        shell.notify(tx.clone());
        HeadlessBackend { tx, shell, tracker, stage }
    }
}

impl Backend for HeadlessBackend {
    fn session_context(&mut self) -> SessionContext {
        SessionContext {
            shell: Box::new(self.shell.clone()),
            tracker: Box::new(self.tracker.clone()),
            stage: Box::new(self.stage.clone()),
            timers: Box::new(TokioTimers::new(self.tx.clone())),
        }
    }

    fn pump(&mut self) {
        for (delay, completion) in self.stage.take_completions() {
            let tx = self.tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                tx.send(switcher::Event::AnimationCompleted(completion));
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_lookup() {
        let shell = HeadlessShell::new(vec![
            Monitor { index: 0, frame: Rect::from_xywh(0.0, 0.0, 1920.0, 1080.0) },
            Monitor { index: 1, frame: Rect::from_xywh(1920.0, 0.0, 1280.0, 1024.0) },
        ]);
        let found = shell.monitor_at(Point::new(2000.0, 500.0)).unwrap();
        assert_eq!(found.map(|m| m.index), Some(1));
        assert_eq!(shell.monitor_at(Point::new(-5.0, 0.0)).unwrap(), None);

        shell.state_mut().monitor_query_fails = true;
        assert!(shell.monitor_at(Point::new(10.0, 10.0)).is_err());
    }

    #[test]
    fn test_modal_is_exclusive() {
        let mut shell = HeadlessShell::single_monitor();
        assert!(shell.push_modal().is_ok());
        assert!(matches!(shell.push_modal(), Err(ShellError::GrabUnavailable)));
        shell.pop_modal();
        assert!(shell.push_modal().is_ok());
    }

    #[test]
    fn test_close_request_notifies_only_while_connected() {
        let (tx, mut rx) = crate::actor::channel();
        let mut shell = HeadlessShell::single_monitor();
        shell.notify(tx);
        shell.add_window(sample_window(1, "one"));
        shell.add_window(sample_window(2, "two"));

        shell.request_close(WindowId::new(1));
        assert!(rx.try_recv().is_err());
        assert!(shell.window(WindowId::new(1)).is_none());

        let signals = shell.connect_window_signals();
        shell.request_close(WindowId::new(2));
        let (_, event) = rx.try_recv().unwrap();
        assert!(matches!(event, switcher::Event::WindowDestroyed(w) if w == WindowId::new(2)));
        shell.disconnect(signals);
        assert!(shell.state().connected.is_empty());
    }
}
