//! Contracts the switcher needs from the desktop shell and window manager.
//!
//! Nothing here renders; see [`crate::ui::scene`] for the scene-graph side.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sys::geometry::{Point, Rect, Size};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(u64);

impl WindowId {
    pub const fn new(raw: u64) -> Self { WindowId(raw) }

    pub fn as_u64(self) -> u64 { self.0 }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspaceId(pub u32);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId(pub u64);

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const SUPER = 1 << 6;
    }
}

impl Modifiers {
    /// The lowest modifier bit of a binding's mask. Releasing this key ends the switch.
    pub fn primary(self) -> Modifiers {
        let bits = self.bits();
        if bits == 0 {
            return Modifiers::empty();
        }
        Modifiers::from_bits_retain(bits & bits.wrapping_neg())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Left,
    Right,
    Up,
    Down,
    Tab,
    Char(char),
    /// A key the switcher has no fixed meaning for; the shell may still map it to a binding.
    Other(u32),
}

/// The shell's native switching bindings, resolved from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchAction {
    SwitchWindows,
    SwitchGroup,
    SwitchPanels,
    SwitchWindowsBackward,
    SwitchGroupBackward,
    SwitchPanelsBackward,
}

impl SwitchAction {
    pub fn is_backward(self) -> bool {
        matches!(
            self,
            SwitchAction::SwitchWindowsBackward
                | SwitchAction::SwitchGroupBackward
                | SwitchAction::SwitchPanelsBackward
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Point,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub index: usize,
    pub frame: Rect,
}

/// Live compositor backing of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thumbnail {
    /// Natural size of the captured texture.
    pub texture_size: Size,
    /// Where the window currently is on screen.
    pub frame: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: WindowId,
    pub title: String,
    pub minimized: bool,
    pub workspace: Option<WorkspaceId>,
    pub on_all_workspaces: bool,
    pub thumbnail: Option<Thumbnail>,
}

impl WindowInfo {
    /// Whether the window shows on the desktop once the overlay is gone.
    pub fn is_visible_on(&self, workspace: WorkspaceId) -> bool {
        !self.minimized && (self.workspace == Some(workspace) || self.on_all_workspaces)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Icon {
    App { app_id: String },
    Named(String),
}

impl Icon {
    pub fn fallback() -> Icon { Icon::Named("applications-other".to_string()) }
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("modal grab unavailable")]
    GrabUnavailable,
    #[error("monitor query failed: {0}")]
    MonitorQuery(String),
}

/// Window manager and platform surface.
pub trait Shell {
    fn push_modal(&mut self) -> Result<(), ShellError>;
    fn pop_modal(&mut self);
    fn pointer(&self) -> PointerState;
    /// Monitor hosting `point`; may fail or find nothing.
    fn monitor_at(&self, point: Point) -> Result<Option<Monitor>, ShellError>;
    fn primary_monitor(&self) -> Monitor;
    fn active_workspace(&self) -> WorkspaceId;
    fn window(&self, id: WindowId) -> Option<WindowInfo>;
    fn activate(&mut self, id: WindowId);
    fn minimize(&mut self, id: WindowId);
    /// Asks the window to close. A destroy notification may or may not follow.
    fn request_close(&mut self, id: WindowId);
    fn keybinding_action(&self, key: Key, modifiers: Modifiers) -> Option<SwitchAction>;
    /// Starts forwarding window destroy/map notifications to the switcher.
    fn connect_window_signals(&mut self) -> SignalId;
    fn disconnect(&mut self, id: SignalId);
}

/// Resolves the application owning a window.
pub trait WindowTracker {
    fn app_icon(&self, window: WindowId) -> Option<Icon>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_modifier_is_lowest_bit() {
        assert_eq!((Modifiers::ALT | Modifiers::SHIFT).primary(), Modifiers::SHIFT);
        assert_eq!((Modifiers::SUPER | Modifiers::ALT).primary(), Modifiers::ALT);
        assert_eq!(Modifiers::empty().primary(), Modifiers::empty());
    }

    #[test]
    fn test_visibility_rule() {
        let mut info = WindowInfo {
            id: WindowId::new(1),
            title: "a".into(),
            minimized: false,
            workspace: Some(WorkspaceId(0)),
            on_all_workspaces: false,
            thumbnail: None,
        };
        assert!(info.is_visible_on(WorkspaceId(0)));
        assert!(!info.is_visible_on(WorkspaceId(1)));
        info.on_all_workspaces = true;
        assert!(info.is_visible_on(WorkspaceId(1)));
        info.minimized = true;
        assert!(!info.is_visible_on(WorkspaceId(0)));
    }
}
