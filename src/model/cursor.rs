//! The ordered window list and the selection cursor over it.
//!
//! Moving past either end does not wrap immediately. Instead the cursor steps
//! back one slot and, when the caller passes a loop hint, marks the transition
//! as `looping`. The caller then keeps stepping in that direction (one
//! animation leg at a time) until the far end is reached.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::sys::shell::WindowId;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}

/// What a cursor move asks the renderer to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// `None` for a static re-layout (after a removal).
    pub direction: Option<Direction>,
    pub looping: bool,
}

impl Transition {
    pub const STATIC: Transition = Transition { direction: None, looping: false };

    pub fn step(direction: Direction, looping: bool) -> Self {
        Transition { direction: Some(direction), looping }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The window was not (or no longer) in the list.
    Absent,
    /// It was the only window; the list is left untouched and the caller must end the session.
    Last,
    Removed { position: usize },
}

/// Invariant: `index < windows.len()` whenever the list is non-empty.
#[derive(Debug, Clone)]
pub struct WindowList {
    windows: Vec<WindowId>,
    index: usize,
}

impl WindowList {
    pub fn new(windows: Vec<WindowId>, start_index: usize) -> Self {
        let index = if windows.is_empty() {
            0
        } else {
            start_index.min(windows.len() - 1)
        };
        WindowList { windows, index }
    }

    pub fn len(&self) -> usize { self.windows.len() }

    pub fn is_empty(&self) -> bool { self.windows.is_empty() }

    pub fn index(&self) -> usize { self.index }

    pub fn windows(&self) -> &[WindowId] { &self.windows }

    pub fn selected(&self) -> Option<WindowId> { self.windows.get(self.index).copied() }

    pub fn last_index(&self) -> usize { self.windows.len().saturating_sub(1) }

    pub fn position(&self, window: WindowId) -> Option<usize> {
        self.windows.iter().position(|&w| w == window)
    }

    pub fn advance(&mut self, loop_hint: bool) -> Transition {
        let len = self.windows.len();
        if len <= 1 {
            self.index = 0;
            return Transition::step(Direction::Next, false);
        }

        if self.index == len - 1 {
            self.index -= 1;
            Transition::step(Direction::Previous, loop_hint && self.index != 0 && len > 2)
        } else {
            self.index = (self.index + 1) % len;
            let looping = if self.index == len - 1 { false } else { loop_hint };
            Transition::step(Direction::Next, looping)
        }
    }

    pub fn retreat(&mut self, loop_hint: bool) -> Transition {
        let len = self.windows.len();
        if len <= 1 {
            self.index = 0;
            return Transition::step(Direction::Next, false);
        }

        if self.index == 0 {
            self.index = 1;
            Transition::step(Direction::Next, loop_hint && len > 2)
        } else {
            self.index -= 1;
            let looping = if self.index == 0 { false } else { loop_hint };
            Transition::step(Direction::Previous, looping)
        }
    }

    /// Moves to the next slot without any of the end-of-list behaviour.
    pub fn bump(&mut self) {
        if !self.windows.is_empty() {
            self.index = (self.index + 1) % self.windows.len();
        }
    }

    pub fn remove(&mut self, window: WindowId) -> Removal {
        let Some(position) = self.position(window) else {
            return Removal::Absent;
        };
        if self.windows.len() == 1 {
            return Removal::Last;
        }

        self.windows.remove(position);
        self.index = if position < self.index {
            self.index - 1
        } else {
            self.index % self.windows.len()
        };
        Removal::Removed { position }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn list(len: u64, start: usize) -> WindowList {
        WindowList::new((0..len).map(WindowId::new).collect(), start)
    }

    #[test]
    fn test_short_lists_stay_at_zero_and_never_loop() {
        for len in 0..=1 {
            let mut l = list(len, 0);
            for hint in [false, true] {
                assert_eq!(l.advance(hint), Transition::step(Direction::Next, false));
                assert_eq!(l.index(), 0);
                assert_eq!(l.retreat(hint), Transition::step(Direction::Next, false));
                assert_eq!(l.index(), 0);
            }
        }
    }

    #[test]
    fn test_advance_past_end_steps_back() {
        let mut l = list(3, 1);
        assert_eq!(l.advance(false), Transition::step(Direction::Next, false));
        assert_eq!(l.index(), 2);
        assert_eq!(l.advance(false), Transition::step(Direction::Previous, false));
        assert_eq!(l.index(), 1);

        let mut l = list(3, 2);
        assert_eq!(l.advance(true), Transition::step(Direction::Previous, true));
        assert_eq!(l.index(), 1);
    }

    #[test]
    fn test_two_windows_never_loop() {
        let mut l = list(2, 0);
        assert_eq!(l.advance(true), Transition::step(Direction::Next, false));
        assert_eq!(l.index(), 1);
        assert_eq!(l.advance(true), Transition::step(Direction::Previous, false));
        assert_eq!(l.index(), 0);
        assert_eq!(l.retreat(true), Transition::step(Direction::Next, false));
        assert_eq!(l.index(), 1);
        assert_eq!(l.retreat(true), Transition::step(Direction::Previous, false));
        assert_eq!(l.index(), 0);
    }

    #[test]
    fn test_advance_chain_runs_to_the_end() {
        let mut l = list(4, 0);
        let mut visited = Vec::new();
        let mut t = l.advance(true);
        visited.push(l.index());
        while t.looping {
            t = l.advance(true);
            visited.push(l.index());
        }
        assert_eq!(visited, vec![1, 2, 3]);

        // Wrapping from the end with the hint set runs back down to the start.
        t = l.advance(true);
        visited.push(l.index());
        while t.looping {
            t = l.retreat(true);
            visited.push(l.index());
        }
        assert_eq!(visited, vec![1, 2, 3, 2, 1, 0]);
    }

    #[test]
    fn test_wrap_from_end_chains_back_to_start() {
        for len in 3..8u64 {
            let last = len as usize - 1;
            let mut l = list(len, last);
            let mut t = l.advance(true);
            let mut visited = vec![l.index()];
            assert_eq!(t.direction, Some(Direction::Previous));
            while t.looping {
                t = match t.direction {
                    Some(Direction::Next) => l.advance(true),
                    _ => l.retreat(true),
                };
                visited.push(l.index());
            }
            let expected: Vec<usize> = (0..last).rev().collect();
            assert_eq!(visited, expected, "len {len}");
            assert!(!t.looping);
        }
    }

    #[test]
    fn test_retreat_from_start_chains_to_end() {
        let mut l = list(5, 0);
        let mut t = l.retreat(true);
        let mut visited = vec![l.index()];
        while t.looping {
            t = l.advance(true);
            visited.push(l.index());
        }
        assert_eq!(visited, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_remove_rehomes_cursor() {
        let mut l = list(4, 2);
        assert_eq!(l.remove(WindowId::new(0)), Removal::Removed { position: 0 });
        assert_eq!(l.index(), 1);
        assert_eq!(l.selected(), Some(WindowId::new(2)));

        assert_eq!(l.remove(WindowId::new(3)), Removal::Removed { position: 2 });
        assert_eq!(l.index(), 1);

        // Removing the selected last slot wraps to the front.
        assert_eq!(l.remove(WindowId::new(2)), Removal::Removed { position: 1 });
        assert_eq!(l.index(), 0);
        assert_eq!(l.selected(), Some(WindowId::new(1)));
    }

    #[test]
    fn test_remove_is_idempotent_and_refuses_last() {
        let mut l = list(2, 1);
        assert_eq!(l.remove(WindowId::new(1)), Removal::Removed { position: 1 });
        assert_eq!(l.remove(WindowId::new(1)), Removal::Absent);
        assert_eq!(l.remove(WindowId::new(0)), Removal::Last);
        assert_eq!(l.len(), 1);
        assert_eq!(l.index(), 0);
    }

    #[test]
    fn test_bump_wraps() {
        let mut l = list(3, 2);
        l.bump();
        assert_eq!(l.index(), 0);
    }
}
