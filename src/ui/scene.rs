//! Scene-graph contracts used by the coverflow renderer.
//!
//! Animations are fire-and-forget: [`Previewable::animate`] returns at once and
//! any [`Completion`] is delivered back to the switcher later, as its own event.
//! An implementation must never report a completion from inside `animate`.

use std::time::Duration;

use slotmap::new_key_type;

use crate::actor::switcher::SessionId;
use crate::common::config::AnimationEasing;
use crate::model::cursor::Direction;
pub use crate::model::preview::Pivot;
use crate::sys::geometry::{Point, Size};
use crate::sys::shell::{Icon, WindowId};

new_key_type! {
    pub struct ActorId;
}

/// Target values of one animated transition. `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tween {
    pub opacity: Option<f64>,
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub rotation_y: Option<f64>,
    /// Only meaningful for the background.
    pub dim_factor: Option<f64>,
    pub duration: Duration,
    pub easing: AnimationEasing,
}

impl Tween {
    pub fn new(duration: Duration, easing: AnimationEasing) -> Self {
        Tween { duration, easing, ..Tween::default() }
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn rotation_y(mut self, degrees: f64) -> Self {
        self.rotation_y = Some(degrees);
        self
    }

    pub fn dim_factor(mut self, dim: f64) -> Self {
        self.dim_factor = Some(dim);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// A right-hand preview reached its slot.
    PreviewSettled {
        looping: bool,
        direction: Option<Direction>,
        index: usize,
    },
    /// The background finished fading back in after close.
    BackgroundRestored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub session: SessionId,
    /// Refresh that issued the tween; later refreshes supersede it.
    pub generation: u64,
    pub kind: CompletionKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OnComplete {
    Nothing,
    /// Remove the actor from the scene once faded out.
    Destroy,
    Notify(Completion),
}

/// An animatable actor: preview, title, icon, panel or background.
pub trait Previewable {
    fn id(&self) -> ActorId;
    fn pivot(&self) -> Pivot;
    fn size(&self) -> Size;
    /// Changes the anchor without moving the actor on screen.
    fn move_pivot(&mut self, pivot: Pivot);
    /// Horizontal offset of the y-rotation axis from the pivot.
    fn set_rotation_center(&mut self, x: f64);
    fn raise_top(&mut self);
    fn lower_bottom(&mut self);
    fn raise_above(&mut self, sibling: ActorId);
    fn set_visible(&mut self, visible: bool);
    fn set_reactive(&mut self, reactive: bool);
    /// Drops running tweens. Their completions never fire.
    fn remove_tweens(&mut self);
    fn animate(&mut self, tween: Tween, on_complete: OnComplete);
    fn destroy(self: Box<Self>);
}

/// Initial state of a new preview clone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewSpec {
    pub window: WindowId,
    pub opacity: f64,
    pub position: Point,
    pub size: Size,
}

/// The overlay scene for one monitor.
pub trait Stage {
    /// Sizes the overlay to the monitor; it stays hidden until shown.
    fn place_overlay(&mut self, origin: Point, size: Size);
    fn set_overlay_visible(&mut self, visible: bool);
    /// Removes the overlay and the background. Remaining children go with it.
    fn remove_overlay(&mut self);
    fn set_window_group_visible(&mut self, visible: bool);
    fn background(&mut self) -> Box<dyn Previewable>;
    fn panels(&mut self) -> Vec<Box<dyn Previewable>>;
    fn add_preview(&mut self, spec: PreviewSpec) -> Box<dyn Previewable>;
    /// A transparent label centered on `center`, ellipsized beyond `max_width`.
    fn add_title(&mut self, text: &str, max_width: f64, center: Point) -> Box<dyn Previewable>;
    /// A transparent icon box. `center` places its middle, `box_size` overrides the icon size.
    fn add_icon(
        &mut self,
        icon: &Icon,
        icon_size: f64,
        center: Point,
        box_size: Option<Size>,
    ) -> Box<dyn Previewable>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_builder_sets_only_named_fields() {
        let t = Tween::new(Duration::from_millis(250), AnimationEasing::EaseOutQuad)
            .opacity(1.0)
            .rotation_y(-60.0);
        assert_eq!(t.opacity, Some(1.0));
        assert_eq!(t.rotation_y, Some(-60.0));
        assert_eq!(t.position, None);
        assert_eq!(t.size, None);
        assert_eq!(t.dim_factor, None);
    }
}
