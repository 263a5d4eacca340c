use crate::sys::geometry::{Point, Round, Size};
use crate::sys::shell::{WindowInfo, WorkspaceId};

/// Horizontal spacing between stacked side previews.
const SIDE_STEP: f64 = 50.0;
const SIDE_ROTATION: f64 = 60.0;
/// Previews this many slots from the center shrink to nothing.
const SHRINK_SLOTS: f64 = 10.0;

/// Which point of a preview its position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pivot {
    #[default]
    Center,
    /// Left edge, vertically centered.
    West,
    /// Right edge, vertically centered.
    East,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stacking {
    Top,
    Bottom,
}

/// Sizes a preview can take, derived once from its thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewGeometry {
    pub target: Size,
    /// Size while displayed off-center, before distance shrinking.
    pub side: Size,
}

impl PreviewGeometry {
    /// Fits `texture` inside `scale` of the monitor, preserving aspect ratio. Never upscales.
    pub fn fit(texture: Size, monitor: Size, scale: f64) -> Self {
        let max_width = monitor.width * scale;
        let max_height = monitor.height * scale;
        let factor = if texture.width > max_width || texture.height > max_height {
            f64::min(max_width / texture.width, max_height / texture.height)
        } else {
            1.0
        };
        let target = texture.scale(factor).round();
        PreviewGeometry {
            target,
            side: Size::new(target.width * 2.0 / 3.0, target.height),
        }
    }
}

/// Resting state of one preview for a given cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotLayout {
    pub pivot: Pivot,
    pub stacking: Stacking,
    /// Relative to the monitor origin.
    pub position: Point,
    pub size: Size,
    /// Degrees around the vertical axis.
    pub rotation_y: f64,
}

impl SlotLayout {
    /// Layout of preview `index` while `current` is selected.
    pub fn for_slot(
        index: usize,
        current: usize,
        geometry: &PreviewGeometry,
        monitor: Size,
        offset: f64,
    ) -> SlotLayout {
        let y = monitor.height / 2.0 - offset;
        if index == current {
            return SlotLayout {
                pivot: Pivot::Center,
                stacking: Stacking::Top,
                position: Point::new(monitor.width / 2.0, y),
                size: geometry.target,
                rotation_y: 0.0,
            };
        }

        let delta = index as f64 - current as f64;
        let shrink = f64::max((SHRINK_SLOTS - delta.abs()) / SHRINK_SLOTS, 0.0);
        let size = geometry.side.scale(shrink);
        if index < current {
            SlotLayout {
                pivot: Pivot::West,
                stacking: Stacking::Top,
                position: Point::new(monitor.width * 0.1 + SIDE_STEP * delta, y),
                size,
                rotation_y: SIDE_ROTATION,
            }
        } else {
            SlotLayout {
                pivot: Pivot::East,
                stacking: Stacking::Bottom,
                position: Point::new(monitor.width * 0.9 + SIDE_STEP * delta, y),
                size,
                rotation_y: -SIDE_ROTATION,
            }
        }
    }
}

/// Where a preview sits when it stands in for the real window on the desktop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveTransform {
    pub opacity: f64,
    /// Window center relative to the monitor origin, or the monitor origin if minimized.
    pub position: Point,
    /// On-screen size; zero while minimized.
    pub size: Size,
}

impl LiveTransform {
    pub fn of(info: &WindowInfo, workspace: WorkspaceId, monitor_origin: Point) -> Self {
        let frame = info.thumbnail.map(|t| t.frame).filter(|_| !info.minimized);
        let (center, size) = match frame {
            Some(frame) => (frame.center(), frame.size),
            None => (Point::ZERO, Size::ZERO),
        };
        LiveTransform {
            opacity: if info.is_visible_on(workspace) { 1.0 } else { 0.0 },
            position: Point::new(center.x - monitor_origin.x, center.y - monitor_origin.y),
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MONITOR: Size = Size::new(1920.0, 1080.0);

    #[test]
    fn test_fit_caps_to_monitor_fraction() {
        let g = PreviewGeometry::fit(Size::new(1920.0, 1080.0), MONITOR, 0.5);
        assert_eq!(g.target, Size::new(960.0, 540.0));
        assert_eq!(g.side, Size::new(640.0, 540.0));

        // Tall window: height is the binding constraint.
        let g = PreviewGeometry::fit(Size::new(800.0, 1080.0), MONITOR, 0.5);
        assert_eq!(g.target, Size::new(400.0, 540.0));
    }

    #[test]
    fn test_fit_keeps_small_windows() {
        let g = PreviewGeometry::fit(Size::new(300.0, 200.0), MONITOR, 0.5);
        assert_eq!(g.target, Size::new(300.0, 200.0));
    }

    #[test]
    fn test_slot_layout_sides() {
        let g = PreviewGeometry::fit(Size::new(900.0, 600.0), MONITOR, 0.5);

        let center = SlotLayout::for_slot(2, 2, &g, MONITOR, 10.0);
        assert_eq!(center.pivot, Pivot::Center);
        assert_eq!(center.position, Point::new(960.0, 530.0));
        assert_eq!(center.size, g.target);
        assert_eq!(center.rotation_y, 0.0);

        let left = SlotLayout::for_slot(0, 2, &g, MONITOR, 0.0);
        assert_eq!(left.pivot, Pivot::West);
        assert_eq!(left.stacking, Stacking::Top);
        assert_eq!(left.position, Point::new(1920.0 * 0.1 - 100.0, 540.0));
        assert_eq!(g.target, Size::new(810.0, 540.0));
        assert_eq!(left.size, g.side.scale(0.8));
        assert_eq!(left.rotation_y, 60.0);

        let right = SlotLayout::for_slot(3, 2, &g, MONITOR, 0.0);
        assert_eq!(right.pivot, Pivot::East);
        assert_eq!(right.stacking, Stacking::Bottom);
        assert_eq!(right.position.x, 1920.0 * 0.9 + 50.0);
        assert_eq!(right.rotation_y, -60.0);
    }

    #[test]
    fn test_far_slots_shrink_to_zero() {
        let g = PreviewGeometry::fit(Size::new(900.0, 600.0), MONITOR, 0.5);
        let far = SlotLayout::for_slot(14, 0, &g, MONITOR, 0.0);
        assert_eq!(far.size, Size::ZERO);
    }

    #[test]
    fn test_live_transform() {
        use crate::sys::geometry::Rect;
        use crate::sys::shell::{Thumbnail, WindowId};

        let mut info = WindowInfo {
            id: WindowId::new(1),
            title: String::new(),
            minimized: false,
            workspace: Some(WorkspaceId(1)),
            on_all_workspaces: false,
            thumbnail: Some(Thumbnail {
                texture_size: Size::new(400.0, 300.0),
                frame: Rect::from_xywh(2020.0, 100.0, 400.0, 300.0),
            }),
        };
        let origin = Point::new(1920.0, 0.0);
        let t = LiveTransform::of(&info, WorkspaceId(1), origin);
        assert_eq!(t.opacity, 1.0);
        assert_eq!(t.position, Point::new(300.0, 250.0));
        assert_eq!(t.size, Size::new(400.0, 300.0));

        info.minimized = true;
        let t = LiveTransform::of(&info, WorkspaceId(1), origin);
        assert_eq!(t.opacity, 0.0);
        assert_eq!(t.position, Point::new(-1920.0, 0.0));
        assert_eq!(t.size, Size::ZERO);
    }
}
