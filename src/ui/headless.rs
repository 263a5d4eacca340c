//! A [`Stage`] that keeps actor state in memory instead of drawing.
//!
//! Tweens jump straight to their end values; their completions are queued
//! until the owner drains them with [`HeadlessStage::take_completions`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use slotmap::SlotMap;
use tracing::trace;

use crate::sys::geometry::{Point, Size};
use crate::sys::shell::{Icon, WindowId};
use crate::ui::scene::{
    ActorId, Completion, OnComplete, Pivot, PreviewSpec, Previewable, Stage, Tween,
};

/// Rough glyph width used to measure labels.
const GLYPH_WIDTH: f64 = 8.0;
const LABEL_HEIGHT: f64 = 24.0;

#[derive(Debug, Clone, PartialEq)]
pub enum ActorKind {
    Background,
    Panel(usize),
    Preview(WindowId),
    Title(String),
    Icon(Icon),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActorRecord {
    pub kind: ActorKind,
    pub pivot: Pivot,
    pub rotation_center: f64,
    pub position: Point,
    pub size: Size,
    pub opacity: f64,
    pub rotation_y: f64,
    pub dim_factor: f64,
    pub visible: bool,
    pub reactive: bool,
}

impl ActorRecord {
    fn new(kind: ActorKind, position: Point, size: Size, opacity: f64) -> Self {
        ActorRecord {
            kind,
            pivot: Pivot::Center,
            rotation_center: 0.0,
            position,
            size,
            opacity,
            rotation_y: 0.0,
            dim_factor: 1.0,
            visible: true,
            reactive: true,
        }
    }

    fn apply(&mut self, tween: &Tween) {
        if let Some(opacity) = tween.opacity {
            self.opacity = opacity;
        }
        if let Some(position) = tween.position {
            self.position = position;
        }
        if let Some(size) = tween.size {
            self.size = size;
        }
        if let Some(rotation) = tween.rotation_y {
            self.rotation_y = rotation;
        }
        if let Some(dim) = tween.dim_factor {
            self.dim_factor = dim;
        }
    }
}

fn pivot_offset(pivot: Pivot, width: f64) -> f64 {
    match pivot {
        Pivot::Center => 0.0,
        Pivot::West => -width / 2.0,
        Pivot::East => width / 2.0,
    }
}

#[derive(Debug)]
struct PendingTween {
    actor: ActorId,
    duration: Duration,
    on_complete: OnComplete,
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub actors: SlotMap<ActorId, ActorRecord>,
    /// Bottom to top.
    pub stacking: Vec<ActorId>,
    pub overlay: Option<(Point, Size)>,
    pub overlay_visible: bool,
    pub overlay_removed: bool,
    pub window_group_hidden: bool,
    pub tweens: Vec<(ActorId, Tween)>,
    panels: Vec<ActorId>,
    panel_count: usize,
    background: Option<ActorId>,
    pending: Vec<PendingTween>,
}

impl HeadlessScene {
    fn insert(&mut self, record: ActorRecord) -> ActorId {
        let id = self.actors.insert(record);
        self.stacking.push(id);
        id
    }

    fn remove(&mut self, id: ActorId) {
        self.actors.remove(id);
        self.stacking.retain(|&a| a != id);
        self.pending.retain(|p| p.actor != id);
    }

    fn restack(&mut self, id: ActorId, at: impl FnOnce(&[ActorId]) -> usize) {
        self.stacking.retain(|&a| a != id);
        let pos = at(&self.stacking).min(self.stacking.len());
        self.stacking.insert(pos, id);
    }
}

#[derive(Clone, Debug)]
pub struct HeadlessStage {
    scene: Rc<RefCell<HeadlessScene>>,
}

impl HeadlessStage {
    pub fn new(panel_count: usize) -> Self {
        let scene = HeadlessScene { panel_count, ..HeadlessScene::default() };
        HeadlessStage { scene: Rc::new(RefCell::new(scene)) }
    }

    pub fn scene(&self) -> std::cell::Ref<'_, HeadlessScene> { self.scene.borrow() }

    pub fn actor(&self, id: ActorId) -> Option<ActorRecord> {
        self.scene.borrow().actors.get(id).cloned()
    }

    /// Live preview actors in creation order.
    pub fn previews(&self) -> Vec<(ActorId, ActorRecord)> {
        let scene = self.scene.borrow();
        scene
            .actors
            .iter()
            .filter(|(_, r)| matches!(r.kind, ActorKind::Preview(_)))
            .map(|(id, r)| (id, r.clone()))
            .collect()
    }

    pub fn preview_for(&self, window: WindowId) -> Option<(ActorId, ActorRecord)> {
        self.previews().into_iter().find(|(_, r)| r.kind == ActorKind::Preview(window))
    }

    pub fn titles(&self) -> Vec<ActorRecord> {
        let scene = self.scene.borrow();
        scene
            .actors
            .values()
            .filter(|r| matches!(r.kind, ActorKind::Title(_)))
            .cloned()
            .collect()
    }

    /// Finishes every queued tween: faded-out actors are removed, and
    /// notifications are returned in issue order with their durations.
    pub fn take_completions(&self) -> Vec<(Duration, Completion)> {
        let pending = std::mem::take(&mut self.scene.borrow_mut().pending);
        let mut out = Vec::new();
        for p in pending {
            match p.on_complete {
                OnComplete::Nothing => {}
                OnComplete::Destroy => {
                    trace!(actor = ?p.actor, "removing faded actor");
                    self.scene.borrow_mut().remove(p.actor);
                }
                OnComplete::Notify(completion) => out.push((p.duration, completion)),
            }
        }
        out
    }

    fn handle(&self, id: ActorId) -> Box<dyn Previewable> {
        Box::new(HeadlessActor { id, scene: self.scene.clone() })
    }
}

struct HeadlessActor {
    id: ActorId,
    scene: Rc<RefCell<HeadlessScene>>,
}

impl HeadlessActor {
    fn with<R>(&self, f: impl FnOnce(&mut ActorRecord) -> R) -> Option<R> {
        self.scene.borrow_mut().actors.get_mut(self.id).map(f)
    }
}

impl Previewable for HeadlessActor {
    fn id(&self) -> ActorId { self.id }

    fn pivot(&self) -> Pivot { self.with(|r| r.pivot).unwrap_or_default() }

    fn size(&self) -> Size { self.with(|r| r.size).unwrap_or(Size::ZERO) }

    fn move_pivot(&mut self, pivot: Pivot) {
        self.with(|r| {
            let center = r.position.x - pivot_offset(r.pivot, r.size.width);
            r.position.x = center + pivot_offset(pivot, r.size.width);
            r.pivot = pivot;
        });
    }

    fn set_rotation_center(&mut self, x: f64) { self.with(|r| r.rotation_center = x); }

    fn raise_top(&mut self) {
        let id = self.id;
        self.scene.borrow_mut().restack(id, |s| s.len());
    }

    fn lower_bottom(&mut self) {
        let id = self.id;
        self.scene.borrow_mut().restack(id, |_| 0);
    }

    fn raise_above(&mut self, sibling: ActorId) {
        let id = self.id;
        self.scene.borrow_mut().restack(id, |s| {
            s.iter().position(|&a| a == sibling).map_or(s.len(), |p| p + 1)
        });
    }

    fn set_visible(&mut self, visible: bool) { self.with(|r| r.visible = visible); }

    fn set_reactive(&mut self, reactive: bool) { self.with(|r| r.reactive = reactive); }

    fn remove_tweens(&mut self) {
        let id = self.id;
        self.scene.borrow_mut().pending.retain(|p| p.actor != id);
    }

    fn animate(&mut self, tween: Tween, on_complete: OnComplete) {
        let mut scene = self.scene.borrow_mut();
        let Some(record) = scene.actors.get_mut(self.id) else {
            return;
        };
        record.apply(&tween);
        let duration = tween.duration;
        scene.tweens.push((self.id, tween));
        if on_complete != OnComplete::Nothing {
            scene.pending.push(PendingTween { actor: self.id, duration, on_complete });
        }
    }

    fn destroy(self: Box<Self>) { self.scene.borrow_mut().remove(self.id); }
}

impl Stage for HeadlessStage {
    fn place_overlay(&mut self, origin: Point, size: Size) {
        self.scene.borrow_mut().overlay = Some((origin, size));
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.scene.borrow_mut().overlay_visible = visible;
    }

    fn remove_overlay(&mut self) {
        let mut scene = self.scene.borrow_mut();
        let owned: Vec<ActorId> = scene
            .actors
            .iter()
            .filter(|(_, r)| !matches!(r.kind, ActorKind::Panel(_)))
            .map(|(id, _)| id)
            .collect();
        for id in owned {
            scene.remove(id);
        }
        scene.background = None;
        scene.overlay_visible = false;
        scene.overlay_removed = true;
    }

    fn set_window_group_visible(&mut self, visible: bool) {
        self.scene.borrow_mut().window_group_hidden = !visible;
    }

    fn background(&mut self) -> Box<dyn Previewable> {
        let existing = self.scene.borrow().background;
        let id = match existing {
            Some(id) => id,
            None => {
                let mut scene = self.scene.borrow_mut();
                let mut record =
                    ActorRecord::new(ActorKind::Background, Point::ZERO, Size::ZERO, 1.0);
                record.visible = false;
                let id = scene.insert(record);
                scene.restack(id, |_| 0);
                scene.background = Some(id);
                id
            }
        };
        self.handle(id)
    }

    fn panels(&mut self) -> Vec<Box<dyn Previewable>> {
        {
            let mut scene = self.scene.borrow_mut();
            if scene.panels.len() < scene.panel_count {
                for i in scene.panels.len()..scene.panel_count {
                    let id = scene.insert(ActorRecord::new(
                        ActorKind::Panel(i),
                        Point::ZERO,
                        Size::ZERO,
                        1.0,
                    ));
                    scene.panels.push(id);
                }
            }
        }
        let ids = self.scene.borrow().panels.clone();
        ids.into_iter().map(|id| self.handle(id)).collect()
    }

    fn add_preview(&mut self, spec: PreviewSpec) -> Box<dyn Previewable> {
        let id = self.scene.borrow_mut().insert(ActorRecord::new(
            ActorKind::Preview(spec.window),
            spec.position,
            spec.size,
            spec.opacity,
        ));
        self.handle(id)
    }

    fn add_title(&mut self, text: &str, max_width: f64, center: Point) -> Box<dyn Previewable> {
        let width = f64::min(text.chars().count() as f64 * GLYPH_WIDTH, max_width.max(0.0));
        let id = self.scene.borrow_mut().insert(ActorRecord::new(
            ActorKind::Title(text.to_string()),
            center,
            Size::new(width, LABEL_HEIGHT),
            0.0,
        ));
        self.handle(id)
    }

    fn add_icon(
        &mut self,
        icon: &Icon,
        icon_size: f64,
        center: Point,
        box_size: Option<Size>,
    ) -> Box<dyn Previewable> {
        let size = box_size.unwrap_or(Size::new(icon_size, icon_size));
        let id = self.scene.borrow_mut().insert(ActorRecord::new(
            ActorKind::Icon(icon.clone()),
            center,
            size,
            0.0,
        ));
        self.handle(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::AnimationEasing;

    #[test]
    fn test_move_pivot_keeps_screen_position() {
        let mut stage = HeadlessStage::new(0);
        let mut a = stage.add_preview(PreviewSpec {
            window: WindowId::new(1),
            opacity: 1.0,
            position: Point::new(500.0, 300.0),
            size: Size::new(200.0, 100.0),
        });
        a.move_pivot(Pivot::West);
        assert_eq!(stage.actor(a.id()).unwrap().position.x, 400.0);
        a.move_pivot(Pivot::East);
        assert_eq!(stage.actor(a.id()).unwrap().position.x, 600.0);
    }

    #[test]
    fn test_destroy_on_complete_runs_when_drained() {
        let mut stage = HeadlessStage::new(0);
        let mut title = stage.add_title("hello", 1000.0, Point::ZERO);
        let id = title.id();
        title.animate(
            Tween::new(Duration::ZERO, AnimationEasing::Linear).opacity(0.0),
            OnComplete::Destroy,
        );
        assert!(stage.actor(id).is_some());
        assert!(stage.take_completions().is_empty());
        assert!(stage.actor(id).is_none());
    }

    #[test]
    fn test_stacking_order() {
        let mut stage = HeadlessStage::new(0);
        let spec = |w| PreviewSpec {
            window: WindowId::new(w),
            opacity: 1.0,
            position: Point::ZERO,
            size: Size::ZERO,
        };
        let mut a = stage.add_preview(spec(1));
        let b = stage.add_preview(spec(2));
        let mut c = stage.add_preview(spec(3));
        a.raise_top();
        assert_eq!(stage.scene().stacking, vec![b.id(), c.id(), a.id()]);
        c.raise_above(b.id());
        assert_eq!(stage.scene().stacking, vec![b.id(), c.id(), a.id()]);
        a.lower_bottom();
        assert_eq!(stage.scene().stacking, vec![a.id(), b.id(), c.id()]);
    }
}
