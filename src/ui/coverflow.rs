//! Renders cursor transitions as coverflow tweens.

use std::time::Duration;

use tracing::{debug, trace};

use crate::actor::switcher::SessionId;
use crate::common::config::{AnimationEasing, IconStyle, Settings};
use crate::model::cursor::{Transition, WindowList};
use crate::model::preview::{LiveTransform, Pivot, PreviewGeometry, SlotLayout, Stacking};
use crate::sys::geometry::{Point, Round, Size};
use crate::sys::shell::{
    Icon, Monitor, Shell, Thumbnail, WindowId, WindowInfo, WindowTracker, WorkspaceId,
};
use crate::ui::scene::{
    Completion, CompletionKind, OnComplete, PreviewSpec, Previewable, Stage, Tween,
};

/// Horizontal room kept free around the title.
const TITLE_MARGIN: f64 = 200.0;
const BIG_ICON_BOX: f64 = 1.15;

struct Preview {
    window: WindowId,
    geometry: PreviewGeometry,
    actor: Box<dyn Previewable>,
}

/// Everything a refresh needs to tag its completions.
#[derive(Debug, Clone, Copy)]
pub struct RefreshTag {
    pub session: SessionId,
    pub generation: u64,
}

impl RefreshTag {
    fn completion(self, kind: CompletionKind) -> OnComplete {
        OnComplete::Notify(Completion {
            session: self.session,
            generation: self.generation,
            kind,
        })
    }
}

/// The visible overlay of one session: previews, title, icon and background.
///
/// Previews are kept in window-list order, so preview `i` always renders window `i`.
pub struct Coverflow {
    settings: Settings,
    monitor: Monitor,
    previews: Vec<Preview>,
    title: Option<Box<dyn Previewable>>,
    icon: Option<Box<dyn Previewable>>,
    background: Box<dyn Previewable>,
}

impl Coverflow {
    /// Builds one preview per window at its live on-screen spot and reveals the overlay.
    pub fn open(
        settings: &Settings,
        monitor: Monitor,
        windows: &[(WindowInfo, Thumbnail)],
        workspace: WorkspaceId,
        stage: &mut dyn Stage,
    ) -> Coverflow {
        let frame = monitor.frame;
        stage.place_overlay(frame.origin, frame.size);

        let previews = windows
            .iter()
            .map(|(info, thumbnail)| {
                let live = LiveTransform::of(info, workspace, frame.origin);
                let actor = stage.add_preview(PreviewSpec {
                    window: info.id,
                    opacity: live.opacity,
                    position: live.position,
                    size: thumbnail.texture_size,
                });
                Preview {
                    window: info.id,
                    geometry: PreviewGeometry::fit(
                        thumbnail.texture_size,
                        frame.size,
                        settings.preview_scale,
                    ),
                    actor,
                }
            })
            .collect::<Vec<_>>();
        debug!(count = previews.len(), monitor = monitor.index, "coverflow opened");

        stage.set_window_group_visible(false);
        stage.set_overlay_visible(true);
        let mut background = stage.background();
        background.set_visible(true);

        let (duration, easing) = (settings.animation_duration(), settings.animation_easing);
        for mut panel in stage.panels() {
            panel.set_reactive(false);
            if settings.hide_panel {
                panel.animate(Tween::new(duration, easing).opacity(0.0), OnComplete::Nothing);
            }
        }
        background.animate(
            Tween::new(duration, easing).dim_factor(settings.dim_factor),
            OnComplete::Nothing,
        );

        Coverflow {
            settings: settings.clone(),
            monitor,
            previews,
            title: None,
            icon: None,
            background,
        }
    }

    fn timing(&self, transition: Transition) -> (Duration, AnimationEasing) {
        if transition.looping {
            (Duration::ZERO, AnimationEasing::Linear)
        } else {
            (self.settings.animation_duration(), self.settings.animation_easing)
        }
    }

    /// Animates title, icon and every preview to the layout for the cursor in `list`.
    ///
    /// Only previews right of the cursor report completion.
    pub fn refresh(
        &mut self,
        list: &WindowList,
        transition: Transition,
        tag: RefreshTag,
        shell: &dyn Shell,
        tracker: &dyn WindowTracker,
        stage: &mut dyn Stage,
    ) {
        let (duration, easing) = self.timing(transition);
        let current = list.index();
        let selected = list.selected();
        let size = self.monitor.frame.size;
        let target_opacity = if transition.looping { 0.0 } else { 1.0 };
        trace!(?transition, current, generation = tag.generation, "refresh");

        let (icon_size, label_offset) = match self.settings.icon_style {
            IconStyle::Classic => (
                self.settings.icon_size,
                self.settings.icon_size + self.settings.icon_title_spacing,
            ),
            IconStyle::Big => (self.settings.icon_size_big, 0.0),
        };

        if let Some(mut old) = self.title.take() {
            old.animate(Tween::new(duration, easing).opacity(0.0), OnComplete::Destroy);
        }
        let title_text = selected
            .and_then(|w| shell.window(w))
            .map(|info| info.title)
            .unwrap_or_default();
        let title_center = Point::new(
            (size.width + label_offset) / 2.0,
            size.height * self.settings.title_position / 8.0 - self.settings.offset,
        )
        .round();
        let mut title = stage.add_title(&title_text, size.width - TITLE_MARGIN, title_center);
        title.animate(
            Tween::new(duration, easing).opacity(target_opacity),
            OnComplete::Nothing,
        );

        if let Some(mut old) = self.icon.take() {
            old.animate(Tween::new(duration, easing).opacity(0.0), OnComplete::Destroy);
        }
        let icon = selected.and_then(|w| tracker.app_icon(w)).unwrap_or_else(Icon::fallback);
        let mut icon_box = match self.settings.icon_style {
            IconStyle::Classic => {
                let x = title_center.x
                    - (title.size().width + icon_size) / 2.0
                    - self.settings.icon_title_spacing;
                stage.add_icon(&icon, icon_size, Point::new(x, title_center.y).round(), None)
            }
            IconStyle::Big => {
                let edge = icon_size * BIG_ICON_BOX;
                stage.add_icon(
                    &icon,
                    icon_size,
                    Point::new(size.width / 2.0, size.height / 2.0),
                    Some(Size::new(edge, edge)),
                )
            }
        };
        icon_box.animate(
            Tween::new(duration, easing).opacity(target_opacity),
            OnComplete::Nothing,
        );

        for (i, preview) in self.previews.iter_mut().enumerate() {
            let slot =
                SlotLayout::for_slot(i, current, &preview.geometry, size, self.settings.offset);
            let actor = &mut preview.actor;

            let rotation_center = match slot.pivot {
                Pivot::Center => {
                    let half = actor.size().width / 2.0;
                    if actor.pivot() == Pivot::East { half } else { -half }
                }
                Pivot::West | Pivot::East => 0.0,
            };
            actor.move_pivot(slot.pivot);
            actor.set_rotation_center(rotation_center);
            match slot.stacking {
                Stacking::Top => actor.raise_top(),
                Stacking::Bottom => actor.lower_bottom(),
            }
            if i == current {
                icon_box.raise_above(actor.id());
            }

            let on_complete = if i > current {
                tag.completion(CompletionKind::PreviewSettled {
                    looping: transition.looping,
                    direction: transition.direction,
                    index: i,
                })
            } else {
                OnComplete::Nothing
            };
            actor.animate(
                Tween::new(duration, easing)
                    .opacity(1.0)
                    .position(slot.position)
                    .size(slot.size)
                    .rotation_y(slot.rotation_y),
                on_complete,
            );
        }

        self.title = Some(title);
        self.icon = Some(icon_box);
    }

    /// Drops the preview at `position`, mirroring a window-list removal.
    pub fn remove_preview(&mut self, position: usize) {
        if position < self.previews.len() {
            let preview = self.previews.remove(position);
            trace!(window = ?preview.window, position, "preview removed");
            preview.actor.destroy();
        }
    }

    /// Sends every preview back to its window and restores the desktop.
    ///
    /// The background's completion marks the end of the close animation.
    pub fn close(
        &mut self,
        current: usize,
        tag: RefreshTag,
        shell: &dyn Shell,
        stage: &mut dyn Stage,
    ) {
        let duration = self.settings.animation_duration();
        let easing = self.settings.animation_easing;
        let workspace = shell.active_workspace();
        let origin = self.monitor.frame.origin;

        for (i, preview) in self.previews.iter_mut().enumerate() {
            let actor = &mut preview.actor;
            if i != current {
                actor.lower_bottom();
            }
            let half = actor.size().width / 2.0;
            let rotation_center = match actor.pivot() {
                Pivot::East => half,
                Pivot::West => -half,
                Pivot::Center => 0.0,
            };
            actor.move_pivot(Pivot::Center);
            actor.set_rotation_center(rotation_center);

            let live = shell
                .window(preview.window)
                .map(|info| LiveTransform::of(&info, workspace, origin))
                .unwrap_or(LiveTransform {
                    opacity: 0.0,
                    position: Point::new(-origin.x, -origin.y),
                    size: Size::ZERO,
                });
            actor.animate(
                Tween::new(duration, easing)
                    .opacity(live.opacity)
                    .position(live.position)
                    .size(live.size)
                    .rotation_y(0.0),
                OnComplete::Nothing,
            );
        }

        for actor in [self.title.as_mut(), self.icon.as_mut()].into_iter().flatten() {
            actor.set_visible(false);
        }

        for mut panel in stage.panels() {
            if self.settings.hide_panel {
                panel.remove_tweens();
                panel.animate(Tween::new(duration, easing).opacity(1.0), OnComplete::Nothing);
            }
            panel.set_reactive(true);
        }

        self.background.remove_tweens();
        self.background.animate(
            Tween::new(duration, easing).dim_factor(1.0),
            tag.completion(CompletionKind::BackgroundRestored),
        );
    }

    /// Removes the overlay and shows the real windows again.
    pub fn teardown(self, stage: &mut dyn Stage) {
        stage.remove_overlay();
        stage.set_window_group_visible(true);
        debug!("coverflow torn down");
    }
}
