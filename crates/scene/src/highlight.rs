//! Single-item highlight driven by pointer events.
//!
//! A [`SurfacePicker`] turns a pointer position into a ray, finds the nearest
//! tagged object under it and keeps at most one object highlighted. The
//! previous object's colour is always restored before a new one is painted.

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::World;
use crate::camera::{Camera, Viewport};
use crate::components::Rgb;
use crate::entity::ObjectId;
use crate::picking::{PickHit, PickOptions, pick_nearest_tagged};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub highlight_color: Rgb,
    /// Colour written back on un-highlight. `None` restores the colour the
    /// object's patch was generated with.
    pub base_color: Option<Rgb>,
}

impl PickerConfig {
    pub fn hover() -> Self {
        Self {
            highlight_color: Rgb::from_hex(0xffc0cb),
            base_color: None,
        }
    }

    pub fn click() -> Self {
        Self {
            highlight_color: Rgb::from_hex(0xffff00),
            base_color: None,
        }
    }
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self::hover()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PickerMode {
    Hover,
    Click,
}

/// `Idle` when `current()` is `None`, `Highlighted(object)` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightState {
    current: Option<ObjectId>,
}

impl HighlightState {
    pub fn current(&self) -> Option<ObjectId> {
        self.current
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }
}

/// Marker placed at the last transition's hit point.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Indicator {
    pub position: Vec3,
    pub visible: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Entered(ObjectId),
    Switched { from: ObjectId, to: ObjectId },
    Left(ObjectId),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorChange {
    pub object: ObjectId,
    pub color: Rgb,
}

/// Side effects of one pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PickOutcome {
    pub hit: Option<PickHit>,
    pub transition: Transition,
    /// Applied colour writes in order: restore first, then highlight.
    pub color_changes: Vec<ColorChange>,
    pub indicator: Indicator,
}

#[derive(Debug, Clone)]
pub struct SurfacePicker {
    mode: PickerMode,
    config: PickerConfig,
    options: PickOptions,
    state: HighlightState,
    indicator: Indicator,
}

impl SurfacePicker {
    pub fn new(mode: PickerMode, config: PickerConfig) -> Self {
        Self {
            mode,
            config,
            options: PickOptions::default(),
            state: HighlightState::default(),
            indicator: Indicator::default(),
        }
    }

    pub fn with_options(mut self, options: PickOptions) -> Self {
        self.options = options;
        self
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn state(&self) -> &HighlightState {
        &self.state
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// Handle one pointer event at `(x_px, y_px)`.
    ///
    /// An empty viewport or a degenerate camera counts as a miss.
    pub fn on_event(
        &mut self,
        x_px: f64,
        y_px: f64,
        viewport: Viewport,
        camera: &Camera,
        world: &mut World,
    ) -> PickOutcome {
        let hit = match camera.ray_from_pixels(x_px, y_px, viewport) {
            Some(ray) => pick_nearest_tagged(world, ray, self.options),
            None => {
                trace!(mode = ?self.mode, x_px, y_px, "no pick ray for pointer");
                None
            }
        };
        self.apply(hit, world)
    }

    /// Drop the highlight, restoring the object's colour.
    pub fn reset(&mut self, world: &mut World) -> PickOutcome {
        self.apply(None, world)
    }

    fn apply(&mut self, hit: Option<PickHit>, world: &mut World) -> PickOutcome {
        let previous = self.state.current;
        let mut color_changes = Vec::with_capacity(2);

        let transition = match (previous, hit) {
            (Some(prev), Some(h)) if prev == h.object => Transition::Unchanged,
            (prev, Some(h)) => {
                if let Some(prev) = prev {
                    self.restore(prev, world, &mut color_changes);
                }
                world.set_color(h.object, self.config.highlight_color);
                color_changes.push(ColorChange {
                    object: h.object,
                    color: self.config.highlight_color,
                });
                self.state.current = Some(h.object);
                self.indicator = Indicator {
                    position: h.point,
                    visible: true,
                };
                match prev {
                    Some(prev) => Transition::Switched {
                        from: prev,
                        to: h.object,
                    },
                    None => Transition::Entered(h.object),
                }
            }
            (Some(prev), None) => {
                self.restore(prev, world, &mut color_changes);
                self.state.current = None;
                self.indicator.visible = false;
                Transition::Left(prev)
            }
            (None, None) => {
                self.indicator.visible = false;
                Transition::Unchanged
            }
        };

        if transition != Transition::Unchanged {
            let tag = hit
                .and_then(|h| world.object(h.object))
                .map(|o| o.tag.as_str())
                .unwrap_or("");
            debug!(mode = ?self.mode, ?transition, tag, "highlight transition");
        }

        PickOutcome {
            hit,
            transition,
            color_changes,
            indicator: self.indicator,
        }
    }

    fn restore(&self, prev: ObjectId, world: &mut World, changes: &mut Vec<ColorChange>) {
        let color = self
            .config
            .base_color
            .or_else(|| world.object(prev).map(|o| o.mesh.color));
        let Some(color) = color else {
            return;
        };
        if world.set_color(prev, color) {
            changes.push(ColorChange {
                object: prev,
                color,
            });
        }
    }

    /// Repaint the held object if `outcome` of the picker configured with
    /// `other` restored it.
    fn repaint_if_restored(&self, other: &PickerConfig, outcome: &mut PickOutcome, world: &mut World) {
        let Some(held) = self.state.current else {
            return;
        };
        let restored = outcome
            .color_changes
            .iter()
            .any(|c| c.object == held && c.color != other.highlight_color);
        if restored && world.set_color(held, self.config.highlight_color) {
            outcome.color_changes.push(ColorChange {
                object: held,
                color: self.config.highlight_color,
            });
        }
    }
}

/// The hover and click pickers: independent state and colours over the same scene.
///
/// When one picker restores an object the other still holds, the other's
/// highlight is painted back, so no stale highlight colour survives.
#[derive(Debug, Clone)]
pub struct PointerPickers {
    pub hover: SurfacePicker,
    pub click: SurfacePicker,
}

impl PointerPickers {
    pub fn new(hover: PickerConfig, click: PickerConfig) -> Self {
        Self {
            hover: SurfacePicker::new(PickerMode::Hover, hover),
            click: SurfacePicker::new(PickerMode::Click, click),
        }
    }

    pub fn on_pointer_move(
        &mut self,
        x_px: f64,
        y_px: f64,
        viewport: Viewport,
        camera: &Camera,
        world: &mut World,
    ) -> PickOutcome {
        let mut outcome = self.hover.on_event(x_px, y_px, viewport, camera, world);
        self.click
            .repaint_if_restored(self.hover.config(), &mut outcome, world);
        outcome
    }

    pub fn on_pointer_click(
        &mut self,
        x_px: f64,
        y_px: f64,
        viewport: Viewport,
        camera: &Camera,
        world: &mut World,
    ) -> PickOutcome {
        let mut outcome = self.click.on_event(x_px, y_px, viewport, camera, world);
        self.hover
            .repaint_if_restored(self.click.config(), &mut outcome, world);
        outcome
    }
}

impl Default for PointerPickers {
    fn default() -> Self {
        Self::new(PickerConfig::hover(), PickerConfig::click())
    }
}
