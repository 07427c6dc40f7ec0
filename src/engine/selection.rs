//! Model / texture / lighting selection.
//!
//! The coordinator owns the fixed list of model slots. Exactly one slot is
//! live: attached to the scene and bound as the rotation target. Texture
//! choice is sticky, so a freshly swapped-in model wears whatever texture
//! was last picked.

use std::rc::Rc;

use super::rotation::RotationEngine;
use crate::error::ViewerError;
use crate::lighting::LightingSubsystem;
use crate::scene::{Scene, SharedEntity};

/// A selection made in one of the panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionEvent {
    /// Swap the live model to slot `n`.
    Model(usize),
    /// Apply texture `n` to the live model.
    Texture(usize),
    /// Apply lighting preset `n`.
    Light(usize),
}

/// Keeps the live model, the scene and the rotation binding in agreement.
pub struct SelectionCoordinator<L> {
    slots: Vec<SharedEntity>,
    active: usize,
    texture: usize,
    texture_count: usize,
    lighting: L,
}

impl<L: LightingSubsystem> SelectionCoordinator<L> {
    /// Take ownership of `slots`, make slot 0 live, and bind it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::Viewer`] if `slots` is empty.
    pub fn new(
        slots: Vec<SharedEntity>,
        texture_count: usize,
        lighting: L,
        scene: &mut Scene,
        rotation: &mut RotationEngine,
    ) -> Result<Self, ViewerError> {
        let Some(first) = slots.first() else {
            return Err(ViewerError::Viewer("no model slots".into()));
        };
        let _ = scene.attach(first.borrow().node());
        rotation.set_target(first);
        Ok(Self {
            slots,
            active: 0,
            texture: 0,
            texture_count,
            lighting,
        })
    }

    /// Route `event` to its handler. Returns whether anything changed.
    pub fn dispatch(
        &mut self,
        event: SelectionEvent,
        scene: &mut Scene,
        rotation: &mut RotationEngine,
    ) -> bool {
        match event {
            SelectionEvent::Model(i) => {
                self.on_model_change(i, scene, rotation)
            }
            SelectionEvent::Texture(i) => self.on_texture_change(i),
            SelectionEvent::Light(i) => self.on_light_change(i),
        }
    }

    /// Make slot `index` live.
    ///
    /// The previous slot leaves the scene, the new one joins it, the
    /// rotation engine is rebound and the sticky texture is reapplied.
    /// Unknown indices change nothing.
    pub fn on_model_change(
        &mut self,
        index: usize,
        scene: &mut Scene,
        rotation: &mut RotationEngine,
    ) -> bool {
        let Some(next) = self.slots.get(index) else {
            log::debug!("model {index} out of range ({})", self.slots.len());
            return false;
        };
        let Ok(prev_node) =
            self.slots[self.active].try_borrow().map(|m| m.node())
        else {
            return false;
        };
        let Ok(mut model) = next.try_borrow_mut() else {
            log::debug!("model {index} busy, swap skipped");
            return false;
        };
        let _ = scene.detach(prev_node);
        let _ = scene.attach(model.node());
        model.apply_texture(self.texture);
        drop(model);

        rotation.set_target(next);
        self.active = index;
        log::debug!("live model -> {index}");
        true
    }

    /// Put texture `index` on the live model and remember it.
    pub fn on_texture_change(&mut self, index: usize) -> bool {
        if index >= self.texture_count {
            log::debug!(
                "texture {index} out of range ({})",
                self.texture_count
            );
            return false;
        }
        let Ok(mut model) = self.slots[self.active].try_borrow_mut() else {
            return false;
        };
        model.apply_texture(index);
        self.texture = index;
        true
    }

    /// Switch lighting preset. Unknown indices change nothing.
    pub fn on_light_change(&mut self, index: usize) -> bool {
        let applied = self.lighting.apply_preset(index);
        if !applied {
            log::debug!("lighting preset {index} out of range");
        }
        applied
    }

    /// The live model.
    #[must_use]
    pub fn live(&self) -> &SharedEntity {
        &self.slots[self.active]
    }

    /// Index of the live slot.
    #[must_use]
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Last texture successfully applied.
    #[must_use]
    pub fn sticky_texture(&self) -> usize {
        self.texture
    }

    /// All model slots.
    #[must_use]
    pub fn slots(&self) -> &[SharedEntity] {
        &self.slots
    }

    /// The lighting subsystem.
    #[must_use]
    pub fn lighting(&self) -> &L {
        &self.lighting
    }

    /// The lighting subsystem, mutably.
    pub fn lighting_mut(&mut self) -> &mut L {
        &mut self.lighting
    }

    /// Whether exactly the live slot is in the scene and it is also the
    /// rotation target.
    #[must_use]
    pub fn is_consistent(
        &self,
        scene: &Scene,
        rotation: &RotationEngine,
    ) -> bool {
        let live = self.live();
        let attached_ok = self.slots.iter().all(|slot| {
            let in_scene = scene.contains(slot.borrow().node());
            in_scene == Rc::ptr_eq(slot, live)
        });
        attached_ok && rotation.is_bound_to(live)
    }
}
