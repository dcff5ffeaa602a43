//! Identity-keyed sound registries
//!
//! The catalog owns every `Sound` and `SoundVariant` in the process. It is
//! shared across threads via `Arc<SoundCatalog>`; all registry updates are
//! whole-map swaps, so a reader never observes a registry that is empty or
//! half-filled because a reload is mid-flight.

use crate::modulation::SoundModulation;
use crate::sound::{Sound, SoundVariant};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Registries of sounds and variants, keyed by id
#[derive(Debug, Default)]
pub struct SoundCatalog {
    sounds: RwLock<HashMap<Uuid, Arc<Sound>>>,
    variants: RwLock<HashMap<Uuid, Arc<SoundVariant>>>,
}

impl SoundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole sound registry
    pub fn set_sounds(&self, sounds: impl IntoIterator<Item = Sound>) {
        let map: HashMap<Uuid, Arc<Sound>> = sounds
            .into_iter()
            .map(|sound| (sound.id, Arc::new(sound)))
            .collect();
        log::debug!("Sound registry replaced: {} sound(s)", map.len());
        *self.sounds.write().unwrap_or_else(PoisonError::into_inner) = map;
    }

    /// Replace the whole variant registry
    pub fn set_variants(&self, variants: impl IntoIterator<Item = SoundVariant>) {
        let map: HashMap<Uuid, Arc<SoundVariant>> = variants
            .into_iter()
            .map(|variant| (variant.id(), Arc::new(variant)))
            .collect();
        log::debug!("Variant registry replaced: {} variant(s)", map.len());
        *self.variants.write().unwrap_or_else(PoisonError::into_inner) = map;
    }

    /// Look up a sound by id
    pub fn sound(&self, id: &Uuid) -> Option<Arc<Sound>> {
        self.sounds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Look up a variant by id
    pub fn variant(&self, id: &Uuid) -> Option<Arc<SoundVariant>> {
        self.variants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn sound_count(&self) -> usize {
        self.sounds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn variant_count(&self) -> usize {
        self.variants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Assign complete modulator groups to their variants
    ///
    /// Each group is the full modulator set for one variant and is assigned
    /// in a single step. Groups for ids missing from the registry are
    /// dropped with a warning.
    pub fn assign_modulators(&self, groups: HashMap<Uuid, Vec<SoundModulation>>) {
        for (variant_id, group) in groups {
            match self.variant(&variant_id) {
                Some(variant) => variant.set_modulators(group),
                None => log::warn!(
                    "Dropping {} modulator(s) for unknown variant {}",
                    group.len(),
                    variant_id
                ),
            }
        }
    }
}
