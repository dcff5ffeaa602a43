//! Startup catalog load
//!
//! Populates a [`SoundCatalog`] from persisted rows in three phases:
//! sounds, then variants, then modulators. The order matters because each
//! phase resolves references against the registry filled by the previous
//! one. Bad rows are dropped with a log line; the load itself never fails.
//!
//! Modulators are collected into complete per-variant groups before any
//! assignment happens, so every variant receives its full modulator set in
//! one atomic step.

use crate::catalog::SoundCatalog;
use crate::codec::{color_from_hex, id_from_bytes};
use crate::modulation::{ModulationFactory, SoundModulation};
use crate::sound::{Color, Sound, SoundVariant};
use std::collections::HashMap;
use uuid::Uuid;

/// One row of the `sounds` table
#[derive(Debug, Clone)]
pub struct SoundRow {
    /// 16-byte sound id
    pub sound_id: Vec<u8>,
    /// Path of the audio content
    pub path: String,
}

/// One row of the `sound_variants` table
#[derive(Debug, Clone)]
pub struct VariantRow {
    /// 16-byte variant id
    pub variant_id: Vec<u8>,
    /// 16-byte id of the referenced sound
    pub sound_id: Vec<u8>,
    pub description: String,
    /// `AARRGGBB` hex color
    pub color: String,
}

/// One row of the `modulators` table
#[derive(Debug, Clone)]
pub struct ModulatorRow {
    /// 16-byte id of the owning variant
    pub variant_id: Vec<u8>,
    /// Discriminant-tagged modulator payload
    pub value: Vec<u8>,
}

/// Counts from one catalog load, for logging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Sounds placed in the registry
    pub sounds: usize,
    /// Variants placed in the registry
    pub variants: usize,
    /// Modulators successfully grouped and assigned
    pub modulators: usize,
    /// Rows dropped for any recoverable reason
    pub dropped_rows: usize,
}

/// Load the catalog from persisted rows
///
/// Runs once at startup, before the event pipeline starts; the caller is
/// responsible for that ordering.
pub fn load_catalog(
    catalog: &SoundCatalog,
    sound_rows: impl IntoIterator<Item = SoundRow>,
    variant_rows: impl IntoIterator<Item = VariantRow>,
    modulator_rows: impl IntoIterator<Item = ModulatorRow>,
) -> LoadSummary {
    log::debug!("Initializing sound catalog");
    let mut summary = LoadSummary::default();

    // Phase 1: sounds
    let sounds: Vec<Sound> = sound_rows
        .into_iter()
        .filter_map(|row| match id_from_bytes(&row.sound_id) {
            Some(id) => Some(Sound::new(id, row.path)),
            None => {
                log::warn!("Dropping sound row with malformed id ({} bytes)", row.sound_id.len());
                summary.dropped_rows += 1;
                None
            }
        })
        .collect();
    summary.sounds = sounds.len();
    catalog.set_sounds(sounds);

    // Phase 2: variants, resolving sound references against phase 1
    let variants: Vec<SoundVariant> = variant_rows
        .into_iter()
        .filter_map(|row| {
            let Some(id) = id_from_bytes(&row.variant_id) else {
                log::warn!("Dropping variant row with malformed id ({} bytes)", row.variant_id.len());
                summary.dropped_rows += 1;
                return None;
            };

            // Unresolved sound reference keeps the variant, minus its sound
            let sound = id_from_bytes(&row.sound_id).and_then(|sound_id| {
                let found = catalog.sound(&sound_id);
                if found.is_none() {
                    log::warn!("Variant {} references unknown sound {}", id, sound_id);
                }
                found
            });

            let color = color_from_hex(&row.color).unwrap_or_else(|| {
                log::warn!("Variant {} has unparseable color '{}'", id, row.color);
                Color::OPAQUE_BLACK
            });

            Some(SoundVariant::new(id, sound, row.description, color))
        })
        .collect();
    summary.variants = variants.len();
    catalog.set_variants(variants);

    // Phase 3: modulators, collected into full per-variant groups before
    // any assignment so no variant is ever observed with a partial set
    let mut groups: HashMap<Uuid, Vec<SoundModulation>> = HashMap::new();
    for row in modulator_rows {
        let Some(variant_id) = id_from_bytes(&row.variant_id) else {
            log::warn!("Dropping modulator row with malformed variant id ({} bytes)", row.variant_id.len());
            summary.dropped_rows += 1;
            continue;
        };
        let Some(variant) = catalog.variant(&variant_id) else {
            log::warn!("Dropping modulator row for unknown variant {}", variant_id);
            summary.dropped_rows += 1;
            continue;
        };
        match ModulationFactory::deserialize(&variant, &row.value) {
            Ok(modulation) => groups.entry(variant_id).or_default().push(modulation),
            Err(e) => {
                log::warn!("Dropping modulator row for variant {}: {}", variant_id, e);
                summary.dropped_rows += 1;
            }
        }
    }
    summary.modulators = groups.values().map(Vec::len).sum();
    catalog.assign_modulators(groups);

    log::info!(
        "Sound catalog loaded: {} sound(s), {} variant(s), {} modulator(s), {} row(s) dropped",
        summary.sounds,
        summary.variants,
        summary.modulators,
        summary.dropped_rows
    );
    summary
}
