//! Keytone Core - sound catalog and modulation engine
//!
//! Holds the shared sound state for the keytone soundboard: an id-keyed
//! catalog of sounds and sound variants, the modulator records attached to
//! each variant, and the startup loader that populates the catalog from
//! persisted rows.
//!
//! # Concurrency
//!
//! The catalog is shared between the startup loader and any player thread
//! via `Arc<SoundCatalog>`. All mutation of shared state is wholesale
//! replacement (registry swaps, per-variant modulator-set swaps) so a
//! concurrent reader never observes a half-updated collection.

pub mod catalog;
pub mod codec;
pub mod loader;
pub mod modulation;
pub mod sound;

pub use catalog::SoundCatalog;
pub use codec::{bytes_from_id, color_from_hex, hex_from_color, id_from_bytes};
pub use loader::{load_catalog, LoadSummary, ModulatorRow, SoundRow, VariantRow};
pub use modulation::{ModulationError, ModulationFactory, ModulationKind, SoundModulation};
pub use sound::{Color, Sound, SoundVariant};
