//! Sound data model
//!
//! A `Sound` is an immutable reference to audio content on disk. A
//! `SoundVariant` wraps one sound with a description, a display color, and
//! a set of modulators; the modulator set is replaced as a whole so that a
//! player thread reading the variant never sees a partially-loaded set.

use crate::modulation::SoundModulation;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// ARGB display color, 8 bits per channel
///
/// Persisted as an `AARRGGBB` hex string (see [`crate::codec`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub alpha: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Fallback color for variants whose persisted color fails to parse
    pub const OPAQUE_BLACK: Color = Color {
        alpha: 0xFF,
        red: 0,
        green: 0,
        blue: 0,
    };

    pub fn new(alpha: u8, red: u8, green: u8, blue: u8) -> Self {
        Self { alpha, red, green, blue }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::OPAQUE_BLACK
    }
}

/// An immutable sound: a unique id plus the path of its audio content
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sound {
    /// Globally unique id within the catalog
    pub id: Uuid,
    /// Path to the underlying audio file
    pub path: PathBuf,
}

impl Sound {
    pub fn new(id: Uuid, path: impl Into<PathBuf>) -> Self {
        Self { id, path: path.into() }
    }
}

/// A playable unit: one sound plus its description, color and modulators
///
/// The sound reference is `None` when the persisted variant points at a
/// sound missing from the catalog (unresolved, not fatal).
///
/// The modulator set is a single load generation behind an `RwLock`:
/// readers take an `Arc` snapshot, writers swap the whole set. Individual
/// modulators are never appended to a live variant.
#[derive(Debug)]
pub struct SoundVariant {
    id: Uuid,
    sound: Option<Arc<Sound>>,
    description: String,
    color: Color,
    modulators: RwLock<Arc<Vec<SoundModulation>>>,
}

impl SoundVariant {
    pub fn new(
        id: Uuid,
        sound: Option<Arc<Sound>>,
        description: impl Into<String>,
        color: Color,
    ) -> Self {
        Self {
            id,
            sound,
            description: description.into(),
            color,
            modulators: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The underlying sound, if the persisted reference resolved
    pub fn sound(&self) -> Option<Arc<Sound>> {
        self.sound.clone()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Snapshot of the current modulator set
    ///
    /// The returned `Arc` stays consistent even if the set is replaced
    /// while the caller is still iterating it.
    pub fn modulators(&self) -> Arc<Vec<SoundModulation>> {
        self.modulators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole modulator set in one step
    ///
    /// This is the only way to change a variant's modulators; callers
    /// collect the complete set for a load generation first, then assign
    /// once (see [`crate::loader`]).
    pub fn set_modulators(&self, modulators: Vec<SoundModulation>) {
        let mut guard = self
            .modulators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(modulators);
    }
}
