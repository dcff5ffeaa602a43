//! Sound modulation records and their byte-payload codec
//!
//! A modulator alters how a variant's sound is rendered (pitch shift, gain,
//! envelope). Modulators are persisted as a discriminant byte followed by
//! type-specific little-endian `f32` parameters, and are created only by
//! deserializing that payload against the owning variant.

use crate::sound::SoundVariant;
use uuid::Uuid;

/// Payload discriminant for pitch modulation
pub const MOD_PITCH: u8 = 0;
/// Payload discriminant for gain modulation
pub const MOD_GAIN: u8 = 1;
/// Payload discriminant for envelope modulation
pub const MOD_ENVELOPE: u8 = 2;

/// Type-specific modulator parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModulationKind {
    /// Pitch shift in semitones (negative shifts down)
    Pitch { semitones: f32 },
    /// Gain adjustment in decibels
    Gain { decibels: f32 },
    /// Attack/release envelope in milliseconds
    Envelope { attack_ms: f32, release_ms: f32 },
}

/// A modulator bound to its owning variant
///
/// The variant is referenced by id, not owned; the variant's modulator set
/// holds these records (see [`SoundVariant::set_modulators`]).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundModulation {
    pub variant_id: Uuid,
    pub kind: ModulationKind,
}

/// Errors for modulator payload decoding
///
/// All of these are recoverable at load time: the offending record is
/// dropped and the load continues.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ModulationError {
    #[error("empty modulator payload")]
    EmptyPayload,

    #[error("unknown modulator type {0:#04x}")]
    UnknownType(u8),

    #[error("modulator payload truncated: {got} parameter byte(s), need {need}")]
    TruncatedPayload { got: usize, need: usize },
}

/// Decodes persisted modulator payloads into live [`SoundModulation`] records
pub struct ModulationFactory;

impl ModulationFactory {
    /// Deserialize one persisted payload against its owning variant
    ///
    /// The factory never touches the variant's modulator set; the caller
    /// collects all records for a variant and assigns them in one step.
    pub fn deserialize(
        variant: &SoundVariant,
        payload: &[u8],
    ) -> Result<SoundModulation, ModulationError> {
        let (&discriminant, params) = payload.split_first().ok_or(ModulationError::EmptyPayload)?;

        let kind = match discriminant {
            MOD_PITCH => ModulationKind::Pitch {
                semitones: read_f32(params, 0)?,
            },
            MOD_GAIN => ModulationKind::Gain {
                decibels: read_f32(params, 0)?,
            },
            MOD_ENVELOPE => ModulationKind::Envelope {
                attack_ms: read_f32(params, 0)?,
                release_ms: read_f32(params, 4)?,
            },
            other => return Err(ModulationError::UnknownType(other)),
        };

        Ok(SoundModulation {
            variant_id: variant.id(),
            kind,
        })
    }

    /// Serialize a modulator back into its persisted payload
    pub fn serialize(modulation: &SoundModulation) -> Vec<u8> {
        match modulation.kind {
            ModulationKind::Pitch { semitones } => {
                let mut out = vec![MOD_PITCH];
                out.extend_from_slice(&semitones.to_le_bytes());
                out
            }
            ModulationKind::Gain { decibels } => {
                let mut out = vec![MOD_GAIN];
                out.extend_from_slice(&decibels.to_le_bytes());
                out
            }
            ModulationKind::Envelope { attack_ms, release_ms } => {
                let mut out = vec![MOD_ENVELOPE];
                out.extend_from_slice(&attack_ms.to_le_bytes());
                out.extend_from_slice(&release_ms.to_le_bytes());
                out
            }
        }
    }
}

/// Read one little-endian `f32` parameter at the given byte offset
fn read_f32(params: &[u8], offset: usize) -> Result<f32, ModulationError> {
    let bytes: [u8; 4] = params
        .get(offset..offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(ModulationError::TruncatedPayload {
            got: params.len(),
            need: offset + 4,
        })?;
    Ok(f32::from_le_bytes(bytes))
}
