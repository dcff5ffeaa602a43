//! Persistence encodings
//!
//! Two fixed wire encodings shared with the persistence layer:
//!
//! - colors as 8-digit `AARRGGBB` hex strings
//! - 128-bit ids as 16 bytes, high u64 first then low u64, both big-endian

use crate::sound::Color;
use uuid::Uuid;

/// Encode a color as an `AARRGGBB` hex string, decodable by [`color_from_hex`]
pub fn hex_from_color(color: Color) -> String {
    format!(
        "{:02X}{:02X}{:02X}{:02X}",
        color.alpha, color.red, color.green, color.blue
    )
}

/// Decode an `AARRGGBB` hex string into a color
///
/// Returns `None` for any input that is not exactly 8 hex digits.
pub fn color_from_hex(hex: &str) -> Option<Color> {
    if hex.len() != 8 {
        return None;
    }

    let channel = |index: usize| {
        hex.get(index * 2..index * 2 + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };

    Some(Color {
        alpha: channel(0)?,
        red: channel(1)?,
        green: channel(2)?,
        blue: channel(3)?,
    })
}

/// Encode a 128-bit id as 16 bytes: high u64, then low u64, big-endian
pub fn bytes_from_id(id: Uuid) -> [u8; 16] {
    let value = id.as_u128();
    let mut out = [0u8; 16];
    out[..8].copy_from_slice(&((value >> 64) as u64).to_be_bytes());
    out[8..].copy_from_slice(&(value as u64).to_be_bytes());
    out
}

/// Decode 16 bytes produced by [`bytes_from_id`]
///
/// Returns `None` if the slice is not exactly 16 bytes.
pub fn id_from_bytes(bytes: &[u8]) -> Option<Uuid> {
    if bytes.len() != 16 {
        return None;
    }
    let high = u64::from_be_bytes(bytes[..8].try_into().ok()?);
    let low = u64::from_be_bytes(bytes[8..].try_into().ok()?);
    Some(Uuid::from_u128((u128::from(high) << 64) | u128::from(low)))
}
