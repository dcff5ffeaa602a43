//! Input-event frame decoding
//!
//! A Linux `/dev/input/event*` stream is a sequence of fixed 24-byte
//! records: seconds (8), microseconds (8), type (2), code (2), value (4).
//! Every field is decoded by reversing the stored byte run and reading it
//! back as a big-endian unsigned integer, which re-derives the magnitude
//! without assuming the host's native byte order. The encoder applies the
//! same reversal, so decode/encode is bit-for-bit stable.

/// Size of one input-event record in bytes
pub const FRAME_LEN: usize = 24;

/// One decoded input-event record
///
/// Ephemeral: exists only between decode and classification, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    /// Event timestamp, whole seconds
    pub seconds: u64,
    /// Event timestamp, microsecond remainder
    pub microseconds: u64,
    /// Event class (EV_KEY, EV_REL, ...)
    pub event_type: u16,
    /// Event code (key scan code for EV_KEY)
    pub code: u16,
    /// Event value (0 = release, 1 = press, 2 = autorepeat for EV_KEY)
    pub value: i32,
}

/// Frame decode errors
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The input was not exactly one frame; nothing is interpreted
    #[error("short read: got {got} byte(s), need {FRAME_LEN}")]
    ShortRead { got: usize },
}

/// Reverse a stored byte run, then read it as a big-endian unsigned integer
fn reversed_uint(bytes: &[u8]) -> u64 {
    let mut value: u64 = 0;
    for &byte in bytes.iter().rev() {
        value = (value << 8) | u64::from(byte);
    }
    value
}

/// Write `value` into `slot` as the reversal of its big-endian byte run
///
/// Exact inverse of [`reversed_uint`] for the slot's width.
fn write_reversed(slot: &mut [u8], mut value: u64) {
    for byte in slot.iter_mut() {
        *byte = (value & 0xFF) as u8;
        value >>= 8;
    }
}

/// Decode exactly one 24-byte frame
///
/// Any other input length fails with [`FrameError::ShortRead`] and no
/// `RawEvent` is produced.
pub fn decode_frame(buf: &[u8]) -> Result<RawEvent, FrameError> {
    if buf.len() != FRAME_LEN {
        return Err(FrameError::ShortRead { got: buf.len() });
    }

    Ok(RawEvent {
        seconds: reversed_uint(&buf[0..8]),
        microseconds: reversed_uint(&buf[8..16]),
        event_type: reversed_uint(&buf[16..18]) as u16,
        code: reversed_uint(&buf[18..20]) as u16,
        value: reversed_uint(&buf[20..24]) as u32 as i32,
    })
}

/// Re-encode an event into its 24-byte frame
///
/// Used for interoperability testing against captured device streams.
pub fn encode_frame(event: &RawEvent) -> [u8; FRAME_LEN] {
    let mut out = [0u8; FRAME_LEN];
    write_reversed(&mut out[0..8], event.seconds);
    write_reversed(&mut out[8..16], event.microseconds);
    write_reversed(&mut out[16..18], u64::from(event.event_type));
    write_reversed(&mut out[18..20], u64::from(event.code));
    write_reversed(&mut out[20..24], u64::from(event.value as u32));
    out
}
