//! Logical keys and key actions
//!
//! `Key` is the platform-independent key identity; the hardware scan code
//! to `Key` mapping is OS-family-specific and injected via [`KeyLookup`].
//! A built-in table for the common Linux typing keys is provided.

use serde::{Deserialize, Serialize};

/// Platform-independent keyboard key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
}

impl Key {
    /// Map a Linux input-event scan code to a key
    ///
    /// Codes are from `include/uapi/linux/input-event-codes.h`. Unknown or
    /// unsupported codes map to `None`.
    pub fn from_linux_code(code: u16) -> Option<Key> {
        Some(match code {
            1 => Key::Escape,
            2 => Key::Num1,
            3 => Key::Num2,
            4 => Key::Num3,
            5 => Key::Num4,
            6 => Key::Num5,
            7 => Key::Num6,
            8 => Key::Num7,
            9 => Key::Num8,
            10 => Key::Num9,
            11 => Key::Num0,
            14 => Key::Backspace,
            15 => Key::Tab,
            16 => Key::Q,
            17 => Key::W,
            18 => Key::E,
            19 => Key::R,
            20 => Key::T,
            21 => Key::Y,
            22 => Key::U,
            23 => Key::I,
            24 => Key::O,
            25 => Key::P,
            28 => Key::Enter,
            30 => Key::A,
            31 => Key::S,
            32 => Key::D,
            33 => Key::F,
            34 => Key::G,
            35 => Key::H,
            36 => Key::J,
            37 => Key::K,
            38 => Key::L,
            44 => Key::Z,
            45 => Key::X,
            46 => Key::C,
            47 => Key::V,
            48 => Key::B,
            49 => Key::N,
            50 => Key::M,
            57 => Key::Space,
            _ => return None,
        })
    }
}

/// What happened to a key, from the frame's value field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAction {
    Released,
    Pressed,
    Held,
}

impl KeyAction {
    /// Map a frame value to an action; unknown values map to `None`
    pub fn from_value(value: i32) -> Option<KeyAction> {
        match value {
            0 => Some(KeyAction::Released),
            1 => Some(KeyAction::Pressed),
            2 => Some(KeyAction::Held),
            _ => None,
        }
    }
}

/// Injected hardware-code-to-key mapping
///
/// Allows a platform-specific table (or a test stub) to be substituted
/// without touching the classifier.
pub trait KeyLookup: Send + Sync {
    fn key_from_code(&self, code: u16) -> Option<Key>;
}

/// The built-in Linux scan-code table
#[derive(Clone, Copy, Debug, Default)]
pub struct LinuxKeyLookup;

impl KeyLookup for LinuxKeyLookup {
    fn key_from_code(&self, code: u16) -> Option<Key> {
        Key::from_linux_code(code)
    }
}
