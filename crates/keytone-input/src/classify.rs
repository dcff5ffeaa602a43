//! Key event classification
//!
//! Pure interpretation of a decoded [`RawEvent`] into a logical key and
//! action. Anything that is not a recognized key event maps to `None`.

use crate::frame::RawEvent;
use crate::keys::{Key, KeyAction, KeyLookup};

/// Linux event type for key press/release events
pub const EV_KEY: u16 = 1;

/// Classify one decoded event
///
/// Discards non-key events, unknown action values, and scan codes the
/// lookup does not recognize. No side effects.
pub fn classify(event: &RawEvent, lookup: &dyn KeyLookup) -> Option<(Key, KeyAction)> {
    if event.event_type != EV_KEY {
        return None;
    }
    let action = KeyAction::from_value(event.value)?;
    let key = lookup.key_from_code(event.code)?;
    Some((key, action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::LinuxKeyLookup;

    fn key_event(event_type: u16, code: u16, value: i32) -> RawEvent {
        RawEvent {
            seconds: 0,
            microseconds: 0,
            event_type,
            code,
            value,
        }
    }

    #[test]
    fn test_non_key_events_discarded() {
        // EV_REL (2) and EV_SYN (0) are not key events
        assert_eq!(classify(&key_event(2, 30, 1), &LinuxKeyLookup), None);
        assert_eq!(classify(&key_event(0, 30, 1), &LinuxKeyLookup), None);
    }

    #[test]
    fn test_unknown_action_value_discarded() {
        assert_eq!(classify(&key_event(EV_KEY, 30, 5), &LinuxKeyLookup), None);
        assert_eq!(classify(&key_event(EV_KEY, 30, -1), &LinuxKeyLookup), None);
    }

    #[test]
    fn test_unknown_code_discarded() {
        assert_eq!(classify(&key_event(EV_KEY, 0xFFFF, 1), &LinuxKeyLookup), None);
    }

    #[test]
    fn test_classified_press_release_hold() {
        assert_eq!(
            classify(&key_event(EV_KEY, 30, 1), &LinuxKeyLookup),
            Some((Key::A, KeyAction::Pressed))
        );
        assert_eq!(
            classify(&key_event(EV_KEY, 30, 0), &LinuxKeyLookup),
            Some((Key::A, KeyAction::Released))
        );
        assert_eq!(
            classify(&key_event(EV_KEY, 57, 2), &LinuxKeyLookup),
            Some((Key::Space, KeyAction::Held))
        );
    }

    #[test]
    fn test_injected_lookup_is_honored() {
        struct OnlyZ;
        impl KeyLookup for OnlyZ {
            fn key_from_code(&self, code: u16) -> Option<Key> {
                (code == 99).then_some(Key::Z)
            }
        }

        assert_eq!(
            classify(&key_event(EV_KEY, 99, 1), &OnlyZ),
            Some((Key::Z, KeyAction::Pressed))
        );
        assert_eq!(classify(&key_event(EV_KEY, 30, 1), &OnlyZ), None);
    }
}
