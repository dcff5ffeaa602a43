//! Linux input-device event pipeline for the keytone soundboard
//!
//! This crate provides:
//! - 24-byte input-event frame decoding
//! - Classification of decoded frames into logical key actions
//! - A pausable listen gate around the device read loop
//! - A background read thread with a simulated fallback when no device
//!   is present
//! - A flume channel bridge from the device thread to the application
//!
//! # Architecture
//!
//! ```text
//! /dev/input/event0 → read thread → decode → classify → interceptor → app
//!                          ↑
//!                     ListenGate (start_listening / stop_listening)
//! ```
//!
//! The read thread is synchronous; [`ChannelInterceptor`] bridges it to
//! the rest of the application over a flume channel.
//!
//! The sound catalog load (see `keytone-core`) must complete before the
//! listener is spawned; events are processed strictly in arrival order on
//! the single read thread.

mod classify;
mod config;
mod frame;
mod gate;
mod keys;
mod source;

pub use classify::{classify, EV_KEY};
pub use config::{
    default_listener_config_path, load_listener_config, save_listener_config, DispatchPolicy,
    ListenerConfig,
};
pub use frame::{decode_frame, encode_frame, FrameError, RawEvent, FRAME_LEN};
pub use gate::ListenGate;
pub use keys::{Key, KeyAction, KeyLookup, LinuxKeyLookup};
pub use source::{DeviceEventSource, ListenerError, FALLBACK_KEY};

use flume::{Receiver, Sender};
use std::sync::Arc;

/// Error returned by an interceptor that could not accept a key
#[derive(Debug, thiserror::Error)]
#[error("key dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Inbound boundary for classified key events
///
/// Called once per classified key event (or once per fallback tick).
/// Implementations must be cheap and non-blocking; a returned error is
/// logged by the read loop and never crashes it.
pub trait KeyboardInterceptor: Send + Sync {
    fn receive_key(&self, key: Key) -> Result<(), DispatchError>;
}

/// Channel-backed interceptor bridging the device thread to the app
pub struct ChannelInterceptor {
    key_tx: Sender<Key>,
}

impl ChannelInterceptor {
    /// Create a bounded interceptor; keys overflowing the channel are
    /// rejected (and logged by the read loop) rather than blocking it
    pub fn bounded(capacity: usize) -> (Self, Receiver<Key>) {
        let (key_tx, key_rx) = flume::bounded(capacity);
        (Self { key_tx }, key_rx)
    }

    pub fn unbounded() -> (Self, Receiver<Key>) {
        let (key_tx, key_rx) = flume::unbounded();
        (Self { key_tx }, key_rx)
    }
}

impl KeyboardInterceptor for ChannelInterceptor {
    fn receive_key(&self, key: Key) -> Result<(), DispatchError> {
        self.key_tx
            .try_send(key)
            .map_err(|e| DispatchError(format!("key channel unavailable: {}", e)))
    }
}

/// Main keyboard listener
///
/// Owns the device read thread and exposes the listening control surface.
/// The listener starts paused; nothing is dispatched in Live mode until
/// [`KeyboardListener::start_listening`] is called.
pub struct KeyboardListener {
    source: DeviceEventSource,
}

impl KeyboardListener {
    /// Spawn the listener with the given configuration
    ///
    /// Mode (Live vs Fallback) is fixed here from the device path and
    /// never re-evaluated.
    pub fn spawn(
        config: &ListenerConfig,
        lookup: Arc<dyn KeyLookup>,
        interceptor: Arc<dyn KeyboardInterceptor>,
    ) -> Result<Self, ListenerError> {
        let source = DeviceEventSource::spawn(config, lookup, interceptor)?;
        Ok(Self { source })
    }

    /// Release the gate, permitting the Live read loop to proceed
    ///
    /// Idempotent. Has no observable effect in Fallback mode.
    pub fn start_listening(&self) {
        self.source.gate().resume();
    }

    /// Hold the gate, parking the Live read loop before its next read
    ///
    /// Idempotent. Pausing without a later `start_listening` keeps the
    /// loop parked indefinitely; that is the caller's obligation.
    pub fn stop_listening(&self) {
        self.source.gate().pause();
    }

    pub fn is_listening(&self) -> bool {
        !self.source.gate().is_paused()
    }

    /// Whether the read loop is still running
    ///
    /// Turns false after a fatal device read error or end of stream.
    pub fn is_alive(&self) -> bool {
        self.source.is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_listener_control_surface() {
        let mut device = tempfile::NamedTempFile::new().unwrap();
        device
            .write_all(&encode_frame(&RawEvent {
                seconds: 0,
                microseconds: 0,
                event_type: EV_KEY,
                code: 30,
                value: 1,
            }))
            .unwrap();
        device.flush().unwrap();

        let config = ListenerConfig {
            device_path: device.path().to_path_buf(),
            ..ListenerConfig::default()
        };
        let (interceptor, rx) = ChannelInterceptor::bounded(256);
        let listener = KeyboardListener::spawn(
            &config,
            Arc::new(LinuxKeyLookup),
            Arc::new(interceptor),
        )
        .unwrap();

        // Paused until told otherwise
        assert!(!listener.is_listening());
        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

        listener.start_listening();
        assert!(listener.is_listening());
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::A);

        listener.stop_listening();
        assert!(!listener.is_listening());
    }

    #[test]
    fn test_bounded_interceptor_rejects_on_overflow() {
        let (interceptor, rx) = ChannelInterceptor::bounded(1);
        interceptor.receive_key(Key::A).unwrap();
        assert!(interceptor.receive_key(Key::B).is_err());
        assert_eq!(rx.try_recv().unwrap(), Key::A);
    }
}
