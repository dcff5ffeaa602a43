//! Device event read loop
//!
//! Dedicated thread per listener. In Live mode it reads 24-byte frames
//! from the device stream under the listen gate, decodes and classifies
//! them, and dispatches classified keys to the interceptor. When the
//! device path is absent at startup it runs in Fallback mode instead,
//! dispatching a fixed diagnostic key on a timer so the downstream
//! pipeline stays exercised without hardware.
//!
//! The mode is selected once at spawn and never re-evaluated. There is no
//! cooperative cancellation: the gate only parks the Live loop, it never
//! terminates the thread.

use crate::classify::classify;
use crate::config::{DispatchPolicy, ListenerConfig};
use crate::frame::{decode_frame, FrameError, FRAME_LEN};
use crate::gate::ListenGate;
use crate::keys::{Key, KeyLookup};
use crate::KeyboardInterceptor;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// The diagnostic key dispatched by Fallback mode
pub const FALLBACK_KEY: Key = Key::A;

/// Listener spawn errors
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    /// The device path exists but could not be opened (permissions, etc.)
    #[error("failed to open device {path:?}: {source}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

enum Mode {
    Live(File),
    Fallback,
}

/// Background reader over the device stream (or its simulated fallback)
///
/// Owns the read thread, the listen gate, and a liveness flag. The thread
/// runs for the life of the process; `is_alive` turning false means the
/// Live loop hit a fatal read error or the stream ended.
pub struct DeviceEventSource {
    gate: Arc<ListenGate>,
    alive: Arc<AtomicBool>,
    _handle: thread::JoinHandle<()>,
}

impl DeviceEventSource {
    /// Select the mode from the device path and spawn the read thread
    ///
    /// An absent device path selects Fallback mode (not an error); a
    /// present but unopenable path is an error. The gate starts Paused;
    /// call [`ListenGate::resume`] to let the Live loop proceed. Fallback
    /// mode ignores the gate entirely (documented limitation).
    pub fn spawn(
        config: &ListenerConfig,
        lookup: Arc<dyn KeyLookup>,
        interceptor: Arc<dyn KeyboardInterceptor>,
    ) -> Result<Self, ListenerError> {
        let mode = if config.device_path.exists() {
            let file = File::open(&config.device_path).map_err(|e| ListenerError::DeviceOpen {
                path: config.device_path.clone(),
                source: e,
            })?;
            log::info!("Reading key events from {:?}", config.device_path);
            Mode::Live(file)
        } else {
            log::warn!(
                "{:?} doesn't exist, going to scheduled fallback presses",
                config.device_path
            );
            Mode::Fallback
        };

        let gate = Arc::new(ListenGate::new());
        let alive = Arc::new(AtomicBool::new(true));
        let policy = config.dispatch;
        let fallback_interval = config.fallback_interval();

        let handle = {
            let gate = gate.clone();
            let alive = alive.clone();
            thread::Builder::new()
                .name("keytone-device-io".to_string())
                .spawn(move || {
                    match mode {
                        Mode::Live(file) => {
                            live_loop(file, &*lookup, &*interceptor, &gate, policy)
                        }
                        Mode::Fallback => {
                            fallback_loop(&*interceptor, fallback_interval)
                        }
                    }
                    alive.store(false, Ordering::Relaxed);
                })
                .expect("Failed to spawn device I/O thread")
        };

        Ok(Self {
            gate,
            alive,
            _handle: handle,
        })
    }

    /// The gate controlling the Live read loop
    pub fn gate(&self) -> &ListenGate {
        &self.gate
    }

    /// Whether the read loop is still running
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }
}

/// Live-mode loop: gate, read one frame, decode, classify, dispatch
///
/// Short reads are discarded and the loop continues; I/O errors and end of
/// stream are fatal to the loop (no retry, no failover to Fallback mode).
fn live_loop(
    mut file: File,
    lookup: &dyn KeyLookup,
    interceptor: &dyn KeyboardInterceptor,
    gate: &ListenGate,
    policy: DispatchPolicy,
) {
    log::info!("Device I/O thread started");
    let mut buf = [0u8; FRAME_LEN];

    loop {
        gate.wait_until_active();

        match file.read(&mut buf) {
            Ok(0) => {
                log::warn!("Device stream ended, stopping read loop");
                break;
            }
            Ok(n) => match decode_frame(&buf[..n]) {
                Ok(event) => {
                    if let Some((key, action)) = classify(&event, lookup) {
                        log::debug!("{} Key: {:?} {:?}", event.seconds, key, action);
                        if policy.dispatches(action) {
                            if let Err(e) = interceptor.receive_key(key) {
                                log::warn!("Interceptor rejected key {:?}: {}", key, e);
                            }
                        }
                    }
                }
                Err(FrameError::ShortRead { got }) => {
                    log::debug!("Discarding short read of {} byte(s)", got);
                }
            },
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::error!("Device read failed, stopping read loop: {}", e);
                break;
            }
        }
    }

    log::info!("Device I/O thread stopped");
}

/// Fallback-mode loop: dispatch the diagnostic key every interval
///
/// Dispatch failures are logged and the loop continues; this loop never
/// terminates on its own.
fn fallback_loop(interceptor: &dyn KeyboardInterceptor, interval: Duration) {
    log::info!(
        "Fallback key generator started ({:?} every {:?})",
        FALLBACK_KEY,
        interval
    );

    loop {
        log::debug!("Pressing fallback key {:?}", FALLBACK_KEY);
        if let Err(e) = interceptor.receive_key(FALLBACK_KEY) {
            log::warn!("Interceptor rejected fallback key: {}", e);
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{encode_frame, RawEvent};
    use crate::keys::LinuxKeyLookup;
    use crate::ChannelInterceptor;
    use std::io::Write;

    fn key_frame(code: u16, value: i32) -> [u8; FRAME_LEN] {
        encode_frame(&RawEvent {
            seconds: 1700000000,
            microseconds: 0,
            event_type: 1,
            code,
            value,
        })
    }

    fn write_device_file(frames: &[&[u8]]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for frame in frames {
            file.write_all(frame).unwrap();
        }
        file.flush().unwrap();
        file
    }

    fn spawn_source(
        device: &tempfile::NamedTempFile,
        dispatch: DispatchPolicy,
    ) -> (DeviceEventSource, flume::Receiver<Key>) {
        let config = ListenerConfig {
            device_path: device.path().to_path_buf(),
            dispatch,
            ..ListenerConfig::default()
        };
        let (interceptor, rx) = ChannelInterceptor::unbounded();
        let source = DeviceEventSource::spawn(
            &config,
            Arc::new(LinuxKeyLookup),
            Arc::new(interceptor),
        )
        .unwrap();
        (source, rx)
    }

    #[test]
    fn test_no_dispatch_while_gate_paused() {
        let device = write_device_file(&[&key_frame(30, 1)]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::AllActions);

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert!(source.is_alive());
    }

    #[test]
    fn test_resume_then_one_press_dispatches_one_key() {
        let device = write_device_file(&[&key_frame(30, 1)]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::AllActions);

        source.gate().resume();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::A);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_unclassifiable_frames_are_dropped() {
        // EV_REL event, unknown code, then a real press
        let device = write_device_file(&[
            &encode_frame(&RawEvent {
                seconds: 0,
                microseconds: 0,
                event_type: 2,
                code: 0,
                value: 1,
            }),
            &key_frame(0xFFF0, 1),
            &key_frame(31, 1),
        ]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::AllActions);

        source.gate().resume();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::S);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_trailing_short_frame_is_discarded() {
        let frame = key_frame(30, 1);
        let device = write_device_file(&[&frame, &frame[..7]]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::AllActions);

        source.gate().resume();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::A);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        // End of stream stops the loop
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while source.is_alive() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!source.is_alive());
    }

    #[test]
    fn test_all_actions_policy_dispatches_press_and_release() {
        let device = write_device_file(&[&key_frame(30, 1), &key_frame(30, 0), &key_frame(30, 2)]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::AllActions);

        source.gate().resume();
        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::A);
        }
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_pressed_only_policy_filters_release_and_hold() {
        let device = write_device_file(&[&key_frame(30, 0), &key_frame(30, 2), &key_frame(30, 1)]);
        let (source, rx) = spawn_source(&device, DispatchPolicy::PressedOnly);

        source.gate().resume();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::A);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    /// Fails the first dispatch, forwards the rest
    struct FlakyInterceptor {
        fail_next: AtomicBool,
        key_tx: flume::Sender<Key>,
    }

    impl crate::KeyboardInterceptor for FlakyInterceptor {
        fn receive_key(&self, key: Key) -> Result<(), crate::DispatchError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(crate::DispatchError("downstream unavailable".to_string()));
            }
            self.key_tx
                .try_send(key)
                .map_err(|e| crate::DispatchError(e.to_string()))
        }
    }

    #[test]
    fn test_interceptor_failure_does_not_stop_the_loop() {
        let device = write_device_file(&[&key_frame(30, 1), &key_frame(31, 1)]);
        let config = ListenerConfig {
            device_path: device.path().to_path_buf(),
            ..ListenerConfig::default()
        };
        let (key_tx, rx) = flume::unbounded();
        let source = DeviceEventSource::spawn(
            &config,
            Arc::new(LinuxKeyLookup),
            Arc::new(FlakyInterceptor {
                fail_next: AtomicBool::new(true),
                key_tx,
            }),
        )
        .unwrap();

        // First dispatch fails and is logged; the loop keeps reading and
        // the second frame still gets through
        source.gate().resume();
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), Key::S);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_read_error_is_fatal_to_the_loop() {
        // Opening a directory succeeds on Linux; reading it fails, which
        // drives the fatal read-error branch rather than end of stream
        let dir = tempfile::tempdir().unwrap();
        let config = ListenerConfig {
            device_path: dir.path().to_path_buf(),
            ..ListenerConfig::default()
        };
        let (interceptor, rx) = ChannelInterceptor::unbounded();
        let source = DeviceEventSource::spawn(
            &config,
            Arc::new(LinuxKeyLookup),
            Arc::new(interceptor),
        )
        .unwrap();

        source.gate().resume();
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while source.is_alive() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!source.is_alive());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_absent_device_selects_fallback_mode() {
        let config = ListenerConfig {
            device_path: PathBuf::from("/nonexistent/keytone-test-device"),
            fallback_interval_ms: 50,
            ..ListenerConfig::default()
        };
        let (interceptor, rx) = ChannelInterceptor::unbounded();
        let source = DeviceEventSource::spawn(
            &config,
            Arc::new(LinuxKeyLookup),
            Arc::new(interceptor),
        )
        .unwrap();

        // Fallback ignores the paused gate and ticks on its interval
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), FALLBACK_KEY);
        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), FALLBACK_KEY);
        assert!(source.is_alive());
    }
}
