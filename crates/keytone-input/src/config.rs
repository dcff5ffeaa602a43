//! Listener configuration schema and loader
//!
//! Configuration is stored as YAML. Default location:
//! `~/.config/keytone/listener.yaml` (platform config dir).

use crate::keys::KeyAction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which classified actions reach the interceptor
///
/// The interceptor historically receives every classified action; pressing,
/// releasing and auto-repeating a key each dispatch once. `PressedOnly`
/// narrows that to the initial press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Dispatch on Released, Pressed and Held alike (default)
    #[default]
    AllActions,
    /// Dispatch on Pressed only
    PressedOnly,
}

impl DispatchPolicy {
    /// Whether the given action should be forwarded
    pub fn dispatches(self, action: KeyAction) -> bool {
        match self {
            DispatchPolicy::AllActions => true,
            DispatchPolicy::PressedOnly => action == KeyAction::Pressed,
        }
    }
}

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Input device to read; absence at startup selects fallback mode
    pub device_path: PathBuf,
    /// Action filter applied before dispatch
    pub dispatch: DispatchPolicy,
    /// Interval between synthetic fallback presses, in milliseconds
    pub fallback_interval_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from("/dev/input/event0"),
            dispatch: DispatchPolicy::default(),
            fallback_interval_ms: 5_000,
        }
    }
}

impl ListenerConfig {
    pub fn fallback_interval(&self) -> Duration {
        Duration::from_millis(self.fallback_interval_ms)
    }
}

/// Get the default listener config file path
///
/// Returns: `<config dir>/keytone/listener.yaml`
pub fn default_listener_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keytone")
        .join("listener.yaml")
}

/// Load listener configuration from a YAML file
///
/// If the file doesn't exist, returns the default config. If the file
/// exists but is invalid, logs a warning and returns the default config.
pub fn load_listener_config(path: &Path) -> ListenerConfig {
    log::info!("load_listener_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_listener_config: Config file doesn't exist, using defaults");
        return ListenerConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<ListenerConfig>(&contents) {
            Ok(config) => {
                log::info!(
                    "load_listener_config: device={:?} dispatch={:?} fallback={}ms",
                    config.device_path,
                    config.dispatch,
                    config.fallback_interval_ms
                );
                config
            }
            Err(e) => {
                log::warn!("load_listener_config: Failed to parse config: {}", e);
                ListenerConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_listener_config: Failed to read config file: {}", e);
            ListenerConfig::default()
        }
    }
}

/// Save listener configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_listener_config(config: &ListenerConfig, path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    log::info!("save_listener_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize listener config")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
