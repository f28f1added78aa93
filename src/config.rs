//! Control configuration
//!
//! Settings come from `<state dir>/settings.json` when present, with every
//! field optional, then environment overrides:
//!
//! - `MWT_COMMAND_SET` - `modern` or `classic`
//! - `MWT_REMOTE_ENCODING` - any WHATWG encoding label (`gbk`, `windows-1252`, `utf-8`, ...)
//! - `MWT_COMMAND_TIMEOUT_SECS` - per-command timeout in seconds

use crate::constants::{
    COMMAND_TIMEOUT_SECS, CONNECT_TIMEOUT_SECS, DEFAULT_REMOTE_ENCODING, DEFAULT_WAKE_PORT,
    HOME_ENV, PROFILE_FILE, SETTINGS_FILE, STATE_DIR,
};
use crate::core::{CommandSet, SessionSettings, WakeDispatcher, WakeTarget};
use crate::utils::ConfigError;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory holding profiles, settings and logs
pub fn state_dir() -> PathBuf {
    std::env::var_os(HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(STATE_DIR))
}

pub fn default_profile_path() -> PathBuf {
    state_dir().join(PROFILE_FILE)
}

pub fn default_settings_path() -> PathBuf {
    state_dir().join(SETTINGS_FILE)
}

fn positive_secs(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Which shutdown/reboot/hibernate switches the deployment's PCs accept
    pub command_set: CommandSet,
    pub remote_encoding: String,
    pub command_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub wake_port: u16,
    pub wake_target: WakeTarget,
    /// SFTP directory for the suspend helper; empty for the user's home
    pub helper_dir: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            command_set: CommandSet::default(),
            remote_encoding: DEFAULT_REMOTE_ENCODING.to_string(),
            command_timeout_secs: COMMAND_TIMEOUT_SECS,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            wake_port: DEFAULT_WAKE_PORT,
            wake_target: WakeTarget::default(),
            helper_dir: String::new(),
        }
    }
}

impl ControlConfig {
    /// Load settings from `path` (defaults if the file does not exist), then
    /// apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MWT_COMMAND_SET") {
            self.command_set = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MWT_COMMAND_SET",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("MWT_REMOTE_ENCODING") {
            self.remote_encoding = raw.trim().to_string();
        }
        if let Some(raw) = lookup("MWT_COMMAND_TIMEOUT_SECS") {
            self.command_timeout_secs = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: "MWT_COMMAND_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }

    fn encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.remote_encoding.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(self.remote_encoding.clone()))
    }

    /// Resolve into the settings every Host Session runs with
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            command_timeout: positive_secs("command_timeout_secs", self.command_timeout_secs)?,
            connect_timeout: positive_secs("connect_timeout_secs", self.connect_timeout_secs)?,
            command_set: self.command_set,
            encoding: self.encoding()?,
            helper_dir: self.helper_dir.clone(),
            wake_target: self.wake_target.clone(),
            wake: WakeDispatcher::new(self.wake_port),
        })
    }
}
