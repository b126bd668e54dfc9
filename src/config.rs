// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Crate configuration, read from spechack.toml. Every field has a default so
//! an absent or partial file is fine.

use crate::error::ConfigError;
use crate::reveal::{PHASE_MATERIALIZE_END, PHASE_SIGNAL_LOCK};
use crate::util::get_abs_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::OnceLock;

pub const CONFIG_FILE: &str = "spechack.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpechackConfig {
    /// site origin used in challenge links
    pub origin: String,
    /// participant store file
    pub store_path: String,
    /// ambassador applications file
    pub ambassador_path: String,
    /// local card storage file
    pub storage_path: String,
    pub log_file: String,
    pub log_level: String,
    /// optional ttf/otf used to draw text into bitmaps
    pub font_path: Option<String>,
    /// analytics is disabled without a key
    pub analytics_key: Option<String>,
    pub reveal: RevealTiming,
}

/// Phase boundaries in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub signal_lock: f64,
    pub materialize_end: f64,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            signal_lock: PHASE_SIGNAL_LOCK,
            materialize_end: PHASE_MATERIALIZE_END,
        }
    }
}

impl Default for SpechackConfig {
    fn default() -> Self {
        Self {
            origin: "https://spechack.404tf.com".to_string(),
            store_path: "data/participants.json".to_string(),
            ambassador_path: "data/ambassadors.json".to_string(),
            storage_path: "data/local_storage.json".to_string(),
            log_file: "log/spechack.log".to_string(),
            log_level: "info".to_string(),
            font_path: None,
            analytics_key: None,
            reveal: RevealTiming::default(),
        }
    }
}

impl SpechackConfig {
    pub fn from_toml(text: &str, path: &str) -> Result<Self, ConfigError> {
        let cfg: SpechackConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config file. A missing file yields the defaults, an unreadable
    /// or malformed one is an error.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let fpath = get_abs_path(path);
        match fs::read_to_string(&fpath) {
            Ok(text) => Self::from_toml(&text, &fpath),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: fpath,
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let r = &self.reveal;
        if !(r.signal_lock > 0.0 && r.materialize_end > r.signal_lock) {
            return Err(ConfigError::Invalid(format!(
                "reveal timings must satisfy 0 < signal_lock < materialize_end, got {} / {}",
                r.signal_lock, r.materialize_end
            )));
        }
        if self.origin.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "origin must not end with '/': {}",
                self.origin
            )));
        }
        Ok(())
    }
}

/// Global configuration, set once by the command line tool at startup.
pub static SPECHACK_CONFIG: OnceLock<SpechackConfig> = OnceLock::new();

pub fn init_config(cfg: SpechackConfig) {
    let _ = SPECHACK_CONFIG.set(cfg);
}

/// Returns the defaults when init_config was never called.
pub fn get_config() -> &'static SpechackConfig {
    SPECHACK_CONFIG.get_or_init(SpechackConfig::default)
}
