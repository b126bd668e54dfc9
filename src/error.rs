// SpecHack
// copyright zipxing@hotmail.com 2022～2025

//! Error types of the collaborator boundaries.
//!
//! Nothing in the card core is fatal: the generator functions are total,
//! a failed 3d context degrades to the flat view and a malformed challenge
//! link redirects. These enums only cover the places where an outer system
//! (file system, gpu, persistence) can refuse to cooperate.

use thiserror::Error;

/// Failures of a participant or ambassador store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("agent number space exhausted at {0}")]
    AgentNumbersExhausted(u32),
}

/// Failures while loading spechack.toml.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// The 3d rendering context could not be created.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("no 3d capable adapter available")]
    NoAdapter,

    #[error("device request failed: {0}")]
    Device(String),

    #[error("shader compilation failed: {0}")]
    Shader(String),
}

/// Failures while writing card images or fonts.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid font {path}: {reason}")]
    Font { path: String, reason: String },

    #[error("no font available to draw the card text")]
    NoFont,
}

/// Failures while setting up the log system.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log config: {0}")]
    Config(String),
}
