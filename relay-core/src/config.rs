//! Typed configuration, loaded from a TOML file (spec.md §6, §7; SPEC_FULL.md §6.1).
//!
//! The source validates with runtime type-checkers (`attrs` validators); here
//! the same invariants are encoded as sum types, checked once at load time
//! (spec.md §9 "Dynamic typing removed by explicit configuration records").

use std::path::PathBuf;

use serde::Deserialize;

use crate::frame::MAX_PACKET_SIZE;

/// `enqueue` drops on overflow at this many frames per queue by default.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `tracing` only has five levels; `WARNING`/`CRITICAL` collapse onto
    /// the nearest one (see SPEC_FULL.md §6.3).
    pub fn as_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Client,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Dns,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Base64,
    Base85,
    None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
    pub port: u16,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_max_packet_size() -> usize {
    MAX_PACKET_SIZE
}

#[derive(Debug, Clone, Deserialize)]
pub struct PacketConfig {
    pub protocol: Protocol,
    pub encoding: Encoding,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,
    #[serde(default)]
    pub scratch_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModeSection {
    kind: Mode,
}

#[derive(Debug, Clone, Deserialize)]
struct RawConfig {
    log_level: LogLevel,
    mode: ModeSection,
    client: EndpointConfig,
    server: EndpointConfig,
    packet: PacketConfig,
}

/// Fully validated configuration for a single relay instance.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: LogLevel,
    pub mode: Mode,
    pub client: EndpointConfig,
    pub server: EndpointConfig,
    pub packet: PacketConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("`{field}` port {port} is out of range (must be 1..=65535)")]
    PortOutOfRange { field: &'static str, port: u32 },
    #[error("`packet.queue_capacity` must be greater than zero")]
    ZeroQueueCapacity,
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&text, &path)
    }

    fn parse(text: &str, path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        validate_port("client.port", raw.client.port)?;
        validate_port("server.port", raw.server.port)?;

        if raw.packet.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }

        Ok(Config {
            log_level: raw.log_level,
            mode: raw.mode.kind,
            client: raw.client,
            server: raw.server,
            packet: raw.packet,
        })
    }
}

fn validate_port(field: &'static str, port: u16) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(ConfigError::PortOutOfRange {
            field,
            port: port as u32,
        });
    }
    Ok(())
}
