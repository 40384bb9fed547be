//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - A missing file means defaults; a malformed file or an unknown element is an error.
//!
//! Example:
//! <config>
//!   <host>db1.internal</host>
//!   <port>3306</port>
//!   <socket>/var/run/mysqld/mysqld.sock</socket>
//!   <log_level>info</log_level>
//!   <log_file>/var/log/move_partition.log</log_file>
//! </config>

use anyhow::{Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    host: Option<String>,
    #[serde(default, deserialize_with = "de_u16_trimmed_opt")]
    port: Option<u16>,
    socket: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

// Trims surrounding whitespace before parsing; an unparsable port is an error.
fn de_u16_trimmed_opt<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<u16>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid port '{s}': {e}"))),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Map XmlConfig -> Config, starting from defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(host) = non_empty(parsed.host) {
        cfg.connection.host = Some(host);
        // An explicit host means TCP unless a socket is also given.
        cfg.connection.socket = None;
    }
    if let Some(port) = parsed.port {
        cfg.connection.port = port;
    }
    if let Some(socket) = parsed.socket {
        // An empty value selects TCP.
        cfg.connection.socket = non_empty(Some(socket)).map(PathBuf::from);
    }
    if let Some(level) = non_empty(parsed.log_level) {
        cfg.log_level = level
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)?;
    }
    cfg.log_file = non_empty(parsed.log_file).map(PathBuf::from);

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid config xml '{}'", path.display()))
}

/// Load the effective config: the configured XML file if it exists, else defaults.
pub fn load_config() -> Result<Config> {
    let Some(path) = default_config_path() else {
        debug!("No config path could be determined; using defaults");
        return Ok(Config::default());
    };
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found; using defaults");
        return Ok(Config::default());
    }
    let cfg = load_config_from_xml_path(&path)?;
    cfg.validate()
        .with_context(|| format!("config '{}'", path.display()))?;
    Ok(cfg)
}
