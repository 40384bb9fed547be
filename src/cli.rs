//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - The six relocation parameters are taken positionally and checked by the
//!   library, so a wrong count is reported the same way as any other caller.
//! - --debug is a shorthand for --log-level debug.
//! - --host switches to TCP; --socket switches back to a local socket.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::request::Argument;

/// Move one InnoDB partition data file to another directory and leave a
/// symbolic link at its old location.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Relocate a MySQL partition data file out of the data directory",
    after_help = "PARAMETERS, in order: USER PASSWORD DATABASE TABLE PARTITION TARGET_DIR"
)]
pub struct Args {
    /// USER PASSWORD DATABASE TABLE PARTITION TARGET_DIR
    #[arg(value_name = "PARAMETERS", num_args = 0..)]
    pub parameters: Vec<String>,

    /// Connect over TCP to this host instead of the local socket.
    #[arg(long, help = "Server host (uses TCP instead of the socket)")]
    pub host: Option<String>,

    /// TCP port.
    #[arg(long, help = "Server TCP port")]
    pub port: Option<u16>,

    /// Unix socket path.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Server Unix socket path")]
    pub socket: Option<PathBuf>,

    /// Read settings from this XML file instead of the default location.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Config file to read")]
    pub config: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also write logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Append logs to this file")]
    pub log_file: Option<PathBuf>,

    /// Print where move_partition will look for the config file, then exit.
    #[arg(long, help = "Print the config file location and exit")]
    pub print_config: bool,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(host) = &self.host {
            cfg.connection.host = Some(host.clone());
            cfg.connection.socket = None;
        }
        if let Some(port) = self.port {
            cfg.connection.port = port;
        }
        if let Some(socket) = &self.socket {
            cfg.connection.socket = Some(socket.clone());
            if self.host.is_none() {
                cfg.connection.host = None;
            }
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
    }

    /// Positional parameters as call arguments, in order.
    pub fn arguments(&self) -> Vec<Argument> {
        self.parameters.iter().map(|p| Argument::from(p.as_str())).collect()
    }
}

pub fn parse() -> Args {
    Args::parse()
}
