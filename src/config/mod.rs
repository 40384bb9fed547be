//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor, CONFIG_ENV};
pub use types::{Config, ConnectionConfig, LogLevel};
pub use xml::{load_config, load_config_from_xml_path};

/// Server defaults used when the config file does not say otherwise.
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_SOCKET: &str = "/var/run/mysqld/mysqld.sock";
