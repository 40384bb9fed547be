//! Config validation logic.
//! Catches settings that would only fail later, at connect or log-open time.

use anyhow::{bail, Result};
use tracing::debug;

use super::types::Config;

impl Config {
    /// Check connection and logging settings for obvious mistakes.
    pub fn validate(&self) -> Result<()> {
        let conn = &self.connection;
        if conn.port == 0 {
            bail!("port must be between 1 and 65535");
        }
        if let Some(host) = conn.host.as_deref()
            && host.trim().is_empty()
        {
            bail!("host must not be empty");
        }
        if let Some(socket) = conn.socket.as_deref()
            && !socket.is_absolute()
        {
            bail!("socket path must be absolute: '{}'", socket.display());
        }
        if let Some(log_file) = self.log_file.as_deref()
            && log_file.is_dir()
        {
            bail!("log_file is a directory: '{}'", log_file.display());
        }
        debug!(
            host = conn.host.as_deref().unwrap_or("<local>"),
            port = conn.port,
            socket = %conn.socket.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<none>".into()),
            "Config validated"
        );
        Ok(())
    }
}
