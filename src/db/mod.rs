//! Database collaborator seam.
//! The relocation core talks to the server only through these two traits so
//! tests can substitute an in-memory server and production can use MySQL.

use std::fmt;

use thiserror::Error;

use crate::config::ConnectionConfig;
use crate::naming::Identifier;

#[cfg(feature = "mysql")]
mod mysql_session;

#[cfg(feature = "mysql")]
pub use self::mysql_session::{MysqlConnector, MysqlSession};

/// One result row in text form; `None` is SQL NULL.
pub type Row = Vec<Option<String>>;

/// Error reported by the database driver, carrying its text verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DbError {
    code: Option<u16>,
    message: String,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Server error number, when the failure came from the server.
    pub fn code(&self) -> Option<u16> {
        self.code
    }
}

/// Login details taken from the relocation request.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    pub database: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Opens sessions. The session is closed when dropped.
pub trait Connector {
    type Session: Session;

    fn connect(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Result<Self::Session, DbError>;
}

/// A live, blocking database session.
pub trait Session {
    /// Run a text query and return all rows.
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, DbError>;

    /// Take an exclusive write lock on `table` for this session.
    fn lock_table_write(&mut self, table: &Identifier) -> Result<(), DbError>;

    /// Release every table lock held by this session.
    fn unlock_all(&mut self) -> Result<(), DbError>;
}
