//! The relocation request and its call-boundary checks.
//!
//! Arguments arrive as six ordered values. They are checked for count and
//! type, the three names are allow-listed, and the target directory is
//! probed once (exists, is a directory, is writable) before anything
//! connects to the server.

use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::db::Credentials;
use crate::errors::RelocateError;
use crate::naming::Identifier;

/// Number of parameters the operation takes.
pub const PARAMETER_COUNT: usize = 6;

/// A single call-site argument before type checking.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Str(String),
    Int(i64),
    Real(f64),
    Decimal(String),
    Null,
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::Str(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::Str(s)
    }
}

/// Immutable input for one relocation.
#[derive(Clone)]
pub struct RelocationRequest {
    pub user: String,
    pub password: String,
    pub database: Identifier,
    pub table: Identifier,
    pub partition: Identifier,
    pub target_directory: PathBuf,
}

impl std::fmt::Debug for RelocationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelocationRequest")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("table", &self.table)
            .field("partition", &self.partition)
            .field("target_directory", &self.target_directory)
            .finish()
    }
}

impl RelocationRequest {
    /// Build from already-typed strings.
    pub fn new(
        user: &str,
        password: &str,
        database: &str,
        table: &str,
        partition: &str,
        target_directory: impl Into<PathBuf>,
    ) -> Result<Self, RelocateError> {
        for (name, value) in [("user", user), ("password", password)] {
            if value.is_empty() {
                return Err(RelocateError::InvalidArgument {
                    name,
                    value: String::new(),
                    reason: "must not be empty",
                });
            }
        }
        let target_directory = target_directory.into();
        if target_directory.as_os_str().is_empty() {
            return Err(RelocateError::InvalidArgument {
                name: "target directory",
                value: String::new(),
                reason: "must not be empty",
            });
        }
        Ok(Self {
            user: user.to_string(),
            password: password.to_string(),
            database: Identifier::parse("database", database)?,
            table: Identifier::parse("table", table)?,
            partition: Identifier::parse("partition", partition)?,
            target_directory,
        })
    }

    /// Type-check raw call arguments: exactly six, all strings.
    pub fn from_arguments(args: &[Argument]) -> Result<Self, RelocateError> {
        if args.len() != PARAMETER_COUNT {
            return Err(RelocateError::ArgumentCount {
                expected: PARAMETER_COUNT,
                got: args.len(),
            });
        }
        let mut strings = Vec::with_capacity(PARAMETER_COUNT);
        for (i, arg) in args.iter().enumerate() {
            match arg {
                Argument::Str(s) => strings.push(s.as_str()),
                _ => return Err(RelocateError::ArgumentType { position: i + 1 }),
            }
        }
        Self::new(
            strings[0], strings[1], strings[2], strings[3], strings[4], strings[5],
        )
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.as_str().to_string(),
        }
    }

    /// Target directory must exist, be a directory and be writable by this process.
    pub fn validate_target(&self) -> Result<(), RelocateError> {
        let path = &self.target_directory;
        let meta = fs::metadata(path).map_err(|source| RelocateError::TargetMissing {
            path: path.clone(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(RelocateError::TargetNotDirectory(path.clone()));
        }
        if !is_writable(path) {
            return Err(RelocateError::TargetNotWritable(path.clone()));
        }
        debug!(target = %path.display(), "Target directory writable");
        Ok(())
    }
}

/// access(2) W_OK against the real uid; no probe file is created.
fn is_writable(path: &Path) -> bool {
    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call.
    let rc = unsafe { libc::access(c_path.as_ptr(), libc::W_OK) };
    if rc != 0 {
        debug!(
            path = %path.display(),
            error = %io::Error::last_os_error(),
            "access(W_OK) failed"
        );
    }
    rc == 0
}
