//! On-disk naming for partition data files.
//!
//! InnoDB keeps each partition of a file-per-table tablespace in
//! `<datadir>/<database>/<table>#P#<partition>.ibd`. The names that go into
//! that path are allow-listed here so neither the path nor the SQL built from
//! them can be steered outside the intended database directory.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::RelocateError;

/// Extension of a file-per-table InnoDB tablespace.
pub const PARTITION_FILE_EXT: &str = "ibd";

/// Separator InnoDB puts between table and partition names.
pub const PARTITION_MARKER: &str = "#P#";

const MAX_IDENTIFIER_LEN: usize = 64;

/// A database, table or partition name restricted to `[A-Za-z0-9_$]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `value` as the identifier called `name` (used in the error message).
    pub fn parse(name: &'static str, value: &str) -> Result<Self, RelocateError> {
        let invalid = |reason| RelocateError::InvalidArgument {
            name,
            value: value.to_string(),
            reason,
        };
        if value.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if value.len() > MAX_IDENTIFIER_LEN {
            return Err(invalid("longer than 64 characters"));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        {
            return Err(invalid("only letters, digits, '_' and '$' are allowed"));
        }
        if value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("must not consist only of digits"));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as the server writes it on disk. Characters outside
    /// `[A-Za-z0-9_]` become `@XXXX` (four lowercase hex digits), so `$` is `@0024`.
    pub fn file_name_component(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for c in self.0.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
            } else {
                out.push_str(&format!("@{:04x}", c as u32));
            }
        }
        out
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File name of a partition's tablespace: `<table>#P#<partition>.ibd`.
pub fn partition_file_name(table: &Identifier, partition: &Identifier) -> String {
    format!(
        "{}{PARTITION_MARKER}{}.{PARTITION_FILE_EXT}",
        table.file_name_component(),
        partition.file_name_component()
    )
}

/// Strip exactly one trailing `/` from a server-reported directory.
pub fn trim_trailing_separator(dir: &str) -> &str {
    match dir.strip_suffix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => dir,
    }
}

/// `<data_dir>/<database>/<table>#P#<partition>.ibd`, one trailing `/` on `data_dir` ignored.
pub fn source_path(
    data_dir: &str,
    database: &Identifier,
    table: &Identifier,
    partition: &Identifier,
) -> PathBuf {
    Path::new(trim_trailing_separator(data_dir))
        .join(database.file_name_component())
        .join(partition_file_name(table, partition))
}

/// Where a partition file lives now and where it is going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionLocation {
    pub source_path: PathBuf,
    pub destination_directory: PathBuf,
    pub destination_path: PathBuf,
}

impl PartitionLocation {
    /// Derive both sides from the server's data directory and the request's names.
    pub fn derive(
        data_dir: &str,
        target_root: &Path,
        database: &Identifier,
        table: &Identifier,
        partition: &Identifier,
    ) -> Self {
        Self::from_source(
            source_path(data_dir, database, table, partition),
            target_root,
            database,
            table,
            partition,
        )
    }

    /// Mirror an already resolved source path under `target_root`.
    pub fn from_source(
        source_path: PathBuf,
        target_root: &Path,
        database: &Identifier,
        table: &Identifier,
        partition: &Identifier,
    ) -> Self {
        let destination_directory = target_root.join(database.file_name_component());
        let destination_path =
            destination_directory.join(partition_file_name(table, partition));
        Self {
            source_path,
            destination_directory,
            destination_path,
        }
    }
}
