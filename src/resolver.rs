//! Source path resolution from the server's `datadir` variable.
//! Pure path computation; nothing here touches the filesystem.

use std::path::PathBuf;

use tracing::debug;

use crate::db::Session;
use crate::errors::RelocateError;
use crate::naming::{self, Identifier, PartitionLocation};
use crate::request::RelocationRequest;
use crate::sql::quote_literal;

/// Server variable holding the data directory.
pub const DATADIR_VARIABLE: &str = "datadir";

/// Server settings read once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_directory: String,
}

impl ServerConfig {
    pub fn read<S: Session>(session: &mut S) -> Result<Self, RelocateError> {
        let data_directory = read_variable(session, DATADIR_VARIABLE)?;
        debug!(data_directory = %data_directory, "Server data directory");
        Ok(Self { data_directory })
    }
}

/// Look up one server variable, `SHOW VARIABLES` style.
pub fn read_variable<S: Session>(session: &mut S, name: &str) -> Result<String, RelocateError> {
    let sql = format!("SHOW VARIABLES WHERE `Variable_name` = {}", quote_literal(name));
    let rows = session
        .query(&sql)
        .map_err(|source| RelocateError::VariableQuery {
            name: name.to_string(),
            source,
        })?;

    rows.into_iter()
        .next()
        .and_then(|row| row.into_iter().nth(1).flatten())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RelocateError::VariableNotFound(name.to_string()))
}

/// Path of the partition's data file under the server's data directory.
pub fn resolve_source_path<S: Session>(
    session: &mut S,
    database: &Identifier,
    table: &Identifier,
    partition: &Identifier,
) -> Result<PathBuf, RelocateError> {
    let server = ServerConfig::read(session)?;
    Ok(naming::source_path(
        &server.data_directory,
        database,
        table,
        partition,
    ))
}

/// Both ends of the move for `request`.
pub fn resolve_location<S: Session>(
    session: &mut S,
    request: &RelocationRequest,
) -> Result<PartitionLocation, RelocateError> {
    let source_path =
        resolve_source_path(session, &request.database, &request.table, &request.partition)?;
    Ok(PartitionLocation::from_source(
        source_path,
        &request.target_directory,
        &request.database,
        &request.table,
        &request.partition,
    ))
}
