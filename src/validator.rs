//! Partition existence check against `information_schema.PARTITIONS`.

use tracing::debug;

use crate::db::{DbError, Session};
use crate::errors::RelocateError;
use crate::naming::Identifier;
use crate::sql::quote_literal;

/// Build the COUNT(*) query. `BINARY` keeps the comparison case-sensitive
/// regardless of the catalog's collation; the schema is the session's default
/// database, i.e. the one named in the request.
pub fn partition_count_query(table: &Identifier, partition: &Identifier) -> String {
    format!(
        "SELECT COUNT(*) FROM `information_schema`.`PARTITIONS` \
         WHERE `TABLE_SCHEMA` = DATABASE() \
         AND BINARY `TABLE_NAME` = {} \
         AND BINARY `PARTITION_NAME` = {}",
        quote_literal(table.as_str()),
        quote_literal(partition.as_str()),
    )
}

/// Confirm `partition` exists for `table`. No side effects.
pub fn validate_partition<S: Session>(
    session: &mut S,
    table: &Identifier,
    partition: &Identifier,
) -> Result<(), RelocateError> {
    let rows = session
        .query(&partition_count_query(table, partition))
        .map_err(RelocateError::PartitionQuery)?;

    let count = rows
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| cell.as_deref())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            RelocateError::PartitionQuery(DbError::new("unexpected result from COUNT(*)"))
        })?;

    debug!(%table, %partition, count, "Partition catalog lookup");
    if count == 0 {
        return Err(RelocateError::PartitionNotFound {
            table: table.to_string(),
            partition: partition.to_string(),
        });
    }
    Ok(())
}
