//! Locked relocation of one partition data file.
//!
//! Steps run strictly in order:
//! check the target directory, connect, validate the partition, resolve paths, prepare the destination,
//! lock the table, move the file, link the old path to the new one, unlock.
//! Everything before the lock is read-only towards the data directory, so a
//! failure there leaves nothing to undo. Once the lock is held it is released
//! on every exit path by [`TableLock`]'s `Drop`, and the session is closed when
//! it goes out of scope.

use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::db::{Connector, Session};
use crate::errors::RelocateError;
use crate::fs_ops::{
    ensure_destination_directory, ensure_destination_free, ensure_source_in_place, link_back,
    move_partition_file_with, std_rename, MoveMethod, RenameFn,
};
use crate::naming::{Identifier, PartitionLocation};
use crate::outcome::RelocationOutcome;
use crate::request::RelocationRequest;
use crate::resolver::resolve_location;
use crate::validator::validate_partition;

/// Progress of one invocation. `Aborted` is reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Connected,
    Validated,
    PathResolved,
    DestPrepared,
    Locked,
    Moved,
    Linked,
    Done,
    Aborted,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationReport {
    pub location: PartitionLocation,
    pub method: MoveMethod,
}

/// Exclusive table write lock, released when dropped.
/// The unlock is best effort: its failure is logged, never returned.
struct TableLock<'a, S: Session> {
    session: &'a mut S,
    table: &'a Identifier,
    held: bool,
}

impl<'a, S: Session> TableLock<'a, S> {
    fn acquire(session: &'a mut S, table: &'a Identifier) -> Result<Self, RelocateError> {
        session
            .lock_table_write(table)
            .map_err(|source| RelocateError::Lock {
                table: table.to_string(),
                source,
            })?;
        debug!(%table, "Acquired table write lock");
        Ok(Self {
            session,
            table,
            held: true,
        })
    }

    fn release(mut self) {
        self.unlock();
    }

    fn unlock(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        match self.session.unlock_all() {
            Ok(()) => debug!(table = %self.table, "Released table lock"),
            Err(e) => warn!(table = %self.table, error = %e, "Failed to release table lock"),
        }
    }
}

impl<S: Session> Drop for TableLock<'_, S> {
    fn drop(&mut self) {
        self.unlock();
    }
}

/// Runs relocations against one server.
pub struct PartitionRelocator<C: Connector> {
    connector: C,
    connection: ConnectionConfig,
    rename: RenameFn,
}

impl<C: Connector> PartitionRelocator<C> {
    pub fn new(connector: C, connection: ConnectionConfig) -> Self {
        Self {
            connector,
            connection,
            rename: std_rename,
        }
    }

    /// Replace the rename primitive (the copy fallback triggers on EXDEV from it).
    pub fn with_rename(mut self, rename: RenameFn) -> Self {
        self.rename = rename;
        self
    }

    /// Run one relocation and reduce it to the caller-facing outcome.
    pub fn relocate(&self, request: &RelocationRequest) -> RelocationOutcome {
        match self.run(request) {
            Ok(_) => RelocationOutcome::Success,
            Err(e) => RelocationOutcome::from_error(&e),
        }
    }

    /// Run one relocation, returning the typed result.
    pub fn run(&self, request: &RelocationRequest) -> Result<RelocationReport, RelocateError> {
        let mut stage = Stage::Init;
        let result = self.run_stages(request, &mut stage);
        match &result {
            Ok(report) => info!(
                database = %request.database,
                table = %request.table,
                partition = %request.partition,
                dest = %report.location.destination_path.display(),
                method = ?report.method,
                "Partition relocated"
            ),
            Err(e) => {
                let failed_after = stage;
                advance(&mut stage, Stage::Aborted);
                error!(
                    code = e.code(),
                    kind = e.kind(),
                    failed_after = ?failed_after,
                    database = %request.database,
                    table = %request.table,
                    partition = %request.partition,
                    error = %e,
                    "Relocation aborted"
                );
            }
        }
        result
    }

    fn run_stages(
        &self,
        request: &RelocationRequest,
        stage: &mut Stage,
    ) -> Result<RelocationReport, RelocateError> {
        request.validate_target()?;

        let mut session = self
            .connector
            .connect(&self.connection, &request.credentials())
            .map_err(RelocateError::Connect)?;
        advance(stage, Stage::Connected);

        validate_partition(&mut session, &request.table, &request.partition)?;
        advance(stage, Stage::Validated);

        let location = resolve_location(&mut session, request)?;
        advance(stage, Stage::PathResolved);

        ensure_source_in_place(&location.source_path)?;
        ensure_destination_directory(&location.destination_directory)?;
        ensure_destination_free(&location.destination_path)?;
        advance(stage, Stage::DestPrepared);

        let lock = TableLock::acquire(&mut session, &request.table)?;
        advance(stage, Stage::Locked);

        let method = move_partition_file_with(
            &location.source_path,
            &location.destination_path,
            self.rename,
        )?;
        advance(stage, Stage::Moved);

        link_back(&location.source_path, &location.destination_path)?;
        advance(stage, Stage::Linked);

        lock.release();
        advance(stage, Stage::Done);

        Ok(RelocationReport { location, method })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "Relocation stage");
    *stage = next;
}
