//! Core library for `move_partition`.
//!
//! Relocates one InnoDB partition data file out of the server's data directory
//! into another directory, under an exclusive table write lock, and leaves a
//! symbolic link at the old path so the server keeps finding it.
//!
//! The pieces, leaf first:
//! - [`naming`]: allow-listed identifiers and the `<table>#P#<partition>.ibd` convention
//! - [`validator`]: partition existence check in `information_schema`
//! - [`resolver`]: source path from the server's `datadir`
//! - [`fs_ops`]: rename with a cross-device copy fallback, and the back link
//! - [`orchestrator`]: the locked state machine tying them together

pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod fs_ops;
pub mod naming;
pub mod orchestrator;
pub mod outcome;
pub mod output;
pub mod platform;
pub mod request;
pub mod resolver;
pub mod sql;
pub mod validator;

pub use config::{Config, ConnectionConfig, LogLevel};
pub use db::{Connector, Credentials, DbError, Row, Session};
pub use errors::{FsStage, RelocateError};
pub use naming::{Identifier, PartitionLocation};
pub use orchestrator::{PartitionRelocator, RelocationReport, Stage};
pub use outcome::{RelocationOutcome, RESULT_MAX_LEN, SUCCESS_MARKER};
pub use request::{Argument, RelocationRequest};

#[cfg(feature = "mysql")]
pub use db::MysqlConnector;
