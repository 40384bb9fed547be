//! Platform-specific helpers.
//! Partition files, symlinks and sendfile are Unix concepts, so only Unix is supported.

#[cfg(not(unix))]
compile_error!("move_partition supports Unix targets only");

mod unix;

pub use unix::open_log_file_secure_append;
