//! Filesystem operations for relocating a partition data file.

mod helpers;
mod io_copy;
mod meta;
mod prepare;
mod relocate;
mod util;

pub use helpers::describe_io;
pub use io_copy::{copy_partition, copy_partition_with, ChunkTransfer, KernelCopy};
pub use prepare::{ensure_destination_directory, ensure_destination_free, ensure_source_in_place};
pub use relocate::{
    link_back, move_partition_file, move_partition_file_with, std_rename, MoveMethod,
    RenameFn,
};
