//! Pre-lock checks on both ends of a move.
//! All of these run before the table lock is taken, so a failure here leaves
//! nothing to undo.

use std::fs::{self, DirBuilder};
use std::io;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use tracing::info;

use crate::errors::{FsStage, RelocateError};

const DESTINATION_DIR_MODE: u32 = 0o700;

/// The source must be a regular file. A symbolic link there means an earlier
/// run already relocated it; nothing there means the file is gone (possibly
/// moved by a run whose link step failed).
pub fn ensure_source_in_place(src: &Path) -> Result<(), RelocateError> {
    let meta = match fs::symlink_metadata(src) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RelocateError::SourceMissing(src.to_path_buf()));
        }
        Err(e) => return Err(RelocateError::fs(FsStage::InspectingPath, src)(e)),
    };
    let ft = meta.file_type();
    if ft.is_symlink() {
        return Err(RelocateError::SourceAlreadyRelocated(src.to_path_buf()));
    }
    if !ft.is_file() {
        return Err(RelocateError::fs(FsStage::InspectingPath, src)(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(())
}

/// Nothing (file, directory or dangling link) may already sit at `dest`.
pub fn ensure_destination_free(dest: &Path) -> Result<(), RelocateError> {
    match fs::symlink_metadata(dest) {
        Ok(_) => Err(RelocateError::DestinationExists(dest.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RelocateError::fs(FsStage::InspectingPath, dest)(e)),
    }
}

/// Create `<target>/<database>` owner-only if it is missing.
pub fn ensure_destination_directory(dir: &Path) -> Result<(), RelocateError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RelocateError::fs(FsStage::CreatingDirectory, dir)(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "exists and is not a directory",
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            DirBuilder::new()
                .mode(DESTINATION_DIR_MODE)
                .create(dir)
                .map_err(RelocateError::fs(FsStage::CreatingDirectory, dir))?;
            info!(path = %dir.display(), "Created destination database directory");
            Ok(())
        }
        Err(e) => Err(RelocateError::fs(FsStage::CreatingDirectory, dir)(e)),
    }
}
