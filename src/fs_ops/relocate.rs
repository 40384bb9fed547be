//! Moving the data file and installing the back-reference link.
//! rename(2) is always tried first; only EXDEV falls back to copy + remove.

use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::Path;

use tracing::{info, warn};

use super::io_copy::copy_partition;
use super::util::{fsync_parent, is_cross_device};
use crate::errors::{FsStage, RelocateError};

/// The rename primitive; swappable so the copy path can be exercised on one device.
pub type RenameFn = fn(&Path, &Path) -> io::Result<()>;

/// How the file reached its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    Renamed,
    Copied { bytes: u64 },
}

/// Move `src` to `dst`, renaming when possible.
pub fn move_partition_file(src: &Path, dst: &Path) -> Result<MoveMethod, RelocateError> {
    move_partition_file_with(src, dst, std_rename)
}

/// rename(2) via std.
pub fn std_rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// Move `src` to `dst` using `rename`, copying across devices when it reports EXDEV.
pub fn move_partition_file_with(
    src: &Path,
    dst: &Path,
    rename: RenameFn,
) -> Result<MoveMethod, RelocateError> {
    match rename(src, dst) {
        Ok(()) => {
            fsync_parent(dst);
            info!(src = %src.display(), dest = %dst.display(), "Renamed partition file atomically");
            Ok(MoveMethod::Renamed)
        }
        Err(e) if is_cross_device(&e) => {
            warn!(error = %e, "Destination is on another device, copying instead");
            let bytes = copy_partition(src, dst)?;
            if let Err(e) = fs::remove_file(src) {
                // Source still in place; drop the copy.
                let _ = fs::remove_file(dst);
                return Err(RelocateError::fs(FsStage::RemovingSource, src)(e));
            }
            fsync_parent(dst);
            fsync_parent(src);
            info!(src = %src.display(), dest = %dst.display(), bytes, "Copied partition file and removed source");
            Ok(MoveMethod::Copied { bytes })
        }
        Err(e) => Err(RelocateError::fs(FsStage::Renaming, src)(e)),
    }
}

/// Leave a symbolic link at `link` pointing to `target`.
pub fn link_back(link: &Path, target: &Path) -> Result<(), RelocateError> {
    symlink(target, link).map_err(|source| RelocateError::LinkFailed {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })?;
    fsync_parent(link);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn cross_device(_: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::from_raw_os_error(libc::EXDEV))
    }

    fn denied(_: &Path, _: &Path) -> io::Result<()> {
        Err(io::Error::from_raw_os_error(libc::EACCES))
    }

    #[test]
    fn same_device_rename() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.ibd");
        let dst = td.path().join("b.ibd");
        fs::write(&src, b"pages").unwrap();

        assert_eq!(move_partition_file(&src, &dst).unwrap(), MoveMethod::Renamed);
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"pages");
    }

    #[test]
    fn cross_device_copies_then_removes_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.ibd");
        let dst = td.path().join("b.ibd");
        fs::write(&src, b"pages").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o660)).unwrap();

        let method = move_partition_file_with(&src, &dst, cross_device).unwrap();
        assert_eq!(method, MoveMethod::Copied { bytes: 5 });
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"pages");
        assert_eq!(fs::metadata(&dst).unwrap().permissions().mode() & 0o777, 0o660);
    }

    #[test]
    fn other_rename_errors_are_fatal() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.ibd");
        let dst = td.path().join("b.ibd");
        fs::write(&src, b"pages").unwrap();

        let err = move_partition_file_with(&src, &dst, denied).unwrap_err();
        assert!(err.to_string().starts_with("Error renaming"));
        assert!(src.exists());
        assert!(!dst.exists());
    }

    #[test]
    fn link_back_points_at_target() {
        let td = tempdir().unwrap();
        let target = td.path().join("new.ibd");
        let link = td.path().join("old.ibd");
        fs::write(&target, b"x").unwrap();

        link_back(&link, &target).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn link_back_failure_is_partial() {
        let td = tempdir().unwrap();
        let target = td.path().join("new.ibd");
        let link = td.path().join("old.ibd");
        fs::write(&target, b"x").unwrap();
        fs::write(&link, b"in the way").unwrap();

        let err = link_back(&link, &target).unwrap_err();
        assert!(err.is_partial_success());
    }
}
