//! Cross-device copy of a partition data file.
//!
//! - The destination is created with `create_new` and the source's mode, so an
//!   existing file is never clobbered.
//! - Bytes move with sendfile(2) on Linux, in a loop bounded by the size taken
//!   from fstat; any call may move fewer bytes than asked.
//! - On failure after the destination was created, the partial file is removed.
//! - On success the destination has the source's permission bits and times and
//!   has been fsynced. Removing the source is the caller's job.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::meta::apply_source_metadata;
use crate::errors::{FsStage, RelocateError};

/// Upper bound for a single transfer request.
const MAX_CHUNK: u64 = 64 * 1024 * 1024;

/// One bulk-transfer primitive call: move up to `len` bytes from the current
/// offset of `from` to the current offset of `to`, returning how many moved.
pub trait ChunkTransfer {
    fn transfer(&mut self, from: &File, to: &File, len: usize) -> io::Result<usize>;
}

/// sendfile(2) on Linux; plain read/write elsewhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct KernelCopy;

impl ChunkTransfer for KernelCopy {
    #[cfg(target_os = "linux")]
    fn transfer(&mut self, from: &File, to: &File, len: usize) -> io::Result<usize> {
        use std::os::unix::io::AsRawFd;
        // SAFETY: both descriptors are open for the lifetime of the borrow; a null
        // offset makes sendfile use and advance the source's file offset.
        let rc = unsafe {
            libc::sendfile(to.as_raw_fd(), from.as_raw_fd(), std::ptr::null_mut(), len)
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(rc as usize)
    }

    #[cfg(not(target_os = "linux"))]
    fn transfer(&mut self, mut from: &File, mut to: &File, len: usize) -> io::Result<usize> {
        use std::io::{Read, Write};
        let mut buf = vec![0u8; len.min(1024 * 1024)];
        let n = from.read(&mut buf)?;
        to.write_all(&buf[..n])?;
        Ok(n)
    }
}

/// Removes the destination on drop unless the copy completed.
struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            armed: true,
        }
    }

    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "Failed to remove partial copy");
            } else {
                debug!(path = %self.path.display(), "Removed partial copy");
            }
        }
    }
}

/// Copy `src` to a new file at `dst` with the kernel copy primitive.
pub fn copy_partition(src: &Path, dst: &Path) -> Result<u64, RelocateError> {
    copy_partition_with(src, dst, &mut KernelCopy)
}

/// Copy `src` to a new file at `dst`, moving bytes with `transfer`.
/// Returns the number of bytes copied.
pub fn copy_partition_with<T: ChunkTransfer>(
    src: &Path,
    dst: &Path,
    transfer: &mut T,
) -> Result<u64, RelocateError> {
    let from = File::open(src).map_err(RelocateError::fs(FsStage::OpeningSource, src))?;
    let meta = from
        .metadata()
        .map_err(RelocateError::fs(FsStage::StatSource, src))?;
    let mode = meta.permissions().mode() & 0o7777;

    let to = OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(mode)
        .open(dst)
        .map_err(RelocateError::fs(FsStage::OpeningDestination, dst))?;
    let partial = PartialFile::new(dst);

    let size = meta.len();
    let mut left = size;
    while left > 0 {
        let want = left.min(MAX_CHUNK) as usize;
        match transfer.transfer(&from, &to, want) {
            Ok(0) => {
                return Err(RelocateError::fs(FsStage::Copying, src)(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("source truncated with {left} of {size} bytes left"),
                )));
            }
            Ok(n) => left = left.saturating_sub(n as u64),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(RelocateError::fs(FsStage::Copying, dst)(e)),
        }
    }

    apply_source_metadata(&to, &meta)
        .map_err(RelocateError::fs(FsStage::PreservingMetadata, dst))?;
    to.sync_all()
        .map_err(RelocateError::fs(FsStage::SyncingDestination, dst))?;

    partial.keep();
    debug!(src = %src.display(), dst = %dst.display(), bytes = size, "Copied partition file");
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Hands out at most `cap` bytes per call.
    struct Capped {
        cap: usize,
        calls: usize,
    }

    impl ChunkTransfer for Capped {
        fn transfer(&mut self, from: &File, to: &File, len: usize) -> io::Result<usize> {
            self.calls += 1;
            KernelCopy.transfer(from, to, len.min(self.cap))
        }
    }

    /// Copies once, then fails like a full disk.
    struct FailAfterFirst {
        calls: usize,
    }

    impl ChunkTransfer for FailAfterFirst {
        fn transfer(&mut self, from: &File, to: &File, len: usize) -> io::Result<usize> {
            self.calls += 1;
            if self.calls > 1 {
                return Err(io::Error::from_raw_os_error(libc::ENOSPC));
            }
            KernelCopy.transfer(from, to, len.min(5))
        }
    }

    #[test]
    fn copy_small_file_ok() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.ibd");
        let dst = dir.path().join("dst.ibd");
        fs::write(&src, b"hello world").unwrap();

        let n = copy_partition(&src, &dst).unwrap();
        assert_eq!(n, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"hello world");
        assert!(src.exists(), "copy leaves the source for the caller to remove");
    }

    #[test]
    fn copy_zero_length_ok() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("empty");
        let dst = dir.path().join("out");
        File::create(&src).unwrap();

        assert_eq!(copy_partition(&src, &dst).unwrap(), 0);
        assert_eq!(fs::metadata(&dst).unwrap().len(), 0);
    }

    #[test]
    fn partial_transfers_are_looped() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.ibd");
        let dst = dir.path().join("big.out");
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&src, &data).unwrap();

        let mut t = Capped { cap: 7, calls: 0 };
        let n = copy_partition_with(&src, &dst, &mut t).unwrap();
        assert_eq!(n as usize, data.len());
        assert_eq!(t.calls, data.len().div_ceil(7));
        assert_eq!(fs::read(&dst).unwrap(), data);
    }

    #[test]
    fn failed_transfer_removes_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.ibd");
        let dst = dir.path().join("dst.ibd");
        fs::write(&src, vec![1u8; 64]).unwrap();

        let err = copy_partition_with(&src, &dst, &mut FailAfterFirst { calls: 0 }).unwrap_err();
        assert!(err.to_string().starts_with("Error copying"), "got: {err}");
        assert!(!dst.exists(), "partial destination must be removed");
        assert_eq!(fs::read(&src).unwrap(), vec![1u8; 64]);
    }

    #[test]
    fn existing_destination_is_left_alone() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"data").unwrap();
        fs::write(&dst, b"keep me").unwrap();

        let err = copy_partition(&src, &dst).unwrap_err();
        assert!(err.to_string().starts_with("Error opening destination"));
        assert_eq!(fs::read(&dst).unwrap(), b"keep me");
    }

    #[test]
    fn missing_source_names_stage() {
        let dir = tempdir().unwrap();
        let err = copy_partition(&dir.path().join("nope"), &dir.path().join("out")).unwrap_err();
        assert!(err.to_string().starts_with("Error opening source"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn mode_preserved_regardless_of_umask() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, b"abc").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o664)).unwrap();

        copy_partition(&src, &dst).unwrap();
        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o664);
    }
}
