use std::fs::File;
use std::io;
use std::path::Path;

/// rename(2) refused because source and destination are on different devices.
pub(super) fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

/// Best-effort fsync of `path`'s parent directory.
pub(super) fn fsync_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fsync_dir(parent);
    }
}
