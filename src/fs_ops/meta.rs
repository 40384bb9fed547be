//! Metadata carried over to a copied partition file.
//! Permission bits are set explicitly (the create mode is subject to umask) and
//! access/modification times are copied so the file looks untouched.

use filetime::{set_file_handle_times, FileTime};
use std::fs::{File, Metadata, Permissions};
use std::io;
use std::os::unix::fs::PermissionsExt;

pub(super) fn apply_source_metadata(dest: &File, src_meta: &Metadata) -> io::Result<()> {
    let mode = src_meta.permissions().mode() & 0o7777;
    dest.set_permissions(Permissions::from_mode(mode))?;

    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    set_file_handle_times(dest, Some(atime), Some(mtime))
}
