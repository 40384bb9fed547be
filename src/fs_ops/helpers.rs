//! I/O error formatting.
//!
//! Turns an io::Error into a short human-readable message with the path and a
//! hint for the errno values an operator is most likely to hit. Messages end up
//! in a bounded result string, so hints stay terse.

use std::io;
use std::path::Path;

fn hint_for(e: &io::Error) -> Option<&'static str> {
    if let Some(code) = e.raw_os_error() {
        return match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and mode"),
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
            libc::EBUSY => Some("resource busy"),
            libc::ENOENT => Some("path not found"),
            libc::EEXIST => Some("already exists"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem"),
            libc::ELOOP => Some("too many symbolic link levels"),
            libc::ENAMETOOLONG => Some("path too long"),
            libc::EMFILE | libc::ENFILE => Some("file descriptor limit reached"),
            _ => None,
        };
    }
    match e.kind() {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and mode"),
        io::ErrorKind::NotFound => Some("path not found"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        _ => None,
    }
}

/// `'<path>': <error>[; <hint>]`
pub fn describe_io(path: &Path, e: &io::Error) -> String {
    let mut msg = format!("'{}': {}", path.display(), e);
    if let Some(hint) = hint_for(e) {
        msg.push_str("; ");
        msg.push_str(hint);
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notfound_hint_includes_path() {
        let p = Path::new("/nonexistent/t#P#p0.ibd");
        let msg = describe_io(p, &io::Error::from(io::ErrorKind::NotFound));
        assert!(msg.contains("/nonexistent/t#P#p0.ibd"));
        assert!(msg.contains("path not found"));
    }

    #[test]
    fn enospc_hint_present() {
        let msg = describe_io(Path::new("/tmp"), &io::Error::from_raw_os_error(libc::ENOSPC));
        assert!(msg.contains("insufficient space"), "msg was: {msg}");
    }

    #[test]
    fn exdev_hint_present() {
        let msg = describe_io(Path::new("/tmp"), &io::Error::from_raw_os_error(libc::EXDEV));
        assert!(msg.contains("cross-filesystem"), "msg was: {msg}");
    }

    #[test]
    fn unknown_error_has_no_hint() {
        let msg = describe_io(Path::new("/tmp"), &io::Error::other("boom"));
        assert_eq!(msg, "'/tmp': boom");
    }
}
