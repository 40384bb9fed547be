#![cfg(unix)]
use std::fs;
use std::io;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use move_partition::fs_ops::{
    ensure_destination_directory, ensure_destination_free, ensure_source_in_place,
    move_partition_file_with,
};
use move_partition::RelocateError;

fn exdev(_: &Path, _: &Path) -> io::Result<()> {
    Err(io::Error::from_raw_os_error(libc::EXDEV))
}

fn running_as_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[test]
fn source_checks() {
    let td = TempDir::new().unwrap();
    let file = td.child("t#P#p0.ibd");
    file.write_binary(b"pages").unwrap();
    ensure_source_in_place(file.path()).unwrap();

    let link = td.child("t#P#p1.ibd");
    symlink(file.path(), link.path()).unwrap();
    let err = ensure_source_in_place(link.path()).unwrap_err();
    assert!(matches!(err, RelocateError::SourceAlreadyRelocated(_)));

    let dir = td.child("t#P#p2.ibd");
    dir.create_dir_all().unwrap();
    assert!(ensure_source_in_place(dir.path()).is_err());
}

#[test]
fn dangling_link_at_destination_counts_as_taken() {
    let td = TempDir::new().unwrap();
    let dest = td.child("t#P#p0.ibd");
    ensure_destination_free(dest.path()).unwrap();

    symlink(td.path().join("gone"), dest.path()).unwrap();
    let err = ensure_destination_free(dest.path()).unwrap_err();
    assert!(matches!(err, RelocateError::DestinationExists(_)));
}

#[test]
fn destination_directory_rules() {
    let td = TempDir::new().unwrap();
    let dir = td.child("shop");
    ensure_destination_directory(dir.path()).unwrap();
    assert!(dir.path().is_dir());
    // already there is fine
    ensure_destination_directory(dir.path()).unwrap();

    let blocker = td.child("blocked");
    blocker.touch().unwrap();
    let err = ensure_destination_directory(blocker.path()).unwrap_err();
    assert!(err.to_string().starts_with("Error creating destination directory"), "{err}");
}

#[test]
fn copy_is_dropped_when_source_cannot_be_removed() {
    if running_as_root() {
        eprintln!("skipping: running as root");
        return;
    }
    let td = TempDir::new().unwrap();
    let src_dir = td.child("data");
    src_dir.create_dir_all().unwrap();
    let src = src_dir.child("t#P#p0.ibd");
    src.write_binary(b"pages").unwrap();
    let dst = td.child("t#P#p0.ibd");

    fs::set_permissions(src_dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
    let res = move_partition_file_with(src.path(), dst.path(), exdev);
    fs::set_permissions(src_dir.path(), fs::Permissions::from_mode(0o755)).unwrap();

    let err = res.unwrap_err();
    assert!(err.to_string().starts_with("Error removing source"), "{err}");
    assert!(src.path().is_file());
    assert!(!dst.path().exists());
}
