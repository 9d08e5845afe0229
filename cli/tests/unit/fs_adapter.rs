//! `LocalFs` against a temporary directory.

use std::os::unix::fs::{MetadataExt, PermissionsExt};

use kiln_cli::application::ports::HostFs;
use kiln_cli::infra::fs::LocalFs;
use nix::unistd::Uid;
use tempfile::TempDir;

use crate::helpers::current_user;

#[test]
fn write_truncates_previous_content() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(".env");
    LocalFs.write(&path, "A=1\nB=2\nC=3\n").expect("first write");
    LocalFs.write(&path, "A=9\n").expect("second write");
    assert_eq!(LocalFs.read_to_string(&path).expect("read"), "A=9\n");
}

#[test]
fn permissions_are_applied_exactly() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("secret");
    LocalFs.write(&path, "x").expect("write");
    LocalFs.set_permissions(&path, 0o600).expect("chmod");
    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn private_write_is_restricted_from_creation() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(".env");

    LocalFs
        .write_private(&path, "API_HASH=secret\n", 0o600)
        .expect("write");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(
        LocalFs.read_to_string(&path).expect("read"),
        "API_HASH=secret\n"
    );
}

#[test]
fn private_write_replaces_a_readable_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(".env");
    LocalFs.write(&path, "OLD=1\nMANUAL=edit\n").expect("write");
    LocalFs.set_permissions(&path, 0o644).expect("chmod");

    LocalFs
        .write_private(&path, "NEW=1\n", 0o600)
        .expect("replace");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(LocalFs.read_to_string(&path).expect("read"), "NEW=1\n");
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .expect("ls")
        .map(|e| e.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(".env")]);
}

#[test]
fn recursive_owner_covers_nested_entries() {
    let dir = TempDir::new().expect("tempdir");
    let nested = dir.path().join("a/b/c");
    LocalFs.create_dir_all(&nested).expect("mkdir");
    LocalFs.write(&nested.join("file"), "x").expect("write");
    std::os::unix::fs::symlink("/nonexistent", dir.path().join("a/dangling"))
        .expect("symlink");

    LocalFs
        .set_owner(&dir.path().join("a"), &current_user(), true)
        .expect("chown");

    let uid = Uid::current().as_raw();
    for path in ["a", "a/b", "a/b/c", "a/b/c/file"] {
        let meta = std::fs::metadata(dir.path().join(path)).expect("metadata");
        assert_eq!(meta.uid(), uid, "{path}");
    }
    let link = std::fs::symlink_metadata(dir.path().join("a/dangling")).expect("lstat");
    assert_eq!(link.uid(), uid);
}

#[test]
fn unknown_owner_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let err = LocalFs
        .set_owner(dir.path(), "kiln-no-such-user-42", false)
        .expect_err("expected Err");
    assert!(format!("{err:#}").contains("kiln-no-such-user-42"));
}

#[test]
fn remove_helpers_delete_files_and_trees() {
    let dir = TempDir::new().expect("tempdir");
    let state = dir.path().join("state.json");
    let sessions = dir.path().join("sessions");
    LocalFs.write(&state, "{}").expect("write");
    LocalFs.create_dir_all(&sessions.join("nested")).expect("mkdir");

    LocalFs.remove_file(&state).expect("rm");
    LocalFs.remove_dir_all(&sessions).expect("rm -r");

    assert!(!LocalFs.exists(&state));
    assert!(!LocalFs.exists(&sessions));
}

#[test]
fn missing_file_read_names_the_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("absent");
    let err = LocalFs.read_to_string(&path).expect_err("expected Err");
    assert!(err.to_string().contains("absent"), "{err}");
}
