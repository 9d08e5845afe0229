//! Filesystem infrastructure: implements `HostFs` on the local machine.

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::{Context, Result};
use nix::unistd::User;

use crate::application::ports::HostFs;

/// Production filesystem implementation of `HostFs`.
pub struct LocalFs;

/// Numeric owner and primary group of `user`.
///
/// # Errors
///
/// Returns an error if the account database lookup fails or the user does
/// not exist.
pub fn resolve_user(user: &str) -> Result<(u32, u32)> {
    let account = User::from_name(user)
        .with_context(|| format!("looking up user {user}"))?
        .with_context(|| format!("user {user} does not exist"))?;
    Ok((account.uid.as_raw(), account.gid.as_raw()))
}

/// Change ownership of `path` and, for directories, everything below it.
///
/// Symlinks are re-owned themselves and never followed.
fn chown_tree(path: &Path, uid: u32, gid: u32) -> Result<()> {
    let meta = std::fs::symlink_metadata(path)
        .with_context(|| format!("reading metadata of {}", path.display()))?;
    if meta.file_type().is_symlink() {
        return std::os::unix::fs::lchown(path, Some(uid), Some(gid))
            .with_context(|| format!("changing owner of {}", path.display()));
    }
    std::os::unix::fs::chown(path, Some(uid), Some(gid))
        .with_context(|| format!("changing owner of {}", path.display()))?;
    if meta.is_dir() {
        for entry in std::fs::read_dir(path)
            .with_context(|| format!("listing {}", path.display()))?
        {
            let entry = entry.with_context(|| format!("listing {}", path.display()))?;
            chown_tree(&entry.path(), uid, gid)?;
        }
    }
    Ok(())
}

impl HostFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("removing directory {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).with_context(|| format!("writing file {}", path.display()))
    }

    fn write_private(&self, path: &Path, content: &str, mode: u32) -> Result<()> {
        let dir = path
            .parent()
            .with_context(|| format!("{} has no parent directory", path.display()))?;
        let mut file = tempfile::Builder::new()
            .prefix(".kiln-")
            .permissions(std::fs::Permissions::from_mode(mode))
            .tempfile_in(dir)
            .with_context(|| format!("creating temporary file in {}", dir.display()))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .with_context(|| format!("writing file {}", path.display()))?;
        file.persist(path)
            .with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .with_context(|| format!("setting permissions on {}", path.display()))
    }

    fn set_owner(&self, path: &Path, user: &str, recursive: bool) -> Result<()> {
        let (uid, gid) = resolve_user(user)?;
        tracing::debug!(path = %path.display(), user, recursive, "changing owner");
        if recursive {
            chown_tree(path, uid, gid)
        } else {
            std::os::unix::fs::chown(path, Some(uid), Some(gid))
                .with_context(|| format!("changing owner of {}", path.display()))
        }
    }
}
