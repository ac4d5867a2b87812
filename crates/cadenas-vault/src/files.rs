//! Atomic file writes for the key and PIN records.
//!
//! A crash mid-write must never leave a half-written key or PIN file, so
//! every save goes through write-temp-then-rename. Files carry owner-only
//! permissions on Unix.

use std::fs;
use std::path::Path;

/// Write `contents` to `path` atomically: write a sibling `.tmp` file,
/// restrict its permissions, then rename over the destination.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let file_name = path.file_name().map_or_else(
        || String::from(".cadenas.tmp"),
        |name| format!(".{}.tmp", name.to_string_lossy()),
    );
    let tmp = path.with_file_name(file_name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("record");
        write_atomic(&path, b"payload").expect("write should succeed");
        assert_eq!(fs::read(&path).expect("read"), b"payload");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("record");
        write_atomic(&path, b"old").expect("write should succeed");
        write_atomic(&path, b"new").expect("write should succeed");
        assert_eq!(fs::read(&path).expect("read"), b"new");
    }

    #[test]
    fn leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("record");
        write_atomic(&path, b"payload").expect("write should succeed");
        assert!(!dir.path().join(".record.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/deeper/record");
        write_atomic(&path, b"payload").expect("write should succeed");
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("record");
        write_atomic(&path, b"payload").expect("write should succeed");
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
