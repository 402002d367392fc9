//! Output directory preparation.

use std::path::Path;

use tracing::warn;

use crate::{OutputError, OutputResult};

/// Make sure `dir` exists and is empty.
///
/// A non-empty directory is an error unless `overwrite` is set, in which case
/// its contents are deleted.
pub fn prepare_directory(dir: &Path, overwrite: bool) -> OutputResult<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
        return Ok(());
    }

    let mut entries = std::fs::read_dir(dir)?.peekable();
    if entries.peek().is_none() {
        return Ok(());
    }
    if !overwrite {
        return Err(OutputError::DirectoryNotEmpty(dir.to_path_buf()));
    }

    warn!("Deleting existing contents of {}", dir.display());
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("out");
        prepare_directory(&dir, false).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_non_empty_requires_overwrite() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("old.csv"), "x").unwrap();
        std::fs::create_dir(root.path().join("sub")).unwrap();

        assert!(matches!(
            prepare_directory(root.path(), false),
            Err(OutputError::DirectoryNotEmpty(_))
        ));

        prepare_directory(root.path(), true).unwrap();
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
