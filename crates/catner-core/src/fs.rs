use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CatalogResult;

/// Replaces `path` with `content` through a sibling temp file and a rename.
/// With `backup` set, an existing file is first copied to `<path>.bak`.
pub fn write_atomic(path: &Path, content: &str, backup: bool) -> CatalogResult<()> {
    let tmp_path = unique_tmp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    if backup && path.exists() {
        if let Err(err) = fs::copy(path, backup_path(path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }

    Ok(())
}

pub fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("bak")
}

fn unique_tmp_path(path: &Path) -> PathBuf {
    (0u32..)
        .map(|counter| match counter {
            0 => path.with_extension("tmp"),
            n => path.with_extension(format!("tmp{n}")),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.with_extension("tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_content_and_keeps_backup() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("catalog.xml");
        fs::write(&file_path, "<old/>").unwrap();

        write_atomic(&file_path, "<new/>", true).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "<new/>");
        assert_eq!(
            fs::read_to_string(backup_path(&file_path)).unwrap(),
            "<old/>"
        );
    }

    #[test]
    fn fresh_file_needs_no_backup() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("fresh.xml");

        write_atomic(&file_path, "<new/>", true).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "<new/>");
        assert!(!backup_path(&file_path).exists());
        assert!(!file_path.with_extension("tmp").exists());
    }
}
