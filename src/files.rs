use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| CoreError::io(path, err))
}

/// Write `contents` to `path` through a sibling temp file and a rename, so a
/// failed save never leaves a truncated file behind.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| CoreError::io(parent, err))?;
    }

    let tmp_path = temp_sibling(path);
    if let Err(err) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(CoreError::io(path, err));
    }
    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        CoreError::io(path, err)
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        write_text(&path, "안녕").unwrap();
        write_text(&path, "다시").unwrap();

        assert_eq!(read_text(&path).unwrap(), "다시");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_text(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
