use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Open (creating if needed) the SQLite file an export writes into.
pub fn open_export_target(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| CoreError::io(parent, err))?;
    }

    debug!(path = %path.display(), "opening export target");
    Ok(Connection::open(path)?)
}

/// Open an existing SQLite file for reading. A missing file is reported as
/// [`CoreError::NotFound`] instead of silently creating an empty database.
pub fn open_import_source(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        return Err(CoreError::NotFound(path.to_path_buf()));
    }

    debug!(path = %path.display(), "opening import source");
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}
