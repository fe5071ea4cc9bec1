use std::path::Path;
use std::time::Duration;

use crate::constants::SQLITE_BUSY_TIMEOUT_MS;
use crate::{ProbeError, ProbeResult};
use rusqlite::{Connection, OpenFlags};

/// Open the chunk store read-only.
///
/// The store is owned by the indexer: never create it, never write to it.
/// A missing file is reported as `StoreNotFound` instead of letting SQLite
/// fail later with a less useful message.
pub fn open_read_only(path: &Path) -> ProbeResult<Connection> {
    if !path.is_file() {
        return Err(ProbeError::StoreNotFound(path.to_path_buf()));
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| ProbeError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "Database connection opened (read-only)");

    configure_read_only(&conn)?;
    Ok(conn)
}

/// Pragmas for a reader sharing the file with a live indexer:
/// - busy_timeout = SQLITE_BUSY_TIMEOUT_MS (constants.rs)
/// - query_only = ON
fn configure_read_only(conn: &Connection) -> ProbeResult<()> {
    conn.busy_timeout(Duration::from_millis(u64::from(SQLITE_BUSY_TIMEOUT_MS)))
        .map_err(|e| ProbeError::Storage(format!("Failed to set busy timeout: {}", e)))?;
    conn.pragma_update(None, "query_only", true)
        .map_err(|e| ProbeError::Storage(format!("Failed to configure pragmas: {}", e)))?;
    Ok(())
}
