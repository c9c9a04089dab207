//! Application configuration.
//!
//! The only external setting is the database location: `CRMDESK_DB_PATH`
//! overrides the default of `~/.crmdesk/crmdesk.db`. Everything else is
//! compiled in.

use std::path::PathBuf;

use crate::db::DbError;

pub const APP_NAME: &str = "CrmDesk";

/// Environment variable that overrides the database path.
pub const DB_PATH_ENV: &str = "CRMDESK_DB_PATH";

/// Resolve the database path: `$CRMDESK_DB_PATH`, else `~/.crmdesk/crmdesk.db`.
pub fn db_path() -> Result<PathBuf, DbError> {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }
    let home = dirs::home_dir().ok_or(DbError::HomeDirNotFound)?;
    Ok(home.join(".crmdesk").join("crmdesk.db"))
}
