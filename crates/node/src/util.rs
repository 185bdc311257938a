//! Path helpers.
use std::env;
use std::path::Path;
use std::path::PathBuf;

use crate::error::Error;
use crate::error::Result;

/// Expand a leading `~` to the home directory.
pub fn expand_home<P>(path: P) -> Result<PathBuf>
where P: AsRef<Path> {
    let path = path.as_ref();
    let Ok(stripped) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(Error::HomeDirUnavailable)?;
    Ok(home.join(stripped))
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir<P>(path: P) -> Result<()>
where P: AsRef<Path> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
