//! Installs the bundled read-only databases into the writable data
//! directory.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::DbError;

fn asset_error(path: &Path, e: io::Error) -> DbError {
    DbError::Asset {
        cause: format!("{}: {}", path.display(), e),
    }
}

/// Copies `file_name` from `asset_dir` into `data_dir` unless a copy is
/// already there, and returns the installed path. An existing copy is never
/// overwritten.
pub fn install(asset_dir: &Path, data_dir: &Path, file_name: &str) -> Result<PathBuf, DbError> {
    let target = data_dir.join(file_name);
    if target.exists() {
        debug!("{} already installed", target.display());
        return Ok(target);
    }

    let source = asset_dir.join(file_name);
    fs::create_dir_all(data_dir).map_err(|e| asset_error(data_dir, e))?;

    // Copy next to the target first so an interrupted copy never looks
    // like an installed database.
    let partial = data_dir.join(format!("{file_name}.partial"));
    fs::copy(&source, &partial).map_err(|e| asset_error(&source, e))?;
    fs::rename(&partial, &target).map_err(|e| asset_error(&target, e))?;

    info!("Installed {} into {}", file_name, data_dir.display());
    Ok(target)
}
