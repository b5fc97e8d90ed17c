use super::render;
use crate::error::{Error, Result};
use crate::topology::Topology;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the staged definition inside its temp directory.
pub const COMPOSE_FILE_NAME: &str = "docker-compose.yml";

const STAGING_DIR_PREFIX: &str = "docker-compose-";

/// Write `content` to `docker-compose.yml` inside a fresh, uniquely named
/// temp directory and return the file's path.
///
/// The directory outlives this call; remove it with [`cleanup`].
pub fn stage(content: &str) -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(STAGING_DIR_PREFIX)
        .tempdir()
        .map_err(|e| Error::staging("create temp directory", e))?
        .keep();

    let path = dir.join(COMPOSE_FILE_NAME);
    if let Err(e) = fs::write(&path, content) {
        let _ = fs::remove_dir_all(&dir);
        return Err(Error::staging("write compose file", e));
    }

    tracing::debug!(path = %path.display(), "Staged compose file");
    Ok(path)
}

/// Render `topology` and stage the result.
pub fn stage_topology(topology: &Topology) -> Result<PathBuf> {
    stage(&render(topology))
}

/// Remove the directory containing a staged compose file.
///
/// Idempotent: a path that is already gone is not an error.
pub fn cleanup(compose_file: &Path) -> Result<()> {
    let Some(dir) = compose_file.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::staging(
            format!("remove staging directory {}", dir.display()),
            e,
        )),
    }
}
