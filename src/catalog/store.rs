//! JSON persistence for the movie collection.
//!
//! The file is an object keyed by the decimal rank, pretty-printed with
//! two-space indentation and raw UTF-8. Writes go to a temporary sibling file
//! first and are renamed into place, so an interrupted save leaves the
//! previous file intact.
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use super::types::Movies;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid movie data: {0}")]
    Json(#[from] serde_json::Error),
}

impl PersistError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

pub(crate) fn write_movies(path: &Path, movies: &Movies) -> Result<(), PersistError> {
    let mut json = serde_json::to_string_pretty(movies)?;
    json.push('\n');

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PersistError::io(parent, e))?;
    }

    let temp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    let result = write_then_rename(&temp_path, path, json.as_bytes());
    if result.is_err() {
        let _ = std::fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let mut file = std::fs::File::create(temp_path).map_err(|e| PersistError::io(temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| PersistError::io(temp_path, e))?;
    file.sync_all().map_err(|e| PersistError::io(temp_path, e))?;
    drop(file);

    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| PersistError::io(path, e))?;
    }

    std::fs::rename(temp_path, path).map_err(|e| PersistError::io(path, e))
}

/// Reads a saved collection. `Ok(None)` means the file does not exist.
///
/// Ranks come from the object keys. A record whose own `rank` disagrees with
/// its key is corrected to the key.
pub(crate) fn read_movies(path: &Path) -> Result<Option<Movies>, PersistError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PersistError::io(path, e)),
    };

    let mut movies: Movies = serde_json::from_str(&content)?;
    for (rank, record) in movies.iter_mut() {
        if record.rank != *rank {
            tracing::warn!(
                key = *rank,
                rank = record.rank,
                "Record rank disagrees with its key, using the key"
            );
            record.rank = *rank;
        }
    }
    Ok(Some(movies))
}
