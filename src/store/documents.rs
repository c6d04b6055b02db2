use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Result};

/// Read a JSON document. A missing file is the empty document.
pub fn load_document<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} does not exist yet, starting empty", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(AppError::Storage {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&content).map_err(|source| AppError::Document {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a JSON document through a temporary sibling file so readers never
/// see a half-written document.
pub fn save_document<T: Serialize>(path: &Path, document: &T) -> Result<()> {
    let storage = |source: io::Error| AppError::Storage {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(storage)?;
    }

    let content = serde_json::to_string_pretty(document)?;
    let temp = temp_path(path);
    std::fs::write(&temp, content).map_err(storage)?;
    std::fs::rename(&temp, path).map_err(storage)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
