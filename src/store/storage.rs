use super::types::{CampState, STORE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default store file path (~/.config/camp-olympics/camp.json)
pub fn get_store_path() -> PathBuf {
    crate::config::get_config_dir().join("camp.json")
}

/// Load the camp store from a JSON file
///
/// If the file doesn't exist, returns a new empty store.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_state(path: &Path) -> Result<CampState> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Store file missing, starting empty");
        return Ok(CampState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open store file at {}", path.display()))?;

    let state: CampState = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load store from {}", path.display()))?;

    if state.version != STORE_VERSION {
        anyhow::bail!("Unsupported store version: {}", state.version);
    }

    tracing::debug!(
        path = %path.display(),
        children = state.children.len(),
        disciplines = state.disciplines.len(),
        measurements = state.measurements.len(),
        "Loaded store"
    );

    Ok(state)
}

/// Save the camp store to a JSON file atomically
///
/// The file is never left half-written. Creates the parent directory if it
/// doesn't exist.
pub fn save_state(path: &Path, state: &CampState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create store directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize store")?;

    file.commit().context("Failed to save store")?;

    tracing::debug!(path = %path.display(), "Saved store");
    Ok(())
}
