//! On-disk layout for the core's data directory (§6):
//!
//! ```text
//! <data_dir>/octave-data/
//!   conversations.db
//!   memory.db
//!   backups/
//!   migration.log.json
//! ```
//!
//! A pre-existing `<data_dir>/circuit-data/` directory (the product's
//! previous on-disk name) is copied, never moved, into this layout on first
//! open if the target does not yet exist. The old directory is left in
//! place for an administrator to remove later.

use std::path::{Path, PathBuf};

use octave_error::Error;

const CURRENT_DIR_NAME: &str = "octave-data";
const LEGACY_DIR_NAME: &str = "circuit-data";

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into().join(CURRENT_DIR_NAME),
        }
    }

    pub fn conversations_db(&self) -> PathBuf {
        self.root.join("conversations.db")
    }

    pub fn memory_db(&self) -> PathBuf {
        self.root.join("memory.db")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn migration_log(&self) -> PathBuf {
        self.root.join("migration.log.json")
    }

    /// Creates `root` and `backups/` if absent, then copies a sibling
    /// `circuit-data/` directory into `root` if `root` was just created and
    /// the legacy directory exists. Idempotent: a `root` that already
    /// existed (even empty) is never touched by the legacy copy.
    pub fn ensure_initialized(data_dir: &Path) -> Result<Self, Error> {
        let paths = Self::new(data_dir);
        let root_existed = paths.root.exists();

        std::fs::create_dir_all(&paths.root).map_err(|e| Error::StorageInit {
            message: format!("failed to create data dir {}: {e}", paths.root.display()),
        })?;
        std::fs::create_dir_all(paths.backups_dir()).map_err(|e| Error::StorageInit {
            message: format!("failed to create backups dir: {e}"),
        })?;

        if !root_existed {
            let legacy = data_dir.join(LEGACY_DIR_NAME);
            if legacy.exists() {
                copy_dir_recursive(&legacy, &paths.root).map_err(|e| Error::StorageInit {
                    message: format!(
                        "failed to migrate legacy data dir {}: {e}",
                        legacy.display()
                    ),
                })?;
                tracing::info!(
                    from = %legacy.display(),
                    to = %paths.root.display(),
                    "copied legacy circuit-data directory into octave-data"
                );
            }
        }

        Ok(paths)
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else if file_type.is_file() {
            std::fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "paths.test.rs"]
mod tests;
