// ─── Local Inventory Scanner ───

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::core::error::{LauncherError, LauncherResult};

/// Enumerate the plain files currently present in a mods directory.
///
/// Volatile by nature: the user may add or delete mods between launches,
/// so this runs again before every reconciliation. A missing directory is
/// an empty inventory (first install), not an error.
pub fn scan_mods(mods_dir: &Path) -> LauncherResult<BTreeSet<String>> {
    let entries = match std::fs::read_dir(mods_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
        Err(source) => {
            return Err(LauncherError::Io {
                path: mods_dir.to_path_buf(),
                source,
            })
        }
    };

    let mut inventory = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| LauncherError::Io {
            path: mods_dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            inventory.insert(entry.file_name().to_string_lossy().to_string());
        }
    }
    Ok(inventory)
}

/// Delete the files a reconciliation marked as stale.
pub fn remove_stale(mods_dir: &Path, to_remove: &BTreeSet<String>) -> LauncherResult<()> {
    for name in to_remove {
        let path = mods_dir.join(name);
        info!("Removing deprecated mod {:?}", path);
        std::fs::remove_file(&path).map_err(|source| LauncherError::Io { path, source })?;
    }
    Ok(())
}
