// ─── Manifest Store ───
// Reads the two files every modpack repository must carry:
//   mods/modlist.json   — map of mod filename → download URL
//   modpack_info.json   — engine version + forge subversion pair

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

pub const MODLIST_FILE: &str = "mods/modlist.json";
pub const DESCRIPTOR_FILE: &str = "modpack_info.json";

/// Declarative mapping of required mod file → source URL for one pack
/// version. Immutable snapshot; superseded by the next repository sync.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModManifest {
    entries: BTreeMap<String, String>,
}

impl ModManifest {
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Read the manifest from a synced repository checkout.
    pub fn load(repo_dir: &Path) -> LauncherResult<Self> {
        let path = repo_dir.join(MODLIST_FILE);
        let raw = std::fs::read_to_string(&path).map_err(|source| LauncherError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read the manifest that MUST exist after a successful sync.
    ///
    /// A manifest that parses but lists nothing is a distinguished failure:
    /// treating it as "zero artifacts required" would wipe a valid install
    /// on the next reconciliation.
    pub fn load_required(repo_dir: &Path) -> LauncherResult<Self> {
        let manifest = Self::load(repo_dir)?;
        if manifest.is_empty() {
            return Err(LauncherError::EmptyManifest {
                path: repo_dir.join(MODLIST_FILE),
            });
        }
        Ok(manifest)
    }

    /// Read the previously recorded manifest, tolerating absence and
    /// corruption. First launches have no manifest yet, and a broken one
    /// will be rebuilt by the repository sync either way.
    pub fn load_previous(repo_dir: &Path) -> Self {
        match Self::load(repo_dir) {
            Ok(manifest) => manifest,
            Err(LauncherError::Json(e)) => {
                warn!(
                    "Previous manifest in {:?} is corrupt ({}); treating as empty",
                    repo_dir, e
                );
                Self::default()
            }
            Err(_) => Self::default(),
        }
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn source(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for ModManifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Engine version + forge subversion a pack is pinned to.
///
/// Overrides the user's selected version for the duration of one launch;
/// never written back to the persisted settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackDescriptor {
    pub version: String,
    pub subversion: String,
}

impl PackDescriptor {
    pub fn load(repo_dir: &Path) -> LauncherResult<Self> {
        let path = repo_dir.join(DESCRIPTOR_FILE);
        let raw = std::fs::read_to_string(&path)
            .map_err(|e| LauncherError::Descriptor(format!("{:?}: {}", path, e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| LauncherError::Descriptor(format!("{:?}: {}", path, e)))
    }

    pub fn full_version(&self) -> String {
        format!("{}-{}", self.version, self.subversion)
    }
}

/// Location of one modpack's repository checkout under the game root.
pub fn pack_dir(root_dir: &Path, pack_name: &str) -> PathBuf {
    root_dir.join("modpacks").join(pack_name)
}
