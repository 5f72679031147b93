// ─── Launch Settings ───
// Persisted user preferences: identity, selected version, memory ceiling,
// install root and per-category version-cache stamps. Stored as a single
// JSON file in the launcher data directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::{LauncherError, LauncherResult};

pub const SETTINGS_FILE: &str = "settings.json";

/// Version-list caches are considered stale after one day.
const CACHE_MAX_AGE_HOURS: i64 = 24;

/// Which kind of distribution the user selected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameVariant {
    Vanilla,
    Forge,
    Modpack,
}

impl std::fmt::Display for GameVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameVariant::Vanilla => write!(f, "vanilla"),
            GameVariant::Forge => write!(f, "forge"),
            GameVariant::Modpack => write!(f, "modpack"),
        }
    }
}

/// What to do with the UI once the game process has been spawned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OnLaunch {
    /// Fire and forget.
    Nothing,
    /// Show a one-shot "game started" notice.
    SuccessNotice,
    /// Keep a live log view attached to the process.
    LogRelay,
}

/// Categories with an independently cached version list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCategory {
    Vanilla,
    Forge,
    Modpack,
}

impl VersionCategory {
    pub fn cache_file(&self) -> &'static str {
        match self {
            VersionCategory::Vanilla => "cache_vanilla_versions.json",
            VersionCategory::Forge => "cache_forge_versions.json",
            VersionCategory::Modpack => "cache_modpack_list.json",
        }
    }
}

/// Last successful refresh per version category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStamps {
    pub vanilla: Option<DateTime<Utc>>,
    pub forge: Option<DateTime<Utc>>,
    pub modpack: Option<DateTime<Utc>>,
}

impl CacheStamps {
    fn stamp(&self, category: VersionCategory) -> Option<DateTime<Utc>> {
        match category {
            VersionCategory::Vanilla => self.vanilla,
            VersionCategory::Forge => self.forge,
            VersionCategory::Modpack => self.modpack,
        }
    }

    pub fn is_fresh(&self, category: VersionCategory, now: DateTime<Utc>) -> bool {
        match self.stamp(category) {
            Some(last) => now - last < Duration::hours(CACHE_MAX_AGE_HOURS),
            None => false,
        }
    }

    pub fn touch(&mut self, category: VersionCategory, now: DateTime<Utc>) {
        match category {
            VersionCategory::Vanilla => self.vanilla = Some(now),
            VersionCategory::Forge => self.forge = Some(now),
            VersionCategory::Modpack => self.modpack = Some(now),
        }
    }
}

/// Everything needed to launch the game, persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSettings {
    pub username: String,
    pub variant: GameVariant,
    pub version: String,
    pub subversion: String,
    pub modpack: String,
    pub memory_mb: u32,
    pub root_dir: PathBuf,
    pub on_launch: OnLaunch,
    #[serde(default)]
    pub cache: CacheStamps,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            username: "Player".into(),
            variant: GameVariant::Vanilla,
            version: "1.20.1".into(),
            subversion: String::new(),
            modpack: String::new(),
            memory_mb: suggested_memory_mb(),
            root_dir: default_root_dir(),
            on_launch: OnLaunch::SuccessNotice,
            cache: CacheStamps::default(),
        }
    }
}

impl LaunchSettings {
    /// Load settings from `dir/settings.json`.
    ///
    /// A missing or corrupt file yields defaults which are written back so
    /// that the next session starts from a known state.
    pub fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Corrupt settings at {:?}: {}; regenerating", path, e);
                    let settings = Self::default();
                    let _ = settings.save(dir);
                    settings
                }
            },
            Err(_) => {
                let settings = Self::default();
                let _ = settings.save(dir);
                settings
            }
        }
    }

    pub fn save(&self, dir: &Path) -> LauncherResult<()> {
        std::fs::create_dir_all(dir).map_err(|source| LauncherError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|source| LauncherError::Io { path, source })?;
        Ok(())
    }

    /// Reject bad parameters before any worker thread is started.
    pub fn validate(&self) -> LauncherResult<()> {
        if self.username.trim().is_empty() {
            return Err(LauncherError::InvalidParams("username is empty".into()));
        }
        if !self.root_dir.is_dir() {
            return Err(LauncherError::InvalidParams(format!(
                "install directory {:?} does not exist",
                self.root_dir
            )));
        }
        if self.memory_mb < 512 {
            return Err(LauncherError::InvalidParams(format!(
                "memory ceiling {} MB is below the 512 MB minimum",
                self.memory_mb
            )));
        }
        match self.variant {
            GameVariant::Modpack if self.modpack.trim().is_empty() => Err(
                LauncherError::InvalidParams("no modpack selected".into()),
            ),
            GameVariant::Forge if self.subversion.trim().is_empty() => Err(
                LauncherError::InvalidParams("no forge subversion selected".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Default game root, a `.minecraft`-style folder under the user data dir.
pub fn default_root_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Packhorse")
        .join("game")
}

/// Quarter of physical RAM, clamped to a sensible JVM heap range.
pub fn suggested_memory_mb() -> u32 {
    let mut system = sysinfo::System::new();
    system.refresh_memory();
    let total_mb = (system.total_memory() / 1024 / 1024) as u32;
    (total_mb / 4).clamp(2048, 8192)
}
