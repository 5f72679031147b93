// ─── Installer Interface ───
// The actual resolution of Java runtimes, libraries and assets is the
// installer library's job, not ours. This crate only defines the seam:
// a blocking `install` that reports through an EventSink and hands back a
// runnable environment.

use std::path::PathBuf;

use crate::core::error::LauncherResult;
use crate::core::install::events::EventSink;
use crate::core::install::pipeline::InstallVariant;
use crate::core::launch::environment::GameEnvironment;

/// Everything the installer needs for one version install.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub variant: InstallVariant,
    /// Full version id: "1.20.1" for vanilla, "1.19.2-43.2.0" for modded.
    pub version_id: String,
    /// Root of the game installation (the `.minecraft`-style folder).
    pub main_dir: PathBuf,
    /// Working directory for this launch; differs from `main_dir` for
    /// modpacks.
    pub work_dir: PathBuf,
    pub username: String,
}

/// External game-installation backend.
///
/// `install` is blocking and runs on a worker thread via `spawn_blocking`;
/// it must emit its `InstallEvent`s through the sink as work progresses.
/// Errors returned here surface as a terminal failure of the whole launch.
pub trait GameInstaller: Send + Sync {
    fn install(&self, request: &InstallRequest, events: &EventSink)
        -> LauncherResult<GameEnvironment>;
}
