// ─── Application State ───
// Everything the command layer shares across invocations: the launcher
// data directory, the HTTP client, persisted settings, the injected
// installer backend and the bookkeeping for an in-flight launch.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::oneshot;

use crate::core::http::build_http_client;
use crate::core::install::GameInstaller;
use crate::core::modpack::Decision;
use crate::core::settings::LaunchSettings;

const APP_DIR_NAME: &str = "Packhorse";

/// GitHub organization whose repositories are the published modpacks.
pub const PACK_ORG: &str = "PackhorseModpacks";

pub struct AppState {
    pub data_dir: PathBuf,
    pub http_client: Client,
    pub settings: LaunchSettings,
    pub installer: Arc<dyn GameInstaller>,
    /// Answer slot for the failed-downloads dialog. Present only while a
    /// launch is suspended waiting for the user; dropping it means Abort.
    pub pending_decision: Option<oneshot::Sender<Decision>>,
    /// Pid of the running game process, if one was spawned.
    pub running_game: Option<u32>,
}

impl AppState {
    pub fn new(installer: Arc<dyn GameInstaller>) -> Self {
        let data_dir = default_data_dir();
        let settings = LaunchSettings::load_or_default(&data_dir);

        Self {
            data_dir,
            http_client: build_http_client().expect("Failed to build HTTP client"),
            settings,
            installer,
            pending_decision: None,
            running_game: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME);

    if !dir.exists() {
        let _ = std::fs::create_dir_all(&dir);
    }

    dir
}
