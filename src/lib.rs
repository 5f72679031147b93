mod commands;
mod core;

use std::sync::Arc;
use tauri::Manager;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::core::state::AppState;

pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::install::{EventSink, GameInstaller, InstallEvent, InstallRequest};
pub use crate::core::launch::GameEnvironment;

/// Start the launcher with the given installation backend.
pub fn run(installer: Arc<dyn GameInstaller>) {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,packhorse_lib=debug")),
        )
        .init();

    tracing::info!("Packhorse launcher starting...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(move |app| {
            let state = AppState::new(installer);
            app.manage(Arc::new(Mutex::new(state)));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_vanilla_versions,
            commands::get_forge_subversions,
            commands::get_modpack_list,
            commands::get_settings,
            commands::update_settings,
            commands::launch_game,
            commands::submit_fetch_decision,
            commands::force_close_game,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
