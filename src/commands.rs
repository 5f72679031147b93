use std::sync::Arc;

use async_trait::async_trait;
use tauri::Emitter;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info, warn};

use crate::core::downloader::Downloader;
use crate::core::error::LauncherError;
use crate::core::launch::{self, LaunchDeps, LaunchEvent, LogRecord};
use crate::core::modpack::{Decision, FailureMediator};
use crate::core::settings::{LaunchSettings, OnLaunch};
use crate::core::state::{AppState, PACK_ORG};
use crate::core::version;

// ─── Event Channels to the Frontend ───

fn emit_launch_event(app_handle: &tauri::AppHandle, event: &LaunchEvent) {
    let _ = app_handle.emit("launch-event", event);
}

fn emit_game_log(app_handle: &tauri::AppHandle, record: &LogRecord) {
    let _ = app_handle.emit("game-log", record);
}

/// Mediator that turns failed downloads into a frontend dialog.
///
/// Emits the failed file list, parks a one-shot answer slot in the shared
/// state and suspends until `submit_fetch_decision` fills it. A dismissed
/// dialog (or a replaced slot) drops the sender, which reads as Abort.
struct FrontendMediator {
    app_handle: tauri::AppHandle,
    state: Arc<Mutex<AppState>>,
}

#[async_trait]
impl FailureMediator for FrontendMediator {
    async fn mediate(&self, failed: &[String]) -> Decision {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().await;
            state.pending_decision = Some(tx);
        }
        let _ = self.app_handle.emit("modpack-fetch-failed", failed);

        match rx.await {
            Ok(decision) => decision,
            Err(_) => {
                warn!("Fetch-failure dialog dismissed; aborting sync");
                Decision::Abort
            }
        }
    }
}

// ─── Version Pickers ───

#[tauri::command]
pub async fn get_vanilla_versions(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
) -> Result<Vec<String>, LauncherError> {
    let mut state = state.lock().await;
    let client = state.http_client.clone();
    let data_dir = state.data_dir.clone();
    let ids = version::vanilla_release_ids(&client, &data_dir, &mut state.settings.cache).await?;
    state.settings.save(&data_dir)?;
    Ok(ids)
}

#[tauri::command]
pub async fn get_forge_subversions(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
    version: String,
) -> Result<Vec<String>, LauncherError> {
    let mut state = state.lock().await;
    let client = state.http_client.clone();
    let data_dir = state.data_dir.clone();
    let subs =
        version::forge_subversions(&client, &data_dir, &mut state.settings.cache, &version).await?;
    state.settings.save(&data_dir)?;
    Ok(subs)
}

#[tauri::command]
pub async fn get_modpack_list(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
) -> Result<Vec<String>, LauncherError> {
    let mut state = state.lock().await;
    let client = state.http_client.clone();
    let data_dir = state.data_dir.clone();
    let names =
        version::modpack_names(&client, &data_dir, &mut state.settings.cache, PACK_ORG).await?;
    state.settings.save(&data_dir)?;
    Ok(names)
}

// ─── Settings ───

#[tauri::command]
pub async fn get_settings(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
) -> Result<LaunchSettings, LauncherError> {
    let state = state.lock().await;
    Ok(state.settings.clone())
}

#[tauri::command]
pub async fn update_settings(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
    settings: LaunchSettings,
) -> Result<(), LauncherError> {
    let mut state = state.lock().await;
    // Cache stamps are launcher bookkeeping, not a user preference.
    let cache = state.settings.cache.clone();
    state.settings = LaunchSettings { cache, ..settings };
    state.settings.save(&state.data_dir)?;
    info!("Settings updated");
    Ok(())
}

// ─── Launch ───

#[tauri::command]
pub async fn launch_game(
    app_handle: tauri::AppHandle,
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
) -> Result<(), LauncherError> {
    let state_arc = state.inner().clone();

    let (settings, deps) = {
        let state = state_arc.lock().await;
        let deps = LaunchDeps {
            installer: state.installer.clone(),
            fetcher: Arc::new(Downloader::new(state.http_client.clone())),
            mediator: Arc::new(FrontendMediator {
                app_handle: app_handle.clone(),
                state: state_arc.clone(),
            }),
            pack_repo_base: launch::DEFAULT_PACK_REPO_BASE.into(),
        };
        (state.settings.clone(), deps)
    };

    // Forward launch events to the window for the lifetime of the attempt.
    let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
    let forwarder_handle = app_handle.clone();
    tauri::async_runtime::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            emit_launch_event(&forwarder_handle, &event);
        }
    });

    let environment = match launch::build_environment(&settings, &deps, &events_tx).await {
        Ok(environment) => environment,
        Err(err) => {
            error!("Launch preparation failed: {}", err);
            let _ = events_tx.send(LaunchEvent::error(err.to_string()));
            return Err(err);
        }
    };

    let mut child = match environment.run() {
        Ok(child) => child,
        Err(err) => {
            error!("Game process failed to start: {}", err);
            let _ = events_tx.send(LaunchEvent::error(err.to_string()));
            return Err(err);
        }
    };

    let pid = child.id();
    {
        let mut state = state_arc.lock().await;
        state.running_game = Some(pid);
    }
    info!("Game running (PID {})", pid);

    match settings.on_launch {
        OnLaunch::Nothing => {}
        OnLaunch::SuccessNotice => {
            let _ = events_tx.send(LaunchEvent::success(format!("Game started (PID {pid})")));
        }
        OnLaunch::LogRelay => {
            let (log_tx, mut log_rx) = tokio::sync::mpsc::unbounded_channel();

            if let Some(stdout) = child.stdout.take() {
                let log_tx = log_tx.clone();
                tauri::async_runtime::spawn(async move {
                    let _ = tauri::async_runtime::spawn_blocking(move || {
                        launch::relay_lines(stdout, &log_tx);
                    })
                    .await;
                });
            }
            if let Some(stderr) = child.stderr.take() {
                tauri::async_runtime::spawn(async move {
                    let _ = tauri::async_runtime::spawn_blocking(move || {
                        launch::relay_lines(stderr, &log_tx);
                    })
                    .await;
                });
            }

            let log_handle = app_handle.clone();
            tauri::async_runtime::spawn(async move {
                while let Some(record) = log_rx.recv().await {
                    emit_game_log(&log_handle, &record);
                }
            });
        }
    }

    // Watch for exit regardless of strategy so the pid slot is cleared.
    tauri::async_runtime::spawn(async move {
        let wait_result = tauri::async_runtime::spawn_blocking(move || child.wait()).await;

        let mut state = state_arc.lock().await;
        state.running_game = None;
        drop(state);

        match wait_result {
            Ok(Ok(status)) if status.success() => {
                info!("Game process {} exited cleanly", pid);
                let _ = events_tx.send(LaunchEvent::success(String::from("Game exited")));
            }
            Ok(Ok(status)) => {
                warn!("Game process {} exited with {:?}", pid, status.code());
                let _ = events_tx.send(LaunchEvent::error(format!(
                    "Game exited with status {:?}",
                    status.code()
                )));
            }
            Ok(Err(err)) => error!("Cannot wait on game process {}: {}", pid, err),
            Err(err) => error!("Exit watcher for {} failed: {}", pid, err),
        }
    });

    Ok(())
}

#[tauri::command]
pub async fn submit_fetch_decision(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
    decision: Decision,
) -> Result<(), LauncherError> {
    let mut state = state.lock().await;
    match state.pending_decision.take() {
        Some(tx) => {
            info!("Fetch-failure decision: {:?}", decision);
            // A closed receiver means the sync already gave up; nothing to do.
            let _ = tx.send(decision);
            Ok(())
        }
        None => Err(LauncherError::Other(
            "no fetch-failure decision is pending".into(),
        )),
    }
}

#[tauri::command]
pub async fn force_close_game(
    state: tauri::State<'_, Arc<Mutex<AppState>>>,
) -> Result<(), LauncherError> {
    let mut state = state.lock().await;
    match state.running_game.take() {
        Some(pid) => kill_process(pid),
        None => Err(LauncherError::Process("no game is running".into())),
    }
}

fn kill_process(pid: u32) -> Result<(), LauncherError> {
    let target = sysinfo::Pid::from_u32(pid);
    let mut system = sysinfo::System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[target]));

    match system.process(target) {
        Some(process) => {
            process.kill();
            info!("Killed game process {}", pid);
            Ok(())
        }
        None => Err(LauncherError::Process(format!(
            "process {pid} is not running"
        ))),
    }
}
