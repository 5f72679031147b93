// ─── Launch Orchestration ───
// Turns persisted settings into a running game: resolve what to install,
// synchronize the modpack when one is selected, supervise the installer,
// then apply runtime parameters to the resulting environment.

pub mod environment;
pub mod logs;

pub use environment::{GameEnvironment, RuntimeParams};
pub use logs::{parse_log_line, relay_lines, LogRecord};

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use crate::core::downloader::ModFetcher;
use crate::core::error::LauncherResult;
use crate::core::install::{
    run_pipeline, GameInstaller, InstallRequest, InstallVariant, PipelineSignal,
};
use crate::core::manifest::store::pack_dir;
use crate::core::modpack::{synchronize, FailureMediator};
use crate::core::settings::{GameVariant, LaunchSettings};

/// Organization hosting one repository per published modpack.
pub const DEFAULT_PACK_REPO_BASE: &str = "https://github.com/PackhorseModpacks";

/// Everything the frontend may want to hear about during a launch.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchEvent {
    Status {
        state: String,
        message: String,
    },
    FetchProgress {
        completed: usize,
        total: usize,
        file: String,
    },
    FetchFailed {
        failed: Vec<String>,
    },
    TaskCompleted {
        index: usize,
        label: String,
    },
    InstallDownloadStarted {
        entries_count: usize,
    },
    InstallDownloadProgress {
        count: usize,
        speed: f64,
    },
    PipelineFinished,
}

impl LaunchEvent {
    pub fn working(message: impl Into<String>) -> Self {
        Self::Status {
            state: "working".into(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Status {
            state: "success".into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Status {
            state: "error".into(),
            message: message.into(),
        }
    }
}

/// Collaborators a launch needs, injected by the caller.
pub struct LaunchDeps {
    pub installer: Arc<dyn GameInstaller>,
    pub fetcher: Arc<dyn ModFetcher>,
    pub mediator: Arc<dyn FailureMediator>,
    pub pack_repo_base: String,
}

/// Produce a ready-to-spawn environment for the selected variant.
///
/// For modpacks the synchronizer runs first and its descriptor decides the
/// version and working directory for this launch only; the persisted
/// settings are never modified here.
pub async fn build_environment(
    settings: &LaunchSettings,
    deps: &LaunchDeps,
    events: &UnboundedSender<LaunchEvent>,
) -> LauncherResult<GameEnvironment> {
    settings.validate()?;

    let (variant, version_id, work_dir) = match settings.variant {
        GameVariant::Vanilla => (
            InstallVariant::Vanilla,
            settings.version.clone(),
            settings.root_dir.clone(),
        ),
        GameVariant::Forge => (
            InstallVariant::Modded,
            format!("{}-{}", settings.version, settings.subversion),
            settings.root_dir.clone(),
        ),
        GameVariant::Modpack => {
            let _ = events.send(LaunchEvent::working(format!(
                "Syncing modpack {}",
                settings.modpack
            )));
            let descriptor = synchronize(
                &settings.modpack,
                &settings.root_dir,
                &deps.pack_repo_base,
                deps.fetcher.as_ref(),
                deps.mediator.as_ref(),
                events,
            )
            .await?;
            (
                InstallVariant::Modded,
                descriptor.full_version(),
                pack_dir(&settings.root_dir, &settings.modpack),
            )
        }
    };

    info!(
        "Launching {} as {} ({})",
        version_id, settings.username, settings.variant
    );
    let _ = events.send(LaunchEvent::working(format!(
        "Preparing game version {version_id}"
    )));

    let request = InstallRequest {
        variant,
        version_id,
        main_dir: settings.root_dir.clone(),
        work_dir,
        username: settings.username.clone(),
    };

    let forward = events.clone();
    let mut environment = run_pipeline(deps.installer.clone(), request, move |signal| {
        let event = match signal {
            PipelineSignal::TaskCompleted { index, label } => LaunchEvent::TaskCompleted {
                index,
                label: label.to_string(),
            },
            PipelineSignal::DownloadStarted { entries_count } => {
                LaunchEvent::InstallDownloadStarted { entries_count }
            }
            PipelineSignal::DownloadProgress { count, speed } => {
                LaunchEvent::InstallDownloadProgress { count, speed }
            }
            PipelineSignal::Finished => LaunchEvent::PipelineFinished,
        };
        let _ = forward.send(event);
    })
    .await?;

    environment.apply_params(&RuntimeParams::from_settings(settings));
    Ok(environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{LauncherError, LauncherResult};
    use crate::core::install::EventSink;
    use crate::core::install::InstallEvent;
    use crate::core::modpack::{Decision, PolicyMediator};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    struct RecordingInstaller {
        requests: Mutex<Vec<InstallRequest>>,
    }

    impl RecordingInstaller {
        fn new() -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl GameInstaller for RecordingInstaller {
        fn install(
            &self,
            request: &InstallRequest,
            events: &EventSink,
        ) -> LauncherResult<GameEnvironment> {
            self.requests.lock().unwrap().push(request.clone());
            events.emit(InstallEvent::MetadataLoaded);
            Ok(GameEnvironment {
                program: PathBuf::from("java"),
                jvm_args: Vec::new(),
                main_class: "net.minecraft.client.main.Main".into(),
                game_args: Vec::new(),
                work_dir: request.work_dir.clone(),
            })
        }
    }

    struct NoFetcher;

    #[async_trait]
    impl ModFetcher for NoFetcher {
        async fn fetch_mod(&self, url: &str, _dest: &Path) -> LauncherResult<()> {
            Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: 0,
            })
        }
    }

    fn deps(installer: Arc<RecordingInstaller>) -> LaunchDeps {
        LaunchDeps {
            installer,
            fetcher: Arc::new(NoFetcher),
            mediator: Arc::new(PolicyMediator::new(Decision::Abort)),
            pack_repo_base: DEFAULT_PACK_REPO_BASE.into(),
        }
    }

    fn settings(root: &Path) -> LaunchSettings {
        let mut settings = LaunchSettings::default();
        settings.username = "Steve".into();
        settings.root_dir = root.to_path_buf();
        settings.memory_mb = 4096;
        settings
    }

    #[tokio::test]
    async fn vanilla_launch_applies_runtime_params() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Arc::new(RecordingInstaller::new());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let environment = build_environment(&settings(dir.path()), &deps(installer.clone()), &tx)
            .await
            .unwrap();

        assert!(environment.jvm_args.contains(&"-Xmx4096M".to_string()));
        let line = environment.command_line();
        assert!(line.contains("--username Steve"));
        assert!(line.contains("--width 1080"));

        let requests = installer.requests.lock().unwrap();
        assert_eq!(requests[0].variant, InstallVariant::Vanilla);
        assert_eq!(requests[0].work_dir, dir.path());
    }

    #[tokio::test]
    async fn forge_launch_joins_version_and_subversion() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Arc::new(RecordingInstaller::new());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let mut settings = settings(dir.path());
        settings.variant = GameVariant::Forge;
        settings.version = "1.19.2".into();
        settings.subversion = "43.2.0".into();

        build_environment(&settings, &deps(installer.clone()), &tx)
            .await
            .unwrap();

        let requests = installer.requests.lock().unwrap();
        assert_eq!(requests[0].variant, InstallVariant::Modded);
        assert_eq!(requests[0].version_id, "1.19.2-43.2.0");
        assert_eq!(requests[0].work_dir, dir.path());
    }

    #[tokio::test]
    async fn invalid_settings_never_reach_the_installer() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Arc::new(RecordingInstaller::new());
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();

        let mut settings = settings(dir.path());
        settings.username = String::new();

        let result = build_environment(&settings, &deps(installer.clone()), &tx).await;

        assert!(matches!(result, Err(LauncherError::InvalidParams(_))));
        assert!(installer.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_and_task_events_reach_the_channel() {
        let dir = tempfile::tempdir().unwrap();
        let installer = Arc::new(RecordingInstaller::new());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        build_environment(&settings(dir.path()), &deps(installer), &tx)
            .await
            .unwrap();
        drop(tx);

        let mut saw_status = false;
        let mut saw_finished = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                LaunchEvent::Status { .. } => saw_status = true,
                LaunchEvent::PipelineFinished => saw_finished = true,
                _ => {}
            }
        }
        assert!(saw_status);
        assert!(saw_finished);
    }
}
