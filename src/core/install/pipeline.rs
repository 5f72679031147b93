// ─── Installation Pipeline Supervisor ───
// The worker installs; we watch. Events arrive on a FIFO queue and are
// mapped to a fixed task list the frontend renders as checkboxes. The
// supervisor polls instead of blocking so the UI thread it reports to is
// never starved.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::install::events::{event_channel, InstallEvent};
use crate::core::install::installer::{GameInstaller, InstallRequest};
use crate::core::launch::environment::GameEnvironment;

/// How often the supervisor drains the event queue.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which installation path is running. Modded adds the engine-resolution
/// stages in front of the vanilla sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallVariant {
    Vanilla,
    Modded,
}

const MODDED_TASKS: &[&str] = &[
    "Load engine metadata",
    "Load game metadata",
    "Locate game jar",
    "Download engine payload",
    "Post-process engine",
    "Resolve libraries",
    "Download game assets",
];

const VANILLA_TASKS: &[&str] = &[
    "Load game metadata",
    "Locate game jar",
    "Resolve libraries",
    "Download game assets",
];

impl InstallVariant {
    pub fn task_labels(self) -> &'static [&'static str] {
        match self {
            InstallVariant::Vanilla => VANILLA_TASKS,
            InstallVariant::Modded => MODDED_TASKS,
        }
    }
}

/// One stage of the pipeline as shown to the user. Flips to done exactly
/// once, never back.
#[derive(Debug, Clone, Serialize)]
pub struct InstallTask {
    pub label: &'static str,
    pub done: bool,
}

/// UI-facing notifications derived from the raw event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineSignal {
    TaskCompleted { index: usize, label: &'static str },
    DownloadStarted { entries_count: usize },
    DownloadProgress { count: usize, speed: f64 },
    Finished,
}

/// Supervisor-side state machine.
///
/// Two event kinds are emitted twice with identical payloads on the modded
/// path: `MetadataLoaded` (engine, then base game) and the
/// `DownloadStart`/`DownloadComplete` pair (engine payload, then game
/// assets). The queue is FIFO, so occurrence order is the only reliable
/// discriminator; the phase flags below make that order explicit.
pub struct PipelineState {
    variant: InstallVariant,
    tasks: Vec<InstallTask>,
    engine_loaded: bool,
    engine_downloaded: bool,
}

impl PipelineState {
    pub fn new(variant: InstallVariant) -> Self {
        let tasks = variant
            .task_labels()
            .iter()
            .map(|label| InstallTask { label, done: false })
            .collect();
        Self {
            variant,
            tasks,
            engine_loaded: false,
            engine_downloaded: false,
        }
    }

    pub fn tasks(&self) -> &[InstallTask] {
        &self.tasks
    }

    pub fn is_complete(&self) -> bool {
        self.tasks.iter().all(|t| t.done)
    }

    /// Fold one event into the state, yielding the signals it produced.
    pub fn observe(&mut self, event: InstallEvent) -> Vec<PipelineSignal> {
        match self.variant {
            InstallVariant::Modded => self.observe_modded(event),
            InstallVariant::Vanilla => self.observe_vanilla(event),
        }
    }

    fn observe_modded(&mut self, event: InstallEvent) -> Vec<PipelineSignal> {
        match event {
            InstallEvent::MetadataLoaded => {
                if !self.engine_loaded {
                    self.engine_loaded = true;
                    self.mark(0)
                } else {
                    self.mark(1)
                }
            }
            InstallEvent::JarFound => self.mark(2),
            InstallEvent::DownloadStart { entries_count } => {
                vec![PipelineSignal::DownloadStarted { entries_count }]
            }
            InstallEvent::DownloadProgress { count, speed } => {
                vec![PipelineSignal::DownloadProgress { count, speed }]
            }
            InstallEvent::DownloadComplete => {
                if !self.engine_downloaded {
                    self.engine_downloaded = true;
                    self.mark(3)
                } else {
                    let mut signals = self.mark(6);
                    signals.push(PipelineSignal::Finished);
                    signals
                }
            }
            InstallEvent::PostProcessed => self.mark(4),
            InstallEvent::LibrariesResolved => self.mark(5),
        }
    }

    fn observe_vanilla(&mut self, event: InstallEvent) -> Vec<PipelineSignal> {
        match event {
            InstallEvent::MetadataLoaded => self.mark(0),
            InstallEvent::JarFound => self.mark(1),
            InstallEvent::LibrariesResolved => self.mark(2),
            InstallEvent::DownloadStart { entries_count } => {
                vec![PipelineSignal::DownloadStarted { entries_count }]
            }
            InstallEvent::DownloadProgress { count, speed } => {
                vec![PipelineSignal::DownloadProgress { count, speed }]
            }
            InstallEvent::DownloadComplete => {
                let mut signals = self.mark(3);
                signals.push(PipelineSignal::Finished);
                signals
            }
            // No post-processing stage on the vanilla path.
            InstallEvent::PostProcessed => Vec::new(),
        }
    }

    fn mark(&mut self, index: usize) -> Vec<PipelineSignal> {
        let task = &mut self.tasks[index];
        if task.done {
            return Vec::new();
        }
        task.done = true;
        debug!("Install task {} ({}) done", index + 1, task.label);
        vec![PipelineSignal::TaskCompleted {
            index,
            label: task.label,
        }]
    }

    /// The worker result is authoritative: if it finished cleanly while
    /// some task event was never observed, mark the remainder done.
    fn complete_remaining(&mut self) -> Vec<PipelineSignal> {
        let mut signals: Vec<PipelineSignal> = (0..self.tasks.len())
            .flat_map(|index| self.mark(index))
            .collect();
        signals.push(PipelineSignal::Finished);
        signals
    }
}

/// Run the installer on a worker thread and supervise it to completion.
///
/// The supervisor never blocks on the queue: it drains whatever is
/// pending, sleeps `POLL_INTERVAL`, and checks whether the worker is done.
/// Worker errors (and panics) surface as a terminal `LauncherError`
/// instead of leaving the caller waiting for events that will never come.
pub async fn run_pipeline<F>(
    installer: Arc<dyn GameInstaller>,
    request: InstallRequest,
    mut on_signal: F,
) -> LauncherResult<GameEnvironment>
where
    F: FnMut(PipelineSignal) + Send,
{
    let variant = request.variant;
    info!(
        "Starting {:?} installation pipeline for {}",
        variant, request.version_id
    );

    let (sink, events) = event_channel();
    let worker =
        tokio::task::spawn_blocking(move || installer.install(&request, &sink));

    let mut state = PipelineState::new(variant);
    loop {
        while let Ok(event) = events.try_recv() {
            for signal in state.observe(event) {
                on_signal(signal);
            }
        }
        if worker.is_finished() {
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    // The sink is dropped with the worker closure; drain what is left.
    while let Ok(event) = events.try_recv() {
        for signal in state.observe(event) {
            on_signal(signal);
        }
    }

    let environment = worker
        .await
        .map_err(|e| LauncherError::Install(format!("installer worker panicked: {e}")))??;

    if !state.is_complete() {
        debug!("Installer returned before all task events were observed; completing defensively");
        for signal in state.complete_remaining() {
            on_signal(signal);
        }
    }

    Ok(environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::install::events::EventSink;
    use std::path::PathBuf;

    struct ScriptedInstaller {
        events: Vec<InstallEvent>,
        fail: bool,
    }

    impl ScriptedInstaller {
        fn new(events: Vec<InstallEvent>) -> Self {
            Self {
                events,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                events: vec![InstallEvent::MetadataLoaded],
                fail: true,
            }
        }
    }

    impl GameInstaller for ScriptedInstaller {
        fn install(
            &self,
            _request: &InstallRequest,
            events: &EventSink,
        ) -> LauncherResult<GameEnvironment> {
            for event in &self.events {
                events.emit(event.clone());
            }
            if self.fail {
                return Err(LauncherError::Install("metadata fetch failed".into()));
            }
            Ok(test_environment())
        }
    }

    fn test_environment() -> GameEnvironment {
        GameEnvironment {
            program: PathBuf::from("java"),
            jvm_args: Vec::new(),
            main_class: "net.minecraft.client.main.Main".into(),
            game_args: Vec::new(),
            work_dir: PathBuf::from("."),
        }
    }

    fn request(variant: InstallVariant) -> InstallRequest {
        InstallRequest {
            variant,
            version_id: "1.19.2-43.2.0".into(),
            main_dir: PathBuf::from("/tmp/game"),
            work_dir: PathBuf::from("/tmp/game"),
            username: "Steve".into(),
        }
    }

    fn completed_indexes(signals: &[PipelineSignal]) -> Vec<usize> {
        signals
            .iter()
            .filter_map(|s| match s {
                PipelineSignal::TaskCompleted { index, .. } => Some(*index),
                _ => None,
            })
            .collect()
    }

    fn full_modded_sequence() -> Vec<InstallEvent> {
        vec![
            InstallEvent::MetadataLoaded,
            InstallEvent::MetadataLoaded,
            InstallEvent::JarFound,
            InstallEvent::DownloadStart { entries_count: 12 },
            InstallEvent::DownloadProgress {
                count: 6,
                speed: 1_000_000.0,
            },
            InstallEvent::DownloadComplete,
            InstallEvent::PostProcessed,
            InstallEvent::LibrariesResolved,
            InstallEvent::DownloadStart { entries_count: 40 },
            InstallEvent::DownloadComplete,
        ]
    }

    #[test]
    fn duplicate_events_are_disambiguated_by_occurrence_order() {
        let mut state = PipelineState::new(InstallVariant::Modded);
        let mut signals = Vec::new();
        for event in full_modded_sequence() {
            signals.extend(state.observe(event));
        }

        assert_eq!(completed_indexes(&signals), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(signals.last(), Some(&PipelineSignal::Finished));
        assert!(state.is_complete());
    }

    #[test]
    fn tasks_complete_exactly_once() {
        let mut state = PipelineState::new(InstallVariant::Vanilla);
        assert_eq!(state.observe(InstallEvent::JarFound).len(), 1);
        assert!(state.observe(InstallEvent::JarFound).is_empty());
        assert!(state.tasks()[1].done);
    }

    #[test]
    fn vanilla_path_is_the_shorter_subsequence() {
        let mut state = PipelineState::new(InstallVariant::Vanilla);
        let mut signals = Vec::new();
        for event in [
            InstallEvent::MetadataLoaded,
            InstallEvent::JarFound,
            InstallEvent::LibrariesResolved,
            InstallEvent::DownloadStart { entries_count: 40 },
            InstallEvent::DownloadComplete,
        ] {
            signals.extend(state.observe(event));
        }

        assert_eq!(completed_indexes(&signals), vec![0, 1, 2, 3]);
        assert!(state.is_complete());
    }

    #[tokio::test]
    async fn supervisor_consumes_worker_events_and_returns_environment() {
        let installer = Arc::new(ScriptedInstaller::new(full_modded_sequence()));
        let mut signals = Vec::new();

        let environment = run_pipeline(installer, request(InstallVariant::Modded), |s| {
            signals.push(s)
        })
        .await
        .unwrap();

        assert_eq!(environment.main_class, "net.minecraft.client.main.Main");
        assert_eq!(completed_indexes(&signals), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn worker_error_is_a_terminal_pipeline_failure() {
        let installer = Arc::new(ScriptedInstaller::failing());

        let result = run_pipeline(installer, request(InstallVariant::Modded), |_| {}).await;

        assert!(matches!(result, Err(LauncherError::Install(_))));
    }

    #[tokio::test]
    async fn clean_worker_exit_completes_unobserved_tasks_defensively() {
        // Only a prefix of the expected events arrives, then the worker
        // returns successfully. The worker is authoritative.
        let installer = Arc::new(ScriptedInstaller::new(vec![
            InstallEvent::MetadataLoaded,
            InstallEvent::JarFound,
        ]));
        let mut signals = Vec::new();

        let result = run_pipeline(installer, request(InstallVariant::Vanilla), |s| {
            signals.push(s)
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(completed_indexes(&signals), vec![0, 1, 2, 3]);
        assert_eq!(signals.last(), Some(&PipelineSignal::Finished));
    }
}
