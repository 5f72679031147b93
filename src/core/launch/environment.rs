// ─── Runtime Environment ───
// The installer hands back a ready-to-run environment; we only layer the
// user's runtime parameters on top and spawn the process.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::settings::LaunchSettings;

/// Fixed initial window size, same for every variant.
pub const DEFAULT_RESOLUTION: (u32, u32) = (1080, 720);

/// Parameters derived from persisted preferences for one launch attempt.
/// Never written back: modpack overrides must not leak into settings.
#[derive(Debug, Clone)]
pub struct RuntimeParams {
    pub username: String,
    pub memory_mb: u32,
    pub root_dir: PathBuf,
    pub resolution: (u32, u32),
}

impl RuntimeParams {
    pub fn from_settings(settings: &LaunchSettings) -> Self {
        Self {
            username: settings.username.clone(),
            memory_mb: settings.memory_mb,
            root_dir: settings.root_dir.clone(),
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

/// Fully resolved game invocation as produced by the installer.
#[derive(Debug, Clone)]
pub struct GameEnvironment {
    /// Java binary resolved by the installer.
    pub program: PathBuf,
    pub jvm_args: Vec<String>,
    pub main_class: String,
    pub game_args: Vec<String>,
    pub work_dir: PathBuf,
}

impl GameEnvironment {
    /// Apply memory ceiling, identity and window size.
    pub fn apply_params(&mut self, params: &RuntimeParams) {
        set_jvm_heap_ceiling(&mut self.jvm_args, params.memory_mb);
        set_game_arg(&mut self.game_args, "--username", &params.username);
        set_game_arg(&mut self.game_args, "--width", &params.resolution.0.to_string());
        set_game_arg(&mut self.game_args, "--height", &params.resolution.1.to_string());
    }

    /// Spawn the game as a child process with piped stdio.
    ///
    /// Returns immediately after spawning; monitoring the child is the
    /// caller's chosen execution strategy.
    pub fn run(&self) -> LauncherResult<Child> {
        std::fs::create_dir_all(&self.work_dir).map_err(|source| LauncherError::Io {
            path: self.work_dir.clone(),
            source,
        })?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.jvm_args);
        cmd.arg(&self.main_class);
        cmd.args(&self.game_args);
        cmd.current_dir(&self.work_dir);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        info!("Launching game with {:?}", self.program);
        debug!("Command: {}", self.command_line());

        cmd.spawn()
            .map_err(|e| LauncherError::Process(e.to_string()))
    }

    /// Copy/paste-friendly rendering of the full invocation for logs.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(self.jvm_args.iter().cloned());
        parts.push(self.main_class.clone());
        parts.extend(self.game_args.iter().cloned());
        parts.join(" ")
    }
}

fn set_jvm_heap_ceiling(jvm_args: &mut Vec<String>, memory_mb: u32) {
    jvm_args.retain(|arg| !arg.starts_with("-Xmx"));
    jvm_args.push(format!("-Xmx{}M", memory_mb));
}

/// Set a `--flag value` pair, replacing an existing value if present.
fn set_game_arg(args: &mut Vec<String>, flag: &str, value: &str) {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag {
            if i + 1 < args.len() {
                args[i + 1] = value.to_string();
            } else {
                args.push(value.to_string());
            }
            return;
        }
        i += 1;
    }
    args.push(flag.to_string());
    args.push(value.to_string());
}
