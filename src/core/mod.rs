// ─── Packhorse Core ───
// Backend for a modpack-centric Minecraft launcher.
//
// Architecture:
//   core/
//     manifest/   — Modpack repository store + git sync
//     modpack/    — Inventory scan, reconcile diff, failure mediation,
//                   one-cycle synchronizer
//     downloader/ — Concurrent mod downloads with failure isolation
//     install/    — Installer seam + pipeline supervisor
//     launch/     — Launch orchestration, runtime params, log relay
//     version/    — Cached version catalogues
//     settings/   — Persisted launch preferences
//     state/      — Shared application state

pub mod downloader;
pub mod error;
pub mod http;
pub mod install;
pub mod launch;
pub mod manifest;
pub mod modpack;
pub mod settings;
pub mod state;
pub mod version;
