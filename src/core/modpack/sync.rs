// ─── Modpack Synchronizer ───
// One sync cycle: snapshot what is on disk, pull the repository, diff,
// prune, fetch. On partial download failure the mediator decides whether
// to accept the gap, run the whole cycle again, or abort the launch.

use std::path::Path;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::core::downloader::{fetch_all, ModFetcher};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::LaunchEvent;
use crate::core::manifest::store::{pack_dir, ModManifest, PackDescriptor};
use crate::core::manifest::sync::ensure_up_to_date;
use crate::core::modpack::inventory::{remove_stale, scan_mods};
use crate::core::modpack::mediator::{Decision, FailureMediator};
use crate::core::modpack::reconcile::reconcile;

/// Bring the named pack's checkout and mods directory in line with its
/// remote, returning the descriptor the pack is pinned to.
///
/// The previous manifest and the disk inventory are read BEFORE the
/// repository moves: the old manifest describes what the files currently
/// on disk were downloaded for, and that pairing is what keeps
/// reconciliation from deleting user-added mods.
pub async fn synchronize(
    pack_name: &str,
    root_dir: &Path,
    repo_base: &str,
    fetcher: &dyn ModFetcher,
    mediator: &dyn FailureMediator,
    events: &UnboundedSender<LaunchEvent>,
) -> LauncherResult<PackDescriptor> {
    let pack_dir = pack_dir(root_dir, pack_name);
    let mods_dir = pack_dir.join("mods");
    let remote_url = format!("{}/{}.git", repo_base.trim_end_matches('/'), pack_name);

    loop {
        let previous = ModManifest::load_previous(&pack_dir);
        let inventory = scan_mods(&mods_dir)?;

        let sync_dir = pack_dir.clone();
        let url = remote_url.clone();
        tokio::task::spawn_blocking(move || ensure_up_to_date(&sync_dir, &url))
            .await
            .map_err(|e| LauncherError::Other(format!("repository sync worker panicked: {e}")))??;

        let manifest = ModManifest::load_required(&pack_dir)?;
        let descriptor = PackDescriptor::load(&pack_dir)?;

        let plan = reconcile(&previous, &inventory, &manifest);
        remove_stale(&mods_dir, &plan.to_remove)?;

        let failed = fetch_all(fetcher, &mods_dir, &plan.to_download, |p| {
            let _ = events.send(LaunchEvent::FetchProgress {
                completed: p.completed,
                total: p.total,
                file: p.file,
            });
        })
        .await;

        if failed.is_empty() {
            info!(
                "Modpack {} is up to date ({} mods required)",
                pack_name,
                manifest.len()
            );
            return Ok(descriptor);
        }

        let failed: Vec<String> = failed.into_iter().collect();
        warn!(
            "{} of {} mod downloads failed for {}",
            failed.len(),
            plan.to_download.len(),
            pack_name
        );
        let _ = events.send(LaunchEvent::FetchFailed {
            failed: failed.clone(),
        });

        match mediator.mediate(&failed).await {
            Decision::Continue => {
                info!("Launching {} with {} mods missing", pack_name, failed.len());
                return Ok(descriptor);
            }
            Decision::Retry => {
                info!("Retrying modpack sync for {}", pack_name);
            }
            Decision::Abort => {
                return Err(LauncherError::SyncAborted {
                    failed: failed.len(),
                })
            }
        }
    }
}
