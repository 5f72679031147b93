// ─── Manifest Sync ───
// Keeps the local checkout of a modpack repository identical to its remote.
// Local drift in tracked files is discarded on purpose: the remote is the
// source of truth for the manifest and descriptor. Untracked files (the
// downloaded mods themselves, user additions) are left alone.

use std::path::Path;

use git2::{ObjectType, Repository, ResetType};
use tracing::{debug, info};

use crate::core::error::LauncherResult;

/// Clone the repository if it is absent, otherwise fetch from origin and
/// hard-reset the work tree to the fetched tip.
///
/// Blocking network and filesystem I/O; callers on the async runtime wrap
/// this in `spawn_blocking`.
pub fn ensure_up_to_date(local_dir: &Path, remote_url: &str) -> LauncherResult<()> {
    match Repository::open(local_dir) {
        Ok(repo) => {
            debug!("Updating modpack repository at {:?}", local_dir);
            update(&repo)
        }
        Err(_) => {
            // First launch of this pack (or a checkout too broken to open).
            info!("Cloning modpack repository {} into {:?}", remote_url, local_dir);
            Repository::clone(remote_url, local_dir)?;
            Ok(())
        }
    }
}

fn update(repo: &Repository) -> LauncherResult<()> {
    let mut remote = repo.find_remote("origin")?;
    // Empty refspec list = the remote's configured refspecs.
    remote.fetch(&[] as &[&str], None, None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let target = fetch_head.peel(ObjectType::Commit)?;
    repo.reset(&target, ResetType::Hard, None)?;

    debug!("Repository reset to {}", target.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{IndexAddOption, Signature};
    use std::path::PathBuf;

    fn commit_all(repo: &Repository, message: &str) {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        match parent {
            Some(parent) => repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])
                .unwrap(),
            None => repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
                .unwrap(),
        };
    }

    fn seed_remote(dir: &std::path::Path) -> (Repository, PathBuf) {
        let remote_dir = dir.join("remote");
        let repo = Repository::init(&remote_dir).unwrap();
        std::fs::create_dir_all(remote_dir.join("mods")).unwrap();
        std::fs::write(
            remote_dir.join("mods/modlist.json"),
            r#"{"a.jar": "https://example.com/a.jar"}"#,
        )
        .unwrap();
        commit_all(&repo, "initial pack");
        (repo, remote_dir)
    }

    #[test]
    fn clones_when_checkout_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let (_remote, remote_dir) = seed_remote(dir.path());
        let local_dir = dir.path().join("local");

        ensure_up_to_date(&local_dir, remote_dir.to_str().unwrap()).unwrap();
        assert!(local_dir.join("mods/modlist.json").exists());
    }

    #[test]
    fn update_discards_tracked_drift_and_keeps_untracked_files() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, remote_dir) = seed_remote(dir.path());
        let local_dir = dir.path().join("local");
        let url = remote_dir.to_str().unwrap().to_string();

        ensure_up_to_date(&local_dir, &url).unwrap();

        // Local tampering with a tracked file, plus a user-added mod.
        std::fs::write(local_dir.join("mods/modlist.json"), "{tampered").unwrap();
        std::fs::write(local_dir.join("mods/user_added.jar"), b"jar").unwrap();

        // New manifest published on the remote.
        std::fs::write(
            remote_dir.join("mods/modlist.json"),
            r#"{"b.jar": "https://example.com/b.jar"}"#,
        )
        .unwrap();
        commit_all(&remote, "pack update");

        ensure_up_to_date(&local_dir, &url).unwrap();

        let manifest = std::fs::read_to_string(local_dir.join("mods/modlist.json")).unwrap();
        assert!(manifest.contains("b.jar"));
        assert!(local_dir.join("mods/user_added.jar").exists());
    }
}
