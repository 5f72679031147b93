// ─── Reconciliation Engine ───
// Pure diff between what a pack version requires and what is on disk.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::manifest::ModManifest;

/// The minimal set of file operations that turns the current mods folder
/// into the state the new manifest requires.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Files to delete: previously managed, still present, no longer listed.
    pub to_remove: BTreeSet<String>,
    /// Files to fetch, with their source URLs.
    pub to_download: BTreeMap<String, String>,
}

impl ReconcilePlan {
    pub fn is_settled(&self) -> bool {
        self.to_remove.is_empty() && self.to_download.is_empty()
    }
}

/// Compute the plan from three snapshots.
///
/// Removal requires membership in the *previous* manifest: a file the user
/// dropped into the mods folder themselves was never managed by any
/// manifest and is never deleted, no matter what the new manifest says.
/// The inventory cannot be trusted to match the previous manifest (the
/// user may have deleted managed mods by hand), so presence on disk is
/// checked for both sets.
pub fn reconcile(
    previous: &ModManifest,
    inventory: &BTreeSet<String>,
    new: &ModManifest,
) -> ReconcilePlan {
    let to_remove = previous
        .names()
        .into_iter()
        .filter(|name| inventory.contains(name) && !new.contains(name))
        .collect();

    let to_download = new
        .iter()
        .filter(|(name, _)| !inventory.contains(*name))
        .map(|(name, url)| (name.clone(), url.clone()))
        .collect();

    ReconcilePlan {
        to_remove,
        to_download,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(entries: &[(&str, &str)]) -> ModManifest {
        entries
            .iter()
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect()
    }

    fn inventory(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn removes_stale_managed_mods_and_downloads_new_ones() {
        // Scenario: b.jar was managed and is gone from the new manifest,
        // c.jar is user-added, d.jar is newly required.
        let previous = manifest(&[("a.jar", "url1"), ("b.jar", "url2")]);
        let on_disk = inventory(&["a.jar", "b.jar", "c.jar"]);
        let new = manifest(&[("a.jar", "url1"), ("d.jar", "url3")]);

        let plan = reconcile(&previous, &on_disk, &new);

        assert_eq!(plan.to_remove, inventory(&["b.jar"]));
        assert_eq!(plan.to_download.len(), 1);
        assert_eq!(plan.to_download.get("d.jar").map(String::as_str), Some("url3"));
    }

    #[test]
    fn first_install_downloads_everything_and_removes_nothing() {
        let previous = ModManifest::default();
        let on_disk = BTreeSet::new();
        let new = manifest(&[("x.jar", "url")]);

        let plan = reconcile(&previous, &on_disk, &new);

        assert!(plan.to_remove.is_empty());
        assert_eq!(plan.to_download.get("x.jar").map(String::as_str), Some("url"));
    }

    #[test]
    fn user_added_files_are_never_removal_candidates() {
        // Not in any prior manifest, so untouchable even with an empty
        // new manifest.
        let previous = manifest(&[("managed.jar", "url")]);
        let on_disk = inventory(&["managed.jar", "mine.jar"]);
        let new = ModManifest::default();

        let plan = reconcile(&previous, &on_disk, &new);

        assert_eq!(plan.to_remove, inventory(&["managed.jar"]));
        assert!(!plan.to_remove.contains("mine.jar"));
    }

    #[test]
    fn removal_requires_presence_on_disk() {
        // Manifest says a.jar was managed, but the user already deleted it.
        let previous = manifest(&[("a.jar", "url1"), ("b.jar", "url2")]);
        let on_disk = inventory(&["b.jar"]);
        let new = ModManifest::default();

        let plan = reconcile(&previous, &on_disk, &new);
        assert_eq!(plan.to_remove, inventory(&["b.jar"]));
    }

    #[test]
    fn plan_sets_are_disjoint_and_bounded() {
        let previous = manifest(&[("a.jar", "u1"), ("b.jar", "u2"), ("c.jar", "u3")]);
        let on_disk = inventory(&["a.jar", "c.jar", "extra.jar"]);
        let new = manifest(&[("a.jar", "u1"), ("b.jar", "u2"), ("d.jar", "u4")]);

        let plan = reconcile(&previous, &on_disk, &new);

        for name in &plan.to_remove {
            assert!(on_disk.contains(name));
            assert!(previous.contains(name));
            assert!(!new.contains(name));
            assert!(!plan.to_download.contains_key(name));
        }
        for name in new.names() {
            assert!(on_disk.contains(&name) || plan.to_download.contains_key(&name));
        }
    }

    #[test]
    fn reconcile_is_deterministic() {
        let previous = manifest(&[("a.jar", "u1"), ("b.jar", "u2")]);
        let on_disk = inventory(&["a.jar", "b.jar", "c.jar"]);
        let new = manifest(&[("a.jar", "u1"), ("d.jar", "u3")]);

        let first = reconcile(&previous, &on_disk, &new);
        let second = reconcile(&previous, &on_disk, &new);
        assert_eq!(first, second);
    }

    #[test]
    fn settled_when_disk_already_matches() {
        let previous = manifest(&[("a.jar", "u1")]);
        let on_disk = inventory(&["a.jar"]);
        let new = manifest(&[("a.jar", "u1")]);

        assert!(reconcile(&previous, &on_disk, &new).is_settled());
    }
}
