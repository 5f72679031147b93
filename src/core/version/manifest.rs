// ─── Version Catalogue ───
// Fetches the three selectable version lists (vanilla releases, forge
// subversions, published modpacks) and caches each one on disk for a day
// so the pickers populate instantly on launch.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::settings::{CacheStamps, VersionCategory};

const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

const FORGE_PROMOTIONS_URL: &str =
    "https://files.minecraftforge.net/net/minecraftforge/forge/promotions_slim.json";

/// Top-level Mojang version manifest.
#[derive(Debug, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<VersionEntry>,
}

/// A single entry in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub version_type: String,
    #[serde(rename = "releaseTime")]
    pub release_time: String,
}

impl VersionManifest {
    /// Fetch the version manifest from Mojang using a shared HTTP client.
    pub async fn fetch(client: &reqwest::Client) -> LauncherResult<Self> {
        info!("Fetching game version manifest...");

        let manifest: VersionManifest = client
            .get(VERSION_MANIFEST_URL)
            .send()
            .await?
            .json()
            .await?;

        info!("Loaded {} versions from manifest", manifest.versions.len());
        Ok(manifest)
    }

    /// Ids of all official stable versions, newest first.
    pub fn release_ids(&self) -> Vec<String> {
        self.versions
            .iter()
            .filter(|v| v.version_type == "release")
            .map(|v| v.id.clone())
            .collect()
    }
}

/// Forge promotion index: `"<game version>-latest"` / `"-recommended"`
/// keys mapped to forge subversions.
#[derive(Debug, Deserialize)]
pub struct ForgePromotions {
    pub promos: std::collections::BTreeMap<String, String>,
}

impl ForgePromotions {
    pub async fn fetch(client: &reqwest::Client) -> LauncherResult<Self> {
        info!("Fetching forge promotions...");
        Ok(client
            .get(FORGE_PROMOTIONS_URL)
            .send()
            .await?
            .json()
            .await?)
    }

    /// Subversions promoted for one game version, recommended first.
    pub fn subversions_for(&self, game_version: &str) -> Vec<String> {
        let mut out = Vec::new();
        for suffix in ["recommended", "latest"] {
            if let Some(sub) = self.promos.get(&format!("{game_version}-{suffix}")) {
                if !out.contains(sub) {
                    out.push(sub.clone());
                }
            }
        }
        out
    }
}

#[derive(Debug, Deserialize)]
struct OrgRepo {
    name: String,
}

/// Names of the repositories under the modpack organization, one pack each.
pub async fn fetch_pack_names(client: &reqwest::Client, org: &str) -> LauncherResult<Vec<String>> {
    let url = format!("https://api.github.com/orgs/{org}/repos");
    info!("Fetching modpack list from {}", url);

    let repos: Vec<OrgRepo> = client.get(&url).send().await?.json().await?;
    Ok(repos.into_iter().map(|r| r.name).collect())
}

/// Vanilla release ids, served from the day-old cache when possible.
pub async fn vanilla_release_ids(
    client: &reqwest::Client,
    data_dir: &Path,
    cache: &mut CacheStamps,
) -> LauncherResult<Vec<String>> {
    let category = VersionCategory::Vanilla;
    if let Some(cached) = load_cached(data_dir, category, cache) {
        return Ok(cached);
    }
    let ids = VersionManifest::fetch(client).await?.release_ids();
    store_cached(data_dir, category, cache, &ids)?;
    Ok(ids)
}

/// Promoted forge subversions for one game version, cache-backed. The
/// whole promotion index is cached, not the per-version slice.
pub async fn forge_subversions(
    client: &reqwest::Client,
    data_dir: &Path,
    cache: &mut CacheStamps,
    game_version: &str,
) -> LauncherResult<Vec<String>> {
    let category = VersionCategory::Forge;
    let promos: std::collections::BTreeMap<String, String> =
        match load_cached(data_dir, category, cache) {
            Some(cached) => cached,
            None => {
                let promos = ForgePromotions::fetch(client).await?.promos;
                store_cached(data_dir, category, cache, &promos)?;
                promos
            }
        };
    Ok(ForgePromotions { promos }.subversions_for(game_version))
}

/// Published modpack names, cache-backed.
pub async fn modpack_names(
    client: &reqwest::Client,
    data_dir: &Path,
    cache: &mut CacheStamps,
    org: &str,
) -> LauncherResult<Vec<String>> {
    let category = VersionCategory::Modpack;
    if let Some(cached) = load_cached(data_dir, category, cache) {
        return Ok(cached);
    }
    let names = fetch_pack_names(client, org).await?;
    store_cached(data_dir, category, cache, &names)?;
    Ok(names)
}

fn load_cached<T: DeserializeOwned>(
    data_dir: &Path,
    category: VersionCategory,
    cache: &CacheStamps,
) -> Option<T> {
    if !cache.is_fresh(category, chrono::Utc::now()) {
        return None;
    }
    let path = data_dir.join(category.cache_file());
    let raw = std::fs::read_to_string(&path).ok()?;
    let value = serde_json::from_str(&raw).ok()?;
    debug!("Serving {:?} from cache", path);
    Some(value)
}

fn store_cached<T: Serialize>(
    data_dir: &Path,
    category: VersionCategory,
    cache: &mut CacheStamps,
    value: &T,
) -> LauncherResult<()> {
    std::fs::create_dir_all(data_dir).map_err(|source| LauncherError::Io {
        path: data_dir.to_path_buf(),
        source,
    })?;
    let path = data_dir.join(category.cache_file());
    let json = serde_json::to_string(value)?;
    std::fs::write(&path, json).map_err(|source| LauncherError::Io { path, source })?;
    cache.touch(category, chrono::Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::http::build_http_client;

    #[test]
    fn deserialize_manifest_entry() {
        let json = r#"{
            "id": "1.20.4",
            "type": "release",
            "releaseTime": "2023-12-07T08:00:00+00:00",
            "url": "https://example.com/1.20.4.json"
        }"#;
        let entry: VersionEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id, "1.20.4");
        assert_eq!(entry.version_type, "release");
    }

    #[test]
    fn release_ids_skip_snapshots() {
        let manifest: VersionManifest = serde_json::from_str(
            r#"{"versions": [
                {"id": "24w07a", "type": "snapshot", "releaseTime": "t", "url": "u"},
                {"id": "1.20.4", "type": "release", "releaseTime": "t", "url": "u"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(manifest.release_ids(), vec!["1.20.4".to_string()]);
    }

    #[test]
    fn forge_promotions_prefer_recommended() {
        let promotions: ForgePromotions = serde_json::from_str(
            r#"{"promos": {
                "1.19.2-latest": "43.2.3",
                "1.19.2-recommended": "43.2.0",
                "1.20.1-latest": "47.1.0"
            }}"#,
        )
        .unwrap();
        assert_eq!(
            promotions.subversions_for("1.19.2"),
            vec!["43.2.0".to_string(), "43.2.3".to_string()]
        );
        assert_eq!(
            promotions.subversions_for("1.20.1"),
            vec!["47.1.0".to_string()]
        );
        assert!(promotions.subversions_for("1.7.10").is_empty());
    }

    #[tokio::test]
    async fn fresh_cache_is_served_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let category = VersionCategory::Vanilla;
        std::fs::write(
            dir.path().join(category.cache_file()),
            r#"["1.20.4", "1.20.1"]"#,
        )
        .unwrap();
        let mut cache = CacheStamps::default();
        cache.touch(category, chrono::Utc::now());

        let ids = vanilla_release_ids(&build_http_client().unwrap(), dir.path(), &mut cache)
            .await
            .unwrap();
        assert_eq!(ids, vec!["1.20.4".to_string(), "1.20.1".to_string()]);
    }
}
