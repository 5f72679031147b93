// ─── Fetch Executor ───
// Batch mod downloads with per-item failure isolation: a broken link must
// not take the rest of the batch down with it. Retry policy lives with the
// Failure Mediator, never here.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Maximum number of parallel downloads in a batch.
const FETCH_CONCURRENCY: usize = 4;

/// Incremental batch progress, one notification per finished item.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FetchProgress {
    pub completed: usize,
    pub total: usize,
    pub file: String,
}

/// Single-artifact fetch. Abstracted so the synchronizer can be exercised
/// without a network.
#[async_trait]
pub trait ModFetcher: Send + Sync {
    async fn fetch_mod(&self, url: &str, dest: &Path) -> LauncherResult<()>;
}

/// HTTP downloader with optional SHA-1 validation.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// The body is buffered and hashed before anything touches the
    /// destination path, so an HTTP error or checksum mismatch leaves no
    /// file behind. If writing itself fails midway, the partial file is
    /// removed: a half-written mod must not look like a successful one.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        if let Some(expected) = sha1_expected {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(LauncherError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        if let Err(e) = write_all(dest, &bytes).await {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(e);
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

async fn write_all(dest: &Path, bytes: &[u8]) -> LauncherResult<()> {
    // Scoped so the handle is dropped immediately; matters on Windows.
    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| io_error(dest, e))?;
    file.write_all(bytes).await.map_err(|e| io_error(dest, e))?;
    file.flush().await.map_err(|e| io_error(dest, e))?;
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> LauncherError {
    LauncherError::Io {
        path: PathBuf::from(path),
        source,
    }
}

#[async_trait]
impl ModFetcher for Downloader {
    async fn fetch_mod(&self, url: &str, dest: &Path) -> LauncherResult<()> {
        self.download_file(url, dest, None).await
    }
}

/// Download every item of a reconciliation plan into `dest_dir/<name>`.
///
/// Each item is attempted exactly once; failures are aggregated and
/// returned instead of aborting the batch. Progress is reported once per
/// finished item, successful or not.
pub async fn fetch_all<F>(
    fetcher: &dyn ModFetcher,
    dest_dir: &Path,
    to_download: &BTreeMap<String, String>,
    mut on_progress: F,
) -> BTreeSet<String>
where
    F: FnMut(FetchProgress),
{
    let total = to_download.len();
    if total > 0 {
        info!("Fetching {} mods into {:?}", total, dest_dir);
    }

    let mut failed = BTreeSet::new();
    let mut completed = 0;

    let jobs: Vec<(String, String, PathBuf)> = to_download
        .iter()
        .map(|(name, url)| (name.clone(), url.clone(), dest_dir.join(name)))
        .collect();
    let mut results = stream::iter(jobs.into_iter().map(|(name, url, dest)| async move {
        (name, fetcher.fetch_mod(&url, &dest).await)
    }))
    .buffer_unordered(FETCH_CONCURRENCY);

    while let Some((name, result)) = results.next().await {
        completed += 1;
        if let Err(e) = result {
            warn!("Mod download failed for {}: {}", name, e);
            failed.insert(name.clone());
        }
        on_progress(FetchProgress {
            completed,
            total,
            file: name,
        });
    }

    failed
}
