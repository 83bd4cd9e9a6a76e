//! A single local/remote repository pairing.

use std::path::{Path, PathBuf};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::git::{self, RepoHandle};

/// One local directory kept in sync with one remote git repository.
///
/// The mutex is the mirror's mutation lock: it guards every operation that
/// can change the on-disk tree or the handle, and it is the only route to
/// the handle. Locks are strictly per-mirror, so unrelated mirrors never
/// contend.
pub struct GitMirror {
    path: PathBuf,
    url: String,
    state: Mutex<Option<RepoHandle>>,
}

impl GitMirror {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            state: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a load or clone has succeeded for this mirror.
    pub async fn is_loaded(&self) -> bool {
        self.state.lock().await.is_some()
    }

    /// Commit id of the mirror's `HEAD` at the last successful operation.
    pub async fn head(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .as_ref()
            .and_then(|handle| handle.head().map(str::to_string))
    }

    /// Opens the existing mirror, or clones it if the directory is missing.
    ///
    /// A directory that is not a repository, or that tracks a different
    /// remote, is reported as a recoverable failure: the handle stays unset
    /// and the caller may re-clone.
    pub async fn load(&self) -> bool {
        let exists = tokio::fs::metadata(&self.path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !exists {
            return self.clone_repository().await;
        }

        let mut state = self.state.lock().await;
        info!("Loading addon repository {}", self.url);
        match git::open(&self.path, &self.url).await {
            Ok(handle) => {
                *state = Some(handle);
                true
            }
            Err(err) => {
                error!("Can't load repository {}: {err}", self.path.display());
                false
            }
        }
    }

    /// Performs a full clone of the remote into the mirror directory.
    ///
    /// A failed clone leaves whatever partial output git produced; no
    /// rollback is attempted.
    pub async fn clone_repository(&self) -> bool {
        let mut state = self.state.lock().await;
        info!("Cloning addon repository {}", self.url);
        match git::clone(&self.url, &self.path).await {
            Ok(handle) => {
                *state = Some(handle);
                true
            }
            Err(err) => {
                error!("Can't clone {}: {err}", self.url);
                false
            }
        }
    }

    /// Fetches and merges from the recorded remote.
    ///
    /// Never waits for the mutation lock: if another operation is in flight
    /// the pull is skipped immediately and reported as a failure.
    pub async fn pull(&self) -> bool {
        let Ok(mut state) = self.state.try_lock() else {
            warn!(
                "Skipping pull for {}: another operation is in progress",
                self.url
            );
            return false;
        };
        if state.is_none() {
            warn!("Skipping pull for {}: repository is not loaded", self.url);
            return false;
        }

        info!("Pulling addon repository {}", self.url);
        match git::pull(&self.path).await {
            Ok(()) => {
                let head = git::head_commit(&self.path).await.ok();
                if let Some(handle) = state.as_mut() {
                    handle.set_head(head);
                }
                true
            }
            Err(err) => {
                error!("Can't pull {}: {err}", self.url);
                false
            }
        }
    }

    /// Acquires the mutation lock and clears the handle, so directory
    /// deletion cannot interleave with a clone, load, or pull.
    pub(crate) async fn take_offline(&self) -> MutexGuard<'_, Option<RepoHandle>> {
        let mut state = self.state.lock().await;
        *state = None;
        state
    }
}
