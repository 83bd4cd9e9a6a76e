//! The supervisor-facing collection of addon repository mirrors.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use hearth_config::ConfigStore;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::AddonsError;
use crate::repository::{CustomRepository, OfficialRepository};
use crate::AddonsResult;

/// Owns every addon repository mirror and drives their lifecycle.
///
/// Operations against different mirrors run concurrently; serialization
/// only ever happens per mirror, inside [`crate::mirror::GitMirror`].
pub struct RepositoryStore {
    config: Arc<ConfigStore>,
    custom_root: PathBuf,
    official: OfficialRepository,
    custom: RwLock<HashMap<String, Arc<CustomRepository>>>,
}

impl RepositoryStore {
    /// Builds the store from the persisted configuration. Mirrors are not
    /// touched on disk until [`RepositoryStore::load`].
    pub fn new(config: Arc<ConfigStore>) -> Self {
        let snapshot = config.config();
        let addons_root = snapshot.get_addons_path();
        let custom_root = snapshot.get_addons_custom_path();

        let official = OfficialRepository::new(&addons_root);
        let mut custom = HashMap::new();
        for entry in config.addon_repositories() {
            let repo =
                CustomRepository::restore(config.clone(), &custom_root, &entry.url, entry.slug);
            custom.insert(entry.url, Arc::new(repo));
        }

        Self {
            config,
            custom_root,
            official,
            custom: RwLock::new(custom),
        }
    }

    pub fn official(&self) -> &OfficialRepository {
        &self.official
    }

    pub async fn custom(&self, url: &str) -> Option<Arc<CustomRepository>> {
        self.custom.read().await.get(url).cloned()
    }

    pub async fn custom_urls(&self) -> Vec<String> {
        self.custom.read().await.keys().cloned().collect()
    }

    /// Clones-or-opens every mirror.
    ///
    /// Individual failures are logged by the mirrors and never abort the
    /// others; a repository that fails to load stays registered and can be
    /// retried on the next load.
    pub async fn load(&self) -> AddonsResult<()> {
        hearth_utils::fs::ensure_dir_exists(&self.custom_root)?;

        let customs = self.custom_repositories().await;
        let (official_ok, results) = tokio::join!(
            self.official.load(),
            join_all(customs.iter().map(|repo| repo.load()))
        );

        let loaded = results.iter().filter(|ok| **ok).count() + usize::from(official_ok);
        info!(
            "Loaded {loaded} of {} addon repositories",
            customs.len() + 1
        );
        Ok(())
    }

    /// Pulls every mirror; busy or failed mirrors are skipped with a log.
    pub async fn refresh(&self) {
        let customs = self.custom_repositories().await;
        let (official_ok, results) = tokio::join!(
            self.official.pull(),
            join_all(customs.iter().map(|repo| repo.pull()))
        );

        let refreshed = results.iter().filter(|ok| **ok).count() + usize::from(official_ok);
        info!(
            "Refreshed {refreshed} of {} addon repositories",
            customs.len() + 1
        );
    }

    /// Registers and clones a new custom repository.
    ///
    /// The returned boolean is the clone result; a failed clone leaves the
    /// registration in place so a later [`RepositoryStore::load`] can retry.
    pub async fn add(&self, url: &str) -> AddonsResult<bool> {
        let repo = {
            let mut custom = self.custom.write().await;
            let repo = Arc::new(CustomRepository::register(
                self.config.clone(),
                &self.custom_root,
                url,
            )?);
            custom.insert(url.to_string(), repo.clone());
            repo
        };

        Ok(repo.load().await)
    }

    /// Detaches a custom repository and terminally removes it.
    pub async fn remove(&self, url: &str) -> AddonsResult<bool> {
        let Some(repo) = self.custom.write().await.remove(url) else {
            return Err(AddonsError::UnknownRepository(url.to_string()));
        };
        repo.remove().await
    }

    async fn custom_repositories(&self) -> Vec<Arc<CustomRepository>> {
        self.custom.read().await.values().cloned().collect()
    }
}
