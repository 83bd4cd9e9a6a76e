//! Official and user-registered addon repositories.

use std::path::Path;
use std::sync::Arc;

use hearth_config::ConfigStore;
use tracing::{info, warn};

use crate::constants::{OFFICIAL_REPOSITORY_DIR, OFFICIAL_REPOSITORY_URL, SLUG_PREFIX};
use crate::error::AddonsError;
use crate::git;
use crate::mirror::GitMirror;
use crate::AddonsResult;

/// The built-in addon catalog.
///
/// Fixes the mirror's URL and path to supervisor-wide constants; adds no
/// behavior of its own. Created once at startup and never removed.
pub struct OfficialRepository {
    mirror: GitMirror,
}

impl OfficialRepository {
    pub fn new(addons_root: &Path) -> Self {
        Self {
            mirror: GitMirror::new(
                addons_root.join(OFFICIAL_REPOSITORY_DIR),
                OFFICIAL_REPOSITORY_URL,
            ),
        }
    }

    pub fn mirror(&self) -> &GitMirror {
        &self.mirror
    }

    pub async fn load(&self) -> bool {
        self.mirror.load().await
    }

    pub async fn pull(&self) -> bool {
        self.mirror.pull().await
    }
}

/// A user-registered addon repository.
pub struct CustomRepository {
    mirror: GitMirror,
    slug: String,
    config: Arc<ConfigStore>,
}

impl CustomRepository {
    /// Registers a new repository: allocates a fresh slug and persists the
    /// `(url, slug)` mapping before anything touches the mirror directory.
    pub fn register(
        config: Arc<ConfigStore>,
        custom_root: &Path,
        url: &str,
    ) -> AddonsResult<Self> {
        if !git::is_valid_repository_url(url) {
            return Err(AddonsError::InvalidRepositoryUrl(url.to_string()));
        }

        let slug = allocate_slug(custom_root)?;
        info!("Registering custom addon repository {url} as {slug}");
        config.add_addon_repository(url, &slug)?;

        Ok(Self::restore(config, custom_root, url, slug))
    }

    /// Rebuilds a repository from its persisted entry; no registration call
    /// is made.
    pub fn restore(
        config: Arc<ConfigStore>,
        custom_root: &Path,
        url: &str,
        slug: impl Into<String>,
    ) -> Self {
        let slug = slug.into();
        Self {
            mirror: GitMirror::new(custom_root.join(&slug), url),
            slug,
            config,
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn url(&self) -> &str {
        self.mirror.url()
    }

    pub fn mirror(&self) -> &GitMirror {
        &self.mirror
    }

    pub async fn load(&self) -> bool {
        self.mirror.load().await
    }

    pub async fn pull(&self) -> bool {
        self.mirror.pull().await
    }

    /// Deletes the local mirror and deregisters the URL.
    ///
    /// Disk cleanup is best-effort: entries that cannot be deleted are
    /// logged and skipped, and the config entry is dropped regardless of the
    /// outcome. Returns whether the cleanup was complete. Terminal: callers
    /// must discard the repository afterwards.
    pub async fn remove(&self) -> AddonsResult<bool> {
        let _state = self.mirror.take_offline().await;

        let path = self.mirror.path().to_path_buf();
        let mut clean = true;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!("Removing custom addon repository {}", self.url());
            let failures =
                match tokio::task::spawn_blocking(move || {
                    hearth_utils::fs::remove_tree_best_effort(&path)
                })
                .await
                {
                    Ok(failures) => failures,
                    Err(err) => {
                        warn!("Removal task for {} failed: {err}", self.url());
                        clean = false;
                        Vec::new()
                    }
                };

            for failure in &failures {
                warn!("Can't remove {}: {}", failure.path.display(), failure.source);
            }
            clean &= failures.is_empty();
        }

        self.config.drop_addon_repository(self.url())?;
        Ok(clean)
    }
}

/// Allocates a fresh unique directory name under the custom addons root.
///
/// The temporary directory is discarded immediately. Only its name is
/// kept, so the later clone creates the path itself.
fn allocate_slug(custom_root: &Path) -> AddonsResult<String> {
    hearth_utils::fs::ensure_dir_exists(custom_root)?;

    let dir = tempfile::Builder::new()
        .prefix(SLUG_PREFIX)
        .tempdir_in(custom_root)
        .map_err(|source| AddonsError::SlugAllocation {
            path: custom_root.to_path_buf(),
            source,
        })?;

    dir.path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AddonsError::SlugAllocation {
            path: custom_root.to_path_buf(),
            source: std::io::Error::other("empty directory name"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store(dir: &Path) -> Arc<ConfigStore> {
        Arc::new(ConfigStore::load(dir.join("config.toml")).unwrap())
    }

    #[test]
    fn test_allocate_slug_is_fresh_every_time() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("custom");

        let first = allocate_slug(&root).unwrap();
        let second = allocate_slug(&root).unwrap();

        assert!(first.starts_with(SLUG_PREFIX));
        assert_ne!(first, second);
        // Only the name is kept; the directory itself must be gone.
        assert!(!root.join(&first).exists());
    }

    #[test]
    fn test_register_rejects_invalid_url() {
        let dir = tempdir().unwrap();
        let config = test_store(dir.path());
        let result = CustomRepository::register(config, &dir.path().join("custom"), "nonsense");
        assert!(matches!(result, Err(AddonsError::InvalidRepositoryUrl(_))));
    }

    #[test]
    fn test_register_persists_before_clone() {
        let dir = tempdir().unwrap();
        let config = test_store(dir.path());
        let custom_root = dir.path().join("custom");

        let repo = CustomRepository::register(
            config.clone(),
            &custom_root,
            "https://example.com/addons.git",
        )
        .unwrap();

        let entries = config.addon_repositories();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/addons.git");
        assert_eq!(entries[0].slug, repo.slug());
        // Nothing has been cloned yet.
        assert!(!repo.mirror().path().exists());
    }

    #[test]
    fn test_restore_derives_path_from_slug() {
        let dir = tempdir().unwrap();
        let config = test_store(dir.path());
        let custom_root = dir.path().join("custom");

        let repo = CustomRepository::restore(
            config,
            &custom_root,
            "https://example.com/addons.git",
            "rep_abc123",
        );
        assert_eq!(repo.mirror().path(), custom_root.join("rep_abc123"));
        assert_eq!(repo.slug(), "rep_abc123");
    }

    #[tokio::test]
    async fn test_remove_deregisters_even_without_directory() {
        let dir = tempdir().unwrap();
        let config = test_store(dir.path());
        let custom_root = dir.path().join("custom");

        let repo = CustomRepository::register(
            config.clone(),
            &custom_root,
            "https://example.com/addons.git",
        )
        .unwrap();

        assert!(repo.remove().await.unwrap());
        assert!(config.addon_repositories().is_empty());
    }
}
