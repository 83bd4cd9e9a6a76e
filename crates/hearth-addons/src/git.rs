//! Async git plumbing for repository mirrors.
//!
//! Every operation shells out to the `git` binary through
//! [`tokio::process::Command`], so no disk or network work ever runs on the
//! caller's scheduler thread. Terminal credential prompts are disabled: a
//! remote that wants credentials fails the operation instead of blocking it.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::{error::AddonsError, AddonsResult};

/// Metadata captured from an opened repository.
///
/// Distinct from the on-disk files: holding a handle does not pin the
/// working copy in any way.
#[derive(Debug, Clone)]
pub struct RepoHandle {
    origin: String,
    head: Option<String>,
}

impl RepoHandle {
    /// URL of the `origin` remote as git reports it.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Commit id of `HEAD`, absent for an empty repository.
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    pub(crate) fn set_head(&mut self, head: Option<String>) {
        self.head = head;
    }
}

async fn run(mut cmd: Command, action: &'static str) -> AddonsResult<String> {
    debug!("Running: git {action}");
    let output = cmd
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await
        .map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => AddonsError::GitNotFound,
            _ => AddonsError::IoError {
                action: format!("running git {action}"),
                source: err,
            },
        })?;

    if !output.status.success() {
        return Err(AddonsError::GitCommand {
            action,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clones `url` into `path` and opens the resulting repository.
pub async fn clone(url: &str, path: &Path) -> AddonsResult<RepoHandle> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg(url).arg(path);
    run(cmd, "clone").await?;
    open(path, url).await
}

/// Opens an existing directory as a repository mirror of `expected_url`.
///
/// The directory must be the top level of a git working copy whose `origin`
/// remote matches the expected URL.
pub async fn open(path: &Path, expected_url: &str) -> AddonsResult<RepoHandle> {
    let mut cmd = Command::new("git");
    cmd.current_dir(path).args(["rev-parse", "--show-toplevel"]);
    let toplevel = match run(cmd, "rev-parse").await {
        Ok(out) => out,
        Err(AddonsError::GitCommand { .. }) => {
            return Err(AddonsError::InvalidRepository {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err),
    };

    // A path nested inside some unrelated repository must not pass as one.
    let canonical = canonicalize(path).await?;
    if canonicalize(Path::new(&toplevel)).await? != canonical {
        return Err(AddonsError::InvalidRepository {
            path: path.to_path_buf(),
        });
    }

    let mut cmd = Command::new("git");
    cmd.current_dir(path).args(["remote", "get-url", "origin"]);
    let origin = match run(cmd, "remote").await {
        Ok(url) => url,
        Err(AddonsError::GitCommand { .. }) => {
            return Err(AddonsError::InvalidRepository {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err),
    };

    if !urls_match(&origin, expected_url) {
        return Err(AddonsError::RemoteMismatch {
            path: path.to_path_buf(),
            expected: expected_url.to_string(),
            found: origin,
        });
    }

    let head = head_commit(path).await.ok();
    Ok(RepoHandle { origin, head })
}

/// Fetches and merges from the recorded remote.
pub async fn pull(path: &Path) -> AddonsResult<()> {
    let mut cmd = Command::new("git");
    cmd.current_dir(path).arg("pull");
    run(cmd, "pull").await?;
    Ok(())
}

/// Commit id of `HEAD`; fails on an empty repository.
pub async fn head_commit(path: &Path) -> AddonsResult<String> {
    let mut cmd = Command::new("git");
    cmd.current_dir(path).args(["rev-parse", "HEAD"]);
    run(cmd, "rev-parse").await
}

async fn canonicalize(path: &Path) -> AddonsResult<PathBuf> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|source| AddonsError::IoError {
            action: format!("resolving `{}`", path.display()),
            source,
        })
}

/// Whether `value` looks like a cloneable repository URL.
///
/// Accepts http(s), ssh and git schemes, scp-like `git@host:repo` remotes,
/// and absolute local paths.
pub fn is_valid_repository_url(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    if value.starts_with("git@") {
        return value.contains(':');
    }
    if Path::new(value).is_absolute() {
        return true;
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "ssh" | "git" | "file"),
        Err(_) => false,
    }
}

fn urls_match(found: &str, expected: &str) -> bool {
    normalize_url(found) == normalize_url(expected)
}

fn normalize_url(url: &str) -> &str {
    url.trim_end_matches('/').trim_end_matches(".git")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_repository_url() {
        assert!(is_valid_repository_url("https://github.com/user/repo.git"));
        assert!(is_valid_repository_url("http://example.com/repo.git"));
        assert!(is_valid_repository_url("ssh://git@example.com/repo.git"));
        assert!(is_valid_repository_url("git@github.com:user/repo.git"));
        assert!(is_valid_repository_url("/srv/mirrors/repo"));
        assert!(!is_valid_repository_url("not-a-url"));
        assert!(!is_valid_repository_url("relative/path"));
        assert!(!is_valid_repository_url(""));
    }

    #[test]
    fn test_urls_match_ignores_suffixes() {
        assert!(urls_match(
            "https://example.com/repo.git",
            "https://example.com/repo"
        ));
        assert!(urls_match(
            "https://example.com/repo/",
            "https://example.com/repo"
        ));
        assert!(!urls_match(
            "https://example.com/other",
            "https://example.com/repo"
        ));
    }
}
