//! Error types for hearth-addons.

use std::path::PathBuf;

use hearth_config::error::ConfigError;
use hearth_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

/// Core error type for addon repository operations.
#[derive(Error, Diagnostic, Debug)]
pub enum AddonsError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(
        code(hearth::filesystem),
        help("Check permissions on the addons data directory")
    )]
    FileSystem(#[from] FileSystemError),

    #[error("Error while {action}")]
    #[diagnostic(code(hearth::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git command not found")]
    #[diagnostic(
        code(hearth::git_missing),
        help("Install git and make sure it is in PATH")
    )]
    GitNotFound,

    #[error("git {action} failed: {stderr}")]
    #[diagnostic(
        code(hearth::git),
        help("Check the repository URL and network connectivity")
    )]
    GitCommand {
        action: &'static str,
        stderr: String,
    },

    #[error("`{}` is not a git repository", path.display())]
    #[diagnostic(
        code(hearth::invalid_repository),
        help("Remove the directory to let the supervisor re-clone it")
    )]
    InvalidRepository { path: PathBuf },

    #[error("`{}` tracks `{found}` instead of `{expected}`", path.display())]
    #[diagnostic(
        code(hearth::remote_mismatch),
        help("Remove the directory to let the supervisor re-clone it")
    )]
    RemoteMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Invalid repository URL: {0}")]
    #[diagnostic(
        code(hearth::invalid_url),
        help("Use an http(s), ssh, or absolute local path URL")
    )]
    InvalidRepositoryUrl(String),

    #[error("Unknown custom repository: {0}")]
    #[diagnostic(
        code(hearth::unknown_repository),
        help("Check the URL against the registered repositories")
    )]
    UnknownRepository(String),

    #[error("Failed to allocate a repository slug under `{}`", path.display())]
    #[diagnostic(
        code(hearth::slug),
        help("Check permissions on the custom addons directory")
    )]
    SlugAllocation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
