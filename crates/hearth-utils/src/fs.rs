use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

/// Creates a directory structure if it doesn't exist.
///
/// If the directory already exists, this function does nothing. If the path
/// exists but is not a directory, an error is returned.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if the path exists but is not a directory.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|err| FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source: err,
        })?;
    } else if !path.is_dir() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

/// A single entry that could not be deleted during a tree removal.
#[derive(Debug)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Recursively deletes a directory tree, continuing past entries that cannot
/// be removed.
///
/// Every failed deletion is collected and returned so the caller can decide
/// how to report it. A path that does not exist yields no failures. Symlinks
/// are removed, never followed.
pub fn remove_tree_best_effort<P: AsRef<Path>>(path: P) -> Vec<RemovalFailure> {
    let path = path.as_ref();
    let mut failures = Vec::new();

    if path.symlink_metadata().is_err() {
        return failures;
    }

    remove_tree_inner(path, &mut failures);
    failures
}

fn remove_tree_inner(dir: &Path, failures: &mut Vec<RemovalFailure>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            failures.push(RemovalFailure {
                path: dir.to_path_buf(),
                source,
            });
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|kind| kind.is_dir())
            .unwrap_or(false);

        if is_dir {
            remove_tree_inner(&path, failures);
        } else if let Err(source) = fs::remove_file(&path) {
            failures.push(RemovalFailure { path, source });
        }
    }

    if let Err(source) = fs::remove_dir(dir) {
        failures.push(RemovalFailure {
            path: dir.to_path_buf(),
            source,
        });
    }
}
