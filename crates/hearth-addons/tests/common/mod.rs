//! Shared fixtures: a temporary supervisor data layout plus local git
//! repositories to mirror.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use hearth_config::ConfigStore;
use tempfile::TempDir;

pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Creates a git repository with one committed file.
pub fn init_source_repo(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    git(dir, &["init"]);
    git(dir, &["config", "user.email", "tests@hearth.sh"]);
    git(dir, &["config", "user.name", "Hearth Tests"]);
    commit_file(dir, "README.md", "addon catalog", "initial commit");
}

pub fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    std::fs::write(dir.join(name), content).unwrap();
    git(dir, &["add", "."]);
    git(dir, &["-c", "commit.gpgsign=false", "commit", "-m", message]);
}

pub fn head_commit(dir: &Path) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["rev-parse", "HEAD"])
        .output()
        .expect("failed to run git");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub struct TestEnv {
    pub tmp: TempDir,
    pub config: Arc<ConfigStore>,
    pub source: PathBuf,
}

impl TestEnv {
    pub fn source_url(&self) -> String {
        self.source.to_string_lossy().into_owned()
    }

    pub fn custom_root(&self) -> PathBuf {
        self.config.config().get_addons_custom_path()
    }
}

/// A config file pointing at a temporary data directory, plus an upstream
/// repository to register.
pub fn test_env() -> TestEnv {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    let config_path = tmp.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("data_path = \"{}\"\n", data.display()),
    )
    .unwrap();

    let config = Arc::new(ConfigStore::load(&config_path).unwrap());
    let source = tmp.path().join("source");
    init_source_repo(&source);

    TestEnv {
        tmp,
        config,
        source,
    }
}
