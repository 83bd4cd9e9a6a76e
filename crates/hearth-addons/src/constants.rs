//! Constants used throughout hearth-addons.

/// Remote URL of the built-in addon catalog.
pub const OFFICIAL_REPOSITORY_URL: &str = "https://github.com/hearth-sh/addons";

/// Directory name of the built-in catalog mirror under the addons root.
pub const OFFICIAL_REPOSITORY_DIR: &str = "core";

/// Prefix of generated custom repository slugs.
pub const SLUG_PREFIX: &str = "rep_";
