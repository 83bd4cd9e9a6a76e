//! Persisted custom repository entries.

use serde::{Deserialize, Serialize};

/// A user-registered addon repository.
///
/// The supervisor keeps one entry per registered git URL. The slug is the
/// name of the local mirror directory under the custom addons root; it is
/// assigned once at registration and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryEntry {
    /// Git URL the mirror tracks.
    pub url: String,

    /// Local directory name of the mirror.
    pub slug: String,
}

impl RepositoryEntry {
    pub fn new(url: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            slug: slug.into(),
        }
    }
}
