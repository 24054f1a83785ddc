//! Cache namespaces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of three isolated cache namespaces.
///
/// Entries written under one scope are invisible from the others.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// Broadest namespace, shared by every caller.
    #[default]
    Script,
    /// Per-document namespace.
    Document,
    /// Per-user namespace.
    User,
}

impl CacheScope {
    pub const ALL: [CacheScope; 3] = [CacheScope::Script, CacheScope::Document, CacheScope::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            CacheScope::Script => "script",
            CacheScope::Document => "document",
            CacheScope::User => "user",
        }
    }

    /// Resolve a selector string; anything unrecognized selects the default scope.
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim().to_ascii_lowercase().as_str() {
            "document" => CacheScope::Document,
            "user" => CacheScope::User,
            "script" => CacheScope::Script,
            other => {
                tracing::debug!(selector = other, "unrecognized cache scope, using default");
                CacheScope::default()
            }
        }
    }
}

impl From<&str> for CacheScope {
    fn from(selector: &str) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for CacheScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
