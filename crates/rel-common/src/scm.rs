//! SCM identity and resolved-version value records.

use serde::{Deserialize, Serialize};

/// Source-control identity recorded for a project before the release
/// rewrites it. Every field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmIdentity {
    /// Server id used to look up credentials in build settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Read-only connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,

    /// Read-write connection string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_connection: Option<String>,

    /// Browsable repository URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Tag the project was checked out from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl ScmIdentity {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.connection.is_none()
            && self.developer_connection.is_none()
            && self.url.is_none()
            && self.tag.is_none()
    }
}

/// Release/development version pair resolved for a snapshot dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPair {
    /// Version the dependency is released as.
    pub release: String,

    /// Version the dependency moves to after the release.
    pub development: String,
}

impl VersionPair {
    pub fn new(release: &str, development: &str) -> Self {
        VersionPair {
            release: release.to_string(),
            development: development.to_string(),
        }
    }
}
