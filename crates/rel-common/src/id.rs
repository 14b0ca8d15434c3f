//! Project coordinate identity.
//!
//! A project is addressed by an opaque `group:artifact` coordinate. Both
//! parts routinely contain `.` characters, so a key is never tokenized;
//! consumers carry it around as a single opaque string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque project coordinate in `group:artifact` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectKey(pub String);

impl ProjectKey {
    /// Build a key from its group and artifact parts.
    pub fn new(group_id: &str, artifact_id: &str) -> Self {
        ProjectKey(format!("{}:{}", group_id, artifact_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProjectKey {
    fn from(key: &str) -> Self {
        ProjectKey(key.to_string())
    }
}

impl From<String> for ProjectKey {
    fn from(key: String) -> Self {
        ProjectKey(key)
    }
}
