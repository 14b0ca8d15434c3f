//! Release descriptor: the complete resumable state of one release attempt.

use indexmap::IndexMap;
use rel_common::{ProjectKey, ScmIdentity, VersionPair};
use serde::{Deserialize, Serialize};

/// In-memory record of one release attempt's configuration and progress.
///
/// A descriptor is constructed with [`Descriptor::default`], populated
/// through its fields and mapping methods, optionally merged with a
/// persisted copy by the store, and handed to the codec for serialization.
/// It owns no external resources.
///
/// Equality covers every scalar field and every mapping entry, including
/// entries explicitly mapped to no SCM identity, which are distinct from
/// entries that are absent altogether.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Name of the last phase that ran to completion. This is how an
    /// interrupted release knows where to resume.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_phase: Option<String>,

    /// Server id used to look up SCM credentials in build settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_id: Option<String>,

    /// URL of the source repository the release operates on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_source_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_private_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_private_key_passphrase: Option<String>,

    /// Base path under which release tags are created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_tag_base: Option<String>,

    /// Format string used to derive tag names from the project version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_tag_name_format: Option<String>,

    /// Base path under which release branches are created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_branch_base: Option<String>,

    /// Tag or branch name this release is labelled with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm_release_label: Option<String>,

    /// Extra arguments passed through to the forked builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_arguments: Option<String>,

    /// Goals run while preparing the release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation_goals: Option<String>,

    /// Goals run after the release is performed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_goals: Option<String>,

    /// Non-standard project descriptor file name, when one is in use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pom_file_name: Option<String>,

    /// Working directory of the checkout. Runtime-only: the codec never
    /// persists it, and the store re-applies it after reading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,

    /// Whether release POMs are generated alongside the originals.
    #[serde(default)]
    pub generate_release_poms: bool,

    /// Whether files are unlocked through SCM edit mode before rewriting.
    #[serde(default)]
    pub use_edit_mode: bool,

    /// Whether the release prompts the user. Defaults to true, unlike the
    /// other flags.
    #[serde(default = "default_true")]
    pub interactive: bool,

    /// Whether XML schema declarations are added to rewritten descriptors.
    #[serde(default)]
    pub add_schema: bool,

    /// Version each project releases as, by coordinate.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub release_versions: IndexMap<ProjectKey, String>,

    /// Version each project moves to after the release, by coordinate.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub development_versions: IndexMap<ProjectKey, String>,

    /// Original SCM identity of each project before the release rewrote it.
    /// An entry of `None` records that the project carried no identity of
    /// its own, which is not the same as the coordinate being unmapped.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub original_scm_info: IndexMap<ProjectKey, Option<ScmIdentity>>,

    /// Resolved versions of snapshot dependencies, by coordinate.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub resolved_snapshot_dependencies: IndexMap<ProjectKey, VersionPair>,
}

fn default_true() -> bool {
    true
}

impl Default for Descriptor {
    fn default() -> Self {
        Descriptor {
            completed_phase: None,
            scm_id: None,
            scm_source_url: None,
            scm_username: None,
            scm_password: None,
            scm_private_key: None,
            scm_private_key_passphrase: None,
            scm_tag_base: None,
            scm_tag_name_format: None,
            scm_branch_base: None,
            scm_release_label: None,
            additional_arguments: None,
            preparation_goals: None,
            completion_goals: None,
            pom_file_name: None,
            working_directory: None,
            generate_release_poms: false,
            use_edit_mode: false,
            interactive: true,
            add_schema: false,
            release_versions: IndexMap::new(),
            development_versions: IndexMap::new(),
            original_scm_info: IndexMap::new(),
            resolved_snapshot_dependencies: IndexMap::new(),
        }
    }
}

impl Descriptor {
    /// Record the version a project releases as.
    pub fn map_release_version(&mut self, key: ProjectKey, version: impl Into<String>) {
        self.release_versions.insert(key, version.into());
    }

    /// Record the version a project moves to after the release.
    pub fn map_development_version(&mut self, key: ProjectKey, version: impl Into<String>) {
        self.development_versions.insert(key, version.into());
    }

    /// Record the original SCM identity of a project, or `None` to note
    /// that the project carried no identity of its own.
    pub fn map_original_scm_info(&mut self, key: ProjectKey, scm: Option<ScmIdentity>) {
        self.original_scm_info.insert(key, scm);
    }

    /// Record the resolved release/development versions of a snapshot
    /// dependency.
    pub fn map_resolved_snapshot_dependency(&mut self, key: ProjectKey, versions: VersionPair) {
        self.resolved_snapshot_dependencies.insert(key, versions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_interactive_true_and_empty_maps() {
        let descriptor = Descriptor::default();
        assert!(descriptor.interactive);
        assert!(!descriptor.generate_release_poms);
        assert!(!descriptor.use_edit_mode);
        assert!(!descriptor.add_schema);
        assert!(descriptor.completed_phase.is_none());
        assert!(descriptor.working_directory.is_none());
        assert!(descriptor.release_versions.is_empty());
        assert!(descriptor.development_versions.is_empty());
        assert!(descriptor.original_scm_info.is_empty());
        assert!(descriptor.resolved_snapshot_dependencies.is_empty());
    }

    #[test]
    fn mapping_helpers_insert_entries() {
        let mut descriptor = Descriptor::default();
        let key = ProjectKey::new("org.example", "widget");
        descriptor.map_release_version(key.clone(), "1.0");
        descriptor.map_development_version(key.clone(), "1.1-SNAPSHOT");
        descriptor.map_resolved_snapshot_dependency(
            ProjectKey::new("external", "dep"),
            VersionPair::new("2.0", "2.1-SNAPSHOT"),
        );

        assert_eq!(descriptor.release_versions[&key], "1.0");
        assert_eq!(descriptor.development_versions[&key], "1.1-SNAPSHOT");
        assert_eq!(
            descriptor.resolved_snapshot_dependencies[&ProjectKey::new("external", "dep")],
            VersionPair::new("2.0", "2.1-SNAPSHOT")
        );
    }

    #[test]
    fn explicit_null_scm_entry_differs_from_absence() {
        let key = ProjectKey::new("org.example", "widget");

        let mut with_null = Descriptor::default();
        with_null.map_original_scm_info(key.clone(), None);

        let without = Descriptor::default();

        assert_ne!(with_null, without);
        assert_eq!(with_null.original_scm_info.get(&key), Some(&None));
        assert_eq!(without.original_scm_info.get(&key), None);
    }

    #[test]
    fn equality_covers_boolean_defaults() {
        let mut a = Descriptor::default();
        let b = Descriptor::default();
        a.interactive = false;
        assert_ne!(a, b);
    }
}
