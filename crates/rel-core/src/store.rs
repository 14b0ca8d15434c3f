//! File-backed persistence and merge orchestration for release descriptors.
//!
//! The store is the only component that touches the filesystem. It is also
//! the single place where a missing file is normalized into an empty
//! result: existence is checked explicitly before reading, never inferred
//! from a failed open. Operations are synchronous and assume a single
//! reader/writer per file path.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rel_common::ProjectKey;
use thiserror::Error;
use tracing::{debug, trace};

use crate::codec::{self, CodecError};
use crate::descriptor::Descriptor;

/// Well-known file name holding the release state inside a working
/// directory.
pub const RELEASE_STATE_FILE: &str = "release.properties";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("descriptor has no working directory to resolve the state file against")]
    NoWorkingDirectory,
}

// ── Merge policy ────────────────────────────────────────────────────────

/// How a field reconciles when a caller-supplied seed meets a persisted
/// descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// The seed's value wins whenever the seed carries a non-default value.
    PreferSeed,
    /// The persisted value always wins; a seed cannot override it.
    AlwaysFromFile,
}

/// Descriptor fields named by the merge policy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CompletedPhase,
    ScmId,
    ScmSourceUrl,
    ScmUsername,
    ScmPassword,
    ScmPrivateKey,
    ScmPrivateKeyPassphrase,
    ScmTagBase,
    ScmTagNameFormat,
    ScmBranchBase,
    ScmReleaseLabel,
    AdditionalArguments,
    PreparationGoals,
    CompletionGoals,
    PomFileName,
    WorkingDirectory,
    GenerateReleasePoms,
    UseEditMode,
    Interactive,
    AddSchema,
    ReleaseVersions,
    DevelopmentVersions,
    OriginalScmInfo,
    ResolvedSnapshotDependencies,
}

/// The per-field override policy, kept in one table so it can be audited
/// and tested apart from the read/write mechanics. Resumption progress is
/// the one thing a caller can never override: `completed_phase` must
/// reflect what actually happened on disk.
pub fn merge_policy(field: Field) -> MergePolicy {
    match field {
        Field::CompletedPhase => MergePolicy::AlwaysFromFile,
        _ => MergePolicy::PreferSeed,
    }
}

/// Merge a caller-supplied seed with a persisted descriptor under the
/// per-field policy. A persisted descriptor indistinguishable from the
/// default has nothing to contribute and leaves the seed untouched.
pub fn merge(seed: &Descriptor, persisted: &Descriptor) -> Descriptor {
    if *persisted == Descriptor::default() {
        return seed.clone();
    }

    let mut merged = seed.clone();

    merged.completed_phase = merge_scalar(
        Field::CompletedPhase,
        &seed.completed_phase,
        &persisted.completed_phase,
    );
    merged.scm_id = merge_scalar(Field::ScmId, &seed.scm_id, &persisted.scm_id);
    merged.scm_source_url = merge_scalar(
        Field::ScmSourceUrl,
        &seed.scm_source_url,
        &persisted.scm_source_url,
    );
    merged.scm_username = merge_scalar(
        Field::ScmUsername,
        &seed.scm_username,
        &persisted.scm_username,
    );
    merged.scm_password = merge_scalar(
        Field::ScmPassword,
        &seed.scm_password,
        &persisted.scm_password,
    );
    merged.scm_private_key = merge_scalar(
        Field::ScmPrivateKey,
        &seed.scm_private_key,
        &persisted.scm_private_key,
    );
    merged.scm_private_key_passphrase = merge_scalar(
        Field::ScmPrivateKeyPassphrase,
        &seed.scm_private_key_passphrase,
        &persisted.scm_private_key_passphrase,
    );
    merged.scm_tag_base = merge_scalar(
        Field::ScmTagBase,
        &seed.scm_tag_base,
        &persisted.scm_tag_base,
    );
    merged.scm_tag_name_format = merge_scalar(
        Field::ScmTagNameFormat,
        &seed.scm_tag_name_format,
        &persisted.scm_tag_name_format,
    );
    merged.scm_branch_base = merge_scalar(
        Field::ScmBranchBase,
        &seed.scm_branch_base,
        &persisted.scm_branch_base,
    );
    merged.scm_release_label = merge_scalar(
        Field::ScmReleaseLabel,
        &seed.scm_release_label,
        &persisted.scm_release_label,
    );
    merged.additional_arguments = merge_scalar(
        Field::AdditionalArguments,
        &seed.additional_arguments,
        &persisted.additional_arguments,
    );
    merged.preparation_goals = merge_scalar(
        Field::PreparationGoals,
        &seed.preparation_goals,
        &persisted.preparation_goals,
    );
    merged.completion_goals = merge_scalar(
        Field::CompletionGoals,
        &seed.completion_goals,
        &persisted.completion_goals,
    );
    merged.pom_file_name = merge_scalar(
        Field::PomFileName,
        &seed.pom_file_name,
        &persisted.pom_file_name,
    );
    merged.working_directory = merge_scalar(
        Field::WorkingDirectory,
        &seed.working_directory,
        &persisted.working_directory,
    );

    merged.generate_release_poms = merge_flag(
        Field::GenerateReleasePoms,
        seed.generate_release_poms,
        persisted.generate_release_poms,
        false,
    );
    merged.use_edit_mode = merge_flag(
        Field::UseEditMode,
        seed.use_edit_mode,
        persisted.use_edit_mode,
        false,
    );
    merged.interactive = merge_flag(
        Field::Interactive,
        seed.interactive,
        persisted.interactive,
        true,
    );
    merged.add_schema = merge_flag(Field::AddSchema, seed.add_schema, persisted.add_schema, false);

    merged.release_versions = merge_map(
        Field::ReleaseVersions,
        &seed.release_versions,
        &persisted.release_versions,
    );
    merged.development_versions = merge_map(
        Field::DevelopmentVersions,
        &seed.development_versions,
        &persisted.development_versions,
    );
    merged.original_scm_info = merge_map(
        Field::OriginalScmInfo,
        &seed.original_scm_info,
        &persisted.original_scm_info,
    );
    merged.resolved_snapshot_dependencies = merge_map(
        Field::ResolvedSnapshotDependencies,
        &seed.resolved_snapshot_dependencies,
        &persisted.resolved_snapshot_dependencies,
    );

    merged
}

fn merge_scalar(
    field: Field,
    seed: &Option<String>,
    persisted: &Option<String>,
) -> Option<String> {
    match merge_policy(field) {
        MergePolicy::AlwaysFromFile => persisted.clone(),
        MergePolicy::PreferSeed => seed.clone().or_else(|| persisted.clone()),
    }
}

fn merge_flag(field: Field, seed: bool, persisted: bool, default: bool) -> bool {
    match merge_policy(field) {
        MergePolicy::AlwaysFromFile => persisted,
        MergePolicy::PreferSeed => {
            if seed != default {
                seed
            } else {
                persisted
            }
        }
    }
}

/// Mapping merges are per-entry: start from the persisted entries, then
/// overlay the seed's, so a seed entry wins a coordinate conflict while
/// persisted-only coordinates survive.
fn merge_map<V: Clone>(
    field: Field,
    seed: &IndexMap<ProjectKey, V>,
    persisted: &IndexMap<ProjectKey, V>,
) -> IndexMap<ProjectKey, V> {
    let mut merged = match merge_policy(field) {
        MergePolicy::AlwaysFromFile => return persisted.clone(),
        MergePolicy::PreferSeed => persisted.clone(),
    };
    for (key, value) in seed {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

// ── Store ───────────────────────────────────────────────────────────────

/// Store performing file I/O and merge orchestration around the codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorStore;

impl DescriptorStore {
    pub fn new() -> Self {
        DescriptorStore
    }

    /// Read the descriptor persisted at `path`.
    ///
    /// A missing file is a normal outcome and yields a descriptor with only
    /// defaults; any other I/O failure is surfaced with the path involved.
    pub fn read_file(&self, path: &Path) -> Result<Descriptor, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no release state file, starting from defaults");
            return Ok(Descriptor::default());
        }
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        trace!(path = %path.display(), bytes = content.len(), "read release state file");
        codec::decode(&content).map_err(|source| StoreError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the descriptor from the working directory recorded in
    /// `descriptor`.
    ///
    /// The working directory is a runtime concept the codec never persists,
    /// so the input's value is copied onto the result.
    pub fn read_working_directory(
        &self,
        descriptor: &Descriptor,
    ) -> Result<Descriptor, StoreError> {
        let path = self.resolve_path(descriptor)?;
        let mut result = self.read_file(&path)?;
        result.working_directory = descriptor.working_directory.clone();
        Ok(result)
    }

    /// Read the descriptor at `path` and merge it with `seed` under the
    /// per-field policy: the persisted copy always wins for
    /// `completed_phase`, every other field keeps the seed's value whenever
    /// the seed carries one. An empty or missing file contributes nothing
    /// and the seed comes back unchanged.
    pub fn read_merged(&self, seed: &Descriptor, path: &Path) -> Result<Descriptor, StoreError> {
        let persisted = self.read_file(path)?;
        Ok(merge(seed, &persisted))
    }

    /// Encode `descriptor` and write it to `path`, creating parent
    /// directories as needed and replacing any previous content.
    pub fn write_file(&self, descriptor: &Descriptor, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = codec::encode(descriptor);
        fs::write(path, &content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "wrote release state file");
        Ok(())
    }

    /// Write the descriptor into its own working directory.
    pub fn write_working_directory(&self, descriptor: &Descriptor) -> Result<(), StoreError> {
        let path = self.resolve_path(descriptor)?;
        self.write_file(descriptor, &path)
    }

    /// Remove the state file from the descriptor's working directory.
    /// Deleting a file that does not exist is a silent success.
    pub fn delete(&self, descriptor: &Descriptor) -> Result<(), StoreError> {
        let path = self.resolve_path(descriptor)?;
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "deleted release state file");
        Ok(())
    }

    fn resolve_path(&self, descriptor: &Descriptor) -> Result<PathBuf, StoreError> {
        let dir = descriptor
            .working_directory
            .as_deref()
            .ok_or(StoreError::NoWorkingDirectory)?;
        Ok(Path::new(dir).join(RELEASE_STATE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_phase_is_the_only_file_authoritative_field() {
        assert_eq!(
            merge_policy(Field::CompletedPhase),
            MergePolicy::AlwaysFromFile
        );
        for field in [
            Field::ScmId,
            Field::ScmSourceUrl,
            Field::ScmUsername,
            Field::ScmPassword,
            Field::ScmPrivateKey,
            Field::ScmPrivateKeyPassphrase,
            Field::ScmTagBase,
            Field::ScmTagNameFormat,
            Field::ScmBranchBase,
            Field::ScmReleaseLabel,
            Field::AdditionalArguments,
            Field::PreparationGoals,
            Field::CompletionGoals,
            Field::PomFileName,
            Field::WorkingDirectory,
            Field::GenerateReleasePoms,
            Field::UseEditMode,
            Field::Interactive,
            Field::AddSchema,
            Field::ReleaseVersions,
            Field::DevelopmentVersions,
            Field::OriginalScmInfo,
            Field::ResolvedSnapshotDependencies,
        ] {
            assert_eq!(merge_policy(field), MergePolicy::PreferSeed, "{field:?}");
        }
    }

    #[test]
    fn merge_with_default_persisted_returns_seed() {
        let mut seed = Descriptor::default();
        seed.completed_phase = Some("never-persisted".to_string());
        seed.scm_source_url = Some("scm-url".to_string());

        assert_eq!(merge(&seed, &Descriptor::default()), seed);
    }

    #[test]
    fn persisted_completed_phase_overrides_seed() {
        let mut seed = Descriptor::default();
        seed.completed_phase = Some("requested".to_string());

        let mut persisted = Descriptor::default();
        persisted.completed_phase = Some("actual".to_string());

        let merged = merge(&seed, &persisted);
        assert_eq!(merged.completed_phase.as_deref(), Some("actual"));
    }

    #[test]
    fn persisted_completed_phase_fills_an_unset_seed() {
        let seed = Descriptor::default();
        let mut persisted = Descriptor::default();
        persisted.completed_phase = Some("scm-check".to_string());

        let merged = merge(&seed, &persisted);
        assert_eq!(merged.completed_phase.as_deref(), Some("scm-check"));
    }

    #[test]
    fn seed_scalars_win_over_persisted() {
        let mut seed = Descriptor::default();
        seed.scm_username = Some("caller".to_string());

        let mut persisted = Descriptor::default();
        persisted.scm_username = Some("disk".to_string());
        persisted.scm_password = Some("kept".to_string());

        let merged = merge(&seed, &persisted);
        assert_eq!(merged.scm_username.as_deref(), Some("caller"));
        assert_eq!(merged.scm_password.as_deref(), Some("kept"));
    }

    #[test]
    fn non_default_seed_flags_win() {
        let mut seed = Descriptor::default();
        seed.interactive = false;

        let mut persisted = Descriptor::default();
        persisted.interactive = true;
        persisted.use_edit_mode = true;

        let merged = merge(&seed, &persisted);
        assert!(!merged.interactive);
        assert!(merged.use_edit_mode);
    }

    #[test]
    fn map_entries_overlay_per_coordinate() {
        let shared = ProjectKey::new("g", "shared");
        let disk_only = ProjectKey::new("g", "disk");

        let mut seed = Descriptor::default();
        seed.map_release_version(shared.clone(), "2.0");

        let mut persisted = Descriptor::default();
        persisted.map_release_version(shared.clone(), "1.0");
        persisted.map_release_version(disk_only.clone(), "3.0");

        let merged = merge(&seed, &persisted);
        assert_eq!(merged.release_versions[&shared], "2.0");
        assert_eq!(merged.release_versions[&disk_only], "3.0");
    }
}
