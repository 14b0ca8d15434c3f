//! Resumable release state: descriptor model, flat-file codec, and store.
//!
//! A release runs as a sequence of phases that may be interrupted and
//! resumed later. This crate persists the state of one release attempt as a
//! flat key/value text file (`release.properties`) inside the project's
//! working directory, and reconciles that persisted state with
//! caller-supplied overrides when the release resumes:
//!
//! - [`descriptor`]: the in-memory record of configuration and progress
//! - [`codec`]: encode/decode for the flat text format, safe against
//!   reserved characters appearing inside project coordinates
//! - [`store`]: file I/O, the per-field merge policy, and delete semantics

pub mod codec;
pub mod descriptor;
pub mod store;

pub use descriptor::Descriptor;
pub use store::{DescriptorStore, Field, MergePolicy, StoreError, RELEASE_STATE_FILE};
