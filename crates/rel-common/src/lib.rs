//! Release state shared types.
//!
//! This crate provides foundational types shared across rel-core modules:
//! - Project coordinate keys used by the version and SCM mappings
//! - SCM identity and resolved-version value records

pub mod id;
pub mod scm;

pub use id::ProjectKey;
pub use scm::{ScmIdentity, VersionPair};
