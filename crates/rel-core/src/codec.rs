//! Flat key/value codec for release descriptors.
//!
//! The persisted form is UTF-8 text, one `key=value` pair per line. Most
//! keys are fixed constants; the four mapping families compose their keys
//! from a reserved family prefix, the project coordinate appended verbatim,
//! and (for families with sub-fields) a reserved suffix:
//!
//! ```text
//! completedPhase=package
//! scm.url=scm:git:https://host/repo.git
//! project.rel.org.example:widget=1.0
//! project.dev.org.example:widget=1.1-SNAPSHOT
//! project.scm.org.example:widget.connection=scm:git:https://host/repo.git
//! project.scm.org.example:lib.empty=true
//! dependency.org.example:dep.release=2.0
//! dependency.org.example:dep.development=2.1-SNAPSHOT
//! ```
//!
//! Coordinates routinely contain `.` and `:`, so the decoder recovers them
//! by prefix containment and suffix stripping; it never tokenizes a key on
//! `.`. The `=` separator and backslashes are the only characters escaped,
//! in keys and values alike, so that a coordinate containing `=` cannot
//! shift the separator.
//!
//! The codec is pure: it never touches the filesystem and never logs.

use rel_common::{ProjectKey, ScmIdentity, VersionPair};
use thiserror::Error;

use crate::descriptor::Descriptor;

// ── Key constants ───────────────────────────────────────────────────────

const KEY_COMPLETED_PHASE: &str = "completedPhase";
const KEY_SCM_ID: &str = "scm.id";
const KEY_SCM_URL: &str = "scm.url";
const KEY_SCM_USERNAME: &str = "scm.username";
const KEY_SCM_PASSWORD: &str = "scm.password";
const KEY_SCM_PRIVATE_KEY: &str = "scm.privateKey";
const KEY_SCM_PASSPHRASE: &str = "scm.passphrase";
const KEY_SCM_TAG_BASE: &str = "scm.tagBase";
const KEY_SCM_TAG_NAME_FORMAT: &str = "scm.tagNameFormat";
const KEY_SCM_BRANCH_BASE: &str = "scm.branchBase";
const KEY_SCM_TAG: &str = "scm.tag";
const KEY_ADDITIONAL_ARGUMENTS: &str = "exec.additionalArguments";
const KEY_PREPARATION_GOALS: &str = "preparationGoals";
const KEY_COMPLETION_GOALS: &str = "completionGoals";
const KEY_POM_FILE_NAME: &str = "exec.pomFileName";

const KEY_GENERATE_RELEASE_POMS: &str = "exec.generateReleasePoms";
const KEY_USE_EDIT_MODE: &str = "scm.useEditMode";
const KEY_INTERACTIVE: &str = "exec.interactive";
const KEY_ADD_SCHEMA: &str = "exec.addSchema";

/// Mapping family prefixes. No prefix is a prefix of another, and no scalar
/// key starts with any of them, so prefix containment identifies the family
/// unambiguously.
pub const PREFIX_RELEASE_VERSION: &str = "project.rel.";
pub const PREFIX_DEVELOPMENT_VERSION: &str = "project.dev.";
pub const PREFIX_SCM_INFO: &str = "project.scm.";
pub const PREFIX_DEPENDENCY: &str = "dependency.";

/// `project.scm.` sub-field suffixes. None is a suffix of another, so at
/// most one can match a composed key; they are still checked longest first.
const SUFFIX_SCM_DEVELOPER_CONNECTION: &str = ".developerConnection";
const SUFFIX_SCM_CONNECTION: &str = ".connection";
const SUFFIX_SCM_EMPTY: &str = ".empty";
const SUFFIX_SCM_ID: &str = ".id";
const SUFFIX_SCM_URL: &str = ".url";
const SUFFIX_SCM_TAG: &str = ".tag";

/// `dependency.` sub-field suffixes.
const SUFFIX_DEP_DEVELOPMENT: &str = ".development";
const SUFFIX_DEP_RELEASE: &str = ".release";

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors from decoding the flat key/value text format.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },
}

// ── Encode ──────────────────────────────────────────────────────────────

/// Serialize a descriptor to the flat key/value text format.
///
/// Line order is deterministic: scalar fields in declared order, then the
/// boolean flags, then each mapping family with entries in insertion order.
/// Absent scalars and default-valued flags produce no line at all
/// (`interactive` is the flag whose default is true), and the working
/// directory is a runtime concern that is never written.
pub fn encode(descriptor: &Descriptor) -> String {
    let mut out = String::new();

    push_scalar(&mut out, KEY_COMPLETED_PHASE, &descriptor.completed_phase);
    push_scalar(&mut out, KEY_SCM_ID, &descriptor.scm_id);
    push_scalar(&mut out, KEY_SCM_URL, &descriptor.scm_source_url);
    push_scalar(&mut out, KEY_SCM_USERNAME, &descriptor.scm_username);
    push_scalar(&mut out, KEY_SCM_PASSWORD, &descriptor.scm_password);
    push_scalar(&mut out, KEY_SCM_PRIVATE_KEY, &descriptor.scm_private_key);
    push_scalar(
        &mut out,
        KEY_SCM_PASSPHRASE,
        &descriptor.scm_private_key_passphrase,
    );
    push_scalar(&mut out, KEY_SCM_TAG_BASE, &descriptor.scm_tag_base);
    push_scalar(
        &mut out,
        KEY_SCM_TAG_NAME_FORMAT,
        &descriptor.scm_tag_name_format,
    );
    push_scalar(&mut out, KEY_SCM_BRANCH_BASE, &descriptor.scm_branch_base);
    push_scalar(&mut out, KEY_SCM_TAG, &descriptor.scm_release_label);
    push_scalar(
        &mut out,
        KEY_ADDITIONAL_ARGUMENTS,
        &descriptor.additional_arguments,
    );
    push_scalar(&mut out, KEY_PREPARATION_GOALS, &descriptor.preparation_goals);
    push_scalar(&mut out, KEY_COMPLETION_GOALS, &descriptor.completion_goals);
    push_scalar(&mut out, KEY_POM_FILE_NAME, &descriptor.pom_file_name);

    push_flag(
        &mut out,
        KEY_GENERATE_RELEASE_POMS,
        descriptor.generate_release_poms,
        false,
    );
    push_flag(&mut out, KEY_USE_EDIT_MODE, descriptor.use_edit_mode, false);
    push_flag(&mut out, KEY_INTERACTIVE, descriptor.interactive, true);
    push_flag(&mut out, KEY_ADD_SCHEMA, descriptor.add_schema, false);

    for (key, version) in &descriptor.release_versions {
        push_mapped(&mut out, PREFIX_RELEASE_VERSION, key, "", version);
    }
    for (key, version) in &descriptor.development_versions {
        push_mapped(&mut out, PREFIX_DEVELOPMENT_VERSION, key, "", version);
    }
    for (key, info) in &descriptor.original_scm_info {
        match info {
            None => push_mapped(&mut out, PREFIX_SCM_INFO, key, SUFFIX_SCM_EMPTY, "true"),
            Some(scm) => push_scm_identity(&mut out, key, scm),
        }
    }
    for (key, versions) in &descriptor.resolved_snapshot_dependencies {
        push_mapped(
            &mut out,
            PREFIX_DEPENDENCY,
            key,
            SUFFIX_DEP_RELEASE,
            &versions.release,
        );
        push_mapped(
            &mut out,
            PREFIX_DEPENDENCY,
            key,
            SUFFIX_DEP_DEVELOPMENT,
            &versions.development,
        );
    }

    out
}

fn push_scm_identity(out: &mut String, key: &ProjectKey, scm: &ScmIdentity) {
    if let Some(value) = &scm.id {
        push_mapped(out, PREFIX_SCM_INFO, key, SUFFIX_SCM_ID, value);
    }
    if let Some(value) = &scm.connection {
        push_mapped(out, PREFIX_SCM_INFO, key, SUFFIX_SCM_CONNECTION, value);
    }
    if let Some(value) = &scm.developer_connection {
        push_mapped(
            out,
            PREFIX_SCM_INFO,
            key,
            SUFFIX_SCM_DEVELOPER_CONNECTION,
            value,
        );
    }
    if let Some(value) = &scm.url {
        push_mapped(out, PREFIX_SCM_INFO, key, SUFFIX_SCM_URL, value);
    }
    if let Some(value) = &scm.tag {
        push_mapped(out, PREFIX_SCM_INFO, key, SUFFIX_SCM_TAG, value);
    }
}

fn push_scalar(out: &mut String, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        push_line(out, key, value);
    }
}

fn push_flag(out: &mut String, key: &str, value: bool, default: bool) {
    if value != default {
        push_line(out, key, if value { "true" } else { "false" });
    }
}

fn push_mapped(out: &mut String, prefix: &str, key: &ProjectKey, suffix: &str, value: &str) {
    out.push_str(prefix);
    out.push_str(&escape(key.as_str()));
    out.push_str(suffix);
    out.push('=');
    out.push_str(&escape(value));
    out.push('\n');
}

fn push_line(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push('=');
    out.push_str(&escape(value));
    out.push('\n');
}

// ── Decode ──────────────────────────────────────────────────────────────

/// Parse the flat key/value text format back into a descriptor.
///
/// Blank lines and `#` comments are skipped and unknown keys are ignored so
/// newer writers stay readable. Any other malformed line fails the whole
/// decode; a descriptor is never partially populated from bad input.
/// Missing scalar keys take their defaults, so empty text decodes to
/// [`Descriptor::default`].
pub fn decode(text: &str) -> Result<Descriptor, CodecError> {
    let mut descriptor = Descriptor::default();

    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (key, value) = split_line(raw).ok_or_else(|| CodecError::MalformedLine {
            line: index + 1,
            content: raw.to_string(),
        })?;
        apply_line(&mut descriptor, &unescape(key), unescape(value));
    }

    Ok(descriptor)
}

/// Route one key/value pair into the descriptor. Mapping families are
/// matched first by prefix containment; everything after the prefix (minus
/// a recognized sub-field suffix) is the literal coordinate.
fn apply_line(descriptor: &mut Descriptor, key: &str, value: String) {
    if let Some(coordinate) = key.strip_prefix(PREFIX_RELEASE_VERSION) {
        descriptor
            .release_versions
            .insert(ProjectKey::from(coordinate), value);
        return;
    }
    if let Some(coordinate) = key.strip_prefix(PREFIX_DEVELOPMENT_VERSION) {
        descriptor
            .development_versions
            .insert(ProjectKey::from(coordinate), value);
        return;
    }
    if let Some(rest) = key.strip_prefix(PREFIX_SCM_INFO) {
        apply_scm_line(descriptor, rest, value);
        return;
    }
    if let Some(rest) = key.strip_prefix(PREFIX_DEPENDENCY) {
        apply_dependency_line(descriptor, rest, value);
        return;
    }

    match key {
        KEY_COMPLETED_PHASE => descriptor.completed_phase = Some(value),
        KEY_SCM_ID => descriptor.scm_id = Some(value),
        KEY_SCM_URL => descriptor.scm_source_url = Some(value),
        KEY_SCM_USERNAME => descriptor.scm_username = Some(value),
        KEY_SCM_PASSWORD => descriptor.scm_password = Some(value),
        KEY_SCM_PRIVATE_KEY => descriptor.scm_private_key = Some(value),
        KEY_SCM_PASSPHRASE => descriptor.scm_private_key_passphrase = Some(value),
        KEY_SCM_TAG_BASE => descriptor.scm_tag_base = Some(value),
        KEY_SCM_TAG_NAME_FORMAT => descriptor.scm_tag_name_format = Some(value),
        KEY_SCM_BRANCH_BASE => descriptor.scm_branch_base = Some(value),
        KEY_SCM_TAG => descriptor.scm_release_label = Some(value),
        KEY_ADDITIONAL_ARGUMENTS => descriptor.additional_arguments = Some(value),
        KEY_PREPARATION_GOALS => descriptor.preparation_goals = Some(value),
        KEY_COMPLETION_GOALS => descriptor.completion_goals = Some(value),
        KEY_POM_FILE_NAME => descriptor.pom_file_name = Some(value),
        KEY_GENERATE_RELEASE_POMS => descriptor.generate_release_poms = value == "true",
        KEY_USE_EDIT_MODE => descriptor.use_edit_mode = value == "true",
        KEY_INTERACTIVE => descriptor.interactive = value == "true",
        KEY_ADD_SCHEMA => descriptor.add_schema = value == "true",
        _ => {}
    }
}

fn apply_scm_line(descriptor: &mut Descriptor, rest: &str, value: String) {
    if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_DEVELOPER_CONNECTION) {
        scm_entry(descriptor, coordinate).developer_connection = Some(value);
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_CONNECTION) {
        scm_entry(descriptor, coordinate).connection = Some(value);
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_EMPTY) {
        descriptor
            .original_scm_info
            .insert(ProjectKey::from(coordinate), None);
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_ID) {
        scm_entry(descriptor, coordinate).id = Some(value);
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_URL) {
        scm_entry(descriptor, coordinate).url = Some(value);
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_SCM_TAG) {
        scm_entry(descriptor, coordinate).tag = Some(value);
    }
    // A key with no recognized suffix is unknown and ignored.
}

fn apply_dependency_line(descriptor: &mut Descriptor, rest: &str, value: String) {
    if let Some(coordinate) = rest.strip_suffix(SUFFIX_DEP_DEVELOPMENT) {
        dependency_entry(descriptor, coordinate).development = value;
    } else if let Some(coordinate) = rest.strip_suffix(SUFFIX_DEP_RELEASE) {
        dependency_entry(descriptor, coordinate).release = value;
    }
}

fn scm_entry<'a>(descriptor: &'a mut Descriptor, coordinate: &str) -> &'a mut ScmIdentity {
    descriptor
        .original_scm_info
        .entry(ProjectKey::from(coordinate))
        .or_insert_with(|| Some(ScmIdentity::default()))
        .get_or_insert_with(ScmIdentity::default)
}

fn dependency_entry<'a>(descriptor: &'a mut Descriptor, coordinate: &str) -> &'a mut VersionPair {
    descriptor
        .resolved_snapshot_dependencies
        .entry(ProjectKey::from(coordinate))
        .or_default()
}

// ── Line framing ────────────────────────────────────────────────────────

/// Split a line at the first unescaped `=`. Returns `None` when the line
/// has no separator at all.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let bytes = line.as_bytes();
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'=' => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Escape the characters that would disturb line framing: the separator,
/// the escape character itself, and line breaks.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '=' => out.push_str("\\="),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
