//! Property-based tests for the release state codec.

use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use rel_common::{ProjectKey, ScmIdentity, VersionPair};
use rel_core::codec::{decode, encode};
use rel_core::descriptor::Descriptor;

fn value() -> impl Strategy<Value = String> {
    // Printable ASCII, including the separator and the escape character.
    proptest::string::string_regex("[ -~]{0,16}").unwrap()
}

fn coordinate() -> impl Strategy<Value = String> {
    // Coordinates keep their reserved characters: dots and colons inside
    // either part, plus the occasional separator or backslash.
    proptest::string::string_regex("[a-z][a-z0-9.:=\\\\]{0,10}:[a-z][a-z0-9.]{0,10}").unwrap()
}

fn scm_identity() -> impl Strategy<Value = ScmIdentity> {
    // `connection` is always populated: an identity with no fields at all
    // writes no lines and therefore cannot be told apart from absence.
    (
        option::of(value()),
        value(),
        option::of(value()),
        option::of(value()),
        option::of(value()),
    )
        .prop_map(
            |(id, connection, developer_connection, url, tag)| ScmIdentity {
                id,
                connection: Some(connection),
                developer_connection,
                url,
                tag,
            },
        )
}

fn descriptor() -> impl Strategy<Value = Descriptor> {
    let scalars = (
        option::of(value()),
        option::of(value()),
        option::of(value()),
        option::of(value()),
        option::of(value()),
    );
    let more_scalars = (
        option::of(value()),
        option::of(value()),
        option::of(value()),
        option::of(value()),
        option::of(value()),
    );
    let flags = (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>());
    let maps = (
        vec((coordinate(), value()), 0..4),
        vec((coordinate(), value()), 0..4),
        vec((coordinate(), option::of(scm_identity())), 0..4),
        vec((coordinate(), value(), value()), 0..4),
    );

    (scalars, more_scalars, flags, maps).prop_map(|(s1, s2, f, m)| {
        let mut d = Descriptor::default();
        let (completed_phase, scm_id, scm_source_url, scm_username, scm_password) = s1;
        d.completed_phase = completed_phase;
        d.scm_id = scm_id;
        d.scm_source_url = scm_source_url;
        d.scm_username = scm_username;
        d.scm_password = scm_password;

        let (tag_base, tag_name_format, branch_base, additional_arguments, preparation_goals) = s2;
        d.scm_tag_base = tag_base;
        d.scm_tag_name_format = tag_name_format;
        d.scm_branch_base = branch_base;
        d.additional_arguments = additional_arguments;
        d.preparation_goals = preparation_goals;

        let (generate_release_poms, use_edit_mode, interactive, add_schema) = f;
        d.generate_release_poms = generate_release_poms;
        d.use_edit_mode = use_edit_mode;
        d.interactive = interactive;
        d.add_schema = add_schema;

        let (release, development, scm_info, dependencies) = m;
        for (key, version) in release {
            d.map_release_version(ProjectKey::from(key), version);
        }
        for (key, version) in development {
            d.map_development_version(ProjectKey::from(key), version);
        }
        for (key, info) in scm_info {
            d.map_original_scm_info(ProjectKey::from(key), info);
        }
        for (key, release_version, development_version) in dependencies {
            d.map_resolved_snapshot_dependency(
                ProjectKey::from(key),
                VersionPair {
                    release: release_version,
                    development: development_version,
                },
            );
        }
        d
    })
}

proptest! {
    #[test]
    fn encode_decode_round_trips(descriptor in descriptor()) {
        let text = encode(&descriptor);
        let decoded = decode(&text).unwrap();
        prop_assert_eq!(decoded, descriptor);
    }

    #[test]
    fn coordinates_with_reserved_characters_round_trip(
        key in coordinate(),
        version in value(),
    ) {
        let mut descriptor = Descriptor::default();
        descriptor.map_release_version(ProjectKey::from(key), version);

        let decoded = decode(&encode(&descriptor)).unwrap();
        prop_assert_eq!(decoded, descriptor);
    }
}
