use crate::{
    Command, CompiledRig, Error, JointParams, Location, NodeCommand, Region, SegmentContext,
    joint_params_location, joint_transform_location,
};
use glam::{Quat, Vec3};

const ARM: &str = r#"{
    "version": "1.2",
    "name": "arm",
    "hierarchy_id": "0x0000abcd",
    "segments": [
        {
            "commands": [
                { "op": "parenting", "elements": [ { "child": 16, "parent": 0 } ] },
                { "op": "parenting", "elements": [ { "child": 32, "parent": 65 } ] },
                { "op": "constant", "writes": [ { "kind": "float", "dst": 2, "value": 3.0 } ] },
                { "op": "copy", "moves": [ { "kind": "float", "src": 2, "dst": "0x6" } ] },
                {
                    "op": "node",
                    "type": "set_range",
                    "input_min": 0,
                    "input_max": 4,
                    "output_min": 0,
                    "output_max": 100,
                    "easing": "linear",
                    "input": "0x6",
                    "output": 10
                }
            ]
        },
        { "commands": [] }
    ]
}"#;

#[test]
fn parses_and_runs_a_small_rig() {
    let rig = CompiledRig::from_json_str(ARM).unwrap();
    assert_eq!(rig.name(), "arm");
    assert_eq!(rig.hierarchy_id(), 0xabcd);
    assert_eq!(rig.segment_count(), 2);
    assert!(matches!(
        &rig.segments()[0].commands[4],
        Command::Node(NodeCommand::SetRange(_))
    ));

    let mut joint_params = vec![0u8; 2 * 48];
    let mut scalar_table = vec![0u8; 16];
    let mut joint_transforms = vec![0u8; 3 * 64];
    let mut dependency_table = Vec::<u8>::new();
    let mut ctx = SegmentContext::new(
        &mut joint_params,
        &mut scalar_table,
        &mut joint_transforms,
        &mut dependency_table,
    );
    {
        let (mut header, _) = ctx.split();
        header.write_joint_params(
            joint_params_location(0),
            &JointParams::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
        );
        header.write_joint_params(
            joint_params_location(1),
            &JointParams::new(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY, Vec3::ONE),
        );
    }
    rig.evaluate(0xabcd, &mut ctx).unwrap();

    let (header, _) = ctx.split();
    let hand = header.read_joint_transform(joint_transform_location(2));
    assert!(hand.w_axis.truncate().abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    let output = header.read_f32(Location::new(Region::ScalarTable, 8));
    assert!((output - 75.0).abs() < 1e-4, "{output}");
}

#[test]
fn locations_accept_numbers_hex_and_invalid() {
    let parse = |text: &str| serde_json::from_str::<Location>(text);
    assert_eq!(parse("66").unwrap(), Location::from_raw(66));
    assert_eq!(parse("\"0x41\"").unwrap(), Location::new(Region::JointTransforms, 64));
    assert_eq!(parse("\"14\"").unwrap().region(), Region::ScalarTable);
    assert_eq!(parse("\"invalid\"").unwrap(), Location::INVALID);
    assert!(parse("\"0xzz\"").is_err());
    assert!(parse("-4").is_err());
}

#[test]
fn version_is_optional_but_checked() {
    let without = ARM.replace("\"version\": \"1.2\",", "");
    assert!(CompiledRig::from_json_str(&without).is_ok());

    for version in ["2.0", "beta"] {
        let input = ARM.replace("1.2", version);
        match CompiledRig::from_json_str(&input) {
            Err(Error::JsonFormatVersion { value }) => assert_eq!(value, version),
            other => panic!("expected a version error, got {other:?}"),
        }
    }
}

#[test]
fn malformed_documents_are_parse_errors() {
    for input in [
        "{",
        r#"{ "hierarchy_id": 1 }"#,
        r#"{ "hierarchy_id": "0xnope", "segments": [ {} ] }"#,
        r#"{ "hierarchy_id": 1, "segments": [ { "commands": [ { "op": "jump" } ] } ] }"#,
    ] {
        let result = CompiledRig::from_json_str(input);
        assert!(
            matches!(result, Err(Error::JsonParse { .. })),
            "{input}: {result:?}"
        );
    }
}

#[test]
fn validation_failures_are_rig_errors() {
    let unresolved = ARM.replace(
        r#"{ "op": "parenting", "elements": [ { "child": 16, "parent": 0 } ] },"#,
        "",
    );
    match CompiledRig::from_json_str(&unresolved) {
        Err(Error::InvalidRig { message }) => {
            assert!(message.contains("not resolved"), "{message}");
            assert!(message.contains("'arm'"), "{message}");
        }
        other => panic!("expected a validation error, got {other:?}"),
    }

    let empty = r#"{ "hierarchy_id": 7, "segments": [] }"#;
    assert!(matches!(
        CompiledRig::from_json_str(empty),
        Err(Error::InvalidRig { .. })
    ));
}
