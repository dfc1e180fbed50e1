use crate::rigs::{MATRIX_NETWORK_TEST_HIERARCHY_ID, matrix_network_test};
use crate::{
    Diagnostics, EvalOptions, FloatPairParams, HierarchyHeader, Location, LogDiagnostics,
    MatrixToFloatsParams, NormalizeRangeParams, Region, RigNodeStats, RigNodeType, SegmentContext,
    execute_add_double_linear, execute_matrix_to_floats, execute_mult_double_linear,
    execute_normalize_range,
};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    outputs: Vec<(RigNodeType, String, Vec<f32>)>,
    unreasonable: Vec<(RigNodeType, String)>,
}

impl Diagnostics for Recorder {
    fn node_outputs(&mut self, node: RigNodeType, name: &str, values: &[f32]) {
        self.outputs.push((node, name.to_string(), values.to_vec()));
    }

    fn unreasonable_value(&mut self, node: RigNodeType, what: &str, _value: f32) {
        self.unreasonable.push((node, what.to_string()));
    }
}

fn evaluate_matrix_network(diag: &mut dyn Diagnostics) {
    let rig = matrix_network_test().unwrap();
    let mut joint_params = vec![0u8; 7 * 48];
    let mut scalar_table = vec![0u8; 0xB0];
    let mut joint_transforms = vec![0u8; 8 * 64];
    let mut dependency_table = Vec::<u8>::new();
    let mut ctx = SegmentContext::new(
        &mut joint_params,
        &mut scalar_table,
        &mut joint_transforms,
        &mut dependency_table,
    );
    rig.evaluate_with(
        MATRIX_NETWORK_TEST_HIERARCHY_ID,
        &mut ctx,
        &EvalOptions::default(),
        diag,
    )
    .unwrap();
}

#[test]
fn stats_count_every_node_that_ran() {
    let mut stats = RigNodeStats::new();
    evaluate_matrix_network(&mut stats);
    evaluate_matrix_network(&mut stats);

    assert_eq!(stats.get(RigNodeType::InterpolateMatrix1D).count, 2);
    assert_eq!(stats.get(RigNodeType::MultMatrix).count, 2);
    assert_eq!(stats.get(RigNodeType::DecomposeMatrix).count, 2);
    assert_eq!(stats.get(RigNodeType::FatConstraint).count, 0);
    assert_eq!(stats.total().count, 6);

    let report = stats.report();
    assert!(report.contains("Mult Matrix"), "{report}");
    assert!(report.contains("Interpolate Matrix 1D"), "{report}");
    assert!(report.contains("Total"), "{report}");
    assert!(!report.contains("Fat Constraint"), "{report}");

    stats.reset();
    assert_eq!(stats.total().count, 0);
    assert_eq!(stats.total().elapsed, Duration::ZERO);
}

#[test]
fn outputs_are_reported_per_node() {
    let mut recorder = Recorder::default();
    evaluate_matrix_network(&mut recorder);
    let nodes: Vec<RigNodeType> = recorder.outputs.iter().map(|(node, _, _)| *node).collect();
    assert!(nodes.contains(&RigNodeType::InterpolateMatrix1D));
    assert!(nodes.contains(&RigNodeType::DecomposeMatrix));
    let (_, _, scale) = recorder
        .outputs
        .iter()
        .find(|(node, name, _)| *node == RigNodeType::DecomposeMatrix && name == "scale")
        .unwrap();
    assert_eq!(scale.len(), 3);
}

#[test]
fn log_diagnostics_never_time_nodes() {
    let mut diag = LogDiagnostics {
        print_outputs: true,
    };
    assert!(!diag.wants_timing());
    evaluate_matrix_network(&mut diag);
}

#[test]
fn non_finite_values_are_flagged_in_debug_builds() {
    let mut joint_params = Vec::<u8>::new();
    let mut joint_transforms = Vec::<u8>::new();
    let mut scalar_table = vec![0u8; 8];
    let mut dependency_table = Vec::<u8>::new();
    let mut header = HierarchyHeader::new(
        &mut joint_params,
        &mut joint_transforms,
        &mut scalar_table,
        &mut dependency_table,
    );
    let input = Location::new(Region::ScalarTable, 0);
    header.write_f32(input, f32::NAN);
    let params = NormalizeRangeParams {
        input_min: 0.0,
        input_max: 1.0,
        output_min: 0.0,
        output_max: 10.0,
        easing: Default::default(),
        input_as_angle: false,
        input,
        output: Location::new(Region::ScalarTable, 4),
    };

    let mut recorder = Recorder::default();
    execute_normalize_range(&mut header, &params, RigNodeType::NormalizeRange, &mut recorder);
    if cfg!(debug_assertions) {
        assert_eq!(recorder.unreasonable.len(), 1);
        assert_eq!(recorder.unreasonable[0].0, RigNodeType::NormalizeRange);
    } else {
        assert!(recorder.unreasonable.is_empty());
    }

    let mut stats = RigNodeStats::new();
    execute_normalize_range(&mut header, &params, RigNodeType::NormalizeRange, &mut stats);
    let expected = if cfg!(debug_assertions) { 1 } else { 0 };
    assert_eq!(stats.unreasonable_count(), expected);
    stats.reset();
    assert_eq!(stats.unreasonable_count(), 0);
}

#[test]
fn scalar_and_element_nodes_flag_non_finite_outputs() {
    let mut joint_params = Vec::<u8>::new();
    let mut joint_transforms = Vec::<u8>::new();
    let mut scalar_table = vec![0u8; 0x80];
    let mut dependency_table = Vec::<u8>::new();
    let mut header = HierarchyHeader::new(
        &mut joint_params,
        &mut joint_transforms,
        &mut scalar_table,
        &mut dependency_table,
    );
    let scalar = |offset| Location::new(Region::ScalarTable, offset);
    header.write_f32(scalar(0), f32::NAN);
    header.write_f32(scalar(0x40), f32::INFINITY);

    let pair = FloatPairParams {
        inputs: [scalar(0), Location::INVALID],
        defaults: [0.0, 2.0],
        output: scalar(4),
    };
    let mut elements = [Location::INVALID; 16];
    elements[0] = scalar(8);
    let to_floats = MatrixToFloatsParams {
        input: scalar(0x40),
        outputs: elements,
    };

    let mut recorder = Recorder::default();
    execute_add_double_linear(&mut header, &pair, &mut recorder);
    execute_mult_double_linear(&mut header, &pair, &mut recorder);
    execute_matrix_to_floats(&mut header, &to_floats, &mut recorder);
    assert!(header.read_f32(scalar(8)).is_infinite());

    let flagged: Vec<RigNodeType> = recorder.unreasonable.iter().map(|(node, _)| *node).collect();
    if cfg!(debug_assertions) {
        assert_eq!(
            flagged,
            vec![
                RigNodeType::AddDoubleLinear,
                RigNodeType::MultDoubleLinear,
                RigNodeType::MatrixToFloats,
            ]
        );
    } else {
        assert!(flagged.is_empty());
    }
}

#[test]
fn opcodes_cover_every_node_type() {
    for (index, node) in RigNodeType::ALL.iter().enumerate() {
        assert_eq!(node.index(), index);
        assert_eq!(RigNodeType::from_opcode(node.opcode()), Some(*node));
    }
    assert_eq!(RigNodeType::MeasureCone.opcode(), 0x80);
    assert_eq!(RigNodeType::InterpolateMatrixArray16.opcode(), 0x96);
    assert_eq!(RigNodeType::from_opcode(0x97), None);
    assert_eq!(RigNodeType::from_opcode(0x10), None);
}

#[test]
fn display_names_match_the_stats_table() {
    assert_eq!(RigNodeType::InterpolateRbf.name(), "Interpolate Rbf");
    assert_eq!(RigNodeType::InterpolateMatrixArray.name(), "Interpolate Matrix Array");
    assert_eq!(RigNodeType::InterpolateMatrixArray16.name(), "Interp. Matrix Array 16");
}
