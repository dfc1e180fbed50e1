use crate::{
    HierarchyHeader, Location, NoDiagnostics, Region, WachspressEntry, WachspressMode,
    WachspressParams, bilinear_coordinates, execute_wachspress, wachspress_coordinates,
    wachspress_entry,
};
use glam::Vec2;

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 0.001,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_weights(actual: [f32; 4], expected: [f32; 4]) {
    for (a, e) in actual.iter().zip(expected) {
        assert_approx(*a, e);
    }
}

fn square() -> [Vec2; 4] {
    [
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(0.0, 2.0),
    ]
}

fn trapezoid() -> [Vec2; 4] {
    [
        Vec2::new(0.0, 0.0),
        Vec2::new(4.0, 0.0),
        Vec2::new(3.0, 2.0),
        Vec2::new(1.0, 2.0),
    ]
}

#[test]
fn corners_get_all_the_weight() {
    let points = square();
    for (i, corner) in points.iter().enumerate() {
        let mut expected = [0.0; 4];
        expected[i] = 1.0;
        assert_weights(bilinear_coordinates(&points, *corner), expected);
    }
}

#[test]
fn bilinear_weights_inside_the_box() {
    let points = square();
    assert_weights(bilinear_coordinates(&points, Vec2::ONE), [0.25; 4]);
    assert_weights(
        bilinear_coordinates(&points, Vec2::new(0.5, 1.5)),
        [0.1875, 0.0625, 0.1875, 0.5625],
    );
}

#[test]
fn bilinear_weights_outside_the_box_stay_positive() {
    let weights = bilinear_coordinates(&square(), Vec2::new(-2.0, 0.0));
    assert_weights(weights, [2.0 / 3.0, 1.0 / 3.0, 0.0, 0.0]);
}

#[test]
fn degenerate_box_falls_back_to_the_first_edge() {
    let mut points = square();
    points[1] = points[0];
    let weights = bilinear_coordinates(&points, Vec2::new(1.0, 1.0));
    assert_weights(weights, [0.5, 0.0, 0.0, 0.5]);
}

#[test]
fn wachspress_matches_bilinear_on_a_rectangle() {
    let points = square();
    for query in [Vec2::new(0.5, 1.5), Vec2::new(1.2, 0.3), Vec2::ONE] {
        assert_weights(
            wachspress_coordinates(&points, query),
            bilinear_coordinates(&points, query),
        );
    }
}

#[test]
fn wachspress_reproduces_the_query_point() {
    let points = trapezoid();
    let query = Vec2::new(1.5, 0.8);
    let weights = wachspress_coordinates(&points, query);
    assert_weights(weights, [0.39375, 0.20625, 0.1375, 0.2625]);
    let sum: f32 = weights.iter().sum();
    assert_approx(sum, 1.0);
    let rebuilt: Vec2 = weights.iter().zip(points).map(|(w, p)| p * *w).sum();
    assert_approx(rebuilt.x, query.x);
    assert_approx(rebuilt.y, query.y);
}

#[test]
fn wachspress_on_an_edge_is_linear_between_its_corners() {
    let points = trapezoid();
    assert_weights(
        wachspress_coordinates(&points, Vec2::new(1.0, 0.0)),
        [0.75, 0.25, 0.0, 0.0],
    );
    assert_weights(
        wachspress_coordinates(&points, Vec2::new(2.0, 2.0)),
        [0.0, 0.0, 0.5, 0.5],
    );
}

fn entry(mode: WachspressMode) -> WachspressEntry {
    let scalar = |offset| Location::new(Region::ScalarTable, offset);
    WachspressEntry {
        points: trapezoid().map(|p| [p.x, p.y, 0.0]),
        input_defaults: [1.5, 0.8, 0.0],
        inputs: [scalar(0), Location::INVALID, Location::INVALID],
        outputs: [scalar(0x10), scalar(0x14), Location::INVALID, scalar(0x1C)],
        mode,
    }
}

#[test]
fn entry_mode_selects_the_coordinates() {
    let query = Vec2::new(1.5, 0.8);
    let points = trapezoid();
    assert_weights(
        wachspress_entry(&entry(WachspressMode::Bilinear), query),
        bilinear_coordinates(&points, query),
    );
    assert_weights(
        wachspress_entry(&entry(WachspressMode::Generalized), query),
        wachspress_coordinates(&points, query),
    );
}

#[test]
fn node_reads_inputs_with_defaults_and_writes_connected_weights() {
    let mut joint_params = Vec::<u8>::new();
    let mut joint_transforms = Vec::<u8>::new();
    let mut scalar_table = vec![0u8; 64];
    let mut dependency_table = Vec::<u8>::new();
    let mut header = HierarchyHeader::new(
        &mut joint_params,
        &mut joint_transforms,
        &mut scalar_table,
        &mut dependency_table,
    );
    let scalar = |offset| Location::new(Region::ScalarTable, offset);
    header.write_f32(scalar(0), 1.5);
    header.write_f32(scalar(0x18), -1.0);
    let params = WachspressParams {
        entries: vec![entry(WachspressMode::Generalized)],
    };
    execute_wachspress(&mut header, &params, &mut NoDiagnostics);
    assert_approx(header.read_f32(scalar(0x10)), 0.39375);
    assert_approx(header.read_f32(scalar(0x14)), 0.20625);
    assert_approx(header.read_f32(scalar(0x18)), -1.0);
    assert_approx(header.read_f32(scalar(0x1C)), 0.2625);
}
