use crate::{
    HierarchyHeader, Location, NoDiagnostics, Region, RivetOutput, RivetOutputInfo,
    RivetPlaneParams, execute_rivet_plane, rivet_plane, skin_plane_points,
};
use glam::{Mat4, Quat, Vec3};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 0.001,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_vec_approx(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, 0.001),
        "expected {expected:?}, got {actual:?}"
    );
}

/// A `width` by `depth` plane on the ground, U along +X and V along +Z.
fn ground_plane(width: f32, depth: f32) -> [[f32; 3]; 4] {
    [
        [0.0, 0.0, depth],
        [width, 0.0, depth],
        [0.0, 0.0, 0.0],
        [width, 0.0, 0.0],
    ]
}

fn rivet(plane_points: [[f32; 3]; 4]) -> RivetPlaneParams {
    RivetPlaneParams {
        node_name: "cheek".to_string(),
        point_u: 0.25,
        point_v: 0.5,
        scale_multiplier_u: 0.0,
        scale_multiplier_v: 0.0,
        bulge_shrink_u: 0.0,
        bulge_shrink_v: 0.0,
        bulge_stretch_u: 0.0,
        bulge_stretch_v: 0.0,
        normal_offset: 0.0,
        joint_orient: [0.0; 3],
        joint_inputs: vec![Location::new(Region::JointTransforms, 64)],
        driven_points: None,
        parent: Location::new(Region::JointTransforms, 0),
        outputs: Vec::new(),
        plane_points,
        inverse_bind_poses: vec![Mat4::IDENTITY.to_cols_array()],
        skinning_weights: vec![1.0; 4],
        input_scale_factors: None,
    }
}

fn points(params: &RivetPlaneParams) -> [Vec3; 4] {
    params.plane_points.map(Vec3::from_array)
}

#[test]
fn skinning_blends_joints_per_point() {
    let mut params = rivet(ground_plane(2.0, 2.0));
    params.inverse_bind_poses.push(Mat4::IDENTITY.to_cols_array());
    // Points 0 and 1 follow the second joint, 2 and 3 split evenly.
    params.skinning_weights = vec![0.0, 1.0, 0.0, 1.0, 0.5, 0.5, 0.5, 0.5];
    let joints = [
        Mat4::IDENTITY,
        Mat4::from_translation(Vec3::new(0.0, 4.0, 0.0)),
    ];
    let skinned = skin_plane_points(&params, &joints, &points(&params));
    assert_vec_approx(skinned[0], Vec3::new(0.0, 4.0, 2.0));
    assert_vec_approx(skinned[1], Vec3::new(2.0, 4.0, 2.0));
    assert_vec_approx(skinned[2], Vec3::new(0.0, 2.0, 0.0));
    assert_vec_approx(skinned[3], Vec3::new(2.0, 2.0, 0.0));
}

#[test]
fn inverse_bind_pose_is_applied_before_the_joint() {
    let mut params = rivet(ground_plane(2.0, 2.0));
    let bind = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
    params.inverse_bind_poses = vec![bind.inverse().to_cols_array()];
    let skinned = skin_plane_points(&params, &[bind], &points(&params));
    for (s, p) in skinned.iter().zip(points(&params)) {
        assert_vec_approx(*s, p);
    }
}

#[test]
fn undeformed_square_plane_tracks_the_uv_point() {
    let mut params = rivet(ground_plane(2.0, 2.0));
    params.normal_offset = 0.5;
    let result = rivet_plane(&params, &[Mat4::IDENTITY], &points(&params), &Mat4::IDENTITY);
    // The offset is divided by the average rest edge length before pushing along the normal.
    assert_vec_approx(result.translation, Vec3::new(0.5, 0.25, 1.0));
    assert_vec_approx(result.rotation, Vec3::ZERO);
    assert_approx(result.stretch_u, 1.0);
    assert_approx(result.stretch_v, 1.0);
}

#[test]
fn result_is_expressed_in_parent_space() {
    let params = rivet(ground_plane(2.0, 2.0));
    let lift = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
    let world = rivet_plane(&params, &[lift], &points(&params), &Mat4::IDENTITY);
    assert_vec_approx(world.translation, Vec3::new(0.5, 3.0, 1.0));

    let local = rivet_plane(&params, &[lift], &points(&params), &lift);
    assert_vec_approx(local.translation, Vec3::new(0.5, 0.0, 1.0));
}

#[test]
fn rotation_follows_the_plane_and_drops_joint_orient() {
    let mut params = rivet(ground_plane(2.0, 2.0));
    let spin = Mat4::from_quat(Quat::from_rotation_y(30f32.to_radians()));
    let result = rivet_plane(&params, &[spin], &points(&params), &Mat4::IDENTITY);
    assert_vec_approx(result.rotation, Vec3::new(0.0, 30.0, 0.0));

    params.joint_orient = [0.0, 30f32.to_radians(), 0.0];
    let result = rivet_plane(&params, &[spin], &points(&params), &Mat4::IDENTITY);
    assert_vec_approx(result.rotation, Vec3::ZERO);
}

#[test]
fn stretching_along_u_bulges_along_the_normal() {
    let mut params = rivet(ground_plane(2.0, 2.0));
    params.bulge_stretch_u = 0.5;
    let stretch = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
    let result = rivet_plane(&params, &[stretch], &points(&params), &Mat4::IDENTITY);
    assert_approx(result.stretch_u, 2.0);
    assert_approx(result.stretch_v, 1.0);
    assert_vec_approx(result.translation, Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn v_stretch_is_measured_against_the_u_rest_length() {
    let mut params = rivet(ground_plane(2.0, 1.0));
    let stretch = Mat4::from_scale(Vec3::new(1.0, 1.0, 3.0));
    let result = rivet_plane(&params, &[stretch], &points(&params), &Mat4::IDENTITY);
    assert_approx(result.stretch_u, 1.0);
    assert_approx(result.stretch_v, 4.0);

    // A nonzero multiplier pins stretch to the rest ratios.
    params.scale_multiplier_u = 1.0;
    params.scale_multiplier_v = 1.0;
    let stretch = Mat4::from_scale(Vec3::new(5.0, 1.0, 3.0));
    let result = rivet_plane(&params, &[stretch], &points(&params), &Mat4::IDENTITY);
    assert_approx(result.stretch_u, 1.0);
    assert_approx(result.stretch_v, 2.0);
}

#[test]
fn rivet_node_reads_joints_and_writes_selected_outputs() {
    let mut joint_params = Vec::<u8>::new();
    let mut joint_transforms = vec![0u8; 128];
    let mut scalar_table = vec![0u8; 64];
    let mut dependency_table = vec![0u8; 64];
    let mut header = HierarchyHeader::new(
        &mut joint_params,
        &mut joint_transforms,
        &mut scalar_table,
        &mut dependency_table,
    );
    let scalar = |offset| Location::new(Region::ScalarTable, offset);
    header.write_joint_transform(Location::new(Region::JointTransforms, 0), &Mat4::IDENTITY);
    header.write_joint_transform(Location::new(Region::JointTransforms, 64), &Mat4::IDENTITY);

    let mut params = rivet(ground_plane(1.0, 1.0));
    params.input_scale_factors = Some(vec![2.0]);
    params.outputs = vec![
        RivetOutputInfo {
            kind: RivetOutput::TranslateX,
            location: scalar(0),
        },
        RivetOutputInfo {
            kind: RivetOutput::TranslateZ,
            location: scalar(4),
        },
        RivetOutputInfo {
            kind: RivetOutput::StretchU,
            location: scalar(8),
        },
    ];
    execute_rivet_plane(&mut header, &params, &mut NoDiagnostics);
    // The input scale factor doubles the skinned plane.
    assert_approx(header.read_f32(scalar(0)), 0.5);
    assert_approx(header.read_f32(scalar(4)), 1.0);
    assert_approx(header.read_f32(scalar(8)), 2.0);
}

#[test]
fn driven_points_replace_the_rest_plane() {
    let mut joint_params = Vec::<u8>::new();
    let mut joint_transforms = vec![0u8; 128];
    let mut scalar_table = vec![0u8; 128];
    let mut dependency_table = Vec::<u8>::new();
    let mut header = HierarchyHeader::new(
        &mut joint_params,
        &mut joint_transforms,
        &mut scalar_table,
        &mut dependency_table,
    );
    header.write_joint_transform(Location::new(Region::JointTransforms, 0), &Mat4::IDENTITY);
    header.write_joint_transform(Location::new(Region::JointTransforms, 64), &Mat4::IDENTITY);

    let driven: [Location; 12] =
        std::array::from_fn(|i| Location::new(Region::ScalarTable, i as u32 * 4));
    for (i, p) in ground_plane(4.0, 4.0).iter().flatten().enumerate() {
        header.write_f32(driven[i], *p + if i % 3 == 1 { 2.0 } else { 0.0 });
    }
    let output = Location::new(Region::ScalarTable, 0x40);
    let mut params = rivet(ground_plane(1.0, 1.0));
    params.driven_points = Some(driven);
    params.outputs = vec![RivetOutputInfo {
        kind: RivetOutput::TranslateY,
        location: output,
    }];
    execute_rivet_plane(&mut header, &params, &mut NoDiagnostics);
    assert_approx(header.read_f32(output), 2.0);
}
