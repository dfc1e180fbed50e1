//! Rivet a transform to a skinned four-point plane.
//!
//! Plane points are laid out in a 'Z' pattern with point 2 as the UV origin:
//!
//! ```text
//!   1 ----- mU1 ----- 0
//!   |                 |
//!  mV1      o        mV0     V
//!   |                 |      ^
//!   3 ----- mU0 ----- 2  U <-+
//! ```
//!
//! The plane is skinned by up to N joints, the tracking point at `(point_u, point_v)` is found on
//! the deformed plane, pushed along the normal by the bulge terms, and the resulting frame is
//! expressed in the parent joint's space.

use crate::runtime::diagnostics::check_values;
use crate::{
    Diagnostics, HierarchyHeader, RigNodeType, RivetOutput, RivetPlaneParams, RotateOrder,
    joint_orient_quat, rotation_of,
};
use glam::{Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RivetPlaneResult {
    /// Translation in parent space.
    pub translation: Vec3,
    /// XYZ Euler angles in degrees, relative to the joint orient.
    pub rotation: Vec3,
    pub stretch_u: f32,
    pub stretch_v: f32,
}

/// Skins `points` by `joint_mats`: each point is the weighted sum of
/// `joint_mat * inverse_bind * point` over joints.
pub fn skin_plane_points(
    params: &RivetPlaneParams,
    joint_mats: &[Mat4],
    points: &[Vec3; 4],
) -> [Vec3; 4] {
    let num_joints = joint_mats.len();
    let mut skinned = [Vec3::ZERO; 4];
    for (j, (joint, inv_bind)) in joint_mats
        .iter()
        .zip(&params.inverse_bind_poses)
        .enumerate()
    {
        let m = *joint * Mat4::from_cols_array(inv_bind);
        for (p, out) in skinned.iter_mut().enumerate() {
            let w = params
                .skinning_weights
                .get(p * num_joints + j)
                .copied()
                .unwrap_or(0.0);
            *out += m.transform_point3(points[p]) * w;
        }
    }
    skinned
}

fn bulge_term(length: f32, original: f32, amount: f32) -> f32 {
    ((length - original) * amount + original) / original - 1.0
}

/// Evaluates the rivet for already-gathered inputs.
pub fn rivet_plane(
    params: &RivetPlaneParams,
    joint_mats: &[Mat4],
    points: &[Vec3; 4],
    parent: &Mat4,
) -> RivetPlaneResult {
    let (pu, pv) = (params.point_u, params.point_v);
    let [p0, p1, p2, p3] = *points;
    let original_u = ((p2 + (p0 - p2) * pv) - (p3 + (p1 - p3) * pv)).length();
    let original_v = ((p0 + (p1 - p0) * pu) - (p2 + (p3 - p2) * pu)).length();

    let [s0, s1, s2, s3] = skin_plane_points(params, joint_mats, points);
    let mid_u0 = s2 + (s3 - s2) * pu;
    let mid_u1 = s0 + (s1 - s0) * pu;
    let mid_v0 = s2 + (s0 - s2) * pv;
    let mid_v1 = s3 + (s1 - s3) * pv;

    let vec_u = mid_v1 - mid_v0;
    let vec_v = mid_u1 - mid_u0;
    let length_u = vec_u.length();
    let length_v = vec_v.length();
    let tracking = mid_u0 + vec_v * pv;

    // Average the U direction with the one implied by V and the normal.
    let normal = vec_v.cross(vec_u).normalize_or_zero();
    let new_u = normal.cross(vec_v).normalize_or_zero();
    let adjusted_u = ((vec_u.normalize_or_zero() + new_u) / 2.0).normalize_or_zero();
    let adjusted_v = adjusted_u.cross(normal).normalize_or_zero();

    // A zero multiplier enables stretch output; V is measured against the U rest length.
    let multiplier_u = if params.scale_multiplier_u == 0.0 { 1.0 } else { 0.0 };
    let multiplier_v = if params.scale_multiplier_v == 0.0 { 1.0 } else { 0.0 };
    let stretch_u = ((length_u - original_u) * multiplier_u + original_u) / original_u;
    let stretch_v = ((length_v - original_v) * multiplier_v + original_u) / original_v;

    let mut bulge = 0.0;
    if stretch_u < 1.0 {
        bulge -= bulge_term(length_u, original_u, params.bulge_shrink_u);
    } else {
        bulge += bulge_term(length_u, original_u, params.bulge_stretch_u);
    }
    if stretch_v < 1.0 {
        bulge -= bulge_term(length_v, original_v, params.bulge_shrink_v);
    } else {
        bulge += bulge_term(length_v, original_v, params.bulge_stretch_v);
    }

    let average_original = (original_u + original_v) * 0.5;
    let bulged = tracking + normal * average_original * bulge;
    let final_translation =
        bulged + normal * ((average_original + params.normal_offset) / average_original - 1.0);

    let tracking_mat = Mat4::from_cols(
        adjusted_u.extend(0.0),
        normal.extend(0.0),
        adjusted_v.extend(0.0),
        final_translation.extend(1.0),
    );
    let local = parent.inverse() * tracking_mat;
    let translation = local.w_axis.truncate();
    let mut rotation_only = local;
    rotation_only.w_axis = Vec4::W;
    let rotation = joint_orient_quat(params.joint_orient).conjugate() * rotation_of(&rotation_only);

    RivetPlaneResult {
        translation,
        rotation: RotateOrder::Xyz.degrees_from_quat(rotation),
        stretch_u,
        stretch_v,
    }
}

fn gather_joint_mats(header: &HierarchyHeader<'_>, params: &RivetPlaneParams) -> Vec<Mat4> {
    params
        .joint_inputs
        .iter()
        .enumerate()
        .map(|(i, loc)| {
            let factor = params
                .input_scale_factors
                .as_ref()
                .and_then(|factors| factors.get(i).copied())
                .unwrap_or(1.0);
            header.read_joint_transform(*loc) * Mat4::from_scale(Vec3::splat(factor))
        })
        .collect()
}

fn gather_points(header: &HierarchyHeader<'_>, params: &RivetPlaneParams) -> [Vec3; 4] {
    match &params.driven_points {
        Some(locs) => std::array::from_fn(|i| {
            Vec3::new(
                header.read_f32(locs[i * 3]),
                header.read_f32(locs[i * 3 + 1]),
                header.read_f32(locs[i * 3 + 2]),
            )
        }),
        None => params.plane_points.map(Vec3::from_array),
    }
}

pub fn execute_rivet_plane(
    header: &mut HierarchyHeader<'_>,
    params: &RivetPlaneParams,
    diag: &mut dyn Diagnostics,
) {
    let parent = header.read_joint_transform(params.parent);
    let joint_mats = gather_joint_mats(header, params);
    let points = gather_points(header, params);
    let result = rivet_plane(params, &joint_mats, &points, &parent);

    let node = RigNodeType::RivetPlane;
    check_values(diag, node, "translation", &result.translation.to_array());
    check_values(diag, node, "rotation", &result.rotation.to_array());
    check_values(diag, node, "stretch", &[result.stretch_u, result.stretch_v]);

    for output in &params.outputs {
        let value = match output.kind {
            RivetOutput::TranslateX => result.translation.x,
            RivetOutput::TranslateY => result.translation.y,
            RivetOutput::TranslateZ => result.translation.z,
            RivetOutput::RotateX => result.rotation.x,
            RivetOutput::RotateY => result.rotation.y,
            RivetOutput::RotateZ => result.rotation.z,
            RivetOutput::StretchU => result.stretch_u,
            RivetOutput::StretchV => result.stretch_v,
        };
        header.write_f32_if_valid(output.location, value);
    }
    diag.node_outputs(node, "translate", &result.translation.to_array());
    diag.node_outputs(node, "rotate", &result.rotation.to_array());
    diag.node_outputs(node, "stretch", &[result.stretch_u, result.stretch_v]);
}
