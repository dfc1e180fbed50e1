//! Rotation measurement nodes: cone and twist angles, angle and bend/twist drivers.

use crate::runtime::diagnostics::check_value;
use crate::{
    AngleDriverParams, BendTwistDriverParams, BendTwistMode, Diagnostics, HierarchyHeader,
    InputControlDriverParams, Location, RigNodeType, joint_orient_quat, swing_twist, twist_angle,
};
use glam::{Quat, Vec3};

fn read_rotation(header: &HierarchyHeader<'_>, loc: Location) -> Quat {
    if loc.is_valid() {
        header.read_quat(loc).normalize()
    } else {
        Quat::IDENTITY
    }
}

fn clamp_angle(angle: f32, min: f32, max: f32) -> f32 {
    angle.max(min).min(max)
}

/// Angle in degrees between the primary axis and its image under the rotation relative to the
/// reference pose.
pub fn measure_cone(params: &InputControlDriverParams, rotation: Quat) -> f32 {
    let reference = Quat::from_array(params.ref_pose).normalize();
    let relative = reference.conjugate() * rotation;
    let axis = params.primary_axis.unit();
    let moved = relative * axis;
    let angle = axis.dot(moved).clamp(-1.0, 1.0).acos().to_degrees();
    clamp_angle(angle, params.min_angle_deg, params.max_angle_deg)
}

/// Signed twist in degrees about the twist axis, relative to the twist reference pose, plus the
/// optional input twist.
pub fn measure_twist(params: &InputControlDriverParams, rotation: Quat, extra_twist: f32) -> f32 {
    let reference = Quat::from_array(params.twist_ref_pose).normalize();
    let relative = reference.conjugate() * rotation;
    let axis = params.twist_axis.unit();
    let (_, twist) = swing_twist(relative, axis);
    let angle = twist_angle(twist, axis).to_degrees() + extra_twist;
    clamp_angle(angle, params.min_angle_deg, params.max_angle_deg)
}

pub fn execute_measure_cone(
    header: &mut HierarchyHeader<'_>,
    params: &InputControlDriverParams,
    diag: &mut dyn Diagnostics,
) {
    let angle = measure_cone(params, read_rotation(header, params.input_quat));
    check_value(diag, RigNodeType::MeasureCone, "cone angle", angle);
    header.write_f32_if_valid(params.output, angle);
    diag.node_outputs(RigNodeType::MeasureCone, "angle", &[angle]);
}

pub fn execute_measure_twist(
    header: &mut HierarchyHeader<'_>,
    params: &InputControlDriverParams,
    diag: &mut dyn Diagnostics,
) {
    let rotation = read_rotation(header, params.input_quat);
    let extra = header.read_f32_or(params.input_twist_angle, 0.0);
    let angle = measure_twist(params, rotation, extra);
    check_value(diag, RigNodeType::MeasureTwist, "twist angle", angle);
    header.write_f32_if_valid(params.output, angle);
    diag.node_outputs(RigNodeType::MeasureTwist, "angle", &[angle]);
}

/// `(yaw, pitch, roll)` in degrees.
pub fn angle_driver(params: &AngleDriverParams, rotation: Quat) -> Vec3 {
    let local = joint_orient_quat(params.joint_orient).conjugate() * rotation;
    let roll_axis = params.roll_axis.unit();
    let (swing, twist) = swing_twist(local, roll_axis);
    let roll = twist_angle(twist, roll_axis).to_degrees();

    let euler = params.rotate_order.degrees_from_quat(swing).to_array();
    let roll_index = params.roll_axis.index();
    let mut yaw_index = params.yaw_axis.index();
    if yaw_index == roll_index {
        yaw_index = (roll_index + 1) % 3;
    }
    let pitch_index = 3 - roll_index - yaw_index;
    Vec3::new(euler[yaw_index], euler[pitch_index], roll)
}

pub fn execute_angle_driver(
    header: &mut HierarchyHeader<'_>,
    params: &AngleDriverParams,
    diag: &mut dyn Diagnostics,
) {
    let rotation = if params.input_sqt.is_valid() {
        header.read_joint_params(params.input_sqt).quat.normalize()
    } else {
        Quat::IDENTITY
    };
    let out = angle_driver(params, rotation);
    let node = RigNodeType::AngleDriver;
    for v in out.to_array() {
        check_value(diag, node, "angle", v);
    }
    header.write_f32_if_valid(params.output_yaw, out.x);
    header.write_f32_if_valid(params.output_pitch, out.y);
    header.write_f32_if_valid(params.output_roll, out.z);
    diag.node_outputs(node, "yaw/pitch/roll", &out.to_array());
}

/// Bend Euler angles and twist vector (degrees), both scaled by the weight.
pub fn bend_twist_driver(params: &BendTwistDriverParams, rotation: Quat) -> (Vec3, Vec3) {
    let aim = Vec3::from_array(params.aim_vector).normalize_or(Vec3::X);
    let local = joint_orient_quat(params.joint_orient).conjugate() * rotation;
    let (_, twist) = swing_twist(local, aim);
    let swing = match params.mode {
        BendTwistMode::SwingThenTwist => local * twist.conjugate(),
        BendTwistMode::TwistThenSwing => twist.conjugate() * local,
    };
    let bend = params.rotate_order.degrees_from_quat(swing) * params.weight;
    let twist = aim * twist_angle(twist, aim).to_degrees() * params.weight;
    (bend, twist)
}

pub fn execute_bend_twist_driver(
    header: &mut HierarchyHeader<'_>,
    params: &BendTwistDriverParams,
    diag: &mut dyn Diagnostics,
) {
    let rotation = if params.input_sqt.is_valid() {
        header.read_joint_params(params.input_sqt).quat.normalize()
    } else {
        Quat::IDENTITY
    };
    let (bend, twist) = bend_twist_driver(params, rotation);
    let node = RigNodeType::BendTwistDriver;
    for (loc, v) in params.output_bend.iter().zip(bend.to_array()) {
        check_value(diag, node, "bend", v);
        header.write_f32_if_valid(*loc, v);
    }
    for (loc, v) in params.output_twist.iter().zip(twist.to_array()) {
        check_value(diag, node, "twist", v);
        header.write_f32_if_valid(*loc, v);
    }
    diag.node_outputs(node, "bend", &bend.to_array());
    diag.node_outputs(node, "twist", &twist.to_array());
}
