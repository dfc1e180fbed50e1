//! Spring-damper follow-through ("fat constraint").
//!
//! Each frame the node computes a desired local pose from its input and space matrices, then lets
//! a per-character state chase it with a mass-spring-damper integrated by RK4. Translation can be
//! held inside a soft box around the desired position. The state lives in the caller's persistent
//! buffer at `persistent_data_offset`:
//!
//! | offset | content |
//! |---|---|
//! | 0 | previous pose ([`JointParams`] layout) |
//! | 48 | previous velocity (same layout) |
//! | 96 | previous time, seconds (`f32`) |
//!
//! A zeroed block reads as "never ran".

use crate::math::EPSILON;
use crate::runtime::diagnostics::check_values;
use crate::{
    Diagnostics, EvalOptions, FatConstraintMode, FatConstraintParams, FrameClock, HierarchyHeader,
    JOINT_PARAMS_SIZE, JointParams, Location, RigNodeType, RotateOrder, read_f32_le, rotation_of,
    safe_normalize_quat, write_f32_le,
};
use glam::{Mat4, Quat, Vec3, Vec4};

/// Bytes reserved per node in the persistent buffer.
pub const PERSISTENT_BLOCK_SIZE: usize = 112;

/// Frame deltas longer than this are integrated as if they were this long.
const MAX_FRAME_DELTA: f32 = 1.0 / 20.0;
/// Integration runs in 30 Hz frame units.
const STEPS_PER_SECOND: f32 = 30.0;
const MAX_ROTATION_VELOCITY: f32 = 1000.0;

const ZEROED: JointParams = JointParams {
    scale: Vec4::ZERO,
    quat: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    translation: Vec4::ZERO,
};

/// The persistent state of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatConstraintState {
    pub prev: JointParams,
    pub velocity: JointParams,
    pub prev_time: f32,
}

impl Default for FatConstraintState {
    fn default() -> Self {
        Self {
            prev: ZEROED,
            velocity: ZEROED,
            prev_time: 0.0,
        }
    }
}

fn read_vec4_le(bytes: &[u8], offset: usize) -> Vec4 {
    Vec4::from_array(std::array::from_fn(|i| read_f32_le(bytes, offset + i * 4)))
}

fn write_vec4_le(bytes: &mut [u8], offset: usize, value: Vec4) {
    for (i, v) in value.to_array().into_iter().enumerate() {
        write_f32_le(bytes, offset + i * 4, v);
    }
}

fn read_joint_params_le(bytes: &[u8], offset: usize) -> JointParams {
    JointParams {
        scale: read_vec4_le(bytes, offset + JointParams::SCALE_OFFSET as usize),
        quat: Quat::from_vec4(read_vec4_le(
            bytes,
            offset + JointParams::QUAT_OFFSET as usize,
        )),
        translation: read_vec4_le(bytes, offset + JointParams::TRANSLATION_OFFSET as usize),
    }
}

fn write_joint_params_le(bytes: &mut [u8], offset: usize, value: &JointParams) {
    write_vec4_le(bytes, offset + JointParams::SCALE_OFFSET as usize, value.scale);
    write_vec4_le(
        bytes,
        offset + JointParams::QUAT_OFFSET as usize,
        Vec4::from(value.quat),
    );
    write_vec4_le(
        bytes,
        offset + JointParams::TRANSLATION_OFFSET as usize,
        value.translation,
    );
}

impl FatConstraintState {
    const VELOCITY_OFFSET: usize = JOINT_PARAMS_SIZE;
    const TIME_OFFSET: usize = 2 * JOINT_PARAMS_SIZE;

    /// Reads a block. Panics if `bytes` is shorter than [`PERSISTENT_BLOCK_SIZE`].
    pub fn read(bytes: &[u8]) -> Self {
        Self {
            prev: read_joint_params_le(bytes, 0),
            velocity: read_joint_params_le(bytes, Self::VELOCITY_OFFSET),
            prev_time: read_f32_le(bytes, Self::TIME_OFFSET),
        }
    }

    pub fn write(&self, bytes: &mut [u8]) {
        write_joint_params_le(bytes, 0, &self.prev);
        write_joint_params_le(bytes, Self::VELOCITY_OFFSET, &self.velocity);
        write_f32_le(bytes, Self::TIME_OFFSET, self.prev_time);
    }
}

#[derive(Clone, Copy, Debug)]
struct Spring {
    mass: f32,
    stiffness: f32,
    damping: f32,
}

impl Spring {
    fn from_params(params: &FatConstraintParams) -> Self {
        Self {
            mass: params.mass,
            stiffness: params.stiffness,
            damping: params.damping,
        }
    }

    /// `m a + c v + k x = 0`, with `c` the damping ratio times critical damping.
    fn accel(&self, x: f32, v: f32) -> f32 {
        let inv_mass = 1.0 / self.mass;
        let critical = self.damping * 2.0 * self.mass * (self.stiffness * inv_mass).sqrt();
        (-x * self.stiffness - v * critical) * inv_mass
    }

    fn rk4(&self, x: f32, v: f32, h: f32) -> (f32, f32) {
        let x1 = v;
        let v1 = self.accel(x, x1);
        let x2 = v + v1 * h * 0.5;
        let v2 = self.accel(x + x1 * h * 0.5, x2);
        let x3 = v + v2 * h * 0.5;
        let v3 = self.accel(x + x2 * h * 0.5, x3);
        let x4 = v + v3 * h;
        let v4 = self.accel(x + x3 * h, x4);
        (
            x + (x1 + 2.0 * x2 + 2.0 * x3 + x4) * h / 6.0,
            v + (v1 + 2.0 * v2 + 2.0 * v3 + v4) * h / 6.0,
        )
    }

    /// Integrates the offset `prev - desired` per lane; returns the new value and velocity.
    fn follow(&self, desired: Vec4, prev: Vec4, velocity: Vec4, dt: f32) -> (Vec4, Vec4) {
        let delta = (prev - desired).to_array();
        let vel = velocity.to_array();
        let mut new_delta = [0.0; 4];
        let mut new_vel = [0.0; 4];
        for i in 0..4 {
            (new_delta[i], new_vel[i]) = self.rk4(delta[i], vel[i], dt);
        }
        (
            desired + Vec4::from_array(new_delta),
            Vec4::from_array(new_vel),
        )
    }
}

fn clamp_length(v: Vec4, max: f32) -> Vec4 {
    let len = v.length();
    if len > max { v * (max / len) } else { v }
}

/// Soft-limits `interp - desired` inside the limit box (in limit space). Returns the limited
/// position and the velocity correction.
fn apply_limit(
    desired: Vec3,
    interp: Vec3,
    limit_rot: Quat,
    params: &FatConstraintParams,
) -> (Vec3, Vec3) {
    let move_vec = interp - desired;
    let rotated = limit_rot.conjugate() * move_vec;
    let smooth = params.limit_smooth_percent.max(EPSILON);
    let limited: [f32; 3] = std::array::from_fn(|i| {
        let r = rotated[i];
        let d_max = if r > 0.0 {
            params.limit_positive[i].max(EPSILON)
        } else {
            params.limit_negative[i].min(-EPSILON)
        }
        .abs();
        let current = r.abs();
        let delta = smooth * d_max;
        let start = d_max - delta;
        let magnitude = if current >= start {
            delta * (1.0 - ((start - current) / delta).exp()) + start
        } else {
            current
        };
        if r > 0.0 {
            magnitude
        } else if r < 0.0 {
            -magnitude
        } else {
            0.0
        }
    });
    let new_vec = limit_rot * Vec3::from_array(limited);
    (desired + new_vec, new_vec - move_vec)
}

/// Channel weights, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelWeights {
    pub rotate: f32,
    pub scale: f32,
    pub translate: f32,
}

fn follow_pose(
    desired: &JointParams,
    state: &FatConstraintState,
    dt: f32,
    limit_rot: Quat,
    params: &FatConstraintParams,
    weights: ChannelWeights,
) -> (JointParams, JointParams) {
    let spring = Spring::from_params(params);
    let prev = &state.prev;
    let vel = &state.velocity;
    let mut out = *desired;
    let mut new_vel = ZEROED;

    if weights.translate >= EPSILON {
        let (interp, v) = spring.follow(desired.translation, prev.translation, vel.translation, dt);
        let mut new_pos = interp.truncate();
        new_vel.translation = v;
        if params.has_flag(FatConstraintParams::USE_LIMIT) {
            let (limited, limit_vel) =
                apply_limit(desired.translation.truncate(), new_pos, limit_rot, params);
            new_pos = limited;
            new_vel.translation += limit_vel.extend(0.0);
        }
        out.translation = desired
            .translation
            .truncate()
            .lerp(new_pos, weights.translate)
            .extend(1.0);
    }

    if weights.rotate >= EPSILON {
        let mut in_rot = desired.quat;
        if in_rot.dot(prev.quat) < 0.0 {
            in_rot = -in_rot;
        }
        let (interp, v) = spring.follow(
            Vec4::from(in_rot),
            Vec4::from(prev.quat),
            Vec4::from(vel.quat),
            dt,
        );
        let interp = safe_normalize_quat(interp);
        new_vel.quat = Quat::from_vec4(clamp_length(v, MAX_ROTATION_VELOCITY));
        out.quat = in_rot.slerp(interp, weights.rotate).normalize();
    }

    if weights.scale >= EPSILON {
        let (interp, v) = spring.follow(desired.scale, prev.scale, vel.scale, dt);
        new_vel.scale = v;
        out.scale = desired
            .scale
            .truncate()
            .lerp(interp.truncate(), weights.scale)
            .extend(1.0);
    }

    (out, new_vel)
}

/// The node's matrix inputs, already read from the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatConstraintInputs {
    pub in_matrix: Mat4,
    pub space_matrix: Mat4,
    pub limit_matrix: Mat4,
    pub relative_matrix: Mat4,
    pub weights: ChannelWeights,
}

/// Rotation (XYZ degrees), scale, and translation written to the nine outputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatConstraintOutput {
    pub rotate: Vec3,
    pub scale: Vec3,
    pub translate: Vec3,
}

impl FatConstraintOutput {
    /// Written when no persistent state is bound.
    pub const REST: FatConstraintOutput = FatConstraintOutput {
        rotate: Vec3::ZERO,
        scale: Vec3::ONE,
        translate: Vec3::ZERO,
    };

    fn values(&self) -> [f32; 9] {
        let [rx, ry, rz] = self.rotate.to_array();
        let [sx, sy, sz] = self.scale.to_array();
        let [tx, ty, tz] = self.translate.to_array();
        [rx, ry, rz, sx, sy, sz, tx, ty, tz]
    }
}

fn axis_lengths(m: &Mat4) -> Vec3 {
    Vec3::new(
        m.x_axis.truncate().length(),
        m.y_axis.truncate().length(),
        m.z_axis.truncate().length(),
    )
}

/// The input matrix expressed in space-matrix space, as a pose.
pub fn desired_pose(in_matrix: &Mat4, space_matrix: &Mat4) -> JointParams {
    let compute = space_matrix.inverse() * *in_matrix;
    JointParams {
        scale: (axis_lengths(in_matrix) / axis_lengths(space_matrix)).extend(1.0),
        quat: rotation_of(&compute),
        translation: compute.w_axis.truncate().extend(1.0),
    }
}

/// Advances `state` by one frame and returns the outputs.
pub fn fat_constraint_step(
    params: &FatConstraintParams,
    inputs: &FatConstraintInputs,
    state: &mut FatConstraintState,
    clock: FrameClock,
    mode: FatConstraintMode,
) -> FatConstraintOutput {
    let desired = desired_pose(&inputs.in_matrix, &inputs.space_matrix);
    let limit_rot = rotation_of(&inputs.limit_matrix);
    let now = clock.current_time;

    let mut initial = false;
    if state.prev_time == 0.0 {
        state.prev = desired;
        state.prev_time = now;
        initial = true;
    }
    let dt = (now - state.prev_time).min(MAX_FRAME_DELTA) * STEPS_PER_SECOND;

    let pass_through = cfg!(debug_assertions) && mode == FatConstraintMode::PassThrough;
    let (interp, velocity) = if initial || pass_through {
        (desired, ZEROED)
    } else if clock.paused || dt < f32::EPSILON {
        (state.prev, state.velocity)
    } else {
        follow_pose(&desired, state, dt, limit_rot, params, inputs.weights)
    };

    let interp_matrix = Mat4::from_scale(interp.scale.truncate())
        * Mat4::from_rotation_translation(interp.quat, interp.translation.truncate());
    let offset = Mat4::from_cols_array(&params.offset_matrix);
    let output = inputs.relative_matrix.inverse() * inputs.space_matrix * interp_matrix * offset;

    state.prev = interp;
    state.velocity = velocity;
    state.prev_time = now;

    FatConstraintOutput {
        rotate: RotateOrder::Xyz.degrees_from_quat(rotation_of(&output)),
        scale: Vec3::new(
            output.x_axis.length(),
            output.y_axis.length(),
            output.z_axis.length(),
        ),
        translate: output.w_axis.truncate(),
    }
}

fn read_matrix_or_identity(header: &HierarchyHeader<'_>, loc: Location, is_mat44: bool) -> Mat4 {
    if loc.is_valid() {
        header.read_matrix(loc, is_mat44)
    } else {
        Mat4::IDENTITY
    }
}

fn gather_inputs(header: &HierarchyHeader<'_>, params: &FatConstraintParams) -> FatConstraintInputs {
    let matrix = |loc: Location, flag: u32| read_matrix_or_identity(header, loc, params.has_flag(flag));
    FatConstraintInputs {
        in_matrix: matrix(params.in_matrix, FatConstraintParams::IN_MATRIX_IS_MAT44),
        space_matrix: matrix(params.space_matrix, FatConstraintParams::SPACE_MATRIX_IS_MAT44),
        limit_matrix: matrix(params.limit_matrix, FatConstraintParams::LIMIT_MATRIX_IS_MAT44),
        relative_matrix: matrix(
            params.relative_matrix,
            FatConstraintParams::RELATIVE_MATRIX_IS_MAT44,
        ),
        weights: ChannelWeights {
            rotate: header.read_f32_or(params.rotate_weight, params.rotate_weight_default),
            scale: header.read_f32_or(params.scale_weight, params.scale_weight_default),
            translate: header.read_f32_or(params.translate_weight, params.translate_weight_default),
        },
    }
}

pub fn execute_fat_constraint(
    header: &mut HierarchyHeader<'_>,
    params: &FatConstraintParams,
    persistent: Option<&mut [u8]>,
    clock: FrameClock,
    options: &EvalOptions,
    diag: &mut dyn Diagnostics,
) {
    let node = RigNodeType::FatConstraint;
    let overridden;
    let params = match &options.fat_overrides {
        Some(overrides) if cfg!(debug_assertions) => {
            overridden = params.with_overrides(overrides);
            &overridden
        }
        _ => params,
    };

    let inputs = gather_inputs(header, params);
    if cfg!(debug_assertions) {
        check_values(diag, node, "input matrix", &inputs.in_matrix.to_cols_array());
        check_values(diag, node, "space matrix", &inputs.space_matrix.to_cols_array());
        check_values(diag, node, "limit matrix", &inputs.limit_matrix.to_cols_array());
        check_values(diag, node, "relative matrix", &inputs.relative_matrix.to_cols_array());
    }

    let start = params.persistent_data_offset as usize;
    let block = persistent.and_then(|data| data.get_mut(start..start + PERSISTENT_BLOCK_SIZE));
    let output = match block {
        Some(block) => {
            let mut state = FatConstraintState::read(block);
            let output =
                fat_constraint_step(params, &inputs, &mut state, clock, options.fat_constraint);
            state.write(block);
            output
        }
        None => {
            log::trace!(
                "{} '{}' has no persistent state bound",
                node.name(),
                params.node_name
            );
            FatConstraintOutput::REST
        }
    };

    let values = output.values();
    check_values(diag, node, "output", &values);
    for (loc, v) in params.outputs.iter().zip(values) {
        header.write_f32_if_valid(*loc, v);
    }
    diag.node_outputs(node, &params.node_name, &values);
}
