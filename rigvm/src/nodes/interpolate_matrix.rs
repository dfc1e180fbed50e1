//! Matrix interpolation nodes.
//!
//! Matrices are blended as decomposed poses: translation and scale linearly, rotation by slerp.
//! The array nodes blend with a fixed pairwise scheme, `(0 with 1)` and `(2 with 3)` and then the
//! two results, which is not a weighted average for arbitrary weights. Compiled rigs were tuned
//! against this scheme, so it is kept exactly.

use crate::math::EPSILON;
use crate::runtime::diagnostics::check_values;
use crate::{
    Diagnostics, HierarchyHeader, InterpolateMatrix1DEntry, InterpolateMatrix1DParams,
    InterpolateMatrixArray16Entry, InterpolateMatrixArray16Params, InterpolateMatrixArrayEntry,
    InterpolateMatrixArrayParams, MatrixArraySource, RigNodeType, decompose, wrap_degrees,
};
use glam::{Mat4, Quat, Vec3};

/// A decomposed transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_matrix(m: &Mat4) -> Self {
        let (translation, rotation, scale) = decompose(m);
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn blend(&self, other: &Pose, t: f32) -> Pose {
        Pose {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

/// Blends four poses: each pair by its relative weight, then the pairs by their total weights.
/// Empty pairs (weight sum below epsilon) contribute their first pose.
pub fn blend_pairwise(poses: &[Pose; 4], weights: [f32; 4]) -> Pose {
    let [w0, w1, w2, w3] = weights;
    let sum01 = w0 + w1;
    let sum23 = w2 + w3;
    let t01 = if sum01 > EPSILON { w1 / sum01 } else { 0.0 };
    let t23 = if sum23 > EPSILON { w3 / sum23 } else { 0.0 };
    let total = sum01 + sum23;
    let t_pairs = if total > EPSILON { sum23 / total } else { 0.0 };

    let first = poses[0].blend(&poses[1], t01);
    let second = poses[2].blend(&poses[3], t23);
    first.blend(&second, t_pairs)
}

/// The keyed matrix for `input`, clamped to the first and last states.
pub fn interpolate_matrix_1d(entry: &InterpolateMatrix1DEntry, input: f32) -> Mat4 {
    let states = &entry.states;
    let (Some(first), Some(last)) = (states.first(), states.last()) else {
        return Mat4::IDENTITY;
    };
    let x = if entry.input_as_angle {
        wrap_degrees(input)
    } else {
        input
    };
    if x <= first.time {
        return Mat4::from_cols_array(&first.matrix);
    }
    if x >= last.time {
        return Mat4::from_cols_array(&last.matrix);
    }

    let upper = states
        .iter()
        .position(|s| s.time > x)
        .unwrap_or(states.len() - 1);
    let a = &states[upper - 1];
    let b = &states[upper];
    let span = b.time - a.time;
    let t = if span > 0.0 { (x - a.time) / span } else { 0.0 };
    let t = entry.easing.apply(t);

    let ma = Mat4::from_cols_array(&a.matrix);
    let mb = Mat4::from_cols_array(&b.matrix);
    if t <= 0.0 {
        ma
    } else if t >= 1.0 {
        mb
    } else {
        Pose::from_matrix(&ma)
            .blend(&Pose::from_matrix(&mb), t)
            .to_matrix()
    }
}

pub fn execute_interpolate_matrix_1d(
    header: &mut HierarchyHeader<'_>,
    params: &InterpolateMatrix1DParams,
    diag: &mut dyn Diagnostics,
) {
    for entry in &params.entries {
        let input = header.read_f32_or(entry.input, 0.0);
        if cfg!(debug_assertions) && (entry.pre_infinity || entry.post_infinity) {
            let below = entry.states.first().is_some_and(|s| input < s.time);
            let above = entry.states.last().is_some_and(|s| input > s.time);
            if (below && entry.pre_infinity) || (above && entry.post_infinity) {
                diag.unreasonable_value(
                    RigNodeType::InterpolateMatrix1D,
                    "input outside keyed range (infinity mode held at end key)",
                    input,
                );
            }
        }
        let m = interpolate_matrix_1d(entry, input);
        check_values(diag, RigNodeType::InterpolateMatrix1D, "output", &m.to_cols_array());
        if entry.output.is_valid() {
            header.write_mat44(entry.output, &m);
        }
        diag.node_outputs(
            RigNodeType::InterpolateMatrix1D,
            "output",
            &m.to_cols_array(),
        );
    }
}

fn array_entry_poses(header: &HierarchyHeader<'_>, entry: &InterpolateMatrixArrayEntry) -> [Pose; 4] {
    match &entry.matrices {
        MatrixArraySource::Constant(constant) => std::array::from_fn(|i| Pose {
            translation: Vec3::from_array(constant.positions[i]),
            rotation: Quat::from_array(constant.quats[i]).normalize(),
            scale: Vec3::ONE,
        }),
        MatrixArraySource::Inputs {
            locations,
            defaults,
        } => std::array::from_fn(|i| {
            let m = if locations[i].is_valid() {
                header.read_mat44(locations[i])
            } else {
                Mat4::from_cols_array(&defaults[i])
            };
            Pose::from_matrix(&m)
        }),
    }
}

pub fn interpolate_matrix_array_entry(
    header: &HierarchyHeader<'_>,
    entry: &InterpolateMatrixArrayEntry,
) -> Mat4 {
    let count = (entry.num_matrices as usize).min(4);
    let poses = array_entry_poses(header, entry);
    let weights = std::array::from_fn(|i| {
        if i >= count {
            0.0
        } else {
            header.read_f32_or(entry.weights[i], entry.default_weights[i])
        }
    });
    blend_pairwise(&poses, weights).to_matrix()
}

pub fn execute_interpolate_matrix_array(
    header: &mut HierarchyHeader<'_>,
    params: &InterpolateMatrixArrayParams,
    diag: &mut dyn Diagnostics,
) {
    for entry in &params.entries {
        let m = interpolate_matrix_array_entry(header, entry);
        check_values(diag, RigNodeType::InterpolateMatrixArray, "output", &m.to_cols_array());
        if entry.output.is_valid() {
            header.write_mat44(entry.output, &m);
        }
        diag.node_outputs(
            RigNodeType::InterpolateMatrixArray,
            "output",
            &m.to_cols_array(),
        );
    }
}

/// Four groups of four poses, each blended pairwise, then the groups blended pairwise by the
/// four group weights.
pub fn interpolate_matrix_array16_entry(
    header: &HierarchyHeader<'_>,
    entry: &InterpolateMatrixArray16Entry,
) -> Mat4 {
    let weight = |i: usize| header.read_f32_or(entry.weights[i], 0.0);
    let groups: [Pose; 4] = std::array::from_fn(|g| {
        let poses: [Pose; 4] = std::array::from_fn(|k| {
            let pose = &entry.poses[g * 4 + k];
            Pose {
                translation: Vec3::from_array(pose.pos),
                rotation: Quat::from_array(pose.quat).normalize(),
                scale: Vec3::ONE,
            }
        });
        blend_pairwise(&poses, std::array::from_fn(|k| weight(g * 4 + k)))
    });
    blend_pairwise(&groups, std::array::from_fn(|g| weight(16 + g))).to_matrix()
}

pub fn execute_interpolate_matrix_array16(
    header: &mut HierarchyHeader<'_>,
    params: &InterpolateMatrixArray16Params,
    diag: &mut dyn Diagnostics,
) {
    for entry in &params.entries {
        let m = interpolate_matrix_array16_entry(header, entry);
        check_values(diag, RigNodeType::InterpolateMatrixArray16, "output", &m.to_cols_array());
        if entry.output.is_valid() {
            header.write_mat44(entry.output, &m);
        }
        diag.node_outputs(
            RigNodeType::InterpolateMatrixArray16,
            "output",
            &m.to_cols_array(),
        );
    }
}
