//! Radial basis function interpolation and pose-space point deltas.
//!
//! An RBF node measures the distance from the current input vector to every authored pose,
//! shapes each distance with a kernel, and combines the results with solved per-pose weights.
//! Distances and the weighted sum both run through a four-lane chunked path; [`rbf_scalar`]
//! is the plain reference and must agree with it within float tolerance.

use crate::runtime::diagnostics::check_values;
use crate::{Diagnostics, HierarchyHeader, InterpolateRbfParams, PointPoserParams, RbfKernel, RigNodeType};
use glam::{Vec3, Vec4};

impl RbfKernel {
    /// Shapes distance `d` with shape parameter `e`.
    pub fn evaluate(self, d: f32, e: f32) -> f32 {
        match self {
            RbfKernel::Gauss => (-(d * d) / e).exp(),
            RbfKernel::Gauss2 => {
                let f = d / e;
                (-(f * f)).exp()
            }
            RbfKernel::Linear => d,
            RbfKernel::Hardy => (d * d + e * e).sqrt(),
            RbfKernel::MultiQuadratic => (1.0 + d * d).sqrt(),
            RbfKernel::InverseMultiQuadratic => 1.0 / (1.0 + d * d),
            RbfKernel::InverseNorm => 1.0 / (1.0 + d * d).sqrt(),
            RbfKernel::Cubic => d * d * d + 1.0,
            RbfKernel::ThinPlate => {
                if d < e {
                    e
                } else {
                    d * d * d.ln()
                }
            }
        }
    }
}

fn safe_sqrt(v: f32) -> f32 {
    if v <= 0.0 { 0.0 } else { v.sqrt() }
}

/// Loads up to four lanes starting at `start`, zero-filling past the end.
#[inline]
fn lanes(values: &[f32], start: usize) -> Vec4 {
    let mut out = [0.0; 4];
    let n = (values.len() - start).min(4);
    out[..n].copy_from_slice(&values[start..start + n]);
    Vec4::from_array(out)
}

/// Squared euclidean distance, four lanes at a time.
fn distance_sq_chunked(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    (0..a.len())
        .step_by(4)
        .map(|start| {
            let diff = lanes(a, start) - lanes(b, start);
            diff.dot(diff)
        })
        .sum()
}

/// `Σ kernels[pose] * weights[pose * stride + column]`, four poses at a time.
fn weighted_column_chunked(kernels: &[f32], weights: &[f32], stride: usize, column: usize) -> f32 {
    (0..kernels.len())
        .step_by(4)
        .map(|start| {
            let n = (kernels.len() - start).min(4);
            let mut w = [0.0; 4];
            for (lane, slot) in w.iter_mut().enumerate().take(n) {
                *slot = weights[(start + lane) * stride + column];
            }
            lanes(kernels, start).dot(Vec4::from_array(w))
        })
        .sum()
}

/// Evaluates the network for `inputs` with the chunked path.
pub fn rbf_evaluate(params: &InterpolateRbfParams, inputs: &[f32]) -> Vec<f32> {
    let num_inputs = params.inputs.len();
    let num_outputs = params.outputs.len();
    let kernels: Vec<f32> = params
        .poses
        .chunks_exact(num_inputs.max(1))
        .take(params.num_poses())
        .map(|pose| {
            let d = safe_sqrt(distance_sq_chunked(inputs, pose));
            params.kernel.evaluate(d, params.epsilon)
        })
        .collect();
    (0..num_outputs)
        .map(|o| weighted_column_chunked(&kernels, &params.weights, num_outputs, o))
        .collect()
}

/// Straight scalar loops over the same data as [`rbf_evaluate`].
pub fn rbf_scalar(params: &InterpolateRbfParams, inputs: &[f32]) -> Vec<f32> {
    let num_inputs = params.inputs.len();
    let num_outputs = params.outputs.len();
    let num_poses = params.num_poses();
    let mut kernels = Vec::with_capacity(num_poses);
    for pose in 0..num_poses {
        let mut distance = 0.0;
        for (j, input) in inputs.iter().enumerate() {
            let diff = input - params.poses[pose * num_inputs + j];
            distance += diff * diff;
        }
        kernels.push(params.kernel.evaluate(safe_sqrt(distance), params.epsilon));
    }
    let mut out = vec![0.0; num_outputs];
    for (o, value) in out.iter_mut().enumerate() {
        for (pose, k) in kernels.iter().enumerate() {
            *value += k * params.weights[pose * num_outputs + o];
        }
    }
    out
}

pub fn execute_interpolate_rbf(
    header: &mut HierarchyHeader<'_>,
    params: &InterpolateRbfParams,
    diag: &mut dyn Diagnostics,
) {
    let inputs: Vec<f32> = params
        .inputs
        .iter()
        .map(|loc| header.read_f32_or(*loc, 0.0))
        .collect();
    let outputs = rbf_evaluate(params, &inputs);
    check_values(diag, RigNodeType::InterpolateRbf, "output", &outputs);
    for (loc, v) in params.outputs.iter().zip(&outputs) {
        header.write_f32_if_valid(*loc, *v);
    }
    diag.node_outputs(RigNodeType::InterpolateRbf, &params.node_name, &outputs);
}

/// Weighted sum of per-pose point deltas: `out[p] = Σ weight[pose] * pose_points[pose][p]`.
pub fn point_poser(params: &PointPoserParams, weights: &[f32]) -> Vec<Vec3> {
    let num_points = params.num_points();
    let mut out = vec![Vec3::ZERO; num_points];
    if num_points == 0 {
        return out;
    }
    for (pose, w) in weights.iter().enumerate() {
        let Some(points) = params
            .pose_points
            .get(pose * num_points..(pose + 1) * num_points)
        else {
            break;
        };
        for (acc, p) in out.iter_mut().zip(points) {
            *acc += Vec3::from_array(*p) * *w;
        }
    }
    out
}

pub fn execute_point_poser(
    header: &mut HierarchyHeader<'_>,
    params: &PointPoserParams,
    diag: &mut dyn Diagnostics,
) {
    let weights: Vec<f32> = params
        .inputs
        .iter()
        .map(|loc| header.read_f32_or(*loc, 0.0))
        .collect();
    let points = point_poser(params, &weights);
    for (locs, p) in params.outputs.chunks_exact(3).zip(&points) {
        for (loc, v) in locs.iter().zip(p.to_array()) {
            header.write_f32_if_valid(*loc, v);
        }
    }
    if cfg!(debug_assertions) {
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        check_values(diag, RigNodeType::PointPoser, "point", &flat);
        diag.node_outputs(RigNodeType::PointPoser, &params.node_name, &flat);
    }
}
