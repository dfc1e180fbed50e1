//! The procedural node library, dispatched by [`RigNodeType`].

mod fat_constraint;
mod interpolate_matrix;
mod matrix;
mod measure;
mod rbf;
mod rivet_plane;
mod scalar;
mod wachspress;

pub use fat_constraint::*;
pub use interpolate_matrix::*;
pub use matrix::*;
pub use measure::*;
pub use rbf::*;
pub use rivet_plane::*;
pub use scalar::*;
pub use wachspress::*;

use crate::{Diagnostics, EvalOptions, FrameClock, HierarchyHeader, NodeCommand, RigNodeType};
use std::time::Instant;

/// Runs one node against the segment's regions.
pub(crate) fn execute_node(
    node: &NodeCommand,
    header: &mut HierarchyHeader<'_>,
    persistent: Option<&mut [u8]>,
    clock: FrameClock,
    options: &EvalOptions,
    diag: &mut dyn Diagnostics,
) {
    let started = diag.wants_timing().then(Instant::now);
    match node {
        NodeCommand::MeasureCone(p) => execute_measure_cone(header, p, diag),
        NodeCommand::MeasureTwist(p) => execute_measure_twist(header, p, diag),
        NodeCommand::InterpolateRbf(p) => execute_interpolate_rbf(header, p, diag),
        NodeCommand::MatrixToFloats(p) => execute_matrix_to_floats(header, p, diag),
        NodeCommand::RivetPlane(p) => execute_rivet_plane(header, p, diag),
        NodeCommand::PointPoser(p) => execute_point_poser(header, p, diag),
        NodeCommand::FatConstraint(p) => {
            execute_fat_constraint(header, p, persistent, clock, options, diag)
        }
        NodeCommand::MultMatrixToPos(p) => execute_mult_matrix_to_pos(header, p, diag),
        NodeCommand::MatrixToEuler(p) => execute_matrix_to_euler(header, p, diag),
        NodeCommand::SetRange(p) => execute_normalize_range(header, p, RigNodeType::SetRange, diag),
        NodeCommand::AddDoubleLinear(p) => execute_add_double_linear(header, p, diag),
        NodeCommand::MultDoubleLinear(p) => execute_mult_double_linear(header, p, diag),
        NodeCommand::MatrixToExpMap(p) => execute_matrix_to_exp_map(header, p, diag),
        NodeCommand::AngleDriver(p) => execute_angle_driver(header, p, diag),
        NodeCommand::BendTwistDriver(p) => execute_bend_twist_driver(header, p, diag),
        NodeCommand::DecomposeMatrix(p) => execute_decompose_matrix(header, p, diag),
        NodeCommand::InterpolateMatrix1D(p) => execute_interpolate_matrix_1d(header, p, diag),
        NodeCommand::InterpolateMatrixArray(p) => {
            execute_interpolate_matrix_array(header, p, diag)
        }
        NodeCommand::MultMatrix(p) => execute_mult_matrix(header, p, diag),
        NodeCommand::NormalizeRange(p) => {
            execute_normalize_range(header, p, RigNodeType::NormalizeRange, diag)
        }
        NodeCommand::PairBlend(p) => execute_pair_blend(header, p, diag),
        NodeCommand::Wachspress(p) => execute_wachspress(header, p, diag),
        NodeCommand::InterpolateMatrixArray16(p) => {
            execute_interpolate_matrix_array16(header, p, diag)
        }
    }
    if let Some(started) = started {
        diag.node_executed(node.node_type(), started.elapsed());
    }
}






#[cfg(test)]
mod rivet_plane_tests;


#[cfg(test)]
mod wachspress_tests;
