use crate::runtime::diagnostics::{check_value, check_values};
use crate::{
    DecomposeMatrixParams, Diagnostics, HierarchyHeader, Location, MatrixFormat,
    MatrixToEulerParams, MatrixToExpMapParams, MatrixToFloatsParams, MultMatrixInput,
    MultMatrixParams, MultMatrixToPosParams, RigNodeType, decompose, joint_orient_quat,
    rotation_angle, rotation_of,
};
use glam::{Mat4, Quat, Vec3};

fn write_vec3(header: &mut HierarchyHeader<'_>, locs: &[Location; 3], value: Vec3) {
    for (loc, v) in locs.iter().zip(value.to_array()) {
        header.write_f32_if_valid(*loc, v);
    }
}

fn read_mat44_or_identity(header: &HierarchyHeader<'_>, loc: Location) -> Mat4 {
    if loc.is_valid() {
        header.read_mat44(loc)
    } else {
        Mat4::IDENTITY
    }
}

fn mult_matrix_input(header: &HierarchyHeader<'_>, input: &MultMatrixInput) -> Mat4 {
    let default = Mat4::from_cols_array(&input.default);
    let m = if !input.location.is_valid() {
        default
    } else {
        match input.format {
            MatrixFormat::Constant => default,
            MatrixFormat::Sqt => header.read_joint_params(input.location).local_matrix(),
            MatrixFormat::Transform3x4 => header.read_joint_transform(input.location),
            MatrixFormat::Input4x4 => header.read_mat44(input.location),
        }
    };
    if input.invert { m.inverse() } else { m }
}

/// Composes the inputs in array order: input 0 is applied first.
pub fn execute_mult_matrix(
    header: &mut HierarchyHeader<'_>,
    params: &MultMatrixParams,
    diag: &mut dyn Diagnostics,
) {
    let reader: &HierarchyHeader<'_> = header;
    let result = params
        .inputs
        .iter()
        .map(|input| mult_matrix_input(reader, input))
        .reduce(|acc, m| m * acc)
        .unwrap_or(Mat4::IDENTITY);
    check_values(
        diag,
        RigNodeType::MultMatrix,
        "output matrix",
        &result.to_cols_array(),
    );
    if params.output.is_valid() {
        header.write_mat44(params.output, &result);
    }
    diag.node_outputs(RigNodeType::MultMatrix, "output", &result.to_cols_array());
}

/// Translation of `inputs[0]` carried through `inputs[1]`.
pub fn execute_mult_matrix_to_pos(
    header: &mut HierarchyHeader<'_>,
    params: &MultMatrixToPosParams,
    diag: &mut dyn Diagnostics,
) {
    let m0 = read_mat44_or_identity(header, params.inputs[0]);
    let m1 = read_mat44_or_identity(header, params.inputs[1]);
    let pos = (m1 * m0).w_axis.truncate();
    check_values(diag, RigNodeType::MultMatrixToPos, "position", &pos.to_array());
    write_vec3(header, &params.outputs, pos);
    diag.node_outputs(RigNodeType::MultMatrixToPos, "position", &pos.to_array());
}

pub fn execute_decompose_matrix(
    header: &mut HierarchyHeader<'_>,
    params: &DecomposeMatrixParams,
    diag: &mut dyn Diagnostics,
) {
    let m = read_mat44_or_identity(header, params.input);
    let (translation, rotation, scale) = decompose(&m);
    let local = joint_orient_quat(params.joint_orient).conjugate() * rotation;
    let euler = params.rotate_order.degrees_from_quat(local);

    let node = RigNodeType::DecomposeMatrix;
    check_values(diag, node, "translation", &translation.to_array());
    check_values(diag, node, "rotation", &euler.to_array());
    check_values(diag, node, "scale", &scale.to_array());

    write_vec3(header, &params.output_translate, translation);
    write_vec3(header, &params.output_rotate, euler);
    write_vec3(header, &params.output_scale, scale);
    diag.node_outputs(node, "translate", &translation.to_array());
    diag.node_outputs(node, "rotate", &euler.to_array());
    diag.node_outputs(node, "scale", &scale.to_array());
}

pub fn execute_matrix_to_euler(
    header: &mut HierarchyHeader<'_>,
    params: &MatrixToEulerParams,
    diag: &mut dyn Diagnostics,
) {
    let m = read_mat44_or_identity(header, params.input);
    let euler = params.rotate_order.degrees_from_quat(rotation_of(&m));
    check_values(diag, RigNodeType::MatrixToEuler, "rotation", &euler.to_array());
    write_vec3(header, &params.outputs, euler);
    diag.node_outputs(RigNodeType::MatrixToEuler, "rotate", &euler.to_array());
}

pub fn execute_matrix_to_floats(
    header: &mut HierarchyHeader<'_>,
    params: &MatrixToFloatsParams,
    diag: &mut dyn Diagnostics,
) {
    let values = read_mat44_or_identity(header, params.input).to_cols_array();
    check_values(diag, RigNodeType::MatrixToFloats, "elements", &values);
    for (loc, v) in params.outputs.iter().zip(values) {
        header.write_f32_if_valid(*loc, v);
    }
    diag.node_outputs(RigNodeType::MatrixToFloats, "elements", &values);
}

/// Exponential map (`axis * angle`, radians) of the shortest-path rotation.
pub fn exp_map(q: Quat) -> Vec3 {
    let q = if q.w < 0.0 { -q } else { q };
    let angle = rotation_angle(q);
    let axis = Vec3::new(q.x, q.y, q.z);
    if angle <= f32::EPSILON {
        Vec3::ZERO
    } else {
        axis.normalize_or_zero() * angle
    }
}

pub fn execute_matrix_to_exp_map(
    header: &mut HierarchyHeader<'_>,
    params: &MatrixToExpMapParams,
    diag: &mut dyn Diagnostics,
) {
    let q = if params.use_matrix {
        if params.input_quat.is_valid() {
            header.read_quat(params.input_quat).normalize()
        } else {
            Quat::IDENTITY
        }
    } else {
        let euler = Vec3::new(
            header.read_f32_or(params.inputs[0], 0.0),
            header.read_f32_or(params.inputs[1], 0.0),
            header.read_f32_or(params.inputs[2], 0.0),
        );
        params.rotate_order.quat_from_degrees(euler)
    };
    let out = exp_map(q);
    for v in out.to_array() {
        check_value(diag, RigNodeType::MatrixToExpMap, "exp map", v);
    }
    write_vec3(header, &params.outputs, out);
    diag.node_outputs(RigNodeType::MatrixToExpMap, "expMap", &out.to_array());
}
