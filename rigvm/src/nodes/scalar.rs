use crate::runtime::diagnostics::{check_value, check_values};
use crate::{
    Diagnostics, FloatPairParams, HierarchyHeader, Location, NormalizeRangeParams,
    PairBlendParams, RigNodeType, RotateOrder, lerp, wrap_degrees,
};
use glam::Vec3;

/// Remaps `input` from the input range onto the output range, clamped at both ends.
pub fn normalize_range(params: &NormalizeRangeParams, input: f32) -> f32 {
    debug_assert!(
        params.input_min != params.input_max,
        "NormalizeRange: input_min == input_max ({})",
        params.input_min
    );
    let input = if params.input_as_angle {
        wrap_degrees(input)
    } else {
        input
    };
    let range = params.input_max - params.input_min;
    let t = if range != 0.0 {
        ((input - params.input_min) / range).clamp(0.0, 1.0)
    } else {
        0.0
    };
    lerp(params.output_min, params.output_max, params.easing.apply(t))
}

pub fn execute_normalize_range(
    header: &mut HierarchyHeader<'_>,
    params: &NormalizeRangeParams,
    node: RigNodeType,
    diag: &mut dyn Diagnostics,
) {
    let input = header.read_f32_or(params.input, params.input_min);
    let output = normalize_range(params, input);
    check_value(diag, node, "output", output);
    header.write_f32_if_valid(params.output, output);
    diag.node_outputs(node, "output", &[output]);
}

fn read_pair(header: &HierarchyHeader<'_>, params: &FloatPairParams) -> (f32, f32) {
    (
        header.read_f32_or(params.inputs[0], params.defaults[0]),
        header.read_f32_or(params.inputs[1], params.defaults[1]),
    )
}

pub fn execute_add_double_linear(
    header: &mut HierarchyHeader<'_>,
    params: &FloatPairParams,
    diag: &mut dyn Diagnostics,
) {
    let (a, b) = read_pair(header, params);
    check_value(diag, RigNodeType::AddDoubleLinear, "output", a + b);
    header.write_f32_if_valid(params.output, a + b);
    diag.node_outputs(RigNodeType::AddDoubleLinear, "output", &[a + b]);
}

pub fn execute_mult_double_linear(
    header: &mut HierarchyHeader<'_>,
    params: &FloatPairParams,
    diag: &mut dyn Diagnostics,
) {
    let (a, b) = read_pair(header, params);
    check_value(diag, RigNodeType::MultDoubleLinear, "output", a * b);
    header.write_f32_if_valid(params.output, a * b);
    diag.node_outputs(RigNodeType::MultDoubleLinear, "output", &[a * b]);
}

fn read_vec3_if(
    header: &HierarchyHeader<'_>,
    connected: bool,
    locs: &[Location],
    default: [f32; 3],
) -> Vec3 {
    if connected {
        Vec3::new(
            header.read_f32_or(locs[0], default[0]),
            header.read_f32_or(locs[1], default[1]),
            header.read_f32_or(locs[2], default[2]),
        )
    } else {
        Vec3::from_array(default)
    }
}

/// Blends two translate/rotate pairs: translations linearly, rotations by slerp.
pub fn execute_pair_blend(
    header: &mut HierarchyHeader<'_>,
    params: &PairBlendParams,
    diag: &mut dyn Diagnostics,
) {
    let flags = params.flags;
    let locs = &params.locations;
    let connected = |flag: u32| flags & flag != 0;

    let t1 = read_vec3_if(
        header,
        connected(PairBlendParams::IN_TRANSLATE1_CONNECTED),
        &locs[0..3],
        params.translate1,
    );
    let t2 = read_vec3_if(
        header,
        connected(PairBlendParams::IN_TRANSLATE2_CONNECTED),
        &locs[3..6],
        params.translate2,
    );
    let r1 = read_vec3_if(
        header,
        connected(PairBlendParams::IN_ROTATE1_CONNECTED),
        &locs[6..9],
        params.rotate_deg1,
    );
    let r2 = read_vec3_if(
        header,
        connected(PairBlendParams::IN_ROTATE2_CONNECTED),
        &locs[9..12],
        params.rotate_deg2,
    );
    let weight = if connected(PairBlendParams::IN_WEIGHT_CONNECTED) {
        header.read_f32_or(locs[12], params.weight)
    } else {
        params.weight
    };
    let weight = weight.clamp(0.0, 1.0);

    if connected(PairBlendParams::OUT_TRANSLATE_CONNECTED) {
        let t = t1.lerp(t2, weight);
        check_values(diag, RigNodeType::PairBlend, "translate", &t.to_array());
        for (loc, value) in locs[13..16].iter().zip(t.to_array()) {
            header.write_f32_if_valid(*loc, value);
        }
        diag.node_outputs(RigNodeType::PairBlend, "outTranslate", &t.to_array());
    }
    if connected(PairBlendParams::OUT_ROTATE_CONNECTED) {
        let q1 = RotateOrder::Xyz.quat_from_degrees(r1);
        let q2 = RotateOrder::Xyz.quat_from_degrees(r2);
        let r = RotateOrder::Xyz.degrees_from_quat(q1.slerp(q2, weight));
        check_values(diag, RigNodeType::PairBlend, "rotate", &r.to_array());
        for (loc, value) in locs[16..19].iter().zip(r.to_array()) {
            header.write_f32_if_valid(*loc, value);
        }
        diag.node_outputs(RigNodeType::PairBlend, "outRotate", &r.to_array());
    }
}
