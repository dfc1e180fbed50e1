//! Built-in compiled rigs used for integration testing.
//!
//! Both rigs are plain command tables, exactly what the offline compiler emits: raw parenting
//! quads, region-tagged locations, and literal parameter blocks.

use crate::{
    Command, CompiledRig, ConstantCommand, ConstantWrite, CopyCommand, CopyMove,
    DecomposeMatrixParams, Easing, Error, EulerToQuatCommand, InterpolateMatrix1DEntry,
    InterpolateMatrix1DParams, JointParentingQuad, Location, MatrixFormat, MatrixState,
    MultMatrixInput, MultMatrixParams, NodeCommand, ParentingCommand, ParentingElement, Region,
    RotateOrder, Segment,
};
use glam::Mat4;

pub const FLIP_TEST_HIERARCHY_ID: u32 = 0x5c97_c207;
pub const MATRIX_NETWORK_TEST_HIERARCHY_ID: u32 = 0x734b_01e2;

fn quad(elements: [(u16, u32); 4]) -> JointParentingQuad {
    JointParentingQuad {
        elements: elements.map(|(child, parent)| ParentingElement::new(child, parent)),
    }
}

fn parenting(quads: Vec<JointParentingQuad>) -> Command {
    ParentingCommand { quads }.into()
}

fn jp(offset: u32) -> Location {
    Location::new(Region::JointParams, offset)
}

fn jt(offset: u32) -> Location {
    Location::new(Region::JointTransforms, offset)
}

fn scalar(offset: u32) -> Location {
    Location::new(Region::ScalarTable, offset)
}

fn dependency(offset: u32) -> Location {
    Location::new(Region::DependencyTable, offset)
}

/// A 14-joint hierarchy split over two segments.
///
/// Segment 0 resolves `root`, `hip`, `tier1_base`, both tier-1 elbows, and both tier-1 hands,
/// then hands `tier1_base` to segment 1 through dependency table offset 0. Segment 1 resolves
/// `tier2_base` under it, followed by `tier2_neck`, `tier2_b_elbow`, `tier2_f_elbow`, and their
/// children (`tier2_head`, `tier2_b_hand`, `tier2_f_hand`).
///
/// Each segment reads seven joint-params records (336 bytes) and writes eight transform slots
/// (512 bytes, slot 0 being the caller's root); the dependency table needs 64 bytes.
pub fn flip_test() -> Result<CompiledRig, Error> {
    let segment0 = Segment::new(vec![
        parenting(vec![
            quad([(0x10, 0x01); 4]),
            quad([(0x20, 0x41); 4]),
            quad([(0x30, 0x81); 4]),
            quad([(0x40, 0xC1), (0x50, 0xC1), (0x50, 0xC1), (0x50, 0xC1)]),
            quad([(0x60, 0x101), (0x70, 0x141), (0x70, 0x141), (0x70, 0x141)]),
        ]),
        Command::Copy(CopyCommand {
            moves: vec![CopyMove::Matrix {
                src: jt(0xC0),
                dst: dependency(0x00),
            }],
        }),
    ]);
    let segment1 = Segment::new(vec![parenting(vec![
        quad([(0x10, 0x03); 4]),
        quad([(0x20, 0x41), (0x40, 0x41), (0x60, 0x41), (0x60, 0x41)]),
        quad([(0x30, 0x81), (0x50, 0x101), (0x70, 0x181), (0x70, 0x181)]),
    ])]);
    CompiledRig::new("flip_test", FLIP_TEST_HIERARCHY_ID, vec![segment0, segment1])
}

#[rustfmt::skip]
const MATRIX_NETWORK_STATES: [(f32, [f32; 16]); 4] = [
    (-1.0, [
        0.605326, -0.719289, 0.340887, 0.0,
        0.202611, 0.553392, 0.807902, 0.0,
        -0.769759, -0.419977, 0.480719, 0.0,
        0.0, -1.0, 0.0, 1.0,
    ]),
    (0.0, [
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    ]),
    (2.0, [
        0.745519, 0.0549673, -0.664214, 0.0,
        0.529456, 0.556481, 0.640317, 0.0,
        0.404819, -0.82904, 0.385764, 0.0,
        0.0, 2.0, 0.0, 1.0,
    ]),
    (4.0, [
        0.280647, 0.201004, -0.938528, 0.0,
        -0.39505, 0.91535, 0.0779088, 0.0,
        0.874742, 0.3489, 0.336297, 0.0,
        0.0, 4.0, 0.0, 1.0,
    ]),
];

/// Joint-params offset of the matrix network's driver joint translate Y.
pub const MATRIX_NETWORK_DRIVER: u32 = 0x54;
/// Transform slot of the driven joint.
pub const MATRIX_NETWORK_DRIVEN_SLOT: usize = 7;

/// A driver joint keys a matrix through InterpolateMatrix1D; the matrix is passed through
/// MultMatrix, decomposed, and copied onto the driven joint's scale, rotation, and translation.
///
/// One segment. Regions: 336 bytes of joint params (seven joints), 176 bytes of scalar table,
/// 512 bytes of transforms.
pub fn matrix_network_test() -> Result<CompiledRig, Error> {
    let keyed = scalar(0x40);
    let composed = scalar(0x00);

    let constants = Command::Constant(ConstantCommand {
        writes: vec![
            ConstantWrite::Quad {
                dst: jp(0x120),
                value: [0.0, 0.0, 0.0, 1.0],
            },
            ConstantWrite::Quad {
                dst: jp(0x140),
                value: [0.0, 0.0, 0.0, 1.0],
            },
            ConstantWrite::Quad {
                dst: scalar(0x90),
                value: [0.0; 4],
            },
            ConstantWrite::Quad {
                dst: scalar(0xA0),
                value: [0.0; 4],
            },
            ConstantWrite::Word {
                dst: scalar(0x8C),
                value: 0,
            },
        ],
    });

    let interpolate = NodeCommand::InterpolateMatrix1D(InterpolateMatrix1DParams {
        entries: vec![InterpolateMatrix1DEntry {
            input_as_angle: false,
            easing: Easing::Linear,
            pre_infinity: false,
            post_infinity: false,
            states: MATRIX_NETWORK_STATES
                .iter()
                .map(|&(time, matrix)| MatrixState { time, matrix })
                .collect(),
            input: jp(MATRIX_NETWORK_DRIVER),
            output: keyed,
        }],
    });

    let mult = NodeCommand::MultMatrix(MultMatrixParams {
        inputs: vec![MultMatrixInput {
            format: MatrixFormat::Input4x4,
            location: keyed,
            invert: false,
            default: Mat4::IDENTITY.to_cols_array(),
        }],
        output: composed,
    });

    let decompose = NodeCommand::DecomposeMatrix(DecomposeMatrixParams {
        rotate_order: RotateOrder::Xyz,
        joint_orient: [0.0; 3],
        input: composed,
        output_translate: [scalar(0x8C), scalar(0x90), scalar(0x94)],
        output_rotate: [scalar(0x98), scalar(0x9C), scalar(0xA0)],
        output_scale: [scalar(0xA4), scalar(0xA8), scalar(0xAC)],
    });

    let float_move = |src: u32, dst: Location| CopyMove::Float {
        src: scalar(src),
        dst,
    };
    let copies = Command::Copy(CopyCommand {
        moves: vec![
            float_move(0x8C, jp(0x140)),
            float_move(0x90, jp(0x144)),
            float_move(0x94, jp(0x148)),
            float_move(0x98, scalar(0x80)),
            float_move(0x9C, scalar(0x84)),
            float_move(0xA0, scalar(0x88)),
            float_move(0xA4, jp(0x120)),
            float_move(0xA8, jp(0x124)),
            float_move(0xAC, jp(0x128)),
        ],
    });

    let rotation = Command::EulerToQuat(EulerToQuatCommand {
        inputs: [scalar(0x80), scalar(0x84), scalar(0x88)],
        defaults: [0.0; 3],
        rotate_order: RotateOrder::Xyz,
        output: jp(0x130),
    });

    let segment = Segment::new(vec![
        constants,
        interpolate.into(),
        parenting(vec![quad([(0x10, 0x01); 4])]),
        mult.into(),
        parenting(vec![
            quad([(0x20, 0x41), (0x30, 0x41), (0x40, 0x41), (0x50, 0x41)]),
            quad([(0x60, 0x41); 4]),
        ]),
        decompose.into(),
        copies,
        rotation,
        parenting(vec![quad([(0x70, 0x01); 4])]),
    ]);
    CompiledRig::new(
        "matrix_network_test",
        MATRIX_NETWORK_TEST_HIERARCHY_ID,
        vec![segment],
    )
}
