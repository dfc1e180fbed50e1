use crate::{Easing, Location, RotateOrder};

#[cfg(feature = "json")]
use serde::Deserialize;

/// An offline-compiled rig: a fixed list of segments, each a straight-line command schedule.
///
/// Only built through [`CompiledRig::new`] (or the JSON loader), so every rig has passed
/// validation.
#[derive(Clone, Debug)]
pub struct CompiledRig {
    pub(crate) name: String,
    /// Content id the calling code was built against; checked on every evaluation.
    pub(crate) hierarchy_id: u32,
    pub(crate) segments: Vec<Segment>,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct Segment {
    #[cfg_attr(feature = "json", serde(default))]
    pub commands: Vec<Command>,
}

/// One instruction of a segment schedule.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "op", rename_all = "snake_case"))]
pub enum Command {
    Parenting(ParentingCommand),
    Constant(ConstantCommand),
    Copy(CopyCommand),
    EulerToQuat(EulerToQuatCommand),
    Node(NodeCommand),
}

/// `(child, parent)` pair of the parenting resolver.
///
/// `child` counts 16-byte units: slot `child >> 4` of the resolved transforms, fed by joint
/// `slot - 1` of the joint-params region. `parent` is the raw value of a region-tagged
/// [`Location`] of a resolved transform; `0` is "no parent".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct ParentingElement {
    pub child: u16,
    pub parent: u32,
}

impl ParentingElement {
    pub const fn new(child: u16, parent: u32) -> Self {
        Self { child, parent }
    }

    pub fn slot(&self) -> usize {
        (self.child >> 4) as usize
    }

    pub fn parent_location(&self) -> Option<Location> {
        (self.parent != 0).then(|| Location::from_raw(self.parent))
    }
}

/// Four joints resolved together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JointParentingQuad {
    pub elements: [ParentingElement; 4],
}

#[derive(Clone, Debug, Default)]
pub struct ParentingCommand {
    pub quads: Vec<JointParentingQuad>,
}

impl ParentingCommand {
    /// Packs elements into quads, padding the last quad by repeating its last element.
    pub fn from_elements(elements: &[ParentingElement]) -> Self {
        let quads = elements
            .chunks(4)
            .map(|chunk| {
                let last = chunk[chunk.len() - 1];
                let mut quad = [last; 4];
                quad[..chunk.len()].copy_from_slice(chunk);
                JointParentingQuad { elements: quad }
            })
            .collect();
        Self { quads }
    }

    pub fn elements(&self) -> impl Iterator<Item = &ParentingElement> {
        self.quads.iter().flat_map(|q| q.elements.iter())
    }
}

#[cfg(feature = "json")]
impl<'de> Deserialize<'de> for ParentingCommand {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            elements: Vec<ParentingElement>,
        }
        let raw = Raw::deserialize(deserializer)?;
        Ok(Self::from_elements(&raw.elements))
    }
}

/// Literal writes used to seed default driven state.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct ConstantCommand {
    pub writes: Vec<ConstantWrite>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ConstantWrite {
    Float { dst: Location, value: f32 },
    Word { dst: Location, value: u32 },
    Quad { dst: Location, value: [f32; 4] },
}

/// Raw memory moves between regions.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct CopyCommand {
    pub moves: Vec<CopyMove>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CopyMove {
    Float { src: Location, dst: Location },
    Quad { src: Location, dst: Location },
    Matrix { src: Location, dst: Location },
}

/// Driven rotation: three Euler scalars (degrees) to a quaternion quadword.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct EulerToQuatCommand {
    pub inputs: [Location; 3],
    #[cfg_attr(feature = "json", serde(default))]
    pub defaults: [f32; 3],
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    pub output: Location,
}

/// Authoring-tool node kinds, in opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RigNodeType {
    MeasureCone,
    MeasureTwist,
    InterpolateRbf,
    MatrixToFloats,
    RivetPlane,
    PointPoser,
    FatConstraint,
    MultMatrixToPos,
    MatrixToEuler,
    SetRange,
    AddDoubleLinear,
    MultDoubleLinear,
    MatrixToExpMap,
    AngleDriver,
    BendTwistDriver,
    DecomposeMatrix,
    InterpolateMatrix1D,
    InterpolateMatrixArray,
    MultMatrix,
    NormalizeRange,
    PairBlend,
    Wachspress,
    InterpolateMatrixArray16,
}

impl RigNodeType {
    pub const FIRST_OPCODE: u8 = 0x80;

    pub const ALL: [RigNodeType; 23] = [
        RigNodeType::MeasureCone,
        RigNodeType::MeasureTwist,
        RigNodeType::InterpolateRbf,
        RigNodeType::MatrixToFloats,
        RigNodeType::RivetPlane,
        RigNodeType::PointPoser,
        RigNodeType::FatConstraint,
        RigNodeType::MultMatrixToPos,
        RigNodeType::MatrixToEuler,
        RigNodeType::SetRange,
        RigNodeType::AddDoubleLinear,
        RigNodeType::MultDoubleLinear,
        RigNodeType::MatrixToExpMap,
        RigNodeType::AngleDriver,
        RigNodeType::BendTwistDriver,
        RigNodeType::DecomposeMatrix,
        RigNodeType::InterpolateMatrix1D,
        RigNodeType::InterpolateMatrixArray,
        RigNodeType::MultMatrix,
        RigNodeType::NormalizeRange,
        RigNodeType::PairBlend,
        RigNodeType::Wachspress,
        RigNodeType::InterpolateMatrixArray16,
    ];

    pub fn opcode(self) -> u8 {
        Self::FIRST_OPCODE + self.index() as u8
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_opcode(opcode: u8) -> Option<Self> {
        let index = opcode.checked_sub(Self::FIRST_OPCODE)? as usize;
        Self::ALL.get(index).copied()
    }

    /// Display name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            RigNodeType::MeasureCone => "Measure Cone",
            RigNodeType::MeasureTwist => "Measure Twist",
            RigNodeType::InterpolateRbf => "Interpolate Rbf",
            RigNodeType::MatrixToFloats => "Matrix To Floats",
            RigNodeType::RivetPlane => "Rivet Plane",
            RigNodeType::PointPoser => "Point Poser",
            RigNodeType::FatConstraint => "Fat Constraint",
            RigNodeType::MultMatrixToPos => "Mult Matrix To Pos",
            RigNodeType::MatrixToEuler => "Matrix To Euler",
            RigNodeType::SetRange => "Set Range",
            RigNodeType::AddDoubleLinear => "Add Double Linear",
            RigNodeType::MultDoubleLinear => "Mult Double Linear",
            RigNodeType::MatrixToExpMap => "Matrix To Exp Map",
            RigNodeType::AngleDriver => "Angle Driver",
            RigNodeType::BendTwistDriver => "Bend Twist Driver",
            RigNodeType::DecomposeMatrix => "Decompose Matrix",
            RigNodeType::InterpolateMatrix1D => "Interpolate Matrix 1D",
            RigNodeType::InterpolateMatrixArray => "Interpolate Matrix Array",
            RigNodeType::MultMatrix => "Mult Matrix",
            RigNodeType::NormalizeRange => "Normalize Range",
            RigNodeType::PairBlend => "Pair Blend",
            RigNodeType::Wachspress => "Wachspress",
            RigNodeType::InterpolateMatrixArray16 => "Interp. Matrix Array 16",
        }
    }
}

/// A procedural node invocation with its parameter block.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "type", rename_all = "snake_case"))]
pub enum NodeCommand {
    MeasureCone(InputControlDriverParams),
    MeasureTwist(InputControlDriverParams),
    InterpolateRbf(InterpolateRbfParams),
    MatrixToFloats(MatrixToFloatsParams),
    RivetPlane(RivetPlaneParams),
    PointPoser(PointPoserParams),
    FatConstraint(FatConstraintParams),
    MultMatrixToPos(MultMatrixToPosParams),
    MatrixToEuler(MatrixToEulerParams),
    SetRange(NormalizeRangeParams),
    AddDoubleLinear(FloatPairParams),
    MultDoubleLinear(FloatPairParams),
    MatrixToExpMap(MatrixToExpMapParams),
    AngleDriver(AngleDriverParams),
    BendTwistDriver(BendTwistDriverParams),
    DecomposeMatrix(DecomposeMatrixParams),
    InterpolateMatrix1D(InterpolateMatrix1DParams),
    InterpolateMatrixArray(InterpolateMatrixArrayParams),
    MultMatrix(MultMatrixParams),
    NormalizeRange(NormalizeRangeParams),
    PairBlend(PairBlendParams),
    Wachspress(WachspressParams),
    InterpolateMatrixArray16(InterpolateMatrixArray16Params),
}

impl NodeCommand {
    pub fn node_type(&self) -> RigNodeType {
        match self {
            NodeCommand::MeasureCone(_) => RigNodeType::MeasureCone,
            NodeCommand::MeasureTwist(_) => RigNodeType::MeasureTwist,
            NodeCommand::InterpolateRbf(_) => RigNodeType::InterpolateRbf,
            NodeCommand::MatrixToFloats(_) => RigNodeType::MatrixToFloats,
            NodeCommand::RivetPlane(_) => RigNodeType::RivetPlane,
            NodeCommand::PointPoser(_) => RigNodeType::PointPoser,
            NodeCommand::FatConstraint(_) => RigNodeType::FatConstraint,
            NodeCommand::MultMatrixToPos(_) => RigNodeType::MultMatrixToPos,
            NodeCommand::MatrixToEuler(_) => RigNodeType::MatrixToEuler,
            NodeCommand::SetRange(_) => RigNodeType::SetRange,
            NodeCommand::AddDoubleLinear(_) => RigNodeType::AddDoubleLinear,
            NodeCommand::MultDoubleLinear(_) => RigNodeType::MultDoubleLinear,
            NodeCommand::MatrixToExpMap(_) => RigNodeType::MatrixToExpMap,
            NodeCommand::AngleDriver(_) => RigNodeType::AngleDriver,
            NodeCommand::BendTwistDriver(_) => RigNodeType::BendTwistDriver,
            NodeCommand::DecomposeMatrix(_) => RigNodeType::DecomposeMatrix,
            NodeCommand::InterpolateMatrix1D(_) => RigNodeType::InterpolateMatrix1D,
            NodeCommand::InterpolateMatrixArray(_) => RigNodeType::InterpolateMatrixArray,
            NodeCommand::MultMatrix(_) => RigNodeType::MultMatrix,
            NodeCommand::NormalizeRange(_) => RigNodeType::NormalizeRange,
            NodeCommand::PairBlend(_) => RigNodeType::PairBlend,
            NodeCommand::Wachspress(_) => RigNodeType::Wachspress,
            NodeCommand::InterpolateMatrixArray16(_) => RigNodeType::InterpolateMatrixArray16,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum Axis {
    #[default]
    X,
    Y,
    Z,
}

impl Axis {
    pub fn from_index(value: u32) -> Self {
        match value {
            1 => Axis::Y,
            2 => Axis::Z,
            _ => Axis::X,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> glam::Vec3 {
        match self {
            Axis::X => glam::Vec3::X,
            Axis::Y => glam::Vec3::Y,
            Axis::Z => glam::Vec3::Z,
        }
    }
}

/// Shared block of `MeasureCone` and `MeasureTwist`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InputControlDriverParams {
    /// Reference pose in parent space (x, y, z, w).
    pub ref_pose: [f32; 4],
    pub twist_ref_pose: [f32; 4],
    pub input_quat: Location,
    pub primary_axis: Axis,
    pub twist_axis: Axis,
    #[cfg_attr(feature = "json", serde(default))]
    pub input_twist_angle: Location,
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
    pub output: Location,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum RbfKernel {
    Gauss,
    Gauss2,
    #[default]
    Linear,
    Hardy,
    MultiQuadratic,
    InverseMultiQuadratic,
    InverseNorm,
    Cubic,
    ThinPlate,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateRbfParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub node_name: String,
    #[cfg_attr(feature = "json", serde(default))]
    pub kernel: RbfKernel,
    pub epsilon: f32,
    pub inputs: Vec<Location>,
    pub outputs: Vec<Location>,
    /// `num_poses * inputs.len()` authored input vectors, pose-major.
    pub poses: Vec<f32>,
    /// `num_poses * outputs.len()` solved weights, indexed `[pose * num_outputs + output]`.
    pub weights: Vec<f32>,
}

impl InterpolateRbfParams {
    pub fn num_poses(&self) -> usize {
        if self.inputs.is_empty() {
            0
        } else {
            self.poses.len() / self.inputs.len()
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MatrixToFloatsParams {
    pub input: Location,
    /// Column-major element outputs; invalid entries are unconnected.
    pub outputs: [Location; 16],
}

/// What a rivet output slot receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum RivetOutput {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    StretchU,
    StretchV,
}

impl RivetOutput {
    pub fn from_index(value: u32) -> Option<Self> {
        Some(match value {
            0 => RivetOutput::TranslateX,
            1 => RivetOutput::TranslateY,
            2 => RivetOutput::TranslateZ,
            3 => RivetOutput::RotateX,
            4 => RivetOutput::RotateY,
            5 => RivetOutput::RotateZ,
            6 => RivetOutput::StretchU,
            7 => RivetOutput::StretchV,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct RivetOutputInfo {
    pub kind: RivetOutput,
    pub location: Location,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct RivetPlaneParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub node_name: String,
    pub point_u: f32,
    pub point_v: f32,
    pub scale_multiplier_u: f32,
    pub scale_multiplier_v: f32,
    pub bulge_shrink_u: f32,
    pub bulge_shrink_v: f32,
    pub bulge_stretch_u: f32,
    pub bulge_stretch_v: f32,
    pub normal_offset: f32,
    /// XYZ radians.
    pub joint_orient: [f32; 3],
    /// Resolved transforms of the skinning joints.
    pub joint_inputs: Vec<Location>,
    /// Twelve scalars (four points) when the plane points are driven.
    #[cfg_attr(feature = "json", serde(default))]
    pub driven_points: Option<[Location; 12]>,
    pub parent: Location,
    pub outputs: Vec<RivetOutputInfo>,
    /// Rest plane points in 'Z' order.
    pub plane_points: [[f32; 3]; 4],
    /// Column-major inverse bind matrices, one per skinning joint.
    pub inverse_bind_poses: Vec<[f32; 16]>,
    /// `[point * num_joints + joint]`.
    pub skinning_weights: Vec<f32>,
    #[cfg_attr(feature = "json", serde(default))]
    pub input_scale_factors: Option<Vec<f32>>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct PointPoserParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub node_name: String,
    /// One weight per pose.
    pub inputs: Vec<Location>,
    /// Three scalars per point.
    pub outputs: Vec<Location>,
    /// `[pose][point]` xyz deltas, pose-major.
    pub pose_points: Vec<[f32; 3]>,
}

impl PointPoserParams {
    pub fn num_points(&self) -> usize {
        self.outputs.len() / 3
    }
}

/// Debug override values; negative (or positive for the negative limits) means "keep".
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FatConstraintOverrides {
    pub rotate_weight: f32,
    pub scale_weight: f32,
    pub translate_weight: f32,
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub limit_positive: [f32; 3],
    pub limit_negative: [f32; 3],
    pub limit_smooth_percent: f32,
    pub use_limit: Option<bool>,
}

impl Default for FatConstraintOverrides {
    fn default() -> Self {
        Self {
            rotate_weight: -1.0,
            scale_weight: -1.0,
            translate_weight: -1.0,
            mass: -1.0,
            stiffness: -1.0,
            damping: -1.0,
            limit_positive: [-1.0; 3],
            limit_negative: [1.0; 3],
            limit_smooth_percent: -1.0,
            use_limit: None,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct FatConstraintParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub node_name: String,
    pub in_matrix: Location,
    pub space_matrix: Location,
    pub limit_matrix: Location,
    pub relative_matrix: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_weight: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub scale_weight: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub translate_weight: Location,
    /// Column-major.
    pub offset_matrix: [f32; 16],
    pub rotate_weight_default: f32,
    pub scale_weight_default: f32,
    pub translate_weight_default: f32,
    pub mass: f32,
    pub stiffness: f32,
    pub damping: f32,
    pub limit_positive: [f32; 3],
    pub limit_negative: [f32; 3],
    pub limit_smooth_percent: f32,
    #[cfg_attr(feature = "json", serde(default))]
    pub flags: u32,
    /// Rotate xyz, scale xyz, translate xyz.
    pub outputs: [Location; 9],
    /// Byte offset of this node's state in the character's persistent data.
    pub persistent_data_offset: u32,
}

impl FatConstraintParams {
    pub const USE_LIMIT: u32 = 1;
    pub const IN_MATRIX_IS_MAT44: u32 = 2;
    pub const SPACE_MATRIX_IS_MAT44: u32 = 4;
    pub const LIMIT_MATRIX_IS_MAT44: u32 = 8;
    pub const RELATIVE_MATRIX_IS_MAT44: u32 = 16;

    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// A copy with every override field that is set applied.
    pub fn with_overrides(&self, overrides: &FatConstraintOverrides) -> Self {
        let mut params = self.clone();
        let apply_if_set = |value: f32, current: &mut f32| {
            if value >= 0.0 {
                *current = value;
            }
        };
        apply_if_set(overrides.rotate_weight, &mut params.rotate_weight_default);
        apply_if_set(overrides.scale_weight, &mut params.scale_weight_default);
        apply_if_set(overrides.translate_weight, &mut params.translate_weight_default);
        apply_if_set(overrides.mass, &mut params.mass);
        apply_if_set(overrides.stiffness, &mut params.stiffness);
        apply_if_set(overrides.damping, &mut params.damping);
        for axis in 0..3 {
            apply_if_set(
                overrides.limit_positive[axis],
                &mut params.limit_positive[axis],
            );
            if overrides.limit_negative[axis] <= 0.0 {
                params.limit_negative[axis] = overrides.limit_negative[axis];
            }
        }
        apply_if_set(
            overrides.limit_smooth_percent,
            &mut params.limit_smooth_percent,
        );
        match overrides.use_limit {
            Some(true) => params.flags |= Self::USE_LIMIT,
            Some(false) => params.flags &= !Self::USE_LIMIT,
            None => {}
        }
        params
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MultMatrixToPosParams {
    pub inputs: [Location; 2],
    pub outputs: [Location; 3],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MatrixToEulerParams {
    pub input: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    pub outputs: [Location; 3],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct NormalizeRangeParams {
    pub input_min: f32,
    pub input_max: f32,
    pub output_min: f32,
    pub output_max: f32,
    #[cfg_attr(feature = "json", serde(default))]
    pub easing: Easing,
    #[cfg_attr(feature = "json", serde(default))]
    pub input_as_angle: bool,
    pub input: Location,
    pub output: Location,
}

/// Two-operand scalar node (`AddDoubleLinear`, `MultDoubleLinear`).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct FloatPairParams {
    pub inputs: [Location; 2],
    #[cfg_attr(feature = "json", serde(default))]
    pub defaults: [f32; 2],
    pub output: Location,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MatrixToExpMapParams {
    /// Read the rotation from `input_quat` instead of the Euler inputs.
    pub use_matrix: bool,
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    #[cfg_attr(feature = "json", serde(default))]
    pub input_quat: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub inputs: [Location; 3],
    pub outputs: [Location; 3],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct AngleDriverParams {
    pub roll_axis: Axis,
    pub yaw_axis: Axis,
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    #[cfg_attr(feature = "json", serde(default))]
    pub joint_orient: [f32; 3],
    /// JointParams record.
    pub input_sqt: Location,
    pub output_yaw: Location,
    pub output_pitch: Location,
    pub output_roll: Location,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum BendTwistMode {
    /// `rotation = swing * twist`
    #[default]
    SwingThenTwist,
    /// `rotation = twist * swing`
    TwistThenSwing,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct BendTwistDriverParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub mode: BendTwistMode,
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    pub weight: f32,
    pub aim_vector: [f32; 3],
    #[cfg_attr(feature = "json", serde(default))]
    pub joint_orient: [f32; 3],
    /// JointParams record.
    pub input_sqt: Location,
    pub output_bend: [Location; 3],
    pub output_twist: [Location; 3],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct DecomposeMatrixParams {
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate_order: RotateOrder,
    #[cfg_attr(feature = "json", serde(default))]
    pub joint_orient: [f32; 3],
    pub input: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub output_translate: [Location; 3],
    #[cfg_attr(feature = "json", serde(default))]
    pub output_rotate: [Location; 3],
    #[cfg_attr(feature = "json", serde(default))]
    pub output_scale: [Location; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MatrixState {
    pub time: f32,
    /// Column-major.
    pub matrix: [f32; 16],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrix1DEntry {
    #[cfg_attr(feature = "json", serde(default))]
    pub input_as_angle: bool,
    #[cfg_attr(feature = "json", serde(default))]
    pub easing: Easing,
    #[cfg_attr(feature = "json", serde(default))]
    pub pre_infinity: bool,
    #[cfg_attr(feature = "json", serde(default))]
    pub post_infinity: bool,
    /// Sorted by time.
    pub states: Vec<MatrixState>,
    pub input: Location,
    pub output: Location,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrix1DParams {
    pub entries: Vec<InterpolateMatrix1DEntry>,
}

/// Authored positions and rotations of a constant matrix array.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct PositionsAndQuats {
    pub positions: [[f32; 3]; 4],
    pub quats: [[f32; 4]; 4],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "kind", rename_all = "snake_case"))]
pub enum MatrixArraySource {
    Constant(PositionsAndQuats),
    Inputs {
        locations: [Location; 4],
        /// Column-major defaults for unconnected inputs.
        defaults: [[f32; 16]; 4],
    },
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrixArrayEntry {
    pub num_matrices: u32,
    pub matrices: MatrixArraySource,
    pub weights: [Location; 4],
    pub default_weights: [f32; 4],
    pub output: Location,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrixArrayParams {
    pub entries: Vec<InterpolateMatrixArrayEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct QuatAndPos {
    pub quat: [f32; 4],
    pub pos: [f32; 3],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrixArray16Entry {
    /// Sixteen pose weights (four groups of four) then four group weights.
    pub weights: [Location; 20],
    pub poses: [QuatAndPos; 16],
    pub output: Location,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct InterpolateMatrixArray16Params {
    pub entries: Vec<InterpolateMatrixArray16Entry>,
}

/// Encoding of one `MultMatrix` input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum MatrixFormat {
    /// Always the authored default.
    Constant,
    /// A JointParams record.
    Sqt,
    /// A resolved joint transform record.
    Transform3x4,
    /// An intermediate column-major 4x4.
    Input4x4,
}

impl MatrixFormat {
    pub fn from_index(value: u32) -> Self {
        match value {
            1 => MatrixFormat::Sqt,
            2 => MatrixFormat::Transform3x4,
            3 => MatrixFormat::Input4x4,
            _ => MatrixFormat::Constant,
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MultMatrixInput {
    pub format: MatrixFormat,
    #[cfg_attr(feature = "json", serde(default))]
    pub location: Location,
    #[cfg_attr(feature = "json", serde(default))]
    pub invert: bool,
    /// Column-major.
    pub default: [f32; 16],
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct MultMatrixParams {
    pub inputs: Vec<MultMatrixInput>,
    pub output: Location,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct PairBlendParams {
    pub translate1: [f32; 3],
    pub translate2: [f32; 3],
    pub rotate_deg1: [f32; 3],
    pub rotate_deg2: [f32; 3],
    pub weight: f32,
    pub flags: u32,
    /// translate1 xyz, translate2 xyz, rotate1 xyz, rotate2 xyz, weight, out translate xyz,
    /// out rotate xyz.
    pub locations: [Location; 19],
}

impl PairBlendParams {
    pub const IN_TRANSLATE1_CONNECTED: u32 = 1 << 0;
    pub const IN_TRANSLATE2_CONNECTED: u32 = 1 << 1;
    pub const IN_ROTATE1_CONNECTED: u32 = 1 << 2;
    pub const IN_ROTATE2_CONNECTED: u32 = 1 << 3;
    pub const IN_WEIGHT_CONNECTED: u32 = 1 << 4;
    pub const OUT_TRANSLATE_CONNECTED: u32 = 1 << 5;
    pub const OUT_ROTATE_CONNECTED: u32 = 1 << 6;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum WachspressMode {
    /// Axis-aligned bilinear weights; what compiled rigs expect.
    #[default]
    Bilinear,
    /// Generalized barycentric coordinates of a convex quad.
    Generalized,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct WachspressEntry {
    /// Quad corners, counter-clockwise; only x and y are used.
    pub points: [[f32; 3]; 4],
    pub input_defaults: [f32; 3],
    pub inputs: [Location; 3],
    pub outputs: [Location; 4],
    #[cfg_attr(feature = "json", serde(default))]
    pub mode: WachspressMode,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "json", derive(Deserialize))]
pub struct WachspressParams {
    pub entries: Vec<WachspressEntry>,
}
