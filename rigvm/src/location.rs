//! Offset addressing into the four per-evaluation memory regions.
//!
//! A compiled rig never holds references. Every input and output is a [`Location`]: a byte
//! offset tagged with the region it lives in, resolved against a
//! [`HierarchyHeader`](crate::HierarchyHeader) at evaluation time.

use glam::{Mat4, Quat, Vec3, Vec4};
use std::fmt;

/// Addressable memory regions of one hierarchy evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    /// Per-joint local scale/rotation/translation records ([`JointParams`]).
    JointParams,
    /// Resolved joint transforms written by the parenting resolver.
    JointTransforms,
    /// Flat float table for driven scalar values and intermediate matrices.
    ScalarTable,
    /// Scratch space shared between segments.
    DependencyTable,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::JointParams,
        Region::JointTransforms,
        Region::ScalarTable,
        Region::DependencyTable,
    ];

    pub fn tag(self) -> u32 {
        match self {
            Region::JointParams => 0,
            Region::JointTransforms => 1,
            Region::ScalarTable => 2,
            Region::DependencyTable => 3,
        }
    }

    pub fn from_tag(tag: u32) -> Self {
        match tag & Location::TAG_MASK {
            0 => Region::JointParams,
            1 => Region::JointTransforms,
            2 => Region::ScalarTable,
            _ => Region::DependencyTable,
        }
    }
}

/// A region-tagged byte offset.
///
/// The low two bits select the [`Region`]; the remaining bits are the byte offset, which is
/// always 4-byte aligned. [`Location::INVALID`] means "use the default value".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location(u32);

impl Location {
    pub const INVALID: Location = Location(u32::MAX);

    const TAG_MASK: u32 = 3;

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn new(region: Region, byte_offset: u32) -> Self {
        debug_assert_eq!(byte_offset & Self::TAG_MASK, 0, "unaligned location offset");
        Self((byte_offset & !Self::TAG_MASK) | region.tag())
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn region(self) -> Region {
        Region::from_tag(self.0)
    }

    pub fn offset(self) -> usize {
        (self.0 & !Self::TAG_MASK) as usize
    }

    /// Table-relative addressing: the same region, `bytes` further along.
    pub fn offset_by(self, bytes: u32) -> Self {
        debug_assert!(self.is_valid(), "offsetting an invalid location");
        Self::new(self.region(), self.offset() as u32 + bytes)
    }

    /// The location of the `index`-th f32 of a float array starting here.
    pub fn float_at(self, index: usize) -> Self {
        self.offset_by((index * 4) as u32)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Location({:?}+{:#x})", self.region(), self.offset())
        } else {
            f.write_str("Location(invalid)")
        }
    }
}

/// Size in bytes of a [`JointParams`] record.
pub const JOINT_PARAMS_SIZE: usize = 48;
/// Size in bytes of a resolved joint transform or intermediate 4x4 matrix.
pub const MATRIX_SIZE: usize = 64;
/// Size in bytes of a quadword.
pub const QUAD_SIZE: usize = 16;

/// A joint's local pose: scale @0, rotation quaternion @16, translation @32.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointParams {
    pub scale: Vec4,
    pub quat: Quat,
    pub translation: Vec4,
}

impl Default for JointParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointParams {
    pub const IDENTITY: JointParams = JointParams {
        scale: Vec4::ONE,
        quat: Quat::IDENTITY,
        translation: Vec4::W,
    };

    pub const SCALE_OFFSET: u32 = 0;
    pub const QUAT_OFFSET: u32 = 16;
    pub const TRANSLATION_OFFSET: u32 = 32;

    pub fn new(translation: Vec3, quat: Quat, scale: Vec3) -> Self {
        Self {
            scale: scale.extend(1.0),
            quat,
            translation: translation.extend(1.0),
        }
    }

    /// `T * R * S`.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale.truncate(),
            self.quat,
            self.translation.truncate(),
        )
    }
}
