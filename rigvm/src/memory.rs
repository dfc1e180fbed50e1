use crate::{JOINT_PARAMS_SIZE, JointParams, Location, MATRIX_SIZE, QUAD_SIZE, Region};
use byteorder::{ByteOrder, LittleEndian};
use glam::{Mat4, Quat, Vec4};

/// The four memory regions of one segment evaluation, borrowed from the caller's
/// [`SegmentContext`](crate::SegmentContext).
///
/// All values are little-endian. Accessors panic on out-of-range offsets; the compiled rig
/// guarantees region sizes, so an out-of-range access is a malformed rig.
pub struct HierarchyHeader<'a> {
    joint_params: &'a mut [u8],
    joint_transforms: &'a mut [u8],
    scalar_table: &'a mut [u8],
    dependency_table: &'a mut [u8],
}

impl<'a> HierarchyHeader<'a> {
    pub fn new(
        joint_params: &'a mut [u8],
        joint_transforms: &'a mut [u8],
        scalar_table: &'a mut [u8],
        dependency_table: &'a mut [u8],
    ) -> Self {
        Self {
            joint_params,
            joint_transforms,
            scalar_table,
            dependency_table,
        }
    }

    fn region(&self, region: Region) -> &[u8] {
        match region {
            Region::JointParams => &*self.joint_params,
            Region::JointTransforms => &*self.joint_transforms,
            Region::ScalarTable => &*self.scalar_table,
            Region::DependencyTable => &*self.dependency_table,
        }
    }

    fn region_mut(&mut self, region: Region) -> &mut [u8] {
        match region {
            Region::JointParams => &mut *self.joint_params,
            Region::JointTransforms => &mut *self.joint_transforms,
            Region::ScalarTable => &mut *self.scalar_table,
            Region::DependencyTable => &mut *self.dependency_table,
        }
    }

    fn bytes(&self, loc: Location, len: usize) -> &[u8] {
        debug_assert!(loc.is_valid(), "read through an invalid location");
        let start = loc.offset();
        &self.region(loc.region())[start..start + len]
    }

    fn bytes_mut(&mut self, loc: Location, len: usize) -> &mut [u8] {
        debug_assert!(loc.is_valid(), "write through an invalid location");
        let start = loc.offset();
        &mut self.region_mut(loc.region())[start..start + len]
    }

    pub fn region_len(&self, region: Region) -> usize {
        self.region(region).len()
    }

    pub fn read_f32(&self, loc: Location) -> f32 {
        LittleEndian::read_f32(self.bytes(loc, 4))
    }

    pub fn write_f32(&mut self, loc: Location, value: f32) {
        LittleEndian::write_f32(self.bytes_mut(loc, 4), value);
    }

    /// Reads `loc`, or returns `default` for [`Location::INVALID`].
    pub fn read_f32_or(&self, loc: Location, default: f32) -> f32 {
        if loc.is_valid() {
            self.read_f32(loc)
        } else {
            default
        }
    }

    /// Writes `value` unless `loc` is invalid (an unconnected output).
    pub fn write_f32_if_valid(&mut self, loc: Location, value: f32) {
        if loc.is_valid() {
            self.write_f32(loc, value);
        }
    }

    pub fn read_u32(&self, loc: Location) -> u32 {
        LittleEndian::read_u32(self.bytes(loc, 4))
    }

    pub fn write_u32(&mut self, loc: Location, value: u32) {
        LittleEndian::write_u32(self.bytes_mut(loc, 4), value);
    }

    pub fn read_quad(&self, loc: Location) -> Vec4 {
        let mut v = [0.0f32; 4];
        LittleEndian::read_f32_into(self.bytes(loc, QUAD_SIZE), &mut v);
        Vec4::from_array(v)
    }

    pub fn write_quad(&mut self, loc: Location, value: Vec4) {
        LittleEndian::write_f32_into(&value.to_array(), self.bytes_mut(loc, QUAD_SIZE));
    }

    pub fn read_quat(&self, loc: Location) -> Quat {
        Quat::from_vec4(self.read_quad(loc))
    }

    pub fn write_quat(&mut self, loc: Location, value: Quat) {
        self.write_quad(loc, Vec4::from(value));
    }

    /// Reads an intermediate 4x4 matrix (column-major).
    pub fn read_mat44(&self, loc: Location) -> Mat4 {
        let mut m = [0.0f32; 16];
        LittleEndian::read_f32_into(self.bytes(loc, MATRIX_SIZE), &mut m);
        Mat4::from_cols_array(&m)
    }

    pub fn write_mat44(&mut self, loc: Location, value: &Mat4) {
        LittleEndian::write_f32_into(&value.to_cols_array(), self.bytes_mut(loc, MATRIX_SIZE));
    }

    /// Reads a resolved joint transform (row-major affine record).
    pub fn read_joint_transform(&self, loc: Location) -> Mat4 {
        let mut rows = [0.0f32; 16];
        LittleEndian::read_f32_into(self.bytes(loc, MATRIX_SIZE), &mut rows);
        Mat4::from_cols_array(&rows).transpose()
    }

    pub fn write_joint_transform(&mut self, loc: Location, value: &Mat4) {
        let rows = value.transpose().to_cols_array();
        LittleEndian::write_f32_into(&rows, self.bytes_mut(loc, MATRIX_SIZE));
    }

    /// Reads either record layout of a 4x4 transform.
    pub fn read_matrix(&self, loc: Location, is_mat44: bool) -> Mat4 {
        if is_mat44 {
            self.read_mat44(loc)
        } else {
            self.read_joint_transform(loc)
        }
    }

    pub fn read_joint_params(&self, loc: Location) -> JointParams {
        JointParams {
            scale: self.read_quad(loc.offset_by(JointParams::SCALE_OFFSET)),
            quat: self.read_quat(loc.offset_by(JointParams::QUAT_OFFSET)),
            translation: self.read_quad(loc.offset_by(JointParams::TRANSLATION_OFFSET)),
        }
    }

    pub fn write_joint_params(&mut self, loc: Location, value: &JointParams) {
        self.write_quad(loc.offset_by(JointParams::SCALE_OFFSET), value.scale);
        self.write_quat(loc.offset_by(JointParams::QUAT_OFFSET), value.quat);
        self.write_quad(
            loc.offset_by(JointParams::TRANSLATION_OFFSET),
            value.translation,
        );
    }

    /// Raw memory move between (possibly different) regions.
    pub fn copy_bytes(&mut self, src: Location, dst: Location, len: usize) {
        if src.region() == dst.region() {
            let region = self.region_mut(src.region());
            region.copy_within(src.offset()..src.offset() + len, dst.offset());
        } else {
            let mut scratch = [0u8; MATRIX_SIZE];
            for start in (0..len).step_by(MATRIX_SIZE) {
                let n = (len - start).min(MATRIX_SIZE);
                let from = src.offset_by(start as u32);
                scratch[..n].copy_from_slice(self.bytes(from, n));
                self.bytes_mut(dst.offset_by(start as u32), n)
                    .copy_from_slice(&scratch[..n]);
            }
        }
    }
}

/// Byte location of joint `index`'s [`JointParams`] record.
pub fn joint_params_location(index: usize) -> Location {
    Location::new(Region::JointParams, (index * JOINT_PARAMS_SIZE) as u32)
}

/// Byte location of resolved transform slot `slot` (slot 0 is the object root).
pub fn joint_transform_location(slot: usize) -> Location {
    Location::new(Region::JointTransforms, (slot * MATRIX_SIZE) as u32)
}

/// Little-endian f32 store into a raw region buffer.
pub fn write_f32_le(bytes: &mut [u8], byte_offset: usize, value: f32) {
    LittleEndian::write_f32(&mut bytes[byte_offset..byte_offset + 4], value);
}

pub fn read_f32_le(bytes: &[u8], byte_offset: usize) -> f32 {
    LittleEndian::read_f32(&bytes[byte_offset..byte_offset + 4])
}
