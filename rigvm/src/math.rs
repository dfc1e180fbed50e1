//! Shared numeric helpers for the node library.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec3, Vec4};

pub(crate) const EPSILON: f32 = 1.0e-7;

/// Authoring-tool rotate order: the order in which the X/Y/Z Euler rotations are applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum RotateOrder {
    #[default]
    Xyz,
    Yzx,
    Zxy,
    Xzy,
    Yxz,
    Zyx,
}

impl RotateOrder {
    /// Maps the compiled enum value (0..=5). Unknown values fall back to `Xyz`.
    pub fn from_index(value: u32) -> Self {
        match value {
            1 => RotateOrder::Yzx,
            2 => RotateOrder::Zxy,
            3 => RotateOrder::Xzy,
            4 => RotateOrder::Yxz,
            5 => RotateOrder::Zyx,
            _ => RotateOrder::Xyz,
        }
    }

    // Applying X then Y then Z to column vectors is Rz * Ry * Rx, glam's intrinsic ZYX. The
    // array maps each glam angle slot to the x/y/z component it carries.
    fn glam(self) -> (EulerRot, [usize; 3]) {
        match self {
            RotateOrder::Xyz => (EulerRot::ZYX, [2, 1, 0]),
            RotateOrder::Yzx => (EulerRot::XZY, [0, 2, 1]),
            RotateOrder::Zxy => (EulerRot::YXZ, [1, 0, 2]),
            RotateOrder::Xzy => (EulerRot::YZX, [1, 2, 0]),
            RotateOrder::Yxz => (EulerRot::ZXY, [2, 0, 1]),
            RotateOrder::Zyx => (EulerRot::XYZ, [0, 1, 2]),
        }
    }

    pub fn quat_from_radians(self, angles: Vec3) -> Quat {
        let (rot, slots) = self.glam();
        let a = angles.to_array();
        Quat::from_euler(rot, a[slots[0]], a[slots[1]], a[slots[2]])
    }

    pub fn quat_from_degrees(self, degrees: Vec3) -> Quat {
        self.quat_from_radians(degrees * (std::f32::consts::PI / 180.0))
    }

    pub fn radians_from_quat(self, q: Quat) -> Vec3 {
        let (rot, slots) = self.glam();
        let (a, b, c) = q.normalize().to_euler(rot);
        let mut out = [0.0f32; 3];
        out[slots[0]] = a;
        out[slots[1]] = b;
        out[slots[2]] = c;
        Vec3::from_array(out)
    }

    pub fn degrees_from_quat(self, q: Quat) -> Vec3 {
        self.radians_from_quat(q) * (180.0 / std::f32::consts::PI)
    }
}

/// Joint orient stored as XYZ radians.
pub fn joint_orient_quat(radians: [f32; 3]) -> Quat {
    RotateOrder::Xyz.quat_from_radians(Vec3::from_array(radians))
}

/// Weight reshaping applied between bracketing keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum Easing {
    #[default]
    Linear,
    Smooth,
    Gaussian,
    Step,
}

impl Easing {
    pub fn from_index(value: u32) -> Self {
        match value {
            1 => Easing::Smooth,
            2 => Easing::Gaussian,
            3 => Easing::Step,
            _ => Easing::Linear,
        }
    }

    /// Reshapes `t` in `[0, 1]`; every curve maps 0 to 0 and 1 to 1.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Smooth => t * t * (3.0 - 2.0 * t),
            Easing::Gaussian => {
                const SHARPNESS: f32 = 4.5;
                let floor = (-SHARPNESS).exp();
                let g = (-(1.0 - t) * (1.0 - t) * SHARPNESS).exp();
                (g - floor) / (1.0 - floor)
            }
            Easing::Step => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Wraps an angle in degrees into `[-180, 180)`.
pub fn wrap_degrees(deg: f32) -> f32 {
    (deg + 180.0).rem_euclid(360.0) - 180.0
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Normalizes a quaternion stored as a 4-vector, falling back to identity.
pub fn safe_normalize_quat(v: Vec4) -> Quat {
    let len_sq = v.length_squared();
    if len_sq > EPSILON * EPSILON && len_sq.is_finite() {
        Quat::from_vec4(v / len_sq.sqrt())
    } else {
        Quat::IDENTITY
    }
}

/// Splits `q` into `swing * twist`, where `twist` rotates about `axis` and `swing` is the
/// shortest arc carrying `axis` to `q * axis`.
pub fn swing_twist(q: Quat, axis: Vec3) -> (Quat, Quat) {
    let axis = axis.normalize_or_zero();
    let v = Vec3::new(q.x, q.y, q.z);
    let p = axis * v.dot(axis);
    let twist = safe_normalize_quat(Vec4::new(p.x, p.y, p.z, q.w));
    let swing = q * twist.conjugate();
    (swing, twist)
}

/// Signed rotation angle of a pure twist quaternion about `axis`, in radians within `(-pi, pi]`.
pub fn twist_angle(twist: Quat, axis: Vec3) -> f32 {
    let s = Vec3::new(twist.x, twist.y, twist.z).dot(axis.normalize_or_zero());
    let angle = 2.0 * s.atan2(twist.w);
    if angle > std::f32::consts::PI {
        angle - std::f32::consts::TAU
    } else if angle <= -std::f32::consts::PI {
        angle + std::f32::consts::TAU
    } else {
        angle
    }
}

/// Rotation angle of `q` in radians within `[0, pi]`.
pub fn rotation_angle(q: Quat) -> f32 {
    let q = if q.w < 0.0 { -q } else { q };
    2.0 * Vec3::new(q.x, q.y, q.z).length().atan2(q.w)
}

/// Gram-Schmidt on the first two axes; the third is rebuilt from their cross product.
pub fn orthonormalize(m: Mat3) -> Mat3 {
    let x = m.x_axis.normalize_or(Vec3::X);
    let z = x.cross(m.y_axis).normalize_or(Vec3::Z);
    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}

/// Translation, rotation, and per-axis scale of an affine matrix. Scale is the length of each
/// axis (negated on X for mirrored input); the rotation is orthonormalized so shear and
/// rounding noise cannot leak into it.
pub fn decompose(m: &Mat4) -> (Vec3, Quat, Vec3) {
    let translation = m.w_axis.truncate();
    let axes = Mat3::from_mat4(*m);
    let mut scale = Vec3::new(
        axes.x_axis.length(),
        axes.y_axis.length(),
        axes.z_axis.length(),
    );
    let mut x_axis = axes.x_axis;
    if axes.determinant() < 0.0 {
        scale.x = -scale.x;
        x_axis = -x_axis;
    }
    let rot = orthonormalize(Mat3::from_cols(x_axis, axes.y_axis, axes.z_axis));
    let quat = Quat::from_mat3(&rot).normalize();
    (translation, quat, scale)
}

/// Rotation of an affine matrix with its scale removed.
pub fn rotation_of(m: &Mat4) -> Quat {
    decompose(m).1
}
