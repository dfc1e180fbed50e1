use crate::{
    Easing, RotateOrder, decompose, rotation_angle, safe_normalize_quat, swing_twist, twist_angle,
    wrap_degrees,
};
use glam::{Mat4, Quat, Vec3, Vec4};

fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 0.001,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

fn assert_same_rotation(actual: Quat, expected: Quat) {
    let dot = actual.normalize().dot(expected.normalize()).abs();
    assert!(dot > 0.9999, "expected {expected:?}, got {actual:?}");
}

#[test]
fn xyz_applies_x_first() {
    let q = RotateOrder::Xyz.quat_from_degrees(Vec3::new(30.0, -20.0, 45.0));
    let expected = Quat::from_rotation_z(45f32.to_radians())
        * Quat::from_rotation_y((-20f32).to_radians())
        * Quat::from_rotation_x(30f32.to_radians());
    assert_same_rotation(q, expected);
}

#[test]
fn zyx_applies_z_first() {
    let q = RotateOrder::Zyx.quat_from_degrees(Vec3::new(30.0, -20.0, 45.0));
    let expected = Quat::from_rotation_x(30f32.to_radians())
        * Quat::from_rotation_y((-20f32).to_radians())
        * Quat::from_rotation_z(45f32.to_radians());
    assert_same_rotation(q, expected);
}

#[test]
fn euler_angles_survive_every_rotate_order() {
    let angles = Vec3::new(30.0, -20.0, 45.0);
    for index in 0..6 {
        let order = RotateOrder::from_index(index);
        let back = order.degrees_from_quat(order.quat_from_degrees(angles));
        assert_approx(back.x, angles.x);
        assert_approx(back.y, angles.y);
        assert_approx(back.z, angles.z);
    }
    assert_eq!(RotateOrder::from_index(9), RotateOrder::Xyz);
}

#[test]
fn swing_twist_splits_about_the_axis() {
    let q = Quat::from_rotation_z(40f32.to_radians()) * Quat::from_rotation_x(30f32.to_radians());
    let (swing, twist) = swing_twist(q, Vec3::X);
    assert_same_rotation(swing * twist, q);
    assert_same_rotation(twist, Quat::from_rotation_x(30f32.to_radians()));
    assert_approx(twist_angle(twist, Vec3::X).to_degrees(), 30.0);
    // The swing has no component about the twist axis.
    assert_approx(swing.x, 0.0);
}

#[test]
fn twist_angle_is_signed() {
    let twist = Quat::from_rotation_y((-75f32).to_radians());
    assert_approx(twist_angle(twist, Vec3::Y).to_degrees(), -75.0);
    assert_approx(rotation_angle(twist).to_degrees(), 75.0);
}

#[test]
fn decompose_recovers_trs() {
    let rotation = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3);
    let m = Mat4::from_scale_rotation_translation(
        Vec3::new(2.0, 3.0, 4.0),
        rotation,
        Vec3::new(1.0, -2.0, 5.0),
    );
    let (t, r, s) = decompose(&m);
    assert_approx(t.x, 1.0);
    assert_approx(t.y, -2.0);
    assert_approx(t.z, 5.0);
    assert_same_rotation(r, rotation);
    assert_approx(s.x, 2.0);
    assert_approx(s.y, 3.0);
    assert_approx(s.z, 4.0);
}

#[test]
fn decompose_moves_mirroring_into_x_scale() {
    let rotation = Quat::from_rotation_z(0.5);
    let m = Mat4::from_scale_rotation_translation(Vec3::new(-2.0, 1.0, 1.0), rotation, Vec3::ZERO);
    let (_, r, s) = decompose(&m);
    assert_approx(s.x, -2.0);
    assert_approx(s.y, 1.0);
    assert_same_rotation(r, rotation);
}

#[test]
fn easing_curves_keep_their_endpoints() {
    for easing in [Easing::Linear, Easing::Smooth, Easing::Gaussian, Easing::Step] {
        assert_approx(easing.apply(0.0), 0.0);
        assert_approx(easing.apply(1.0), 1.0);
        assert_approx(easing.apply(-3.0), 0.0);
        assert_approx(easing.apply(3.0), 1.0);
    }
    assert_approx(Easing::Smooth.apply(0.5), 0.5);
    assert_approx(Easing::Step.apply(0.99), 0.0);
    assert!(Easing::Gaussian.apply(0.5) < 0.5);
}

#[test]
fn wrap_degrees_lands_in_half_open_range() {
    assert_approx(wrap_degrees(190.0), -170.0);
    assert_approx(wrap_degrees(180.0), -180.0);
    assert_approx(wrap_degrees(-180.0), -180.0);
    assert_approx(wrap_degrees(-540.0), -180.0);
    assert_approx(wrap_degrees(725.0), 5.0);
}

#[test]
fn degenerate_quaternions_normalize_to_identity() {
    assert_eq!(safe_normalize_quat(Vec4::ZERO), Quat::IDENTITY);
    assert_eq!(safe_normalize_quat(Vec4::splat(f32::NAN)), Quat::IDENTITY);
    let q = safe_normalize_quat(Vec4::new(0.0, 0.0, 0.0, 2.0));
    assert_approx(q.w, 1.0);
}
