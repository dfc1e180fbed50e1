use crate::{
    HierarchyHeader, JointParams, JointParentingQuad, ParentingCommand, ParentingElement,
    joint_params_location, joint_transform_location, resolve_parenting,
};
use glam::{Mat4, Quat, Vec3};

fn assert_mat_approx(actual: &Mat4, expected: &Mat4) {
    for (a, e) in actual.to_cols_array().iter().zip(expected.to_cols_array()) {
        assert!(
            (a - e).abs() <= 0.0001,
            "expected {expected:?}, got {actual:?}"
        );
    }
}

struct Hierarchy {
    joint_params: Vec<u8>,
    joint_transforms: Vec<u8>,
    scalar_table: Vec<u8>,
    dependency_table: Vec<u8>,
}

impl Hierarchy {
    fn new(joints: usize) -> Self {
        Self {
            joint_params: vec![0; joints * 48],
            joint_transforms: vec![0; (joints + 1) * 64],
            scalar_table: vec![0; 16],
            dependency_table: vec![0; 64],
        }
    }

    fn header(&mut self) -> HierarchyHeader<'_> {
        HierarchyHeader::new(
            &mut self.joint_params,
            &mut self.joint_transforms,
            &mut self.scalar_table,
            &mut self.dependency_table,
        )
    }

    fn set_joint(&mut self, joint: usize, params: JointParams) {
        self.header()
            .write_joint_params(joint_params_location(joint), &params);
    }

    fn set_slot(&mut self, slot: usize, m: &Mat4) {
        self.header()
            .write_joint_transform(joint_transform_location(slot), m);
    }

    fn slot(&mut self, slot: usize) -> Mat4 {
        self.header()
            .read_joint_transform(joint_transform_location(slot))
    }
}

fn quad(elements: [(u16, u32); 4]) -> JointParentingQuad {
    JointParentingQuad {
        elements: elements.map(|(child, parent)| ParentingElement::new(child, parent)),
    }
}

fn chain_locals() -> [JointParams; 3] {
    [
        JointParams::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY, Vec3::ONE),
        JointParams::new(
            Vec3::new(0.0, 2.0, 0.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::ONE,
        ),
        JointParams::new(
            Vec3::new(0.5, 0.0, 0.0),
            Quat::from_rotation_x(0.3),
            Vec3::new(2.0, 1.0, 1.0),
        ),
    ]
}

#[test]
fn chain_composes_parent_then_local() {
    let mut h = Hierarchy::new(3);
    let locals = chain_locals();
    for (joint, params) in locals.iter().enumerate() {
        h.set_joint(joint, *params);
    }
    let root = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
    h.set_slot(0, &root);

    let quads = [
        quad([(0x10, 0x01); 4]),
        quad([(0x20, 0x41); 4]),
        quad([(0x30, 0x81); 4]),
    ];
    resolve_parenting(&mut h.header(), &quads);

    let l = locals.map(|p| p.local_matrix());
    assert_mat_approx(&h.slot(1), &(root * l[0]));
    assert_mat_approx(&h.slot(2), &(root * l[0] * l[1]));
    assert_mat_approx(&h.slot(3), &(root * l[0] * l[1] * l[2]));

    let tip = h.slot(3).transform_point3(Vec3::ZERO);
    assert!((tip - Vec3::new(1.0, 2.5, 10.0)).length() < 1e-4, "{tip:?}");
}

#[test]
fn zero_parent_is_local_only() {
    let mut h = Hierarchy::new(1);
    let params = chain_locals()[1];
    h.set_joint(0, params);
    h.set_slot(0, &Mat4::from_translation(Vec3::splat(100.0)));

    resolve_parenting(&mut h.header(), &[quad([(0x10, 0); 4])]);
    assert_mat_approx(&h.slot(1), &params.local_matrix());
}

#[test]
fn lanes_of_a_quad_read_before_any_write() {
    let mut h = Hierarchy::new(2);
    let locals = chain_locals();
    h.set_joint(0, locals[0]);
    h.set_joint(1, locals[1]);
    h.set_slot(0, &Mat4::IDENTITY);
    let stale = Mat4::from_translation(Vec3::new(-5.0, 0.0, 0.0));
    h.set_slot(1, &stale);

    // Lane 1 is parented to lane 0's slot and must see the stale value.
    resolve_parenting(
        &mut h.header(),
        &[quad([(0x10, 0x01), (0x20, 0x41), (0x20, 0x41), (0x20, 0x41)])],
    );
    assert_mat_approx(&h.slot(1), &locals[0].local_matrix());
    assert_mat_approx(&h.slot(2), &(stale * locals[1].local_matrix()));
}

#[test]
fn resolving_twice_is_bit_identical() {
    let mut h = Hierarchy::new(3);
    for (joint, params) in chain_locals().iter().enumerate() {
        h.set_joint(joint, *params);
    }
    h.set_slot(0, &Mat4::from_rotation_y(0.25));
    let command = ParentingCommand::from_elements(&[ParentingElement::new(0x10, 0x01)]);
    let deeper = [quad([(0x20, 0x41); 4]), quad([(0x30, 0x81); 4])];

    resolve_parenting(&mut h.header(), &command.quads);
    resolve_parenting(&mut h.header(), &deeper);
    let first = h.joint_transforms.clone();

    resolve_parenting(&mut h.header(), &command.quads);
    resolve_parenting(&mut h.header(), &deeper);
    assert_eq!(first, h.joint_transforms);
}

#[test]
fn from_elements_pads_the_last_quad() {
    let elements = [
        ParentingElement::new(0x10, 0x01),
        ParentingElement::new(0x20, 0x01),
        ParentingElement::new(0x30, 0x01),
        ParentingElement::new(0x40, 0x01),
        ParentingElement::new(0x50, 0x41),
    ];
    let command = ParentingCommand::from_elements(&elements);
    assert_eq!(command.quads.len(), 2);
    assert_eq!(command.quads[1].elements, [elements[4]; 4]);
    assert_eq!(command.elements().count(), 8);
    assert_eq!(elements[4].slot(), 5);
    assert!(ParentingElement::new(0x10, 0).parent_location().is_none());
}
