use crate::{
    HierarchyHeader, JointParentingQuad, ParentingElement, joint_params_location,
    joint_transform_location,
};
use glam::Mat4;

/// Resolves `quads` in array order, which is the topological order of the hierarchy.
///
/// Each element composes its joint's local `T * R * S` with its already-resolved parent. All four
/// lanes of a quad read before any lane writes, so a quad never observes its own results.
pub fn resolve_parenting(header: &mut HierarchyHeader<'_>, quads: &[JointParentingQuad]) {
    for quad in quads {
        let reader: &HierarchyHeader<'_> = header;
        let resolved = quad.elements.map(|element| resolve_element(reader, &element));
        for (element, world) in quad.elements.iter().zip(resolved.iter()) {
            header.write_joint_transform(joint_transform_location(element.slot()), world);
        }
    }
}

fn resolve_element(header: &HierarchyHeader<'_>, element: &ParentingElement) -> Mat4 {
    let slot = element.slot();
    debug_assert!(slot > 0, "slot 0 is the object root and has no joint params");
    let local = header
        .read_joint_params(joint_params_location(slot.saturating_sub(1)))
        .local_matrix();
    match element.parent_location() {
        Some(parent) => header.read_joint_transform(parent) * local,
        None => local,
    }
}
