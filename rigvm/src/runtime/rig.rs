use crate::nodes::execute_node;
use crate::{
    Command, CompiledRig, ConstantWrite, CopyCommand, CopyMove, Diagnostics, Error, EvalOptions,
    EulerToQuatCommand, FrameClock, HierarchyHeader, MATRIX_SIZE, NoDiagnostics, NodeCommand,
    ParentingCommand, ParentingElement, QUAD_SIZE, Region, Segment, SegmentContext, resolve_parenting,
};
use glam::{Vec3, Vec4};

fn invalid(message: String) -> Error {
    Error::InvalidRig { message }
}

impl CompiledRig {
    /// Builds a rig after checking that every segment can run against correctly sized regions.
    pub fn new(
        name: impl Into<String>,
        hierarchy_id: u32,
        segments: Vec<Segment>,
    ) -> Result<Self, Error> {
        let name = name.into();
        if segments.is_empty() {
            return Err(invalid(format!("rig '{name}' has no segments")));
        }
        for (index, segment) in segments.iter().enumerate() {
            validate_segment(segment).map_err(|message| {
                invalid(format!("rig '{name}' segment {index}: {message}"))
            })?;
        }
        log::debug!(
            "compiled rig '{name}' ({hierarchy_id:#010x}): {} segment(s)",
            segments.len()
        );
        Ok(Self {
            name,
            hierarchy_id,
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hierarchy_id(&self) -> u32 {
        self.hierarchy_id
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Runs `ctx.segment` with default options and no diagnostics.
    ///
    /// Returns [`Error::HierarchyMismatch`] when `hierarchy_id` is not the id the rig was compiled
    /// for; nothing is written in that case.
    pub fn evaluate(&self, hierarchy_id: u32, ctx: &mut SegmentContext<'_>) -> Result<(), Error> {
        self.evaluate_with(hierarchy_id, ctx, &EvalOptions::default(), &mut NoDiagnostics)
    }

    pub fn evaluate_with(
        &self,
        hierarchy_id: u32,
        ctx: &mut SegmentContext<'_>,
        options: &EvalOptions,
        diag: &mut dyn Diagnostics,
    ) -> Result<(), Error> {
        if hierarchy_id != self.hierarchy_id {
            return Err(Error::HierarchyMismatch {
                expected: self.hierarchy_id,
                actual: hierarchy_id,
            });
        }
        let segment = self
            .segments
            .get(ctx.segment)
            .ok_or(Error::InvalidSegment {
                index: ctx.segment,
                count: self.segments.len(),
            })?;

        let clock = ctx.clock;
        let (mut header, mut persistent) = ctx.split();
        for command in &segment.commands {
            execute_command(command, &mut header, &mut persistent, clock, options, diag);
        }
        Ok(())
    }
}

fn execute_command(
    command: &Command,
    header: &mut HierarchyHeader<'_>,
    persistent: &mut Option<&mut [u8]>,
    clock: FrameClock,
    options: &EvalOptions,
    diag: &mut dyn Diagnostics,
) {
    match command {
        Command::Parenting(parenting) => resolve_parenting(header, &parenting.quads),
        Command::Constant(constant) => {
            for write in &constant.writes {
                match *write {
                    ConstantWrite::Float { dst, value } => header.write_f32(dst, value),
                    ConstantWrite::Word { dst, value } => header.write_u32(dst, value),
                    ConstantWrite::Quad { dst, value } => {
                        header.write_quad(dst, Vec4::from_array(value))
                    }
                }
            }
        }
        Command::Copy(copy) => execute_copy(header, copy),
        Command::EulerToQuat(euler) => execute_euler_to_quat(header, euler),
        Command::Node(node) => {
            execute_node(node, header, persistent.as_deref_mut(), clock, options, diag)
        }
    }
}

fn execute_copy(header: &mut HierarchyHeader<'_>, copy: &CopyCommand) {
    for mv in &copy.moves {
        let (src, dst, len) = match *mv {
            CopyMove::Float { src, dst } => (src, dst, 4),
            CopyMove::Quad { src, dst } => (src, dst, QUAD_SIZE),
            CopyMove::Matrix { src, dst } => (src, dst, MATRIX_SIZE),
        };
        header.copy_bytes(src, dst, len);
    }
}

fn execute_euler_to_quat(header: &mut HierarchyHeader<'_>, command: &EulerToQuatCommand) {
    let degrees = Vec3::new(
        header.read_f32_or(command.inputs[0], command.defaults[0]),
        header.read_f32_or(command.inputs[1], command.defaults[1]),
        header.read_f32_or(command.inputs[2], command.defaults[2]),
    );
    header.write_quat(command.output, command.rotate_order.quat_from_degrees(degrees));
}

fn validate_segment(segment: &Segment) -> Result<(), String> {
    // Slot 0 is the caller's object root.
    let mut resolved = vec![true];
    let mark = |resolved: &mut Vec<bool>, slot: usize| {
        if resolved.len() <= slot {
            resolved.resize(slot + 1, false);
        }
        resolved[slot] = true;
    };

    for (index, command) in segment.commands.iter().enumerate() {
        match command {
            Command::Parenting(parenting) => {
                for quad in &parenting.quads {
                    for element in &quad.elements {
                        validate_parenting_element(element, &resolved)
                            .map_err(|message| format!("command {index}: {message}"))?;
                    }
                    for element in &quad.elements {
                        mark(&mut resolved, element.slot());
                    }
                }
            }
            Command::Copy(copy) => {
                for mv in &copy.moves {
                    if let CopyMove::Matrix { dst, .. } = *mv {
                        if dst.is_valid() && dst.region() == Region::JointTransforms {
                            mark(&mut resolved, dst.offset() / MATRIX_SIZE);
                        }
                    }
                }
            }
            Command::Node(node) => validate_node(node)
                .map_err(|message| format!("command {index} ({}): {message}", node.node_type().name()))?,
            Command::Constant(_) | Command::EulerToQuat(_) => {}
        }
    }
    Ok(())
}

fn validate_parenting_element(
    element: &ParentingElement,
    resolved: &[bool],
) -> Result<(), String> {
    if element.child & 0xF != 0 || element.slot() == 0 {
        return Err(format!("invalid parenting child {:#06x}", element.child));
    }
    let Some(parent) = element.parent_location() else {
        return Ok(());
    };
    match parent.region() {
        Region::JointTransforms => {
            if parent.offset() % MATRIX_SIZE != 0 {
                return Err(format!("parent {:#x} is not a transform slot", parent.raw()));
            }
            let slot = parent.offset() / MATRIX_SIZE;
            if !resolved.get(slot).copied().unwrap_or(false) {
                return Err(format!(
                    "slot {} is parented to slot {slot}, which is not resolved yet",
                    element.slot()
                ));
            }
            Ok(())
        }
        Region::DependencyTable => Ok(()),
        region => Err(format!(
            "parent {:#x} points into the {region:?} region",
            parent.raw()
        )),
    }
}

fn validate_node(node: &NodeCommand) -> Result<(), String> {
    match node {
        NodeCommand::InterpolateRbf(p) => {
            let inputs = p.inputs.len();
            if inputs == 0 {
                return Err("no inputs".to_string());
            }
            if p.poses.len() % inputs != 0 {
                return Err(format!(
                    "{} pose values do not divide into {inputs} inputs",
                    p.poses.len()
                ));
            }
            let expected = p.num_poses() * p.outputs.len();
            if p.weights.len() != expected {
                return Err(format!(
                    "expected {expected} weights, found {}",
                    p.weights.len()
                ));
            }
        }
        NodeCommand::PointPoser(p) => {
            if p.outputs.len() % 3 != 0 {
                return Err(format!("{} outputs are not xyz triples", p.outputs.len()));
            }
            let expected = p.inputs.len() * p.num_points();
            if p.pose_points.len() != expected {
                return Err(format!(
                    "expected {expected} pose points, found {}",
                    p.pose_points.len()
                ));
            }
        }
        NodeCommand::RivetPlane(p) => {
            let joints = p.joint_inputs.len();
            if p.inverse_bind_poses.len() != joints {
                return Err(format!(
                    "{joints} joints but {} inverse bind poses",
                    p.inverse_bind_poses.len()
                ));
            }
            if p.skinning_weights.len() != 4 * joints {
                return Err(format!(
                    "expected {} skinning weights, found {}",
                    4 * joints,
                    p.skinning_weights.len()
                ));
            }
            if let Some(factors) = &p.input_scale_factors {
                if factors.len() != joints {
                    return Err(format!(
                        "{joints} joints but {} scale factors",
                        factors.len()
                    ));
                }
            }
            if !p.parent.is_valid() {
                return Err("parent transform is not connected".to_string());
            }
        }
        NodeCommand::InterpolateMatrix1D(p) => {
            for entry in &p.entries {
                if entry.states.is_empty() {
                    return Err("entry has no states".to_string());
                }
                if entry.states.windows(2).any(|w| w[1].time < w[0].time) {
                    return Err("state times are not sorted".to_string());
                }
            }
        }
        NodeCommand::InterpolateMatrixArray(p) => {
            if let Some(entry) = p.entries.iter().find(|e| e.num_matrices > 4) {
                return Err(format!("{} matrices (at most 4)", entry.num_matrices));
            }
        }
        _ => {}
    }
    Ok(())
}

impl Segment {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

impl From<ParentingCommand> for Command {
    fn from(value: ParentingCommand) -> Self {
        Command::Parenting(value)
    }
}

impl From<NodeCommand> for Command {
    fn from(value: NodeCommand) -> Self {
        Command::Node(value)
    }
}
