use crate::{FatConstraintOverrides, HierarchyHeader};

/// The driving clock as seen by stateful nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    /// Seconds. A value of `0.0` is indistinguishable from "never ran" for stateful nodes.
    pub current_time: f32,
    pub paused: bool,
}

impl FrameClock {
    pub fn at(current_time: f32) -> Self {
        Self {
            current_time,
            paused: false,
        }
    }
}

/// Per-frame, per-character, per-segment execution context.
///
/// Region buffers must be laid out exactly as the rig compiler specified; commands address them
/// with fixed byte offsets.
pub struct SegmentContext<'a> {
    pub joint_params: &'a mut [u8],
    pub sdk_scalar_table: &'a mut [u8],
    pub joint_transforms: &'a mut [u8],
    pub dependency_table: &'a mut [u8],
    /// Which segment of the rig to run.
    pub segment: usize,
    /// Character-owned, zero-initialized state of stateful nodes, if bound.
    pub persistent_data: Option<&'a mut [u8]>,
    pub clock: FrameClock,
}

impl<'a> SegmentContext<'a> {
    pub fn new(
        joint_params: &'a mut [u8],
        sdk_scalar_table: &'a mut [u8],
        joint_transforms: &'a mut [u8],
        dependency_table: &'a mut [u8],
    ) -> Self {
        Self {
            joint_params,
            sdk_scalar_table,
            joint_transforms,
            dependency_table,
            segment: 0,
            persistent_data: None,
            clock: FrameClock::default(),
        }
    }

    pub fn with_segment(mut self, segment: usize) -> Self {
        self.segment = segment;
        self
    }

    pub fn with_persistent_data(mut self, data: &'a mut [u8]) -> Self {
        self.persistent_data = Some(data);
        self
    }

    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Splits the context into the header over its regions and the persistent buffer.
    pub(crate) fn split(&mut self) -> (HierarchyHeader<'_>, Option<&mut [u8]>) {
        let header = HierarchyHeader::new(
            &mut *self.joint_params,
            &mut *self.joint_transforms,
            &mut *self.sdk_scalar_table,
            &mut *self.dependency_table,
        );
        (header, self.persistent_data.as_deref_mut())
    }
}

/// How `FatConstraint` nodes run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FatConstraintMode {
    /// Integrate the spring-damper.
    #[default]
    Simulate,
    /// Output the desired pose and keep the state settled. Ignored without debug assertions.
    PassThrough,
}

/// Per-call evaluation settings.
#[derive(Clone, Debug, Default)]
pub struct EvalOptions {
    pub fat_constraint: FatConstraintMode,
    /// Replaces FatConstraint tuning for every node. Ignored without debug assertions.
    pub fat_overrides: Option<FatConstraintOverrides>,
}
