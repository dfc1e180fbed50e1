//! Compiled rig format version.

/// Major version of the compiled rig description format.
pub const RIG_FORMAT_MAJOR: u32 = 1;

/// Minor version of the compiled rig description format.
pub const RIG_FORMAT_MINOR: u32 = 0;
