use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("hierarchy id mismatch: rig compiled for {expected:#010x}, caller passed {actual:#010x}")]
    HierarchyMismatch { expected: u32, actual: u32 },

    #[error("invalid segment index {index} (rig has {count} segments)")]
    InvalidSegment { index: usize, count: usize },

    #[error("invalid compiled rig: {message}")]
    InvalidRig { message: String },

    #[cfg(feature = "json")]
    #[error("failed to parse rig JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("unsupported or invalid rig format version: {value}")]
    JsonFormatVersion { value: String },
}

impl Error {
    /// True for the build/version skew between a compiled rig and its caller. Callers must treat
    /// this as fatal and not retry.
    pub fn is_fatal_mismatch(&self) -> bool {
        matches!(self, Error::HierarchyMismatch { .. })
    }
}
