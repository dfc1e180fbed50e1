//! Evaluator for offline-compiled procedural animation rigs.
//!
//! A [`CompiledRig`] is a list of segments, each a fixed schedule of commands: joint parenting,
//! constant writes, raw copies between memory regions, and procedural rig nodes (RBF
//! interpolation, rivets, spring follow-through, matrix networks, ...). Evaluation runs one
//! segment against caller-owned region buffers described by a [`SegmentContext`]. Nothing is
//! allocated per joint and no global state is consulted; diagnostics are injected through the
//! [`Diagnostics`] trait.
//!
//! Rigs can be built in code (see [`rigs`]) or, with the `json` feature, loaded with
//! [`CompiledRig::from_json_str`].

#![forbid(unsafe_code)]

mod error;
mod location;
mod math;
mod memory;
mod model;
mod nodes;
mod runtime;
mod version;

pub mod rigs;

#[cfg(feature = "json")]
pub mod json;

pub use error::*;
pub use location::*;
pub use math::*;
pub use memory::*;
pub use model::*;
pub use nodes::*;
pub use runtime::*;
pub use version::*;


#[cfg(test)]
mod math_tests;


#[cfg(all(test, feature = "json"))]
mod json_tests;
