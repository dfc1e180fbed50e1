mod context;
pub(crate) mod diagnostics;
mod parenting;
mod rig;

pub use context::*;
pub use diagnostics::*;
pub use parenting::*;

#[cfg(test)]
mod parenting_tests;


#[cfg(test)]
mod diagnostics_tests;
