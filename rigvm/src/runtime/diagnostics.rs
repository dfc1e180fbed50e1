//! Injected diagnostics for node evaluation.
//!
//! Evaluation never consults global state. Callers that want timings, output dumps, or
//! unreasonable-value reports pass a [`Diagnostics`] implementation; [`NoDiagnostics`] does
//! nothing and is what [`CompiledRig::evaluate`](crate::CompiledRig::evaluate) uses.

use crate::RigNodeType;
use std::fmt::Write as _;
use std::time::Duration;

/// Magnitude above which a node value is reported as unreasonable.
pub const UNREASONABLE_MAGNITUDE: f32 = 1.0e6;

pub trait Diagnostics {
    /// Whether nodes should be timed. Timing is skipped entirely when `false`.
    fn wants_timing(&self) -> bool {
        false
    }

    fn node_executed(&mut self, _node: RigNodeType, _elapsed: Duration) {}

    /// Values a node just wrote, labelled by `name`.
    fn node_outputs(&mut self, _node: RigNodeType, _name: &str, _values: &[f32]) {}

    /// A non-finite or out-of-range value. Only reported in builds with debug assertions.
    fn unreasonable_value(&mut self, _node: RigNodeType, _what: &str, _value: f32) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoDiagnostics;

impl Diagnostics for NoDiagnostics {}

/// Routes diagnostics to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics {
    pub print_outputs: bool,
}

impl Diagnostics for LogDiagnostics {
    fn node_outputs(&mut self, node: RigNodeType, name: &str, values: &[f32]) {
        if self.print_outputs {
            log::debug!("{} ({name}): {values:.4?}", node.name());
        }
    }

    fn unreasonable_value(&mut self, node: RigNodeType, what: &str, value: f32) {
        log::warn!("{} has unreasonable {what}: {value}", node.name());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeStat {
    pub elapsed: Duration,
    pub count: u32,
}

/// Per-node-type execution time and count.
#[derive(Clone, Debug, Default)]
pub struct RigNodeStats {
    stats: [NodeStat; RigNodeType::ALL.len()],
    unreasonable: u32,
}

impl RigNodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, node: RigNodeType) -> NodeStat {
        self.stats[node.index()]
    }

    pub fn total(&self) -> NodeStat {
        self.stats.iter().fold(NodeStat::default(), |acc, s| NodeStat {
            elapsed: acc.elapsed + s.elapsed,
            count: acc.count + s.count,
        })
    }

    pub fn unreasonable_count(&self) -> u32 {
        self.unreasonable
    }

    /// A table of every node type that ran, followed by the total.
    pub fn report(&self) -> String {
        let mut out = String::new();
        for node in RigNodeType::ALL {
            let stat = self.get(node);
            if stat.count == 0 {
                continue;
            }
            let _ = writeln!(
                out,
                "{:<24} {:>6} {:>10.3} ms",
                node.name(),
                stat.count,
                stat.elapsed.as_secs_f64() * 1000.0
            );
        }
        let total = self.total();
        let _ = writeln!(
            out,
            "{:<24} {:>6} {:>10.3} ms",
            "Total",
            total.count,
            total.elapsed.as_secs_f64() * 1000.0
        );
        out
    }
}

impl Diagnostics for RigNodeStats {
    fn wants_timing(&self) -> bool {
        true
    }

    fn node_executed(&mut self, node: RigNodeType, elapsed: Duration) {
        let stat = &mut self.stats[node.index()];
        stat.elapsed += elapsed;
        stat.count += 1;
    }

    fn unreasonable_value(&mut self, _node: RigNodeType, _what: &str, _value: f32) {
        self.unreasonable += 1;
    }
}

/// Reports `value` if it is non-finite or larger than [`UNREASONABLE_MAGNITUDE`].
#[inline]
pub(crate) fn check_value(diag: &mut dyn Diagnostics, node: RigNodeType, what: &str, value: f32) {
    if cfg!(debug_assertions) && !(value.is_finite() && value.abs() < UNREASONABLE_MAGNITUDE) {
        diag.unreasonable_value(node, what, value);
    }
}

#[inline]
pub(crate) fn check_values(
    diag: &mut dyn Diagnostics,
    node: RigNodeType,
    what: &str,
    values: &[f32],
) {
    if cfg!(debug_assertions) {
        for &v in values {
            check_value(diag, node, what, v);
        }
    }
}
