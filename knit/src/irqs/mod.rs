//! Interrupt inspection
//!
//! - `stats`: per-CPU counters from `/proc/interrupts`
//! - `delta`: counter increase between two readings
//! - `watch`: the periodic sampling loop behind `knit irqwatch`
//! - `affinity`: IRQ to CPU routing behind `knit irqaff`

pub mod affinity;
pub mod delta;
pub mod stats;
pub mod watch;

pub use affinity::{irq_affinities, AffinityKind, IrqAffinity};
pub use delta::delta;
pub use stats::{Counters, Delta, IrqCounters, ProcInterrupts, Snapshot, StatsSource};
pub use watch::{IrqWatcher, StopReason, WatchOutcome, WatchSink};
