//! Counter increase between two snapshots

use std::collections::BTreeMap;

use super::stats::{Counters, Delta, IrqCounters, Snapshot};

impl IrqCounters {
    /// Increase from `self` (earlier) to `later`.
    ///
    /// Only (cpu, label) pairs present in both snapshots are reported. A label
    /// that first shows up in `later` is skipped for this interval. A counter
    /// that went backwards (driver reload) reports 0.
    #[must_use]
    pub fn delta(&self, later: &Snapshot) -> Delta {
        let mut res = BTreeMap::new();
        for (cpu, later_counters) in later.iter() {
            let Some(earlier_counters) = self.get(cpu) else {
                continue;
            };
            let counters: Counters = later_counters
                .iter()
                .filter_map(|(label, &now)| {
                    let before = earlier_counters.get(label)?;
                    Some((label.clone(), now.saturating_sub(*before)))
                })
                .collect();
            res.insert(cpu, counters);
        }
        IrqCounters::from_map(res)
    }
}

/// Free-function form of [`IrqCounters::delta`].
#[must_use]
pub fn delta(earlier: &Snapshot, later: &Snapshot) -> Delta {
    earlier.delta(later)
}
