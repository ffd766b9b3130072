//! Per-CPU interrupt counters read from `/proc/interrupts`
//!
//! The kernel table looks like:
//!
//! ```text
//!            CPU0       CPU1
//!   0:         45          0   IO-APIC   2-edge      timer
//!  16:     120034       2210   IO-APIC  16-fasteoi   ehci_hcd:usb1
//! NMI:          0          0   Non-maskable interrupts
//! ERR:          0
//! ```
//!
//! The header names the CPU of every count column. Lines may carry fewer count
//! columns than the header (`ERR`, `MIS`); the missing CPUs are left out of the
//! snapshot instead of being recorded as zero.

use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{CpuId, CpuSet, KnitError};

/// Interrupt label to count, for a single CPU
pub type Counters = BTreeMap<String, u64>;

/// Interrupt counters keyed by CPU, then by interrupt label.
///
/// Used both for raw cumulative readings ([`Snapshot`]) and for the increase
/// between two readings ([`Delta`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IrqCounters(BTreeMap<CpuId, Counters>);

/// Point-in-time reading of all counters
pub type Snapshot = IrqCounters;

/// Counter increase between two snapshots, see [`IrqCounters::delta`]
pub type Delta = IrqCounters;

impl IrqCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_map(map: BTreeMap<CpuId, Counters>) -> Self {
        Self(map)
    }

    pub fn insert(&mut self, cpu: CpuId, label: impl Into<String>, count: u64) {
        self.0.entry(cpu).or_default().insert(label.into(), count);
    }

    pub fn get(&self, cpu: CpuId) -> Option<&Counters> {
        self.0.get(&cpu)
    }

    pub fn count(&self, cpu: CpuId, label: &str) -> Option<u64> {
        self.0.get(&cpu)?.get(label).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CpuId, &Counters)> {
        self.0.iter().map(|(cpu, counters)| (*cpu, counters))
    }

    /// Keep only the CPUs in `cpus` and only non-zero counts; CPUs left with
    /// no counts are dropped. This is the view presenters work on.
    #[must_use]
    pub fn nonzero_for_cpus(&self, cpus: &CpuSet) -> IrqCounters {
        let mut res = BTreeMap::new();
        for cpu in cpus.iter() {
            let Some(counters) = self.0.get(&cpu) else {
                continue;
            };
            let counters: Counters = counters
                .iter()
                .filter(|&(_, &val)| val != 0)
                .map(|(label, &val)| (label.clone(), val))
                .collect();
            if !counters.is_empty() {
                res.insert(cpu, counters);
            }
        }
        IrqCounters(res)
    }
}

/// Anything that can produce a fresh [`Snapshot`] on demand.
pub trait StatsSource {
    /// # Errors
    /// Fails when the counter source cannot be read or its header is unusable.
    fn read_stats(&self) -> Result<Snapshot, KnitError>;
}

/// Reads `<procfs>/interrupts`
#[derive(Debug, Clone)]
pub struct ProcInterrupts {
    path: PathBuf,
}

impl ProcInterrupts {
    pub fn new(procfs_root: &Path) -> Self {
        Self { path: procfs_root.join("interrupts") }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsSource for ProcInterrupts {
    fn read_stats(&self) -> Result<Snapshot, KnitError> {
        let content = fs::read_to_string(&self.path).map_err(|e| KnitError::io(&self.path, e))?;
        parse_interrupts(&content, &self.path)
    }
}

/// Parse the full content of an interrupts table.
///
/// Malformed counter lines are logged and dropped. Only an unusable header
/// fails the whole parse.
///
/// # Errors
/// Returns [`KnitError::Malformed`] if the header line is missing or does not
/// name any CPU column.
pub fn parse_interrupts(content: &str, path: &Path) -> Result<Snapshot, KnitError> {
    let mut lines = content.lines().enumerate();

    let header = lines
        .next()
        .map(|(_, line)| line)
        .ok_or_else(|| KnitError::Malformed { path: path.to_path_buf(), reason: "empty".into() })?;
    let cpus = parse_header(header)
        .map_err(|reason| KnitError::Malformed { path: path.to_path_buf(), reason })?;

    let mut snapshot = IrqCounters::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        match parse_counter_line(line, idx + 1, cpus.len()) {
            Ok((label, counts)) => {
                for (cpu, count) in cpus.iter().zip(counts) {
                    snapshot.insert(*cpu, label, count);
                }
            }
            Err(e) => debug!("{}: skipped {e}", path.display()),
        }
    }

    Ok(snapshot)
}

/// `CPU0 CPU1 ... CPUn` -> CPU ids, in column order.
fn parse_header(line: &str) -> Result<Vec<CpuId>, String> {
    let cpus = line
        .split_whitespace()
        .map(|col| {
            col.strip_prefix("CPU")
                .and_then(|num| num.parse().ok())
                .map(CpuId)
                .ok_or_else(|| format!("unexpected header column \"{col}\""))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if cpus.is_empty() {
        return Err("no CPU columns in header".into());
    }
    Ok(cpus)
}

/// `<label>: <count>... <description>` -> (label, counts).
///
/// Reads at most `max_counts` numeric columns and stops at the first
/// non-numeric field, where the description starts.
fn parse_counter_line(
    line: &str,
    line_no: usize,
    max_counts: usize,
) -> Result<(&str, Vec<u64>), KnitError> {
    let mut fields = line.split_whitespace();

    let label = fields
        .next()
        .and_then(|f| f.strip_suffix(':'))
        .filter(|label| !label.is_empty())
        .ok_or_else(|| KnitError::Parse { line: line_no, reason: "missing label".into() })?;

    let counts: Vec<u64> =
        fields.take(max_counts).map_while(|f| f.parse::<u64>().ok()).collect();
    if counts.is_empty() {
        return Err(KnitError::Parse {
            line: line_no,
            reason: format!("no counters for \"{label}\""),
        });
    }

    Ok((label, counts))
}
