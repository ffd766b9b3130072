//! Resolved, immutable run configuration
//!
//! Command-line arguments are turned into these values once, before any
//! command runs. Nothing downstream looks at [`crate::cli::Args`] again.

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use crate::cli::{GlobalArgs, IrqWatchArgs};
use crate::domain::{CpuSet, KnitError};
use crate::host::online_cpus;
use crate::irqs::AffinityKind;

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct KnitOptions {
    /// CPUs the user asked about (all online CPUs when not given)
    pub cpus: CpuSet,
    pub procfs_root: PathBuf,
    pub sysfs_root: PathBuf,
    pub json: bool,
    pub affinity: AffinityKind,
}

impl KnitOptions {
    /// # Errors
    /// Fails if `--cpulist` is invalid, or if it is empty and the online CPU
    /// list cannot be read from sysfs.
    pub fn from_args(args: &GlobalArgs) -> Result<Self, KnitError> {
        let cpus = if args.cpulist.trim().is_empty() {
            online_cpus(&args.sysfs)?
        } else {
            CpuSet::parse(&args.cpulist)?
        };
        if cpus.is_empty() {
            return Err(KnitError::Config("empty cpu set".to_string()));
        }
        debug!("checking cpus {cpus}");

        let affinity =
            if args.effective_affinity { AffinityKind::Effective } else { AffinityKind::Configured };

        Ok(Self {
            cpus,
            procfs_root: args.procfs.clone(),
            sysfs_root: args.sysfs.clone(),
            json: args.json,
            affinity,
        })
    }
}

/// How many ticks the IRQ watch loop performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchLimit {
    Unbounded,
    Ticks(u64),
}

impl WatchLimit {
    /// Negative counts (conventionally `-1`) mean run until interrupted.
    pub fn from_count(count: i64) -> Self {
        u64::try_from(count).map_or(WatchLimit::Unbounded, WatchLimit::Ticks)
    }

    pub fn reached(self, ticks: u64) -> bool {
        match self {
            WatchLimit::Unbounded => false,
            WatchLimit::Ticks(max) => ticks >= max,
        }
    }
}

/// Configuration of the IRQ sampling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchConfig {
    pub period: Duration,
    pub limit: WatchLimit,
    /// 0 or less: silent, 1: summary only, 2 and up: every tick plus summary
    pub verbose: i32,
}

impl WatchConfig {
    /// # Errors
    /// Fails if the watch period is not a valid positive duration.
    pub fn from_args(args: &IrqWatchArgs) -> Result<Self, KnitError> {
        Ok(Self {
            period: parse_period(&args.watch_period)?,
            limit: WatchLimit::from_count(args.watch_times),
            verbose: args.verbose,
        })
    }

    pub fn emits_ticks(&self) -> bool {
        self.verbose >= 2
    }

    pub fn emits_summary(&self) -> bool {
        self.verbose >= 1
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { period: Duration::from_secs(1), limit: WatchLimit::Unbounded, verbose: 1 }
    }
}

/// Parse a duration string such as `1s`, `250ms`, `1.5s` or `1m30s`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. Every number needs a
/// unit and the total must be positive.
///
/// # Errors
/// Returns [`KnitError::Config`] for malformed strings and zero durations.
pub fn parse_period(period: &str) -> Result<Duration, KnitError> {
    let invalid = |why: &str| KnitError::Config(format!("invalid period \"{period}\": {why}"));

    let mut rest = period.trim();
    if rest.is_empty() {
        return Err(invalid("empty"));
    }

    let mut total_ns: u128 = 0;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| invalid("missing unit"))?;
        let (num, tail) = rest.split_at(num_end);

        let unit_end = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        let unit_ns: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3600 * 1_000_000_000,
            _ => return Err(invalid(&format!("unknown unit \"{unit}\""))),
        };

        let part = scaled_nanos(num, unit_ns).ok_or_else(|| invalid("expected a number"))?;
        total_ns = total_ns.checked_add(part).ok_or_else(|| invalid("out of range"))?;
        rest = tail;
    }

    if total_ns == 0 {
        return Err(invalid("must be positive"));
    }
    let nanos = u64::try_from(total_ns).map_err(|_| invalid("out of range"))?;
    Ok(Duration::from_nanos(nanos))
}

/// `"1.25"` with a unit of `unit_ns` nanoseconds, computed without floats.
fn scaled_nanos(num: &str, unit_ns: u128) -> Option<u128> {
    let (int_part, frac_part) = num.split_once('.').unwrap_or((num, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int: u128 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut nanos = int.checked_mul(unit_ns)?;
    if !frac_part.is_empty() {
        let frac: u128 = frac_part.parse().ok()?;
        let scale = 10u128.checked_pow(u32::try_from(frac_part.len()).ok()?)?;
        nanos = nanos.checked_add(frac.checked_mul(unit_ns)? / scale)?;
    }
    Some(nanos)
}
