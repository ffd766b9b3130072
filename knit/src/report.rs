//! Text and JSON presenters
//!
//! Everything knit prints on stdout goes through here. JSON output is one
//! document per line so `irqwatch -J` can be consumed as a stream.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::cpuaff::ThreadAffinity;
use crate::domain::{CpuSet, KnitError};
use crate::irqs::{Delta, IrqAffinity, IrqCounters, WatchSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Format::Json
        } else {
            Format::Text
        }
    }
}

#[derive(Serialize)]
struct IrqDeltaRecord<'a> {
    timestamp: DateTime<Local>,
    counters: &'a IrqCounters,
}

#[derive(Serialize)]
struct IrqSummaryRecord<'a> {
    elapsed: String,
    counters: &'a IrqCounters,
}

/// Writes watch records restricted to the selected CPUs, zero counts omitted.
pub struct Reporter<W: Write> {
    out: W,
    format: Format,
    cpus: CpuSet,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, format: Format, cpus: CpuSet) -> Self {
        Self { out, format, cpus }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_counters(&mut self, prefix: &str, counters: &IrqCounters) -> Result<(), KnitError> {
        for (cpu, values) in counters.iter() {
            for (label, val) in values {
                writeln!(self.out, "{prefix}CPU={cpu} IRQ={label} +{val}")?;
            }
        }
        Ok(())
    }

    fn write_json<T: Serialize>(&mut self, record: &T) -> Result<(), KnitError> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> WatchSink for Reporter<W> {
    fn tick(&mut self, at: DateTime<Local>, delta: &Delta) -> Result<(), KnitError> {
        let counters = delta.nonzero_for_cpus(&self.cpus);
        match self.format {
            Format::Text => self.write_counters(&format!("{} ", at.to_rfc3339()), &counters)?,
            Format::Json => {
                self.write_json(&IrqDeltaRecord { timestamp: at, counters: &counters })?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn summary(&mut self, elapsed: Duration, delta: &Delta) -> Result<(), KnitError> {
        let counters = delta.nonzero_for_cpus(&self.cpus);
        match self.format {
            Format::Text => {
                writeln!(self.out, "\nIRQ summary on cpus {} after {elapsed:?}", self.cpus)?;
                self.write_counters("", &counters)?;
            }
            Format::Json => {
                let record = IrqSummaryRecord { elapsed: format!("{elapsed:?}"), counters: &counters };
                self.write_json(&record)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// `knit irqaff` output
///
/// # Errors
/// Fails if the output cannot be written.
pub fn write_irq_affinities<W: Write>(
    out: &mut W,
    format: Format,
    irqs: &[IrqAffinity],
) -> Result<(), KnitError> {
    match format {
        Format::Text => {
            for irq in irqs {
                writeln!(out, "IRQ {:>3} [{:>24}]: can run on {}", irq.irq, irq.name, irq.cpus)?;
            }
        }
        Format::Json => {
            serde_json::to_writer(&mut *out, irqs)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// `knit cpuaff` output
///
/// # Errors
/// Fails if the output cannot be written.
pub fn write_thread_affinities<W: Write>(
    out: &mut W,
    format: Format,
    threads: &[ThreadAffinity],
) -> Result<(), KnitError> {
    match format {
        Format::Text => {
            for t in threads {
                writeln!(
                    out,
                    "PID {:>6} TID {:>6} ({:>16}): can run on {}",
                    t.pid, t.tid, t.name, t.cpus
                )?;
            }
        }
        Format::Json => {
            serde_json::to_writer(&mut *out, threads)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
