//! # knit - Low-latency Host Inspection
//!
//! knit reads kernel scheduling and interrupt routing state from procfs and
//! sysfs and reports it for a selected set of CPUs, typically the isolated
//! CPUs of a host tuned for low-latency workloads.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │               /proc/interrupts   /proc/irq/<N>/               │
//! │         /proc/<pid>/task/<tid>/status   /sys/.../cpu/online   │
//! └───────────────────────┬───────────────────────────────────────┘
//!                         │ single reads
//!                         ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐       │
//! │  │ Stats Reader │──▶│ Delta Engine │──▶│ Watch Loop   │       │
//! │  │ (snapshot)   │   │ (per tick)   │   │ (tokio)      │       │
//! │  └──────────────┘   └──────────────┘   └──────┬───────┘       │
//! │                                               │               │
//! │  ┌──────────────┐   ┌──────────────┐          ▼               │
//! │  │ IRQ affinity │   │ CPU affinity │──▶ ┌──────────────┐      │
//! │  └──────┬───────┘   └──────────────┘    │   Report     │      │
//! │         └──────────────────────────────▶│ (text/JSON)  │      │
//! │                                         └──────────────┘      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! - [`irqs`]: interrupt counters, deltas, the watch loop and IRQ affinity
//! - [`cpuaff`]: which threads may run on the selected CPUs
//! - [`snapproc`]: pack process data from procfs into a `.tgz` for offline inspection
//! - [`report`]: text and JSON presenters
//! - [`config`] / [`cli`]: command line and its resolved, immutable form
//! - [`domain`]: core types (`CpuId`, `Pid`, `CpuSet`) and errors
//! - [`host`], [`process_lookup`], [`preflight`]: procfs/sysfs helpers
//!
//! ## Typical Usage
//!
//! ```bash
//! # Which IRQs can land on the isolated cpus?
//! knit -C 2-7 irqaff
//!
//! # What interrupts actually hit them, every 500ms, for 20 periods?
//! knit -C 2-7 irqwatch -W 500ms -T 20 -v 2
//!
//! # Capture a snapshot, inspect it elsewhere
//! knit snapproc -o snap.tgz
//! mkdir snap && tar -xzf snap.tgz -C snap && knit -P ./snap/proc -C 2-7 cpuaff
//! ```

pub mod cli;
pub mod config;
pub mod cpuaff;
pub mod domain;
pub mod host;
pub mod irqs;
pub mod preflight;
pub mod process_lookup;
pub mod report;
pub mod snapproc;
