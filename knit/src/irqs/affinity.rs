//! IRQ affinity from `/proc/irq/<N>/`
//!
//! Every IRQ directory carries the CPU list the IRQ is allowed on
//! (`smp_affinity_list`) and, on most architectures, the list it is actually
//! routed to (`effective_affinity_list`). Device names come from
//! `/sys/kernel/irq/<N>/actions`.

use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::domain::{CpuSet, IrqNumber, KnitError};

/// Which affinity list to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AffinityKind {
    /// `smp_affinity_list`, what was requested
    #[default]
    Configured,
    /// `effective_affinity_list`, what the interrupt controller applied
    Effective,
}

impl AffinityKind {
    pub fn file_name(self) -> &'static str {
        match self {
            AffinityKind::Configured => "smp_affinity_list",
            AffinityKind::Effective => "effective_affinity_list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrqAffinity {
    pub irq: IrqNumber,
    /// Comma separated handler names, empty when unknown
    pub name: String,
    pub cpus: CpuSet,
}

/// IRQs whose affinity overlaps `selected`, sorted by IRQ number.
///
/// IRQs whose affinity file cannot be read or parsed are skipped.
///
/// # Errors
/// Fails only if `<procfs>/irq` itself cannot be listed.
pub fn irq_affinities(
    procfs_root: &Path,
    sysfs_root: &Path,
    kind: AffinityKind,
    selected: &CpuSet,
) -> Result<Vec<IrqAffinity>, KnitError> {
    let irq_dir = procfs_root.join("irq");
    let entries = fs::read_dir(&irq_dir).map_err(|e| KnitError::io(&irq_dir, e))?;

    let mut res: Vec<IrqAffinity> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let irq = IrqNumber(entry.file_name().to_string_lossy().parse().ok()?);

            let path = entry.path().join(kind.file_name());
            let cpus = match fs::read_to_string(&path) {
                Ok(content) => CpuSet::parse(&content).ok()?,
                Err(e) => {
                    debug!("skipping IRQ {irq}: {}: {e}", path.display());
                    return None;
                }
            };
            if !cpus.intersects(selected) {
                return None;
            }

            Some(IrqAffinity { irq, name: irq_name(sysfs_root, irq), cpus })
        })
        .collect();

    res.sort_by_key(|a| a.irq);
    Ok(res)
}

fn irq_name(sysfs_root: &Path, irq: IrqNumber) -> String {
    let path = sysfs_root.join(format!("kernel/irq/{irq}/actions"));
    fs::read_to_string(path).map(|s| s.trim().to_string()).unwrap_or_default()
}
