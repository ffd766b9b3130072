//! Process and thread enumeration under a procfs root.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::domain::{CpuSet, Pid, Tid};

/// The fields of `/proc/<pid>/task/<tid>/status` knit cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub name: String,
    pub cpus_allowed: CpuSet,
}

/// PIDs found under `procfs_root`, ascending.
///
/// # Errors
/// Returns error if `procfs_root` cannot be listed.
pub fn list_pids(procfs_root: &Path) -> Result<Vec<Pid>> {
    let mut pids: Vec<Pid> = numeric_entries(procfs_root)
        .with_context(|| format!("Failed to read {}", procfs_root.display()))?
        .into_iter()
        .map(Pid)
        .collect();
    pids.sort();
    Ok(pids)
}

/// Thread IDs of `pid`, ascending.
///
/// # Errors
/// Returns error if the process is gone or its task directory is unreadable.
pub fn list_threads(procfs_root: &Path, pid: Pid) -> Result<Vec<Tid>> {
    let task_dir = procfs_root.join(pid.to_string()).join("task");
    let mut tids: Vec<Tid> = numeric_entries(&task_dir)
        .with_context(|| format!("Failed to read {}", task_dir.display()))?
        .into_iter()
        .map(Tid)
        .collect();
    tids.sort();
    Ok(tids)
}

/// Read and parse a `status` file.
///
/// # Errors
/// Returns error if the file is unreadable or lacks `Name`/`Cpus_allowed_list`.
pub fn read_status(path: &Path) -> Result<TaskStatus> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    parse_status(&content).with_context(|| format!("Invalid status file {}", path.display()))
}

/// Extract `Name` and `Cpus_allowed_list` from status content.
/// Format: one "Key:\tvalue" per line.
fn parse_status(content: &str) -> Result<TaskStatus> {
    let mut name = None;
    let mut cpus_allowed = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key {
            "Name" => name = Some(value.trim().to_string()),
            "Cpus_allowed_list" => cpus_allowed = Some(CpuSet::parse(value)?),
            _ => {}
        }
    }

    Ok(TaskStatus {
        name: name.context("missing Name")?,
        cpus_allowed: cpus_allowed.context("missing Cpus_allowed_list")?,
    })
}

/// Directory entries whose name is a number, the way pids and tids show up.
fn numeric_entries(dir: &Path) -> std::io::Result<Vec<u32>> {
    Ok(fs::read_dir(dir)?
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect())
}
