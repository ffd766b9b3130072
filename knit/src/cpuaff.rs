//! Thread CPU affinity, as reported by `Cpus_allowed_list`

use anyhow::Result;
use log::debug;
use serde::Serialize;
use std::path::Path;

use crate::domain::{CpuSet, Pid, Tid};
use crate::process_lookup::{list_pids, list_threads, read_status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadAffinity {
    pub pid: Pid,
    pub tid: Tid,
    pub name: String,
    pub cpus: CpuSet,
}

/// Every thread allowed to run on at least one CPU of `selected`, sorted by
/// (pid, tid).
///
/// Processes and threads exit while we walk the tree; those are skipped.
///
/// # Errors
/// Fails only if the procfs root cannot be listed.
pub fn thread_affinities(procfs_root: &Path, selected: &CpuSet) -> Result<Vec<ThreadAffinity>> {
    let mut res = Vec::new();

    for pid in list_pids(procfs_root)? {
        let tids = match list_threads(procfs_root, pid) {
            Ok(tids) => tids,
            Err(e) => {
                debug!("skipping pid {pid}: {e:#}");
                continue;
            }
        };

        for tid in tids {
            let path = procfs_root.join(format!("{pid}/task/{tid}/status"));
            let status = match read_status(&path) {
                Ok(status) => status,
                Err(e) => {
                    debug!("skipping tid {tid}: {e:#}");
                    continue;
                }
            };
            if status.cpus_allowed.intersects(selected) {
                res.push(ThreadAffinity { pid, tid, name: status.name, cpus: status.cpus_allowed });
            }
        }
    }

    Ok(res)
}
