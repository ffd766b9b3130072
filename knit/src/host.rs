//! CPU utility functions
//!
//! Utilities for querying CPU information from the sysfs tree.

use std::fs;
use std::path::Path;

use crate::domain::{CpuSet, KnitError};

/// Get the set of online CPUs from `<sysfs>/devices/system/cpu/online`
///
/// The file holds a list like "0-3" or "0-3,8-11" on NUMA systems.
///
/// # Errors
/// Fails if the file cannot be read or does not hold a valid cpu list.
pub fn online_cpus(sysfs_root: &Path) -> Result<CpuSet, KnitError> {
    let path = sysfs_root.join("devices/system/cpu/online");
    let content = fs::read_to_string(&path).map_err(|e| KnitError::io(&path, e))?;

    CpuSet::parse(&content)
        .map_err(|e| KnitError::Malformed { path: path.clone(), reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CpuId;

    #[test]
    fn test_online_cpus_from_fake_sysfs() {
        let dir = tempfile::tempdir().unwrap();
        let cpu_dir = dir.path().join("devices/system/cpu");
        fs::create_dir_all(&cpu_dir).unwrap();
        fs::write(cpu_dir.join("online"), "0-3,8\n").unwrap();

        let cpus = online_cpus(dir.path()).unwrap();
        assert_eq!(cpus.len(), 5);
        assert!(cpus.contains(CpuId(8)));
    }

    #[test]
    fn test_online_cpus_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = online_cpus(dir.path()).unwrap_err();
        assert!(matches!(err, KnitError::Io { .. }));
    }

    #[test]
    fn test_online_cpus_host() {
        // This test relies on /sys being available (Linux only)
        let result = online_cpus(Path::new("/sys"));

        #[cfg(target_os = "linux")]
        {
            let cpus = result.expect("Failed to read online CPUs");
            assert!(!cpus.is_empty(), "Should have at least one CPU");
        }

        #[cfg(not(target_os = "linux"))]
        {
            assert!(result.is_err());
        }
    }
}
