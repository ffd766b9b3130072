//! Pre-flight checks for knit
//!
//! Validates the procfs/sysfs roots before a command starts reading from them.
//! Provides clear, actionable error messages when they are not usable.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::path::Path;

/// Check that the procfs root is a directory that looks like procfs
pub fn check_procfs(procfs_root: &Path) -> Result<()> {
    if !procfs_root.is_dir() {
        bail!(
            "procfs root not found: {}\n\n\
             Pass the mount point of procfs (or of a snapshot) with --procfs",
            procfs_root.display()
        );
    }
    Ok(())
}

/// Check that the interrupt table can be opened before sampling starts
pub fn check_interrupts_readable(procfs_root: &Path) -> Result<()> {
    let path = procfs_root.join("interrupts");
    File::open(&path).with_context(|| {
        format!(
            "Cannot read {}\n\n\
             This usually means:\n\
             - procfs is not mounted at {}\n\
             - knit is not allowed to read it",
            path.display(),
            procfs_root.display()
        )
    })?;
    Ok(())
}

/// Check that the sysfs root is a directory
pub fn check_sysfs(sysfs_root: &Path) -> Result<()> {
    if !sysfs_root.is_dir() {
        bail!(
            "sysfs root not found: {}\n\n\
             Pass the mount point of sysfs with --sysfs",
            sysfs_root.display()
        );
    }
    Ok(())
}
