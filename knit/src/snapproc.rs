//! Process snapshot
//!
//! Copies the volatile parts of procfs (per-process `cmdline` and `status`,
//! per-thread `status`) into `<dest>/proc` and packs that tree as a gzipped
//! tarball. Once unpacked it can be inspected with `knit -P <dir>/proc cpuaff`.

use anyhow::{Context, Result};
use flate2::{write::GzEncoder, Compression};
use log::{debug, info};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::Pid;
use crate::process_lookup::{list_pids, list_threads};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotStats {
    pub processes: usize,
    pub threads: usize,
    /// Processes that vanished or could not be copied
    pub skipped: usize,
}

/// Where the packed snapshot is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutput {
    Stdout,
    File(PathBuf),
}

impl SnapshotOutput {
    /// `-` means stdout, anything else is a file path.
    pub fn from_arg(output: &Path) -> Self {
        if output == Path::new("-") {
            Self::Stdout
        } else {
            Self::File(output.to_path_buf())
        }
    }
}

/// Clone procfs and pack the clone into `output`.
///
/// With a `clone_path` the cloned tree is left in place for the caller.
/// Without one, a temporary directory is used and removed afterwards.
///
/// # Errors
/// Fails if the clone cannot be made or the archive cannot be written.
pub fn make_snapshot(
    procfs_root: &Path,
    clone_path: Option<&Path>,
    output: &SnapshotOutput,
) -> Result<SnapshotStats> {
    let temp_dir;
    let scratch_dir = if let Some(dir) = clone_path {
        dir
    } else {
        temp_dir = tempfile::Builder::new()
            .prefix("knit-snapproc")
            .tempdir()
            .context("Failed to create scratch directory")?;
        temp_dir.path()
    };

    let stats = clone_proc_into(procfs_root, scratch_dir)?;

    match output {
        SnapshotOutput::Stdout => {
            pack_from(io::stdout().lock(), scratch_dir)?
                .flush()
                .context("Failed to write archive")?;
        }
        SnapshotOutput::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create {}", path.display()))?;
            pack_from(BufWriter::new(file), scratch_dir)?
                .flush()
                .with_context(|| format!("Cannot write {}", path.display()))?;
            info!("snapshot written to {}", path.display());
        }
    }
    Ok(stats)
}

/// Pack `<scratch_dir>/proc` as a gzipped tarball whose entries live under
/// `proc/`. Returns the underlying writer once the gzip stream is finished.
///
/// # Errors
/// Fails on any read of the clone or write to `out`.
pub fn pack_from<W: Write>(out: W, scratch_dir: &Path) -> Result<W> {
    let mut archive = tar::Builder::new(GzEncoder::new(out, Compression::default()));
    archive
        .append_dir_all("proc", scratch_dir.join("proc"))
        .with_context(|| format!("Failed to pack {}", scratch_dir.display()))?;
    let encoder = archive.into_inner().context("Failed to finish archive")?;
    encoder.finish().context("Failed to compress archive")
}

/// Clone procfs into `<dest>/proc`.
///
/// Individual processes that disappear mid-copy are skipped.
///
/// # Errors
/// Fails if the destination cannot be created or procfs cannot be listed.
pub fn clone_proc_into(procfs_root: &Path, dest: &Path) -> Result<SnapshotStats> {
    let base_dir = dest.join("proc");
    fs::create_dir_all(&base_dir)
        .with_context(|| format!("Failed to create {}", base_dir.display()))?;

    let mut stats = SnapshotStats::default();
    for pid in list_pids(procfs_root)? {
        match clone_proc_entry(procfs_root, &base_dir, pid) {
            Ok(threads) => {
                stats.processes += 1;
                stats.threads += threads;
            }
            Err(e) => {
                debug!("skipping pid {pid}: {e:#}");
                stats.skipped += 1;
            }
        }
    }

    info!(
        "cloned {} processes ({} threads) into {}, skipped {}",
        stats.processes,
        stats.threads,
        base_dir.display(),
        stats.skipped
    );
    Ok(stats)
}

/// Returns the number of threads copied.
fn clone_proc_entry(procfs_root: &Path, base_dir: &Path, pid: Pid) -> Result<usize> {
    let entry_dir = procfs_root.join(pid.to_string());
    let target_dir = base_dir.join(pid.to_string());

    // keep the entry open while copying it
    let _handle = File::open(entry_dir.join("cmdline"))
        .with_context(|| format!("Cannot open {}", entry_dir.join("cmdline").display()))?;

    copy_items(&entry_dir, &target_dir, &["cmdline", "status"])?;

    let mut threads = 0;
    for tid in list_threads(procfs_root, pid)? {
        let name = tid.to_string();
        let copied = copy_items(
            &entry_dir.join("task").join(&name),
            &target_dir.join("task").join(&name),
            &["status"],
        );
        match copied {
            Ok(()) => threads += 1,
            Err(e) => debug!("skipping tid {tid}: {e:#}"),
        }
    }
    Ok(threads)
}

fn copy_items(src_dir: &Path, dst_dir: &Path, items: &[&str]) -> Result<()> {
    fs::create_dir_all(dst_dir).with_context(|| format!("Failed to create {}", dst_dir.display()))?;
    for item in items {
        let src = src_dir.join(item);
        // procfs files report a size of 0, so read them fully instead of fs::copy
        let buf = fs::read(&src).with_context(|| format!("Cannot read {}", src.display()))?;
        let dst = dst_dir.join(item);
        fs::write(&dst, buf).with_context(|| format!("Cannot write {}", dst.display()))?;
    }
    Ok(())
}
