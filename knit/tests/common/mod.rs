//! Fake procfs/sysfs trees and a runner for the knit binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const INTERRUPTS: &str = "           CPU0       CPU1
  0:         45          0   IO-APIC   2-edge      timer
 16:     120034       2210   IO-APIC  16-fasteoi   ehci_hcd:usb1
NMI:          3          4   Non-maskable interrupts
ERR:          0
";

pub struct FakeHost {
    dir: tempfile::TempDir,
}

impl FakeHost {
    /// Two online cpus, an interrupts table, no processes or IRQ dirs yet.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let host = Self { dir };
        fs::create_dir_all(host.procfs().join("irq")).unwrap();
        fs::write(host.procfs().join("interrupts"), INTERRUPTS).unwrap();
        let cpu_dir = host.sysfs().join("devices/system/cpu");
        fs::create_dir_all(&cpu_dir).unwrap();
        fs::write(cpu_dir.join("online"), "0-1\n").unwrap();
        host
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn procfs(&self) -> PathBuf {
        self.dir.path().join("proc")
    }

    pub fn sysfs(&self) -> PathBuf {
        self.dir.path().join("sys")
    }

    pub fn irq(&self, irq: u32, smp: &str, effective: &str, actions: &str) {
        let dir = self.procfs().join(format!("irq/{irq}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("smp_affinity_list"), format!("{smp}\n")).unwrap();
        fs::write(dir.join("effective_affinity_list"), format!("{effective}\n")).unwrap();
        let sys = self.sysfs().join(format!("kernel/irq/{irq}"));
        fs::create_dir_all(&sys).unwrap();
        fs::write(sys.join("actions"), format!("{actions}\n")).unwrap();
    }

    pub fn thread(&self, pid: u32, tid: u32, name: &str, cpus: &str) {
        let proc_dir = self.procfs().join(pid.to_string());
        let task_dir = proc_dir.join(format!("task/{tid}"));
        fs::create_dir_all(&task_dir).unwrap();
        let status = format!("Name:\t{name}\nState:\tS (sleeping)\nCpus_allowed_list:\t{cpus}\n");
        fs::write(proc_dir.join("cmdline"), format!("{name}\0")).unwrap();
        if pid == tid {
            fs::write(proc_dir.join("status"), &status).unwrap();
        }
        fs::write(task_dir.join("status"), status).unwrap();
    }

    /// Run knit against this host with the given arguments.
    pub fn knit(&self, args: &[&str]) -> Output {
        let procfs = self.procfs();
        let sysfs = self.sysfs();
        let mut full: Vec<&str> = vec!["-P", procfs.to_str().unwrap(), "-S", sysfs.to_str().unwrap()];
        full.extend_from_slice(args);
        knit(&full)
    }
}

pub fn knit(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_knit"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run knit")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("Invalid UTF-8")
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).expect("Invalid UTF-8")
}
