//! CLI argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "knit",
    version,
    about = "knit allows to check system settings for low-latency workload",
    after_help = "\
EXAMPLES:
    knit -C 2-3 irqaff                       IRQs that may be routed to cpus 2-3
    knit -C 2-3 -e irqaff                    Same, using the effective affinity
    knit -C 2-3 cpuaff                       Threads allowed to run on cpus 2-3
    knit -C 2-3 irqwatch -W 500ms -T 10      Watch IRQ activity on cpus 2-3
    knit snapproc -o snap.tgz                Pack process data into snap.tgz
    knit snapproc -c ./snap -o -             Keep the clone in ./snap, archive to stdout"
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Flags accepted before or after any subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Cpu set to check (see cpuset(7), "List format"); empty means all online cpus
    #[arg(short = 'C', long, global = true, default_value = "")]
    pub cpulist: String,

    /// Procfs root
    #[arg(short = 'P', long, global = true, default_value = "/proc")]
    pub procfs: PathBuf,

    /// Sysfs root
    #[arg(short = 'S', long, global = true, default_value = "/sys")]
    pub sysfs: PathBuf,

    /// Enable debug log
    #[arg(short = 'D', long, global = true)]
    pub debug: bool,

    /// Output as JSON
    #[arg(short = 'J', long, global = true)]
    pub json: bool,

    /// Report effective IRQ affinity instead of the configured one
    #[arg(short = 'e', long, global = true)]
    pub effective_affinity: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the IRQs that may be routed to the selected cpus
    Irqaff,
    /// Show the threads allowed to run on the selected cpus
    Cpuaff,
    /// Watch IRQ counters
    Irqwatch(IrqWatchArgs),
    /// Create snapshot of running processes
    Snapproc(SnapProcArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct IrqWatchArgs {
    /// Number of watch loops to perform, each every `watch-period`. Use -1 to run forever.
    #[arg(short = 'T', long, default_value_t = -1, allow_negative_numbers = true)]
    pub watch_times: i64,

    /// Period to poll IRQ counters
    #[arg(short = 'W', long, default_value = "1s")]
    pub watch_period: String,

    /// Verbosiness amount (0 or less silent, 1 summary, 2 every period)
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub verbose: i32,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SnapProcArgs {
    /// Directory to clone the process data into and keep. If not given, a
    /// temporary directory is used and removed afterwards
    #[arg(short = 'c', long, value_name = "DIR")]
    pub clone_path: Option<PathBuf>,

    /// Snapshot archive (gzipped tarball). Use "-" to send on stdout
    #[arg(short = 'o', long, default_value = "snapproc.tgz")]
    pub output: PathBuf,
}
