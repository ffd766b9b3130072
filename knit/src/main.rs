//! # knit - Main Entry Point
//!
//! Resolves the command line into [`KnitOptions`] once, then dispatches to
//! one of the subcommands:
//! - `irqaff`: IRQ to CPU routing
//! - `cpuaff`: thread CPU affinity
//! - `irqwatch`: IRQ counter sampling until Ctrl+C or `--watch-times`
//! - `snapproc`: clone process data for offline inspection

use anyhow::Result;
use clap::{CommandFactory, Parser};
use log::{info, warn};
use std::io;

use knit::cli::{Args, Command, IrqWatchArgs};
use knit::config::{KnitOptions, WatchConfig};
use knit::cpuaff::thread_affinities;
use knit::domain::KnitError;
use knit::irqs::{irq_affinities, IrqWatcher, ProcInterrupts};
use knit::preflight::{check_interrupts_readable, check_procfs, check_sysfs};
use knit::report::{write_irq_affinities, write_thread_affinities, Format, Reporter};
use knit::snapproc::{make_snapshot, SnapshotOutput};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let is_config =
        err.chain().any(|cause| cause.downcast_ref::<KnitError>().is_some_and(KnitError::is_config));
    let msg = format!("{err:#}").to_lowercase();
    if is_config {
        EXIT_USAGE
    } else if msg.contains("permission denied") {
        EXIT_NOPERM
    } else {
        EXIT_ERROR
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

/// Resolves once the user hits Ctrl+C. If the handler cannot be installed
/// the watch runs until its tick limit.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

async fn watch_irqs(opts: &KnitOptions, args: &IrqWatchArgs, format: Format) -> Result<()> {
    let config = WatchConfig::from_args(args)?;
    check_interrupts_readable(&opts.procfs_root)?;

    let source = ProcInterrupts::new(&opts.procfs_root);
    info!("watching {} every {:?} ({:?})", source.path().display(), config.period, config.limit);

    let watcher = IrqWatcher::new(config, source);
    let mut reporter = Reporter::new(io::stdout(), format, opts.cpus.clone());
    let outcome = watcher.run(interrupted(), &mut reporter).await?;

    info!("{:?}: {} ticks in {:?}", outcome.reason, outcome.ticks, outcome.elapsed);
    Ok(())
}

#[tokio::main]
async fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.global.debug);

    let Some(command) = args.command else {
        eprint!("{}", Args::command().render_help());
        return Ok(());
    };

    let opts = KnitOptions::from_args(&args.global)?;
    check_procfs(&opts.procfs_root)?;
    let format = Format::from_json_flag(opts.json);

    match command {
        Command::Irqaff => {
            check_sysfs(&opts.sysfs_root)?;
            let irqs =
                irq_affinities(&opts.procfs_root, &opts.sysfs_root, opts.affinity, &opts.cpus)?;
            write_irq_affinities(&mut io::stdout(), format, &irqs)?;
        }
        Command::Cpuaff => {
            let threads = thread_affinities(&opts.procfs_root, &opts.cpus)?;
            write_thread_affinities(&mut io::stdout(), format, &threads)?;
        }
        Command::Irqwatch(watch_args) => watch_irqs(&opts, &watch_args, format).await?,
        Command::Snapproc(snap_args) => {
            let output = SnapshotOutput::from_arg(&snap_args.output);
            let stats =
                make_snapshot(&opts.procfs_root, snap_args.clone_path.as_deref(), &output)?;
            info!("snapshot: {} processes, {} threads", stats.processes, stats.threads);
        }
    }

    Ok(())
}
