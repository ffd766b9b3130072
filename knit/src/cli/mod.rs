//! Command-line interface for knit
//!
//! This module contains CLI argument parsing and configuration

pub mod args;

pub use args::{Args, Command, GlobalArgs, IrqWatchArgs, SnapProcArgs};
