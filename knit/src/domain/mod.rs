//! Domain model for knit
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time safety via newtype pattern
//! - Self-documenting function signatures
//! - Structured error handling

pub mod cpuset;
pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use cpuset::CpuSet;
pub use types::{CpuId, IrqNumber, Pid, Tid};

pub use errors::KnitError;
