//! # regscan-core
//!
//! Process tracing primitives and register secret scanning for regscan.
//!
//! This crate provides everything needed to run a program one instruction at
//! a time and watch its CPU registers for known secrets:
//! - Launching a target traced from its first instruction
//! - Reading the full register file at every stop
//! - Bit-level matching of secrets against register values
//! - A session loop that reports alerts, signals and the final exit
//!
//! ## Platform Support
//!
//! - **Linux x86-64**: Uses `ptrace` (`PTRACE_TRACEME`, `PTRACE_GETREGS`,
//!   `PTRACE_SINGLESTEP`)
//! - **Everything else**: builds, but [`tracer::create_tracer`] returns
//!   `UnsupportedPlatform`
//!
//! ## Why unsafe code is needed
//!
//! `fork`, `execv`, `ptrace` and `waitpid` are raw system calls. The Linux
//! backend wraps each of them in a safe function; nothing above
//! [`platform`] touches `unsafe`.

#![allow(unsafe_code)] // Required for low-level system APIs (ptrace, fork, waitpid)

pub mod error;
pub mod events;
pub mod platform;
pub mod prelude;
pub mod scanner;
pub mod stepper;
pub mod tracer;
pub mod types;

// Re-export commonly used types
pub use error::{RegscanError, Result};
pub use events::{event_channel, EventSink, TraceEvent};
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub use platform::linux::LinuxTracer;
pub use scanner::{MatchMode, SecretScanner};
pub use stepper::{SessionSummary, StepTracer};
pub use tracer::{create_tracer, PlatformTracer};
pub use types::{ProcessId, RegisterId, RegisterSnapshot, Secret, SecretSet};
