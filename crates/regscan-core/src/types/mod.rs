//! # Types
//!
//! Platform-agnostic types used throughout the tracer.
//!
//! These types abstract away platform-specific details, allowing the stepper
//! and scanner to work with concepts like "process ID", "register snapshot"
//! and "secret" without knowing how the OS exposes them.

pub mod process;
pub mod registers;
pub mod secret;

// Re-export all public types
pub use process::{ExitStatus, ProcessId, ProcessState, StepOutcome, StopReason, TracedProcess};
pub use registers::{RegisterId, RegisterSnapshot, SegmentBase, SegmentRegister, X86_64Register};
pub use secret::{Secret, SecretSet};
