//! # Error Types
//!
//! General error handling for the tracer.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::ProcessId;

/// Main error type for tracing operations
///
/// This enum represents all the ways a tracing session can fail. Each variant
/// corresponds to a specific failure point in the process lifecycle.
///
/// ## Error Categories
///
/// 1. **Input errors**: InvalidArgument
/// 2. **Startup errors**: ProcessCreationFailed, TracingSetupFailed, ExecLoadFailed, UnexpectedStartStatus
/// 3. **Session errors**: ReadRegistersFailed, SingleStepFailed, ProcessExited
/// 4. **Platform errors**: UnsupportedPlatform
/// 5. **I/O errors**: Io
///
/// None of these are retried. Every error ends the session with a diagnostic;
/// scanning registers for secrets never fails.
#[derive(Error, Debug)]
pub enum RegscanError
{
    /// Invalid argument passed to a tracer function
    ///
    /// Examples:
    /// - A program path containing an interior NUL byte
    /// - Two secrets sharing the same name
    /// - A secret name without a value on the command line
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The controller could not create the child process
    ///
    /// This is `fork()` failing, usually because of process limits
    /// (`EAGAIN`) or memory pressure (`ENOMEM`). The session never starts.
    #[error("Failed to create process: {0}")]
    ProcessCreationFailed(#[source] std::io::Error),

    /// The child could not establish the tracing relationship
    ///
    /// This happens when `PTRACE_TRACEME` is refused in the child (for
    /// example under a seccomp profile or Yama `ptrace_scope = 3`), or when
    /// the controller cannot set tracing options after the first stop.
    #[error("Failed to set up tracing: {0}")]
    TracingSetupFailed(String),

    /// The child could not load the target executable
    ///
    /// The child reports the `execv()` errno back to the controller before
    /// exiting, so the path and the OS reason are both available here.
    #[error("Failed to execute program `{program}`: {source}")]
    ExecLoadFailed
    {
        /// Program path as given by the caller
        program: String,
        /// OS error reported by `execv()`
        #[source]
        source: std::io::Error,
    },

    /// The first wait after launch did not observe a clean tracing stop
    ///
    /// A correctly launched target stops with `SIGTRAP` right after `execv()`.
    /// Anything else (an exit, a kill, a different stop signal) means the
    /// target is not in a state we can step from.
    #[error("Process {pid} did not stop for tracing: {status}")]
    UnexpectedStartStatus
    {
        /// Process that produced the status
        pid: ProcessId,
        /// Human-readable description of the observed wait status
        status: String,
    },

    /// Failed to read registers from the target process
    ///
    /// This can happen if:
    /// - The target was killed between the last stop and the read
    /// - The tracing relationship was lost
    #[error("Failed to read registers of process {pid}: {details}")]
    ReadRegistersFailed
    {
        /// Process whose registers could not be read
        pid: ProcessId,
        /// Additional error details
        details: String,
    },

    /// Failed to resume the target for a single instruction
    ///
    /// Covers both a refused `PTRACE_SINGLESTEP` request and a failed or
    /// unrecognised wait afterwards.
    #[error("Failed to single-step process {pid}: {details}")]
    SingleStepFailed
    {
        /// Process that could not be stepped
        pid: ProcessId,
        /// Additional error details
        details: String,
    },

    /// Operation requires a live, stopped target but the target is gone
    #[error("Process {0} has already exited")]
    ProcessExited(ProcessId),

    /// No tracing backend exists for the platform this was built for
    #[error("Tracing not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// I/O error (pipes, file descriptors, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, RegscanError>`
///
/// ```rust
/// use regscan_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, RegscanError>;
