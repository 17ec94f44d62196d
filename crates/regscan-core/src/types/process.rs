//! Process identity and lifecycle types.

use std::fmt;

use crate::error::{RegscanError, Result};

/// Process identifier (PID)
///
/// A PID is a unique number assigned to each running process by the operating
/// system. On Linux, PIDs are positive `pid_t` values that fit in a `u32`.
///
/// ## Why wrap it in a struct?
///
/// Using a newtype pattern (`struct ProcessId(u32)`) instead of a raw `u32`
/// provides:
/// - **Type safety**: Prevents accidentally passing a random number where a PID is expected
/// - **Self-documenting code**: Makes it clear what the value represents
///
/// ## Example
///
/// ```rust
/// use regscan_core::types::ProcessId;
///
/// let pid = ProcessId::from(12345);
/// assert_eq!(pid.to_string(), "12345");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// How a traced process terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus
{
    /// The process called `exit()` (or returned from `main`) with this code
    Code(i32),
    /// The process was killed by this signal number
    Signaled(i32),
}

impl ExitStatus
{
    /// Whether the target exited on its own with status 0.
    #[must_use]
    pub const fn success(self) -> bool
    {
        matches!(self, ExitStatus::Code(0))
    }
}

impl fmt::Display for ExitStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ExitStatus::Code(code) => write!(f, "exit code {code}"),
            ExitStatus::Signaled(signal) => write!(f, "killed by signal {signal}"),
        }
    }
}

/// Why the target stopped after a single-step request
///
/// ## Platform-Specific Behavior
///
/// - **Linux**: A completed single step is reported as a `SIGTRAP` stop. Any
///   other stop signal is a signal-delivery stop: the kernel is about to hand
///   the signal to the target, and the tracer decides whether to pass it on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason
{
    /// Exactly one instruction was executed
    Step,
    /// A signal is pending for the target
    ///
    /// The tracer re-injects it on the next single-step so the target sees
    /// the same signal it would have seen without a tracer attached.
    Signal(i32),
}

/// Result of resuming the target for one instruction
///
/// A failed step request is not an outcome: it is returned as the `Err` arm
/// of [`PlatformTracer::step_one`](crate::tracer::PlatformTracer::step_one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome
{
    /// The target is suspended again and its registers can be read
    Stopped(StopReason),
    /// The target terminated; no further tracing calls are valid
    Exited(ExitStatus),
}

/// Lifecycle state of a traced process
///
/// ## State Transitions
///
/// - `Starting` → `Stopped`: the first tracing stop after `execv()` was observed
/// - `Stopped` → `Stopped`: one instruction executed, target suspended again
/// - `Stopped` → `Exited(status)`: the target terminated
/// - any → `Failed`: a tracing call failed and the session was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState
{
    /// Forked, waiting for the first tracing stop
    Starting,
    /// Suspended under tracer control
    Stopped,
    /// Terminated and reaped
    Exited(ExitStatus),
    /// A tracing call failed; the target may still need to be reaped
    Failed,
}

impl ProcessState
{
    /// Whether the OS process may still exist and need reaping.
    #[must_use]
    pub const fn is_alive(self) -> bool
    {
        !matches!(self, ProcessState::Exited(_))
    }
}

/// The tracing relationship between the controller and one target process
///
/// A `TracedProcess` is produced by
/// [`PlatformTracer::launch_and_stop`](crate::tracer::PlatformTracer::launch_and_stop)
/// and then owned by exactly one [`StepTracer`](crate::stepper::StepTracer).
/// Its state is advanced only by the platform tracer.
#[derive(Debug)]
pub struct TracedProcess
{
    pid: ProcessId,
    state: ProcessState,
    pending_signal: Option<i32>,
}

impl TracedProcess
{
    /// Track a freshly forked child that has not stopped yet.
    #[must_use]
    pub fn new(pid: ProcessId) -> Self
    {
        Self {
            pid,
            state: ProcessState::Starting,
            pending_signal: None,
        }
    }

    /// Process ID of the target.
    #[must_use]
    pub fn pid(&self) -> ProcessId
    {
        self.pid
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ProcessState
    {
        self.state
    }

    /// Move to a new lifecycle state.
    pub fn set_state(&mut self, state: ProcessState)
    {
        self.state = state;
    }

    /// Ensure the target is suspended and safe to inspect or resume
    ///
    /// ## Errors
    ///
    /// - `ProcessExited`: The target has terminated
    /// - `InvalidArgument`: The target has not stopped yet, or tracing failed earlier
    pub fn ensure_stopped(&self) -> Result<()>
    {
        match self.state {
            ProcessState::Stopped => Ok(()),
            ProcessState::Exited(_) => Err(RegscanError::ProcessExited(self.pid)),
            ProcessState::Starting | ProcessState::Failed => Err(RegscanError::InvalidArgument(format!(
                "Process {} is not stopped for tracing ({:?})",
                self.pid, self.state
            ))),
        }
    }

    /// Signal to deliver with the next resume, if any.
    #[must_use]
    pub fn pending_signal(&self) -> Option<i32>
    {
        self.pending_signal
    }

    /// Take the pending signal, leaving none behind.
    pub fn take_pending_signal(&mut self) -> Option<i32>
    {
        self.pending_signal.take()
    }

    /// Remember a signal to deliver with the next resume.
    pub fn set_pending_signal(&mut self, signal: i32)
    {
        self.pending_signal = Some(signal);
    }
}
