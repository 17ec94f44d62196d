//! # Platform Tracer Trait
//!
//! The interface between the stepping loop and the operating system.
//!
//! This trait defines what a tracing backend can do, regardless of the
//! underlying platform. The stepper and the scanner depend only on it, never
//! on a specific OS primitive:
//!
//! - **Linux (x86-64)**: `fork()` + `PTRACE_TRACEME` + `execv()`,
//!   `PTRACE_GETREGS`, `PTRACE_SINGLESTEP` and `waitpid()`
//! - **Tests**: a fake tracer that replays scripted register snapshots
//!
//! ## Why use a trait?
//!
//! - Port to another OS by adding a backend, without touching the stepper
//! - Exercise the stepping loop in tests without a real traced process

use std::path::Path;

use crate::error::Result;
use crate::types::{RegisterSnapshot, StepOutcome, TracedProcess};

/// Process-control operations needed to single-step a target
///
/// ## Lifecycle
///
/// 1. `launch_and_stop(path)` - start the target suspended at its first instruction
/// 2. `read_registers()` / `step_one()` - alternate until `step_one` reports an exit
/// 3. `release()` - only if the session ends early with the target still alive
///
/// ## Thread Safety
///
/// Tracing relationships belong to the OS thread that created them. A tracer
/// and the processes it launched must be driven from one thread.
pub trait PlatformTracer
{
    /// Launch a new process and suspend it before its first instruction
    ///
    /// The target runs `program` with no arguments beyond its own path.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: The path cannot be passed to the OS (e.g. contains NUL)
    /// - `ProcessCreationFailed`: The child process could not be created
    /// - `TracingSetupFailed`: The tracing relationship could not be established
    /// - `ExecLoadFailed`: The executable could not be loaded
    /// - `UnexpectedStartStatus`: The child did anything other than stop cleanly
    fn launch_and_stop(&mut self, program: &Path) -> Result<TracedProcess>;

    /// Read the full register file of a stopped target
    ///
    /// ## Errors
    ///
    /// - `ProcessExited`: The target is no longer alive
    /// - `ReadRegistersFailed`: The OS refused the read
    fn read_registers(&self, process: &TracedProcess) -> Result<RegisterSnapshot>;

    /// Resume the target for exactly one instruction and wait for it
    ///
    /// Blocks until the target stops again or terminates, and updates the
    /// process state accordingly. A signal recorded by a previous stop is
    /// delivered with this step.
    ///
    /// ## Errors
    ///
    /// - `ProcessExited`: The target is no longer alive
    /// - `SingleStepFailed`: The step request or the following wait failed
    fn step_one(&mut self, process: &mut TracedProcess) -> Result<StepOutcome>;

    /// Terminate and reap a target that is still alive
    ///
    /// Does nothing for a target that has already exited.
    ///
    /// ## Errors
    ///
    /// - `Io`: The target could not be killed or reaped
    fn release(&mut self, process: &mut TracedProcess) -> Result<()>;
}

impl<T: PlatformTracer + ?Sized> PlatformTracer for Box<T>
{
    fn launch_and_stop(&mut self, program: &Path) -> Result<TracedProcess>
    {
        (**self).launch_and_stop(program)
    }

    fn read_registers(&self, process: &TracedProcess) -> Result<RegisterSnapshot>
    {
        (**self).read_registers(process)
    }

    fn step_one(&mut self, process: &mut TracedProcess) -> Result<StepOutcome>
    {
        (**self).step_one(process)
    }

    fn release(&mut self, process: &mut TracedProcess) -> Result<()>
    {
        (**self).release(process)
    }
}

/// Factory function to create the tracer for the current platform
///
/// Uses conditional compilation to pick the backend at compile time.
///
/// ## Platform Support
///
/// - ✅ Linux x86-64: Returns `LinuxTracer`
/// - ❌ Everything else: `UnsupportedPlatform`
///
/// ## Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use regscan_core::tracer::{create_tracer, PlatformTracer};
///
/// let mut tracer = create_tracer()?;
/// let process = tracer.launch_and_stop(Path::new("/bin/true"))?;
/// println!("Target stopped with PID {}", process.pid());
/// # Ok::<(), regscan_core::error::RegscanError>(())
/// ```
pub fn create_tracer() -> Result<Box<dyn PlatformTracer>>
{
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        Ok(Box::new(crate::platform::linux::LinuxTracer::new()))
    }

    #[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
    {
        Err(crate::error::RegscanError::UnsupportedPlatform(format!(
            "{}-{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        )))
    }
}
