//! # Linux Tracer
//!
//! [`PlatformTracer`] implementation on top of `ptrace(2)`.
//!
//! ## Step Outcomes
//!
//! After `PTRACE_SINGLESTEP` the next `waitpid()` reports one of:
//!
//! - **Stopped by `SIGTRAP` from the step itself** (`si_code` of
//!   `TRAP_TRACE`, or `TRAP_BRKPT` after stepping over a syscall): the
//!   instruction completed
//! - **A ptrace event stop** (a later `execve()`): treated as a step
//! - **Stopped by any other signal**, including a `SIGTRAP` the target raised
//!   itself (`int3`, `raise()`): a signal-delivery stop; the signal is kept
//!   and passed back with the next step so the target still receives it
//! - **Exited / killed**: the target is gone and has been reaped
//!
//! Anything else leaves the target in an unknown state and fails the step.

use std::io;
use std::mem::MaybeUninit;
use std::path::Path;
use std::ptr;

use libc::{c_int, c_void};
use tracing::{debug, trace};

use super::{launch, raw_pid, registers, wait};
use crate::error::{RegscanError, Result};
use crate::tracer::PlatformTracer;
use crate::types::{ExitStatus, ProcessState, RegisterSnapshot, StepOutcome, StopReason, TracedProcess};

/// Linux `ptrace` backend
///
/// Holds no state of its own: everything about a target lives in its
/// [`TracedProcess`].
#[derive(Debug, Default)]
pub struct LinuxTracer;

impl LinuxTracer
{
    /// Create a new Linux tracer.
    #[must_use]
    pub fn new() -> Self
    {
        Self
    }
}

impl PlatformTracer for LinuxTracer
{
    fn launch_and_stop(&mut self, program: &Path) -> Result<TracedProcess>
    {
        launch::spawn_traced(program)
    }

    fn read_registers(&self, process: &TracedProcess) -> Result<RegisterSnapshot>
    {
        process.ensure_stopped()?;
        let pid = process.pid();
        registers::read_registers(raw_pid(pid)).map_err(|e| RegscanError::ReadRegistersFailed {
            pid,
            details: e.to_string(),
        })
    }

    fn step_one(&mut self, process: &mut TracedProcess) -> Result<StepOutcome>
    {
        process.ensure_stopped()?;
        let pid = process.pid();
        let raw = raw_pid(pid);
        let signal = process.take_pending_signal().unwrap_or(0);
        if signal != 0 {
            debug!("Delivering signal {} to process {}", signal, pid);
        }

        let data = libc::c_long::from(signal);
        if unsafe { libc::ptrace(libc::PTRACE_SINGLESTEP, raw, ptr::null_mut::<c_void>(), data) } == -1 {
            let err = io::Error::last_os_error();
            process.set_state(ProcessState::Failed);
            return Err(RegscanError::SingleStepFailed {
                pid,
                details: format!("PTRACE_SINGLESTEP: {err}"),
            });
        }

        let status = wait::wait_for(raw).map_err(|e| {
            process.set_state(ProcessState::Failed);
            RegscanError::SingleStepFailed {
                pid,
                details: format!("waitpid: {e}"),
            }
        })?;
        trace!("Process {} after step: {}", pid, status);

        match status {
            wait::WaitStatus::Stopped(libc::SIGTRAP) => {
                let code = trap_code(raw).map_err(|e| {
                    process.set_state(ProcessState::Failed);
                    RegscanError::SingleStepFailed {
                        pid,
                        details: format!("PTRACE_GETSIGINFO: {e}"),
                    }
                })?;
                if is_step_trap(code) {
                    Ok(StepOutcome::Stopped(StopReason::Step))
                } else {
                    debug!("Process {} raised SIGTRAP (si_code {})", pid, code);
                    process.set_pending_signal(libc::SIGTRAP);
                    Ok(StepOutcome::Stopped(StopReason::Signal(libc::SIGTRAP)))
                }
            }
            wait::WaitStatus::Event(event) => {
                debug!("Process {} reported ptrace event {}", pid, event);
                Ok(StepOutcome::Stopped(StopReason::Step))
            }
            wait::WaitStatus::Stopped(signal) => {
                process.set_pending_signal(signal);
                Ok(StepOutcome::Stopped(StopReason::Signal(signal)))
            }
            wait::WaitStatus::Exited(exit) => {
                process.set_state(ProcessState::Exited(exit));
                Ok(StepOutcome::Exited(exit))
            }
            other @ wait::WaitStatus::Other(_) => {
                process.set_state(ProcessState::Failed);
                Err(RegscanError::SingleStepFailed {
                    pid,
                    details: other.to_string(),
                })
            }
        }
    }

    fn release(&mut self, process: &mut TracedProcess) -> Result<()>
    {
        if !process.state().is_alive() {
            return Ok(());
        }

        let pid = process.pid();
        debug!("Releasing process {}", pid);
        let exit = wait::kill_and_reap(raw_pid(pid))?;
        // ECHILD means someone else reaped it; SIGKILL is the only way it went.
        process.set_state(ProcessState::Exited(exit.unwrap_or(ExitStatus::Signaled(libc::SIGKILL))));
        Ok(())
    }
}

/// `si_code` of the `SIGTRAP` the target is currently stopped with.
fn trap_code(pid: libc::pid_t) -> io::Result<c_int>
{
    let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
    if unsafe { libc::ptrace(libc::PTRACE_GETSIGINFO, pid, ptr::null_mut::<c_void>(), info.as_mut_ptr()) } == -1 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { info.assume_init() }.si_code)
}

/// Whether a `SIGTRAP` with this `si_code` was raised by single-stepping.
///
/// The kernel reports a plain step as `TRAP_TRACE` and the step over a
/// `syscall` instruction as `TRAP_BRKPT`. `int3` arrives as `SI_KERNEL`,
/// `raise()` and `kill()` as `SI_TKILL` / `SI_USER`.
const fn is_step_trap(code: c_int) -> bool
{
    matches!(code, libc::TRAP_TRACE | libc::TRAP_BRKPT)
}
