//! # Linux Tracing Implementation
//!
//! Linux-specific tracer built on `ptrace(2)`.
//!
//! Unlike an attach-style debugger, the target is traced from birth:
//!
//! - **fork()**: Create the child process
//! - **PTRACE_TRACEME**: The child asks to be traced by its parent
//! - **execv()**: The child loads the target; the kernel stops it with `SIGTRAP`
//!   before the first instruction of the new image runs
//! - **PTRACE_GETREGS**: Read `user_regs_struct` while the target is stopped
//! - **PTRACE_SINGLESTEP** + **waitpid()**: Execute one instruction and wait
//!
//! ## Dependencies
//!
//! - **libc crate**: `fork`, `execv`, `ptrace`, `waitpid`, `user_regs_struct`
//!
//! ## References
//!
//! - [ptrace(2) man page](https://man7.org/linux/man-pages/man2/ptrace.2.html)
//! - [waitpid(2) man page](https://man7.org/linux/man-pages/man2/waitpid.2.html)

pub mod launch;
pub mod registers;
pub mod tracer;
pub mod wait;

pub use tracer::LinuxTracer;

use crate::types::ProcessId;

/// Convert a `ProcessId` to the `pid_t` the syscalls expect.
#[allow(clippy::cast_possible_wrap)]
pub(crate) const fn raw_pid(pid: ProcessId) -> libc::pid_t
{
    pid.0 as libc::pid_t
}
