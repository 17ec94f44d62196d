//! # Wait Status Decoding
//!
//! `waitpid()` packs the reason a child changed state into a single `int`.
//! This module unpacks it into a [`WaitStatus`] and wraps the blocking wait
//! itself, retrying when a signal interrupts the call.

use std::{fmt, io};

use libc::c_int;

use crate::types::ExitStatus;

/// Decoded result of `waitpid()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus
{
    /// The child terminated (normally or by a signal) and has been reaped
    Exited(ExitStatus),
    /// The child is in a ptrace stop caused by this signal
    Stopped(i32),
    /// The child is in a ptrace event stop (`PTRACE_EVENT_*`)
    Event(i32),
    /// Any status not covered above (e.g. `WIFCONTINUED`), kept raw
    Other(c_int),
}

impl fmt::Display for WaitStatus
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            WaitStatus::Exited(status) => write!(f, "exited ({status})"),
            WaitStatus::Stopped(signal) => write!(f, "stopped by signal {signal}"),
            WaitStatus::Event(event) => write!(f, "stopped at ptrace event {event}"),
            WaitStatus::Other(raw) => write!(f, "unrecognised wait status 0x{raw:x}"),
        }
    }
}

/// Decode a raw `waitpid()` status word.
///
/// ## Example
///
/// ```rust
/// use regscan_core::platform::linux::wait::{decode, WaitStatus};
/// use regscan_core::types::ExitStatus;
///
/// assert_eq!(decode(0x0300), WaitStatus::Exited(ExitStatus::Code(3)));
/// assert_eq!(decode(0x057f), WaitStatus::Stopped(libc::SIGTRAP));
/// assert_eq!(decode(0x0004_057f), WaitStatus::Event(libc::PTRACE_EVENT_EXEC));
/// ```
#[must_use]
pub fn decode(status: c_int) -> WaitStatus
{
    if libc::WIFEXITED(status) {
        WaitStatus::Exited(ExitStatus::Code(libc::WEXITSTATUS(status)))
    } else if libc::WIFSIGNALED(status) {
        WaitStatus::Exited(ExitStatus::Signaled(libc::WTERMSIG(status)))
    } else if libc::WIFSTOPPED(status) {
        match (status >> 16) & 0xff {
            0 => WaitStatus::Stopped(libc::WSTOPSIG(status)),
            event => WaitStatus::Event(event),
        }
    } else {
        WaitStatus::Other(status)
    }
}

/// Block until `pid` changes state, retrying on `EINTR`.
///
/// ## Errors
///
/// Returns the OS error from `waitpid()` (e.g. `ECHILD` once the child has
/// already been reaped).
pub fn wait_for(pid: libc::pid_t) -> io::Result<WaitStatus>
{
    let mut status: c_int = 0;
    loop {
        let result = unsafe { libc::waitpid(pid, &mut status, 0) };
        if result == pid {
            return Ok(decode(status));
        }

        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Send `SIGKILL` to `pid` and wait until it is gone.
///
/// Returns the final status, or `None` if the child had already been reaped
/// elsewhere. A target that vanished before the signal (`ESRCH`) is not an
/// error.
///
/// ## Errors
///
/// Returns the OS error if the kill or the wait fails for any other reason.
pub fn kill_and_reap(pid: libc::pid_t) -> io::Result<Option<ExitStatus>>
{
    if unsafe { libc::kill(pid, libc::SIGKILL) } == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            return Err(err);
        }
    }

    loop {
        match wait_for(pid) {
            Ok(WaitStatus::Exited(status)) => return Ok(Some(status)),
            Ok(_) => {}
            Err(err) if err.raw_os_error() == Some(libc::ECHILD) => return Ok(None),
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_decode_normal_exit()
    {
        assert_eq!(decode(0), WaitStatus::Exited(ExitStatus::Code(0)));
        assert_eq!(decode(1 << 8), WaitStatus::Exited(ExitStatus::Code(1)));
    }

    #[test]
    fn test_decode_killed_by_signal()
    {
        assert_eq!(decode(libc::SIGKILL), WaitStatus::Exited(ExitStatus::Signaled(libc::SIGKILL)));
        assert_eq!(decode(libc::SIGSEGV), WaitStatus::Exited(ExitStatus::Signaled(libc::SIGSEGV)));
    }

    #[test]
    fn test_decode_stops()
    {
        assert_eq!(decode((libc::SIGTRAP << 8) | 0x7f), WaitStatus::Stopped(libc::SIGTRAP));
        assert_eq!(decode((libc::SIGCHLD << 8) | 0x7f), WaitStatus::Stopped(libc::SIGCHLD));
    }

    #[test]
    fn test_decode_event_stops()
    {
        let exec = (libc::PTRACE_EVENT_EXEC << 16) | (libc::SIGTRAP << 8) | 0x7f;
        assert_eq!(decode(exec), WaitStatus::Event(libc::PTRACE_EVENT_EXEC));
        assert_eq!(decode(exec).to_string(), "stopped at ptrace event 4");
    }

    #[test]
    fn test_decode_continued_is_other()
    {
        assert_eq!(decode(0xffff), WaitStatus::Other(0xffff));
    }

    #[test]
    fn test_wait_for_unknown_child_fails()
    {
        // PID 1 is never our child.
        let err = wait_for(1).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ECHILD));
    }
}
