//! # Linux Process Launch
//!
//! Starts a target traced from its first instruction.
//!
//! ## Protocol
//!
//! 1. The parent creates a close-on-exec pipe and forks.
//! 2. The child requests `PTRACE_TRACEME` and calls `execv()`.
//! 3. On success the kernel closes the pipe during `execv()` and stops the
//!    child with `SIGTRAP`. On failure the child writes a 5-byte report (one
//!    stage byte, then `errno` as a native-endian `i32`) and calls `_exit(1)`.
//! 4. The parent reads the pipe until EOF, so it learns the outcome before
//!    it waits.
//! 5. After the first stop the parent sets `PTRACE_O_EXITKILL` and
//!    `PTRACE_O_TRACEEXEC`, so a later `execve()` in the target is reported
//!    as an event stop instead of a plain `SIGTRAP`.
//!
//! Everything the child needs is allocated before `fork()`: between `fork()`
//! and `execv()` the child only makes async-signal-safe calls.

use std::ffi::CString;
use std::fs::File;
use std::io::{self, Read};
use std::os::fd::FromRawFd;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use libc::{c_int, c_void};
use tracing::{debug, info, warn};

use super::raw_pid;
use super::wait::{self, WaitStatus};
use crate::error::{RegscanError, Result};
use crate::types::{ProcessId, ProcessState, TracedProcess};

/// The child failed before `execv()`, on `PTRACE_TRACEME`
const STAGE_TRACEME: u8 = 1;
/// `execv()` returned
const STAGE_EXEC: u8 = 2;
/// Stage byte plus a native-endian `errno`
const REPORT_LEN: usize = 1 + size_of::<i32>();

/// Fork and exec `program` under tracing, returning once it is stopped.
///
/// ## Errors
///
/// See [`PlatformTracer::launch_and_stop`](crate::tracer::PlatformTracer::launch_and_stop).
/// The child never outlives a failed launch: it is killed and reaped before
/// the error is returned.
pub fn spawn_traced(program: &Path) -> Result<TracedProcess>
{
    info!("Launching traced process: {}", program.display());

    let program_c = CString::new(program.as_os_str().as_bytes())
        .map_err(|e| RegscanError::InvalidArgument(format!("Invalid program path: {e}")))?;
    let argv: [*const libc::c_char; 2] = [program_c.as_ptr(), ptr::null()];

    let mut fds: [c_int; 2] = [0; 2];
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } == -1 {
        return Err(RegscanError::ProcessCreationFailed(io::Error::last_os_error()));
    }
    let [read_fd, write_fd] = fds;

    let child = unsafe { libc::fork() };
    if child == -1 {
        let err = io::Error::last_os_error();
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        return Err(RegscanError::ProcessCreationFailed(err));
    }

    if child == 0 {
        unsafe {
            libc::close(read_fd);
            if libc::ptrace(libc::PTRACE_TRACEME, 0, ptr::null_mut::<c_void>(), ptr::null_mut::<c_void>()) == -1 {
                report_child_failure(write_fd, STAGE_TRACEME);
            }
            libc::execv(program_c.as_ptr(), argv.as_ptr());
        }
        report_child_failure(write_fd, STAGE_EXEC);
    }

    unsafe {
        libc::close(write_fd);
    }
    #[allow(clippy::cast_sign_loss)]
    let pid = ProcessId(child as u32);
    debug!("Forked child {}", pid);

    let mut process = TracedProcess::new(pid);
    match await_first_stop(read_fd, program, pid) {
        Ok(()) => {
            process.set_state(ProcessState::Stopped);
            info!("Process {} stopped before its first instruction", pid);
            Ok(process)
        }
        Err(err) => {
            process.set_state(ProcessState::Failed);
            if let Err(reap_err) = wait::kill_and_reap(child) {
                warn!("Could not reap failed child {}: {}", pid, reap_err);
            }
            Err(err)
        }
    }
}

/// Read the child's report, wait for its first stop and set tracing options.
fn await_first_stop(read_fd: c_int, program: &Path, pid: ProcessId) -> Result<()>
{
    let mut report = Vec::with_capacity(REPORT_LEN);
    {
        let mut pipe = unsafe { File::from_raw_fd(read_fd) };
        pipe.read_to_end(&mut report)
            .map_err(|e| RegscanError::TracingSetupFailed(format!("Failed to read launch report: {e}")))?;
    }

    if let Some(err) = decode_report(&report, program) {
        return Err(err);
    }

    let raw = raw_pid(pid);
    let status = wait::wait_for(raw)
        .map_err(|e| RegscanError::TracingSetupFailed(format!("Failed to wait for process {pid}: {e}")))?;
    if status != WaitStatus::Stopped(libc::SIGTRAP) {
        return Err(RegscanError::UnexpectedStartStatus { pid, status: status.to_string() });
    }

    let options = libc::c_long::from(libc::PTRACE_O_EXITKILL | libc::PTRACE_O_TRACEEXEC);
    if unsafe { libc::ptrace(libc::PTRACE_SETOPTIONS, raw, ptr::null_mut::<c_void>(), options) } == -1 {
        let err = io::Error::last_os_error();
        return Err(RegscanError::TracingSetupFailed(format!("Failed to set tracing options: {err}")));
    }

    Ok(())
}

/// Turn a child's failure report into the matching launch error.
///
/// An empty report means `execv()` succeeded.
fn decode_report(report: &[u8], program: &Path) -> Option<RegscanError>
{
    if report.is_empty() {
        return None;
    }
    let Ok([stage, e0, e1, e2, e3]) = <[u8; REPORT_LEN]>::try_from(report) else {
        return Some(RegscanError::TracingSetupFailed(format!(
            "Malformed launch report ({} bytes)",
            report.len()
        )));
    };
    let source = io::Error::from_raw_os_error(i32::from_ne_bytes([e0, e1, e2, e3]));

    Some(match stage {
        STAGE_TRACEME => RegscanError::TracingSetupFailed(format!("PTRACE_TRACEME refused: {source}")),
        STAGE_EXEC => RegscanError::ExecLoadFailed {
            program: program.display().to_string(),
            source,
        },
        other => RegscanError::TracingSetupFailed(format!("Unknown launch stage {other}: {source}")),
    })
}

/// Report the current `errno` to the parent and terminate the child.
///
/// Only async-signal-safe calls are made here.
fn report_child_failure(fd: c_int, stage: u8) -> !
{
    let errno = io::Error::last_os_error().raw_os_error().unwrap_or(0);
    let mut report = [0u8; REPORT_LEN];
    report[0] = stage;
    report[1..].copy_from_slice(&errno.to_ne_bytes());
    unsafe {
        libc::write(fd, report.as_ptr().cast(), REPORT_LEN);
        libc::_exit(1)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn report(stage: u8, errno: i32) -> Vec<u8>
    {
        let mut bytes = vec![stage];
        bytes.extend_from_slice(&errno.to_ne_bytes());
        bytes
    }

    #[test]
    fn test_empty_report_means_exec_succeeded()
    {
        assert!(decode_report(&[], Path::new("/bin/true")).is_none());
    }

    #[test]
    fn test_exec_report_carries_errno()
    {
        let err = decode_report(&report(STAGE_EXEC, libc::ENOENT), Path::new("/nope")).unwrap();
        match err {
            RegscanError::ExecLoadFailed { program, source } => {
                assert_eq!(program, "/nope");
                assert_eq!(source.raw_os_error(), Some(libc::ENOENT));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_traceme_report_is_setup_failure()
    {
        let err = decode_report(&report(STAGE_TRACEME, libc::EPERM), Path::new("/bin/true")).unwrap();
        assert!(matches!(err, RegscanError::TracingSetupFailed(_)));
    }

    #[test]
    fn test_truncated_report_is_setup_failure()
    {
        let err = decode_report(&[STAGE_EXEC, 0], Path::new("/bin/true")).unwrap();
        assert!(matches!(err, RegscanError::TracingSetupFailed(_)));
    }

    #[test]
    fn test_interior_nul_is_rejected_before_fork()
    {
        use std::ffi::OsStr;

        let path = Path::new(OsStr::from_bytes(b"/bin/tr\0ue"));
        assert!(matches!(spawn_traced(path), Err(RegscanError::InvalidArgument(_))));
    }
}
