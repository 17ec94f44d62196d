//! Tests for error handling

use std::io;

use regscan_core::error::{RegscanError, Result};
use regscan_core::types::ProcessId;

#[test]
fn test_invalid_argument_display()
{
    let error = RegscanError::InvalidArgument("test arg".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid argument"));
    assert!(message.contains("test arg"));
}

#[test]
fn test_exec_load_failed_names_program_and_cause()
{
    let error = RegscanError::ExecLoadFailed {
        program: "/no/such/file".to_string(),
        source: io::Error::from_raw_os_error(libc::ENOENT),
    };
    let message = error.to_string();
    assert!(message.contains("/no/such/file"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_unexpected_start_status_display()
{
    let error = RegscanError::UnexpectedStartStatus {
        pid: ProcessId(77),
        status: "exited (exit code 1)".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("77"));
    assert!(message.contains("exit code 1"));
}

#[test]
fn test_session_errors_name_the_process()
{
    let read = RegscanError::ReadRegistersFailed {
        pid: ProcessId(12345),
        details: "No such process".to_string(),
    };
    let step = RegscanError::SingleStepFailed {
        pid: ProcessId(12345),
        details: "waitpid: Interrupted".to_string(),
    };
    assert!(read.to_string().contains("12345"));
    assert!(step.to_string().contains("12345"));
    assert!(RegscanError::ProcessExited(ProcessId(9)).to_string().contains("already exited"));
}

#[test]
fn test_io_error_converts()
{
    fn fails() -> Result<()>
    {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))?;
        Ok(())
    }

    assert!(matches!(fails(), Err(RegscanError::Io(_))));
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: Result<()> = Ok(());
    let _error_result: Result<()> = Err(RegscanError::ProcessExited(ProcessId(12345)));
}
