//! Tests for platform-agnostic types

use regscan_core::error::RegscanError;
use regscan_core::types::{
    ExitStatus, ProcessId, ProcessState, RegisterId, RegisterSnapshot, SegmentRegister, Secret, SecretSet,
    TracedProcess, X86_64Register,
};

#[test]
fn test_process_id_from_u32()
{
    let pid = ProcessId::from(12345);
    assert_eq!(pid.0, 12345);
}

#[test]
fn test_process_id_to_u32()
{
    let pid = ProcessId::from(54321);
    let value: u32 = pid.into();
    assert_eq!(value, 54321);
}

#[test]
fn test_process_id_equality()
{
    let pid1 = ProcessId::from(12345);
    let pid2 = ProcessId::from(12345);
    let pid3 = ProcessId::from(54321);

    assert_eq!(pid1, pid2);
    assert_ne!(pid1, pid3);
}

#[test]
fn test_exit_status_display()
{
    assert_eq!(ExitStatus::Code(0).to_string(), "exit code 0");
    assert_eq!(ExitStatus::Signaled(9).to_string(), "killed by signal 9");
    assert!(ExitStatus::Code(0).success());
    assert!(!ExitStatus::Code(3).success());
    assert!(!ExitStatus::Signaled(9).success());
}

#[test]
fn test_traced_process_lifecycle()
{
    let mut process = TracedProcess::new(ProcessId(42));
    assert_eq!(process.state(), ProcessState::Starting);
    assert!(matches!(process.ensure_stopped(), Err(RegscanError::InvalidArgument(_))));

    process.set_state(ProcessState::Stopped);
    assert!(process.ensure_stopped().is_ok());

    process.set_state(ProcessState::Exited(ExitStatus::Code(0)));
    assert!(!process.state().is_alive());
    assert!(matches!(process.ensure_stopped(), Err(RegscanError::ProcessExited(ProcessId(42)))));
}

#[test]
fn test_failed_process_is_still_alive()
{
    // A failed target may still exist and must be reaped.
    assert!(ProcessState::Failed.is_alive());
    assert!(ProcessState::Stopped.is_alive());
}

#[test]
fn test_pending_signal_is_taken_once()
{
    let mut process = TracedProcess::new(ProcessId(1));
    assert_eq!(process.take_pending_signal(), None);

    process.set_pending_signal(17);
    assert_eq!(process.pending_signal(), Some(17));
    assert_eq!(process.take_pending_signal(), Some(17));
    assert_eq!(process.take_pending_signal(), None);
}

#[test]
fn test_register_snapshot_new()
{
    let regs = RegisterSnapshot::new();
    assert!(regs.iter().all(|(_, value)| value == 0));
    assert_eq!(regs, RegisterSnapshot::default());
}

#[test]
fn test_register_snapshot_covers_every_register()
{
    let regs = RegisterSnapshot::new();
    let ids: Vec<RegisterId> = regs.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, RegisterId::ALL);
    assert!(ids.len() >= 25);
}

#[test]
fn test_register_snapshot_with_replaces_one_value()
{
    let rax = RegisterId::X86_64(X86_64Register::Rax);
    let regs = RegisterSnapshot::new().with(rax, 7).with(RegisterId::Sp, 0x7ffc_0000);

    assert_eq!(regs.get(rax), 7);
    assert_eq!(regs.get(RegisterId::Sp), 0x7ffc_0000);
    assert_eq!(regs.get(RegisterId::Pc), 0);
}

#[test]
fn test_register_names_and_widths()
{
    assert_eq!(RegisterId::Pc.to_string(), "rip");
    assert_eq!(RegisterId::X86_64(X86_64Register::R13).to_string(), "r13");
    assert_eq!(RegisterId::Segment(SegmentRegister::Cs).to_string(), "cs");
    assert_eq!(RegisterId::SyscallOrigin.to_string(), "orig_rax");

    assert_eq!(RegisterId::Pc.bit_width(), 64);
    assert_eq!(RegisterId::Flags.bit_width(), 32);
    assert_eq!(RegisterId::Segment(SegmentRegister::Ss).bit_width(), 32);
}

#[test]
fn test_secret_from_text_is_msb_first()
{
    let secret = Secret::from_text("flag", "A");
    assert_eq!(secret.name(), "flag");
    assert_eq!(secret.bit_len(), 8);
    assert_eq!(secret.bits(), [false, true, false, false, false, false, false, true]);
}

#[test]
fn test_secret_debug_hides_value()
{
    let secret = Secret::from_text("api_key", "hunter2");
    let debug = format!("{secret:?}");
    assert!(debug.contains("api_key"));
    assert!(!debug.contains("hunter2"));
}

#[test]
fn test_secret_set_rejects_duplicate_names()
{
    let result = SecretSet::from_pairs([("token", "a"), ("token", "b")]);
    assert!(matches!(result, Err(RegscanError::InvalidArgument(_))));
}

#[test]
fn test_secret_set_keeps_insertion_order()
{
    let set = SecretSet::from_pairs([("b", "x"), ("a", "y")]).unwrap();
    let names: Vec<&str> = set.iter().map(Secret::name).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(set.len(), 2);
    assert!(!set.is_empty());
}
