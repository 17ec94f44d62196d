//! Register access via `PTRACE_GETREGS`.

use std::io;
use std::mem::MaybeUninit;
use std::ptr;

use libc::{c_void, user_regs_struct};

use crate::types::{RegisterId, RegisterSnapshot, SegmentBase, SegmentRegister, X86_64Register};

/// Read the general-purpose register file of a stopped tracee.
///
/// ## Errors
///
/// Returns the OS error from `ptrace()`, typically `ESRCH` if the target is
/// gone or not in a ptrace stop.
pub fn read_registers(pid: libc::pid_t) -> io::Result<RegisterSnapshot>
{
    let mut regs = MaybeUninit::<user_regs_struct>::zeroed();
    let result = unsafe { libc::ptrace(libc::PTRACE_GETREGS, pid, ptr::null_mut::<c_void>(), regs.as_mut_ptr()) };
    if result == -1 {
        return Err(io::Error::last_os_error());
    }

    // The kernel filled the whole struct, and zeroed is already a valid value.
    let regs = unsafe { regs.assume_init() };
    Ok(snapshot_from_user_regs(&regs))
}

/// Copy every field of `user_regs_struct` into a snapshot.
#[must_use]
pub fn snapshot_from_user_regs(regs: &user_regs_struct) -> RegisterSnapshot
{
    use X86_64Register::{R10, R11, R12, R13, R14, R15, R8, R9, Rax, Rbx, Rcx, Rdi, Rdx, Rsi};

    RegisterSnapshot::new()
        .with(RegisterId::Pc, regs.rip)
        .with(RegisterId::Sp, regs.rsp)
        .with(RegisterId::Fp, regs.rbp)
        .with(RegisterId::X86_64(Rax), regs.rax)
        .with(RegisterId::X86_64(Rbx), regs.rbx)
        .with(RegisterId::X86_64(Rcx), regs.rcx)
        .with(RegisterId::X86_64(Rdx), regs.rdx)
        .with(RegisterId::X86_64(Rsi), regs.rsi)
        .with(RegisterId::X86_64(Rdi), regs.rdi)
        .with(RegisterId::X86_64(R8), regs.r8)
        .with(RegisterId::X86_64(R9), regs.r9)
        .with(RegisterId::X86_64(R10), regs.r10)
        .with(RegisterId::X86_64(R11), regs.r11)
        .with(RegisterId::X86_64(R12), regs.r12)
        .with(RegisterId::X86_64(R13), regs.r13)
        .with(RegisterId::X86_64(R14), regs.r14)
        .with(RegisterId::X86_64(R15), regs.r15)
        .with(RegisterId::Flags, regs.eflags)
        .with(RegisterId::Segment(SegmentRegister::Cs), regs.cs)
        .with(RegisterId::Segment(SegmentRegister::Ds), regs.ds)
        .with(RegisterId::Segment(SegmentRegister::Es), regs.es)
        .with(RegisterId::Segment(SegmentRegister::Fs), regs.fs)
        .with(RegisterId::Segment(SegmentRegister::Gs), regs.gs)
        .with(RegisterId::Segment(SegmentRegister::Ss), regs.ss)
        .with(RegisterId::SegmentBase(SegmentBase::Fs), regs.fs_base)
        .with(RegisterId::SegmentBase(SegmentBase::Gs), regs.gs_base)
        .with(RegisterId::SyscallOrigin, regs.orig_rax)
}
