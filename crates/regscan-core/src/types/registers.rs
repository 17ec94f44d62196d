//! CPU register identifiers and point-in-time register snapshots.

use std::fmt;

/// Identifier for a scanned CPU register field
///
/// This enum names every register field a [`RegisterSnapshot`] holds. It
/// includes the registers every architecture has (PC, SP, FP, flags) as well
/// as the x86-64 specific ones through the `X86_64`, `Segment` and
/// `SegmentBase` variants.
///
/// ## Common Registers
///
/// - `Pc`: Program Counter (RIP) - points to the next instruction
/// - `Sp`: Stack Pointer (RSP) - points to the top of the stack
/// - `Fp`: Frame Pointer (RBP) - points to the current stack frame
/// - `Flags`: Flags register (EFLAGS) - condition flags (carry, zero, etc.)
///
/// ## Linux-Specific
///
/// - `SyscallOrigin`: `orig_rax`, the syscall number the kernel saved on
///   entry. It is part of `user_regs_struct` and can carry attacker- or
///   program-controlled data just like any other field.
///
/// ## Example
///
/// ```rust
/// use regscan_core::types::{RegisterId, SegmentRegister, X86_64Register};
///
/// let pc = RegisterId::Pc;
/// let rax = RegisterId::X86_64(X86_64Register::Rax);
/// let cs = RegisterId::Segment(SegmentRegister::Cs);
/// assert_eq!(rax.name(), "rax");
/// assert_eq!(cs.bit_width(), 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterId
{
    /// Program Counter (RIP on x86-64)
    Pc,
    /// Stack Pointer (RSP on x86-64)
    Sp,
    /// Frame Pointer (RBP on x86-64)
    Fp,
    /// x86-64 general-purpose register
    X86_64(X86_64Register),
    /// Flags register (EFLAGS)
    Flags,
    /// Segment selector register
    Segment(SegmentRegister),
    /// Segment base address (FS/GS base, used for TLS)
    SegmentBase(SegmentBase),
    /// Syscall number saved by the kernel on syscall entry (`orig_rax`)
    SyscallOrigin,
}

/// x86-64 general-purpose register identifier
///
/// RSP, RBP and RIP are accessed via `RegisterId::Sp`, `RegisterId::Fp` and
/// `RegisterId::Pc` respectively, leaving the 14 registers below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum X86_64Register
{
    /// RAX - Accumulator register (often used for return values)
    Rax,
    /// RBX - Base register
    Rbx,
    /// RCX - Counter register (used in loops)
    Rcx,
    /// RDX - Data register
    Rdx,
    /// RSI - Source index register (function arguments)
    Rsi,
    /// RDI - Destination index register (function arguments)
    Rdi,
    /// R8 - General-purpose register (x86-64 extension)
    R8,
    /// R9 - General-purpose register (x86-64 extension)
    R9,
    /// R10 - General-purpose register (x86-64 extension)
    R10,
    /// R11 - General-purpose register (x86-64 extension)
    R11,
    /// R12 - General-purpose register (x86-64 extension)
    R12,
    /// R13 - General-purpose register (x86-64 extension)
    R13,
    /// R14 - General-purpose register (x86-64 extension)
    R14,
    /// R15 - General-purpose register (x86-64 extension)
    R15,
}

impl X86_64Register
{
    /// All general-purpose registers in snapshot order.
    pub const ALL: [X86_64Register; 14] = [
        X86_64Register::Rax,
        X86_64Register::Rbx,
        X86_64Register::Rcx,
        X86_64Register::Rdx,
        X86_64Register::Rsi,
        X86_64Register::Rdi,
        X86_64Register::R8,
        X86_64Register::R9,
        X86_64Register::R10,
        X86_64Register::R11,
        X86_64Register::R12,
        X86_64Register::R13,
        X86_64Register::R14,
        X86_64Register::R15,
    ];

    /// Index of this register among the general-purpose registers
    ///
    /// - RAX = 0, RBX = 1, RCX = 2, RDX = 3
    /// - RSI = 4, RDI = 5
    /// - R8 = 6 ... R15 = 13
    const fn index(self) -> usize
    {
        match self {
            X86_64Register::Rax => 0,
            X86_64Register::Rbx => 1,
            X86_64Register::Rcx => 2,
            X86_64Register::Rdx => 3,
            X86_64Register::Rsi => 4,
            X86_64Register::Rdi => 5,
            X86_64Register::R8 => 6,
            X86_64Register::R9 => 7,
            X86_64Register::R10 => 8,
            X86_64Register::R11 => 9,
            X86_64Register::R12 => 10,
            X86_64Register::R13 => 11,
            X86_64Register::R14 => 12,
            X86_64Register::R15 => 13,
        }
    }

    const fn name(self) -> &'static str
    {
        match self {
            X86_64Register::Rax => "rax",
            X86_64Register::Rbx => "rbx",
            X86_64Register::Rcx => "rcx",
            X86_64Register::Rdx => "rdx",
            X86_64Register::Rsi => "rsi",
            X86_64Register::Rdi => "rdi",
            X86_64Register::R8 => "r8",
            X86_64Register::R9 => "r9",
            X86_64Register::R10 => "r10",
            X86_64Register::R11 => "r11",
            X86_64Register::R12 => "r12",
            X86_64Register::R13 => "r13",
            X86_64Register::R14 => "r14",
            X86_64Register::R15 => "r15",
        }
    }
}

/// x86 segment selector registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRegister
{
    /// Code segment
    Cs,
    /// Data segment
    Ds,
    /// Extra segment
    Es,
    /// FS segment (thread-local storage on Linux x86-64)
    Fs,
    /// GS segment
    Gs,
    /// Stack segment
    Ss,
}

/// Segment registers whose base address is exposed separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentBase
{
    /// FS base address
    Fs,
    /// GS base address
    Gs,
}

impl RegisterId
{
    /// Number of register fields in a snapshot.
    pub const COUNT: usize = 27;

    /// Every scanned register, in the fixed order scans visit them.
    pub const ALL: [RegisterId; RegisterId::COUNT] = [
        RegisterId::Pc,
        RegisterId::Sp,
        RegisterId::Fp,
        RegisterId::X86_64(X86_64Register::Rax),
        RegisterId::X86_64(X86_64Register::Rbx),
        RegisterId::X86_64(X86_64Register::Rcx),
        RegisterId::X86_64(X86_64Register::Rdx),
        RegisterId::X86_64(X86_64Register::Rsi),
        RegisterId::X86_64(X86_64Register::Rdi),
        RegisterId::X86_64(X86_64Register::R8),
        RegisterId::X86_64(X86_64Register::R9),
        RegisterId::X86_64(X86_64Register::R10),
        RegisterId::X86_64(X86_64Register::R11),
        RegisterId::X86_64(X86_64Register::R12),
        RegisterId::X86_64(X86_64Register::R13),
        RegisterId::X86_64(X86_64Register::R14),
        RegisterId::X86_64(X86_64Register::R15),
        RegisterId::Flags,
        RegisterId::Segment(SegmentRegister::Cs),
        RegisterId::Segment(SegmentRegister::Ds),
        RegisterId::Segment(SegmentRegister::Es),
        RegisterId::Segment(SegmentRegister::Fs),
        RegisterId::Segment(SegmentRegister::Gs),
        RegisterId::Segment(SegmentRegister::Ss),
        RegisterId::SegmentBase(SegmentBase::Fs),
        RegisterId::SegmentBase(SegmentBase::Gs),
        RegisterId::SyscallOrigin,
    ];

    /// Position of this register in [`RegisterId::ALL`] and in snapshot storage.
    #[must_use]
    pub const fn index(self) -> usize
    {
        match self {
            RegisterId::Pc => 0,
            RegisterId::Sp => 1,
            RegisterId::Fp => 2,
            RegisterId::X86_64(reg) => 3 + reg.index(),
            RegisterId::Flags => 17,
            RegisterId::Segment(SegmentRegister::Cs) => 18,
            RegisterId::Segment(SegmentRegister::Ds) => 19,
            RegisterId::Segment(SegmentRegister::Es) => 20,
            RegisterId::Segment(SegmentRegister::Fs) => 21,
            RegisterId::Segment(SegmentRegister::Gs) => 22,
            RegisterId::Segment(SegmentRegister::Ss) => 23,
            RegisterId::SegmentBase(SegmentBase::Fs) => 24,
            RegisterId::SegmentBase(SegmentBase::Gs) => 25,
            RegisterId::SyscallOrigin => 26,
        }
    }

    /// Conventional lowercase name, as used in alerts.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            RegisterId::Pc => "rip",
            RegisterId::Sp => "rsp",
            RegisterId::Fp => "rbp",
            RegisterId::X86_64(reg) => reg.name(),
            RegisterId::Flags => "eflags",
            RegisterId::Segment(SegmentRegister::Cs) => "cs",
            RegisterId::Segment(SegmentRegister::Ds) => "ds",
            RegisterId::Segment(SegmentRegister::Es) => "es",
            RegisterId::Segment(SegmentRegister::Fs) => "fs",
            RegisterId::Segment(SegmentRegister::Gs) => "gs",
            RegisterId::Segment(SegmentRegister::Ss) => "ss",
            RegisterId::SegmentBase(SegmentBase::Fs) => "fs_base",
            RegisterId::SegmentBase(SegmentBase::Gs) => "gs_base",
            RegisterId::SyscallOrigin => "orig_rax",
        }
    }

    /// Architectural width of the register in bits
    ///
    /// The kernel hands every field out as a 64-bit word, but EFLAGS and the
    /// segment selectors are 32 bits wide (selectors are really 16 bits,
    /// zero-extended). A secret longer than this width can never match.
    #[must_use]
    pub const fn bit_width(self) -> u32
    {
        match self {
            RegisterId::Flags | RegisterId::Segment(_) => 32,
            _ => 64,
        }
    }
}

impl fmt::Display for RegisterId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Point-in-time copy of the target's register file
///
/// A snapshot is only meaningful for the stop that produced it. The stepper
/// drops it before resuming the target, so stale register values are never
/// scanned.
///
/// ## Example
///
/// ```rust
/// use regscan_core::types::{RegisterId, RegisterSnapshot, X86_64Register};
///
/// let regs = RegisterSnapshot::new()
///     .with(RegisterId::Pc, 0x401000)
///     .with(RegisterId::X86_64(X86_64Register::Rax), 42);
///
/// assert_eq!(regs.get(RegisterId::Pc), 0x401000);
/// assert_eq!(regs.iter().count(), RegisterId::COUNT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot
{
    values: [u64; RegisterId::COUNT],
}

impl RegisterSnapshot
{
    /// Create a snapshot with every register set to zero.
    #[must_use]
    pub const fn new() -> Self
    {
        Self {
            values: [0; RegisterId::COUNT],
        }
    }

    /// Return a copy of this snapshot with one register replaced.
    #[must_use]
    pub fn with(mut self, id: RegisterId, value: u64) -> Self
    {
        self.values[id.index()] = value;
        self
    }

    /// Value of a register.
    #[must_use]
    pub const fn get(&self, id: RegisterId) -> u64
    {
        self.values[id.index()]
    }

    /// Iterate over `(register, value)` pairs in [`RegisterId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, u64)> + '_
    {
        RegisterId::ALL.iter().map(move |id| (*id, self.get(*id)))
    }
}

impl Default for RegisterSnapshot
{
    fn default() -> Self
    {
        Self::new()
    }
}
