//! # Platform-Specific Implementations
//!
//! This module contains platform-specific tracing backends.
//!
//! Each platform has its own submodule that implements the `PlatformTracer`
//! trait using that platform's native process-control APIs:
//!
//! - **Linux (x86-64)**: Uses the `ptrace` system call
//!   - See: [ptrace(2) man page](https://man7.org/linux/man-pages/man2/ptrace.2.html)
//!
//! ## Why separate modules?
//!
//! - **Clean separation**: Platform-specific code is isolated
//! - **Conditional compilation**: Only compile code for the current platform
//! - **Easy to extend**: Adding a new platform is just adding a new module

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub mod linux;
