//! Build script for regscan-core
//!
//! This script checks system requirements before compilation:
//! - Minimum Rust version (1.80.0+, for `size_of` in the prelude)
//! - Target support (only Linux x86-64 has a tracing backend)
//!
//! ## Requirements
//!
//! - **Rust**: 1.80.0 or newer
//! - **Linux**: x86-64 with `ptrace(2)` available to unprivileged processes
//!   for their own children (the default outside Yama `ptrace_scope = 3`)
//! - **Other targets**: the crate builds, but `create_tracer()` returns
//!   `UnsupportedPlatform`

fn main()
{
    println!("cargo:rerun-if-changed=build.rs");

    if let Ok(rustc_version) = rustc_version::version() {
        let min_rust_version = rustc_version::Version::new(1, 80, 0);

        assert!(
            rustc_version >= min_rust_version,
            "regscan-core requires Rust {min_rust_version} or newer, found {rustc_version}"
        );
    } else {
        // Some build environments hide rustc; don't fail for that
        println!("cargo:warning=could not verify Rust version");
    }

    check_target_support();
}

/// Warn when building for a target with no tracing backend.
///
/// Uses the `CARGO_CFG_*` variables rather than `#[cfg]`, which would
/// describe the host running this script instead of the target.
fn check_target_support()
{
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();

    if os != "linux" || arch != "x86_64" {
        println!("cargo:warning=regscan-core has no tracing backend for {os}-{arch}; tracing will be unavailable");
    }
}
