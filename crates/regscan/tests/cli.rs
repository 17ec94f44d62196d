//! End-to-end tests for the `regscan` binary

use std::process::{Command, Output};

fn regscan(args: &[&str]) -> Output
{
    Command::new(env!("CARGO_BIN_EXE_regscan"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run regscan")
}

fn stdout(output: &Output) -> String
{
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String
{
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_no_arguments_exits_with_1()
{
    let output = regscan(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_help_exits_with_0()
{
    let output = regscan(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn test_version_exits_with_0()
{
    let output = regscan(&["--version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("regscan"));
}

#[test]
fn test_odd_secret_arguments_exit_with_1()
{
    let output = regscan(&["/bin/true", "flag"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("flag"));
    assert!(!stdout(&output).contains("Program started"));
}

#[test]
fn test_duplicate_secret_names_exit_with_1()
{
    let output = regscan(&["/bin/true", "flag", "a", "flag", "b"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_program_never_starts_tracing()
{
    let output = regscan(&["/definitely/not/a/real/program", "flag", "A"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error"));
    assert!(!stdout(&output).contains("Program started"));
}

#[test]
fn test_failure_is_reported_once()
{
    let output = regscan(&["/definitely/not/a/real/program"]);
    let err = stderr(&output);
    let lines: Vec<&str> = err.lines().filter(|line| !line.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1, "stderr: {err}");
    assert!(lines[0].starts_with("Error: "));
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
fn test_traces_true_to_completion()
{
    let output = regscan(&["--no-color", "/bin/true", "flag", "A"]);
    let err = stderr(&output);
    if err.contains("Failed to set up tracing") {
        eprintln!("skipping: ptrace unavailable here");
        return;
    }

    assert_eq!(output.status.code(), Some(0), "stderr: {err}");
    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("Program started and ready for tracing (PID "));
    assert_eq!(lines.last(), Some(&"Program finished executing (exit code 0)"));
}

/// `leaky_target`, which `cargo test` builds next to the test binaries.
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn leaky_target() -> Option<std::path::PathBuf>
{
    let deps = std::env::current_exe().ok()?.parent()?.to_path_buf();
    let path = deps.parent()?.join("examples").join("leaky_target");
    path.is_file().then_some(path)
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn assert_leak_reported(extra: &[&str])
{
    let Some(target) = leaky_target() else {
        eprintln!("skipping: leaky_target example not built");
        return;
    };
    let target = target.to_string_lossy().into_owned();

    let mut args = vec!["--no-color"];
    args.extend_from_slice(extra);
    args.extend([target.as_str(), "flag", "A"]);
    let output = regscan(&args);
    let err = stderr(&output);
    if err.contains("Failed to set up tracing") {
        eprintln!("skipping: ptrace unavailable here");
        return;
    }

    assert_eq!(output.status.code(), Some(0), "stderr: {err}");
    assert!(err.contains("P/L-alert: Secret found in `flag`! (register "), "stderr: {err}");
    // Only the name is printed, never the value.
    assert!(!err.contains("`A`"));
    assert_eq!(
        stdout(&output).lines().last(),
        Some("Program finished executing (exit code 0)")
    );
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
fn test_leaky_target_raises_alert()
{
    assert_leak_reported(&[]);
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[test]
fn test_leaky_target_raises_alert_in_exact_mode()
{
    assert_leak_reported(&["--exact"]);
}
