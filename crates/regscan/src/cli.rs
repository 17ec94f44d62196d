//! Command-line surface: argument definitions and secret pair parsing.

use std::mem;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use regscan_core::scanner::MatchMode;
use regscan_core::types::SecretSet;
use regscan_core::{RegscanError, Result};
use regscan_utils::LogLevel;
use zeroize::Zeroizing;

/// Single-steps a program and alerts when secrets appear in its CPU registers.
#[derive(Parser, Debug)]
#[command(name = "regscan")]
#[command(version)]
#[command(
    about = "Single-steps a program under ptrace and alerts when secrets show up in CPU registers",
    long_about = None,
    after_help = "Secrets are given as NAME VALUE pairs after the program, e.g.\n  \
                  regscan ./server api_key hunter2 token s3cr3t\n\
                  Use `--` before the program if a value starts with '-'."
)]
pub struct Cli
{
    /// Path to the executable to trace (run with no arguments)
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Secret name/value pairs to look for
    #[arg(value_name = "NAME VALUE")]
    pub secrets: Vec<String>,

    /// Compare secret bit i with register bit i instead of bit i + 1
    #[arg(long, default_value_t = false)]
    pub exact: bool,

    /// Never colour alert lines
    #[arg(long, default_value_t = false)]
    pub no_color: bool,

    /// Log level for diagnostics on stderr (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl Cli
{
    /// Bit alignment selected on the command line.
    #[must_use]
    pub fn match_mode(&self) -> MatchMode
    {
        if self.exact {
            MatchMode::Exact
        } else {
            MatchMode::Shifted
        }
    }

    /// Move the secret arguments out, parse them, and wipe the plaintext.
    ///
    /// `secrets` is empty afterwards, whether or not parsing succeeded.
    ///
    /// ## Errors
    ///
    /// See [`parse_secret_pairs`].
    pub fn take_secrets(&mut self) -> Result<SecretSet>
    {
        let raw = Zeroizing::new(mem::take(&mut self.secrets));
        parse_secret_pairs(&raw)
    }
}

/// Exit status for a clap parse outcome: help and version are not failures.
#[must_use]
pub fn parse_exit_code(kind: ErrorKind) -> i32
{
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Pair up `NAME VALUE NAME VALUE ...` into a secret set
///
/// ## Errors
///
/// - `InvalidArgument`: an odd number of arguments, or a repeated name
pub fn parse_secret_pairs(args: &[String]) -> Result<SecretSet>
{
    if args.len() % 2 != 0 {
        let dangling = args.last().map_or("", String::as_str);
        return Err(RegscanError::InvalidArgument(format!(
            "secret `{dangling}` has no value (secrets are NAME VALUE pairs)"
        )));
    }

    SecretSet::from_pairs(args.chunks_exact(2).map(|pair| (pair[0].as_str(), pair[1].as_str())))
}
