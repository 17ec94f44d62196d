//! # regscan
//!
//! Runs a program one instruction at a time and reports every CPU register
//! in which a known secret shows up.
//!
//! ```text
//! regscan [--exact] [--no-color] [--log-level LEVEL] <PROGRAM> [NAME VALUE]...
//! ```
//!
//! Status lines go to stdout; alerts and diagnostics go to stderr.
//! Exit status is 0 when the target ran to completion under tracing, and 1
//! for usage errors, startup failures and tracing failures.

mod cli;
mod report;

use std::io::{self, Write};
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use regscan_core::scanner::SecretScanner;
use regscan_core::stepper::StepTracer;
use regscan_core::tracer::create_tracer;
use regscan_utils::{info, init_logging, LoggingConfig, LoggingGuard};

use crate::cli::{parse_exit_code, Cli};
use crate::report::TerminalReporter;

fn main()
{
    // Everything with a destructor lives inside `run`, so the target is
    // reaped and logs are flushed before we exit.
    process::exit(run());
}

fn run() -> i32
{
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return parse_exit_code(e.kind());
        }
    };

    let _logging = setup_logging(&cli);

    let secrets = match cli.take_secrets() {
        Ok(secrets) => secrets,
        Err(e) => {
            let _ = Cli::command().error(ErrorKind::WrongNumberOfValues, e).print();
            return 1;
        }
    };
    let scanner = SecretScanner::new(secrets, cli.match_mode());

    let tracer = match create_tracer() {
        Ok(tracer) => tracer,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    info!("Tracing {}", cli.program.display());
    let mut session = match StepTracer::launch(tracer, &cli.program, scanner) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    println!("Program started and ready for tracing (PID {})", session.pid());
    // The target shares our stdout; keep our line ahead of its output.
    let _ = io::stdout().flush();

    match session.run(TerminalReporter::new(!cli.no_color)) {
        Ok(summary) => {
            println!("Program finished executing ({})", summary.exit);
            info!("{} steps, {} alert(s)", summary.steps, summary.alerts);
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

/// Install the subscriber; a broken logging setup is reported, not fatal.
fn setup_logging(cli: &Cli) -> Option<LoggingGuard>
{
    let config = LoggingConfig::from_env()
        .unwrap_or_else(|e| {
            eprintln!("Warning: {e}; using default logging");
            LoggingConfig::default()
        })
        .with_level(cli.log_level);

    match init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: {e}");
            None
        }
    }
}
