//! Terminal rendering of session events.

use std::io::{self, IsTerminal};

use crossterm::style::Stylize;
use regscan_core::events::{EventSink, TraceEvent};
use regscan_core::types::RegisterId;
use regscan_utils::debug;

/// Prints secret alerts to stderr, in red when stderr is a terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalReporter
{
    color: bool,
}

impl TerminalReporter
{
    /// Create a reporter; colour is used only if allowed and stderr is a TTY.
    ///
    /// The `NO_COLOR` convention is honoured as well.
    #[must_use]
    pub fn new(color_allowed: bool) -> Self
    {
        let color = color_allowed && std::env::var_os("NO_COLOR").is_none() && io::stderr().is_terminal();
        Self { color }
    }
}

/// The alert line for one match. Only the secret's name is shown.
#[must_use]
pub fn alert_line(secret: &str, register: RegisterId) -> String
{
    format!("P/L-alert: Secret found in `{secret}`! (register {register})")
}

/// The stderr line for `event`, if it gets one.
///
/// Only alerts are printed. Signals are logged at debug level; the exit is
/// already logged by the session and reported on stdout by the caller.
#[must_use]
pub fn render(event: &TraceEvent) -> Option<String>
{
    match event {
        TraceEvent::SecretFound { secret, register, .. } => Some(alert_line(secret, *register)),
        TraceEvent::SignalReceived { .. } => {
            debug!("{}", event.describe());
            None
        }
        TraceEvent::TargetExited { .. } => None,
    }
}

impl EventSink for TerminalReporter
{
    fn emit(&mut self, event: TraceEvent)
    {
        let Some(line) = render(&event) else {
            return;
        };
        if self.color {
            eprintln!("{}", line.red().bold());
        } else {
            eprintln!("{line}");
        }
    }
}
