//! Tracing session event types and helpers.
//!
//! Higher layers (the CLI today, anything embedding the library tomorrow)
//! consume these events to react to what the stepper observes without
//! reaching into the session. The stepper publishes an event for every alert,
//! every signal the target receives, and the final exit.

use std::sync::mpsc;

use crate::types::{ExitStatus, RegisterId};

/// Event emitted by a tracing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent
{
    /// A secret's bit pattern was found in a register.
    SecretFound
    {
        /// Name of the secret (never its value).
        secret: String,
        /// Register holding the pattern.
        register: RegisterId,
        /// Scan number (1-based) at which it was seen.
        step: u64,
    },
    /// The target stopped because a signal is about to be delivered to it.
    SignalReceived
    {
        /// Signal number.
        signal: i32,
        /// Scan number (1-based) preceding the stop.
        step: u64,
    },
    /// The target terminated.
    TargetExited
    {
        /// How it terminated.
        status: ExitStatus,
        /// Total number of scans performed.
        steps: u64,
    },
}

impl TraceEvent
{
    /// Human-readable description of the event.
    #[must_use]
    pub fn describe(&self) -> String
    {
        match self {
            Self::SecretFound { secret, register, .. } => {
                format!("Secret found in `{secret}`! (register {register})")
            }
            Self::SignalReceived { signal, step } => {
                format!("Target received signal {signal} after step {step}")
            }
            Self::TargetExited { status, steps } => {
                format!("Target exited with {status} after {steps} steps")
            }
        }
    }
}

/// Destination for session events.
pub trait EventSink
{
    /// Handle one event.
    fn emit(&mut self, event: TraceEvent);
}

impl EventSink for Vec<TraceEvent>
{
    fn emit(&mut self, event: TraceEvent)
    {
        self.push(event);
    }
}

impl EventSink for TraceEventSender
{
    fn emit(&mut self, event: TraceEvent)
    {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.send(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S
{
    fn emit(&mut self, event: TraceEvent)
    {
        (**self).emit(event);
    }
}

/// Sender side of the trace event channel.
pub type TraceEventSender = mpsc::Sender<TraceEvent>;
/// Receiver side of the trace event channel.
pub type TraceEventReceiver = mpsc::Receiver<TraceEvent>;

/// Create a new trace event channel.
#[must_use]
pub fn event_channel() -> (TraceEventSender, TraceEventReceiver)
{
    mpsc::channel()
}
