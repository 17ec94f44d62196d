//! # Step Tracer
//!
//! Drives one target to completion, one instruction at a time, scanning its
//! registers before every step.
//!
//! ## Loop
//!
//! ```text
//! launch ──► read registers ──► scan ──► step one ──┬─► Stopped ──► (read registers)
//!                                                   └─► Exited  ──► done
//! ```
//!
//! The snapshot is dropped before the target is resumed, and the loop ends
//! as soon as an exit is observed, so registers are never read after the
//! target is gone.
//!
//! ## Failure
//!
//! A failed register read or step ends the session, not the program: the
//! target is released (killed and reaped), the error is logged and returned
//! to the caller.

use std::path::Path;

use tracing::{debug, error, info, info_span, warn};

use crate::error::Result;
use crate::events::{EventSink, TraceEvent};
use crate::scanner::SecretScanner;
use crate::tracer::PlatformTracer;
use crate::types::{ExitStatus, ProcessId, ProcessState, StepOutcome, StopReason, TracedProcess};

/// What a finished session observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary
{
    /// Target process ID
    pub pid: ProcessId,
    /// Number of register scans performed (one per observed stop)
    pub steps: u64,
    /// Number of secret alerts raised
    pub alerts: u64,
    /// How the target terminated
    pub exit: ExitStatus,
}

/// One tracing session over one target process
///
/// Owns the tracer, the traced process and the scanner for the whole
/// session. Dropping a session whose target is still alive kills and reaps
/// the target.
///
/// ## Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use regscan_core::scanner::{MatchMode, SecretScanner};
/// use regscan_core::stepper::StepTracer;
/// use regscan_core::tracer::create_tracer;
/// use regscan_core::types::SecretSet;
///
/// let secrets = SecretSet::from_pairs([("password", "hunter2")])?;
/// let scanner = SecretScanner::new(secrets, MatchMode::default());
///
/// let mut session = StepTracer::launch(create_tracer()?, Path::new("./target-app"), scanner)?;
/// let mut events = Vec::new();
/// let summary = session.run(&mut events)?;
/// println!("{} steps, {} alerts, {}", summary.steps, summary.alerts, summary.exit);
/// # Ok::<(), regscan_core::error::RegscanError>(())
/// ```
pub struct StepTracer<T: PlatformTracer>
{
    tracer: T,
    process: TracedProcess,
    scanner: SecretScanner,
    steps: u64,
    alerts: u64,
}

impl<T: PlatformTracer> StepTracer<T>
{
    /// Launch `program` suspended at its first instruction
    ///
    /// ## Errors
    ///
    /// Any startup error from
    /// [`PlatformTracer::launch_and_stop`](crate::tracer::PlatformTracer::launch_and_stop).
    /// No session exists in that case and nothing needs releasing.
    pub fn launch(mut tracer: T, program: &Path, scanner: SecretScanner) -> Result<Self>
    {
        let process = tracer.launch_and_stop(program)?;
        info!(
            "Tracing process {} with {} secret(s), {} matching",
            process.pid(),
            scanner.secrets().len(),
            scanner.mode()
        );
        Ok(Self {
            tracer,
            process,
            scanner,
            steps: 0,
            alerts: 0,
        })
    }

    /// Process ID of the target.
    #[must_use]
    pub fn pid(&self) -> ProcessId
    {
        self.process.pid()
    }

    /// The traced process.
    #[must_use]
    pub fn process(&self) -> &TracedProcess
    {
        &self.process
    }

    /// The underlying platform tracer.
    #[must_use]
    pub fn tracer(&self) -> &T
    {
        &self.tracer
    }

    /// Step the target until it exits, sending every event to `sink`
    ///
    /// ## Errors
    ///
    /// - `ReadRegistersFailed` / `SingleStepFailed`: a tracing call failed;
    ///   the target has been released
    /// - `ProcessExited`: the session already ran to completion
    pub fn run<S: EventSink>(&mut self, mut sink: S) -> Result<SessionSummary>
    {
        let span = info_span!("session", pid = %self.process.pid());
        let _enter = span.enter();

        match self.step_until_exit(&mut sink) {
            Ok(exit) => {
                info!("Target exited with {} after {} steps", exit, self.steps);
                sink.emit(TraceEvent::TargetExited {
                    status: exit,
                    steps: self.steps,
                });
                Ok(SessionSummary {
                    pid: self.process.pid(),
                    steps: self.steps,
                    alerts: self.alerts,
                    exit,
                })
            }
            Err(err) => {
                error!("Tracing session ended after {} steps: {}", self.steps, err);
                self.abandon();
                Err(err)
            }
        }
    }

    fn step_until_exit<S: EventSink>(&mut self, sink: &mut S) -> Result<ExitStatus>
    {
        loop {
            self.scan_once(sink)?;

            match self.tracer.step_one(&mut self.process)? {
                StepOutcome::Stopped(StopReason::Step) => {}
                StepOutcome::Stopped(StopReason::Signal(signal)) => {
                    debug!("Signal {} pending after step {}", signal, self.steps);
                    sink.emit(TraceEvent::SignalReceived {
                        signal,
                        step: self.steps,
                    });
                }
                StepOutcome::Exited(exit) => return Ok(exit),
            }
        }
    }

    /// Read one snapshot, scan it, and raise an alert per match.
    fn scan_once<S: EventSink>(&mut self, sink: &mut S) -> Result<()>
    {
        let snapshot = self.tracer.read_registers(&self.process)?;
        self.steps += 1;

        for found in self.scanner.scan(&snapshot) {
            self.alerts += 1;
            info!(
                step = self.steps,
                register = %found.register,
                "Secret `{}` found in register",
                found.secret.name()
            );
            sink.emit(TraceEvent::SecretFound {
                secret: found.secret.name().to_string(),
                register: found.register,
                step: self.steps,
            });
        }
        Ok(())
    }

    /// Mark the target failed and make sure it does not outlive the session.
    fn abandon(&mut self)
    {
        if self.process.state().is_alive() {
            self.process.set_state(ProcessState::Failed);
        }
        if let Err(err) = self.tracer.release(&mut self.process) {
            warn!("Failed to release process {}: {}", self.process.pid(), err);
        }
    }
}

impl<T: PlatformTracer> Drop for StepTracer<T>
{
    fn drop(&mut self)
    {
        if self.process.state().is_alive() {
            debug!("Releasing process {} on drop", self.process.pid());
            if let Err(err) = self.tracer.release(&mut self.process) {
                warn!("Failed to release process {}: {}", self.process.pid(), err);
            }
        }
    }
}
