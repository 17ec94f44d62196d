//! Tests for the stepping loop, driven by a scripted fake tracer
//!
//! The fake replays a fixed sequence of register snapshots and step outcomes
//! and records every call, so the loop's ordering can be checked without a
//! real process.

use std::collections::VecDeque;
use std::path::Path;

use regscan_core::error::{RegscanError, Result};
use regscan_core::events::{event_channel, TraceEvent};
use regscan_core::scanner::{MatchMode, SecretScanner};
use regscan_core::stepper::StepTracer;
use regscan_core::tracer::PlatformTracer;
use regscan_core::types::{
    ExitStatus, ProcessId, ProcessState, RegisterId, RegisterSnapshot, SecretSet, StepOutcome, StopReason,
    TracedProcess,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call
{
    Launch,
    Read,
    Step(Option<i32>),
    Release,
}

/// One scripted iteration: what the read returns, then what the step returns.
type Script = (Result<RegisterSnapshot>, Result<StepOutcome>);

#[derive(Default)]
struct ScriptedTracer
{
    script: VecDeque<Script>,
    pending_step: Option<Result<StepOutcome>>,
    calls: Vec<Call>,
    fail_launch: bool,
}

impl ScriptedTracer
{
    fn new(script: Vec<Script>) -> Self
    {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }
}

// read_registers takes &self, so the call log lives behind a RefCell in a wrapper.
struct Fake(std::cell::RefCell<ScriptedTracer>);

impl Fake
{
    fn new(script: Vec<Script>) -> Self
    {
        Self(std::cell::RefCell::new(ScriptedTracer::new(script)))
    }

    fn calls(&self) -> Vec<Call>
    {
        self.0.borrow().calls.clone()
    }
}

impl PlatformTracer for Fake
{
    fn launch_and_stop(&mut self, _program: &Path) -> Result<TracedProcess>
    {
        let inner = self.0.get_mut();
        inner.calls.push(Call::Launch);
        if inner.fail_launch {
            return Err(RegscanError::ExecLoadFailed {
                program: "missing".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        let mut process = TracedProcess::new(ProcessId(4242));
        process.set_state(ProcessState::Stopped);
        Ok(process)
    }

    fn read_registers(&self, process: &TracedProcess) -> Result<RegisterSnapshot>
    {
        let mut inner = self.0.borrow_mut();
        inner.calls.push(Call::Read);
        process.ensure_stopped()?;
        let (read, step) = inner.script.pop_front().expect("script ran out of reads");
        inner.pending_step = Some(step);
        read
    }

    fn step_one(&mut self, process: &mut TracedProcess) -> Result<StepOutcome>
    {
        let inner = self.0.get_mut();
        inner.calls.push(Call::Step(process.take_pending_signal()));
        process.ensure_stopped()?;
        let outcome = inner.pending_step.take().expect("step without a preceding read");
        match &outcome {
            Ok(StepOutcome::Exited(status)) => process.set_state(ProcessState::Exited(*status)),
            Ok(StepOutcome::Stopped(StopReason::Signal(signal))) => process.set_pending_signal(*signal),
            Ok(StepOutcome::Stopped(StopReason::Step)) => {}
            Err(_) => process.set_state(ProcessState::Failed),
        }
        outcome
    }

    fn release(&mut self, process: &mut TracedProcess) -> Result<()>
    {
        let inner = self.0.get_mut();
        inner.calls.push(Call::Release);
        if process.state().is_alive() {
            process.set_state(ProcessState::Exited(ExitStatus::Signaled(9)));
        }
        Ok(())
    }
}

fn scanner(pairs: &[(&str, &str)]) -> SecretScanner
{
    SecretScanner::new(SecretSet::from_pairs(pairs.iter().copied()).unwrap(), MatchMode::Shifted)
}

fn step() -> Result<StepOutcome>
{
    Ok(StepOutcome::Stopped(StopReason::Step))
}

fn exit(code: i32) -> Result<StepOutcome>
{
    Ok(StepOutcome::Exited(ExitStatus::Code(code)))
}

fn regs() -> Result<RegisterSnapshot>
{
    Ok(RegisterSnapshot::new())
}

#[test]
fn test_immediate_exit_scans_exactly_once()
{
    let fake = Fake::new(vec![(regs(), exit(0))]);
    let mut session = StepTracer::launch(fake, Path::new("/bin/true"), scanner(&[])).unwrap();

    let mut events = Vec::new();
    let summary = session.run(&mut events).unwrap();

    assert_eq!(summary.steps, 1);
    assert_eq!(summary.alerts, 0);
    assert_eq!(summary.exit, ExitStatus::Code(0));
    assert_eq!(summary.pid, ProcessId(4242));
    assert_eq!(session.tracer().calls(), [Call::Launch, Call::Read, Call::Step(None)]);
    assert_eq!(
        events,
        [TraceEvent::TargetExited {
            status: ExitStatus::Code(0),
            steps: 1
        }]
    );
}

#[test]
fn test_no_register_read_after_exit()
{
    let fake = Fake::new(vec![(regs(), step()), (regs(), step()), (regs(), exit(3))]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[])).unwrap();

    let summary = session.run(Vec::new()).unwrap();
    assert_eq!(summary.steps, 3);
    assert_eq!(summary.exit, ExitStatus::Code(3));

    let calls = session.tracer().calls();
    assert_eq!(calls.last(), Some(&Call::Step(None)));
    assert_eq!(calls.iter().filter(|c| **c == Call::Read).count(), 3);
}

#[test]
fn test_alert_raised_at_first_matching_step()
{
    let leaked = RegisterSnapshot::new().with(RegisterId::Pc, 0x104);
    let fake = Fake::new(vec![(regs(), step()), (Ok(leaked), step()), (regs(), exit(0))]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[("flag", "A")])).unwrap();

    let mut events = Vec::new();
    let summary = session.run(&mut events).unwrap();

    assert_eq!(summary.alerts, 1);
    assert_eq!(
        events[0],
        TraceEvent::SecretFound {
            secret: "flag".to_string(),
            register: RegisterId::Pc,
            step: 2,
        }
    );
    assert!(matches!(events[1], TraceEvent::TargetExited { steps: 3, .. }));
}

#[test]
fn test_signal_is_reported_and_reinjected()
{
    let fake = Fake::new(vec![
        (regs(), Ok(StepOutcome::Stopped(StopReason::Signal(10)))),
        (regs(), exit(0)),
    ]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[])).unwrap();

    let mut events = Vec::new();
    session.run(&mut events).unwrap();

    assert_eq!(events[0], TraceEvent::SignalReceived { signal: 10, step: 1 });
    assert_eq!(
        session.tracer().calls(),
        [Call::Launch, Call::Read, Call::Step(None), Call::Read, Call::Step(Some(10))]
    );
}

#[test]
fn test_read_failure_ends_session_and_releases_target()
{
    let failure = Err(RegscanError::ReadRegistersFailed {
        pid: ProcessId(4242),
        details: "No such process".to_string(),
    });
    let fake = Fake::new(vec![(regs(), step()), (failure, step())]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[])).unwrap();

    let mut events = Vec::new();
    let result = session.run(&mut events);

    assert!(matches!(result, Err(RegscanError::ReadRegistersFailed { .. })));
    assert!(events.is_empty());
    assert_eq!(session.tracer().calls().last(), Some(&Call::Release));
    assert!(!session.process().state().is_alive());
}

#[test]
fn test_step_failure_ends_session_and_releases_target()
{
    let failure = Err(RegscanError::SingleStepFailed {
        pid: ProcessId(4242),
        details: "PTRACE_SINGLESTEP: No such process".to_string(),
    });
    let fake = Fake::new(vec![(regs(), failure)]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[])).unwrap();

    assert!(matches!(session.run(Vec::new()), Err(RegscanError::SingleStepFailed { .. })));
    assert_eq!(
        session.tracer().calls(),
        [Call::Launch, Call::Read, Call::Step(None), Call::Release]
    );
}

#[test]
fn test_run_after_exit_fails_without_stepping()
{
    let fake = Fake::new(vec![(regs(), exit(0))]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[])).unwrap();
    session.run(Vec::new()).unwrap();

    assert!(matches!(session.run(Vec::new()), Err(RegscanError::ProcessExited(_))));
    assert_eq!(session.tracer().calls().iter().filter(|c| matches!(c, Call::Step(_))).count(), 1);
}

#[test]
fn test_launch_failure_yields_no_session()
{
    let mut fake = Fake::new(Vec::new());
    fake.0.get_mut().fail_launch = true;

    let result = StepTracer::launch(fake, Path::new("missing"), scanner(&[]));
    assert!(matches!(result, Err(RegscanError::ExecLoadFailed { .. })));
}

#[test]
fn test_events_can_be_sent_over_a_channel()
{
    let leaked = RegisterSnapshot::new().with(RegisterId::Sp, 0x104);
    let fake = Fake::new(vec![(Ok(leaked), exit(0))]);
    let mut session = StepTracer::launch(fake, Path::new("target"), scanner(&[("flag", "A")])).unwrap();

    let (sender, receiver) = event_channel();
    session.run(sender).unwrap();

    let events: Vec<TraceEvent> = receiver.iter().collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].describe(), "Secret found in `flag`! (register rsp)");
}
