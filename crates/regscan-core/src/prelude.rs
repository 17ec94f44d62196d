//! Common imports for code driving a tracing session.

pub use crate::error::{RegscanError, Result};
pub use crate::events::{EventSink, TraceEvent};
pub use crate::scanner::{MatchMode, SecretScanner};
pub use crate::stepper::{SessionSummary, StepTracer};
pub use crate::tracer::{create_tracer, PlatformTracer};
pub use crate::types::{ExitStatus, ProcessId, RegisterId, RegisterSnapshot, SecretSet, StepOutcome, StopReason};
