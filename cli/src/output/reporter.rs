//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Application services emit progress through the port; this adapter turns
//! it into the `→ / ✓ / ⚠` lines of `OutputContext`.

use crate::application::ports::ProgressReporter;
use crate::domain::DeployPhase;
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(message);
    }

    // Transitions are traced by the coordinator; only an abort is shown.
    fn phase(&self, phase: DeployPhase) {
        if phase == DeployPhase::Aborted {
            self.ctx.error("Deployment aborted");
        }
    }
}
