//! What a handler hands back to the dispatcher.

use crate::domain::navigation::SuspendReason;
use crate::domain::patch::StatePatch;

/// Where a `Goto` moves the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Replace the active scene; playback restarts at its first command.
    Scene(String),
    /// Move within the current scene.
    Index(usize),
}

/// The handler's control decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Move to the next command and keep stepping.
    Advance,
    /// Move somewhere else.
    Goto(Target),
    /// Suspend until an external signal arrives.
    Halt(SuspendReason),
    /// Suspend until a timer fires, or input arrives if `interruptible`.
    Delay { delay_ms: u64, interruptible: bool },
}

/// A handler's result: a control decision plus the patches to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub flow: Flow,
    /// Merged as soon as the handler returns.
    pub updates: StatePatch,
    /// Merged when the suspension resolves, just before the pointer moves on.
    pub on_resume: StatePatch,
    /// Patches merged after a delay without blocking the pointer.
    pub detached: Vec<(u64, StatePatch)>,
}

impl HandlerOutcome {
    fn with_flow(flow: Flow, updates: StatePatch) -> Self {
        Self {
            flow,
            updates,
            on_resume: StatePatch::new(),
            detached: Vec::new(),
        }
    }

    /// Advance with nothing to change.
    #[must_use]
    pub fn advance() -> Self {
        Self::with_flow(Flow::Advance, StatePatch::new())
    }

    /// Merge `updates` and advance.
    #[must_use]
    pub fn apply(updates: StatePatch) -> Self {
        Self::with_flow(Flow::Advance, updates)
    }

    #[must_use]
    pub fn goto(target: Target) -> Self {
        Self::with_flow(Flow::Goto(target), StatePatch::new())
    }

    /// Merge `updates` and wait for `reason`.
    #[must_use]
    pub fn halt(reason: SuspendReason, updates: StatePatch) -> Self {
        Self::with_flow(Flow::Halt(reason), updates)
    }

    /// Merge `updates`, wait `delay_ms`, then merge `on_resume`.
    ///
    /// A zero delay commits both patches at once and advances.
    #[must_use]
    pub fn timed(delay_ms: u64, updates: StatePatch, on_resume: StatePatch) -> Self {
        if delay_ms == 0 {
            let mut updates = updates;
            updates.extend(on_resume);
            return Self::apply(updates);
        }
        Self {
            flow: Flow::Delay {
                delay_ms,
                interruptible: false,
            },
            updates,
            on_resume,
            detached: Vec::new(),
        }
    }

    /// Lets input resolve the delay before its timer.
    #[must_use]
    pub fn interruptible(mut self) -> Self {
        if let Flow::Delay { interruptible, .. } = &mut self.flow {
            *interruptible = true;
        }
        self
    }

    #[must_use]
    pub fn on_resume(mut self, patch: StatePatch) -> Self {
        self.on_resume = patch;
        self
    }

    /// Schedules `patch` `delay_ms` from now without holding the pointer.
    #[must_use]
    pub fn detach(mut self, delay_ms: u64, patch: StatePatch) -> Self {
        self.detached.push((delay_ms, patch));
        self
    }

    /// Whether the outcome suspends playback.
    #[must_use]
    pub fn suspends(&self) -> bool {
        matches!(self.flow, Flow::Halt(_) | Flow::Delay { .. })
    }
}
