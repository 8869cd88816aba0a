//! Suspension & timing subsystem.
//!
//! Three primitives, none of which touch `PlaybackState` directly:
//!
//! - [`TimerQueue`]: cancellable one-shot timers keyed by absolute deadline.
//! - [`ResumeSlot`]: a single-slot resolution cell. A suspension is taken out
//!   of the slot exactly once; whichever source takes it also cancels the
//!   competing timer, so a late timer finds nothing to resume.
//! - [`VolumeFade`]: a linear volume ramp sampled at the current time.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use stagehand_core::clock::offset_by;
use stagehand_core::error::EngineError;

use crate::domain::navigation::{ResumeSource, SuspendReason};
use crate::domain::patch::StatePatch;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Handle to one suspension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SuspensionId(u64);

/// What happens when a timer fires.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerAction {
    /// Resolve the suspension with this id, if it is still active.
    Resume(SuspensionId),
    /// Merge a patch without touching the pointer (detached effects).
    Apply(StatePatch),
    /// Start stepping at the current position.
    Advance,
}

/// Cancellable one-shot timers ordered by deadline, then by scheduling
/// order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    entries: BTreeMap<(DateTime<Utc>, TimerId), TimerAction>,
    deadlines: HashMap<TimerId, DateTime<Utc>>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `action` to fire at `deadline`.
    pub fn schedule(&mut self, deadline: DateTime<Utc>, action: TimerAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline, id), action);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancels a timer. Returns its action if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<TimerAction> {
        let deadline = self.deadlines.remove(&id)?;
        self.entries.remove(&(deadline, id))
    }

    /// The earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer that is due at `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(TimerId, TimerAction)> {
        let (deadline, id) = *self.entries.keys().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        self.entries.remove(&(deadline, id)).map(|action| (id, action))
    }

    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}

/// An active suspension.
#[derive(Debug, Clone, PartialEq)]
pub struct Suspension {
    pub id: SuspensionId,
    pub reason: SuspendReason,
    /// The timer racing the external signal, if any.
    pub timer: Option<TimerId>,
    /// Merged when the suspension resolves, before the pointer moves on.
    pub on_resume: StatePatch,
}

/// Single-slot resolution cell for the active suspension.
#[derive(Debug, Default)]
pub struct ResumeSlot {
    next_id: u64,
    active: Option<Suspension>,
}

impl ResumeSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the id for the next suspension, so its timer can be
    /// scheduled before the slot is filled.
    pub fn next_id(&mut self) -> SuspensionId {
        let id = SuspensionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Installs a suspension, returning any one it displaced.
    pub fn fill(&mut self, suspension: Suspension) -> Option<Suspension> {
        self.active.replace(suspension)
    }

    #[must_use]
    pub fn active(&self) -> Option<&Suspension> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn reason(&self) -> Option<SuspendReason> {
        self.active.as_ref().map(|s| s.reason)
    }

    /// Resolves the active suspension from an external source.
    ///
    /// With `skip_timers` set, input also cuts timer-only suspensions short.
    /// The competing timer is cancelled before the suspension is handed back.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotSuspended` when the slot is empty and
    /// `EngineError::UnexpectedResume` when the active suspension does not
    /// accept `source`. The slot is left untouched in both cases.
    pub fn resolve(
        &mut self,
        source: ResumeSource,
        timers: &mut TimerQueue,
        skip_timers: bool,
    ) -> Result<Suspension, EngineError> {
        let reason = self.reason().ok_or(EngineError::NotSuspended)?;
        let skippable =
            skip_timers && reason == SuspendReason::Timer && source == ResumeSource::Input;
        if !(reason.accepts(source) || skippable) {
            return Err(EngineError::UnexpectedResume {
                expected: reason.to_string(),
                received: source.to_string(),
            });
        }
        self.take(timers).ok_or(EngineError::NotSuspended)
    }

    /// Resolves the suspension a fired timer was racing for. A timer whose
    /// suspension was already resolved is stale and resolves nothing.
    pub fn resolve_timer(&mut self, id: SuspensionId) -> Option<Suspension> {
        if self.active.as_ref().is_some_and(|s| s.id == id) {
            self.active.take()
        } else {
            None
        }
    }

    /// Empties the slot, cancelling its timer.
    pub fn take(&mut self, timers: &mut TimerQueue) -> Option<Suspension> {
        let suspension = self.active.take()?;
        if let Some(timer) = suspension.timer {
            timers.cancel(timer);
        }
        Some(suspension)
    }
}

/// What to do with the media handle once a fade completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCompletion {
    None,
    Pause,
}

/// A linear volume ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeFade {
    pub from: f32,
    pub to: f32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub completion: FadeCompletion,
}

impl VolumeFade {
    /// Volume at `now`, clamped to the ramp's end points.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn volume_at(&self, now: DateTime<Utc>) -> f32 {
        if self.duration_ms == 0 {
            return self.to;
        }
        let elapsed = (now - self.started_at).num_milliseconds().max(0) as f64;
        let progress = (elapsed / self.duration_ms as f64).min(1.0) as f32;
        self.from + (self.to - self.from) * progress
    }

    /// The instant the ramp reaches its target.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        offset_by(self.started_at, self.duration_ms)
    }

    #[must_use]
    pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
        now >= self.ends_at()
    }
}
