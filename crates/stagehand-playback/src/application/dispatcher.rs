//! The dispatcher: step loop, suspension bookkeeping and navigation.
//!
//! A `Dispatcher` owns one session's `PlaybackState` and is the only thing
//! that mutates it. Progress is cooperative: `advance()` steps until a
//! command suspends, the tape runs out, or a scene jump lands. Everything
//! time-based comes back in through `tick()`, which the host calls at (or
//! after) `next_deadline()`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use stagehand_core::clock::Clock;
use stagehand_core::error::{EngineError, ReferenceKind};
use stagehand_core::event::EventMetadata;
use stagehand_core::assets::AssetResolver;
use stagehand_core::media::{MediaPreloader, SoundEffectSink};
use stagehand_core::rng::DeterministicRng;
use stagehand_script::domain::command::{ButtonAction, ChoiceTarget, Command, CommandKind};
use stagehand_script::domain::conditions::ConditionEvaluator;
use stagehand_script::domain::project::Project;
use stagehand_script::domain::scene::{SceneIndex, StructureIssue};
use stagehand_script::domain::value::VariableValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::audio::MusicChannel;
use super::context::{HandlerContext, PlaybackResources, PlaybackSettings, SessionMode, classify};
use super::handlers;
use super::outcome::{Flow, HandlerOutcome, Target};
use super::timing::{ResumeSlot, Suspension, TimerAction, TimerQueue};
use crate::domain::events::{
    Diagnostic, DiagnosticKind, PlaybackEvent, PlaybackEventKind, SkipReason,
};
use crate::domain::navigation::{NavigationState, ResumeSource, SuspendReason};
use crate::domain::patch::{StateChange, StatePatch};
use crate::domain::state::{ChoiceRecord, PlaybackState};

/// Commands one run may execute without suspending before it is treated as
/// an authoring loop and halted.
pub const RUNAWAY_LIMIT: usize = 10_000;

/// Undrained events kept per session. Older ones are dropped first.
pub const EVENT_LOG_CAPACITY: usize = 4_096;

/// Whether the step loop may keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
    Continue,
    Stop,
}

/// Where a choice or button sends playback.
enum Destination<'a> {
    Next,
    Scene(&'a str),
    Label(&'a str),
}

/// Runs one playback session.
pub struct Dispatcher {
    session_id: Uuid,
    correlation_id: Uuid,
    project: Arc<Project>,
    state: PlaybackState,
    scene_index: SceneIndex,
    navigation: NavigationState,
    clock: Arc<dyn Clock>,
    rng: Box<dyn DeterministicRng>,
    assets: Arc<dyn AssetResolver>,
    preloader: Arc<dyn MediaPreloader>,
    sound_effects: Arc<dyn SoundEffectSink>,
    conditions: Arc<dyn ConditionEvaluator>,
    settings: PlaybackSettings,
    music: MusicChannel,
    timers: TimerQueue,
    suspension: ResumeSlot,
    mode: SessionMode,
    /// Commands executed since playback last waited on anything.
    unsuspended_steps: usize,
    events: Vec<PlaybackEvent>,
    sequence: i64,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("session_id", &self.session_id)
            .field("navigation", &self.navigation)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a session positioned on the first command of `start_scene`
    /// (or the project's start scene). Nothing runs until `advance()`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingReference` if the start scene does not
    /// exist.
    pub fn start(
        session_id: Uuid,
        project: Arc<Project>,
        resources: PlaybackResources,
        start_scene: Option<&str>,
    ) -> Result<Self, EngineError> {
        let scene_id = start_scene.unwrap_or(&project.start_scene_id);
        let scene = project
            .scene(scene_id)
            .ok_or_else(|| EngineError::missing(ReferenceKind::Scene, scene_id))?;
        let state = PlaybackState::new(scene, project.initial_variables());
        let scene_index = SceneIndex::build(&scene.commands);
        let navigation = NavigationState::Playing {
            scene_id: scene.id.clone(),
            index: 0,
        };

        let PlaybackResources {
            clock,
            rng,
            assets,
            preloader,
            sound_effects,
            conditions,
            music,
            settings,
        } = resources;

        let mut dispatcher = Self {
            session_id,
            correlation_id: session_id,
            project,
            state,
            scene_index,
            navigation,
            clock,
            rng,
            assets,
            preloader,
            sound_effects,
            conditions,
            settings,
            music: MusicChannel::new(music),
            timers: TimerQueue::new(),
            suspension: ResumeSlot::new(),
            mode: SessionMode::default(),
            unsuspended_steps: 0,
            events: Vec::new(),
            sequence: 0,
        };
        let scene_id = dispatcher.state.current_scene_id.clone();
        dispatcher.record(PlaybackEventKind::SessionStarted {
            scene_id: scene_id.clone(),
        });
        dispatcher.record(PlaybackEventKind::SceneEntered { scene_id });
        dispatcher.report_structure_issues();
        Ok(dispatcher)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    #[must_use]
    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    /// What playback is waiting for, if anything.
    #[must_use]
    pub fn suspend_reason(&self) -> Option<SuspendReason> {
        self.suspension.reason()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[PlaybackEvent] {
        &self.events
    }

    /// Takes every event recorded since the last drain. Hosts must drain
    /// regularly: past `EVENT_LOG_CAPACITY` the oldest events are dropped.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }

    /// Tags events recorded from now on with `correlation_id`.
    pub fn set_correlation_id(&mut self, correlation_id: Uuid) {
        self.correlation_id = correlation_id;
    }

    pub fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }

    // ------------------------------------------------------------------
    // Step loop
    // ------------------------------------------------------------------

    /// Steps until playback suspends, the tape runs out, or a scene jump
    /// lands. Iterative: long runs of auto-advancing commands never grow
    /// the call stack.
    pub fn advance(&mut self) {
        if !self.navigation.is_playing() {
            return;
        }
        loop {
            if self.state.is_at_end() {
                self.finish();
                return;
            }
            if self.unsuspended_steps >= RUNAWAY_LIMIT {
                self.halt_runaway();
                return;
            }
            if self.step() == StepControl::Stop {
                return;
            }
        }
    }

    /// Executes exactly the command under the pointer and applies its
    /// result.
    pub fn step(&mut self) -> StepControl {
        if !self.navigation.is_playing() {
            return StepControl::Stop;
        }
        let Some(command) = self.state.current_command().cloned() else {
            self.finish();
            return StepControl::Stop;
        };
        let index = self.state.current_index;
        self.unsuspended_steps += 1;

        if !self
            .conditions
            .evaluate(&command.conditions, &self.state.variables)
        {
            self.skip_unmet(&command, index);
            return StepControl::Continue;
        }

        let now = self.clock.now();
        let (result, diagnostics) = {
            let mut ctx = HandlerContext {
                project: &self.project,
                state: &self.state,
                scene_index: &self.scene_index,
                command_id: &command.id,
                assets: self.assets.as_ref(),
                preloader: self.preloader.as_ref(),
                sound_effects: self.sound_effects.as_ref(),
                conditions: self.conditions.as_ref(),
                rng: self.rng.as_mut(),
                music: &mut self.music,
                settings: &self.settings,
                mode: self.mode,
                now,
                diagnostics: Vec::new(),
            };
            let result = handlers::handle(&command, &mut ctx);
            (result, ctx.diagnostics)
        };
        for diagnostic in diagnostics {
            self.raise(diagnostic);
        }

        match result {
            Ok(outcome) => {
                debug!(
                    scene_id = %self.state.current_scene_id,
                    index,
                    command_id = %command.id,
                    command_kind = command.kind_name(),
                    "command executed"
                );
                self.record(PlaybackEventKind::CommandExecuted {
                    scene_id: self.state.current_scene_id.clone(),
                    index,
                    command_id: command.id.clone(),
                    command_kind: command.kind_name().to_owned(),
                });
                self.apply_outcome(outcome)
            }
            Err(err) => {
                self.raise_error(&err, Some(&command));
                self.record(PlaybackEventKind::CommandSkipped {
                    scene_id: self.state.current_scene_id.clone(),
                    index,
                    command_id: command.id.clone(),
                    reason: SkipReason::HandlerFailed,
                });
                self.state.current_index = index + 1;
                self.mark_playing();
                StepControl::Continue
            }
        }
    }

    /// Fires every due timer and samples the music fade.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.music.update(now);
        while let Some((_, action)) = self.timers.pop_due(now) {
            match action {
                TimerAction::Resume(id) => {
                    if let Some(suspension) = self.suspension.resolve_timer(id) {
                        self.resume(suspension, ResumeSource::Timer);
                    }
                }
                TimerAction::Apply(patch) => self.state.apply(patch),
                TimerAction::Advance => self.advance(),
            }
        }
    }

    /// When the host should next call `tick()`.
    #[must_use]
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        match (self.timers.next_deadline(), self.music.next_deadline(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn skip_unmet(&mut self, command: &Command, index: usize) {
        self.record(PlaybackEventKind::CommandSkipped {
            scene_id: self.state.current_scene_id.clone(),
            index,
            command_id: command.id.clone(),
            reason: SkipReason::ConditionFalse,
        });
        self.state.current_index = match &command.kind {
            CommandKind::BranchStart(marker) => {
                if let Some(end) = self.scene_index.branch_end(index) {
                    end + 1
                } else {
                    self.raise(Diagnostic {
                        kind: DiagnosticKind::StructureIssue,
                        scene_id: self.state.current_scene_id.clone(),
                        command_id: Some(command.id.clone()),
                        reference: None,
                        message: format!(
                            "branch '{}' has no matching end, skipping the marker only",
                            marker.branch_id
                        ),
                    });
                    index + 1
                }
            }
            _ => index + 1,
        };
        self.mark_playing();
    }

    fn apply_outcome(&mut self, outcome: HandlerOutcome) -> StepControl {
        let HandlerOutcome {
            flow,
            updates,
            on_resume,
            detached,
        } = outcome;
        self.state.apply(updates);
        for (delay_ms, patch) in detached {
            let deadline = self.clock.deadline_after(delay_ms);
            self.timers.schedule(deadline, TimerAction::Apply(patch));
        }

        match flow {
            Flow::Advance => {
                self.state.current_index += 1;
                self.mark_playing();
                StepControl::Continue
            }
            Flow::Goto(Target::Index(index)) => {
                self.state.current_index = index;
                self.mark_playing();
                StepControl::Continue
            }
            Flow::Goto(Target::Scene(scene_id)) => {
                if let Err(err) = self.enter_scene(&scene_id) {
                    self.raise_error(&err, None);
                    self.state.current_index += 1;
                    self.mark_playing();
                    return StepControl::Continue;
                }
                StepControl::Stop
            }
            Flow::Halt(reason) => {
                self.suspend(reason, None, on_resume);
                StepControl::Stop
            }
            Flow::Delay {
                delay_ms,
                interruptible,
            } => {
                let reason = if interruptible {
                    SuspendReason::InputOrTimer
                } else {
                    SuspendReason::Timer
                };
                self.suspend(reason, Some(delay_ms), on_resume);
                StepControl::Stop
            }
        }
    }

    fn suspend(&mut self, reason: SuspendReason, delay_ms: Option<u64>, on_resume: StatePatch) {
        let id = self.suspension.next_id();
        let timer = delay_ms.map(|delay_ms| {
            let deadline = self.clock.deadline_after(delay_ms);
            self.timers.schedule(deadline, TimerAction::Resume(id))
        });
        if let Some(displaced) = self.suspension.fill(Suspension {
            id,
            reason,
            timer,
            on_resume,
        }) {
            if let Some(timer) = displaced.timer {
                self.timers.cancel(timer);
            }
        }
        self.unsuspended_steps = 0;

        let scene_id = self.state.current_scene_id.clone();
        let index = self.state.current_index;
        debug!(%scene_id, index, %reason, "playback suspended");
        self.record(PlaybackEventKind::Suspended {
            scene_id: scene_id.clone(),
            index,
            reason: reason.to_string(),
        });
        self.navigation = NavigationState::Suspended {
            scene_id,
            index,
            reason,
        };
    }

    /// Merges the suspension's completion patch, moves past the suspended
    /// command and keeps stepping.
    fn resume(&mut self, suspension: Suspension, source: ResumeSource) {
        self.acknowledge(suspension, source);
        self.state.current_index += 1;
        self.advance();
    }

    fn acknowledge(&mut self, suspension: Suspension, source: ResumeSource) {
        self.record(PlaybackEventKind::Resumed {
            scene_id: self.state.current_scene_id.clone(),
            index: self.state.current_index,
            source: source.to_string(),
        });
        self.state.apply(suspension.on_resume);
        self.unsuspended_steps = 0;
        self.mark_playing();
    }

    fn mark_playing(&mut self) {
        self.navigation = NavigationState::Playing {
            scene_id: self.state.current_scene_id.clone(),
            index: self.state.current_index,
        };
    }

    fn finish(&mut self) {
        if matches!(self.navigation, NavigationState::Finished { .. }) {
            return;
        }
        let scene_id = self.state.current_scene_id.clone();
        debug!(%scene_id, "scene finished");
        self.record(PlaybackEventKind::PlaybackFinished {
            scene_id: scene_id.clone(),
        });
        self.navigation = NavigationState::Finished { scene_id };
    }

    fn halt_runaway(&mut self) {
        self.raise(Diagnostic {
            kind: DiagnosticKind::RunawayLoop,
            scene_id: self.state.current_scene_id.clone(),
            command_id: self.state.current_command().map(|c| c.id.clone()),
            reference: None,
            message: format!(
                "{RUNAWAY_LIMIT} commands ran without waiting on anything, halting"
            ),
        });
        self.unsuspended_steps = 0;
        self.navigation = NavigationState::Suspended {
            scene_id: self.state.current_scene_id.clone(),
            index: self.state.current_index,
            reason: SuspendReason::Input,
        };
        let id = self.suspension.next_id();
        self.suspension.fill(Suspension {
            id,
            reason: SuspendReason::Input,
            timer: None,
            on_resume: StatePatch::new(),
        });
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Replaces the active scene. The new scene's first step runs on the
    /// next `tick()`, so the blank stage is observable in between.
    fn enter_scene(&mut self, scene_id: &str) -> Result<(), EngineError> {
        let project = Arc::clone(&self.project);
        let scene = project
            .scene(scene_id)
            .ok_or_else(|| EngineError::missing(ReferenceKind::Scene, scene_id))?;

        self.suspension.take(&mut self.timers);
        self.timers.clear();
        self.state.enter_scene(scene);
        self.scene_index = SceneIndex::build(&scene.commands);
        self.mark_playing();
        self.record(PlaybackEventKind::SceneEntered {
            scene_id: scene.id.clone(),
        });
        self.report_structure_issues();

        let now = self.clock.now();
        self.timers.schedule(now, TimerAction::Advance);
        Ok(())
    }

    fn follow(&mut self, destination: Destination<'_>) {
        match destination {
            Destination::Next => {
                self.state.current_index += 1;
                self.advance();
            }
            Destination::Scene(scene_id) => {
                if let Err(err) = self.enter_scene(scene_id) {
                    self.raise_error(&err, None);
                    self.state.current_index += 1;
                    self.advance();
                }
            }
            Destination::Label(label_id) => {
                if let Some(index) = self.scene_index.label(label_id) {
                    self.state.current_index = index;
                } else {
                    self.raise_error(&EngineError::missing(ReferenceKind::Label, label_id), None);
                    self.state.current_index += 1;
                }
                self.mark_playing();
                self.advance();
            }
        }
    }

    // ------------------------------------------------------------------
    // Player events
    // ------------------------------------------------------------------

    /// Acknowledges the current line, or cuts an interruptible wait short.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotSuspended` or `EngineError::UnexpectedResume`
    /// when playback is not waiting for input; playback is untouched.
    pub fn continue_playback(&mut self) -> Result<(), EngineError> {
        let suspension =
            self.suspension
                .resolve(ResumeSource::Input, &mut self.timers, self.settings.enable_skip)?;
        self.resume(suspension, ResumeSource::Input);
        Ok(())
    }

    /// Picks the offered option at `option_index`.
    ///
    /// # Errors
    ///
    /// Returns a resume error when no choice is pending, and
    /// `EngineError::Validation` for an index outside the offered options.
    pub fn choose(&mut self, option_index: usize) -> Result<(), EngineError> {
        self.expect_suspension(ResumeSource::Choice)?;
        let prompt = self
            .state
            .ui
            .choices
            .clone()
            .ok_or_else(|| EngineError::Validation("no choice is being offered".to_owned()))?;
        let option = prompt.options.get(option_index).cloned().ok_or_else(|| {
            EngineError::Validation(format!(
                "option {option_index} is out of range ({} offered)",
                prompt.options.len()
            ))
        })?;

        let suspension = self
            .suspension
            .resolve(ResumeSource::Choice, &mut self.timers, false)?;
        self.acknowledge(suspension, ResumeSource::Choice);
        self.state.apply(
            StateChange::RecordChoice(ChoiceRecord {
                scene_id: self.state.current_scene_id.clone(),
                command_id: prompt.command_id,
                option_id: option.option_id,
                text: option.text,
            })
            .into(),
        );

        let destination = match &option.target {
            ChoiceTarget::Continue => Destination::Next,
            ChoiceTarget::Scene { scene_id } => Destination::Scene(scene_id),
            ChoiceTarget::Label { label_id } => Destination::Label(label_id),
        };
        self.follow(destination);
        Ok(())
    }

    /// Submits the text-input prompt. An empty submission falls back to the
    /// prompt's default value; the value is cut to the prompt's maximum
    /// length and coerced to the variable's declared type.
    ///
    /// # Errors
    ///
    /// Returns a resume error when no text input is pending.
    pub fn submit_text(&mut self, value: &str) -> Result<(), EngineError> {
        self.expect_suspension(ResumeSource::TextInput)?;
        let prompt = self
            .state
            .ui
            .text_input
            .clone()
            .ok_or_else(|| EngineError::Validation("no text input is pending".to_owned()))?;

        let trimmed = value.trim();
        let mut text = if trimmed.is_empty() {
            prompt.default_value.clone().unwrap_or_default()
        } else {
            trimmed.to_owned()
        };
        if let Some(max_length) = prompt.max_length {
            text = text.chars().take(max_length).collect();
        }
        let value = match self.project.variable(&prompt.variable_id) {
            Some(definition) => VariableValue::Text(text).coerce_to(definition.variable_type),
            None => VariableValue::Text(text),
        };

        let suspension = self
            .suspension
            .resolve(ResumeSource::TextInput, &mut self.timers, false)?;
        self.acknowledge(suspension, ResumeSource::TextInput);
        self.state.apply(
            StateChange::Variable {
                variable_id: prompt.variable_id,
                value,
            }
            .into(),
        );
        self.follow(Destination::Next);
        Ok(())
    }

    /// Reports that the playing movie ended.
    ///
    /// # Errors
    ///
    /// Returns a resume error when no movie is playing.
    pub fn movie_finished(&mut self) -> Result<(), EngineError> {
        let suspension = self
            .suspension
            .resolve(ResumeSource::MovieFinished, &mut self.timers, false)?;
        self.resume(suspension, ResumeSource::MovieFinished);
        Ok(())
    }

    /// Closes the modal screen on top of the stack. Playback resumes once
    /// the stack is empty.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` when no modal screen is open.
    pub fn dismiss_screen(&mut self) -> Result<(), EngineError> {
        if self.state.ui.screen_stack.is_empty() {
            return Err(EngineError::Validation("no screen is open".to_owned()));
        }
        self.state.apply(StateChange::PopScreen.into());
        if self.state.ui.screen_stack.is_empty()
            && self.suspension.reason() == Some(SuspendReason::Screen)
        {
            let suspension = self.suspension.resolve(
                ResumeSource::ScreenDismissed,
                &mut self.timers,
                false,
            )?;
            self.resume(suspension, ResumeSource::ScreenDismissed);
        }
        Ok(())
    }

    /// Pops the top HUD overlay. Returns whether one was open.
    pub fn hide_hud(&mut self) -> bool {
        if self.state.ui.hud_stack.is_empty() {
            return false;
        }
        self.state.apply(StateChange::PopHud.into());
        true
    }

    /// Presses an overlay button. A navigating button cancels whatever
    /// playback is waiting on.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingReference` when no button with this id
    /// is on stage, and `EngineError::NotSuspended` once the session has
    /// ended.
    pub fn press_button(&mut self, button_id: &str) -> Result<(), EngineError> {
        if self.navigation.is_ended() {
            return Err(EngineError::NotSuspended);
        }
        let action = self
            .state
            .stage
            .buttons
            .iter()
            .find(|button| button.overlay_id == button_id)
            .map(|button| button.action.clone())
            .ok_or_else(|| EngineError::missing(ReferenceKind::Overlay, button_id))?;

        let destination = match &action {
            ButtonAction::None => return Ok(()),
            ButtonAction::Scene { scene_id } => Destination::Scene(scene_id),
            ButtonAction::Label { label_id } => Destination::Label(label_id),
        };
        if let Some(suspension) = self.suspension.take(&mut self.timers) {
            self.acknowledge(suspension, ResumeSource::Button);
        }
        if matches!(self.navigation, NavigationState::Finished { .. }) {
            self.mark_playing();
        }
        self.follow(destination);
        Ok(())
    }

    /// Opens or closes the dialogue history panel.
    pub fn set_history_open(&mut self, open: bool) {
        self.state.apply(StateChange::HistoryPanel(open).into());
    }

    /// Ends the session: timers are dropped, music stops and nothing runs
    /// again.
    pub fn end(&mut self) {
        if self.navigation.is_ended() {
            return;
        }
        self.suspension.take(&mut self.timers);
        self.timers.clear();
        self.music.stop(0, self.clock.now());
        self.navigation = NavigationState::Ended;
        self.record(PlaybackEventKind::SessionEnded);
    }

    fn expect_suspension(&self, source: ResumeSource) -> Result<(), EngineError> {
        match self.suspension.reason() {
            None => Err(EngineError::NotSuspended),
            Some(reason) if reason.accepts(source) => Ok(()),
            Some(reason) => Err(EngineError::UnexpectedResume {
                expected: reason.to_string(),
                received: source.to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics and events
    // ------------------------------------------------------------------

    fn raise_error(&mut self, error: &EngineError, command: Option<&Command>) {
        let (kind, reference) = classify(error);
        let command_id = command
            .map(|c| c.id.clone())
            .or_else(|| self.state.current_command().map(|c| c.id.clone()));
        self.raise(Diagnostic {
            kind,
            scene_id: self.state.current_scene_id.clone(),
            command_id,
            reference,
            message: error.to_string(),
        });
    }

    fn raise(&mut self, diagnostic: Diagnostic) {
        warn!(
            scene_id = %diagnostic.scene_id,
            command_id = diagnostic.command_id.as_deref().unwrap_or("-"),
            kind = ?diagnostic.kind,
            "{}",
            diagnostic.message
        );
        self.record(PlaybackEventKind::DiagnosticRaised(diagnostic));
    }

    fn report_structure_issues(&mut self) {
        let issues: Vec<StructureIssue> = self.scene_index.issues().to_vec();
        for issue in issues {
            let (index, message) = match issue {
                StructureIssue::DuplicateLabel { label_id, index } => {
                    (index, format!("duplicate label '{label_id}'"))
                }
                StructureIssue::UnclosedBranch { branch_id, index } => {
                    (index, format!("branch '{branch_id}' is never closed"))
                }
                StructureIssue::OrphanBranchEnd { branch_id, index } => {
                    (index, format!("branch end '{branch_id}' has no matching start"))
                }
                StructureIssue::InterleavedBranch { branch_id, index } => {
                    (index, format!("branch '{branch_id}' interleaves another branch"))
                }
            };
            self.raise(Diagnostic {
                kind: DiagnosticKind::StructureIssue,
                scene_id: self.state.current_scene_id.clone(),
                command_id: self.state.current_commands.get(index).map(|c| c.id.clone()),
                reference: None,
                message,
            });
        }
    }

    fn record(&mut self, kind: PlaybackEventKind) {
        if self.events.len() >= EVENT_LOG_CAPACITY {
            let excess = self.events.len() + 1 - EVENT_LOG_CAPACITY;
            self.events.drain(..excess);
            debug!(session_id = %self.session_id, dropped = excess, "event log full, dropping oldest");
        }
        self.sequence += 1;
        self.events.push(PlaybackEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                session_id: self.session_id,
                sequence_number: self.sequence,
                correlation_id: self.correlation_id,
                occurred_at: self.clock.now(),
            },
            kind,
        });
    }
}
