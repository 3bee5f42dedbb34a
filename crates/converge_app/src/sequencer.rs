//! Cycle sequencing
//!
//! A cycle is the intro timeline chained into the looping timeline, run under
//! one scheduler generation and tracked by the `Idle -> Intro -> Looping ->
//! Cancelled` state machine. Starting a cycle always supersedes the previous
//! one.

use crate::choreography::CyclePlan;
use converge_animation::{AnimationScheduler, RenderTarget, TimelineId, Write};
use converge_core::fsm::{cycle_events, cycle_states};
use converge_core::{AnimationError, ElementId, StateMachine};

/// Lifecycle state of the current cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Intro,
    Looping,
    Cancelled,
}

/// Proof of ownership of a started cycle, required to cancel it
#[derive(Debug, PartialEq, Eq)]
pub struct CycleHandle {
    generation: u64,
}

impl CycleHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Plays one cycle at a time
pub struct Sequencer {
    scheduler: AnimationScheduler,
    machine: StateMachine,
    timeline: Option<TimelineId>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            scheduler: AnimationScheduler::new(),
            machine: StateMachine::cycle(),
            timeline: None,
        }
    }

    /// Start a new cycle, silencing whatever was playing before
    pub fn start(&mut self, plan: CyclePlan) -> CycleHandle {
        let generation = self.scheduler.begin_generation();
        self.machine = StateMachine::cycle();
        self.machine.send(cycle_events::START);

        match self.scheduler.play_then(generation, plan.intro, plan.cycle) {
            Ok(id) => self.timeline = Some(id),
            Err(err) => {
                tracing::debug!(%err, "cycle did not start");
                self.timeline = None;
                self.machine.send(cycle_events::CANCEL);
            }
        }

        CycleHandle { generation }
    }

    /// Cancel the given cycle (if it is still the current one) and start anew
    pub fn restart(&mut self, handle: Option<CycleHandle>, plan: CyclePlan) -> CycleHandle {
        if let Some(handle) = handle {
            self.cancel(handle);
        }
        self.start(plan)
    }

    /// Cancel a cycle. Handles from superseded cycles are ignored.
    pub fn cancel(&mut self, handle: CycleHandle) -> bool {
        if handle.generation != self.scheduler.generation() {
            tracing::trace!(
                stale = handle.generation,
                active = self.scheduler.generation(),
                "ignoring cancel of superseded cycle"
            );
            return false;
        }
        if self.machine.is_in(cycle_states::CANCELLED) {
            return false;
        }

        let dropped = self.scheduler.cancel(handle.generation);
        self.timeline = None;
        self.machine.send(cycle_events::CANCEL);
        tracing::debug!(generation = handle.generation, dropped, "cycle cancelled");
        true
    }

    /// Advance the current cycle by `dt_ms`
    pub fn tick(&mut self, dt_ms: f64, target: &mut dyn RenderTarget) {
        let completions = self.scheduler.tick(dt_ms, target);
        let generation = self.scheduler.generation();

        for completion in completions {
            if completion.generation != generation || Some(completion.id) != self.timeline {
                continue;
            }
            if completion.continued {
                self.machine.send(cycle_events::INTRO_COMPLETE);
            } else {
                self.timeline = None;
            }
        }
    }

    pub fn state(&self) -> CycleState {
        match self.machine.current_state() {
            cycle_states::INTRO => CycleState::Intro,
            cycle_states::LOOPING => CycleState::Looping,
            cycle_states::CANCELLED => CycleState::Cancelled,
            _ => CycleState::Idle,
        }
    }

    /// Write outside any timeline, keeping the value store in sync
    pub fn apply(
        &mut self,
        target: &mut dyn RenderTarget,
        element: &ElementId,
        write: Write,
    ) -> Result<(), AnimationError> {
        self.scheduler.apply(target, element, write)
    }

    /// Forget recorded attribute values
    pub fn reset_values(&mut self) {
        self.scheduler.clear_values();
    }

    /// Number of timelines still scheduled
    pub fn active_timelines(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn scheduler(&self) -> &AnimationScheduler {
        &self.scheduler
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}
