//! Animation scheduler
//!
//! Owns every playing timeline and advances them from the host frame clock.
//! Timelines are tagged with the generation that was current when they were
//! scheduled; starting a new generation drops everything older, so a
//! superseded cycle can never write to the render target again.

use crate::property::{Attribute, Value};
use crate::target::{apply_write, RenderTarget, Write};
use crate::timeline::{MutationSink, Timeline};
use converge_core::{AnimationError, ElementId};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct TimelineId;
}

/// Playback finished for a scheduled timeline during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    pub id: TimelineId,
    pub generation: u64,
    /// Unused frame time after the timeline ended
    pub leftover_ms: f64,
    /// A chained successor took over the same id
    pub continued: bool,
}

struct ScheduledTimeline {
    timeline: Timeline,
    generation: u64,
    then: Option<Timeline>,
}

/// Last known value of every attribute the scheduler has written
type ValueStore = FxHashMap<(ElementId, Attribute), Value>;

struct TargetSink<'a> {
    values: &'a mut ValueStore,
    target: &'a mut dyn RenderTarget,
}

impl MutationSink for TargetSink<'_> {
    fn current(&self, element: &ElementId, attribute: Attribute) -> Option<Value> {
        self.values.get(&(element.clone(), attribute)).copied()
    }

    fn write(&mut self, element: &ElementId, write: Write) {
        record(self.values, element, &write);
        if let Err(err) = apply_write(self.target, element, &write) {
            tracing::trace!(%err, "skipping write");
        }
    }
}

fn record(values: &mut ValueStore, element: &ElementId, write: &Write) {
    if let Write::Attribute(attribute, value) = write {
        values.insert((element.clone(), *attribute), *value);
    }
}

/// The scheduler that ticks all active timelines
pub struct AnimationScheduler {
    timelines: SlotMap<TimelineId, ScheduledTimeline>,
    values: ValueStore,
    generation: u64,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            timelines: SlotMap::with_key(),
            values: FxHashMap::default(),
            generation: 0,
        }
    }

    /// The generation new timelines must be scheduled under
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate everything scheduled so far and start a fresh generation.
    ///
    /// Recorded attribute values survive; they still describe what the
    /// target shows.
    pub fn begin_generation(&mut self) -> u64 {
        let dropped = self.timelines.len();
        self.timelines.clear();
        self.generation += 1;
        tracing::debug!(generation = self.generation, dropped, "new animation generation");
        self.generation
    }

    /// Start playing a timeline
    pub fn play(&mut self, generation: u64, timeline: Timeline) -> Result<TimelineId, AnimationError> {
        self.schedule(generation, timeline, None)
    }

    /// Start playing `first`, then hand over to `then` the moment it completes
    pub fn play_then(
        &mut self,
        generation: u64,
        first: Timeline,
        then: Timeline,
    ) -> Result<TimelineId, AnimationError> {
        self.schedule(generation, first, Some(then))
    }

    fn schedule(
        &mut self,
        generation: u64,
        mut timeline: Timeline,
        then: Option<Timeline>,
    ) -> Result<TimelineId, AnimationError> {
        if generation != self.generation {
            return Err(AnimationError::StaleGeneration {
                stale: generation,
                active: self.generation,
            });
        }

        timeline.start();
        Ok(self.timelines.insert(ScheduledTimeline {
            timeline,
            generation,
            then,
        }))
    }

    /// Stop every timeline scheduled under `generation`
    pub fn cancel(&mut self, generation: u64) -> usize {
        let before = self.timelines.len();
        self.timelines
            .retain(|_, scheduled| scheduled.generation != generation);
        before - self.timelines.len()
    }

    /// Stop a single timeline
    pub fn stop(&mut self, id: TimelineId) -> bool {
        self.timelines.remove(id).is_some()
    }

    pub fn is_active(&self, id: TimelineId) -> bool {
        self.timelines.contains_key(id)
    }

    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(id).map(|scheduled| &scheduled.timeline)
    }

    /// Number of timelines currently playing
    pub fn active_count(&self) -> usize {
        self.timelines.len()
    }

    pub fn has_active_animations(&self) -> bool {
        !self.timelines.is_empty()
    }

    /// Forget every recorded attribute value, e.g. when the render tree goes away
    pub fn clear_values(&mut self) {
        self.values.clear();
    }

    /// Last value written for an element attribute
    pub fn value(&self, element: &ElementId, attribute: Attribute) -> Option<Value> {
        self.values.get(&(element.clone(), attribute)).copied()
    }

    /// Write directly to the target outside any timeline, recording the value
    /// so later relative tweens start from it.
    pub fn apply(
        &mut self,
        target: &mut dyn RenderTarget,
        element: &ElementId,
        write: Write,
    ) -> Result<(), AnimationError> {
        record(&mut self.values, element, &write);
        apply_write(target, element, &write)
    }

    /// Advance every playing timeline by `dt_ms`
    pub fn tick(
        &mut self,
        dt_ms: f64,
        target: &mut dyn RenderTarget,
    ) -> SmallVec<[Completion; 2]> {
        let current = self.generation;
        self.timelines.retain(|id, scheduled| {
            let keep = scheduled.generation == current;
            if !keep {
                tracing::debug!(?id, generation = scheduled.generation, "dropping stale timeline");
            }
            keep
        });

        let mut completions = SmallVec::new();
        let mut finished: SmallVec<[TimelineId; 2]> = SmallVec::new();

        let Self {
            timelines, values, ..
        } = self;
        let mut sink = TargetSink { values, target };

        for (id, scheduled) in timelines.iter_mut() {
            let mut dt = dt_ms;
            while let Some(leftover_ms) = scheduled.timeline.tick(dt, &mut sink) {
                let next = scheduled.then.take();
                completions.push(Completion {
                    id,
                    generation: scheduled.generation,
                    leftover_ms,
                    continued: next.is_some(),
                });

                match next {
                    Some(mut next) => {
                        next.start();
                        scheduled.timeline = next;
                        dt = leftover_ms;
                    }
                    None => {
                        finished.push(id);
                        break;
                    }
                }
            }
        }

        for id in finished {
            self.timelines.remove(id);
        }

        completions
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
