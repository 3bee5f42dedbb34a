//! Timeline orchestration
//!
//! A timeline is a declarative list of entries, each one
//! `(element, mutation, offset_ms, duration_ms)`. Ticking the timeline
//! interprets the entries in `(offset, insertion)` order and pushes the
//! resulting writes into a [`MutationSink`].
//!
//! Entries move through `Pending -> Active -> Done`. A tween captures its
//! start value when it first activates: the explicit `from` if given,
//! otherwise the sink's last known value for that attribute. Completed
//! entries always write their exact target, so replaying a timeline after a
//! reset re-applies absolute state rather than accumulating drift.

use crate::easing::Easing;
use crate::property::{Attribute, Value};
use crate::target::Write;
use converge_core::{AssetRef, ElementId};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    pub struct TimelineEntryId;
}

/// What an entry does to its element
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    /// Interpolate one attribute towards `to`
    Tween {
        attribute: Attribute,
        from: Option<Value>,
        to: Value,
        easing: Easing,
    },
    /// Swap the element's image
    Image(AssetRef),
}

/// An entry in a timeline
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub element: ElementId,
    pub mutation: Mutation,
    /// Offset in milliseconds from timeline start
    pub offset_ms: u32,
    /// Duration in milliseconds (0 = instant set)
    pub duration_ms: u32,
}

impl TimelineEntry {
    pub fn end_ms(&self) -> u32 {
        self.offset_ms.saturating_add(self.duration_ms)
    }

    pub fn attribute(&self) -> Option<Attribute> {
        match &self.mutation {
            Mutation::Tween { attribute, .. } => Some(*attribute),
            Mutation::Image(_) => None,
        }
    }
}

/// Receiver for the writes a timeline produces
pub trait MutationSink {
    /// Last value written for an element attribute, if any
    fn current(&self, element: &ElementId, attribute: Attribute) -> Option<Value>;

    fn write(&mut self, element: &ElementId, write: Write);
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum EntryState {
    Pending,
    Active { from: Value },
    Done,
}

/// A timeline that orchestrates element mutations
#[derive(Clone, Debug)]
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    /// Entry ids sorted by offset, ties kept in insertion order
    order: Vec<TimelineEntryId>,
    states: SecondaryMap<TimelineEntryId, EntryState>,
    current_time: f64,
    duration_ms: u32,
    playing: bool,
    loop_count: i32, // -1 for infinite
    current_loop: i32,
    repeat_delay_ms: u32,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            states: SecondaryMap::new(),
            current_time: 0.0,
            duration_ms: 0,
            playing: false,
            loop_count: 1,
            current_loop: 0,
            repeat_delay_ms: 0,
        }
    }

    /// Add an entry to the timeline
    pub fn add(&mut self, entry: TimelineEntry) -> TimelineEntryId {
        let offset = entry.offset_ms;
        let end_time = entry.end_ms();
        let id = self.entries.insert(entry);

        let at = self
            .order
            .partition_point(|other| self.entries[*other].offset_ms <= offset);
        self.order.insert(at, id);
        self.states.insert(id, EntryState::Pending);

        self.duration_ms = self.duration_ms.max(end_time);
        id
    }

    /// Tween from whatever value the attribute currently has
    pub fn to(
        &mut self,
        element: &ElementId,
        attribute: Attribute,
        to: impl Into<Value>,
        offset_ms: u32,
        duration_ms: u32,
        easing: Easing,
    ) -> TimelineEntryId {
        self.add(TimelineEntry {
            element: element.clone(),
            mutation: Mutation::Tween {
                attribute,
                from: None,
                to: to.into(),
                easing,
            },
            offset_ms,
            duration_ms,
        })
    }

    /// Tween between two absolute values
    #[allow(clippy::too_many_arguments)]
    pub fn from_to(
        &mut self,
        element: &ElementId,
        attribute: Attribute,
        from: impl Into<Value>,
        to: impl Into<Value>,
        offset_ms: u32,
        duration_ms: u32,
        easing: Easing,
    ) -> TimelineEntryId {
        self.add(TimelineEntry {
            element: element.clone(),
            mutation: Mutation::Tween {
                attribute,
                from: Some(from.into()),
                to: to.into(),
                easing,
            },
            offset_ms,
            duration_ms,
        })
    }

    /// Instantly set an attribute
    pub fn set(
        &mut self,
        element: &ElementId,
        attribute: Attribute,
        value: impl Into<Value>,
        offset_ms: u32,
    ) -> TimelineEntryId {
        let value = value.into();
        self.add(TimelineEntry {
            element: element.clone(),
            mutation: Mutation::Tween {
                attribute,
                from: Some(value),
                to: value,
                easing: Easing::Linear,
            },
            offset_ms,
            duration_ms: 0,
        })
    }

    /// Instantly swap an element's image
    pub fn set_image(
        &mut self,
        element: &ElementId,
        asset: AssetRef,
        offset_ms: u32,
    ) -> TimelineEntryId {
        self.add(TimelineEntry {
            element: element.clone(),
            mutation: Mutation::Image(asset),
            offset_ms,
            duration_ms: 0,
        })
    }

    /// Copy every entry of `other` into this timeline, shifted by `offset_ms`
    pub fn merge_at(&mut self, offset_ms: u32, other: &Timeline) {
        for entry in other.entries() {
            let mut entry = entry.clone();
            entry.offset_ms = entry.offset_ms.saturating_add(offset_ms);
            self.add(entry);
        }
        self.extend_to(offset_ms.saturating_add(other.duration_ms));
    }

    /// Make the timeline last at least `duration_ms`
    pub fn extend_to(&mut self, duration_ms: u32) {
        self.duration_ms = self.duration_ms.max(duration_ms);
    }

    pub fn start(&mut self) {
        self.current_time = 0.0;
        self.current_loop = 0;
        self.reset_entries();
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Number of iterations to play (-1 for infinite)
    pub fn set_loop(&mut self, count: i32) {
        self.loop_count = count;
    }

    /// Pause between iterations when looping
    pub fn set_repeat_delay(&mut self, delay_ms: u32) {
        self.repeat_delay_ms = delay_ms;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn repeat_delay_ms(&self) -> u32 {
        self.repeat_delay_ms
    }

    /// Time inside the current iteration (may exceed the duration while
    /// waiting out the repeat delay)
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_loop(&self) -> i32 {
        self.current_loop
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: TimelineEntryId) -> Option<&TimelineEntry> {
        self.entries.get(id)
    }

    /// Entries in playback order
    pub fn entries(&self) -> impl Iterator<Item = &TimelineEntry> + '_ {
        self.order.iter().map(move |id| &self.entries[*id])
    }

    /// Find two entries that drive the same element attribute in overlapping
    /// windows. Instant sets that coincide with a tween's start or end do not
    /// count as overlapping.
    pub fn find_overlap(&self) -> Option<(TimelineEntryId, TimelineEntryId)> {
        for (i, a_id) in self.order.iter().enumerate() {
            let a = &self.entries[*a_id];
            let Some(a_attr) = a.attribute() else {
                continue;
            };
            for b_id in &self.order[i + 1..] {
                let b = &self.entries[*b_id];
                if b.offset_ms >= a.end_ms().max(a.offset_ms.saturating_add(1)) {
                    break;
                }
                if b.element != a.element || b.attribute() != Some(a_attr) {
                    continue;
                }
                if a.offset_ms < b.end_ms() && b.offset_ms < a.end_ms() {
                    return Some((*a_id, *b_id));
                }
            }
        }
        None
    }

    /// Advance the timeline and emit writes for everything due.
    ///
    /// Returns the unused part of `dt_ms` when playback finished during this
    /// tick, so a successor can pick up exactly where this one ended.
    pub fn tick(&mut self, dt_ms: f64, sink: &mut dyn MutationSink) -> Option<f64> {
        if !self.playing {
            return None;
        }

        let mut remaining = dt_ms.max(0.0);
        loop {
            let iteration_end = self.duration_ms as f64;
            let target_time = self.current_time + remaining;

            if target_time < iteration_end {
                self.render(target_time, sink);
                self.current_time = target_time;
                return None;
            }

            self.render(iteration_end, sink);
            let overflow = target_time - iteration_end;
            let period = iteration_end + self.repeat_delay_ms as f64;

            if !self.has_more_loops() || period <= 0.0 {
                self.current_time = iteration_end;
                self.playing = false;
                return Some(overflow);
            }

            if overflow < self.repeat_delay_ms as f64 {
                self.current_time = target_time;
                return None;
            }

            remaining = overflow - self.repeat_delay_ms as f64;
            self.current_loop += 1;

            // Iterations that would be fully overwritten are skipped
            if remaining >= 2.0 * period {
                let skipped = (remaining / period).floor() - 1.0;
                remaining -= skipped * period;
                self.current_loop = self.current_loop.saturating_add(skipped as i32);
                if self.loop_count != -1 && self.current_loop >= self.loop_count {
                    self.current_loop = self.loop_count - 1;
                }
            }

            self.reset_entries();
            self.current_time = 0.0;
        }
    }

    /// Sampled value of an entry at the current time, if it can be known
    pub fn value(&self, id: TimelineEntryId) -> Option<Value> {
        let entry = self.entries.get(id)?;
        let Mutation::Tween {
            from, to, easing, ..
        } = &entry.mutation
        else {
            return None;
        };

        let from = match self.states.get(id)? {
            EntryState::Active { from } => Some(*from),
            EntryState::Done => return Some(*to),
            EntryState::Pending => *from,
        };

        let local_time = self.current_time - entry.offset_ms as f64;
        if local_time < 0.0 {
            return from;
        }
        if local_time >= entry.duration_ms as f64 {
            return Some(*to);
        }

        let progress = local_time / entry.duration_ms as f64;
        from.map(|from| from.lerp(to, easing.apply(progress)))
    }

    fn has_more_loops(&self) -> bool {
        self.loop_count == -1 || self.current_loop < self.loop_count - 1
    }

    fn reset_entries(&mut self) {
        for (_, state) in self.states.iter_mut() {
            *state = EntryState::Pending;
        }
    }

    fn render(&mut self, time: f64, sink: &mut dyn MutationSink) {
        let Self {
            entries,
            order,
            states,
            ..
        } = self;

        for id in order.iter() {
            let entry = &entries[*id];
            if entry.offset_ms as f64 > time {
                break;
            }
            let Some(state) = states.get_mut(*id) else {
                continue;
            };

            match &entry.mutation {
                Mutation::Image(asset) => {
                    if *state == EntryState::Pending {
                        sink.write(&entry.element, Write::Image(asset.clone()));
                        *state = EntryState::Done;
                    }
                }
                Mutation::Tween {
                    attribute,
                    from,
                    to,
                    easing,
                } => {
                    let start = match *state {
                        EntryState::Done => continue,
                        EntryState::Active { from } => from,
                        EntryState::Pending => from
                            .or_else(|| sink.current(&entry.element, *attribute))
                            .unwrap_or(*to),
                    };

                    let progress = if entry.duration_ms == 0 {
                        1.0
                    } else {
                        ((time - entry.offset_ms as f64) / entry.duration_ms as f64)
                            .clamp(0.0, 1.0)
                    };

                    let value = if progress >= 1.0 {
                        *to
                    } else {
                        start.lerp(to, easing.apply(progress))
                    };
                    sink.write(&entry.element, Write::Attribute(*attribute, value));

                    *state = if progress >= 1.0 {
                        EntryState::Done
                    } else {
                        EntryState::Active { from: start }
                    };
                }
            }
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converge_core::Point;
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct RecordingSink {
        values: FxHashMap<(ElementId, Attribute), Value>,
        writes: Vec<(ElementId, Write)>,
    }

    impl MutationSink for RecordingSink {
        fn current(&self, element: &ElementId, attribute: Attribute) -> Option<Value> {
            self.values.get(&(element.clone(), attribute)).copied()
        }

        fn write(&mut self, element: &ElementId, write: Write) {
            if let Write::Attribute(attribute, value) = &write {
                self.values.insert((element.clone(), *attribute), *value);
            }
            self.writes.push((element.clone(), write));
        }
    }

    impl RecordingSink {
        fn scalar(&self, id: &str, attribute: Attribute) -> Option<f64> {
            self.current(&ElementId::new(id), attribute)
                .and_then(|v| v.as_scalar())
        }
    }

    fn ball() -> ElementId {
        ElementId::new("ball-1")
    }

    #[test]
    fn test_linear_tween_progress() {
        let mut tl = Timeline::new();
        let id = tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 1000, Easing::Linear);
        tl.start();

        let mut sink = RecordingSink::default();
        tl.tick(250.0, &mut sink);
        assert_eq!(sink.scalar("ball-1", Attribute::Scale), Some(0.25));
        assert_eq!(tl.value(id), Some(Value::Scalar(0.25)));

        tl.tick(500.0, &mut sink);
        assert_eq!(sink.scalar("ball-1", Attribute::Scale), Some(0.75));
    }

    #[test]
    fn test_entries_sorted_by_offset_then_insertion() {
        let mut tl = Timeline::new();
        tl.set(&ball(), Attribute::Opacity, 1.0, 500);
        tl.set(&ball(), Attribute::Scale, 1.0, 0);
        tl.set(&ball(), Attribute::Rotation, 0.0, 500);

        let attrs: Vec<_> = tl.entries().filter_map(|e| e.attribute()).collect();
        assert_eq!(
            attrs,
            vec![Attribute::Scale, Attribute::Opacity, Attribute::Rotation]
        );
    }

    #[test]
    fn test_to_captures_current_value() {
        let mut tl = Timeline::new();
        tl.to(&ball(), Attribute::Scale, 0.85, 0, 100, Easing::Linear);
        tl.start();

        let mut sink = RecordingSink::default();
        sink.values
            .insert((ball(), Attribute::Scale), Value::Scalar(1.0));

        tl.tick(50.0, &mut sink);
        let scale = sink.scalar("ball-1", Attribute::Scale).unwrap();
        assert!((scale - 0.925).abs() < 1e-12);
    }

    #[test]
    fn test_to_without_known_value_snaps_to_target() {
        let mut tl = Timeline::new();
        tl.to(&ball(), Attribute::Opacity, 0.4, 0, 100, Easing::Linear);
        tl.start();

        let mut sink = RecordingSink::default();
        tl.tick(10.0, &mut sink);
        assert_eq!(sink.scalar("ball-1", Attribute::Opacity), Some(0.4));
    }

    #[test]
    fn test_large_tick_applies_every_phase_in_order() {
        let mut tl = Timeline::new();
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        tl.from_to(&ball(), Attribute::Position, p0, p1, 0, 1500, Easing::POWER2_IN_OUT);
        tl.from_to(&ball(), Attribute::Scale, 1.0, 0.0, 0, 1500, Easing::POWER2_IN_OUT);
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 3500, 500, Easing::POWER2_OUT);
        tl.start();

        let mut sink = RecordingSink::default();
        let leftover = tl.tick(10_000.0, &mut sink);

        assert_eq!(leftover, Some(6000.0));
        assert!(!tl.is_playing());
        assert_eq!(sink.scalar("ball-1", Attribute::Scale), Some(1.0));

        // Each entry wrote exactly once, in schedule order
        let scales: Vec<f64> = sink
            .writes
            .iter()
            .filter_map(|(_, w)| match w {
                Write::Attribute(Attribute::Scale, Value::Scalar(v)) => Some(*v),
                _ => None,
            })
            .collect();
        assert_eq!(scales, vec![0.0, 1.0]);
    }

    #[test]
    fn test_done_entries_are_not_rewritten() {
        let mut tl = Timeline::new();
        tl.set(&ball(), Attribute::Opacity, 1.0, 0);
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 1000, Easing::Linear);
        tl.start();

        let mut sink = RecordingSink::default();
        tl.tick(16.0, &mut sink);
        tl.tick(16.0, &mut sink);

        let opacity_writes = sink
            .writes
            .iter()
            .filter(|(_, w)| matches!(w, Write::Attribute(Attribute::Opacity, _)))
            .count();
        assert_eq!(opacity_writes, 1);
    }

    #[test]
    fn test_image_swap_fires_once() {
        let mut tl = Timeline::new();
        tl.set_image(&ball(), AssetRef::new("/images/B1.svg"), 100);
        tl.extend_to(1000);
        tl.start();

        let mut sink = RecordingSink::default();
        tl.tick(50.0, &mut sink);
        assert!(sink.writes.is_empty());

        tl.tick(100.0, &mut sink);
        tl.tick(100.0, &mut sink);
        assert_eq!(
            sink.writes,
            vec![(ball(), Write::Image(AssetRef::new("/images/B1.svg")))]
        );
    }

    #[test]
    fn test_infinite_loop_with_repeat_delay() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 1000, Easing::Linear);
        tl.set_loop(-1);
        tl.set_repeat_delay(500);
        tl.start();

        let mut sink = RecordingSink::default();
        tl.tick(1000.0, &mut sink);
        assert_eq!(sink.scalar("ball-1", Attribute::Scale), Some(1.0));
        assert_eq!(tl.current_loop(), 0);

        // Inside the repeat delay nothing moves
        tl.tick(250.0, &mut sink);
        assert_eq!(sink.scalar("ball-1", Attribute::Scale), Some(1.0));
        assert!(tl.is_playing());

        // 250ms more ends the delay, 100ms into the second iteration
        tl.tick(350.0, &mut sink);
        assert_eq!(tl.current_loop(), 1);
        let scale = sink.scalar("ball-1", Attribute::Scale).unwrap();
        assert!((scale - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_huge_tick_skips_whole_iterations() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 1000, Easing::Linear);
        tl.set_loop(-1);
        tl.set_repeat_delay(500);
        tl.start();

        let mut sink = RecordingSink::default();
        // 1000 periods of 1500ms plus 300ms
        tl.tick(1_500_300.0, &mut sink);

        assert!(tl.is_playing());
        assert_eq!(tl.current_loop(), 1000);
        let scale = sink.scalar("ball-1", Attribute::Scale).unwrap();
        assert!((scale - 0.3).abs() < 1e-9);
        assert!(sink.writes.len() < 10);
    }

    #[test]
    fn test_finite_loop_count() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 100, Easing::Linear);
        tl.set_loop(2);
        tl.start();

        let mut sink = RecordingSink::default();
        assert_eq!(tl.tick(150.0, &mut sink), None);
        assert_eq!(tl.current_loop(), 1);
        assert_eq!(tl.tick(100.0, &mut sink), Some(50.0));
        assert!(!tl.is_playing());
    }

    #[test]
    fn test_stopped_timeline_does_nothing() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 0, 100, Easing::Linear);

        let mut sink = RecordingSink::default();
        assert_eq!(tl.tick(50.0, &mut sink), None);
        assert!(sink.writes.is_empty());
    }

    #[test]
    fn test_merge_at_shifts_entries() {
        let mut child = Timeline::new();
        child.set(&ball(), Attribute::Scale, 1.0, 100);
        child.extend_to(4000);

        let mut parent = Timeline::new();
        parent.merge_at(0, &child);
        parent.merge_at(4000, &child);

        let offsets: Vec<u32> = parent.entries().map(|e| e.offset_ms).collect();
        assert_eq!(offsets, vec![100, 4100]);
        assert_eq!(parent.duration_ms(), 8000);
    }

    #[test]
    fn test_find_overlap() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 1.0, 0.0, 0, 1500, Easing::Linear);
        // Touching windows and other attributes are fine
        tl.from_to(&ball(), Attribute::Scale, 0.0, 1.0, 1500, 500, Easing::Linear);
        tl.set(&ball(), Attribute::Opacity, 1.0, 700);
        assert_eq!(tl.find_overlap(), None);

        let late = tl.from_to(&ball(), Attribute::Scale, 0.5, 1.0, 1700, 500, Easing::Linear);
        let (_, second) = tl.find_overlap().unwrap();
        assert_eq!(second, late);
    }

    #[test]
    fn test_instant_set_inside_tween_is_overlap() {
        let mut tl = Timeline::new();
        tl.from_to(&ball(), Attribute::Scale, 1.0, 0.0, 0, 1000, Easing::Linear);
        tl.set(&ball(), Attribute::Scale, 1.0, 500);
        assert!(tl.find_overlap().is_some());
    }
}
