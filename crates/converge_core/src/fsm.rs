//! State Machine Runtime
//!
//! Flat state machines with entry actions, used to track the lifecycle
//! of an animation cycle:
//!
//! ```text
//! Idle --START--> Intro --INTRO_COMPLETE--> Looping
//!   \               |                          |
//!    `----CANCEL----+----------CANCEL----------'--> Cancelled
//! ```
//!
//! `Cancelled` is terminal; a restart builds a fresh machine.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// An action executed on entering a state
pub type Action = Box<dyn FnMut() + Send>;

/// States of an animation cycle
pub mod cycle_states {
    use super::StateId;

    pub const IDLE: StateId = 0;
    pub const INTRO: StateId = 1;
    pub const LOOPING: StateId = 2;
    pub const CANCELLED: StateId = 3;
}

/// Events driving an animation cycle
pub mod cycle_events {
    use super::EventId;

    pub const START: EventId = 1;
    pub const INTRO_COMPLETE: EventId = 2;
    pub const CANCEL: EventId = 3;
}

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from_state: StateId,
    pub event: EventId,
    pub to_state: StateId,
}

/// Builder for creating state machines
pub struct StateMachineBuilder {
    initial_state: StateId,
    transitions: Vec<Transition>,
    entry_actions: FxHashMap<StateId, SmallVec<[Action; 2]>>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
            entry_actions: FxHashMap::default(),
        }
    }

    /// Move from `from` to `to` when `event` arrives
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition {
            from_state: from,
            event,
            to_state: to,
        });
        self
    }

    /// Run `action` every time `state` is entered
    pub fn on_enter<F: FnMut() + Send + 'static>(mut self, state: StateId, action: F) -> Self {
        self.entry_actions
            .entry(state)
            .or_default()
            .push(Box::new(action));
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
            entry_actions: self.entry_actions,
            history: Vec::new(),
        }
    }
}

/// A state machine instance
pub struct StateMachine {
    current_state: StateId,
    transitions: Vec<Transition>,
    entry_actions: FxHashMap<StateId, SmallVec<[Action; 2]>>,
    /// Transitions taken so far, oldest first
    history: Vec<Transition>,
}

impl StateMachine {
    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    /// The machine for one animation cycle, starting in `IDLE`
    pub fn cycle() -> StateMachine {
        use cycle_events::*;
        use cycle_states::*;

        StateMachine::builder(IDLE)
            .on(IDLE, START, INTRO)
            .on(INTRO, INTRO_COMPLETE, LOOPING)
            .on(IDLE, CANCEL, CANCELLED)
            .on(INTRO, CANCEL, CANCELLED)
            .on(LOOPING, CANCEL, CANCELLED)
            .on_enter(INTRO, || tracing::debug!("cycle entered intro"))
            .on_enter(LOOPING, || tracing::debug!("cycle entered looping"))
            .on_enter(CANCELLED, || tracing::debug!("cycle cancelled"))
            .build()
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    pub fn history(&self) -> &[Transition] {
        &self.history
    }

    fn transition_for(&self, event: EventId) -> Option<Transition> {
        self.transitions
            .iter()
            .find(|t| t.from_state == self.current_state && t.event == event)
            .copied()
    }

    /// Whether `event` would move the machine out of its current state
    pub fn can_send(&self, event: EventId) -> bool {
        self.transition_for(event).is_some()
    }

    /// Deliver an event. Events with no transition from the current state are
    /// ignored. Returns the state the machine is in afterwards.
    pub fn send(&mut self, event: EventId) -> StateId {
        let Some(transition) = self.transition_for(event) else {
            return self.current_state;
        };

        self.current_state = transition.to_state;
        self.history.push(transition);

        if let Some(actions) = self.entry_actions.get_mut(&transition.to_state) {
            for action in actions.iter_mut() {
                action();
            }
        }

        transition.to_state
    }
}

#[cfg(test)]
mod tests {
    use super::cycle_events::*;
    use super::cycle_states::*;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn path(fsm: &StateMachine) -> Vec<(StateId, EventId, StateId)> {
        fsm.history()
            .iter()
            .map(|t| (t.from_state, t.event, t.to_state))
            .collect()
    }

    #[test]
    fn test_cycle_happy_path() {
        let mut fsm = StateMachine::cycle();
        assert_eq!(fsm.current_state(), IDLE);

        assert_eq!(fsm.send(START), INTRO);
        assert_eq!(fsm.send(INTRO_COMPLETE), LOOPING);
        assert_eq!(fsm.send(CANCEL), CANCELLED);

        assert_eq!(
            path(&fsm),
            vec![
                (IDLE, START, INTRO),
                (INTRO, INTRO_COMPLETE, LOOPING),
                (LOOPING, CANCEL, CANCELLED),
            ]
        );
    }

    #[test]
    fn test_cancel_reachable_from_every_live_state() {
        let paths: [&[EventId]; 3] = [&[], &[START], &[START, INTRO_COMPLETE]];
        for events in paths {
            let mut fsm = StateMachine::cycle();
            for event in events {
                fsm.send(*event);
            }
            assert!(fsm.can_send(CANCEL));
            assert_eq!(fsm.send(CANCEL), CANCELLED);
        }
    }

    #[test]
    fn test_cancelled_is_terminal() {
        let mut fsm = StateMachine::cycle();
        fsm.send(CANCEL);

        for event in [START, INTRO_COMPLETE, CANCEL] {
            assert!(!fsm.can_send(event));
            assert_eq!(fsm.send(event), CANCELLED);
        }
        assert_eq!(fsm.history().len(), 1);
    }

    #[test]
    fn test_intro_complete_ignored_before_start() {
        let mut fsm = StateMachine::cycle();
        fsm.send(INTRO_COMPLETE);
        assert!(fsm.is_in(IDLE));
        assert!(fsm.history().is_empty());
    }

    #[test]
    fn test_entry_actions_run_on_each_entry() {
        let entered = Arc::new(AtomicUsize::new(0));
        let counter = entered.clone();

        let mut fsm = StateMachine::builder(IDLE)
            .on(IDLE, START, INTRO)
            .on(INTRO, CANCEL, IDLE)
            .on_enter(INTRO, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        fsm.send(START);
        fsm.send(CANCEL);
        fsm.send(START);
        assert_eq!(entered.load(Ordering::SeqCst), 2);
    }
}
