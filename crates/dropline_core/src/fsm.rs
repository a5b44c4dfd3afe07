//! Table-driven finite state machines
//!
//! Widgets describe their interaction states as plain `u32` constants and
//! wire them together with `(from, event) -> to` transitions. An event with no
//! transition out of the current state is ignored, which is how guards are
//! expressed: a disabled state simply has no transition for the events it
//! must not react to.
//!
//! # Example
//!
//! ```rust
//! use dropline_core::fsm::StateMachine;
//!
//! const IDLE: u32 = 0;
//! const ACTIVE: u32 = 1;
//! const GO: u32 = 10;
//! const STOP: u32 = 11;
//!
//! let mut fsm = StateMachine::builder(IDLE)
//!     .on(IDLE, GO, ACTIVE)
//!     .on(ACTIVE, STOP, IDLE)
//!     .build();
//!
//! assert!(fsm.send(GO).is_some());
//! assert_eq!(fsm.current(), ACTIVE);
//! assert!(fsm.send(GO).is_none()); // no transition defined
//! ```

use smallvec::SmallVec;

/// State identifier
pub type StateId = u32;

/// A single `(from, event) -> to` edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: StateId,
    pub event: u32,
    pub to: StateId,
}

/// A finite state machine with an explicit transition table
#[derive(Clone, Debug)]
pub struct StateMachine {
    current: StateId,
    transitions: SmallVec<[Transition; 16]>,
}

impl StateMachine {
    /// Start building a state machine
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// The current state
    pub fn current(&self) -> StateId {
        self.current
    }

    /// Look up the transition an event would take from the current state
    pub fn transition_for(&self, event: u32) -> Option<Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == self.current && t.event == event)
            .copied()
    }

    /// Feed an event to the machine
    ///
    /// Returns the transition taken, or `None` if the current state has no
    /// transition for the event (the state is left unchanged).
    pub fn send(&mut self, event: u32) -> Option<Transition> {
        let transition = self.transition_for(event)?;
        tracing::trace!(
            from = transition.from,
            event,
            to = transition.to,
            "fsm transition"
        );
        self.current = transition.to;
        Some(transition)
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: SmallVec<[Transition; 16]>,
}

impl StateMachineBuilder {
    /// Add a transition
    ///
    /// A later transition with the same `(from, event)` pair replaces an
    /// earlier one.
    pub fn on(mut self, from: StateId, event: u32, to: StateId) -> Self {
        self.transitions
            .retain(|t| !(t.from == from && t.event == event));
        self.transitions.push(Transition { from, event, to });
        self
    }

    /// Finish building
    pub fn build(self) -> StateMachine {
        StateMachine {
            current: self.initial,
            transitions: self.transitions,
        }
    }
}
