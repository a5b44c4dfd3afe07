//! Dropline Core Runtime
//!
//! This crate provides the headless primitives the Dropline components are
//! built on:
//!
//! - **Element Tree**: Taffy-backed element hierarchy with containment queries
//!   and hit testing
//! - **Event Dispatch**: Global listeners with scoped [`ListenerGuard`] release,
//!   and an [`EventRouter`] that turns pointer input into bubbling events
//! - **State Machines**: Small table-driven FSMs for widget interaction states
//! - **Callbacks & Streams**: Typed single-argument callbacks and observable
//!   value streams
//!
//! # Example
//!
//! ```rust
//! use dropline_core::events::{event_types, EventDispatcher};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let dispatcher = EventDispatcher::new();
//! let clicks = Rc::new(Cell::new(0));
//!
//! let clicks_for_listener = Rc::clone(&clicks);
//! let guard = dispatcher.listen(event_types::CLICK, move |_event| {
//!     clicks_for_listener.set(clicks_for_listener.get() + 1);
//! });
//!
//! assert_eq!(dispatcher.listener_count(), 1);
//! drop(guard);
//! assert_eq!(dispatcher.listener_count(), 0);
//! ```

pub mod callback;
pub mod error;
pub mod events;
pub mod fsm;
pub mod router;
pub mod stream;
pub mod tree;

pub use callback::{Callback, CallbackSlot};
pub use error::TreeError;
pub use events::{event_types, Event, EventDispatcher, EventType, ListenerGuard};
pub use fsm::{StateId, StateMachine, StateMachineBuilder, Transition};
pub use router::EventRouter;
pub use stream::{Emitter, Subscription, ValueStream};
pub use tree::{Bounds, ElementId, ElementTree, HitTestResult};
