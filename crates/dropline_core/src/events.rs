//! Events and global event dispatch
//!
//! An [`Event`] carries the element it was aimed at together with the full
//! propagation path (root first, target last), so any observer can answer
//! "did this happen inside element X?" without access to the tree.
//!
//! The [`EventDispatcher`] is the document-level listener registry. Every
//! registration hands back a [`ListenerGuard`]; dropping the guard removes the
//! listener. Components that need to watch interactions for their whole
//! mounted lifetime keep the guard next to their mounted state, which ties
//! the listener to the mount exactly once.
//!
//! # Example
//!
//! ```rust
//! use dropline_core::events::{event_types, Event, EventDispatcher};
//!
//! let dispatcher = EventDispatcher::new();
//! let guard = dispatcher.listen(event_types::CLICK, |event| {
//!     println!("click at {}, {}", event.x, event.y);
//! });
//!
//! dispatcher.dispatch(&Event::new(event_types::CLICK));
//! guard.release();
//! assert_eq!(dispatcher.listener_count(), 0);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::tree::ElementId;

/// Event type identifier
pub type EventType = u32;

/// Built-in event types
pub mod event_types {
    use super::EventType;

    /// Pointer button pressed
    pub const POINTER_DOWN: EventType = 1;
    /// Pointer button released
    pub const POINTER_UP: EventType = 2;
    /// Activation (press + release on the same target)
    pub const CLICK: EventType = 3;
}

/// Callback invoked for an event
pub type EventCallback = Rc<dyn Fn(&Event)>;

/// A routed input event
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// The type of event
    pub event_type: EventType,
    /// The element the event was aimed at, if it hit anything
    pub target: Option<ElementId>,
    /// Propagation path from the root down to the target
    pub path: SmallVec<[ElementId; 8]>,
    /// Pointer position in window coordinates
    pub x: f32,
    pub y: f32,
}

impl Event {
    /// Create an event without a target
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            target: None,
            path: SmallVec::new(),
            x: 0.0,
            y: 0.0,
        }
    }

    /// Set the target and its propagation path (root first)
    pub fn with_path(mut self, path: impl IntoIterator<Item = ElementId>) -> Self {
        self.path = path.into_iter().collect();
        self.target = self.path.last().copied();
        self
    }

    /// Set the pointer position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Whether the target is `element` or one of its descendants
    pub fn is_within(&self, element: ElementId) -> bool {
        self.path.contains(&element)
    }
}

new_key_type! {
    /// Identifier for a registered global listener
    pub struct ListenerId;
}

struct Listener {
    event_type: EventType,
    /// Registration sequence number
    seq: u64,
    callback: EventCallback,
}

#[derive(Default)]
struct ListenerTable {
    listeners: SlotMap<ListenerId, Listener>,
    next_seq: u64,
}

/// Document-level event listener registry
///
/// Cloning the dispatcher yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    table: Rc<RefCell<ListenerTable>>,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an event type
    ///
    /// The listener stays registered until the returned guard is dropped.
    pub fn listen<F>(&self, event_type: EventType, callback: F) -> ListenerGuard
    where
        F: Fn(&Event) + 'static,
    {
        let id = {
            let mut table = self.table.borrow_mut();
            let seq = table.next_seq;
            table.next_seq += 1;
            table.listeners.insert(Listener {
                event_type,
                seq,
                callback: Rc::new(callback),
            })
        };
        tracing::debug!(?id, event_type, "listener registered");

        ListenerGuard {
            table: Rc::downgrade(&self.table),
            id,
        }
    }

    /// Deliver an event to every listener of its type
    ///
    /// Listeners run in registration order. The set of listeners is captured
    /// before the first one runs, so listeners may register or release
    /// guards while being dispatched. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &Event) -> usize {
        let callbacks: SmallVec<[EventCallback; 8]> = {
            let table = self.table.borrow();
            let mut matching: Vec<_> = table
                .listeners
                .iter()
                .filter(|(_, l)| l.event_type == event.event_type)
                .map(|(_, l)| (l.seq, Rc::clone(&l.callback)))
                .collect();
            // Slots are reused after removal, so slot order is not registration order
            matching.sort_by_key(|(seq, _)| *seq);
            matching.into_iter().map(|(_, cb)| cb).collect()
        };

        tracing::trace!(
            event_type = event.event_type,
            listeners = callbacks.len(),
            "dispatching event"
        );

        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Number of live listeners across all event types
    pub fn listener_count(&self) -> usize {
        self.table.borrow().listeners.len()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Scoped registration of a global listener
///
/// Dropping the guard removes the listener. A guard that outlives its
/// dispatcher is inert.
#[must_use = "dropping the guard immediately removes the listener"]
pub struct ListenerGuard {
    table: Weak<RefCell<ListenerTable>>,
    id: ListenerId,
}

impl ListenerGuard {
    /// The id of the guarded listener
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the listener is still registered
    pub fn is_active(&self) -> bool {
        self.table
            .upgrade()
            .map(|table| table.borrow().listeners.contains_key(self.id))
            .unwrap_or(false)
    }

    /// Remove the listener now
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            // Drop the callback after the borrow ends
            let removed = table.borrow_mut().listeners.remove(self.id);
            if removed.is_some() {
                tracing::debug!(id = ?self.id, "listener released");
            }
        }
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
