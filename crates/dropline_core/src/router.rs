//! Event routing from pointer input to elements
//!
//! Bridges raw pointer input to element handlers and document-level
//! listeners.
//!
//! # Architecture
//!
//! ```text
//! Pointer input (x, y) or a known element
//!     ↓
//! EventRouter (hit testing, propagation path)
//!     ↓
//! Element handlers, bubbling target → root
//!     ↓
//! EventDispatcher (document-level listeners)
//! ```
//!
//! Every activation is delivered as `POINTER_DOWN`, `POINTER_UP`, then
//! `CLICK`, each going through both phases before the next one starts.

use crate::events::{event_types, Event, EventDispatcher, EventType};
use crate::tree::{ElementId, ElementTree};

/// Routes pointer input to element handlers and global listeners
pub struct EventRouter {
    dispatcher: EventDispatcher,
    /// Last pointer position
    pointer: (f32, f32),
}

impl EventRouter {
    /// Create a router delivering document-level events to `dispatcher`
    pub fn new(dispatcher: EventDispatcher) -> Self {
        Self {
            dispatcher,
            pointer: (0.0, 0.0),
        }
    }

    /// The dispatcher that receives document-level events
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Click at a point; the target is whatever is on top there
    ///
    /// Returns the `CLICK` event that was delivered.
    pub fn click_at(&mut self, tree: &ElementTree, x: f32, y: f32) -> Event {
        self.pointer = (x, y);
        let path = tree
            .hit_test(x, y)
            .map(|hit| hit.ancestors)
            .unwrap_or_default();
        self.activate(tree, path, x, y)
    }

    /// Click the center of a known element
    pub fn click_element(&mut self, tree: &ElementTree, element: ElementId) -> Event {
        let (x, y) = tree
            .bounds(element)
            .map(|b| b.center())
            .unwrap_or(self.pointer);
        self.pointer = (x, y);
        let path = tree.ancestors(element);
        self.activate(tree, path, x, y)
    }

    /// Click that lands on nothing in the tree
    pub fn click_outside(&mut self, tree: &ElementTree) -> Event {
        self.activate(tree, Vec::new(), -1.0, -1.0)
    }

    fn activate(&mut self, tree: &ElementTree, path: Vec<ElementId>, x: f32, y: f32) -> Event {
        self.route(tree, event_types::POINTER_DOWN, &path, x, y);
        self.route(tree, event_types::POINTER_UP, &path, x, y);
        self.route(tree, event_types::CLICK, &path, x, y)
    }

    /// Deliver one event through the element and document phases
    pub fn route(
        &self,
        tree: &ElementTree,
        event_type: EventType,
        path: &[ElementId],
        x: f32,
        y: f32,
    ) -> Event {
        let event = Event::new(event_type)
            .with_path(path.iter().copied())
            .at(x, y);

        tracing::trace!(event_type, target = ?event.target, "routing event");

        // Bubble: target first, root last
        for &element in path.iter().rev() {
            for handler in tree.handlers(element, event_type) {
                handler(&event);
            }
        }

        self.dispatcher.dispatch(&event);
        event
    }
}
