//! Observable values
//!
//! [`Emitter<T>`] is a plain event stream: subscribers are called with every
//! emitted value. [`ValueStream<T>`] additionally remembers the latest value
//! and replays it to new subscribers.
//!
//! Subscriptions are scoped: the [`Subscription`] returned by `subscribe`
//! unsubscribes when dropped.
//!
//! ```rust
//! use dropline_core::stream::ValueStream;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let selected = ValueStream::new(String::new());
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let seen_clone = Rc::clone(&seen);
//! let _sub = selected.subscribe(move |v: &String| seen_clone.borrow_mut().push(v.clone()));
//! selected.next("apple".to_string());
//!
//! assert_eq!(*seen.borrow(), vec!["".to_string(), "apple".to_string()]);
//! assert_eq!(selected.get(), "apple");
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifier for a stream subscription
    pub struct SubscriptionId;
}

struct Subscriber<T> {
    /// Subscription sequence number
    seq: u64,
    callback: Rc<dyn Fn(&T)>,
}

struct Subscribers<T> {
    entries: SlotMap<SubscriptionId, Subscriber<T>>,
    next_seq: u64,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            entries: SlotMap::with_key(),
            next_seq: 0,
        }
    }
}

/// Trait object used by [`Subscription`] to unsubscribe without knowing `T`
trait Unsubscribe {
    fn unsubscribe(&self, id: SubscriptionId);
}

impl<T> Unsubscribe for RefCell<Subscribers<T>> {
    fn unsubscribe(&self, id: SubscriptionId) {
        let removed = self.borrow_mut().entries.remove(id);
        drop(removed);
    }
}

/// A multicast stream of values
pub struct Emitter<T> {
    subscribers: Rc<RefCell<Subscribers<T>>>,
}

impl<T: 'static> Emitter<T> {
    /// Create an emitter with no subscribers
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    /// Subscribe to emitted values
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let id = {
            let mut subs = self.subscribers.borrow_mut();
            let seq = subs.next_seq;
            subs.next_seq += 1;
            subs.entries.insert(Subscriber {
                seq,
                callback: Rc::new(callback),
            })
        };

        let source: Rc<dyn Unsubscribe> = self.subscribers.clone();
        Subscription {
            source: Rc::downgrade(&source),
            id,
        }
    }

    /// Deliver a value to every subscriber in subscription order
    pub fn emit(&self, value: &T) {
        let callbacks: Vec<Rc<dyn Fn(&T)>> = {
            let subs = self.subscribers.borrow();
            let mut entries: Vec<_> = subs
                .entries
                .values()
                .map(|s| (s.seq, Rc::clone(&s.callback)))
                .collect();
            entries.sort_by_key(|(seq, _)| *seq);
            entries.into_iter().map(|(_, cb)| cb).collect()
        };
        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().entries.len()
    }
}

impl<T> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscribers", &self.subscribers.borrow().entries.len())
            .finish()
    }
}

/// Handle that unsubscribes when dropped
#[must_use = "dropping the subscription immediately unsubscribes"]
pub struct Subscription {
    source: Weak<dyn Unsubscribe>,
    id: SubscriptionId,
}

impl Subscription {
    /// Whether the source stream is still alive
    pub fn is_active(&self) -> bool {
        self.source.upgrade().is_some()
    }

    /// Unsubscribe now
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// A stream that holds a current value
///
/// New subscribers are called immediately with the current value.
pub struct ValueStream<T> {
    current: Rc<RefCell<T>>,
    emitter: Emitter<T>,
}

impl<T: Clone + 'static> ValueStream<T> {
    /// Create a stream with an initial value
    pub fn new(initial: T) -> Self {
        Self {
            current: Rc::new(RefCell::new(initial)),
            emitter: Emitter::new(),
        }
    }

    /// The current value
    pub fn get(&self) -> T {
        self.current.borrow().clone()
    }

    /// Replace the current value and notify subscribers
    pub fn next(&self, value: T) {
        *self.current.borrow_mut() = value.clone();
        self.emitter.emit(&value);
    }

    /// Subscribe, receiving the current value right away
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + 'static,
    {
        let current = self.get();
        callback(&current);
        self.emitter.subscribe(callback)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.emitter.subscriber_count()
    }
}

impl<T> Clone for ValueStream<T> {
    fn clone(&self) -> Self {
        Self {
            current: Rc::clone(&self.current),
            emitter: self.emitter.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueStream")
            .field("current", &self.current.borrow())
            .field("emitter", &self.emitter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscribers_in_order() {
        let emitter: Emitter<u32> = Emitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let log_a = Rc::clone(&log);
        let _a = emitter.subscribe(move |v| log_a.borrow_mut().push(("a", *v)));
        let log_b = Rc::clone(&log);
        let _b = emitter.subscribe(move |v| log_b.borrow_mut().push(("b", *v)));

        emitter.emit(&7);
        assert_eq!(*log.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let emitter: Emitter<u32> = Emitter::new();
        let calls = Rc::new(Cell::new(0));

        let calls_clone = Rc::clone(&calls);
        let sub = emitter.subscribe(move |_| calls_clone.set(calls_clone.get() + 1));
        emitter.emit(&1);
        assert_eq!(emitter.subscriber_count(), 1);

        sub.unsubscribe();
        emitter.emit(&2);
        assert_eq!(calls.get(), 1);
        assert_eq!(emitter.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_emitter() {
        let emitter: Emitter<u32> = Emitter::new();
        let sub = emitter.subscribe(|_| {});
        assert!(sub.is_active());
        drop(emitter);
        assert!(!sub.is_active());
        drop(sub);
    }

    #[test]
    fn test_value_stream_replays_current() {
        let stream = ValueStream::new(1u32);
        stream.next(2);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = stream.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        stream.next(3);
        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(stream.get(), 3);
    }

    #[test]
    fn test_subscriber_may_emit_reentrantly() {
        let stream = ValueStream::new(0u32);
        let inner = stream.clone();
        let _sub = stream.subscribe(move |v| {
            if *v == 1 {
                inner.next(2);
            }
        });

        stream.next(1);
        assert_eq!(stream.get(), 2);
    }
}
