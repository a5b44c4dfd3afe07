//! Typed single-argument callbacks
//!
//! [`Callback<A>`] is a cheap-to-clone function reference with a fixed
//! argument type. [`CallbackSlot<A>`] holds one callback that starts out as a
//! no-op and can be replaced at any time, so code that fires notifications
//! never has to check whether anyone registered yet.
//!
//! ```rust
//! use dropline_core::callback::{Callback, CallbackSlot};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let slot: CallbackSlot<String> = CallbackSlot::new();
//! slot.call("ignored".to_string()); // no-op until registration
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let seen_clone = Rc::clone(&seen);
//! slot.replace(Callback::new(move |value: String| seen_clone.borrow_mut().push(value)));
//! slot.call("b".to_string());
//!
//! assert_eq!(*seen.borrow(), vec!["b".to_string()]);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A reference-counted callback taking a single argument
pub struct Callback<A> {
    f: Rc<dyn Fn(A)>,
}

impl<A> Callback<A> {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// A callback that ignores its argument
    pub fn noop() -> Self
    where
        A: 'static,
    {
        Self::new(|_| {})
    }

    /// Invoke the callback
    pub fn call(&self, arg: A) {
        (self.f)(arg)
    }
}

impl<A> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self {
            f: Rc::clone(&self.f),
        }
    }
}

impl<A: 'static> Default for Callback<A> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<A> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

impl<A, F> From<F> for Callback<A>
where
    F: Fn(A) + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Replaceable callback holder, initialized to a no-op
///
/// The current callback is cloned out before it is invoked, so a callback may
/// safely replace the slot it was called from.
pub struct CallbackSlot<A> {
    current: RefCell<Callback<A>>,
}

impl<A: 'static> CallbackSlot<A> {
    /// Create a slot holding a no-op callback
    pub fn new() -> Self {
        Self {
            current: RefCell::new(Callback::noop()),
        }
    }

    /// Replace the held callback
    pub fn replace(&self, callback: Callback<A>) {
        *self.current.borrow_mut() = callback;
    }

    /// Get a handle to the current callback
    pub fn get(&self) -> Callback<A> {
        self.current.borrow().clone()
    }

    /// Invoke the current callback
    pub fn call(&self, arg: A) {
        let callback = self.get();
        callback.call(arg);
    }
}

impl<A: 'static> Default for CallbackSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for CallbackSlot<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSlot").finish_non_exhaustive()
    }
}
