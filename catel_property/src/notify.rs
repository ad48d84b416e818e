// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change notification plumbing.
//!
//! Values stored in a property may themselves raise change notifications
//! (child models, observable collections). A model subscribes to such a value
//! through [`ChangeNotifier`] when it is stored and unsubscribes when it is
//! replaced, so a detached child never keeps a handler alive on its former
//! owner.

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::rc::Rc;

/// Identifies one subscription on a [`Subscribers`] list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A structural change to a collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollectionChange {
    /// An item was inserted at `index`.
    Added {
        /// Position of the new item.
        index: usize,
    },
    /// The item at `index` was removed.
    Removed {
        /// Former position of the item.
        index: usize,
    },
    /// The item at `index` was replaced.
    Replaced {
        /// Position of the replaced item.
        index: usize,
    },
    /// All items were removed.
    Cleared,
    /// An item reported a change of its own.
    ItemChanged,
}

/// A notification raised by a change-notifying value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeNotification {
    /// A property of an object changed.
    PropertyChanged {
        /// Name of the property.
        property: &'static str,
    },
    /// A collection changed.
    CollectionChanged(CollectionChange),
}

/// Handler attached to a change-notifying value.
pub type ChangeHandler = Rc<dyn Fn(&ChangeNotification)>;

/// A value that raises [`ChangeNotification`]s.
pub trait ChangeNotifier {
    /// Attaches `handler`. Returns `None` if the value currently has nothing
    /// to subscribe to.
    fn subscribe(&self, handler: ChangeHandler) -> Option<SubscriptionId>;

    /// Detaches a handler. Returns `false` if `id` was not attached.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Returns `true` if the value carries unsaved changes of its own.
    fn is_dirty(&self) -> bool {
        false
    }
}

impl<N: ChangeNotifier> ChangeNotifier for Option<N> {
    fn subscribe(&self, handler: ChangeHandler) -> Option<SubscriptionId> {
        self.as_ref()?.subscribe(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.as_ref().is_some_and(|inner| inner.unsubscribe(id))
    }

    fn is_dirty(&self) -> bool {
        self.as_ref().is_some_and(ChangeNotifier::is_dirty)
    }
}

/// A single-threaded list of event handlers.
///
/// Handlers may subscribe or unsubscribe from inside a handler: [`emit`]
/// invokes a snapshot of the list taken before the first call.
///
/// [`emit`]: Self::emit
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use catel_property::Subscribers;
///
/// let list = Subscribers::<i32>::new();
/// let total = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&total);
/// let id = list.subscribe(Rc::new(move |v: &i32| sink.set(sink.get() + v)));
///
/// list.emit(&5);
/// assert!(list.unsubscribe(id));
/// list.emit(&5);
/// assert_eq!(total.get(), 5);
/// ```
pub struct Subscribers<A: ?Sized> {
    handlers: RefCell<Vec<(SubscriptionId, Rc<dyn Fn(&A)>)>>,
}

impl<A: ?Sized> Subscribers<A> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Attaches a handler.
    pub fn subscribe(&self, handler: Rc<dyn Fn(&A)>) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Detaches a handler.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Invokes every attached handler with `args`.
    pub fn emit(&self, args: &A) {
        let snapshot: Vec<_> = self
            .handlers
            .borrow()
            .iter()
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in snapshot {
            handler(args);
        }
    }

    /// Returns the number of attached handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Returns `true` if no handler is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }
}

impl<A: ?Sized> Default for Subscribers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Subscribers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[test]
    fn subscription_ids_are_unique() {
        let list = Subscribers::<()>::new();
        let a = list.subscribe(Rc::new(|()| {}));
        let b = list.subscribe(Rc::new(|()| {}));
        assert_ne!(a, b);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn unsubscribe_unknown_is_false() {
        let list = Subscribers::<()>::new();
        let id = list.subscribe(Rc::new(|()| {}));
        assert!(list.unsubscribe(id));
        assert!(!list.unsubscribe(id));
        assert!(list.is_empty());
    }

    #[test]
    fn handler_may_unsubscribe_itself_while_emitting() {
        let list = Rc::new(Subscribers::<u8>::new());
        let calls = Rc::new(Cell::new(0));
        let slot = Rc::new(Cell::new(None));

        let (l, c, s) = (Rc::clone(&list), Rc::clone(&calls), Rc::clone(&slot));
        let id = list.subscribe(Rc::new(move |_: &u8| {
            c.set(c.get() + 1);
            if let Some(id) = s.get() {
                l.unsubscribe(id);
            }
        }));
        slot.set(Some(id));

        list.emit(&1);
        list.emit(&2);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn option_notifier_without_value() {
        struct Never;
        impl ChangeNotifier for Never {
            fn subscribe(&self, _: ChangeHandler) -> Option<SubscriptionId> {
                Some(SubscriptionId::next())
            }
            fn unsubscribe(&self, _: SubscriptionId) -> bool {
                true
            }
        }

        let none: Option<Never> = None;
        assert!(none.subscribe(Rc::new(|_| {})).is_none());
        assert!(Some(Never).subscribe(Rc::new(|_| {})).is_some());
    }
}
