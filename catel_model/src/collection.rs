// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A shared list raising collection change notifications.

use core::cell::{Ref, RefCell};
use core::fmt;
use std::rc::Rc;

use catel_property::{
    ChangeHandler, ChangeNotification, ChangeNotifier, CollectionChange, ErasedValue,
    PropertyDescriptorBuilder, Subscribers, SubscriptionId,
};

struct Inner<T> {
    items: RefCell<Vec<T>>,
    subscribers: Subscribers<ChangeNotification>,
    tracker: RefCell<Option<ItemTracker<T>>>,
}

/// Subscriptions to change-notifying items, parallel to the item list.
struct ItemTracker<T> {
    notifier: fn(&T) -> &dyn ChangeNotifier,
    handler: ChangeHandler,
    subscriptions: Vec<Option<SubscriptionId>>,
}

impl<T> ItemTracker<T> {
    fn attach(&self, item: &T) -> Option<SubscriptionId> {
        (self.notifier)(item).subscribe(Rc::clone(&self.handler))
    }

    fn detach(&self, item: &T, id: Option<SubscriptionId>) {
        if let Some(id) = id {
            (self.notifier)(item).unsubscribe(id);
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        if let Some(tracker) = self.tracker.get_mut().take() {
            for (item, id) in self.items.get_mut().iter().zip(&tracker.subscriptions) {
                tracker.detach(item, *id);
            }
        }
    }
}

fn as_notifier<T: ChangeNotifier>(item: &T) -> &dyn ChangeNotifier {
    item
}

/// A list with reference semantics that reports structural changes.
///
/// Clones share the same items. Equality is identity, so storing the same
/// collection in a model property again is a no-op while mutating it in place
/// reaches the owning model through [`ChangeNotifier`].
///
/// Items that notify changes of their own, such as [`Shared`](crate::Shared)
/// models, are observed once [`track_items`](Self::track_items) is called or
/// the collection is stored in a property registered with
/// [`observable_items`](ObservableItems::observable_items). Their changes are
/// raised as [`CollectionChange::ItemChanged`] and a dirty item makes the
/// collection dirty.
///
/// ```rust
/// use catel_model::ObservableCollection;
///
/// let names = ObservableCollection::new();
/// let alias = names.clone();
/// names.push("Alice");
/// assert_eq!(alias.len(), 1);
/// assert_eq!(alias, names);
/// assert_ne!(ObservableCollection::from(vec!["Alice"]), names);
/// ```
pub struct ObservableCollection<T> {
    inner: Rc<Inner<T>>,
}

impl<T> ObservableCollection<T> {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::from(Vec::new())
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    /// Returns `true` if item changes are observed.
    #[must_use]
    pub fn is_tracking_items(&self) -> bool {
        self.inner.tracker.borrow().is_some()
    }

    /// Borrows the items.
    ///
    /// # Panics
    ///
    /// Panics if called from a change handler of this collection while it is
    /// being mutated.
    #[must_use]
    pub fn items(&self) -> Ref<'_, [T]> {
        Ref::map(self.inner.items.borrow(), Vec::as_slice)
    }

    /// Appends an item.
    pub fn push(&self, item: T) {
        let index = {
            let mut items = self.inner.items.borrow_mut();
            items.push(item);
            let index = items.len() - 1;
            self.track_inserted(index, &items[index]);
            index
        };
        self.raise(CollectionChange::Added { index });
    }

    /// Inserts an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&self, index: usize, item: T) {
        {
            let mut items = self.inner.items.borrow_mut();
            items.insert(index, item);
            self.track_inserted(index, &items[index]);
        }
        self.raise(CollectionChange::Added { index });
    }

    /// Removes and returns the item at `index`, or `None` if out of bounds.
    pub fn remove(&self, index: usize) -> Option<T> {
        let removed = {
            let mut items = self.inner.items.borrow_mut();
            (index < items.len()).then(|| items.remove(index))
        };
        if let Some(item) = &removed {
            if let Some(tracker) = self.inner.tracker.borrow_mut().as_mut() {
                let id = tracker.subscriptions.remove(index);
                tracker.detach(item, id);
            }
            self.raise(CollectionChange::Removed { index });
        }
        removed
    }

    /// Replaces the item at `index`, returning the previous one, or `None` if
    /// out of bounds.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        let previous = {
            let mut items = self.inner.items.borrow_mut();
            let previous = items
                .get_mut(index)
                .map(|slot| core::mem::replace(slot, item));
            if let Some(previous) = &previous
                && let Some(tracker) = self.inner.tracker.borrow_mut().as_mut()
            {
                tracker.detach(previous, tracker.subscriptions[index]);
                tracker.subscriptions[index] = tracker.attach(&items[index]);
            }
            previous
        };
        if previous.is_some() {
            self.raise(CollectionChange::Replaced { index });
        }
        previous
    }

    /// Removes every item.
    pub fn clear(&self) {
        let removed = core::mem::take(&mut *self.inner.items.borrow_mut());
        if let Some(tracker) = self.inner.tracker.borrow_mut().as_mut() {
            let ids = core::mem::take(&mut tracker.subscriptions);
            for (item, id) in removed.iter().zip(ids) {
                tracker.detach(item, id);
            }
        }
        if !removed.is_empty() {
            self.raise(CollectionChange::Cleared);
        }
    }

    fn track_inserted(&self, index: usize, item: &T) {
        if let Some(tracker) = self.inner.tracker.borrow_mut().as_mut() {
            let id = tracker.attach(item);
            tracker.subscriptions.insert(index, id);
        }
    }

    fn raise(&self, change: CollectionChange) {
        self.inner.raise(change);
    }
}

impl<T> Inner<T> {
    fn raise(&self, change: CollectionChange) {
        self.subscribers
            .emit(&ChangeNotification::CollectionChanged(change));
    }
}

impl<T: ChangeNotifier + 'static> ObservableCollection<T> {
    /// Starts observing the items, current and future.
    ///
    /// Calling it again does nothing. Clones share the setting.
    pub fn track_items(&self) {
        let mut slot = self.inner.tracker.borrow_mut();
        if slot.is_some() {
            return;
        }
        let inner = Rc::downgrade(&self.inner);
        let handler: ChangeHandler = Rc::new(move |_: &ChangeNotification| {
            if let Some(inner) = inner.upgrade() {
                inner.raise(CollectionChange::ItemChanged);
            }
        });
        let mut tracker = ItemTracker {
            notifier: as_notifier::<T>,
            handler,
            subscriptions: Vec::new(),
        };
        let subscriptions = self
            .inner
            .items
            .borrow()
            .iter()
            .map(|item| tracker.attach(item))
            .collect::<Vec<_>>();
        tracker.subscriptions = subscriptions;
        *slot = Some(tracker);
    }
}

impl<T: Clone> ObservableCollection<T> {
    /// Returns a copy of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.items.borrow().get(index).cloned()
    }

    /// Copies the items into a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.items.borrow().clone()
    }
}

impl<T> From<Vec<T>> for ObservableCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(Inner {
                items: RefCell::new(items),
                subscribers: Subscribers::new(),
                tracker: RefCell::new(None),
            }),
        }
    }
}

impl<T> FromIterator<T> for ObservableCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T> Default for ObservableCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObservableCollection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for ObservableCollection<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for ObservableCollection<T> {}

impl<T: fmt::Debug> fmt::Debug for ObservableCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.items.try_borrow() {
            Ok(items) => f.debug_list().entries(items.iter()).finish(),
            Err(_) => f.write_str("ObservableCollection(<borrowed>)"),
        }
    }
}

impl<T> ChangeNotifier for ObservableCollection<T> {
    fn subscribe(&self, handler: ChangeHandler) -> Option<SubscriptionId> {
        Some(self.inner.subscribers.subscribe(handler))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.unsubscribe(id)
    }

    fn is_dirty(&self) -> bool {
        let Ok(tracker) = self.inner.tracker.try_borrow() else {
            return false;
        };
        let Some(tracker) = tracker.as_ref() else {
            return false;
        };
        self.inner
            .items
            .try_borrow()
            .is_ok_and(|items| items.iter().any(|item| (tracker.notifier)(item).is_dirty()))
    }
}

/// Registers a collection property whose items are observed as well.
///
/// ```rust
/// use catel_model::{ObservableCollection, ObservableItems, Property, PropertyDescriptorBuilder};
/// # use catel_model::{Model, ModelBase, ModelType, PropertyRegistrar, Shared};
/// # #[derive(Debug)]
/// # struct Line { base: ModelBase }
/// # impl ModelType for Line {
/// #     fn register_properties(_: &mut PropertyRegistrar) {}
/// # }
/// # impl Model for Line {
/// #     fn model(&self) -> &ModelBase { &self.base }
/// #     fn model_mut(&mut self) -> &mut ModelBase { &mut self.base }
/// # }
///
/// const LINES: Property<ObservableCollection<Shared<Line>>> = Property::new("Lines");
///
/// let lines = PropertyDescriptorBuilder::with_factory(LINES, ObservableCollection::new)
///     .observable_items()
///     .build();
/// assert!(lines.is_observable());
/// ```
pub trait ObservableItems {
    /// Marks the property observable and tracks the items of every
    /// collection stored in it.
    #[must_use]
    fn observable_items(self) -> Self;
}

impl<U> ObservableItems for PropertyDescriptorBuilder<ObservableCollection<U>>
where
    U: ChangeNotifier + fmt::Debug + 'static,
{
    fn observable_items(self) -> Self {
        self.observable_with(tracked_collection::<U>)
    }
}

fn tracked_collection<U: ChangeNotifier + 'static>(value: &ErasedValue) -> Option<&dyn ChangeNotifier> {
    let collection = value.downcast_ref::<ObservableCollection<U>>()?;
    collection.track_items();
    Some(collection as &dyn ChangeNotifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn recorded<T>(collection: &ObservableCollection<T>) -> Rc<RefCell<Vec<ChangeNotification>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        collection.subscribe(Rc::new(move |n: &ChangeNotification| sink.borrow_mut().push(*n)));
        seen
    }

    #[test]
    fn mutations_raise_notifications() {
        let list = ObservableCollection::new();
        let seen = recorded(&list);
        list.push(1);
        list.insert(0, 0);
        assert_eq!(list.set(1, 5), Some(1));
        assert_eq!(list.remove(0), Some(0));
        list.clear();

        let changes: Vec<_> = seen
            .borrow()
            .iter()
            .map(|n| match n {
                ChangeNotification::CollectionChanged(change) => *change,
                ChangeNotification::PropertyChanged { .. } => panic!("unexpected {n:?}"),
            })
            .collect();
        assert_eq!(
            changes,
            [
                CollectionChange::Added { index: 0 },
                CollectionChange::Added { index: 0 },
                CollectionChange::Replaced { index: 1 },
                CollectionChange::Removed { index: 0 },
                CollectionChange::Cleared,
            ]
        );
    }

    #[test]
    fn out_of_bounds_is_silent() {
        let list = ObservableCollection::from(vec![1]);
        let seen = recorded(&list);
        assert_eq!(list.remove(3), None);
        assert_eq!(list.set(3, 0), None);
        ObservableCollection::<i32>::new().clear();
        assert!(seen.borrow().is_empty());
        assert_eq!(list.to_vec(), [1]);
    }

    #[test]
    fn handlers_may_read_the_collection() {
        let list = ObservableCollection::new();
        let alias = list.clone();
        let lengths = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lengths);
        list.subscribe(Rc::new(move |_: &ChangeNotification| sink.borrow_mut().push(alias.len())));
        list.push(7);
        list.push(8);
        assert_eq!(*lengths.borrow(), [1, 2]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let list = ObservableCollection::new();
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let id = list
            .subscribe(Rc::new(move |_: &ChangeNotification| *sink.borrow_mut() += 1))
            .unwrap();
        list.push(1);
        assert!(list.unsubscribe(id));
        list.push(2);
        assert_eq!(*seen.borrow(), 1);
        assert_eq!(list.get(1), Some(2));
    }

    #[derive(Clone, Debug, Default)]
    struct Flag {
        subscribers: Rc<Subscribers<ChangeNotification>>,
        dirty: Rc<Cell<bool>>,
    }

    impl Flag {
        fn touch(&self) {
            self.dirty.set(true);
            self.subscribers
                .emit(&ChangeNotification::PropertyChanged { property: "Value" });
        }
    }

    impl ChangeNotifier for Flag {
        fn subscribe(&self, handler: ChangeHandler) -> Option<SubscriptionId> {
            Some(self.subscribers.subscribe(handler))
        }

        fn unsubscribe(&self, id: SubscriptionId) -> bool {
            self.subscribers.unsubscribe(id)
        }

        fn is_dirty(&self) -> bool {
            self.dirty.get()
        }
    }

    #[test]
    fn untracked_items_are_not_observed() {
        let list = ObservableCollection::new();
        let item = Flag::default();
        list.push(item.clone());
        item.touch();
        assert!(item.subscribers.is_empty());
        assert!(!list.is_tracking_items());
        assert!(!list.is_dirty());
    }

    #[test]
    fn tracked_items_forward_changes_and_dirty_flags() {
        let list = ObservableCollection::new();
        let first = Flag::default();
        list.push(first.clone());
        list.track_items();
        list.track_items();
        assert_eq!(first.subscribers.len(), 1);

        let second = Flag::default();
        list.insert(0, second.clone());
        let seen = recorded(&list);

        first.touch();
        assert_eq!(
            *seen.borrow(),
            [ChangeNotification::CollectionChanged(CollectionChange::ItemChanged)]
        );
        assert!(list.is_dirty());

        assert!(list.remove(1).is_some());
        assert!(first.subscribers.is_empty());
        assert!(!list.is_dirty());

        let third = Flag::default();
        list.set(0, third.clone());
        assert!(second.subscribers.is_empty());
        assert_eq!(third.subscribers.len(), 1);

        seen.borrow_mut().clear();
        second.touch();
        assert!(seen.borrow().is_empty());

        list.clear();
        assert!(third.subscribers.is_empty());
        third.touch();
        assert!(!list.is_dirty());
    }

    #[test]
    fn dropping_a_tracking_collection_detaches_items() {
        let item = Flag::default();
        {
            let list = ObservableCollection::from(vec![item.clone()]);
            list.track_items();
            assert_eq!(item.subscribers.len(), 1);
        }
        assert!(item.subscribers.is_empty());
    }
}
