// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Listen to changes of observable collections.
//!
//! Every collection in this crate keeps one [`Listeners`] list per kind of notification.
//! Registering a callback returns a [`Subscription`]; the callback stays registered for
//! as long as that guard is alive. Callbacks run synchronously, in registration order,
//! from inside the mutating call that caused the flush.
//!
//! For observers that want all notifications of a sequence at once, implement
//! [`SequenceObserver`] and hand it to
//! [`TransactableSequence::attach`](crate::TransactableSequence::attach). The
//! [`recording`] module contains such an observer that writes every notification down in
//! a human readable form, which is mostly useful for tests.

use crate::{change::ChangeRecord, event::CollectionChange, event::Property};
use std::{
    any::Any,
    fmt,
    rc::{Rc, Weak},
};

pub mod recording;

type CallbackRc<E> = Rc<dyn Fn(&E)>;
type CallbackWeak<E> = Weak<dyn Fn(&E)>;

/// A registration-ordered list of callbacks for events of type `E`.
///
/// Callbacks are held weakly; the strong reference lives in the [`Subscription`] handed
/// out by [`Listeners::subscribe`]. Entries whose subscription was dropped are pruned the
/// next time the list is notified.
pub struct Listeners<E: ?Sized> {
    subscribers: Vec<CallbackWeak<E>>,
}

impl<E: ?Sized> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E: ?Sized> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

impl<E: ?Sized + 'static> Listeners<E> {
    /// Registers `callback`. It is called for every event until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe(&mut self, callback: impl Fn(&E) + 'static) -> Subscription {
        let strong: CallbackRc<E> = Rc::new(callback);
        self.subscribers.push(Rc::downgrade(&strong));
        Subscription {
            _guards: vec![Box::new(strong)],
        }
    }
}

impl<E: ?Sized> Listeners<E> {
    /// Calls every live callback with `event` and forgets the dead ones.
    pub fn notify(&mut self, event: &E) {
        // upgrade everything first so a callback dropping another subscription
        // mid-notification does not change who hears about this event
        self.subscribers.retain(|w| w.strong_count() > 0);
        let live: Vec<CallbackRc<E>> = self.subscribers.iter().filter_map(Weak::upgrade).collect();
        for callback in &live {
            callback(event);
        }
    }

    /// Number of registered callbacks, including dropped ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// True if at least one subscription is still alive.
    #[cfg(test)]
    fn has_live(&self) -> bool {
        self.subscribers.iter().any(|w| w.strong_count() > 0)
    }
}

/// Keeps one or more callbacks registered. Dropping it unregisters them.
#[must_use = "dropping a subscription unregisters its callback immediately"]
pub struct Subscription {
    /// Type-erased strong references to the callbacks.
    _guards: Vec<Box<dyn Any>>,
}

impl Subscription {
    /// Bundles several subscriptions so they are released together.
    pub fn merge(subscriptions: impl IntoIterator<Item = Subscription>) -> Subscription {
        Subscription {
            _guards: subscriptions
                .into_iter()
                .flat_map(|sub| sub._guards)
                .collect(),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("callbacks", &self._guards.len())
            .finish()
    }
}

/// Observes every notification a [`TransactableSequence`](crate::TransactableSequence)
/// emits.
///
/// All methods default to doing nothing, so implementors only override what they need.
/// Within one flush the calls arrive as `property_changed` (for [`Property::Len`] if the
/// length changed, then for [`Property::Items`]), `collection_changed`, `records_changed`.
#[expect(unused_variables)]
pub trait SequenceObserver<T> {
    fn property_changed(&mut self, property: Property) {}

    fn collection_changed(&mut self, change: &CollectionChange<T>) {}

    fn records_changed(&mut self, records: &[ChangeRecord<T>]) {}
}

/// An observer that ignores everything.
pub struct DummyObserver;

impl<T> SequenceObserver<T> for DummyObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_in_registration_order() {
        let mut listeners = Listeners::<u32>::default();
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));

        let first = Rc::clone(&seen);
        let _a = listeners.subscribe(move |v| first.borrow_mut().push(("a", *v)));
        let second = Rc::clone(&seen);
        let _b = listeners.subscribe(move |v| second.borrow_mut().push(("b", *v)));

        listeners.notify(&7);
        assert_eq!(*seen.borrow(), [("a", 7), ("b", 7)]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let mut listeners = Listeners::<u32>::default();
        let count = Rc::new(Cell::new(0u32));

        let counter = Rc::clone(&count);
        let sub = listeners.subscribe(move |_| counter.set(counter.get() + 1));
        listeners.notify(&1);
        assert_eq!(count.get(), 1);

        drop(sub);
        assert!(!listeners.has_live());
        assert_eq!(listeners.len(), 1);

        listeners.notify(&2);
        assert_eq!(count.get(), 1);
        // pruned during the notify above
        assert!(listeners.is_empty());
    }

    #[test]
    fn unsized_events() {
        let mut listeners = Listeners::<[u8]>::default();
        let total = Rc::new(Cell::new(0usize));

        let sum = Rc::clone(&total);
        let _sub = listeners.subscribe(move |bytes: &[u8]| sum.set(sum.get() + bytes.len()));
        listeners.notify(&[1, 2, 3][..]);
        assert_eq!(total.get(), 3);
    }

    #[test]
    fn dummy_observer_accepts_everything() {
        let mut seq = crate::TransactableSequence::<u8>::new();
        let observer = Rc::new(std::cell::RefCell::new(DummyObserver));
        let sub = seq.attach(observer);
        assert_eq!(format!("{sub:?}"), "Subscription { callbacks: 3 }");
        seq.add_range([1, 2]);
        seq.clear();
        assert!(seq.is_empty());
    }

    #[test]
    fn merged_subscriptions_release_together() {
        let mut a = Listeners::<u8>::default();
        let mut b = Listeners::<u8>::default();
        let sub = Subscription::merge([a.subscribe(|_| {}), b.subscribe(|_| {})]);
        assert_eq!(format!("{sub:?}"), "Subscription { callbacks: 2 }");
        assert!(a.has_live() && b.has_live());
        drop(sub);
        assert!(!a.has_live() && !b.has_live());
    }
}
