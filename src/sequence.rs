// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Transactable sequences
//!
//! [`TransactableSequence`] is an ordered, indexable container that tells its listeners
//! about every structural change, and that can batch any number of changes into a single
//! notification by wrapping them in a (possibly nested) [`Transaction`].
//!
//! ## How changes flow
//!
//! Every mutation first appends one or more [`ChangeRecord`]s to a pending buffer, then
//! changes the elements, then checks the transaction level. If no transaction is open, the
//! buffer is flushed right away:
//!
//! - the minimal event is picked from the buffered records (see [`CoalescePolicy`]),
//! - [`Property`] listeners hear about `Len` (if the length changed) and `Items`,
//! - minimal-event listeners get the [`CollectionChange`],
//! - detailed-event listeners get the full ordered list of records,
//! - the buffer is cleared.
//!
//! Operations that touch more than one place (`set`, `move_item`, the range operations)
//! wrap themselves in an implicit transaction, so each of them produces exactly one
//! flush however many records it writes.
//!
//! ## Failure
//!
//! Index checks happen before anything is recorded or changed. A call that returns an
//! error leaves the elements, the pending buffer and the transaction level untouched.
//!
//! ## Threading
//!
//! Listeners are reference counted with [`Rc`], which makes the sequence `!Send`. All
//! calls, including opening and closing transactions, happen on one thread.

use crate::{
    change::{self, ChangeAction, ChangeRecord},
    config::SequenceConfig,
    error::SequenceError,
    event::{CoalescePolicy, CollectionChange, Property},
    observer::{Listeners, SequenceObserver, Subscription},
};
use std::{cell::RefCell, fmt, ops::Index, rc::Rc};
use tracing::{debug, trace};

mod coalesce;
mod transaction;

use coalesce::Origin;

pub use transaction::Transaction;

/// An ordered container with observable, transaction-batched mutation.
///
/// ```rust
/// use std::{cell::RefCell, rc::Rc};
/// use transactable::{CollectionChange, TransactableSequence};
///
/// let mut seq = TransactableSequence::<&str>::new();
/// let seen = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = Rc::clone(&seen);
/// let _sub = seq.on_collection_changed(move |change| sink.borrow_mut().push(change.clone()));
///
/// seq.push("a");
/// seq.add_range(["b", "c"]);
///
/// assert_eq!(
///     *seen.borrow(),
///     [
///         CollectionChange::Add { item: "a", index: 0 },
///         CollectionChange::Reset,
///     ]
/// );
/// ```
pub struct TransactableSequence<T> {
    items: Vec<T>,
    /// Number of open transactions. Batching while non-zero.
    level: usize,
    /// Records since the last flush. Reused across flushes.
    pending: Vec<ChangeRecord<T>>,
    /// Length before the first pending record was written.
    len_baseline: usize,
    origin: Origin,
    policy: CoalescePolicy,
    collection_listeners: Listeners<CollectionChange<T>>,
    record_listeners: Listeners<[ChangeRecord<T>]>,
    property_listeners: Listeners<Property>,
}

impl<T> Default for TransactableSequence<T> {
    fn default() -> Self {
        Self::with_config(SequenceConfig::default())
    }
}

impl<T> TransactableSequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SequenceConfig) -> Self {
        Self {
            items: Vec::with_capacity(config.capacity),
            level: 0,
            pending: Vec::new(),
            len_baseline: 0,
            origin: Origin::default(),
            policy: config.coalesce,
            collection_listeners: Listeners::default(),
            record_listeners: Listeners::default(),
            property_listeners: Listeners::default(),
        }
    }

    /// The policy used to shape minimal events.
    pub fn coalesce_policy(&self) -> CoalescePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Consumes the sequence and returns its elements. Listeners are dropped unnotified.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    fn check_index(&self, index: usize) -> Result<(), SequenceError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(SequenceError::OutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    fn check_position(&self, index: usize) -> Result<(), SequenceError> {
        if index <= self.items.len() {
            Ok(())
        } else {
            Err(SequenceError::OutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl<T: PartialEq> TransactableSequence<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// Index of the first element equal to `item`.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.iter().position(|candidate| candidate == item)
    }
}

impl<T: 'static> TransactableSequence<T> {
    /// Registers a listener for minimal events. One call per flush.
    pub fn on_collection_changed(
        &mut self,
        callback: impl Fn(&CollectionChange<T>) + 'static,
    ) -> Subscription {
        self.collection_listeners.subscribe(callback)
    }

    /// Registers a listener for detailed events. One call per flush, after the minimal
    /// event, with every record written since the previous flush.
    pub fn on_records_changed(
        &mut self,
        callback: impl Fn(&[ChangeRecord<T>]) + 'static,
    ) -> Subscription {
        self.record_listeners.subscribe(callback)
    }

    /// Registers a listener for property notifications, which precede the minimal event.
    pub fn on_property_changed(&mut self, callback: impl Fn(&Property) + 'static) -> Subscription {
        self.property_listeners.subscribe(callback)
    }

    /// Registers `observer` for all three kinds of notification.
    pub fn attach<O>(&mut self, observer: Rc<RefCell<O>>) -> Subscription
    where
        O: SequenceObserver<T> + 'static,
    {
        let on_property = Rc::clone(&observer);
        let on_collection = Rc::clone(&observer);
        let on_records = observer;
        Subscription::merge([
            self.on_property_changed(move |property| {
                on_property.borrow_mut().property_changed(*property)
            }),
            self.on_collection_changed(move |change| {
                on_collection.borrow_mut().collection_changed(change)
            }),
            self.on_records_changed(move |records| {
                on_records.borrow_mut().records_changed(records)
            }),
        ])
    }
}

impl<T: Clone> TransactableSequence<T> {
    /// Opens a transaction. Notifications are held back until the returned guard, and
    /// every transaction opened through it, has been dropped.
    pub fn begin_transaction(&mut self) -> Transaction<'_, T> {
        Transaction::new(self)
    }

    /// Runs `f` inside a transaction and returns its result.
    ///
    /// ```rust
    /// use transactable::TransactableSequence;
    ///
    /// let mut seq = TransactableSequence::from(vec![3, 1, 2]);
    /// let removed = seq.transact(|tx| {
    ///     let first = tx.remove_at(0)?;
    ///     tx.push(first * 10);
    ///     Ok::<_, transactable::SequenceError>(first)
    /// })?;
    /// assert_eq!(removed, 3);
    /// assert_eq!(seq.as_slice(), &[1, 2, 30]);
    /// # Ok::<(), transactable::SequenceError>(())
    /// ```
    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Transaction<'_, T>) -> R) -> R {
        let mut tx = self.begin_transaction();
        f(&mut tx)
    }

    /// Inserts `item` so that it ends up at `index`.
    ///
    /// Fails with [`SequenceError::OutOfRange`] if `index > len()`.
    pub fn insert(&mut self, index: usize, item: T) -> Result<(), SequenceError> {
        self.check_position(index)?;
        self.insert_unflushed(index, item);
        self.flush_if_idle();
        Ok(())
    }

    /// Appends `item`.
    pub fn push(&mut self, item: T) {
        let index = self.items.len();
        self.insert_unflushed(index, item);
        self.flush_if_idle();
    }

    /// Removes and returns the element at `index`.
    ///
    /// Fails with [`SequenceError::OutOfRange`] if `index >= len()`.
    pub fn remove_at(&mut self, index: usize) -> Result<T, SequenceError> {
        self.check_index(index)?;
        let removed = self.remove_unflushed(index);
        self.flush_if_idle();
        Ok(removed)
    }

    /// Removes and returns the last element, if any.
    pub fn pop(&mut self) -> Option<T> {
        let index = self.items.len().checked_sub(1)?;
        let removed = self.remove_unflushed(index);
        self.flush_if_idle();
        Some(removed)
    }

    /// Removes the first element for which `is_target` returns true.
    ///
    /// Returns `None`, without recording or emitting anything, if there is no such element.
    pub fn remove_first_by(&mut self, is_target: impl FnMut(&T) -> bool) -> Option<T> {
        let index = self.items.iter().position(is_target)?;
        let removed = self.remove_unflushed(index);
        self.flush_if_idle();
        Some(removed)
    }

    /// Removes the first element equal to `item`. Returns whether one was found.
    pub fn remove_by_value(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_first_by(|candidate| candidate == item).is_some()
    }

    /// Replaces the element at `index` and returns the old one.
    ///
    /// Recorded as a removal of the old element followed by an insertion of the new one
    /// at the same index. Flushed on its own, that pair is a single
    /// [`CollectionChange::Replace`]; batched with anything else it is part of a `Reset`.
    pub fn set(&mut self, index: usize, item: T) -> Result<T, SequenceError> {
        self.check_index(index)?;
        let lone = self.pending.is_empty();
        self.open();
        self.record(ChangeRecord::single(
            ChangeAction::Removed,
            index,
            self.items[index].clone(),
        ));
        self.record(ChangeRecord::single(
            ChangeAction::Inserted,
            index,
            item.clone(),
        ));
        let old = std::mem::replace(&mut self.items[index], item);
        if lone {
            self.origin = Origin::Replacement;
        }
        self.close();
        Ok(old)
    }

    /// Moves the element at `old_index` so that it ends up at `new_index`.
    ///
    /// Both indices must address existing elements. Moving an element onto itself is a
    /// no-op and emits nothing.
    pub fn move_item(&mut self, old_index: usize, new_index: usize) -> Result<(), SequenceError> {
        self.check_index(old_index)?;
        self.check_index(new_index)?;
        if old_index == new_index {
            return Ok(());
        }
        self.open();
        let item = self.remove_unflushed(old_index);
        self.insert_unflushed(new_index, item);
        self.close();
        Ok(())
    }

    /// Inserts `items` starting at `index`, as a single record and a single flush.
    ///
    /// An empty `items` is a no-op and emits nothing.
    pub fn insert_range(
        &mut self,
        index: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), SequenceError> {
        self.check_position(index)?;
        self.splice_unflushed(index, items.into_iter().collect());
        Ok(())
    }

    /// Appends `items`, as a single record and a single flush.
    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) {
        let index = self.items.len();
        self.splice_unflushed(index, items.into_iter().collect());
    }

    /// Removes `count` elements starting at `index` and returns them.
    ///
    /// `index` must address an existing element even when `count` is zero. A zero `count`
    /// removes nothing and emits nothing. Fails with [`SequenceError::RangeOutOfRange`] if
    /// the range reaches past the end, and with [`SequenceError::InvalidArgument`] if
    /// `index + count` does not fit in a `usize`.
    pub fn remove_range(&mut self, index: usize, count: usize) -> Result<Vec<T>, SequenceError> {
        self.check_index(index)?;
        let end = index
            .checked_add(count)
            .ok_or(SequenceError::InvalidArgument("index + count overflows"))?;
        if end > self.items.len() {
            return Err(SequenceError::RangeOutOfRange {
                index,
                count,
                len: self.items.len(),
            });
        }
        let Some(record) = ChangeRecord::removed(index, self.items[index..end].iter().cloned())
        else {
            return Ok(Vec::new());
        };
        self.open();
        self.record(record);
        let removed = self.items.drain(index..end).collect();
        self.close();
        Ok(removed)
    }

    /// Removes every element, as a single record. Does nothing if already empty.
    pub fn clear(&mut self) {
        let Some(record) = ChangeRecord::removed(0, self.items.iter().cloned()) else {
            return;
        };
        self.record(record);
        self.items.clear();
        self.flush_if_idle();
    }

    fn insert_unflushed(&mut self, index: usize, item: T) {
        self.record(ChangeRecord::single(
            ChangeAction::Inserted,
            index,
            item.clone(),
        ));
        self.items.insert(index, item);
    }

    fn remove_unflushed(&mut self, index: usize) -> T {
        self.record(ChangeRecord::single(
            ChangeAction::Removed,
            index,
            self.items[index].clone(),
        ));
        self.items.remove(index)
    }

    fn splice_unflushed(&mut self, index: usize, items: Vec<T>) {
        let Some(record) = ChangeRecord::inserted(index, items.iter().cloned()) else {
            return;
        };
        self.open();
        self.record(record);
        self.items.splice(index..index, items);
        self.close();
    }

    fn record(&mut self, record: ChangeRecord<T>) {
        if self.pending.is_empty() {
            self.len_baseline = self.items.len();
        }
        self.origin = Origin::Mutations;
        self.pending.push(record);
    }

    pub(crate) fn open(&mut self) {
        self.level += 1;
        trace!(level = self.level, "transaction opened");
    }

    pub(crate) fn close(&mut self) {
        debug_assert!(self.level > 0, "closing a transaction that was never opened");
        self.level = self.level.saturating_sub(1);
        trace!(level = self.level, "transaction closed");
        self.flush_if_idle();
    }

    fn flush_if_idle(&mut self) {
        if self.level == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let origin = std::mem::take(&mut self.origin);
        let Some(minimal) = coalesce::minimal_change(&self.pending, origin, self.policy) else {
            return;
        };
        let mut records = std::mem::take(&mut self.pending);
        debug!(
            records = records.len(),
            items = change::touched_items(&records),
            event = minimal.kind(),
            "flushing sequence changes"
        );

        if self.items.len() != self.len_baseline {
            self.property_listeners.notify(&Property::Len);
        }
        self.property_listeners.notify(&Property::Items);
        self.collection_listeners.notify(&minimal);
        self.record_listeners.notify(records.as_slice());

        // hand the allocation back for the next batch
        records.clear();
        self.pending = records;
    }
}

impl<T> Index<usize> for TransactableSequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> From<Vec<T>> for TransactableSequence<T> {
    /// Wraps existing elements. Nothing is emitted for them.
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

impl<T> FromIterator<T> for TransactableSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: Clone> Extend<T> for TransactableSequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.add_range(iter);
    }
}

impl<'a, T> IntoIterator for &'a TransactableSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for TransactableSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactableSequence")
            .field("items", &self.items)
            .field("level", &self.level)
            .field("pending", &self.pending.len())
            .finish()
    }
}
