// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::TransactableSequence;
use crate::error::SequenceError;
use std::{fmt, ops::Deref};

/// Scoped transaction over a [`TransactableSequence`].
///
/// Created by [`TransactableSequence::begin_transaction`]. While the guard is alive the
/// sequence records changes but emits nothing; dropping the guard closes the transaction,
/// and if it was the outermost one, everything recorded since it opened is flushed as a
/// single minimal event plus one detailed event.
///
/// The guard dereferences to the sequence for reading, and offers the same mutations as
/// the sequence itself, including opening nested transactions:
///
/// ```rust
/// use transactable::TransactableSequence;
///
/// let mut seq = TransactableSequence::from(vec![1, 2, 3]);
/// {
///     let mut tx = seq.begin_transaction();
///     tx.push(4);
///     {
///         let mut inner = tx.begin_transaction();
///         inner.remove_at(0)?;
///     } // still batching: the outer transaction is open
///     tx.push(5);
/// } // one flush here
/// assert_eq!(seq.as_slice(), &[2, 3, 4, 5]);
/// # Ok::<(), transactable::SequenceError>(())
/// ```
///
/// The guard never hands out `&mut TransactableSequence`, so the sequence it closes on drop
/// is always the one it opened:
///
/// ```compile_fail
/// use transactable::TransactableSequence;
///
/// let mut seq = TransactableSequence::from(vec![1]);
/// let mut other = TransactableSequence::new();
/// let mut tx = seq.begin_transaction();
/// std::mem::swap(&mut *tx, &mut other);
/// ```
///
/// The level is decremented exactly once whichever way the guard goes away: end of scope,
/// early return through `?`, or unwinding. A listener that panics while the guard is
/// dropped during unwinding aborts the process, as any panic inside `Drop` would.
#[must_use = "dropping a transaction closes it immediately"]
pub struct Transaction<'a, T: Clone> {
    seq: &'a mut TransactableSequence<T>,
}

impl<'a, T: Clone> Transaction<'a, T> {
    pub(super) fn new(seq: &'a mut TransactableSequence<T>) -> Self {
        seq.open();
        Self { seq }
    }
}

impl<T: Clone> Deref for Transaction<'_, T> {
    type Target = TransactableSequence<T>;

    fn deref(&self) -> &Self::Target {
        self.seq
    }
}

/// Forwards to the methods of the same name on [`TransactableSequence`].
impl<T: Clone> Transaction<'_, T> {
    /// Opens a nested transaction. Nothing is flushed when it closes, only when `self` and
    /// every other enclosing transaction have closed too.
    pub fn begin_transaction(&mut self) -> Transaction<'_, T> {
        self.seq.begin_transaction()
    }

    pub fn transact<R>(&mut self, f: impl FnOnce(&mut Transaction<'_, T>) -> R) -> R {
        self.seq.transact(f)
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<(), SequenceError> {
        self.seq.insert(index, item)
    }

    pub fn push(&mut self, item: T) {
        self.seq.push(item)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T, SequenceError> {
        self.seq.remove_at(index)
    }

    pub fn pop(&mut self) -> Option<T> {
        self.seq.pop()
    }

    pub fn remove_first_by(&mut self, is_target: impl FnMut(&T) -> bool) -> Option<T> {
        self.seq.remove_first_by(is_target)
    }

    pub fn remove_by_value(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.seq.remove_by_value(item)
    }

    pub fn set(&mut self, index: usize, item: T) -> Result<T, SequenceError> {
        self.seq.set(index, item)
    }

    pub fn move_item(&mut self, old_index: usize, new_index: usize) -> Result<(), SequenceError> {
        self.seq.move_item(old_index, new_index)
    }

    pub fn insert_range(
        &mut self,
        index: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Result<(), SequenceError> {
        self.seq.insert_range(index, items)
    }

    pub fn add_range(&mut self, items: impl IntoIterator<Item = T>) {
        self.seq.add_range(items)
    }

    pub fn remove_range(&mut self, index: usize, count: usize) -> Result<Vec<T>, SequenceError> {
        self.seq.remove_range(index, count)
    }

    pub fn clear(&mut self) {
        self.seq.clear()
    }
}

impl<T: Clone> Extend<T> for Transaction<'_, T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.seq.add_range(iter);
    }
}

impl<T: Clone> Drop for Transaction<'_, T> {
    fn drop(&mut self) {
        self.seq.close();
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Transaction<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transaction").field(&self.seq).finish()
    }
}
