// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Change records
//!
//! A [`ChangeRecord`] describes one contiguous insertion into, or removal from, a
//! [`TransactableSequence`](crate::TransactableSequence). Records are what the sequence
//! accumulates while a transaction is open, and the full list of them is handed to
//! detailed-change listeners once the outermost transaction closes.
//!
//! Records are plain values: they own copies of the affected elements and never change
//! after construction. An observer that keeps a mirror of the sequence can bring it up to
//! date by replaying each detailed event in order with [`replay`].

use crate::error::SequenceError;
use smallvec::SmallVec;
use std::fmt;

/// Inline storage for the elements of a record.
///
/// Most records touch a single element, so one slot is kept inline.
pub type RecordItems<T> = SmallVec<[T; 1]>;

/// Whether a [`ChangeRecord`] describes elements entering or leaving the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum ChangeAction {
    Inserted,
    Removed,
}

/// An immutable description of one contiguous insert or remove.
///
/// # Invariants
///
/// 1. `items` is never empty; a zero-length mutation produces no record. This also holds
///    for deserialized records.
/// 2. `end_index() == start_index() + len()`.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedRecord<T>"))]
pub struct ChangeRecord<T> {
    action: ChangeAction,
    start_index: usize,
    items: RecordItems<T>,
}

/// Wire form of a [`ChangeRecord`], before the invariants are checked.
#[cfg(feature = "serde")]
#[derive(::serde::Deserialize)]
struct UncheckedRecord<T> {
    action: ChangeAction,
    start_index: usize,
    items: RecordItems<T>,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<UncheckedRecord<T>> for ChangeRecord<T> {
    type Error = &'static str;

    fn try_from(raw: UncheckedRecord<T>) -> Result<Self, Self::Error> {
        ChangeRecord::new(raw.action, raw.start_index, raw.items)
            .ok_or("a change record must carry at least one item")
    }
}

impl<T> ChangeRecord<T> {
    /// Creates a record, or returns `None` if `items` is empty.
    pub fn new(
        action: ChangeAction,
        start_index: usize,
        items: impl IntoIterator<Item = T>,
    ) -> Option<Self> {
        let items: RecordItems<T> = items.into_iter().collect();
        (!items.is_empty()).then_some(Self {
            action,
            start_index,
            items,
        })
    }

    /// Creates a record for elements inserted at `start_index`.
    pub fn inserted(start_index: usize, items: impl IntoIterator<Item = T>) -> Option<Self> {
        Self::new(ChangeAction::Inserted, start_index, items)
    }

    /// Creates a record for elements removed from `start_index`.
    pub fn removed(start_index: usize, items: impl IntoIterator<Item = T>) -> Option<Self> {
        Self::new(ChangeAction::Removed, start_index, items)
    }

    /// Record for a single element. Cannot be empty, so no `Option` here.
    pub(crate) fn single(action: ChangeAction, index: usize, item: T) -> Self {
        Self {
            action,
            start_index: index,
            items: smallvec::smallvec![item],
        }
    }

    pub fn action(&self) -> ChangeAction {
        self.action
    }

    pub fn is_inserted(&self) -> bool {
        self.action == ChangeAction::Inserted
    }

    pub fn is_removed(&self) -> bool {
        !self.is_inserted()
    }

    /// Index of the first affected element.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// One past the index of the last affected element.
    pub fn end_index(&self) -> usize {
        self.start_index + self.items.len()
    }

    /// The affected elements, in sequence order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of affected elements. Always at least one.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_items(self) -> RecordItems<T> {
        self.items
    }

    /// Returns the single affected element, if this record touches exactly one.
    pub fn single_item(&self) -> Option<&T> {
        match self.items.as_slice() {
            [item] => Some(item),
            _ => None,
        }
    }
}

impl<T: Clone> ChangeRecord<T> {
    /// Replays this record on `mirror`.
    ///
    /// Fails without touching `mirror` if the record does not fit it, for example
    /// because the mirror missed an earlier record.
    pub fn apply_to(&self, mirror: &mut Vec<T>) -> Result<(), SequenceError> {
        match self.action {
            ChangeAction::Inserted => {
                if self.start_index > mirror.len() {
                    return Err(SequenceError::OutOfRange {
                        index: self.start_index,
                        len: mirror.len(),
                    });
                }
                mirror.splice(
                    self.start_index..self.start_index,
                    self.items.iter().cloned(),
                );
            }
            ChangeAction::Removed => {
                if self.end_index() > mirror.len() {
                    return Err(SequenceError::RangeOutOfRange {
                        index: self.start_index,
                        count: self.items.len(),
                        len: mirror.len(),
                    });
                }
                mirror.drain(self.start_index..self.end_index());
            }
        }
        Ok(())
    }
}

/// Replays a detailed change event on `mirror`, record by record.
///
/// Stops at the first record that does not fit; records before it stay applied.
pub fn replay<T: Clone>(
    records: &[ChangeRecord<T>],
    mirror: &mut Vec<T>,
) -> Result<(), SequenceError> {
    records.iter().try_for_each(|record| record.apply_to(mirror))
}

/// Total number of elements touched by `records`.
pub fn touched_items<T>(records: &[ChangeRecord<T>]) -> usize {
    records.iter().map(ChangeRecord::len).sum()
}

impl<T: fmt::Debug> fmt::Debug for ChangeRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            ChangeAction::Inserted => "+",
            ChangeAction::Removed => "-",
        };
        write!(f, "{verb}{}{:?}", self.start_index, self.items.as_slice())
    }
}

#[cfg(feature = "arbitrary")]
mod arbitrary {
    use super::{ChangeAction, ChangeRecord};
    use quickcheck::{Arbitrary, Gen};

    impl Arbitrary for ChangeAction {
        fn arbitrary(g: &mut Gen) -> Self {
            if bool::arbitrary(g) {
                ChangeAction::Inserted
            } else {
                ChangeAction::Removed
            }
        }
    }

    impl<T: Arbitrary> Arbitrary for ChangeRecord<T> {
        fn arbitrary(g: &mut Gen) -> Self {
            let action = ChangeAction::arbitrary(g);
            let start_index = usize::from(u8::arbitrary(g));
            let first = T::arbitrary(g);
            let rest = Vec::<T>::arbitrary(g);
            Self {
                action,
                start_index,
                items: std::iter::once(first).chain(rest).collect(),
            }
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            let action = self.action;
            let start_index = self.start_index;
            Box::new(
                self.items
                    .to_vec()
                    .shrink()
                    .filter(|items| !items.is_empty())
                    .map(move |items| Self {
                        action,
                        start_index,
                        items: items.into_iter().collect(),
                    }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_rejected() {
        assert!(ChangeRecord::<u8>::inserted(0, []).is_none());
        assert!(ChangeRecord::<u8>::removed(3, Vec::new()).is_none());
    }

    #[test]
    fn end_index_spans_items() {
        let record = ChangeRecord::removed(1, [6, 7, 8, 9]).unwrap();
        assert!(record.is_removed());
        assert_eq!(record.start_index(), 1);
        assert_eq!(record.end_index(), 5);
        assert_eq!(record.len(), 4);
        assert_eq!(record.single_item(), None);
    }

    #[test]
    fn single_item() {
        let record = ChangeRecord::single(ChangeAction::Inserted, 2, 'x');
        assert!(record.is_inserted());
        assert_eq!(record.single_item(), Some(&'x'));
        assert_eq!(record.end_index(), 3);
    }

    #[test]
    fn debug_is_compact() {
        let record = ChangeRecord::inserted(0, [4, 8]).unwrap();
        assert_eq!(format!("{record:?}"), "+0[4, 8]");
        let record = ChangeRecord::removed(3, ["a"]).unwrap();
        assert_eq!(format!("{record:?}"), "-3[\"a\"]");
    }

    #[test]
    fn replay_applies_in_order() {
        let mut mirror = vec![5, 6, 7, 8, 9, 10];
        let records = [
            ChangeRecord::removed(1, [6, 7, 8, 9]).unwrap(),
            ChangeRecord::inserted(1, [1, 2]).unwrap(),
        ];
        replay(&records, &mut mirror).unwrap();
        assert_eq!(mirror, [5, 1, 2, 10]);
        assert_eq!(touched_items(&records), 6);
    }

    #[test]
    fn apply_rejects_records_that_do_not_fit() {
        let mut mirror = vec![1, 2];
        let err = ChangeRecord::inserted(3, [0])
            .unwrap()
            .apply_to(&mut mirror)
            .unwrap_err();
        assert_eq!(err, SequenceError::OutOfRange { index: 3, len: 2 });

        let err = ChangeRecord::removed(1, [2, 3])
            .unwrap()
            .apply_to(&mut mirror)
            .unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(mirror, [1, 2]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let record = ChangeRecord::inserted(2, ["a".to_string(), "b".to_string()]).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: ChangeRecord<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_an_empty_record_fails() {
        let err = serde_json::from_str::<ChangeRecord<u8>>(
            r#"{"action":"Inserted","start_index":0,"items":[]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least one item"), "{err}");

        let record: ChangeRecord<u8> =
            serde_json::from_str(r#"{"action":"Removed","start_index":2,"items":[7]}"#).unwrap();
        assert_eq!(record, ChangeRecord::removed(2, [7]).unwrap());
    }
}
