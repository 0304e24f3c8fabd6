// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Turns the records of one flush into the minimal event.

use crate::{
    change::{ChangeAction, ChangeRecord},
    event::{CoalescePolicy, CollectionChange},
};

/// What wrote the pending records.
///
/// The records alone cannot tell a `set` apart from a transaction that removes and then
/// inserts at the same index, so the sequence tracks it while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Origin {
    /// Any number of mutations.
    #[default]
    Mutations,
    /// A single `set` and nothing else.
    Replacement,
}

/// Picks the minimal event describing `records`, or `None` if nothing was recorded.
///
/// The rules, in order:
///
/// 1. a single record of a single element is an `Add` or `Remove`;
/// 2. the two records of a lone `set` are a `Replace`;
/// 3. under [`CoalescePolicy::Precise`], a single record of several elements is an
///    `AddRange` or `RemoveRange`;
/// 4. everything else is a `Reset`.
pub(crate) fn minimal_change<T: Clone>(
    records: &[ChangeRecord<T>],
    origin: Origin,
    policy: CoalescePolicy,
) -> Option<CollectionChange<T>> {
    let change = match (records, origin) {
        ([], _) => return None,
        ([only], _) => match (only.action(), only.single_item()) {
            (ChangeAction::Inserted, Some(item)) => CollectionChange::Add {
                item: item.clone(),
                index: only.start_index(),
            },
            (ChangeAction::Removed, Some(item)) => CollectionChange::Remove {
                item: item.clone(),
                index: only.start_index(),
            },
            (action, None) => span_change(action, only, policy),
        },
        ([removed, inserted], Origin::Replacement) => {
            replace_change(removed, inserted).unwrap_or(CollectionChange::Reset)
        }
        _ => CollectionChange::Reset,
    };
    Some(change)
}

fn span_change<T: Clone>(
    action: ChangeAction,
    record: &ChangeRecord<T>,
    policy: CoalescePolicy,
) -> CollectionChange<T> {
    if policy != CoalescePolicy::Precise {
        return CollectionChange::Reset;
    }
    let items = record.items().to_vec();
    let index = record.start_index();
    match action {
        ChangeAction::Inserted => CollectionChange::AddRange { items, index },
        ChangeAction::Removed => CollectionChange::RemoveRange { items, index },
    }
}

fn replace_change<T: Clone>(
    removed: &ChangeRecord<T>,
    inserted: &ChangeRecord<T>,
) -> Option<CollectionChange<T>> {
    if !removed.is_removed()
        || !inserted.is_inserted()
        || removed.start_index() != inserted.start_index()
    {
        return None;
    }
    Some(CollectionChange::Replace {
        new_item: inserted.single_item()?.clone(),
        old_item: removed.single_item()?.clone(),
        index: removed.start_index(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CoalescePolicy::{CollapseToReset, Precise};

    fn ins<T>(index: usize, items: impl IntoIterator<Item = T>) -> ChangeRecord<T> {
        ChangeRecord::inserted(index, items).unwrap()
    }

    fn rem<T>(index: usize, items: impl IntoIterator<Item = T>) -> ChangeRecord<T> {
        ChangeRecord::removed(index, items).unwrap()
    }

    #[test]
    fn nothing_recorded() {
        assert_eq!(
            minimal_change::<u8>(&[], Origin::Replacement, CollapseToReset),
            None
        );
    }

    #[test]
    fn single_element_records_are_precise() {
        assert_eq!(
            minimal_change(&[ins(3, ['x'])], Origin::Mutations, CollapseToReset),
            Some(CollectionChange::Add {
                item: 'x',
                index: 3
            })
        );
        assert_eq!(
            minimal_change(&[rem(0, ['y'])], Origin::Mutations, CollapseToReset),
            Some(CollectionChange::Remove {
                item: 'y',
                index: 0
            })
        );
    }

    #[test]
    fn lone_set_is_replace() {
        assert_eq!(
            minimal_change(&[rem(2, [1]), ins(2, [9])], Origin::Replacement, CollapseToReset),
            Some(CollectionChange::Replace {
                new_item: 9,
                old_item: 1,
                index: 2
            })
        );
    }

    #[test]
    fn remove_then_insert_is_reset() {
        // same shape as a set, but written by two separate mutations
        for policy in [CollapseToReset, Precise] {
            assert_eq!(
                minimal_change(&[rem(2, [1]), ins(2, [9])], Origin::Mutations, policy),
                Some(CollectionChange::Reset)
            );
        }
        // different index, as produced by a move
        assert_eq!(
            minimal_change(&[rem(0, [1]), ins(2, [1])], Origin::Mutations, Precise),
            Some(CollectionChange::Reset)
        );
    }

    #[test]
    fn spans_depend_on_policy() {
        assert_eq!(
            minimal_change(&[ins(0, [4, 8, 5, 10])], Origin::Mutations, CollapseToReset),
            Some(CollectionChange::Reset)
        );
        assert_eq!(
            minimal_change(&[ins(0, [4, 8, 5, 10])], Origin::Mutations, Precise),
            Some(CollectionChange::AddRange {
                items: vec![4, 8, 5, 10],
                index: 0
            })
        );
        assert_eq!(
            minimal_change(&[rem(1, [6, 7, 8, 9])], Origin::Mutations, Precise),
            Some(CollectionChange::RemoveRange {
                items: vec![6, 7, 8, 9],
                index: 1
            })
        );
    }

    #[test]
    fn many_records_reset() {
        let records = [ins(0, [1]), ins(1, [2]), ins(2, [3])];
        for policy in [CollapseToReset, Precise] {
            assert_eq!(
                minimal_change(&records, Origin::Mutations, policy),
                Some(CollectionChange::Reset)
            );
        }
    }
}
