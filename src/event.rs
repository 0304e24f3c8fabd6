// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Outward notifications.
//!
//! A flush of a [`TransactableSequence`](crate::TransactableSequence) produces, in this
//! order:
//!
//! 1. [`Property::Len`], if the flush changed the length,
//! 2. [`Property::Items`],
//! 3. exactly one [`CollectionChange`] (the *minimal* event),
//! 4. the full list of [`ChangeRecord`](crate::ChangeRecord)s (the *detailed* event).
//!
//! Cheap observers such as counters only need the first three. Observers that maintain
//! a derived copy of the sequence should follow the detailed event instead, since the
//! minimal event collapses anything that is not a single add, remove or lone `set` into
//! [`CollectionChange::Reset`].

use std::fmt;

/// The coarse-grained description of one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum CollectionChange<T> {
    /// One element was inserted at `index`.
    Add { item: T, index: usize },
    /// One element was removed from `index`.
    Remove { item: T, index: usize },
    /// The element at `index` was swapped for another.
    Replace {
        new_item: T,
        old_item: T,
        index: usize,
    },
    /// A contiguous span was inserted. Only produced under [`CoalescePolicy::Precise`].
    AddRange { items: Vec<T>, index: usize },
    /// A contiguous span was removed. Only produced under [`CoalescePolicy::Precise`].
    RemoveRange { items: Vec<T>, index: usize },
    /// Anything else. Observers should re-read the whole sequence.
    Reset,
}

impl<T> CollectionChange<T> {
    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionChange::Add { .. } => "add",
            CollectionChange::Remove { .. } => "remove",
            CollectionChange::Replace { .. } => "replace",
            CollectionChange::AddRange { .. } => "add_range",
            CollectionChange::RemoveRange { .. } => "remove_range",
            CollectionChange::Reset => "reset",
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, CollectionChange::Reset)
    }
}

/// Change notification for an aggregate property of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum Property {
    /// The number of elements changed.
    Len,
    /// The contents changed. Fired on every flush.
    Items,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Len => f.write_str("len"),
            Property::Items => f.write_str("items"),
        }
    }
}

/// How a flush with more than a single-element delta is reported as a minimal event.
///
/// Either way the detailed event carries every record, so no information is lost; the
/// policy only decides how much of it fits into the minimal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CoalescePolicy {
    /// Only single adds, removes and replaces are reported precisely; everything else is
    /// [`CollectionChange::Reset`].
    #[default]
    CollapseToReset,
    /// Additionally reports single-span inserts and removes as
    /// [`CollectionChange::AddRange`] and [`CollectionChange::RemoveRange`].
    Precise,
}

#[cfg(feature = "arbitrary")]
impl quickcheck::Arbitrary for CoalescePolicy {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        if <bool as quickcheck::Arbitrary>::arbitrary(g) {
            CoalescePolicy::Precise
        } else {
            CoalescePolicy::CollapseToReset
        }
    }
}
