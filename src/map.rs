// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Observable maps
//!
//! [`ObservableMap`] applies the notify-on-mutate idea of
//! [`TransactableSequence`](crate::TransactableSequence) to a hash map. There are no
//! transactions and no change records: every mutation is reported as soon as it happens,
//! preceded by the same [`Property`] notifications the sequence emits.

use crate::{
    event::Property,
    observer::{Listeners, Subscription},
};
use ahash::RandomState;
use std::{
    borrow::Borrow,
    collections::HashMap,
    fmt,
    hash::{BuildHasher, Hash},
    sync::atomic::{AtomicBool, Ordering},
};
use tracing::debug;

static FIXED_ORDER: AtomicBool = AtomicBool::new(false);

/// Makes every [`ObservableMap`] created from now on iterate in the same order on every
/// run.
///
/// Meant for tests and fixtures that print map contents. The hasher becomes predictable,
/// so leave this off for maps keyed by untrusted input.
pub fn enable_determinism() {
    FIXED_ORDER.store(true, Ordering::Release);
}

/// Hasher state of one map: random, or a fixed seed once [`enable_determinism`] was called.
#[derive(Clone)]
struct EntryHasher(RandomState);

impl Default for EntryHasher {
    fn default() -> Self {
        if FIXED_ORDER.load(Ordering::Acquire) {
            Self(RandomState::with_seeds(0x5eed, 0x0b5e, 0x4ab1, 0xe5))
        } else {
            Self(RandomState::new())
        }
    }
}

impl BuildHasher for EntryHasher {
    type Hasher = <RandomState as BuildHasher>::Hasher;

    fn build_hasher(&self) -> Self::Hasher {
        self.0.build_hasher()
    }
}

/// A single mutation of an [`ObservableMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum MapChange<K, V> {
    /// `key` was not present and now maps to `value`.
    Add { key: K, value: V },
    /// `key` was removed; it mapped to `value`.
    Remove { key: K, value: V },
    /// `key` now maps to `new_value` instead of `old_value`.
    Replace {
        key: K,
        new_value: V,
        old_value: V,
    },
    /// The map was emptied.
    Reset,
}

impl<K, V> MapChange<K, V> {
    pub fn kind(&self) -> &'static str {
        match self {
            MapChange::Add { .. } => "add",
            MapChange::Remove { .. } => "remove",
            MapChange::Replace { .. } => "replace",
            MapChange::Reset => "reset",
        }
    }
}

/// A hash map that notifies listeners of every mutation.
///
/// ```rust
/// use std::{cell::Cell, rc::Rc};
/// use transactable::ObservableMap;
///
/// let mut map = ObservableMap::new();
/// let changes = Rc::new(Cell::new(0));
///
/// let counter = Rc::clone(&changes);
/// let _sub = map.on_map_changed(move |_| counter.set(counter.get() + 1));
///
/// map.insert("answer", 41);
/// map.insert("answer", 42);
/// assert_eq!(map.remove("answer"), Some(42));
/// assert_eq!(map.remove("answer"), None);
/// assert_eq!(changes.get(), 3);
/// ```
pub struct ObservableMap<K, V> {
    entries: HashMap<K, V, EntryHasher>,
    change_listeners: Listeners<MapChange<K, V>>,
    property_listeners: Listeners<Property>,
}

impl<K, V> Default for ObservableMap<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::with_hasher(EntryHasher::default()),
            change_listeners: Listeners::default(),
            property_listeners: Listeners::default(),
        }
    }
}

impl<K, V> ObservableMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, EntryHasher::default()),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, K, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> std::collections::hash_map::Keys<'_, K, V> {
        self.entries.keys()
    }

    pub fn values(&self) -> std::collections::hash_map::Values<'_, K, V> {
        self.entries.values()
    }

    /// Removes every entry, emitting a single [`MapChange::Reset`]. Does nothing if
    /// already empty.
    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.emit(true, MapChange::Reset);
    }

    fn emit(&mut self, len_changed: bool, change: MapChange<K, V>) {
        debug!(event = change.kind(), len = self.entries.len(), "map changed");
        if len_changed {
            self.property_listeners.notify(&Property::Len);
        }
        self.property_listeners.notify(&Property::Items);
        self.change_listeners.notify(&change);
    }
}

impl<K: 'static, V: 'static> ObservableMap<K, V> {
    /// Registers a listener for map changes. One call per mutation.
    pub fn on_map_changed(&mut self, callback: impl Fn(&MapChange<K, V>) + 'static) -> Subscription {
        self.change_listeners.subscribe(callback)
    }

    /// Registers a listener for property notifications, which precede the map change.
    pub fn on_property_changed(&mut self, callback: impl Fn(&Property) + 'static) -> Subscription {
        self.property_listeners.subscribe(callback)
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Maps `key` to `value` and returns the previous value, if any.
    ///
    /// Emits [`MapChange::Add`] for a new key and [`MapChange::Replace`] otherwise.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let old = self.entries.insert(key.clone(), value.clone());
        match &old {
            None => self.emit(true, MapChange::Add { key, value }),
            Some(old_value) => self.emit(
                false,
                MapChange::Replace {
                    key,
                    new_value: value,
                    old_value: old_value.clone(),
                },
            ),
        }
        old
    }

    /// Removes `key` and returns its value. Emits nothing if the key is absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (key, value) = self.entries.remove_entry(key)?;
        self.emit(
            true,
            MapChange::Remove {
                key,
                value: value.clone(),
            },
        );
        Some(value)
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for ObservableMap<K, V> {
    /// Builds a map from existing entries. Nothing is emitted for them.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.entries.extend(iter);
        map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ObservableMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableMap")
            .field("entries", &self.entries)
            .field("listeners", &self.change_listeners.len())
            .finish()
    }
}
