// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # Transactable: observable collections with batched notifications
//!
//! This crate provides ordered and keyed collections that tell their observers about every
//! structural change. Its centrepiece is [`TransactableSequence`], a vector-like container
//! whose mutations can be grouped into nested transactions: while a transaction is open,
//! changes are only recorded, and when the outermost transaction closes they are reported
//! all at once.
//!
//! ## Two tiers of notification
//!
//! Each time a sequence flushes, observers receive
//!
//! - a **minimal event** ([`CollectionChange`]): a single `Add` or `Remove` when the flush
//!   holds one mutation of one element, `Replace` for a lone `set`, and `Reset` ("re-read
//!   everything") otherwise;
//! - a **detailed event**: the ordered list of [`ChangeRecord`]s written since the last
//!   flush, each describing one contiguous insertion or removal.
//!
//! Cheap observers (a counter, a "dirty" flag) look at the minimal event only. Observers
//! that maintain a derived copy of the sequence replay the detailed event with
//! [`change::replay`], which recovers interior reorderings that the minimal event collapses
//! into `Reset`. Both tiers are preceded by [`Property`] notifications, so a length display
//! is always updated no later than the structural event.
//!
//! ## Getting started
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use transactable::{ChangeRecord, CollectionChange, TransactableSequence, change};
//!
//! let mut seq = TransactableSequence::from(vec![5, 6, 7, 8, 9, 10]);
//!
//! // A replica that follows the detailed events.
//! let replica = Rc::new(RefCell::new(seq.as_slice().to_vec()));
//! let mirror = Rc::clone(&replica);
//! let _records = seq.on_records_changed(move |records: &[ChangeRecord<i32>]| {
//!     change::replay(records, &mut mirror.borrow_mut()).expect("replica is in sync");
//! });
//!
//! // A counter that only looks at minimal events.
//! let resets = Rc::new(RefCell::new(0));
//! let counter = Rc::clone(&resets);
//! let _changes = seq.on_collection_changed(move |change: &CollectionChange<i32>| {
//!     if change.is_reset() {
//!         *counter.borrow_mut() += 1;
//!     }
//! });
//!
//! // Three mutations, one notification.
//! {
//!     let mut tx = seq.begin_transaction();
//!     tx.remove_range(1, 4)?;
//!     tx.push(11);
//!     tx.move_item(2, 0)?;
//! }
//!
//! assert_eq!(seq.as_slice(), &[11, 5, 10]);
//! assert_eq!(*replica.borrow(), [11, 5, 10]);
//! assert_eq!(*resets.borrow(), 1);
//! # Ok::<(), transactable::SequenceError>(())
//! ```
//!
//! ## Transactions
//!
//! [`TransactableSequence::begin_transaction`] returns a [`Transaction`] guard that
//! offers the sequence's mutations and dereferences to it for reading. Transactions nest;
//! only closing the outermost one flushes. The guard closes its transaction exactly once however it goes out of scope,
//! including early returns through `?` and panics, so a failed batch never leaves
//! notifications suppressed. [`TransactableSequence::transact`] is the closure form.
//!
//! Single operations that write several records (`set`, `move_item`, the range
//! operations) open an implicit transaction of their own, so they flush once.
//!
//! ## Maps
//!
//! [`ObservableMap`] is the keyed counterpart. It has no transactions; every mutation is
//! reported immediately as a [`MapChange`]. Its iteration order is random per map unless
//! [`enable_determinism`] was called first, which tests that print map contents rely on.
//!
//! ## Threading
//!
//! Everything in this crate is single-threaded. Listeners are held in `Rc`s, so the
//! collections are neither `Send` nor `Sync`.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: transaction open/close at `TRACE`, and one `DEBUG`
//! event per flush with the record count, the touched element count and the kind of
//! minimal event. No subscriber is installed.
//!
//! ## Features
//!
//! - `serde`: Provides `serde` support for change records, events and [`SequenceConfig`].
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for [`ChangeRecord`] and
//!   [`CoalescePolicy`], useful for property-based testing.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

pub mod change;
pub use change::{ChangeAction, ChangeRecord};
pub mod config;
pub use config::SequenceConfig;
pub mod error;
pub use error::SequenceError;
pub mod event;
pub use event::{CoalescePolicy, CollectionChange, Property};
pub mod map;
pub use map::{MapChange, ObservableMap, enable_determinism};
pub mod observer;
pub use observer::{SequenceObserver, Subscription};
pub mod sequence;
pub use sequence::{TransactableSequence, Transaction};
