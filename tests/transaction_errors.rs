//! Tests for failed operations.
//!
//! A failed mutation must leave the sequence untouched and must not leak an open
//! transaction, whether it fails on its own, inside a transaction, or by panicking.

use std::{
    cell::RefCell,
    panic::{AssertUnwindSafe, catch_unwind},
    rc::Rc,
};
use transactable::{SequenceError, TransactableSequence, observer::recording::EventLog};

fn logged(
    seq: &mut TransactableSequence<char>,
) -> (Rc<RefCell<EventLog>>, transactable::Subscription) {
    let log = Rc::new(RefCell::new(EventLog::new()));
    let sub = seq.attach(Rc::clone(&log));
    (log, sub)
}

#[test]
fn every_failing_operation_is_side_effect_free() {
    let original: Vec<char> = "abc".chars().collect();
    let mut seq = TransactableSequence::from(original.clone());
    let (log, _sub) = logged(&mut seq);

    assert_eq!(
        seq.insert(4, 'x'),
        Err(SequenceError::OutOfRange { index: 4, len: 3 })
    );
    assert_eq!(
        seq.remove_at(3),
        Err(SequenceError::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        seq.set(3, 'x'),
        Err(SequenceError::OutOfRange { index: 3, len: 3 })
    );
    assert!(seq.move_item(0, 3).unwrap_err().is_out_of_range());
    assert!(seq.move_item(3, 0).unwrap_err().is_out_of_range());
    assert!(seq.insert_range(4, ['x', 'y']).unwrap_err().is_out_of_range());
    assert_eq!(
        seq.remove_range(3, 0),
        Err(SequenceError::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        seq.remove_range(1, 3),
        Err(SequenceError::RangeOutOfRange {
            index: 1,
            count: 3,
            len: 3
        })
    );
    assert_eq!(
        seq.remove_range(1, usize::MAX),
        Err(SequenceError::InvalidArgument("index + count overflows"))
    );

    assert_eq!(seq.as_slice(), original.as_slice());
    assert!(log.borrow().lines.is_empty());

    // nothing is left pending either
    seq.push('d');
    assert_eq!(log.borrow().lines.last().unwrap(), "records [+3['d']]");
}

#[test]
fn failure_inside_transaction_keeps_earlier_work() {
    let mut seq = TransactableSequence::from(vec!['a', 'b']);
    let (log, _sub) = logged(&mut seq);

    let result = seq.transact(|tx| {
        tx.push('c');
        tx.remove_range(1, 5)?;
        tx.push('z');
        Ok::<_, SequenceError>(())
    });

    assert!(result.unwrap_err().is_out_of_range());
    assert_eq!(seq.as_slice(), &['a', 'b', 'c']);
    assert_eq!(
        log.borrow().transcript(),
        "property len\nproperty items\nadd 'c' at 2\nrecords [+2['c']]"
    );
}

#[test]
fn panic_inside_transaction_still_flushes() {
    let mut seq = TransactableSequence::from(vec!['a']);
    let (log, _sub) = logged(&mut seq);

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut tx = seq.begin_transaction();
        tx.push('b');
        tx.push('c');
        panic!("observer code blew up");
    }));

    assert!(outcome.is_err());
    assert_eq!(seq.as_slice(), &['a', 'b', 'c']);
    assert_eq!(log.borrow().collection_events, 1);

    seq.pop();
    assert_eq!(log.borrow().collection_events, 2);
    assert_eq!(log.borrow().lines.last().unwrap(), "records [-2['c']]");
}

#[test]
fn absent_targets_are_not_errors() {
    let mut seq = TransactableSequence::from(vec!['a']);
    let (log, _sub) = logged(&mut seq);

    assert!(!seq.remove_by_value(&'z'));
    assert_eq!(seq.remove_first_by(|c| c.is_ascii_digit()), None);
    seq.clear();
    assert_eq!(seq.pop(), None);
    seq.clear();

    assert!(seq.is_empty());
    assert_eq!(
        log.borrow().transcript(),
        "property len\nproperty items\nremove 'a' at 0\nrecords [-0['a']]"
    );
}
