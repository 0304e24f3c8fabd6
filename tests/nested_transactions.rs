//! Integration tests for nested transactions.

use std::{cell::RefCell, rc::Rc};
use transactable::{
    SequenceError, TransactableSequence, Transaction, change, observer::recording::EventLog,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn logged(
    seq: &mut TransactableSequence<u32>,
) -> (Rc<RefCell<EventLog>>, transactable::Subscription) {
    let log = Rc::new(RefCell::new(EventLog::new()));
    let sub = seq.attach(Rc::clone(&log));
    (log, sub)
}

#[test]
fn depth_does_not_matter() {
    init_tracing();

    fn descend(tx: &mut Transaction<'_, u32>, depth: u32) {
        tx.push(depth);
        if depth > 0 {
            let mut inner = tx.begin_transaction();
            descend(&mut inner, depth - 1);
        }
    }

    for depth in [0, 1, 5, 32] {
        let mut seq = TransactableSequence::new();
        let (log, _sub) = logged(&mut seq);

        {
            let mut tx = seq.begin_transaction();
            descend(&mut tx, depth);
            assert!(log.borrow().lines.is_empty());
        }

        let log = log.borrow();
        assert_eq!(log.collection_events, 1, "depth {depth}");
        assert_eq!(log.record_events, 1, "depth {depth}");
        assert_eq!(seq.len(), depth as usize + 1);
    }
}

#[test]
fn sibling_transactions_flush_separately() {
    init_tracing();
    let mut seq = TransactableSequence::new();
    let (log, _sub) = logged(&mut seq);

    seq.transact(|tx| {
        tx.push(1);
        tx.push(2);
    });
    seq.transact(|tx| tx.push(3));

    assert_eq!(seq.as_slice(), &[1, 2, 3]);
    assert_eq!(
        log.borrow().transcript(),
        "property len\nproperty items\nreset\nrecords [+0[1], +1[2]]\n\
         property len\nproperty items\nadd 3 at 2\nrecords [+2[3]]"
    );
}

#[test]
fn implicit_transactions_join_the_open_one() {
    init_tracing();
    let mut seq = TransactableSequence::from(vec![1, 2, 3, 4]);
    let (log, _sub) = logged(&mut seq);

    {
        let mut tx = seq.begin_transaction();
        tx.set(0, 10).unwrap();
        tx.move_item(3, 0).unwrap();
        tx.remove_range(1, 2).unwrap();
        tx.add_range([7, 8]);
    }

    assert_eq!(seq.as_slice(), &[4, 3, 7, 8]);
    let log = log.borrow();
    assert_eq!(log.collection_events, 1);
    assert_eq!(
        log.lines.last().map(String::as_str),
        Some("records [-0[1], +0[10], -3[4], +0[4], -1[10, 2], +2[7, 8]]")
    );
}

#[test]
fn error_inside_nested_transaction_still_flushes_outer_work() {
    init_tracing();

    fn work(seq: &mut TransactableSequence<u32>) -> Result<(), SequenceError> {
        let mut outer = seq.begin_transaction();
        outer.push(1);
        let mut inner = outer.begin_transaction();
        inner.push(2);
        inner.remove_at(99)?;
        unreachable!("remove_at(99) cannot succeed");
    }

    let mut seq = TransactableSequence::new();
    let (log, _sub) = logged(&mut seq);

    assert!(work(&mut seq).unwrap_err().is_out_of_range());

    // both guards were released on the way out, so the two pushes were reported
    assert_eq!(seq.as_slice(), &[1, 2]);
    assert_eq!(log.borrow().collection_events, 1);

    // and the sequence is not stuck in a transaction
    seq.push(3);
    assert_eq!(log.borrow().collection_events, 2);
}

#[test]
fn replica_follows_detailed_events_through_nesting() {
    init_tracing();
    let mut seq = TransactableSequence::from(vec![0, 1, 2, 3, 4, 5]);
    let replica = Rc::new(RefCell::new(seq.as_slice().to_vec()));
    let mirror = Rc::clone(&replica);
    let _sub = seq.on_records_changed(move |records| {
        change::replay(records, &mut mirror.borrow_mut()).unwrap();
    });

    seq.transact(|tx| {
        tx.move_item(5, 0)?;
        tx.transact(|inner| {
            inner.remove_range(2, 3)?;
            inner.insert(1, 42)
        })?;
        tx.set(2, 7)?;
        Ok::<_, SequenceError>(())
    })
    .unwrap();
    seq.remove_by_value(&42);

    assert_eq!(seq.as_slice(), &[5, 7, 4]);
    assert_eq!(*replica.borrow(), seq.as_slice());
}
