use std::{cell::RefCell, rc::Rc};
use transactable::{
    CoalescePolicy, SequenceConfig, SequenceError, TransactableSequence, change,
    observer::recording::EventLog,
};

fn main() -> Result<(), SequenceError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Create a sequence that reports single-range flushes precisely
    let mut seq = TransactableSequence::with_config(
        SequenceConfig::default().coalesce(CoalescePolicy::Precise),
    );
    let log = Rc::new(RefCell::new(EventLog::new()));
    let _log_sub = seq.attach(Rc::clone(&log));

    // Keep a replica in sync using only the detailed events
    let replica = Rc::new(RefCell::new(Vec::new()));
    let mirror = Rc::clone(&replica);
    let _replica_sub = seq.on_records_changed(move |records| {
        if let Err(e) = change::replay(records, &mut mirror.borrow_mut()) {
            eprintln!("replica fell out of sync: {e}");
        }
    });

    // Each call flushes on its own
    seq.add_range(["apple", "banana", "cherry", "damson"]);
    seq.push("elderberry");

    // Several calls, one flush
    {
        let mut tx = seq.begin_transaction();
        tx.move_item(4, 0)?;
        tx.set(2, "blueberry")?;
        tx.remove_range(3, 2)?;
    }

    println!("sequence: {:?}", seq.as_slice());
    println!("replica:  {:?}", replica.borrow());
    println!("\nnotifications:\n{}", log.borrow().transcript());
    Ok(())
}
