// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! This module contains an observer that simply records all notifications in a human
//! readable form. This is mostly useful for tests.

use super::SequenceObserver;
use crate::{change::ChangeRecord, event::CollectionChange, event::Property};
use std::fmt::Debug;

/// An observer that records all notifications.
#[derive(Debug, Default)]
pub struct EventLog {
    /// A string-representation of each notification the observer has received.
    pub lines: Vec<String>,
    /// Number of minimal events seen.
    pub collection_events: usize,
    /// Number of detailed events seen.
    pub record_events: usize,
}

impl EventLog {
    pub fn new() -> EventLog {
        EventLog::default()
    }

    /// The recorded lines joined with newlines.
    pub fn transcript(&self) -> String {
        self.lines.join("\n")
    }

    /// Forgets everything recorded so far.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.collection_events = 0;
        self.record_events = 0;
    }
}

impl<T: Debug> SequenceObserver<T> for EventLog {
    fn property_changed(&mut self, property: Property) {
        self.lines.push(format!("property {property}"));
    }

    fn collection_changed(&mut self, change: &CollectionChange<T>) {
        self.collection_events += 1;
        let line = match change {
            CollectionChange::Add { item, index } => format!("add {item:?} at {index}"),
            CollectionChange::Remove { item, index } => format!("remove {item:?} at {index}"),
            CollectionChange::Replace {
                new_item,
                old_item,
                index,
            } => format!("replace {old_item:?} with {new_item:?} at {index}"),
            CollectionChange::AddRange { items, index } => format!("add {items:?} at {index}"),
            CollectionChange::RemoveRange { items, index } => {
                format!("remove {items:?} at {index}")
            }
            CollectionChange::Reset => "reset".to_string(),
        };
        self.lines.push(line);
    }

    fn records_changed(&mut self, records: &[ChangeRecord<T>]) {
        self.record_events += 1;
        self.lines.push(format!("records {records:?}"));
    }
}
