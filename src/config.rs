// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Construction-time settings for [`TransactableSequence`](crate::TransactableSequence).

use crate::event::CoalescePolicy;

/// Settings applied when a sequence is created.
///
/// ```
/// use transactable::{CoalescePolicy, SequenceConfig, TransactableSequence};
///
/// let config = SequenceConfig::default()
///     .coalesce(CoalescePolicy::Precise)
///     .capacity(64);
/// let seq = TransactableSequence::<u32>::with_config(config);
/// assert!(seq.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequenceConfig {
    /// How multi-element flushes are reported as minimal events.
    pub coalesce: CoalescePolicy,
    /// Number of elements to reserve room for up front.
    pub capacity: usize,
}

impl SequenceConfig {
    pub fn coalesce(mut self, policy: CoalescePolicy) -> Self {
        self.coalesce = policy;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
