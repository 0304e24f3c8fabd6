// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Errors returned by sequence mutations.
//!
//! Every error is raised before the container is touched, so a failed call leaves the
//! sequence, its pending records and its listeners exactly as they were.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceError {
    /// A single index falls outside the valid bound for the operation.
    ///
    /// Insertion positions may equal `len`; element positions must be below it.
    #[error("index {index} is out of range for a sequence of length {len}")]
    OutOfRange { index: usize, len: usize },

    /// `index + count` reaches past the end of the sequence.
    #[error("range {index}..{index}+{count} is out of range for a sequence of length {len}")]
    RangeOutOfRange {
        index: usize,
        count: usize,
        len: usize,
    },

    /// An argument the operation cannot work with, regardless of the sequence contents.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl SequenceError {
    /// True for both the single-index and the range flavour of out-of-range.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            SequenceError::OutOfRange { .. } | SequenceError::RangeOutOfRange { .. }
        )
    }
}
