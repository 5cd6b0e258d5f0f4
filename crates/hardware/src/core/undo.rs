//! Per-cycle change recording.
//!
//! Every committed cycle leaves a `StepChanges` describing the previous value of each
//! register and memory location it wrote, plus the pending interrupt requests it started
//! with. The same record serves two purposes: rolling back a cancelled cycle and undoing
//! a committed one.

use std::collections::VecDeque;

use crate::common::RegisterId;
use crate::core::interrupt::InterruptController;

/// Width of a recorded memory write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// One byte.
    Byte,
    /// Two bytes.
    Half,
    /// Four bytes.
    Word,
}

impl Width {
    /// Size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }
}

/// A single reversible mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// A register held `old` before the write.
    Register {
        /// Register written.
        id: RegisterId,
        /// Value before the write.
        old: u32,
    },
    /// A memory location held `old` before the write.
    Memory {
        /// Address written.
        address: u32,
        /// Width of the write.
        width: Width,
        /// Value before the write.
        old: u32,
    },
}

/// Every mutation of one cycle, in the order it happened.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepChanges {
    changes: Vec<Change>,
    interrupts: Option<InterruptController>,
}

impl StepChanges {
    /// Appends a change.
    #[inline]
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Whether the cycle wrote nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of recorded changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Changes in the order they must be reverted (most recent first).
    pub fn reverted(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().rev()
    }

    /// Records the interrupt requests that were pending when the cycle began.
    pub fn record_interrupts(&mut self, interrupts: InterruptController) {
        self.interrupts = Some(interrupts);
    }

    /// Interrupt requests pending when the cycle began, if recorded.
    pub const fn interrupts_before(&self) -> Option<&InterruptController> {
        self.interrupts.as_ref()
    }
}

/// Bounded history of committed cycles.
#[derive(Clone, Debug)]
pub struct UndoLog {
    steps: VecDeque<StepChanges>,
    capacity: usize,
}

impl UndoLog {
    /// Creates a log retaining at most `capacity` cycles.
    pub fn new(capacity: usize) -> Self {
        Self {
            steps: VecDeque::new(),
            capacity,
        }
    }

    /// Records a committed cycle, dropping the oldest one when full.
    pub fn push(&mut self, step: StepChanges) {
        if self.capacity == 0 {
            return;
        }
        if self.steps.len() == self.capacity {
            let _ = self.steps.pop_front();
        }
        self.steps.push_back(step);
    }

    /// Removes the most recent cycle.
    pub fn pop(&mut self) -> Option<StepChanges> {
        self.steps.pop_back()
    }

    /// Number of cycles that can be undone.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing can be undone.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Forgets the whole history.
    pub fn clear(&mut self) {
        self.steps.clear();
    }
}
