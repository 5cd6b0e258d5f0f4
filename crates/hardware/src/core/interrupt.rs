//! Interrupt request bookkeeping.
//!
//! The controller records pending requests and nothing else. It provides:
//! 1. **Hardware Requests:** One pending flag per interrupt priority level (0-63).
//! 2. **Software Requests:** At most one pending exception raised by an instruction.
//! 3. **Pending Query:** Whether the engine should dispatch at the top of the next cycle.
//!
//! Writing `Cause`, choosing between simultaneous requests and computing vectors are
//! done by the engine.

use crate::common::MipsException;
use crate::common::constants::{STATUS_ERL, STATUS_EXL, STATUS_IE, STATUS_IPL, STATUS_IPL_WIDTH};
use crate::common::reg::bits;

/// Number of distinct hardware interrupt levels.
pub const INTERRUPT_LEVELS: u32 = 64;

/// The parts of COP0 that gate hardware interrupts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptView {
    status: u32,
}

impl InterruptView {
    /// Builds a view over a Status register value.
    pub const fn new(status: u32) -> Self {
        Self { status }
    }

    /// IE set, EXL and ERL clear.
    pub const fn interrupts_enabled(self) -> bool {
        bits(self.status, STATUS_IE, 1) == 1
            && bits(self.status, STATUS_EXL, 1) == 0
            && bits(self.status, STATUS_ERL, 1) == 0
    }

    /// Current interrupt priority level.
    pub const fn priority_level(self) -> u32 {
        bits(self.status, STATUS_IPL, STATUS_IPL_WIDTH)
    }

    /// Whether a hardware request at `level` may be taken.
    pub const fn accepts(self, level: u32) -> bool {
        self.interrupts_enabled() && level > self.priority_level()
    }
}

/// Pending hardware and software interrupt requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterruptController {
    hardware: u64,
    software: Option<MipsException>,
}

impl InterruptController {
    /// Creates a controller with nothing pending.
    pub const fn new() -> Self {
        Self {
            hardware: 0,
            software: None,
        }
    }

    /// Flags a hardware interrupt at `level`. Repeated requests for a level coalesce.
    pub const fn request_hardware(&mut self, level: u32) {
        self.hardware |= 1 << (level % INTERRUPT_LEVELS);
    }

    /// Records an exception raised by an instruction, replacing any earlier one.
    pub const fn request_software(&mut self, exception: MipsException) {
        self.software = Some(exception);
    }

    /// Whether the engine must dispatch something before the next fetch.
    ///
    /// Software requests are always pending; hardware requests only when `view`
    /// accepts their level.
    pub fn has_pending(&self, view: InterruptView) -> bool {
        self.software.is_some()
            || self
                .highest_hardware_level()
                .is_some_and(|level| view.accepts(level))
    }

    /// The pending software request, if any.
    pub const fn software(&self) -> Option<MipsException> {
        self.software
    }

    /// Highest requested hardware level.
    pub const fn highest_hardware_level(&self) -> Option<u32> {
        if self.hardware == 0 {
            None
        } else {
            Some(INTERRUPT_LEVELS - 1 - self.hardware.leading_zeros())
        }
    }

    /// Whether a hardware request is pending at `level`.
    pub const fn is_hardware_pending(&self, level: u32) -> bool {
        self.hardware & (1 << (level % INTERRUPT_LEVELS)) != 0
    }

    /// Removes and returns the pending software request.
    pub const fn take_software(&mut self) -> Option<MipsException> {
        self.software.take()
    }

    /// Clears the request at `level`.
    pub const fn acknowledge_hardware(&mut self, level: u32) {
        self.hardware &= !(1 << (level % INTERRUPT_LEVELS));
    }

    /// Drops every pending request.
    pub const fn reset(&mut self) {
        self.hardware = 0;
        self.software = None;
    }
}
