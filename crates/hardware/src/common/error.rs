//! Exception and Error definitions.
//!
//! This module defines the failure vocabulary of the simulator. It provides:
//! 1. **Exception Representation:** MIPS exception causes as written into `Cause.ExcCode`.
//! 2. **Memory Errors:** Alignment and mapping failures raised by memory implementations.
//! 3. **Engine Errors:** Caller-facing failures of the simulation control surface.

use std::fmt;

/// MIPS exception cause codes.
///
/// The discriminant is the value stored in `Cause.ExcCode` when the exception is taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum InterruptCause {
    /// External (hardware) interrupt.
    Interrupt = 0,
    /// TLB modification.
    TlbModification = 1,
    /// TLB miss on load or fetch.
    TlbLoad = 2,
    /// TLB miss on store.
    TlbStore = 3,
    /// Address error on load or fetch.
    AddressLoad = 4,
    /// Address error on store.
    AddressStore = 5,
    /// Bus error on fetch.
    BusFetch = 6,
    /// Bus error on data access.
    BusLoadStore = 7,
    /// `syscall` executed.
    Syscall = 8,
    /// `break` executed.
    Breakpoint = 9,
    /// Undecodable or reserved instruction.
    ReservedInstruction = 10,
    /// Coprocessor unusable.
    CoprocessorUnusable = 11,
    /// Signed arithmetic overflow.
    ArithmeticOverflow = 12,
    /// Conditional trap taken.
    Trap = 13,
    /// MSA floating-point exception.
    MsaFloatingPoint = 14,
    /// Floating-point exception.
    FloatingPoint = 15,
    /// Watchpoint hit.
    Watch = 23,
    /// Machine check.
    MachineCheck = 24,
    /// Cache error.
    CacheError = 30,
}

impl InterruptCause {
    /// Returns the `ExcCode` value of this cause.
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Human-readable name used in termination messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "INTERRUPT",
            Self::TlbModification => "TLB_MODIFICATION",
            Self::TlbLoad => "TLB_LOAD",
            Self::TlbStore => "TLB_STORE",
            Self::AddressLoad => "ADDRESS_LOAD",
            Self::AddressStore => "ADDRESS_STORE",
            Self::BusFetch => "BUS_FETCH",
            Self::BusLoadStore => "BUS_LOAD_STORE",
            Self::Syscall => "SYSCALL",
            Self::Breakpoint => "BREAKPOINT",
            Self::ReservedInstruction => "RESERVED_INSTRUCTION",
            Self::CoprocessorUnusable => "COPROCESSOR_UNUSABLE",
            Self::ArithmeticOverflow => "ARITHMETIC_OVERFLOW",
            Self::Trap => "TRAP",
            Self::MsaFloatingPoint => "MSA_FLOATING_POINT",
            Self::FloatingPoint => "FLOATING_POINT",
            Self::Watch => "WATCH",
            Self::MachineCheck => "MACHINE_CHECK",
            Self::CacheError => "CACHE_ERROR",
        }
    }
}

impl fmt::Display for InterruptCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A synchronous MIPS exception raised while executing an instruction.
///
/// Executions return this value instead of mutating COP0 themselves; the engine
/// queues it as a software interrupt and dispatches it at the top of the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MipsException {
    /// Cause written into `Cause.ExcCode`.
    pub cause: InterruptCause,
    /// Faulting address, written into BadVAddr when present.
    pub bad_address: Option<u32>,
}

impl MipsException {
    /// Creates an exception without a faulting address.
    #[inline]
    pub const fn new(cause: InterruptCause) -> Self {
        Self {
            cause,
            bad_address: None,
        }
    }

    /// Creates an exception carrying the faulting address.
    #[inline]
    pub const fn with_address(cause: InterruptCause, address: u32) -> Self {
        Self {
            cause,
            bad_address: Some(address),
        }
    }

    /// Converts a memory failure into the matching address exception.
    ///
    /// # Arguments
    ///
    /// * `error` - The failure reported by the memory.
    /// * `store` - Whether the access was a store.
    ///
    /// # Returns
    ///
    /// `AddressStore` for stores, `AddressLoad` otherwise, carrying the address.
    pub const fn from_memory(error: MemoryError, store: bool) -> Self {
        let cause = if store {
            InterruptCause::AddressStore
        } else {
            InterruptCause::AddressLoad
        };
        Self::with_address(cause, error.address())
    }
}

impl fmt::Display for MipsException {
    /// Formats the exception for display.
    ///
    /// # Arguments
    ///
    /// * `f` - The formatter to write to.
    ///
    /// # Returns
    ///
    /// A formatting result indicating success or failure.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bad_address {
            Some(addr) => write!(
                f,
                "{}({}) at 0x{:08x}",
                self.cause.name(),
                self.cause.code(),
                addr
            ),
            None => write!(f, "{}({})", self.cause.name(), self.cause.code()),
        }
    }
}

impl std::error::Error for MipsException {}

/// Failure of a single memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// The address is not a multiple of the access width.
    #[error("unaligned {width}-byte access at 0x{address:08x}")]
    Unaligned {
        /// Requested address.
        address: u32,
        /// Access width in bytes.
        width: u32,
    },
    /// The address lies outside every memory section.
    #[error("address 0x{address:08x} is not mapped")]
    Unmapped {
        /// Requested address.
        address: u32,
    },
}

impl MemoryError {
    /// The address that caused the failure.
    pub const fn address(self) -> u32 {
        match self {
            Self::Unaligned { address, .. } | Self::Unmapped { address } => address,
        }
    }
}

/// Failures surfaced by the simulation control surface.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A run or step is already executing on the worker.
    #[error("the simulation is already running")]
    AlreadyRunning,
    /// The simulation has finished; reset it before stepping again.
    #[error("the simulation has finished")]
    Finished,
    /// Undo was requested on a simulation configured without it.
    #[error("undo is disabled for this simulation")]
    UndoUnavailable,
    /// Undo was requested with an empty history.
    #[error("there is no step to undo")]
    NothingToUndo,
    /// A fetched word matched no instruction definition.
    #[error("instruction at 0x{address:08x} (0x{word:08x}) could not be decoded")]
    DecodeFailure {
        /// Address of the word.
        address: u32,
        /// The raw word.
        word: u32,
    },
    /// The worker panicked in the middle of a cycle.
    #[error("simulation worker panicked: {0}")]
    WorkerPanicked(String),
    /// A memory access outside of instruction execution failed.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// The program image could not be placed in memory.
    #[error("invalid program: {0}")]
    InvalidProgram(String),
}
