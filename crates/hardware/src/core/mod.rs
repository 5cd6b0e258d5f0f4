//! Simulated processor.
//!
//! This module contains the machine state and the pieces a cycle is built from: the
//! execution abstraction, the execution context, the decoded instruction cache, the
//! interrupt controller and the change log behind rollback and undo.

/// Processor organisations and the execution abstraction.
pub mod arch;

/// Mutable machine view handed to executing instructions.
pub mod context;

/// Decoded instruction cache.
pub mod icache;

/// Pending interrupt bookkeeping.
pub mod interrupt;

/// Machine state, cycle execution and exception dispatch.
pub mod machine;

/// Per-cycle change records and the undo history.
pub mod undo;

pub use self::arch::{Architecture, Execution, ExecutionFault};
pub use self::context::ExecutionContext;
pub use self::machine::{CycleOutcome, Machine, TextLayout};
