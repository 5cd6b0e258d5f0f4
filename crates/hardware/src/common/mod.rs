//! Common utilities and types used throughout the MIPS32 simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Memory layout, COP0 register numbers, field positions and vector offsets.
//! 2. **Error Handling:** MIPS exceptions, memory failures and engine errors.
//! 3. **Register Management:** The architectural register file and bit-field helpers.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types and exception definitions.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use error::{InterruptCause, MemoryError, MipsException, SimError};
pub use reg::{RegisterId, Registers};
