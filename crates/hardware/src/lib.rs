//! MIPS32 simulation engine library.
//!
//! This crate implements a bit-exact MIPS32 instruction codec and a cycle-driven
//! simulation engine with the following:
//! 1. **ISA:** Encoding/decoding of every MIPS32 format, decode tables and the default
//!    MIPS32 instruction subset.
//! 2. **Core:** Machine state, the single-cycle fetch/execute loop, the decoded
//!    instruction cache, interrupt arbitration and exception vectoring.
//! 3. **Memory:** The injected memory seam and a flat sparse implementation.
//! 4. **Simulation:** A threaded engine with cancellation, breakpoints, undo, events and
//!    console input.
//! 5. **Configuration and Statistics:** JSON configuration and run counters.

/// Common types and constants (registers, COP0 layout, exceptions, errors).
pub mod common;
/// Engine configuration (defaults, JSON deserialization).
pub mod config;
/// Machine state and cycle execution (icache, interrupts, undo).
pub mod core;
/// Instruction set (formats, codec, decode tables, MIPS32 semantics).
pub mod isa;
/// Threaded engine, loader, console and events.
pub mod sim;
/// Memory seam and flat memory.
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Engine configuration; use `SimulationConfig::default()` or deserialize from JSON.
pub use crate::config::SimulationConfig;
/// Machine state owned by the engine.
pub use crate::core::Machine;
/// Threaded control surface; construct with `Simulator::new`.
pub use crate::sim::Simulator;
