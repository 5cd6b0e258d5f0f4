//! System-on-Chip (SoC) Components.
//!
//! This module organizes the storage side of the simulated system: the memory seam the
//! engine talks to and the flat memory used when no cache hierarchy is injected.

/// Memory trait, sections and the default flat memory.
pub mod memory;

pub use memory::{Memory, Section, SimpleMemory};
