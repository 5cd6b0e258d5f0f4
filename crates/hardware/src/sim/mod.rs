//! Simulation control and host interfaces.
//!
//! Provides the threaded engine hosts drive, the program loader, the console and log
//! seam, cancellation, and the event bus.

/// Log sink, input queue and cancellation token.
pub mod console;

/// Event types, listeners and the event bus.
pub mod events;

/// Program image placement.
pub mod loader;

/// Threaded simulation engine.
pub mod simulator;

pub use self::console::{CancelToken, Console, Log, Severity};
pub use self::events::{EventBus, EventResponse, ListenerId, SimulationEvent, SimulationListener};
pub use self::loader::ProgramImage;
pub use self::simulator::{RunState, Simulator};
