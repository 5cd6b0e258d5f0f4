//! Simulation notifications.
//!
//! The engine publishes lifecycle, cycle and mutation events on an `EventBus`. Listeners
//! run on the publishing thread, which is the worker for cycle events. "Before" events
//! can be vetoed by returning [`EventResponse::Cancel`].
//!
//! Events for a cycle are delivered after the machine lock is released, so listeners may
//! read simulation state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::common::RegisterId;
use crate::core::undo::Width;

/// A notification published by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationEvent {
    /// A run or step is starting.
    Start,
    /// A run or step ended, after any `Finished` it produced.
    Stop,
    /// A cycle is about to execute. Cancellable.
    CycleBefore {
        /// Cycles committed before this one.
        cycle: u64,
        /// PC before the cycle.
        pc: u32,
    },
    /// A cycle was committed.
    CycleAfter {
        /// Cycles committed, including this one.
        cycle: u64,
        /// PC after the cycle.
        pc: u32,
    },
    /// The worker is blocked waiting for console input.
    Lock,
    /// Console input arrived or the wait was cancelled.
    Unlock,
    /// The program finished.
    Finished {
        /// Exit code of the program.
        exit_code: i32,
    },
    /// Registers and memory were restored to their snapshot.
    Reset,
    /// The most recent cycle was undone.
    Undo {
        /// Cycle counter after the undo.
        cycle: u64,
    },
    /// A breakpoint was added.
    BreakpointAdded(u32),
    /// A breakpoint was removed.
    BreakpointRemoved(u32),
    /// A run stopped on a breakpoint.
    BreakpointHit(u32),
    /// Cache levels are about to be reset. Cancellable.
    CachesResetBefore,
    /// Cache levels were reset.
    CachesReset,
    /// A register was written during a cycle.
    RegisterWritten(RegisterId),
    /// Memory was written during a cycle.
    MemoryWritten {
        /// Address written.
        address: u32,
        /// Width of the write.
        width: Width,
    },
}

impl SimulationEvent {
    /// Whether a listener may veto this event.
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::CycleBefore { .. } | Self::CachesResetBefore)
    }
}

/// A listener's answer to an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EventResponse {
    /// Let the engine proceed.
    #[default]
    Continue,
    /// Veto a cancellable event. Ignored for other events.
    Cancel,
}

/// Receives simulation events.
pub trait SimulationListener: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &SimulationEvent) -> EventResponse;
}

impl<F> SimulationListener for F
where
    F: Fn(&SimulationEvent) -> EventResponse + Send + Sync,
{
    fn on_event(&self, event: &SimulationEvent) -> EventResponse {
        self(event)
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Synchronous fan-out of events to listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn SimulationListener>)>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe(&self, listener: Arc<dyn SimulationListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Removes a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        listeners.len() != before
    }

    /// Delivers `event` to every listener in subscription order.
    ///
    /// # Returns
    ///
    /// `Cancel` if the event is cancellable and at least one listener vetoed it.
    pub fn publish(&self, event: &SimulationEvent) -> EventResponse {
        let listeners: Vec<_> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let mut response = EventResponse::Continue;
        for listener in listeners {
            if listener.on_event(event) == EventResponse::Cancel && event.is_cancellable() {
                response = EventResponse::Cancel;
            }
        }
        response
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .listeners
            .read()
            .map_or(0, |listeners| listeners.len());
        f.debug_struct("EventBus")
            .field("listeners", &count)
            .finish_non_exhaustive()
    }
}
