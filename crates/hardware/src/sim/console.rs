//! Console I/O and cooperative cancellation.
//!
//! This module connects the worker to the outside world. It provides:
//! 1. **`Log`:** The injected, severity-tagged line sink for user-facing messages.
//! 2. **`Console`:** The log sink plus a queue of input lines that executions pop from.
//! 3. **`CancelToken`:** The per-run stop signal observed by throttled sleeps and input
//!    waits.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, select, unbounded};

use super::events::{EventBus, SimulationEvent};

/// Severity tag of a console line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational output.
    Info,
    /// Something unusual that did not stop the program.
    Warning,
    /// The program failed.
    Error,
    /// The program completed.
    Done,
}

/// Line-oriented output sink supplied by the host.
pub trait Log: Send + Sync {
    /// Writes one line.
    fn print_line(&self, severity: Severity, line: &str);

    /// Forces buffered output out.
    fn flush(&self) {}
}

/// Signal shared between the controller and the worker of one run.
///
/// Cancelling closes a channel, so every present and future wait on
/// [`receiver`](Self::receiver) wakes immediately.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    /// Requests cancellation and wakes any wait in progress.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        drop(
            self.wake
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// # Returns
    ///
    /// `true` if the token is cancelled when the sleep ends.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        if duration.is_zero() {
            return false;
        }
        match self.receiver.recv_timeout(duration) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) => self.is_cancelled(),
        }
    }

    /// Channel that disconnects on cancellation, for use in `select!`.
    pub const fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Output sink and input queue of a simulation.
///
/// Executions never block: they take input with [`try_pop_line`](Self::try_pop_line)
/// or [`try_pop_char`](Self::try_pop_char) and report
/// [`ExecutionFault::AwaitingInput`](crate::core::arch::ExecutionFault::AwaitingInput)
/// when nothing is queued. The worker then waits in
/// [`wait_for_input`](Self::wait_for_input) without holding the machine.
pub struct Console {
    log: Option<Arc<dyn Log>>,
    input: Mutex<InputQueue>,
    arrivals_tx: Sender<()>,
    arrivals_rx: Receiver<()>,
    locked: AtomicBool,
}

#[derive(Debug, Default)]
struct InputQueue {
    lines: VecDeque<String>,
    partial: VecDeque<char>,
}

impl InputQueue {
    fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.partial.is_empty()
    }
}

impl Console {
    /// Creates a console writing to `log`, or discarding output when `None`.
    pub fn new(log: Option<Arc<dyn Log>>) -> Self {
        let (arrivals_tx, arrivals_rx) = unbounded();
        Self {
            log,
            input: Mutex::new(InputQueue::default()),
            arrivals_tx,
            arrivals_rx,
            locked: AtomicBool::new(false),
        }
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, InputQueue> {
        self.input.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes a line to the log, if one is attached.
    pub fn print(&self, severity: Severity, line: &str) {
        if let Some(log) = &self.log {
            log.print_line(severity, line);
        }
    }

    /// Flushes the log, if one is attached.
    pub fn flush(&self) {
        if let Some(log) = &self.log {
            log.flush();
        }
    }

    /// Queues a line of input and wakes a worker waiting for it.
    pub fn push_input(&self, line: impl Into<String>) {
        self.queue().lines.push_back(line.into());
        let _ = self.arrivals_tx.send(());
    }

    /// Whether the worker is currently waiting for input.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    /// Whether any input is queued.
    pub fn has_input(&self) -> bool {
        !self.queue().is_empty()
    }

    /// Drops queued input and any partially consumed line.
    pub fn clear_input(&self) {
        let mut queue = self.queue();
        queue.lines.clear();
        queue.partial.clear();
    }

    /// Takes the next line, or the rest of a line partially consumed by
    /// [`try_pop_char`](Self::try_pop_char).
    pub fn try_pop_line(&self) -> Option<String> {
        let mut queue = self.queue();
        if queue.partial.is_empty() {
            queue.lines.pop_front()
        } else {
            Some(queue.partial.drain(..).filter(|c| *c != '\n').collect())
        }
    }

    /// Takes the next character. Each line yields its characters followed by `'\n'`.
    pub fn try_pop_char(&self) -> Option<char> {
        let mut queue = self.queue();
        if queue.partial.is_empty() {
            let line = queue.lines.pop_front()?;
            queue.partial.extend(line.chars());
            queue.partial.push_back('\n');
        }
        queue.partial.pop_front()
    }

    /// Blocks until input is queued or `token` is cancelled.
    ///
    /// Flushes the log first and publishes `Lock`/`Unlock` around the wait.
    ///
    /// # Returns
    ///
    /// `true` if input is available, `false` if the wait was cancelled.
    pub fn wait_for_input(&self, token: &CancelToken, events: &EventBus) -> bool {
        if self.has_input() {
            return true;
        }
        self.flush();
        self.locked.store(true, Ordering::SeqCst);
        let _ = events.publish(&SimulationEvent::Lock);

        let available = loop {
            if token.is_cancelled() {
                break false;
            }
            if self.has_input() {
                break true;
            }
            select! {
                recv(self.arrivals_rx) -> _ => {}
                recv(token.receiver()) -> _ => {}
            }
        };

        self.locked.store(false, Ordering::SeqCst);
        let _ = events.publish(&SimulationEvent::Unlock);
        available
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("has_log", &self.log.is_some())
            .field("queued_lines", &self.queue().lines.len())
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}
