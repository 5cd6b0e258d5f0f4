//! Simulation Engine.
//!
//! This module provides `Simulator`, the control surface hosts drive. It coordinates:
//! 1. **Worker:** Each `run` or `step` spawns one worker thread that executes cycles
//!    while holding the machine lock for one cycle at a time.
//! 2. **Cancellation:** `stop` cancels the run's token; the worker observes it at the top
//!    of each cycle, in the throttle sleep and while waiting for input.
//! 3. **Notifications:** Events produced during a cycle are published once the machine
//!    lock is released, so listeners may inspect state.
//! 4. **Synchronized Mutation:** Breakpoints, interrupts, exit requests and cache resets
//!    go through the engine so they interleave with the worker between cycles.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use super::console::{CancelToken, Console, Log, Severity};
use super::events::{EventBus, EventResponse, ListenerId, SimulationEvent, SimulationListener};
use super::loader::ProgramImage;
use crate::common::{MipsException, SimError};
use crate::config::SimulationConfig;
use crate::core::machine::{CycleOutcome, Machine, TextLayout};
use crate::isa::table::{DecodeTable, InstructionSet};
use crate::soc::memory::{Memory, SimpleMemory};
use crate::stats::SimStats;

/// Observable state of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Idle; `run` and `step` are accepted.
    Ready,
    /// A worker is executing cycles.
    Running,
    /// The worker is waiting for console input.
    LockedOnInput,
    /// The program has finished; only `reset` and `undo_last_step` change that.
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunMode {
    Step,
    Run,
}

#[derive(Debug, Default)]
struct Control {
    running: bool,
    token: Option<CancelToken>,
    worker: Option<JoinHandle<()>>,
}

struct Shared {
    machine: Mutex<Machine>,
    control: Mutex<Control>,
    idle: Condvar,
    breakpoints: RwLock<BTreeSet<u32>>,
    events: EventBus,
    console: Arc<Console>,
    cycle_delay_ms: AtomicU64,
    call_events: bool,
}

/// A MIPS32 simulation driven from any thread.
///
/// # Example
///
/// ```
/// use mipsim_core::config::SimulationConfig;
/// use mipsim_core::sim::{ProgramImage, Simulator};
///
/// // addiu $t0, $zero, 5 ; addiu $t1, $t0, 7
/// let program = ProgramImage::new(vec![0x2408_0005, 0x2509_0007]);
/// let sim = Simulator::new(&program, None, SimulationConfig::default()).unwrap();
/// sim.run().unwrap();
/// sim.wait_for_finish();
///
/// assert_eq!(sim.exit_code(), Some(0));
/// assert_eq!(sim.with_machine(|m| m.registers().gpr(9)), 12);
/// ```
pub struct Simulator {
    shared: Arc<Shared>,
}

impl Simulator {
    /// Loads `program` into flat memory and decodes with the default MIPS32 table.
    ///
    /// # Errors
    ///
    /// Propagates [`ProgramImage::load`] failures.
    pub fn new(
        program: &ProgramImage,
        log: Option<Arc<dyn Log>>,
        config: SimulationConfig,
    ) -> Result<Self, SimError> {
        let mut memory = SimpleMemory::new();
        let layout = program.load(&mut memory)?;
        Ok(Self::with_parts(
            Box::new(memory),
            layout,
            Arc::new(InstructionSet::mips32()),
            log,
            config,
        ))
    }

    /// Builds a simulation over caller-supplied memory and decode table.
    ///
    /// # Arguments
    ///
    /// * `memory` - Memory already holding the program; may be a cache hierarchy.
    /// * `layout` - Extent of the loaded text sections.
    /// * `decoder` - Table resolving instruction words.
    /// * `log` - Output sink; `None` discards output.
    /// * `config` - Engine configuration.
    pub fn with_parts(
        memory: Box<dyn Memory>,
        layout: TextLayout,
        decoder: Arc<dyn DecodeTable>,
        log: Option<Arc<dyn Log>>,
        config: SimulationConfig,
    ) -> Self {
        let console = Arc::new(Console::new(log));
        let machine = Machine::new(memory, layout, decoder, Arc::clone(&console), &config);
        Self {
            shared: Arc::new(Shared {
                machine: Mutex::new(machine),
                control: Mutex::new(Control::default()),
                idle: Condvar::new(),
                breakpoints: RwLock::new(BTreeSet::new()),
                events: EventBus::new(),
                console,
                cycle_delay_ms: AtomicU64::new(config.cycle_delay_ms),
                call_events: config.call_events,
            }),
        }
    }

    /// Executes exactly one cycle on a worker.
    ///
    /// # Errors
    ///
    /// * [`SimError::AlreadyRunning`] while a run or step is in progress.
    /// * [`SimError::Finished`] once the program has finished.
    pub fn step(&self) -> Result<(), SimError> {
        self.start(RunMode::Step)
    }

    /// Executes cycles on a worker until the program finishes, a breakpoint is reached
    /// or [`stop`](Self::stop) is called.
    ///
    /// # Errors
    ///
    /// * [`SimError::AlreadyRunning`] while a run or step is in progress.
    /// * [`SimError::Finished`] once the program has finished.
    pub fn run(&self) -> Result<(), SimError> {
        self.start(RunMode::Run)
    }

    fn start(&self, mode: RunMode) -> Result<(), SimError> {
        let mut control = self.shared.control();
        if control.running {
            return Err(SimError::AlreadyRunning);
        }
        if self.shared.machine().is_finished() {
            return Err(SimError::Finished);
        }
        if let Some(previous) = control.worker.take() {
            let _ = previous.join();
        }

        let token = CancelToken::new();
        control.running = true;
        control.token = Some(token.clone());
        let shared = Arc::clone(&self.shared);
        control.worker = Some(thread::spawn(move || shared.work(&token, mode)));
        Ok(())
    }

    /// Requests the current run or step to stop. Returns immediately.
    ///
    /// No partially executed cycle is committed.
    pub fn stop(&self) {
        if let Some(token) = &self.shared.control().token {
            token.cancel();
        }
    }

    /// Blocks until no worker is executing.
    pub fn wait_for_finish(&self) {
        let control = self.shared.control();
        let _control = self
            .shared
            .idle
            .wait_while(control, |control| control.running)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Blocks until no worker is executing or `timeout` elapses.
    ///
    /// # Returns
    ///
    /// `true` if the worker is idle.
    pub fn wait_for_finish_timeout(&self, timeout: Duration) -> bool {
        let control = self.shared.control();
        let (control, _) = self
            .shared
            .idle
            .wait_timeout_while(control, timeout, |control| control.running)
            .unwrap_or_else(PoisonError::into_inner);
        !control.running
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        let running = self.shared.control().running;
        if running {
            if self.shared.console.is_locked() {
                RunState::LockedOnInput
            } else {
                RunState::Running
            }
        } else if self.shared.machine().is_finished() {
            RunState::Finished
        } else {
            RunState::Ready
        }
    }

    /// Stops any run, waits for it, and returns registers and memory to their initial
    /// snapshot. Breakpoints are kept.
    pub fn reset(&self) {
        self.stop();
        self.wait_for_finish();
        let events = {
            let mut machine = self.shared.machine();
            machine.reset();
            machine.take_events()
        };
        self.shared.publish_all(&events);
    }

    /// Reverts the most recently committed cycle.
    ///
    /// # Errors
    ///
    /// * [`SimError::AlreadyRunning`] while a run or step is in progress.
    /// * [`SimError::UndoUnavailable`] if undo is disabled for this simulation.
    /// * [`SimError::NothingToUndo`] if no cycle is recorded.
    pub fn undo_last_step(&self) -> Result<(), SimError> {
        self.with_machine_mut(Machine::undo_last_step)?
    }

    /// Finishes the program with `code`, waking a worker blocked on input.
    pub fn request_exit(&self, code: i32) {
        let events = {
            let mut machine = self.shared.machine();
            machine.request_exit(code);
            machine.take_events()
        };
        self.shared.publish_all(&events);
        self.stop();
    }

    /// Flags an external interrupt at `level`. Taken before the next fetch if Status
    /// accepts it.
    pub fn request_hardware_interrupt(&self, level: u32) {
        self.shared.machine().request_hardware_interrupt(level);
    }

    /// Queues a software exception, taken before the next fetch.
    pub fn request_software_interrupt(&self, exception: MipsException) {
        let events = {
            let mut machine = self.shared.machine();
            machine.request_software_interrupt(exception);
            machine.take_events()
        };
        self.shared.publish_all(&events);
    }

    /// Adds a breakpoint. Returns whether it was new.
    pub fn add_breakpoint(&self, address: u32) -> bool {
        let added = self.shared.breakpoints_mut().insert(address);
        if added {
            let _ = self
                .shared
                .events
                .publish(&SimulationEvent::BreakpointAdded(address));
        }
        added
    }

    /// Removes a breakpoint. Returns whether it existed.
    pub fn remove_breakpoint(&self, address: u32) -> bool {
        let removed = self.shared.breakpoints_mut().remove(&address);
        if removed {
            let _ = self
                .shared
                .events
                .publish(&SimulationEvent::BreakpointRemoved(address));
        }
        removed
    }

    /// Adds the breakpoint if absent, removes it otherwise.
    ///
    /// # Returns
    ///
    /// Whether a breakpoint is set at `address` afterwards.
    pub fn toggle_breakpoint(&self, address: u32) -> bool {
        if self.remove_breakpoint(address) {
            false
        } else {
            self.add_breakpoint(address)
        }
    }

    /// Whether a breakpoint is set at `address`.
    pub fn has_breakpoint(&self, address: u32) -> bool {
        self.shared.breakpoints().contains(&address)
    }

    /// All breakpoints in ascending address order.
    pub fn breakpoints(&self) -> Vec<u32> {
        self.shared.breakpoints().iter().copied().collect()
    }

    /// Resets every cache level of the memory hierarchy.
    ///
    /// # Returns
    ///
    /// `false` if a listener vetoed the reset.
    ///
    /// # Errors
    ///
    /// [`SimError::AlreadyRunning`] while a run or step is in progress.
    pub fn reset_caches(&self) -> Result<bool, SimError> {
        if self.shared.control().running {
            return Err(SimError::AlreadyRunning);
        }
        if self.shared.events.publish(&SimulationEvent::CachesResetBefore) == EventResponse::Cancel
        {
            return Ok(false);
        }
        self.with_machine_mut(Machine::reset_caches)?;
        let _ = self.shared.events.publish(&SimulationEvent::CachesReset);
        Ok(true)
    }

    /// Changes the throttle between cycles. Takes effect at the next sleep.
    pub fn set_cycle_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.shared.cycle_delay_ms.store(millis, Ordering::Relaxed);
    }

    /// Current throttle between cycles.
    pub fn cycle_delay(&self) -> Duration {
        Duration::from_millis(self.shared.cycle_delay_ms.load(Ordering::Relaxed))
    }

    /// Registers an event listener.
    pub fn subscribe(&self, listener: Arc<dyn SimulationListener>) -> ListenerId {
        self.shared.events.subscribe(listener)
    }

    /// Removes an event listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Console shared with executing instructions.
    pub fn console(&self) -> &Console {
        &self.shared.console
    }

    /// Runs `f` with shared access to the machine.
    ///
    /// While running this waits for the current cycle to end and observes committed
    /// state only.
    pub fn with_machine<R>(&self, f: impl FnOnce(&Machine) -> R) -> R {
        f(&self.shared.machine())
    }

    /// Runs `f` with exclusive access to the machine and publishes the events it
    /// produced.
    ///
    /// # Errors
    ///
    /// [`SimError::AlreadyRunning`] while a run or step is in progress.
    pub fn with_machine_mut<R>(&self, f: impl FnOnce(&mut Machine) -> R) -> Result<R, SimError> {
        let control = self.shared.control();
        if control.running {
            return Err(SimError::AlreadyRunning);
        }
        let (result, events) = {
            let mut machine = self.shared.machine();
            let result = f(&mut machine);
            (result, machine.take_events())
        };
        drop(control);
        self.shared.publish_all(&events);
        Ok(result)
    }

    /// Exit code, once finished.
    pub fn exit_code(&self) -> Option<i32> {
        self.shared.machine().exit_code()
    }

    /// Committed cycles.
    pub fn cycles(&self) -> u64 {
        self.shared.machine().cycles()
    }

    /// Statistics accumulated since construction or the last reset.
    pub fn stats(&self) -> SimStats {
        self.shared.machine().stats()
    }

    /// Most recent non-fatal failure: a decode failure or a worker panic.
    pub fn last_failure(&self) -> Option<SimError> {
        self.shared.machine().last_failure().cloned()
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.stop();
        let worker = self.shared.control().worker.take();
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("state", &self.state())
            .field("breakpoints", &self.shared.breakpoints().len())
            .field("events", &self.shared.events)
            .finish_non_exhaustive()
    }
}

impl Shared {
    fn machine(&self) -> MutexGuard<'_, Machine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn breakpoints(&self) -> std::sync::RwLockReadGuard<'_, BTreeSet<u32>> {
        self.breakpoints.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn breakpoints_mut(&self) -> std::sync::RwLockWriteGuard<'_, BTreeSet<u32>> {
        self.breakpoints
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_all(&self, events: &[SimulationEvent]) {
        for event in events {
            let _ = self.events.publish(event);
        }
    }

    /// Worker entry point: executes, then reports and returns to idle.
    fn work(&self, token: &CancelToken, mode: RunMode) {
        let _ = self.events.publish(&SimulationEvent::Start);
        debug!(?mode, "worker started");

        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(token, mode)));
        let elapsed = started.elapsed();

        let executed = match result {
            Ok(executed) => executed,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_owned())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_owned());
                error!(%message, "simulation worker panicked");
                self.console.print(
                    Severity::Error,
                    &format!("Simulation stopped by an internal error: {message}"),
                );
                let mut machine = self.machine();
                machine.abandon_cycle();
                machine.set_last_failure(SimError::WorkerPanicked(message));
                0
            }
        };

        self.machine().add_execution_time(elapsed);

        if mode == RunMode::Run {
            let millis = elapsed.as_millis();
            let rate = if elapsed.as_secs_f64() > 0.0 {
                executed as f64 / elapsed.as_secs_f64()
            } else {
                0.0
            };
            self.console.print(
                Severity::Info,
                &format!("{executed} cycles executed in {millis} ms."),
            );
            self.console
                .print(Severity::Info, &format!("{rate:.0} cycles/s"));
            info!(executed, millis, rate, "run ended");
        }
        self.console.flush();

        let _ = self.events.publish(&SimulationEvent::Stop);

        let mut control = self.control();
        control.running = false;
        control.token = None;
        self.idle.notify_all();
    }

    /// Cycle loop. Returns the number of committed cycles.
    fn execute(&self, token: &CancelToken, mode: RunMode) -> u64 {
        let mut executed = 0;
        let mut first = true;
        let mut retrying = false;

        loop {
            if token.is_cancelled() {
                break;
            }
            let (pc, cycle) = {
                let machine = self.machine();
                if machine.is_finished() {
                    break;
                }
                (machine.pc(), machine.cycles())
            };

            if !retrying {
                if !first && self.breakpoints().contains(&pc) {
                    debug!(pc = format_args!("0x{pc:08x}"), "breakpoint reached");
                    let _ = self.events.publish(&SimulationEvent::BreakpointHit(pc));
                    break;
                }
                if self.call_events
                    && self
                        .events
                        .publish(&SimulationEvent::CycleBefore { cycle, pc })
                        == EventResponse::Cancel
                {
                    break;
                }
            }

            let (outcome, events) = {
                let mut machine = self.machine();
                let outcome = machine.cycle();
                (outcome, machine.take_events())
            };
            self.publish_all(&events);

            match outcome {
                CycleOutcome::Committed => executed += 1,
                CycleOutcome::Finished => {
                    executed += 1;
                    break;
                }
                CycleOutcome::AwaitingInput => {
                    if !self.console.wait_for_input(token, &self.events) {
                        break;
                    }
                    retrying = true;
                    continue;
                }
            }

            first = false;
            retrying = false;
            if mode == RunMode::Step {
                break;
            }
            let delay = self.cycle_delay_ms.load(Ordering::Relaxed);
            if delay > 0 && token.sleep(Duration::from_millis(delay)) {
                break;
            }
        }
        executed
    }
}
