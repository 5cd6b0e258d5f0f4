//! Cycle Execution.
//!
//! One call to [`Machine::cycle`] is one committed (or rolled back) clock cycle of the
//! single-cycle organisation:
//! 1. **Interrupt Check:** Pending requests are dispatched before fetch.
//! 2. **Fetch:** The instruction cache supplies the execution for the PC.
//! 3. **Execute:** The execution mutates state through an `ExecutionContext`; raised
//!    exceptions become software interrupt requests.
//! 4. **Commit:** The counters advance, the change set is pushed to the undo history and
//!    the PC is checked against the end of the active text section.
//!
//! A cycle that needs console input which has not arrived is rolled back instead and
//! retried by the engine.

use tracing::{debug, warn};

use super::Machine;
use crate::common::constants::{CAUSE_DC, COP0_CAUSE, COP0_COUNT, COP0_STATUS, WORD_SIZE};
use crate::common::reg::bits;
use crate::common::{InterruptCause, MipsException, RegisterId, SimError};
use crate::core::arch::ExecutionFault;
use crate::core::context::ExecutionContext;
use crate::core::icache::FetchError;
use crate::core::interrupt::{InterruptController, InterruptView};
use crate::core::undo::{Change, StepChanges};
use crate::sim::console::Severity;
use crate::sim::events::SimulationEvent;
use crate::stats::SimStats;

/// Result of one call to [`Machine::cycle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle committed and the program goes on.
    Committed,
    /// The program is finished; either this cycle ended it or it already had.
    Finished,
    /// An instruction needs console input. The cycle was rolled back.
    AwaitingInput,
}

/// Engine state outside registers and memory that a rollback restores.
pub(super) struct Checkpoint {
    interrupts: InterruptController,
    finished: bool,
    exit_code: Option<i32>,
    events: usize,
    stats: SimStats,
    last_failure: Option<SimError>,
}

impl Machine {
    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            interrupts: self.interrupts.clone(),
            finished: self.finished,
            exit_code: self.exit_code,
            events: self.pending_events.len(),
            stats: self.stats,
            last_failure: self.last_failure.clone(),
        }
    }

    /// Runs one cycle.
    pub fn cycle(&mut self) -> CycleOutcome {
        if self.finished {
            return CycleOutcome::Finished;
        }
        self.in_flight = Some(self.checkpoint());
        self.current = StepChanges::default();

        let dispatched = self.dispatch_interrupts();
        if !(dispatched && self.finished)
            && self.execute_current() == Err(ExecutionFault::AwaitingInput)
        {
            self.abandon_cycle();
            return CycleOutcome::AwaitingInput;
        }

        self.commit();
        if self.finished {
            CycleOutcome::Finished
        } else {
            CycleOutcome::Committed
        }
    }

    /// Fetches and executes the instruction at the PC.
    ///
    /// Exceptions are turned into software interrupt requests here; only the input
    /// fault reaches the caller.
    fn execute_current(&mut self) -> Result<(), ExecutionFault> {
        let pc = self.registers.pc();
        self.set_register(RegisterId::Pc, pc.wrapping_add(WORD_SIZE));

        let fetched = self.icache.fetch(
            pc,
            self.memory.as_ref(),
            self.decoder.as_ref(),
            self.architecture,
        );
        let execution = match fetched {
            Ok(execution) => execution,
            Err(FetchError::Memory(e)) => {
                self.request_software_interrupt(MipsException::with_address(
                    InterruptCause::AddressLoad,
                    e.address(),
                ));
                return Ok(());
            }
            Err(FetchError::Undecodable { word } | FetchError::Unsupported { word, .. }) => {
                self.console.print(
                    Severity::Error,
                    &format!("Instruction at 0x{pc:08x} (0x{word:08x}) could not be decoded."),
                );
                self.last_failure = Some(SimError::DecodeFailure { address: pc, word });
                self.request_software_interrupt(MipsException::with_address(
                    InterruptCause::ReservedInstruction,
                    pc,
                ));
                return Ok(());
            }
        };

        match execution.execute(&mut ExecutionContext::new(self)) {
            Ok(()) => Ok(()),
            Err(ExecutionFault::Exception(exception)) => {
                self.request_software_interrupt(exception);
                Ok(())
            }
            Err(fault @ ExecutionFault::AwaitingInput) => Err(fault),
        }
    }

    fn commit(&mut self) {
        self.cycles += 1;
        self.stats.cycles += 1;
        if bits(self.registers.cop0(COP0_CAUSE), CAUSE_DC, 1) == 0 {
            let count = self.registers.cop0(COP0_COUNT);
            self.set_register(RegisterId::cop0(COP0_COUNT), count.wrapping_add(1));
        }

        let mut step = std::mem::take(&mut self.current);
        if let Some(checkpoint) = self.in_flight.take() {
            step.record_interrupts(checkpoint.interrupts);
        }
        if self.undo_active {
            self.undo.push(step);
        }
        if self.call_events {
            self.pending_events.push(SimulationEvent::CycleAfter {
                cycle: self.cycles,
                pc: self.registers.pc(),
            });
        }

        let view = InterruptView::new(self.registers.cop0(COP0_STATUS));
        let pc = self.registers.pc();
        if !self.finished && !self.interrupts.has_pending(view) && pc >= self.active_text_limit()
        {
            warn!(pc = format_args!("0x{pc:08x}"), "dropped off the end of text");
            self.finish(0, Severity::Warning, "Execution finished. Dropped off bottom.");
        }
    }

    /// Discards the cycle in progress, if any.
    ///
    /// Used when a cycle cannot complete, either because it waits for input or because
    /// an execution unwound out of it.
    pub(crate) fn abandon_cycle(&mut self) {
        if let Some(checkpoint) = self.in_flight.take() {
            self.rollback(checkpoint);
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        let step = std::mem::take(&mut self.current);
        self.revert(&step);
        self.interrupts = checkpoint.interrupts;
        self.finished = checkpoint.finished;
        self.exit_code = checkpoint.exit_code;
        self.pending_events.truncate(checkpoint.events);
        self.stats = checkpoint.stats;
        self.stats.cycles_rolled_back += 1;
        self.last_failure = checkpoint.last_failure;
        debug!(
            pc = format_args!("0x{:08x}", self.registers.pc()),
            changes = step.len(),
            "cycle rolled back"
        );
    }

    /// Restores every value a cycle overwrote, most recent first.
    fn revert(&mut self, step: &StepChanges) {
        for change in step.reverted() {
            match *change {
                Change::Register { id, old } => self.registers.restore(id, old),
                Change::Memory {
                    address,
                    width,
                    old,
                } => {
                    if let Err(e) = self.write_raw(address, width, old) {
                        warn!(%e, "memory change could not be reverted");
                    }
                }
            }
        }
    }

    /// Reverts the most recently committed cycle.
    ///
    /// Registers, memory, pending interrupt requests, the cycle counter and the finished
    /// flag return to their values before that cycle. Queues an `Undo` event.
    ///
    /// # Errors
    ///
    /// * [`SimError::UndoUnavailable`] if undo is not active for this machine.
    /// * [`SimError::NothingToUndo`] if the history is empty.
    pub fn undo_last_step(&mut self) -> Result<(), SimError> {
        if !self.undo_active {
            return Err(SimError::UndoUnavailable);
        }
        let step = self.undo.pop().ok_or(SimError::NothingToUndo)?;
        self.revert(&step);
        if let Some(interrupts) = step.interrupts_before() {
            self.interrupts = interrupts.clone();
        }
        self.cycles = self.cycles.saturating_sub(1);
        self.stats.cycles_undone += 1;
        self.finished = false;
        self.exit_code = None;
        self.pending_events.push(SimulationEvent::Undo {
            cycle: self.cycles,
        });
        Ok(())
    }
}
