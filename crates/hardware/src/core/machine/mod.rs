//! Machine State Definition.
//!
//! This module defines the `Machine` structure, the container for everything one
//! simulated program touches. It coordinates the following:
//! 1. **State Management:** Registers, memory, pending interrupts and the exit status.
//! 2. **Instruction Supply:** The decoded instruction cache and the decode table.
//! 3. **Change Capture:** The per-cycle change record backing rollback and undo.
//! 4. **Notifications:** Events produced during a cycle, drained by the engine once the
//!    machine is released.
//!
//! The cycle itself lives in `cycle`, exception dispatch in `trap` and recorded
//! register/memory access in `access`.

/// Recorded register and memory access.
pub mod access;

/// Cycle execution, commit, rollback and undo.
pub mod cycle;

/// Exception and interrupt dispatch.
pub mod trap;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::arch::Architecture;
use super::icache::InstructionCache;
use super::interrupt::InterruptController;
use super::undo::{StepChanges, UndoLog};
use crate::common::constants::{
    COP0_STATUS, KERNEL_TEXT_BASE, STATUS_ERL, STATUS_EXL, STATUS_UM, TEXT_BASE,
};
use crate::common::reg::bits;
use crate::common::{Registers, SimError};
use crate::config::SimulationConfig;
use crate::isa::table::DecodeTable;
use crate::sim::console::Console;
use crate::sim::events::SimulationEvent;
use crate::soc::memory::Memory;
use crate::stats::SimStats;

pub use self::cycle::CycleOutcome;

/// Extent of the loaded text sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLayout {
    /// First user text address; the initial PC.
    pub text_base: u32,
    /// Number of user instruction words.
    pub text_words: usize,
    /// Address just past the last kernel instruction.
    pub kernel_text_limit: u32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            text_base: TEXT_BASE,
            text_words: 0,
            kernel_text_limit: KERNEL_TEXT_BASE,
        }
    }
}

/// Simulated MIPS32 machine.
///
/// Owned by the engine behind a mutex; the worker holds the lock for exactly one cycle
/// at a time.
pub struct Machine {
    registers: Registers,
    memory: Box<dyn Memory>,
    icache: InstructionCache,
    decoder: Arc<dyn DecodeTable>,
    architecture: Architecture,
    interrupts: InterruptController,
    console: Arc<Console>,

    current: StepChanges,
    in_flight: Option<cycle::Checkpoint>,
    undo: UndoLog,
    undo_active: bool,
    call_events: bool,
    pending_events: Vec<SimulationEvent>,

    cycles: u64,
    finished: bool,
    exit_code: Option<i32>,
    kernel_text_limit: u32,
    stats: SimStats,
    last_failure: Option<SimError>,
}

impl Machine {
    /// Builds a machine over loaded memory.
    ///
    /// Snapshots registers and memory so [`reset`](Self::reset) returns here.
    ///
    /// # Arguments
    ///
    /// * `memory` - Memory already holding the program.
    /// * `layout` - Extent of the loaded text sections.
    /// * `decoder` - Table resolving instruction words.
    /// * `console` - Log sink and input queue shared with the host.
    /// * `config` - Engine configuration.
    pub fn new(
        mut memory: Box<dyn Memory>,
        layout: TextLayout,
        decoder: Arc<dyn DecodeTable>,
        console: Arc<Console>,
        config: &SimulationConfig,
    ) -> Self {
        memory.save_state();
        Self {
            registers: Registers::new(layout.text_base),
            memory,
            icache: InstructionCache::new(
                layout.text_base,
                layout.text_words,
                config.instruction_cache,
            ),
            decoder,
            architecture: config.architecture,
            interrupts: InterruptController::new(),
            console,
            current: StepChanges::default(),
            in_flight: None,
            undo: UndoLog::new(config.max_undo_steps),
            undo_active: config.undo_active(),
            call_events: config.call_events,
            pending_events: Vec::new(),
            cycles: 0,
            finished: false,
            exit_code: None,
            kernel_text_limit: layout.kernel_text_limit,
            stats: SimStats::default(),
            last_failure: None,
        }
    }

    /// Register file.
    pub const fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Memory as seen by the engine.
    pub fn memory(&self) -> &dyn Memory {
        self.memory.as_ref()
    }

    /// Decoded instruction cache.
    pub const fn icache(&self) -> &InstructionCache {
        &self.icache
    }

    /// Pending interrupt requests.
    pub const fn interrupts(&self) -> &InterruptController {
        &self.interrupts
    }

    /// Console shared with the host.
    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Current PC.
    #[inline]
    pub const fn pc(&self) -> u32 {
        self.registers.pc()
    }

    /// Committed cycles since construction or reset, minus undone ones.
    #[inline]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the program has finished.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Exit code, once finished.
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Whether committed cycles are recorded for undo.
    pub const fn is_undo_active(&self) -> bool {
        self.undo_active
    }

    /// Number of cycles that can currently be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Most recent non-fatal failure observed by the engine.
    pub const fn last_failure(&self) -> Option<&SimError> {
        self.last_failure.as_ref()
    }

    pub(crate) fn set_last_failure(&mut self, failure: SimError) {
        self.last_failure = Some(failure);
    }

    /// Statistics, including the instruction cache counters.
    pub fn stats(&self) -> SimStats {
        SimStats {
            icache: self.icache.counters(),
            ..self.stats
        }
    }

    pub(crate) fn add_execution_time(&mut self, elapsed: Duration) {
        self.stats.execution_time += elapsed;
    }

    /// Whether the processor is in kernel mode: `UM` clear, or `EXL` or `ERL` set.
    pub const fn is_kernel_mode(&self) -> bool {
        let status = self.registers.cop0(COP0_STATUS);
        bits(status, STATUS_UM, 1) == 0
            || bits(status, STATUS_EXL, 1) == 1
            || bits(status, STATUS_ERL, 1) == 1
    }

    /// Address just past the text section the PC is expected to stay in.
    pub fn active_text_limit(&self) -> u32 {
        if self.is_kernel_mode() {
            self.kernel_text_limit
        } else {
            self.icache.text_limit()
        }
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn push_event(&mut self, event: SimulationEvent) {
        self.pending_events.push(event);
    }

    /// Resets every cache level of the memory hierarchy, outermost first.
    pub fn reset_caches(&mut self) {
        let mut level: Option<&mut dyn Memory> = Some(self.memory.as_mut());
        while let Some(memory) = level {
            memory.reset_cache();
            level = memory.next_level_mut();
        }
    }

    /// Returns registers and memory to their snapshot and forgets all run history.
    ///
    /// Queues a `Reset` event.
    pub fn reset(&mut self) {
        self.registers.restore_saved_state();
        self.memory.restore_saved_state();
        self.icache.reset();
        self.interrupts.reset();
        self.undo.clear();
        self.current = StepChanges::default();
        self.in_flight = None;
        self.cycles = 0;
        self.finished = false;
        self.exit_code = None;
        self.stats = SimStats::default();
        self.last_failure = None;
        self.console.clear_input();
        self.pending_events.push(SimulationEvent::Reset);
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("pc", &format_args!("0x{:08x}", self.registers.pc()))
            .field("cycles", &self.cycles)
            .field("finished", &self.finished)
            .field("exit_code", &self.exit_code)
            .field("icache", &self.icache)
            .field("interrupts", &self.interrupts)
            .finish_non_exhaustive()
    }
}
