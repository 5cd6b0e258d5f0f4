//! Execution context.
//!
//! The view of the machine handed to an executing instruction. Every write made through
//! it is recorded for rollback and undo, invalidates the instruction cache when it lands
//! in text, and is announced on the event bus when events are enabled.

use super::arch::ExecutionFault;
use super::machine::Machine;
use super::undo::Width;
use crate::common::{MipsException, RegisterId};
use crate::sim::console::Severity;

/// Mutable access to the machine for the duration of one execution.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    machine: &'a mut Machine,
}

impl<'a> ExecutionContext<'a> {
    pub(crate) const fn new(machine: &'a mut Machine) -> Self {
        Self { machine }
    }

    /// Reads a general-purpose register.
    #[inline]
    pub fn gpr(&self, idx: u32) -> u32 {
        self.machine.registers().gpr(idx as usize)
    }

    /// Writes a general-purpose register. Writes to `$zero` are discarded.
    #[inline]
    pub fn set_gpr(&mut self, idx: u32, value: u32) {
        if idx != 0 {
            self.machine.set_register(RegisterId::Gpr(idx as u8), value);
        }
    }

    /// Reads HI.
    pub fn hi(&self) -> u32 {
        self.machine.registers().get(RegisterId::Hi)
    }

    /// Writes HI.
    pub fn set_hi(&mut self, value: u32) {
        self.machine.set_register(RegisterId::Hi, value);
    }

    /// Reads LO.
    pub fn lo(&self) -> u32 {
        self.machine.registers().get(RegisterId::Lo)
    }

    /// Writes LO.
    pub fn set_lo(&mut self, value: u32) {
        self.machine.set_register(RegisterId::Lo, value);
    }

    /// Current PC. Already advanced past the executing instruction.
    #[inline]
    pub fn pc(&self) -> u32 {
        self.machine.registers().pc()
    }

    /// Redirects control flow.
    #[inline]
    pub fn set_pc(&mut self, value: u32) {
        self.machine.set_register(RegisterId::Pc, value);
    }

    /// Reads a COP0 register.
    pub fn cop0(&self, register: (u8, u8)) -> u32 {
        self.machine.registers().cop0(register)
    }

    /// Writes a COP0 register.
    pub fn set_cop0(&mut self, register: (u8, u8), value: u32) {
        self.machine
            .set_register(RegisterId::cop0(register), value);
    }

    /// Reads a COP1 register.
    pub fn cop1(&self, idx: u32) -> u32 {
        self.machine.registers().get(RegisterId::Cop1(idx as u8))
    }

    /// Writes a COP1 register.
    pub fn set_cop1(&mut self, idx: u32, value: u32) {
        self.machine.set_register(RegisterId::Cop1(idx as u8), value);
    }

    /// Loads an aligned word, raising an address error on failure.
    pub fn load_word(&self, address: u32) -> Result<u32, MipsException> {
        self.machine
            .load(address, Width::Word)
            .map_err(|e| MipsException::from_memory(e, false))
    }

    /// Loads an aligned half-word, zero-extended.
    pub fn load_half(&self, address: u32) -> Result<u32, MipsException> {
        self.machine
            .load(address, Width::Half)
            .map_err(|e| MipsException::from_memory(e, false))
    }

    /// Loads a byte, zero-extended.
    pub fn load_byte(&self, address: u32) -> Result<u32, MipsException> {
        self.machine
            .load(address, Width::Byte)
            .map_err(|e| MipsException::from_memory(e, false))
    }

    /// Stores an aligned word, raising an address error on failure.
    pub fn store_word(&mut self, address: u32, value: u32) -> Result<(), MipsException> {
        self.machine
            .store(address, Width::Word, value)
            .map_err(|e| MipsException::from_memory(e, true))
    }

    /// Stores the low half of `value`.
    pub fn store_half(&mut self, address: u32, value: u32) -> Result<(), MipsException> {
        self.machine
            .store(address, Width::Half, value)
            .map_err(|e| MipsException::from_memory(e, true))
    }

    /// Stores the low byte of `value`.
    pub fn store_byte(&mut self, address: u32, value: u32) -> Result<(), MipsException> {
        self.machine
            .store(address, Width::Byte, value)
            .map_err(|e| MipsException::from_memory(e, true))
    }

    /// Takes a line of console input.
    ///
    /// Returns [`ExecutionFault::AwaitingInput`] when nothing is queued; propagate it
    /// with `?` and the cycle is retried once input arrives.
    pub fn pop_line(&mut self) -> Result<String, ExecutionFault> {
        self.machine
            .console()
            .try_pop_line()
            .ok_or(ExecutionFault::AwaitingInput)
    }

    /// Takes one character of console input. See [`pop_line`](Self::pop_line).
    pub fn pop_char(&mut self) -> Result<char, ExecutionFault> {
        self.machine
            .console()
            .try_pop_char()
            .ok_or(ExecutionFault::AwaitingInput)
    }

    /// Writes a line to the console log.
    pub fn print(&self, severity: Severity, line: &str) {
        self.machine.console().print(severity, line);
    }

    /// Ends the program with `code` once this cycle commits.
    pub fn request_exit(&mut self, code: i32) {
        self.machine.request_exit(code);
    }

    /// Number of cycles committed before this one.
    pub fn cycles(&self) -> u64 {
        self.machine.cycles()
    }
}
