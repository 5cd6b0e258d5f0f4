//! MIPS32 Register File.
//!
//! This module provides the `Registers` struct holding the architectural state of the
//! processor. It provides:
//! 1. **General Purpose Registers:** 32 GPRs with `$zero` hard-wired, plus HI/LO and PC.
//! 2. **COP0:** The control coprocessor bank addressed by `(register, select)`.
//! 3. **COP1:** 32 raw floating-point registers.
//! 4. **Snapshots:** Save/restore of the whole file for simulation reset.

use std::fmt;

use super::constants::{
    CAUSE_RESET, COP0_CAUSE, COP0_EBASE, COP0_INTCTL, COP0_STATUS, EBASE_RESET, EBASE_WRITE_MASK,
    INITIAL_GP, INITIAL_SP, INTCTL_RESET, STATUS_RESET,
};

/// Number of general-purpose registers.
pub const GPR_COUNT: usize = 32;

/// Number of COP0 register numbers.
pub const COP0_REGISTERS: usize = 32;

/// Number of select values per COP0 register number.
pub const COP0_SELECTS: usize = 8;

/// Index of the global pointer.
pub const GP: usize = 28;

/// Index of the stack pointer.
pub const SP: usize = 29;

/// Index of the return address register.
pub const RA: usize = 31;

/// Identifies one architectural register.
///
/// Used by the undo log to record which register a mutation touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterId {
    /// General-purpose register `$0`-`$31`.
    Gpr(u8),
    /// Multiply/divide high word.
    Hi,
    /// Multiply/divide low word.
    Lo,
    /// Program counter.
    Pc,
    /// COP0 register addressed by number and select.
    Cop0 {
        /// Register number.
        register: u8,
        /// Select field.
        select: u8,
    },
    /// COP1 (floating-point) register.
    Cop1(u8),
}

impl RegisterId {
    /// Builds a COP0 identifier from a `(register, select)` pair.
    #[inline]
    pub const fn cop0((register, select): (u8, u8)) -> Self {
        Self::Cop0 { register, select }
    }
}

#[derive(Clone, PartialEq, Eq)]
struct RegisterState {
    gpr: [u32; GPR_COUNT],
    hi: u32,
    lo: u32,
    pc: u32,
    cop0: [[u32; COP0_SELECTS]; COP0_REGISTERS],
    cop1: [u32; GPR_COUNT],
}

impl RegisterState {
    fn initial(pc: u32) -> Self {
        let mut state = Self {
            gpr: [0; GPR_COUNT],
            hi: 0,
            lo: 0,
            pc,
            cop0: [[0; COP0_SELECTS]; COP0_REGISTERS],
            cop1: [0; GPR_COUNT],
        };
        state.gpr[GP] = INITIAL_GP;
        state.gpr[SP] = INITIAL_SP;
        for ((register, select), value) in [
            (COP0_STATUS, STATUS_RESET),
            (COP0_INTCTL, INTCTL_RESET),
            (COP0_CAUSE, CAUSE_RESET),
            (COP0_EBASE, EBASE_RESET),
        ] {
            state.cop0[register as usize][select as usize] = value;
        }
        state
    }
}

/// Architectural register file of the simulated MIPS32 processor.
#[derive(Clone)]
pub struct Registers {
    state: RegisterState,
    saved: Box<RegisterState>,
}

impl Registers {
    /// Creates a register file with reset values and the given initial PC.
    ///
    /// # Arguments
    ///
    /// * `pc` - Entry point, normally the first text address.
    pub fn new(pc: u32) -> Self {
        let state = RegisterState::initial(pc);
        Self {
            saved: Box::new(state.clone()),
            state,
        }
    }

    /// Reads a general-purpose register. `$zero` always reads 0.
    #[inline]
    pub fn gpr(&self, idx: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.state.gpr[idx & (GPR_COUNT - 1)]
        }
    }

    /// Current program counter.
    #[inline]
    pub const fn pc(&self) -> u32 {
        self.state.pc
    }

    /// Reads a COP0 register.
    #[inline]
    pub const fn cop0(&self, (register, select): (u8, u8)) -> u32 {
        self.state.cop0[register as usize % COP0_REGISTERS][select as usize % COP0_SELECTS]
    }

    /// Reads any register by identifier.
    pub fn get(&self, id: RegisterId) -> u32 {
        match id {
            RegisterId::Gpr(idx) => self.gpr(idx as usize),
            RegisterId::Hi => self.state.hi,
            RegisterId::Lo => self.state.lo,
            RegisterId::Pc => self.state.pc,
            RegisterId::Cop0 { register, select } => self.cop0((register, select)),
            RegisterId::Cop1(idx) => self.state.cop1[idx as usize % GPR_COUNT],
        }
    }

    /// Writes any register by identifier.
    ///
    /// # Arguments
    ///
    /// * `id` - Register to write.
    /// * `value` - New value. Writes to `$zero` are ignored and EBase honours its write mask.
    ///
    /// # Returns
    ///
    /// The previous value of the register.
    pub fn set(&mut self, id: RegisterId, value: u32) -> u32 {
        let old = self.get(id);
        match id {
            RegisterId::Gpr(0) => {}
            RegisterId::Gpr(idx) => self.state.gpr[idx as usize % GPR_COUNT] = value,
            RegisterId::Hi => self.state.hi = value,
            RegisterId::Lo => self.state.lo = value,
            RegisterId::Pc => self.state.pc = value,
            RegisterId::Cop0 { register, select } => {
                let value = if (register, select) == COP0_EBASE {
                    (old & !EBASE_WRITE_MASK) | (value & EBASE_WRITE_MASK)
                } else {
                    value
                };
                self.state.cop0[register as usize % COP0_REGISTERS][select as usize % COP0_SELECTS] =
                    value;
            }
            RegisterId::Cop1(idx) => self.state.cop1[idx as usize % GPR_COUNT] = value,
        }
        old
    }

    /// Writes a COP0 register without applying write masks.
    ///
    /// Used when restoring recorded values, where the stored value is already the
    /// exact previous content.
    pub fn restore(&mut self, id: RegisterId, value: u32) {
        match id {
            RegisterId::Cop0 { register, select } => {
                self.state.cop0[register as usize % COP0_REGISTERS][select as usize % COP0_SELECTS] =
                    value;
            }
            _ => {
                let _ = self.set(id, value);
            }
        }
    }

    /// Snapshots the current contents as the state `restore_saved_state` returns to.
    pub fn save_state(&mut self) {
        self.saved = Box::new(self.state.clone());
    }

    /// Returns to the last saved snapshot (reset values until one is taken).
    pub fn restore_saved_state(&mut self) {
        self.state = (*self.saved).clone();
    }
}

impl fmt::Debug for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registers")
            .field("pc", &format_args!("0x{:08x}", self.state.pc))
            .field("gpr", &self.state.gpr)
            .field("hi", &self.state.hi)
            .field("lo", &self.state.lo)
            .finish_non_exhaustive()
    }
}

/// Extracts `width` bits of `value` starting at bit `from`.
#[inline]
pub const fn bits(value: u32, from: u32, width: u32) -> u32 {
    (value >> from) & ((1u32 << width) - 1)
}

/// Replaces `width` bits of `value` starting at bit `from` with `field`.
#[inline]
pub const fn with_bits(value: u32, from: u32, width: u32, field: u32) -> u32 {
    let mask = ((1u32 << width) - 1) << from;
    (value & !mask) | ((field << from) & mask)
}
