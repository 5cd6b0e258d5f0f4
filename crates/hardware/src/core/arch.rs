//! Executable instructions.
//!
//! Instruction definitions turn decoded words into `Execution` objects for one processor
//! organisation. The instruction cache stores these objects so repeated fetches of the
//! same word skip decoding entirely.

use std::fmt;

use serde::Deserialize;

use super::context::ExecutionContext;
use crate::common::MipsException;
use crate::isa::instruction::AssembledInstruction;

/// Processor organisation used to build executions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub enum Architecture {
    /// Every instruction completes within one cycle.
    #[default]
    SingleCycle,
}

/// Why an execution stopped before completing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionFault {
    /// The instruction raised a MIPS exception.
    Exception(MipsException),
    /// The instruction needs console input that has not arrived yet. The cycle is
    /// rolled back and retried once input is queued.
    AwaitingInput,
}

impl From<MipsException> for ExecutionFault {
    fn from(exception: MipsException) -> Self {
        Self::Exception(exception)
    }
}

/// An instruction ready to run at a fixed address.
pub trait Execution: Send + Sync + fmt::Debug {
    /// The decoded word.
    fn instruction(&self) -> &AssembledInstruction;

    /// Address the execution was built for.
    fn address(&self) -> u32;

    /// Applies the instruction's effects.
    ///
    /// PC already points at the following instruction when this is called.
    fn execute(&self, context: &mut ExecutionContext<'_>) -> Result<(), ExecutionFault>;
}

/// Behaviour of one instruction: receives the context, the word and its address.
pub type Semantics =
    fn(&mut ExecutionContext<'_>, &AssembledInstruction, u32) -> Result<(), ExecutionFault>;

/// Single-cycle execution: runs the instruction's semantics in one call.
pub struct SingleCycleExecution {
    instruction: AssembledInstruction,
    address: u32,
    semantics: Semantics,
}

impl SingleCycleExecution {
    /// Binds `semantics` to an instruction word at `address`.
    pub const fn new(instruction: AssembledInstruction, address: u32, semantics: Semantics) -> Self {
        Self {
            instruction,
            address,
            semantics,
        }
    }
}

impl Execution for SingleCycleExecution {
    fn instruction(&self) -> &AssembledInstruction {
        &self.instruction
    }

    fn address(&self) -> u32 {
        self.address
    }

    fn execute(&self, context: &mut ExecutionContext<'_>) -> Result<(), ExecutionFault> {
        (self.semantics)(context, &self.instruction, self.address)
    }
}

impl fmt::Debug for SingleCycleExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleCycleExecution")
            .field("instruction", &self.instruction)
            .field("address", &format_args!("0x{:08x}", self.address))
            .finish_non_exhaustive()
    }
}
