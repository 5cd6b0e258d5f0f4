//! System and Coprocessor 0 Instructions.
//!
//! `syscall`, `break` and `teq` only raise their exception; the installed handler
//! decides what happens next. `eret` leaves exception level and resumes at EPC.

use crate::common::constants::{COP0_EPC, COP0_STATUS, STATUS_ERL, STATUS_EXL};
use crate::common::reg::{bits, with_bits};
use crate::common::{InterruptCause, MipsException};
use crate::core::arch::ExecutionFault;
use crate::core::context::ExecutionContext;
use crate::isa::instruction::AssembledInstruction;

type Outcome = Result<(), ExecutionFault>;

/// Select field of MFC0/MTC0 (bits 2-0).
const SELECT_MASK: u32 = 0x7;

pub(super) fn syscall(_: &mut ExecutionContext<'_>, _: &AssembledInstruction, _: u32) -> Outcome {
    Err(MipsException::new(InterruptCause::Syscall).into())
}

pub(super) fn brk(_: &mut ExecutionContext<'_>, _: &AssembledInstruction, _: u32) -> Outcome {
    Err(MipsException::new(InterruptCause::Breakpoint).into())
}

pub(super) fn teq(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let f = inst.r();
    if ctx.gpr(f.source) == ctx.gpr(f.target) {
        return Err(MipsException::new(InterruptCause::Trap).into());
    }
    Ok(())
}

#[inline]
const fn cop0_operand(inst: &AssembledInstruction) -> (u8, u8) {
    let f = inst.r();
    (f.destination as u8, (f.function & SELECT_MASK) as u8)
}

/// `rt = CP0[rd, sel]`.
pub(super) fn mfc0(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let value = ctx.cop0(cop0_operand(inst));
    ctx.set_gpr(inst.r().target, value);
    Ok(())
}

/// `CP0[rd, sel] = rt`.
pub(super) fn mtc0(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let value = ctx.gpr(inst.r().target);
    ctx.set_cop0(cop0_operand(inst), value);
    Ok(())
}

/// Returns from an exception: clears `Status.ERL` if set, otherwise `Status.EXL`, and
/// jumps to EPC.
pub(super) fn eret(ctx: &mut ExecutionContext<'_>, _: &AssembledInstruction, _: u32) -> Outcome {
    let status = ctx.cop0(COP0_STATUS);
    let status = if bits(status, STATUS_ERL, 1) == 1 {
        with_bits(status, STATUS_ERL, 1, 0)
    } else {
        with_bits(status, STATUS_EXL, 1, 0)
    };
    ctx.set_cop0(COP0_STATUS, status);
    let epc = ctx.cop0(COP0_EPC);
    ctx.set_pc(epc);
    Ok(())
}
