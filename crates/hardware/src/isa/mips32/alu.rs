//! Integer Arithmetic and Logic.
//!
//! Register-register and register-immediate operations. Immediates of arithmetic and
//! comparison instructions are sign-extended; those of logical instructions are
//! zero-extended.

use crate::common::{InterruptCause, MipsException};
use crate::core::arch::ExecutionFault;
use crate::core::context::ExecutionContext;
use crate::isa::codec::sign_extend;
use crate::isa::instruction::AssembledInstruction;

type Outcome = Result<(), ExecutionFault>;

/// Applies `op` to `rs` and `rt`, writing `rd`.
#[inline]
fn register_op(
    ctx: &mut ExecutionContext<'_>,
    inst: &AssembledInstruction,
    op: impl FnOnce(u32, u32) -> u32,
) -> Outcome {
    let f = inst.r();
    let value = op(ctx.gpr(f.source), ctx.gpr(f.target));
    ctx.set_gpr(f.destination, value);
    Ok(())
}

/// Applies `op` to `rs` and the immediate, writing `rt`.
#[inline]
fn immediate_op(
    ctx: &mut ExecutionContext<'_>,
    inst: &AssembledInstruction,
    signed: bool,
    op: impl FnOnce(u32, u32) -> u32,
) -> Outcome {
    let f = inst.i16();
    let imm = if signed {
        sign_extend(f.immediate, 16) as u32
    } else {
        f.immediate
    };
    let value = op(ctx.gpr(f.source), imm);
    ctx.set_gpr(f.target, value);
    Ok(())
}

pub(super) fn sll(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let f = inst.r();
    let value = ctx.gpr(f.target) << f.shift_amount;
    ctx.set_gpr(f.destination, value);
    Ok(())
}

pub(super) fn add(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let f = inst.r();
    let sum = (ctx.gpr(f.source) as i32)
        .checked_add(ctx.gpr(f.target) as i32)
        .ok_or_else(|| MipsException::new(InterruptCause::ArithmeticOverflow))?;
    ctx.set_gpr(f.destination, sum as u32);
    Ok(())
}

pub(super) fn addu(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, u32::wrapping_add)
}

pub(super) fn subu(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, u32::wrapping_sub)
}

pub(super) fn and(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, |a, b| a & b)
}

pub(super) fn or(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, |a, b| a | b)
}

pub(super) fn xor(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, |a, b| a ^ b)
}

pub(super) fn slt(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, |a, b| u32::from((a as i32) < (b as i32)))
}

pub(super) fn sltu(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    register_op(ctx, inst, |a, b| u32::from(a < b))
}

pub(super) fn addiu(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    immediate_op(ctx, inst, true, u32::wrapping_add)
}

pub(super) fn slti(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    immediate_op(ctx, inst, true, |a, b| u32::from((a as i32) < (b as i32)))
}

pub(super) fn andi(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    immediate_op(ctx, inst, false, |a, b| a & b)
}

pub(super) fn ori(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    immediate_op(ctx, inst, false, |a, b| a | b)
}

pub(super) fn xori(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    immediate_op(ctx, inst, false, |a, b| a ^ b)
}

pub(super) fn lui(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let f = inst.i16();
    ctx.set_gpr(f.target, f.immediate << 16);
    Ok(())
}

/// `rs = address + sign_extend(imm19 << 2)`.
pub(super) fn addiupc(
    ctx: &mut ExecutionContext<'_>,
    inst: &AssembledInstruction,
    address: u32,
) -> Outcome {
    let f = inst.pcrel19();
    let offset = (sign_extend(f.immediate, 19) << 2) as u32;
    ctx.set_gpr(f.source, address.wrapping_add(offset));
    Ok(())
}

/// `rs = address + (imm16 << 16)`.
pub(super) fn auipc(
    ctx: &mut ExecutionContext<'_>,
    inst: &AssembledInstruction,
    address: u32,
) -> Outcome {
    let f = inst.pcrel16();
    ctx.set_gpr(f.source, address.wrapping_add(f.immediate << 16));
    Ok(())
}
