//! Jumps and Branches.
//!
//! Classic branches and jumps plus the release 6 compact forms. None of them execute a
//! delay slot: the redirect takes effect on the next fetch. Link registers receive the
//! address of the following instruction.

use crate::common::reg::RA;
use crate::core::arch::ExecutionFault;
use crate::core::context::ExecutionContext;
use crate::isa::codec::{absolute_jump_address, relative_branch_target};
use crate::isa::instruction::AssembledInstruction;

type Outcome = Result<(), ExecutionFault>;

pub(super) fn jalr(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let f = inst.r();
    let target = ctx.gpr(f.source);
    let link = ctx.pc();
    ctx.set_gpr(f.destination, link);
    ctx.set_pc(target);
    Ok(())
}

pub(super) fn beq(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let f = inst.i16();
    if ctx.gpr(f.source) == ctx.gpr(f.target) {
        ctx.set_pc(relative_branch_target(pc, f.immediate, 16));
    }
    Ok(())
}

pub(super) fn bne(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let f = inst.i16();
    if ctx.gpr(f.source) != ctx.gpr(f.target) {
        ctx.set_pc(relative_branch_target(pc, f.immediate, 16));
    }
    Ok(())
}

pub(super) fn j(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    ctx.set_pc(absolute_jump_address(inst.i26().immediate, pc));
    Ok(())
}

pub(super) fn jal(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let link = ctx.pc();
    ctx.set_gpr(RA as u32, link);
    ctx.set_pc(absolute_jump_address(inst.i26().immediate, pc));
    Ok(())
}

pub(super) fn bc(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    ctx.set_pc(relative_branch_target(pc, inst.i26().immediate, 26));
    Ok(())
}

pub(super) fn balc(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let link = ctx.pc();
    ctx.set_gpr(RA as u32, link);
    ctx.set_pc(relative_branch_target(pc, inst.i26().immediate, 26));
    Ok(())
}

pub(super) fn beqzc(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let f = inst.i21();
    if ctx.gpr(f.register) == 0 {
        ctx.set_pc(relative_branch_target(pc, f.immediate, 21));
    }
    Ok(())
}

pub(super) fn bnezc(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, pc: u32) -> Outcome {
    let f = inst.i21();
    if ctx.gpr(f.register) != 0 {
        ctx.set_pc(relative_branch_target(pc, f.immediate, 21));
    }
    Ok(())
}
