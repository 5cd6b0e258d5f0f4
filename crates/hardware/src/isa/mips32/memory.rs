//! Loads and Stores.
//!
//! Effective address is `rs + sign_extend(imm16)`. Misaligned or unmapped accesses
//! raise ADDRESS_LOAD / ADDRESS_STORE with the effective address.

use crate::core::arch::ExecutionFault;
use crate::core::context::ExecutionContext;
use crate::isa::codec::sign_extend;
use crate::isa::instruction::AssembledInstruction;

type Outcome = Result<(), ExecutionFault>;

#[inline]
fn effective_address(ctx: &ExecutionContext<'_>, inst: &AssembledInstruction) -> u32 {
    let f = inst.i16();
    ctx.gpr(f.source)
        .wrapping_add(sign_extend(f.immediate, 16) as u32)
}

pub(super) fn lb(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let value = ctx.load_byte(effective_address(ctx, inst))?;
    ctx.set_gpr(inst.i16().target, sign_extend(value, 8) as u32);
    Ok(())
}

pub(super) fn lbu(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let value = ctx.load_byte(effective_address(ctx, inst))?;
    ctx.set_gpr(inst.i16().target, value);
    Ok(())
}

pub(super) fn lw(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let value = ctx.load_word(effective_address(ctx, inst))?;
    ctx.set_gpr(inst.i16().target, value);
    Ok(())
}

pub(super) fn sb(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let address = effective_address(ctx, inst);
    let value = ctx.gpr(inst.i16().target);
    ctx.store_byte(address, value)?;
    Ok(())
}

pub(super) fn sw(ctx: &mut ExecutionContext<'_>, inst: &AssembledInstruction, _: u32) -> Outcome {
    let address = effective_address(ctx, inst);
    let value = ctx.gpr(inst.i16().target);
    ctx.store_word(address, value)?;
    Ok(())
}
