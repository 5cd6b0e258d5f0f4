//! Instruction Semantics Tests.
//!
//! Runs short programs through a machine and checks architectural results. Every
//! program ends by dropping off the end of text unless it raises an exception.

use mipsim_core::common::RegisterId;
use mipsim_core::common::constants::{
    COP0_BAD_VADDR, COP0_EBASE, COP0_EPC, COP0_STATUS, INITIAL_GP,
};
use mipsim_core::common::reg::RA;
use mipsim_core::core::Machine;
use mipsim_core::core::undo::Width;
use pretty_assertions::assert_eq;

use crate::common::builder::instruction::*;
use crate::common::harness::{GP, T0, T1, T2, T3, machine, run_to_end};

fn run(text: &[u32]) -> Machine {
    let mut m = machine(text);
    run_to_end(&mut m, 256);
    assert!(m.is_finished(), "program did not finish");
    m
}

fn gpr(m: &Machine, idx: u32) -> u32 {
    m.registers().gpr(idx as usize)
}

// ══════════════════════════════════════════════════════════
// 1. Arithmetic and logic
// ══════════════════════════════════════════════════════════

#[test]
fn addiu_chain_matches_reference_program() {
    let m = run(&[0x2408_0005, 0x2509_0007]);
    assert_eq!(gpr(&m, T0), 5);
    assert_eq!(gpr(&m, T1), 12);
    assert_eq!(m.exit_code(), Some(0));
}

#[test]
fn lui_ori_builds_full_word() {
    let m = run(&[lui(T0, 0x1234), ori(T0, T0, 0x5678)]);
    assert_eq!(gpr(&m, T0), 0x1234_5678);
}

#[test]
fn logical_immediates_zero_extend() {
    let m = run(&[
        addiu(T0, 0, -1),
        andi(T1, T0, 0x8000),
        ori(T2, 0, 0x8000),
        xori(T3, T0, 0xFFFF),
    ]);
    assert_eq!(gpr(&m, T0), 0xFFFF_FFFF);
    assert_eq!(gpr(&m, T1), 0x8000);
    assert_eq!(gpr(&m, T2), 0x8000);
    assert_eq!(gpr(&m, T3), 0xFFFF_0000);
}

#[test]
fn signed_and_unsigned_comparisons_differ() {
    let m = run(&[
        addiu(T0, 0, -1),
        addiu(T1, 0, 1),
        slt(T2, T0, T1),
        sltu(T3, T0, T1),
    ]);
    assert_eq!(gpr(&m, T2), 1);
    assert_eq!(gpr(&m, T3), 0);
}

#[test]
fn slti_sign_extends_immediate() {
    let m = run(&[addiu(T0, 0, -5), slti(T1, T0, -4), slti(T2, T0, -6)]);
    assert_eq!(gpr(&m, T1), 1);
    assert_eq!(gpr(&m, T2), 0);
}

#[test]
fn register_logic_ops() {
    let m = run(&[
        ori(T0, 0, 0b1100),
        ori(T1, 0, 0b1010),
        and(T2, T0, T1),
        or(T3, T0, T1),
        xor(12, T0, T1),
    ]);
    assert_eq!(gpr(&m, T2), 0b1000);
    assert_eq!(gpr(&m, T3), 0b1110);
    assert_eq!(gpr(&m, 12), 0b0110);
}

#[test]
fn sll_shifts_rt_by_shamt() {
    let m = run(&[addiu(T0, 0, 3), sll(T1, T0, 4)]);
    assert_eq!(gpr(&m, T1), 48);
}

#[test]
fn unsigned_arithmetic_wraps_silently() {
    let m = run(&[addiu(T0, 0, 1), subu(T1, 0, T0), lui(T2, 0x8000), addu(T3, T2, T2)]);
    assert_eq!(gpr(&m, T1), 0xFFFF_FFFF);
    assert_eq!(gpr(&m, T3), 0);
    assert_eq!(m.exit_code(), Some(0));
}

#[test]
fn add_without_overflow_writes_result() {
    let m = run(&[addiu(T0, 0, -3), addiu(T1, 0, 10), add(T2, T0, T1)]);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn writes_to_zero_are_discarded() {
    let m = run(&[addiu(0, 0, 5), addu(T0, 0, 0)]);
    assert_eq!(gpr(&m, 0), 0);
    assert_eq!(gpr(&m, T0), 0);
}

#[test]
fn pc_relative_adds_use_instruction_address() {
    let m = run(&[addiupc(T0, 4), auipc(T1, 1)]);
    assert_eq!(gpr(&m, T0), 0x0040_0010);
    assert_eq!(gpr(&m, T1), 0x0041_0004);
}

// ══════════════════════════════════════════════════════════
// 2. Control flow
// ══════════════════════════════════════════════════════════

#[test]
fn beq_taken_skips_next_instruction() {
    let m = run(&[addiu(T0, 0, 1), beq(T0, T0, 1), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn bne_not_taken_falls_through() {
    let m = run(&[addiu(T0, 0, 1), bne(T0, T0, 1), addiu(T1, 0, 99)]);
    assert_eq!(gpr(&m, T1), 99);
}

#[test]
fn backward_branch_loops() {
    let m = run(&[
        addiu(T0, 0, 3),
        addiu(T0, T0, -1),
        bne(T0, 0, -2),
        addiu(T1, 0, 1),
    ]);
    assert_eq!(gpr(&m, T0), 0);
    assert_eq!(gpr(&m, T1), 1);
    assert_eq!(m.cycles(), 8);
}

#[test]
fn j_is_pseudo_direct() {
    let m = run(&[j(0x0040_000C), addiu(T1, 0, 99), addiu(T1, 0, 98), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn jal_links_following_instruction() {
    let m = run(&[jal(0x0040_0008), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, RA as u32), 0x0040_0004);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn jalr_jumps_through_register() {
    let m = run(&[
        lui(T0, 0x0040),
        ori(T0, T0, 0x10),
        jalr(RA as u32, T0),
        addiu(T1, 0, 99),
        addiu(T2, 0, 7),
    ]);
    assert_eq!(gpr(&m, RA as u32), 0x0040_000C);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn compact_branch_and_link() {
    let m = run(&[balc(1), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, RA as u32), 0x0040_0004);
    assert_eq!(gpr(&m, T1), 0);

    let m = run(&[bc(1), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

#[test]
fn compact_branches_on_zero() {
    let m = run(&[beqzc(T0, 1), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, T1), 0);

    let m = run(&[addiu(T0, 0, 1), bnezc(T0, 1), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    assert_eq!(gpr(&m, T1), 0);
    assert_eq!(gpr(&m, T2), 7);
}

// ══════════════════════════════════════════════════════════
// 3. Loads and stores
// ══════════════════════════════════════════════════════════

#[test]
fn byte_loads_sign_and_zero_extend() {
    let m = run(&[addiu(T0, 0, 0xF0), sb(T0, GP, 0), lb(T1, GP, 0), lbu(T2, GP, 0)]);
    assert_eq!(gpr(&m, T1), 0xFFFF_FFF0);
    assert_eq!(gpr(&m, T2), 0xF0);
}

#[test]
fn words_are_stored_little_endian() {
    let m = run(&[
        lui(T0, 0xDEAD),
        ori(T0, T0, 0xBEEF),
        sw(T0, GP, 4),
        lw(T1, GP, 4),
    ]);
    assert_eq!(gpr(&m, T1), 0xDEAD_BEEF);
    assert_eq!(m.read_memory(INITIAL_GP + 4, Width::Byte).unwrap(), 0xEF);
    assert_eq!(m.read_memory(INITIAL_GP + 7, Width::Byte).unwrap(), 0xDE);
}

#[test]
fn negative_offsets_address_below_base() {
    let m = run(&[addiu(T0, 0, 77), sw(T0, GP, -4)]);
    assert_eq!(m.read_memory(INITIAL_GP - 4, Width::Word).unwrap(), 77);
}

#[test]
fn misaligned_load_raises_address_load() {
    let m = run(&[lw(T0, GP, 1)]);
    assert_eq!(m.exit_code(), Some(0x1004));
    assert_eq!(m.registers().cop0(COP0_BAD_VADDR), INITIAL_GP + 1);
}

#[test]
fn misaligned_store_raises_address_store() {
    let m = run(&[sw(T0, GP, 2)]);
    assert_eq!(m.exit_code(), Some(0x1005));
    assert_eq!(m.registers().cop0(COP0_BAD_VADDR), INITIAL_GP + 2);
}

#[test]
fn unmapped_load_raises_address_load() {
    let m = run(&[lw(T0, 0, 0)]);
    assert_eq!(m.exit_code(), Some(0x1004));
    assert_eq!(m.registers().cop0(COP0_BAD_VADDR), 0);
}

// ══════════════════════════════════════════════════════════
// 4. Traps and COP0
// ══════════════════════════════════════════════════════════

#[test]
fn teq_traps_only_on_equality() {
    assert_eq!(run(&[teq(0, 0)]).exit_code(), Some(0x100D));
    assert_eq!(run(&[addiu(T0, 0, 1), teq(T0, 0)]).exit_code(), Some(0));
}

#[test]
fn break_raises_breakpoint() {
    assert_eq!(run(&[brk()]).exit_code(), Some(0x1009));
}

#[test]
fn cop0_moves_round_trip() {
    let m = run(&[addiu(T0, 0, 0x55), mtc0(T0, 14, 0), mfc0(T1, 14, 0)]);
    assert_eq!(gpr(&m, T1), 0x55);
    assert_eq!(m.registers().cop0(COP0_EPC), 0x55);
}

#[test]
fn mtc0_honours_ebase_write_mask() {
    let m = run(&[lui(T0, 0xFFFF), ori(T0, T0, 0xFFFF), mtc0(T0, 15, 1)]);
    assert_eq!(m.registers().cop0(COP0_EBASE), 0xBFFF_F000);
}

#[test]
fn eret_clears_erl_before_exl() {
    let mut m = machine(&[eret(), addiu(T1, 0, 99), addiu(T2, 0, 7)]);
    m.write_register(RegisterId::cop0(COP0_STATUS), 0x0000_0317);
    m.write_register(RegisterId::cop0(COP0_EPC), 0x0040_0008);

    let _ = m.cycle();

    let status = m.registers().cop0(COP0_STATUS);
    assert_eq!(status & 0b100, 0, "ERL cleared");
    assert_eq!(status & 0b010, 0b010, "EXL kept");
    assert_eq!(m.pc(), 0x0040_0008);
}
