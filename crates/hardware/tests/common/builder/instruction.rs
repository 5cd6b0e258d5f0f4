//! Assembles instruction words through the codec, so tests never hand-pack bits.

use mipsim_core::isa::codec::encode;
use mipsim_core::isa::format::{Fields, I16Fields, I21Fields, I26Fields, Pcrel16Fields, Pcrel19Fields, RFields};
use mipsim_core::isa::mips32::function::*;
use mipsim_core::isa::mips32::opcodes::*;

fn r(function: u32, rd: u32, rs: u32, rt: u32, shamt: u32) -> u32 {
    encode(&Fields::R(RFields {
        opcode: OP_SPECIAL,
        source: rs,
        target: rt,
        destination: rd,
        shift_amount: shamt,
        function,
    }))
}

fn i16(opcode: u32, rt: u32, rs: u32, imm: i32) -> u32 {
    encode(&Fields::I16(I16Fields {
        opcode,
        source: rs,
        target: rt,
        immediate: (imm as u32) & 0xFFFF,
    }))
}

pub fn nop() -> u32 {
    0
}

pub fn sll(rd: u32, rt: u32, shamt: u32) -> u32 {
    r(FUNC_SLL, rd, 0, rt, shamt)
}

pub fn add(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_ADD, rd, rs, rt, 0)
}

pub fn addu(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_ADDU, rd, rs, rt, 0)
}

pub fn subu(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_SUBU, rd, rs, rt, 0)
}

pub fn and(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_AND, rd, rs, rt, 0)
}

pub fn or(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_OR, rd, rs, rt, 0)
}

pub fn xor(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_XOR, rd, rs, rt, 0)
}

pub fn slt(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_SLT, rd, rs, rt, 0)
}

pub fn sltu(rd: u32, rs: u32, rt: u32) -> u32 {
    r(FUNC_SLTU, rd, rs, rt, 0)
}

pub fn jalr(rd: u32, rs: u32) -> u32 {
    r(FUNC_JALR, rd, rs, 0, 0)
}

pub fn syscall() -> u32 {
    r(FUNC_SYSCALL, 0, 0, 0, 0)
}

pub fn brk() -> u32 {
    r(FUNC_BREAK, 0, 0, 0, 0)
}

pub fn teq(rs: u32, rt: u32) -> u32 {
    r(FUNC_TEQ, 0, rs, rt, 0)
}

pub fn addiu(rt: u32, rs: u32, imm: i32) -> u32 {
    i16(OP_ADDIU, rt, rs, imm)
}

pub fn slti(rt: u32, rs: u32, imm: i32) -> u32 {
    i16(OP_SLTI, rt, rs, imm)
}

pub fn andi(rt: u32, rs: u32, imm: u32) -> u32 {
    i16(OP_ANDI, rt, rs, imm as i32)
}

pub fn ori(rt: u32, rs: u32, imm: u32) -> u32 {
    i16(OP_ORI, rt, rs, imm as i32)
}

pub fn xori(rt: u32, rs: u32, imm: u32) -> u32 {
    i16(OP_XORI, rt, rs, imm as i32)
}

pub fn lui(rt: u32, imm: u32) -> u32 {
    i16(OP_AUI, rt, 0, imm as i32)
}

/// Branch with a word offset relative to the following instruction.
pub fn beq(rs: u32, rt: u32, offset: i32) -> u32 {
    i16(OP_BEQ, rt, rs, offset)
}

pub fn bne(rs: u32, rt: u32, offset: i32) -> u32 {
    i16(OP_BNE, rt, rs, offset)
}

pub fn lb(rt: u32, base: u32, offset: i32) -> u32 {
    i16(OP_LB, rt, base, offset)
}

pub fn lbu(rt: u32, base: u32, offset: i32) -> u32 {
    i16(OP_LBU, rt, base, offset)
}

pub fn lw(rt: u32, base: u32, offset: i32) -> u32 {
    i16(OP_LW, rt, base, offset)
}

pub fn sb(rt: u32, base: u32, offset: i32) -> u32 {
    i16(OP_SB, rt, base, offset)
}

pub fn sw(rt: u32, base: u32, offset: i32) -> u32 {
    i16(OP_SW, rt, base, offset)
}

/// Pseudo-direct jump to `target` (must share the top four bits of the jump's PC + 4).
pub fn j(target: u32) -> u32 {
    encode(&Fields::J(I26Fields {
        opcode: OP_J,
        immediate: (target >> 2) & 0x3FF_FFFF,
    }))
}

pub fn jal(target: u32) -> u32 {
    encode(&Fields::J(I26Fields {
        opcode: OP_JAL,
        immediate: (target >> 2) & 0x3FF_FFFF,
    }))
}

pub fn bc(offset: i32) -> u32 {
    encode(&Fields::I26(I26Fields {
        opcode: OP_BC,
        immediate: (offset as u32) & 0x3FF_FFFF,
    }))
}

pub fn balc(offset: i32) -> u32 {
    encode(&Fields::I26(I26Fields {
        opcode: OP_BALC,
        immediate: (offset as u32) & 0x3FF_FFFF,
    }))
}

pub fn beqzc(rs: u32, offset: i32) -> u32 {
    encode(&Fields::I21(I21Fields {
        opcode: OP_POP66,
        register: rs,
        immediate: (offset as u32) & 0x1F_FFFF,
    }))
}

pub fn bnezc(rs: u32, offset: i32) -> u32 {
    encode(&Fields::I21(I21Fields {
        opcode: OP_POP76,
        register: rs,
        immediate: (offset as u32) & 0x1F_FFFF,
    }))
}

pub fn addiupc(rs: u32, offset: i32) -> u32 {
    encode(&Fields::Pcrel19(Pcrel19Fields {
        opcode: OP_PCREL,
        source: rs,
        pcrel: PCREL_ADDIUPC,
        immediate: (offset as u32) & 0x7_FFFF,
    }))
}

pub fn auipc(rs: u32, imm: u32) -> u32 {
    encode(&Fields::Pcrel16(Pcrel16Fields {
        opcode: OP_PCREL,
        source: rs,
        pcrel: PCREL_AUIPC,
        immediate: imm & 0xFFFF,
    }))
}

pub fn mfc0(rt: u32, rd: u32, sel: u32) -> u32 {
    encode(&Fields::R(RFields {
        opcode: OP_COP0,
        source: COP0_MF,
        target: rt,
        destination: rd,
        shift_amount: 0,
        function: sel,
    }))
}

pub fn mtc0(rt: u32, rd: u32, sel: u32) -> u32 {
    encode(&Fields::R(RFields {
        opcode: OP_COP0,
        source: COP0_MT,
        target: rt,
        destination: rd,
        shift_amount: 0,
        function: sel,
    }))
}

pub fn eret() -> u32 {
    ERET_WORD
}
