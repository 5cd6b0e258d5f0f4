//! MIPS32 Release 6 Integer Subset.
//!
//! Definitions and single-cycle semantics for the instructions the engine executes out
//! of the box. Hosts needing more register further definitions into their own
//! `InstructionSet`.
//!
//! # Structure
//!
//! - `opcodes`: Primary operation codes (bits 31-26).
//! - `function`: SPECIAL function codes, COP0 sub-operations and PCREL selectors.
//! - `alu`, `branch`, `memory`, `system`: Instruction semantics.

/// Primary operation codes.
pub mod opcodes;

/// Minor codes within an operation code.
pub mod function;

mod alu;
mod branch;
mod memory;
mod system;

use self::function::{
    COP0_MF, COP0_MT, ERET_WORD, FUNC_ADD, FUNC_ADDU, FUNC_AND, FUNC_BREAK, FUNC_JALR, FUNC_OR,
    FUNC_SLL, FUNC_SLT, FUNC_SLTU, FUNC_SUBU, FUNC_SYSCALL, FUNC_TEQ, FUNC_XOR, PCREL_ADDIUPC,
    PCREL_AUIPC,
};
use self::opcodes::{
    OP_ADDIU, OP_ANDI, OP_AUI, OP_BALC, OP_BC, OP_BEQ, OP_BNE, OP_COP0, OP_J, OP_JAL, OP_LB,
    OP_LBU, OP_LW, OP_ORI, OP_PCREL, OP_POP66, OP_POP76, OP_SB, OP_SLTI, OP_SPECIAL, OP_SW,
    OP_XORI,
};
use super::format::Format;
use super::table::{BasicInstruction, InstructionSet};

/// Operation code only.
const MASK_OPCODE: u32 = 0xFC00_0000;
/// Operation code and `rs`.
const MASK_OPCODE_RS: u32 = 0xFFE0_0000;
/// The `rs` field alone.
const MASK_RS: u32 = 0x03E0_0000;
/// SPECIAL with `shamt` required to be zero.
const MASK_SPECIAL: u32 = 0xFC00_07FF;
/// SPECIAL where bits 25-6 carry a code the hardware ignores.
const MASK_SPECIAL_CODE: u32 = 0xFC00_003F;
/// SLL: `rs` must be zero.
const MASK_SLL: u32 = 0xFFE0_003F;
/// JALR: `rt` must be zero; `shamt` holds a hint.
const MASK_JALR: u32 = 0xFC1F_003F;
/// MFC0/MTC0: `rs` selects the operation, bits 10-3 must be zero.
const MASK_COP0_MOVE: u32 = 0xFFE0_07F8;
/// PCREL19 selector (bits 20-19).
const MASK_PCREL19: u32 = 0xFC18_0000;
/// PCREL16 selector (bits 20-16).
const MASK_PCREL16: u32 = 0xFC1F_0000;

const fn op(code: u32) -> u32 {
    code << 26
}

fn special(mnemonic: &'static str, function: u32) -> BasicInstruction {
    BasicInstruction::new(mnemonic, Format::R, MASK_SPECIAL, op(OP_SPECIAL) | function)
}

fn immediate(mnemonic: &'static str, opcode: u32) -> BasicInstruction {
    BasicInstruction::new(mnemonic, Format::I16, MASK_OPCODE, op(opcode))
}

impl InstructionSet {
    /// Decode table with the executable MIPS32 subset.
    pub fn mips32() -> Self {
        Self::new()
            // SPECIAL
            .with(
                BasicInstruction::new("sll", Format::R, MASK_SLL, op(OP_SPECIAL) | FUNC_SLL)
                    .single_cycle(alu::sll),
            )
            .with(
                BasicInstruction::new("jalr", Format::R, MASK_JALR, op(OP_SPECIAL) | FUNC_JALR)
                    .single_cycle(branch::jalr),
            )
            .with(
                BasicInstruction::new(
                    "syscall",
                    Format::R,
                    MASK_SPECIAL_CODE,
                    op(OP_SPECIAL) | FUNC_SYSCALL,
                )
                .single_cycle(system::syscall),
            )
            .with(
                BasicInstruction::new(
                    "break",
                    Format::R,
                    MASK_SPECIAL_CODE,
                    op(OP_SPECIAL) | FUNC_BREAK,
                )
                .single_cycle(system::brk),
            )
            .with(
                BasicInstruction::new("teq", Format::R, MASK_SPECIAL_CODE, op(OP_SPECIAL) | FUNC_TEQ)
                    .single_cycle(system::teq),
            )
            .with(special("add", FUNC_ADD).single_cycle(alu::add))
            .with(special("addu", FUNC_ADDU).single_cycle(alu::addu))
            .with(special("subu", FUNC_SUBU).single_cycle(alu::subu))
            .with(special("and", FUNC_AND).single_cycle(alu::and))
            .with(special("or", FUNC_OR).single_cycle(alu::or))
            .with(special("xor", FUNC_XOR).single_cycle(alu::xor))
            .with(special("slt", FUNC_SLT).single_cycle(alu::slt))
            .with(special("sltu", FUNC_SLTU).single_cycle(alu::sltu))
            // Immediate arithmetic
            .with(immediate("addiu", OP_ADDIU).single_cycle(alu::addiu))
            .with(immediate("slti", OP_SLTI).single_cycle(alu::slti))
            .with(immediate("andi", OP_ANDI).single_cycle(alu::andi))
            .with(immediate("ori", OP_ORI).single_cycle(alu::ori))
            .with(immediate("xori", OP_XORI).single_cycle(alu::xori))
            .with(
                BasicInstruction::new("lui", Format::I16, MASK_OPCODE_RS, op(OP_AUI))
                    .single_cycle(alu::lui),
            )
            // Branches and jumps
            .with(immediate("beq", OP_BEQ).single_cycle(branch::beq))
            .with(immediate("bne", OP_BNE).single_cycle(branch::bne))
            .with(
                BasicInstruction::new("j", Format::J, MASK_OPCODE, op(OP_J))
                    .single_cycle(branch::j),
            )
            .with(
                BasicInstruction::new("jal", Format::J, MASK_OPCODE, op(OP_JAL))
                    .single_cycle(branch::jal),
            )
            .with(
                BasicInstruction::new("bc", Format::I26, MASK_OPCODE, op(OP_BC))
                    .single_cycle(branch::bc),
            )
            .with(
                BasicInstruction::new("balc", Format::I26, MASK_OPCODE, op(OP_BALC))
                    .single_cycle(branch::balc),
            )
            .with(
                BasicInstruction::new("beqzc", Format::I21, MASK_OPCODE, op(OP_POP66))
                    .excluding(MASK_RS, 0)
                    .single_cycle(branch::beqzc),
            )
            .with(
                BasicInstruction::new("bnezc", Format::I21, MASK_OPCODE, op(OP_POP76))
                    .excluding(MASK_RS, 0)
                    .single_cycle(branch::bnezc),
            )
            // PC-relative
            .with(
                BasicInstruction::new(
                    "auipc",
                    Format::Pcrel16,
                    MASK_PCREL16,
                    op(OP_PCREL) | (PCREL_AUIPC << 16),
                )
                .single_cycle(alu::auipc),
            )
            .with(
                BasicInstruction::new(
                    "addiupc",
                    Format::Pcrel19,
                    MASK_PCREL19,
                    op(OP_PCREL) | (PCREL_ADDIUPC << 19),
                )
                .single_cycle(alu::addiupc),
            )
            // Loads and stores
            .with(immediate("lb", OP_LB).single_cycle(memory::lb))
            .with(immediate("lbu", OP_LBU).single_cycle(memory::lbu))
            .with(immediate("lw", OP_LW).single_cycle(memory::lw))
            .with(immediate("sb", OP_SB).single_cycle(memory::sb))
            .with(immediate("sw", OP_SW).single_cycle(memory::sw))
            // COP0
            .with(
                BasicInstruction::new(
                    "mfc0",
                    Format::R,
                    MASK_COP0_MOVE,
                    op(OP_COP0) | (COP0_MF << 21),
                )
                .single_cycle(system::mfc0),
            )
            .with(
                BasicInstruction::new(
                    "mtc0",
                    Format::R,
                    MASK_COP0_MOVE,
                    op(OP_COP0) | (COP0_MT << 21),
                )
                .single_cycle(system::mtc0),
            )
            .with(
                BasicInstruction::new("eret", Format::R, u32::MAX, ERET_WORD)
                    .single_cycle(system::eret),
            )
    }
}
