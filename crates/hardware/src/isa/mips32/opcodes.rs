//! MIPS32 Operation Codes.
//!
//! Defines the primary operation codes (bits 31-26) of the supported instructions.

/// Register-register operations selected by the function field.
pub const OP_SPECIAL: u32 = 0x00;

/// Jump (J).
pub const OP_J: u32 = 0x02;

/// Jump and link (JAL).
pub const OP_JAL: u32 = 0x03;

/// Branch on equal (BEQ).
pub const OP_BEQ: u32 = 0x04;

/// Branch on not equal (BNE).
pub const OP_BNE: u32 = 0x05;

/// Add immediate unsigned (ADDIU).
pub const OP_ADDIU: u32 = 0x09;

/// Set on less than immediate (SLTI).
pub const OP_SLTI: u32 = 0x0A;

/// AND immediate (ANDI).
pub const OP_ANDI: u32 = 0x0C;

/// OR immediate (ORI).
pub const OP_ORI: u32 = 0x0D;

/// XOR immediate (XORI).
pub const OP_XORI: u32 = 0x0E;

/// Add upper immediate (AUI); LUI when `rs` is zero.
pub const OP_AUI: u32 = 0x0F;

/// Coprocessor 0 operations (MFC0, MTC0, ERET).
pub const OP_COP0: u32 = 0x10;

/// Load byte (LB).
pub const OP_LB: u32 = 0x20;

/// Load word (LW).
pub const OP_LW: u32 = 0x23;

/// Load byte unsigned (LBU).
pub const OP_LBU: u32 = 0x24;

/// Store byte (SB).
pub const OP_SB: u32 = 0x28;

/// Store word (SW).
pub const OP_SW: u32 = 0x2B;

/// Compact branch (BC).
pub const OP_BC: u32 = 0x32;

/// BEQZC when `rs` is non-zero.
pub const OP_POP66: u32 = 0x36;

/// Compact branch and link (BALC).
pub const OP_BALC: u32 = 0x3A;

/// PC-relative operations (ADDIUPC, AUIPC, ...).
pub const OP_PCREL: u32 = 0x3B;

/// BNEZC when `rs` is non-zero.
pub const OP_POP76: u32 = 0x3E;
