//! MIPS32 Function Codes.
//!
//! Minor codes distinguishing instructions within an operation code: the SPECIAL
//! function field (bits 5-0), the COP0 `rs` sub-operation and the PCREL selectors.

/// Shift left logical.
pub const FUNC_SLL: u32 = 0x00;

/// Jump and link register.
pub const FUNC_JALR: u32 = 0x09;

/// System call.
pub const FUNC_SYSCALL: u32 = 0x0C;

/// Breakpoint.
pub const FUNC_BREAK: u32 = 0x0D;

/// Add with overflow trap.
pub const FUNC_ADD: u32 = 0x20;

/// Add unsigned.
pub const FUNC_ADDU: u32 = 0x21;

/// Subtract unsigned.
pub const FUNC_SUBU: u32 = 0x23;

/// Bitwise AND.
pub const FUNC_AND: u32 = 0x24;

/// Bitwise OR.
pub const FUNC_OR: u32 = 0x25;

/// Bitwise XOR.
pub const FUNC_XOR: u32 = 0x26;

/// Set on less than.
pub const FUNC_SLT: u32 = 0x2A;

/// Set on less than unsigned.
pub const FUNC_SLTU: u32 = 0x2B;

/// Trap if equal.
pub const FUNC_TEQ: u32 = 0x34;

/// COP0 `rs` value of MFC0.
pub const COP0_MF: u32 = 0x00;

/// COP0 `rs` value of MTC0.
pub const COP0_MT: u32 = 0x04;

/// Complete ERET word.
pub const ERET_WORD: u32 = 0x4200_0018;

/// PCREL19 selector of ADDIUPC (bits 20-19).
pub const PCREL_ADDIUPC: u32 = 0x0;

/// PCREL16 selector of AUIPC (bits 20-16).
pub const PCREL_AUIPC: u32 = 0x1E;
