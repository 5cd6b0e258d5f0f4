//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Memory Layout:** Default section boundaries of the MIPS32 address space.
//! 2. **Register Defaults:** Initial values for `$gp`, `$sp` and the COP0 bank.
//! 3. **COP0 Fields:** Bit positions and widths inside Status, Cause and IntCtl.
//! 4. **Exception Vectors:** Offsets added to EBase when an exception is taken.

/// Size of one instruction word in bytes.
pub const WORD_SIZE: u32 = 4;

/// Mask clearing the low two bits of an address, aligning it to its containing word.
pub const WORD_ALIGN_MASK: u32 = !(WORD_SIZE - 1);

/// First address of the user text section.
pub const TEXT_BASE: u32 = 0x0040_0000;

/// First address of the user data section (static data begins at `0x1001_0000`).
pub const DATA_BASE: u32 = 0x1000_0000;

/// First address of the kernel text section.
pub const KERNEL_TEXT_BASE: u32 = 0x8000_0000;

/// First address of the kernel data section.
pub const KERNEL_DATA_BASE: u32 = 0x9000_0000;

/// First address of the memory-mapped I/O section.
pub const MMIO_BASE: u32 = 0xFFFF_0000;

/// Initial global pointer.
pub const INITIAL_GP: u32 = 0x1000_8000;

/// Initial stack pointer.
pub const INITIAL_SP: u32 = 0x7FFF_EFFC;

/// Number of undo steps retained before the oldest is dropped.
pub const MAX_UNDO_STEPS: usize = 10_000;

/// Exit code base used when the run dies on an unhandled exception (`0x1000 + cause`).
pub const UNHANDLED_EXCEPTION_EXIT_BASE: i32 = 0x1000;

// ── COP0 register numbers (register, select) ──────────────────────────────────

/// BadVAddr: last faulting virtual address.
pub const COP0_BAD_VADDR: (u8, u8) = (8, 0);
/// Count: free-running cycle counter.
pub const COP0_COUNT: (u8, u8) = (9, 0);
/// Status: interrupt enables, exception level, operating mode.
pub const COP0_STATUS: (u8, u8) = (12, 0);
/// IntCtl: interrupt vector spacing.
pub const COP0_INTCTL: (u8, u8) = (12, 1);
/// SRSCtl: shadow register set control.
pub const COP0_SRSCTL: (u8, u8) = (12, 2);
/// Cause: exception code, pending interrupts, branch-delay flag.
pub const COP0_CAUSE: (u8, u8) = (13, 0);
/// EPC: return address of the last exception.
pub const COP0_EPC: (u8, u8) = (14, 0);
/// EBase: exception vector base.
pub const COP0_EBASE: (u8, u8) = (15, 1);

/// Status reset value: IE, UM and IM0 set.
pub const STATUS_RESET: u32 = 0x0000_0311;
/// IntCtl reset value: vector spacing 1.
pub const INTCTL_RESET: u32 = 0x0000_0020;
/// Cause reset value: IV set.
pub const CAUSE_RESET: u32 = 0x0080_0000;
/// EBase reset value.
pub const EBASE_RESET: u32 = 0x8000_0000;
/// Writable bits of EBase.
pub const EBASE_WRITE_MASK: u32 = 0x3FFF_F000;

// ── COP0 fields ───────────────────────────────────────────────────────────────

/// Status.IE: global interrupt enable.
pub const STATUS_IE: u32 = 0;
/// Status.EXL: exception level.
pub const STATUS_EXL: u32 = 1;
/// Status.ERL: error level.
pub const STATUS_ERL: u32 = 2;
/// Status.UM: user mode.
pub const STATUS_UM: u32 = 4;
/// Status.IPL: current interrupt priority level.
pub const STATUS_IPL: u32 = 10;
/// Width of Status.IPL.
pub const STATUS_IPL_WIDTH: u32 = 6;

/// Cause.ExcCode.
pub const CAUSE_EXC_CODE: u32 = 2;
/// Width of Cause.ExcCode.
pub const CAUSE_EXC_CODE_WIDTH: u32 = 5;
/// Cause.IP: first pending-interrupt bit.
pub const CAUSE_IP: u32 = 8;
/// Cause.RIPL: requested interrupt priority level.
pub const CAUSE_RIPL: u32 = 10;
/// Width of Cause.RIPL.
pub const CAUSE_RIPL_WIDTH: u32 = 6;
/// Level written to Cause.RIPL when a software request is dispatched.
pub const SOFTWARE_REQUEST_LEVEL: u32 = 1;
/// Cause.IV: use the special interrupt vector.
pub const CAUSE_IV: u32 = 23;
/// Cause.DC: disable Count.
pub const CAUSE_DC: u32 = 27;
/// Cause.BD: last exception was taken in a branch delay slot.
pub const CAUSE_BD: u32 = 31;

/// IntCtl.VS: vector spacing.
pub const INTCTL_VS: u32 = 5;
/// Width of IntCtl.VS.
pub const INTCTL_VS_WIDTH: u32 = 5;

// ── Exception vector offsets from EBase ───────────────────────────────────────

/// General exception vector.
pub const VECTOR_GENERAL: u32 = 0x180;
/// Cache error vector.
pub const VECTOR_CACHE_ERROR: u32 = 0x100;
/// Base of the vectored interrupt table.
pub const VECTOR_INTERRUPT_BASE: u32 = 0x200;
/// Mask applied to `EBase + offset` before forcing kseg0.
pub const VECTOR_ADDRESS_MASK: u32 = 0x3FFF_FFFF;
/// Segment bit forced onto every exception vector.
pub const VECTOR_SEGMENT: u32 = 0x8000_0000;
