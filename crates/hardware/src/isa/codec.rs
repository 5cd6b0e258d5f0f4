//! MIPS32 Instruction Codec.
//!
//! Pure pack/unpack of instruction words. The operation code always occupies the top six
//! bits; every other field is masked to its width and shifted into a non-overlapping
//! position. `decode(encode(f), f.format()) == f` holds for every field set whose
//! values fit their widths. Out-of-range fields are programmer errors and trip a
//! debug assertion before being masked.

use super::format::{
    Fields, Format, I9Fields, I16Fields, I21Fields, I26Fields, IfpuFields, Pcrel16Fields,
    Pcrel19Fields, RFields, RiFields, RifpuFields, RfpuFields, RsopFields,
};

/// Width of an instruction word in bits.
const INSTRUCTION_WIDTH: u32 = 32;

/// Position of the operation code.
const OPCODE_SHIFT: u32 = 26;
/// Six-bit operation code.
const OPCODE_MASK: u32 = 0x3F;

/// Position of the first register field (`rs`, base, fmt, subcode).
const RS_SHIFT: u32 = 21;
/// Position of the second register field (`rt`, `ft`, REGIMM function).
const RT_SHIFT: u32 = 16;
/// Position of the third register field (`rd`, `fs`).
const RD_SHIFT: u32 = 11;
/// Position of the fourth five-bit field (`shamt`, `fd`, sop).
const SHAMT_SHIFT: u32 = 6;
/// Any five-bit register field.
const REG_MASK: u32 = 0x1F;
/// Six-bit function code at bit 0.
const FUNCTION_MASK: u32 = 0x3F;

/// 16-bit immediate.
const IMM16_MASK: u32 = 0xFFFF;
/// 21-bit immediate.
const IMM21_MASK: u32 = 0x1F_FFFF;
/// 26-bit immediate or address.
const IMM26_MASK: u32 = 0x3FF_FFFF;
/// Position of the 9-bit offset.
const OFFSET9_SHIFT: u32 = 7;
/// 9-bit offset.
const OFFSET9_MASK: u32 = 0x1FF;
/// 11-bit immediate.
const IMM11_MASK: u32 = 0x7FF;
/// Position of the two-bit PCREL19 function.
const PCREL2_SHIFT: u32 = 19;
/// Two-bit PCREL19 function.
const PCREL2_MASK: u32 = 0x3;
/// 19-bit immediate.
const IMM19_MASK: u32 = 0x7_FFFF;

/// Mask of the segment bits kept from the PC in pseudo-direct jumps.
const JUMP_SEGMENT_MASK: u32 = 0xF000_0000;

#[inline]
const fn field(raw: u32, shift: u32, mask: u32) -> u32 {
    (raw >> shift) & mask
}

#[inline]
fn place(value: u32, shift: u32, mask: u32) -> u32 {
    debug_assert!(
        value <= mask,
        "field value {value:#x} exceeds mask {mask:#x} at bit {shift}"
    );
    (value & mask) << shift
}

/// Sign-extends the low `bits` bits of `value`.
///
/// Shifts left as an unsigned word, then arithmetically back right on `i32`, so the
/// top bit of the field is replicated through the upper bits.
///
/// # Arguments
///
/// * `value` - Raw field value.
/// * `bits` - Field width, 1 to 32.
///
/// # Returns
///
/// The signed value of the field.
#[inline]
pub const fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = INSTRUCTION_WIDTH - bits;
    ((value << shift) as i32) >> shift
}

/// Resolves the target of a J-format jump.
///
/// The 26-bit field supplies bits 27..2 of the target; the top four bits come from the
/// address of the instruction following the jump.
///
/// # Arguments
///
/// * `address` - Raw 26-bit address field.
/// * `pc` - Address of the jump instruction itself.
pub const fn absolute_jump_address(address: u32, pc: u32) -> u32 {
    (pc.wrapping_add(4) & JUMP_SEGMENT_MASK) | ((address & IMM26_MASK) << 2)
}

/// Resolves a PC-relative word offset against the instruction following `pc`.
///
/// # Arguments
///
/// * `pc` - Address of the branch.
/// * `offset` - Raw offset field.
/// * `bits` - Width of the offset field.
pub const fn relative_branch_target(pc: u32, offset: u32, bits: u32) -> u32 {
    pc.wrapping_add(4)
        .wrapping_add((sign_extend(offset, bits) << 2) as u32)
}

/// Extracts the operation code of any word.
#[inline]
pub const fn opcode(raw: u32) -> u32 {
    field(raw, OPCODE_SHIFT, OPCODE_MASK)
}

/// Packs a set of fields into a 32-bit word.
pub fn encode(fields: &Fields) -> u32 {
    match *fields {
        Fields::R(f) => encode_r(f),
        Fields::I16(f) => encode_i16(f),
        Fields::I21(f) => encode_i21(f),
        Fields::I26(f) | Fields::J(f) => encode_i26(f),
        Fields::I9(f) => encode_i9(f),
        Fields::Ifpu(f) => encode_ifpu(f),
        Fields::Rfpu(f) => encode_rfpu(f),
        Fields::Rifpu(f) => encode_rifpu(f),
        Fields::Rsop(f) => encode_rsop(f),
        Fields::Ri(f) => encode_ri(f),
        Fields::Pcrel16(f) => encode_pcrel16(f),
        Fields::Pcrel19(f) => encode_pcrel19(f),
    }
}

/// Unpacks a 32-bit word according to `format`.
pub const fn decode(raw: u32, format: Format) -> Fields {
    match format {
        Format::R => Fields::R(decode_r(raw)),
        Format::I16 => Fields::I16(decode_i16(raw)),
        Format::I21 => Fields::I21(decode_i21(raw)),
        Format::I26 => Fields::I26(decode_i26(raw)),
        Format::J => Fields::J(decode_i26(raw)),
        Format::I9 => Fields::I9(decode_i9(raw)),
        Format::Ifpu => Fields::Ifpu(decode_ifpu(raw)),
        Format::Rfpu => Fields::Rfpu(decode_rfpu(raw)),
        Format::Rifpu => Fields::Rifpu(decode_rifpu(raw)),
        Format::Rsop => Fields::Rsop(decode_rsop(raw)),
        Format::Ri => Fields::Ri(decode_ri(raw)),
        Format::Pcrel16 => Fields::Pcrel16(decode_pcrel16(raw)),
        Format::Pcrel19 => Fields::Pcrel19(decode_pcrel19(raw)),
    }
}

// ── R / RSOP ──────────────────────────────────────────────────────────────────

fn encode_r(f: RFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.destination, RD_SHIFT, REG_MASK)
        | place(f.shift_amount, SHAMT_SHIFT, REG_MASK)
        | place(f.function, 0, FUNCTION_MASK)
}

/// Unpacks an R-format word.
pub const fn decode_r(raw: u32) -> RFields {
    RFields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        destination: field(raw, RD_SHIFT, REG_MASK),
        shift_amount: field(raw, SHAMT_SHIFT, REG_MASK),
        function: field(raw, 0, FUNCTION_MASK),
    }
}

fn encode_rsop(f: RsopFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.destination, RD_SHIFT, REG_MASK)
        | place(f.sop, SHAMT_SHIFT, REG_MASK)
        | place(f.function, 0, FUNCTION_MASK)
}

/// Unpacks an RSOP-format word.
pub const fn decode_rsop(raw: u32) -> RsopFields {
    RsopFields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        destination: field(raw, RD_SHIFT, REG_MASK),
        sop: field(raw, SHAMT_SHIFT, REG_MASK),
        function: field(raw, 0, FUNCTION_MASK),
    }
}

// ── Immediate layouts ─────────────────────────────────────────────────────────

fn encode_i16(f: I16Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM16_MASK)
}

/// Unpacks an I16-format word.
pub const fn decode_i16(raw: u32) -> I16Fields {
    I16Fields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM16_MASK),
    }
}

fn encode_i21(f: I21Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.register, RS_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM21_MASK)
}

/// Unpacks an I21-format word.
pub const fn decode_i21(raw: u32) -> I21Fields {
    I21Fields {
        opcode: opcode(raw),
        register: field(raw, RS_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM21_MASK),
    }
}

fn encode_i26(f: I26Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK) | place(f.immediate, 0, IMM26_MASK)
}

/// Unpacks an I26 or J word.
pub const fn decode_i26(raw: u32) -> I26Fields {
    I26Fields {
        opcode: opcode(raw),
        immediate: field(raw, 0, IMM26_MASK),
    }
}

fn encode_i9(f: I9Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.base, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.offset, OFFSET9_SHIFT, OFFSET9_MASK)
        | place(f.function, 0, FUNCTION_MASK)
}

/// Unpacks an I9-format word.
pub const fn decode_i9(raw: u32) -> I9Fields {
    I9Fields {
        opcode: opcode(raw),
        base: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        offset: field(raw, OFFSET9_SHIFT, OFFSET9_MASK),
        function: field(raw, 0, FUNCTION_MASK),
    }
}

// ── FPU layouts ───────────────────────────────────────────────────────────────

fn encode_ifpu(f: IfpuFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.base, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM16_MASK)
}

/// Unpacks an IFPU-format word.
pub const fn decode_ifpu(raw: u32) -> IfpuFields {
    IfpuFields {
        opcode: opcode(raw),
        base: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM16_MASK),
    }
}

fn encode_rfpu(f: RfpuFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.fmt, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.source, RD_SHIFT, REG_MASK)
        | place(f.destination, SHAMT_SHIFT, REG_MASK)
        | place(f.function, 0, FUNCTION_MASK)
}

/// Unpacks an RFPU-format word.
pub const fn decode_rfpu(raw: u32) -> RfpuFields {
    RfpuFields {
        opcode: opcode(raw),
        fmt: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        source: field(raw, RD_SHIFT, REG_MASK),
        destination: field(raw, SHAMT_SHIFT, REG_MASK),
        function: field(raw, 0, FUNCTION_MASK),
    }
}

fn encode_rifpu(f: RifpuFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.subcode, RS_SHIFT, REG_MASK)
        | place(f.target, RT_SHIFT, REG_MASK)
        | place(f.source, RD_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM11_MASK)
}

/// Unpacks an RIFPU-format word.
pub const fn decode_rifpu(raw: u32) -> RifpuFields {
    RifpuFields {
        opcode: opcode(raw),
        subcode: field(raw, RS_SHIFT, REG_MASK),
        target: field(raw, RT_SHIFT, REG_MASK),
        source: field(raw, RD_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM11_MASK),
    }
}

// ── REGIMM / PC-relative ──────────────────────────────────────────────────────

fn encode_ri(f: RiFields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.function, RT_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM16_MASK)
}

/// Unpacks an RI-format word.
pub const fn decode_ri(raw: u32) -> RiFields {
    RiFields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        function: field(raw, RT_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM16_MASK),
    }
}

fn encode_pcrel16(f: Pcrel16Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.pcrel, RT_SHIFT, REG_MASK)
        | place(f.immediate, 0, IMM16_MASK)
}

/// Unpacks a PCREL16-format word.
pub const fn decode_pcrel16(raw: u32) -> Pcrel16Fields {
    Pcrel16Fields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        pcrel: field(raw, RT_SHIFT, REG_MASK),
        immediate: field(raw, 0, IMM16_MASK),
    }
}

fn encode_pcrel19(f: Pcrel19Fields) -> u32 {
    place(f.opcode, OPCODE_SHIFT, OPCODE_MASK)
        | place(f.source, RS_SHIFT, REG_MASK)
        | place(f.pcrel, PCREL2_SHIFT, PCREL2_MASK)
        | place(f.immediate, 0, IMM19_MASK)
}

/// Unpacks a PCREL19-format word.
pub const fn decode_pcrel19(raw: u32) -> Pcrel19Fields {
    Pcrel19Fields {
        opcode: opcode(raw),
        source: field(raw, RS_SHIFT, REG_MASK),
        pcrel: field(raw, PCREL2_SHIFT, PCREL2_MASK),
        immediate: field(raw, 0, IMM19_MASK),
    }
}
