//! Instruction formats.
//!
//! Every MIPS32 encoding belongs to one of a small closed set of layouts. `Format` is the
//! tag carried by assembled instructions; `Fields` holds the unpacked contents of one word
//! for a given layout. Field values are raw and unsigned; signed immediates are recovered
//! with [`sign_extend`](crate::isa::codec::sign_extend).

/// Tag identifying the bit layout of an instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// Register: `opcode | rs | rt | rd | shamt | function`.
    R,
    /// Immediate: `opcode | rs | rt | imm16`.
    I16,
    /// Compact branch on one register: `opcode | rs | imm21`.
    I21,
    /// Compact PC-relative branch: `opcode | offset26`.
    I26,
    /// Jump: `opcode | address26`.
    J,
    /// Nine-bit offset memory op: `opcode | base | rt | offset9 | 0 | function`.
    I9,
    /// FPU memory op: `opcode | base | ft | imm16`.
    Ifpu,
    /// FPU register op: `opcode | fmt | ft | fs | fd | function`.
    Rfpu,
    /// FPU register/immediate op: `opcode | subcode | rt | fs | imm11`.
    Rifpu,
    /// Register op with a sub-operation field: `opcode | rs | rt | rd | sop | function`.
    Rsop,
    /// REGIMM: `opcode | rs | function5 | imm16`.
    Ri,
    /// PC-relative with 16-bit immediate: `opcode | rs | pcrel5 | imm16`.
    Pcrel16,
    /// PC-relative with 19-bit immediate: `opcode | rs | pcrel2 | imm19`.
    Pcrel19,
}

/// Fields of an R-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RFields {
    /// Operation code (bits 31..26).
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// `rt` (bits 20..16).
    pub target: u32,
    /// `rd` (bits 15..11).
    pub destination: u32,
    /// `shamt` (bits 10..6).
    pub shift_amount: u32,
    /// Function code (bits 5..0).
    pub function: u32,
}

/// Fields of an I16-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct I16Fields {
    /// Operation code.
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// `rt` (bits 20..16).
    pub target: u32,
    /// Raw 16-bit immediate.
    pub immediate: u32,
}

/// Fields of an I21-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct I21Fields {
    /// Operation code.
    pub opcode: u32,
    /// Register (bits 25..21).
    pub register: u32,
    /// Raw 21-bit immediate.
    pub immediate: u32,
}

/// Fields of an I26 or J word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct I26Fields {
    /// Operation code.
    pub opcode: u32,
    /// Raw 26-bit immediate (relative offset for I26, pseudo-direct address for J).
    pub immediate: u32,
}

/// Fields of an I9-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct I9Fields {
    /// Operation code.
    pub opcode: u32,
    /// Base register (bits 25..21).
    pub base: u32,
    /// `rt` (bits 20..16).
    pub target: u32,
    /// Raw 9-bit offset (bits 15..7).
    pub offset: u32,
    /// Function code (bits 5..0).
    pub function: u32,
}

/// Fields of an IFPU-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfpuFields {
    /// Operation code.
    pub opcode: u32,
    /// Base register (bits 25..21).
    pub base: u32,
    /// `ft` (bits 20..16).
    pub target: u32,
    /// Raw 16-bit offset.
    pub immediate: u32,
}

/// Fields of an RFPU-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RfpuFields {
    /// Operation code.
    pub opcode: u32,
    /// Operand format (bits 25..21).
    pub fmt: u32,
    /// `ft` (bits 20..16).
    pub target: u32,
    /// `fs` (bits 15..11).
    pub source: u32,
    /// `fd` (bits 10..6).
    pub destination: u32,
    /// Function code (bits 5..0).
    pub function: u32,
}

/// Fields of an RIFPU-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RifpuFields {
    /// Operation code.
    pub opcode: u32,
    /// Sub-operation (bits 25..21).
    pub subcode: u32,
    /// `rt` (bits 20..16).
    pub target: u32,
    /// `fs` (bits 15..11).
    pub source: u32,
    /// Raw 11-bit immediate.
    pub immediate: u32,
}

/// Fields of an RSOP-format word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RsopFields {
    /// Operation code.
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// `rt` (bits 20..16).
    pub target: u32,
    /// `rd` (bits 15..11).
    pub destination: u32,
    /// Sub-operation (bits 10..6).
    pub sop: u32,
    /// Function code (bits 5..0).
    pub function: u32,
}

/// Fields of an RI (REGIMM) word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RiFields {
    /// Operation code.
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// Five-bit function (bits 20..16).
    pub function: u32,
    /// Raw 16-bit immediate.
    pub immediate: u32,
}

/// Fields of a PCREL16 word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pcrel16Fields {
    /// Operation code.
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// Five-bit PC-relative function (bits 20..16).
    pub pcrel: u32,
    /// Raw 16-bit immediate.
    pub immediate: u32,
}

/// Fields of a PCREL19 word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pcrel19Fields {
    /// Operation code.
    pub opcode: u32,
    /// `rs` (bits 25..21).
    pub source: u32,
    /// Two-bit PC-relative function (bits 20..19).
    pub pcrel: u32,
    /// Raw 19-bit immediate.
    pub immediate: u32,
}

/// The unpacked contents of one instruction word, tagged by layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fields {
    /// R layout.
    R(RFields),
    /// I16 layout.
    I16(I16Fields),
    /// I21 layout.
    I21(I21Fields),
    /// I26 layout.
    I26(I26Fields),
    /// J layout.
    J(I26Fields),
    /// I9 layout.
    I9(I9Fields),
    /// IFPU layout.
    Ifpu(IfpuFields),
    /// RFPU layout.
    Rfpu(RfpuFields),
    /// RIFPU layout.
    Rifpu(RifpuFields),
    /// RSOP layout.
    Rsop(RsopFields),
    /// RI layout.
    Ri(RiFields),
    /// PCREL16 layout.
    Pcrel16(Pcrel16Fields),
    /// PCREL19 layout.
    Pcrel19(Pcrel19Fields),
}

impl Fields {
    /// The format tag of these fields.
    pub const fn format(&self) -> Format {
        match self {
            Self::R(_) => Format::R,
            Self::I16(_) => Format::I16,
            Self::I21(_) => Format::I21,
            Self::I26(_) => Format::I26,
            Self::J(_) => Format::J,
            Self::I9(_) => Format::I9,
            Self::Ifpu(_) => Format::Ifpu,
            Self::Rfpu(_) => Format::Rfpu,
            Self::Rifpu(_) => Format::Rifpu,
            Self::Rsop(_) => Format::Rsop,
            Self::Ri(_) => Format::Ri,
            Self::Pcrel16(_) => Format::Pcrel16,
            Self::Pcrel19(_) => Format::Pcrel19,
        }
    }

    /// The operation code shared by every layout.
    pub const fn opcode(&self) -> u32 {
        match self {
            Self::R(f) => f.opcode,
            Self::I16(f) => f.opcode,
            Self::I21(f) => f.opcode,
            Self::I26(f) | Self::J(f) => f.opcode,
            Self::I9(f) => f.opcode,
            Self::Ifpu(f) => f.opcode,
            Self::Rfpu(f) => f.opcode,
            Self::Rifpu(f) => f.opcode,
            Self::Rsop(f) => f.opcode,
            Self::Ri(f) => f.opcode,
            Self::Pcrel16(f) => f.opcode,
            Self::Pcrel19(f) => f.opcode,
        }
    }
}
