//! Assembled instructions.
//!
//! An `AssembledInstruction` is an immutable instruction word tagged with its format and
//! the definition it was decoded as. Field accessors are thin wrappers over the codec,
//! so an execution that knows its layout reads fields without matching on `Fields`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::codec;
use super::format::{
    Fields, Format, I9Fields, I16Fields, I21Fields, I26Fields, IfpuFields, Pcrel16Fields,
    Pcrel19Fields, RFields, RiFields, RifpuFields, RfpuFields, RsopFields,
};
use super::table::InstructionDefinition;

/// A decoded instruction word.
///
/// Equality and hashing only consider the raw value.
#[derive(Clone)]
pub struct AssembledInstruction {
    value: u32,
    format: Format,
    basic: Arc<dyn InstructionDefinition>,
    origin: Option<Arc<dyn InstructionDefinition>>,
}

impl AssembledInstruction {
    /// Builds the instruction for `raw` as decoded by `basic`.
    ///
    /// # Arguments
    ///
    /// * `basic` - Definition whose pattern matched the word.
    /// * `raw` - The instruction word.
    pub fn from_code(basic: Arc<dyn InstructionDefinition>, raw: u32) -> Self {
        Self {
            value: raw,
            format: basic.format(),
            basic,
            origin: None,
        }
    }

    /// Marks this word as part of the expansion of a pseudo-instruction.
    #[must_use]
    pub fn with_origin(mut self, origin: Arc<dyn InstructionDefinition>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Raw 32-bit value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Layout of the word.
    #[inline]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// The basic instruction actually executed.
    pub fn basic(&self) -> &Arc<dyn InstructionDefinition> {
        &self.basic
    }

    /// The logical instruction the word came from: the pseudo-instruction if it was
    /// expanded from one, the basic instruction otherwise.
    pub fn origin(&self) -> &Arc<dyn InstructionDefinition> {
        self.origin.as_ref().unwrap_or(&self.basic)
    }

    /// Mnemonic of the basic instruction.
    pub fn mnemonic(&self) -> &str {
        self.basic.mnemonic()
    }

    /// All fields, unpacked according to the word's format.
    pub const fn fields(&self) -> Fields {
        codec::decode(self.value, self.format)
    }

    /// Operation code.
    #[inline]
    pub const fn opcode(&self) -> u32 {
        codec::opcode(self.value)
    }

    /// Fields read with the R layout.
    #[inline]
    pub const fn r(&self) -> RFields {
        codec::decode_r(self.value)
    }

    /// Fields read with the I16 layout.
    #[inline]
    pub const fn i16(&self) -> I16Fields {
        codec::decode_i16(self.value)
    }

    /// Fields read with the I21 layout.
    #[inline]
    pub const fn i21(&self) -> I21Fields {
        codec::decode_i21(self.value)
    }

    /// Fields read with the I26/J layout.
    #[inline]
    pub const fn i26(&self) -> I26Fields {
        codec::decode_i26(self.value)
    }

    /// Fields read with the I9 layout.
    #[inline]
    pub const fn i9(&self) -> I9Fields {
        codec::decode_i9(self.value)
    }

    /// Fields read with the IFPU layout.
    #[inline]
    pub const fn ifpu(&self) -> IfpuFields {
        codec::decode_ifpu(self.value)
    }

    /// Fields read with the RFPU layout.
    #[inline]
    pub const fn rfpu(&self) -> RfpuFields {
        codec::decode_rfpu(self.value)
    }

    /// Fields read with the RIFPU layout.
    #[inline]
    pub const fn rifpu(&self) -> RifpuFields {
        codec::decode_rifpu(self.value)
    }

    /// Fields read with the RSOP layout.
    #[inline]
    pub const fn rsop(&self) -> RsopFields {
        codec::decode_rsop(self.value)
    }

    /// Fields read with the RI layout.
    #[inline]
    pub const fn ri(&self) -> RiFields {
        codec::decode_ri(self.value)
    }

    /// Fields read with the PCREL16 layout.
    #[inline]
    pub const fn pcrel16(&self) -> Pcrel16Fields {
        codec::decode_pcrel16(self.value)
    }

    /// Fields read with the PCREL19 layout.
    #[inline]
    pub const fn pcrel19(&self) -> Pcrel19Fields {
        codec::decode_pcrel19(self.value)
    }
}

impl PartialEq for AssembledInstruction {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for AssembledInstruction {}

impl Hash for AssembledInstruction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Debug for AssembledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08x}, {:?})", self.mnemonic(), self.value, self.format)
    }
}
