//! Decode tables and instruction definitions.
//!
//! The engine never matches on opcodes itself: it asks an injected [`DecodeTable`] which
//! definition a fetched word belongs to, then asks that definition for an executable
//! suited to the configured [`Architecture`]. This module provides:
//! 1. **Traits:** `DecodeTable` and `InstructionDefinition`, the seams the engine depends on.
//! 2. **`BasicInstruction`:** a mask/pattern definition with per-architecture semantics.
//! 3. **`InstructionSet`:** a table of definitions indexed by operation code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::codec;
use super::format::Format;
use super::instruction::AssembledInstruction;
use crate::core::arch::{Architecture, Execution, Semantics, SingleCycleExecution};

/// Number of distinct operation codes.
const OPCODE_COUNT: usize = 64;

/// A logical instruction that words can be decoded as.
pub trait InstructionDefinition: Send + Sync {
    /// Assembly mnemonic.
    fn mnemonic(&self) -> &str;

    /// Layout of the words this definition decodes.
    fn format(&self) -> Format;

    /// Operation code shared by every word this definition matches.
    fn opcode(&self) -> u32;

    /// Whether `raw` is an encoding of this instruction.
    fn matches(&self, raw: u32) -> bool;

    /// Builds the executable form of `instruction` located at `pc`.
    ///
    /// # Returns
    ///
    /// `None` when the definition has no semantics for `architecture`.
    fn generate_execution(
        &self,
        architecture: Architecture,
        instruction: &AssembledInstruction,
        pc: u32,
    ) -> Option<Arc<dyn Execution>>;
}

/// Maps raw words to instruction definitions.
pub trait DecodeTable: Send + Sync {
    /// Finds the definition matching `raw`, if any.
    fn lookup(&self, raw: u32) -> Option<Arc<dyn InstructionDefinition>>;

    /// Looks up `raw` and assembles it.
    fn assemble(&self, raw: u32) -> Option<AssembledInstruction> {
        self.lookup(raw)
            .map(|definition| AssembledInstruction::from_code(definition, raw))
    }
}

/// A non-pseudo instruction identified by `(raw & mask) == pattern`.
pub struct BasicInstruction {
    mnemonic: &'static str,
    format: Format,
    mask: u32,
    pattern: u32,
    excluded: Option<(u32, u32)>,
    semantics: HashMap<Architecture, Semantics>,
}

impl BasicInstruction {
    /// Creates a definition with no semantics attached yet.
    ///
    /// # Arguments
    ///
    /// * `mnemonic` - Assembly name.
    /// * `format` - Word layout.
    /// * `mask` - Bits that identify the instruction.
    /// * `pattern` - Required value of the masked bits; must include the opcode.
    pub fn new(mnemonic: &'static str, format: Format, mask: u32, pattern: u32) -> Self {
        debug_assert_eq!(pattern & !mask, 0, "{mnemonic}: pattern bits outside mask");
        Self {
            mnemonic,
            format,
            mask,
            pattern,
            excluded: None,
            semantics: HashMap::new(),
        }
    }

    /// Rejects words whose `mask` bits equal `pattern`, even if they match otherwise.
    ///
    /// Used where an encoding is shared with another instruction, such as `beqzc` with
    /// `rs == 0`.
    #[must_use]
    pub fn excluding(mut self, mask: u32, pattern: u32) -> Self {
        self.excluded = Some((mask, pattern));
        self
    }

    /// Attaches the behaviour used by `architecture`.
    #[must_use]
    pub fn with_semantics(mut self, architecture: Architecture, semantics: Semantics) -> Self {
        let _ = self.semantics.insert(architecture, semantics);
        self
    }

    /// Attaches single-cycle behaviour.
    #[must_use]
    pub fn single_cycle(self, semantics: Semantics) -> Self {
        self.with_semantics(Architecture::SingleCycle, semantics)
    }
}

impl InstructionDefinition for BasicInstruction {
    fn mnemonic(&self) -> &str {
        self.mnemonic
    }

    fn format(&self) -> Format {
        self.format
    }

    fn opcode(&self) -> u32 {
        codec::opcode(self.pattern)
    }

    fn matches(&self, raw: u32) -> bool {
        raw & self.mask == self.pattern
            && self
                .excluded
                .is_none_or(|(mask, pattern)| raw & mask != pattern)
    }

    fn generate_execution(
        &self,
        architecture: Architecture,
        instruction: &AssembledInstruction,
        pc: u32,
    ) -> Option<Arc<dyn Execution>> {
        let semantics = *self.semantics.get(&architecture)?;
        match architecture {
            Architecture::SingleCycle => Some(Arc::new(SingleCycleExecution::new(
                instruction.clone(),
                pc,
                semantics,
            ))),
        }
    }
}

impl fmt::Debug for BasicInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicInstruction")
            .field("mnemonic", &self.mnemonic)
            .field("format", &self.format)
            .field("mask", &format_args!("0x{:08x}", self.mask))
            .field("pattern", &format_args!("0x{:08x}", self.pattern))
            .finish_non_exhaustive()
    }
}

/// A decode table built from a list of definitions.
///
/// Definitions are bucketed by operation code and tried in registration order, so more
/// specific patterns must be registered before broader ones sharing their opcode.
pub struct InstructionSet {
    buckets: Vec<Vec<Arc<dyn InstructionDefinition>>>,
    len: usize,
}

impl InstructionSet {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            buckets: vec![Vec::new(); OPCODE_COUNT],
            len: 0,
        }
    }

    /// Adds a definition.
    pub fn register(&mut self, definition: Arc<dyn InstructionDefinition>) {
        let bucket = definition.opcode() as usize % OPCODE_COUNT;
        self.buckets[bucket].push(definition);
        self.len += 1;
    }

    /// Adds a definition, builder style.
    #[must_use]
    pub fn with(mut self, definition: impl InstructionDefinition + 'static) -> Self {
        self.register(Arc::new(definition));
        self
    }

    /// Number of registered definitions.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no definition is registered.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeTable for InstructionSet {
    fn lookup(&self, raw: u32) -> Option<Arc<dyn InstructionDefinition>> {
        self.buckets[codec::opcode(raw) as usize]
            .iter()
            .find(|definition| definition.matches(raw))
            .cloned()
    }
}

impl fmt::Debug for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstructionSet")
            .field("definitions", &self.len)
            .finish()
    }
}
