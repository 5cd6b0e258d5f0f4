//! Decoded Instruction Cache.
//!
//! Maps text addresses to ready-to-run executions so each word is decoded once. It
//! provides:
//! 1. **Fetch:** Hit returns the stored execution; miss reads memory, decodes through the
//!    injected table, builds the execution for the configured architecture and stores it.
//! 2. **Invalidation:** Any write into text clears the entry covering the written word.
//! 3. **Growth:** A text write past the known end extends the cache to cover it.
//!
//! Addresses outside the known text range are decoded on every fetch and never stored.

use std::sync::Arc;

use tracing::debug;

use super::arch::{Architecture, Execution};
use crate::common::MemoryError;
use crate::common::constants::{WORD_ALIGN_MASK, WORD_SIZE};
use crate::isa::table::DecodeTable;
use crate::soc::memory::{Memory, Section};

/// Why a fetch produced no execution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The PC could not be read.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// No definition matches the word.
    #[error("no instruction matches 0x{word:08x}")]
    Undecodable {
        /// The word read at the PC.
        word: u32,
    },
    /// The definition has no execution for the configured architecture.
    #[error("{mnemonic} (0x{word:08x}) has no execution for this architecture")]
    Unsupported {
        /// The word read at the PC.
        word: u32,
        /// Mnemonic of the matched definition.
        mnemonic: String,
    },
}

/// Hit/miss counters of the instruction cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheCounters {
    /// Fetches served from a stored execution.
    pub hits: u64,
    /// Fetches that decoded and stored a new execution.
    pub misses: u64,
    /// Fetches outside the cached range.
    pub bypasses: u64,
    /// Entries cleared by writes.
    pub invalidations: u64,
}

/// Address-indexed cache of executions covering the user text section.
pub struct InstructionCache {
    entries: Vec<Option<Arc<dyn Execution>>>,
    text_base: u32,
    initial_len: usize,
    enabled: bool,
    counters: CacheCounters,
}

impl InstructionCache {
    /// Creates a cache for `words` instructions starting at `text_base`.
    ///
    /// # Arguments
    ///
    /// * `text_base` - First text address.
    /// * `words` - Number of instruction words initially in the text section.
    /// * `enabled` - When false every fetch decodes afresh.
    pub fn new(text_base: u32, words: usize, enabled: bool) -> Self {
        Self {
            entries: vec![None; words],
            text_base,
            initial_len: words,
            enabled,
            counters: CacheCounters::default(),
        }
    }

    /// First text address.
    pub const fn text_base(&self) -> u32 {
        self.text_base
    }

    /// Address just past the last known instruction.
    pub fn text_limit(&self) -> u32 {
        self.text_base
            .wrapping_add((self.entries.len() as u32).wrapping_mul(WORD_SIZE))
    }

    /// Address of the last known instruction, or `None` for an empty text section.
    pub fn text_end(&self) -> Option<u32> {
        (!self.entries.is_empty()).then(|| self.text_limit().wrapping_sub(WORD_SIZE))
    }

    /// Counters accumulated since construction or the last reset.
    pub const fn counters(&self) -> CacheCounters {
        self.counters
    }

    /// Whether a valid execution is stored for `pc`.
    pub fn is_cached(&self, pc: u32) -> bool {
        self.index(pc)
            .is_some_and(|index| self.entries[index].is_some())
    }

    fn index(&self, address: u32) -> Option<usize> {
        if address % WORD_SIZE != 0 || address < self.text_base {
            return None;
        }
        let index = ((address - self.text_base) >> 2) as usize;
        (index < self.entries.len()).then_some(index)
    }

    /// Returns the execution for `pc`, decoding it on a miss.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address to fetch.
    /// * `memory` - Source of instruction words.
    /// * `decoder` - Table resolving words to definitions.
    /// * `architecture` - Organisation the execution is built for.
    ///
    /// # Returns
    ///
    /// The execution, or why none could be produced.
    pub fn fetch(
        &mut self,
        pc: u32,
        memory: &dyn Memory,
        decoder: &dyn DecodeTable,
        architecture: Architecture,
    ) -> Result<Arc<dyn Execution>, FetchError> {
        let index = self.index(pc).filter(|_| self.enabled);
        if let Some(hit) = index.and_then(|i| self.entries[i].as_ref()) {
            self.counters.hits += 1;
            return Ok(Arc::clone(hit));
        }

        let word = memory.word(pc)?;
        let instruction = decoder
            .assemble(word)
            .ok_or(FetchError::Undecodable { word })?;
        let execution = instruction
            .basic()
            .generate_execution(architecture, &instruction, pc)
            .ok_or_else(|| FetchError::Unsupported {
                word,
                mnemonic: instruction.mnemonic().to_owned(),
            })?;

        match index {
            Some(i) => {
                self.counters.misses += 1;
                self.entries[i] = Some(Arc::clone(&execution));
            }
            None => self.counters.bypasses += 1,
        }
        Ok(execution)
    }

    /// Reacts to a write of any width at `address`.
    ///
    /// Clears the entry for the containing word. A write into the text section past the
    /// known end grows the cache so the written word becomes the new last instruction.
    pub fn invalidate(&mut self, address: u32, section: Option<Section>) {
        let aligned = address & WORD_ALIGN_MASK;
        if let Some(index) = self.index(aligned) {
            if self.entries[index].take().is_some() {
                self.counters.invalidations += 1;
                debug!(address = format_args!("0x{aligned:08x}"), "icache entry invalidated");
            }
        } else if section == Some(Section::Text) && aligned >= self.text_limit() {
            let words = ((aligned - self.text_base) >> 2) as usize + 1;
            self.entries.resize(words, None);
            debug!(
                end = format_args!("0x{aligned:08x}"),
                words, "text section grew"
            );
        }
    }

    /// Drops every entry and returns to the initial text size.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.resize(self.initial_len, None);
        self.counters = CacheCounters::default();
    }
}

impl std::fmt::Debug for InstructionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstructionCache")
            .field("text_base", &format_args!("0x{:08x}", self.text_base))
            .field("words", &self.entries.len())
            .field("enabled", &self.enabled)
            .field("counters", &self.counters)
            .finish_non_exhaustive()
    }
}
