//! Program Loader.
//!
//! This module places an assembled program into simulated memory. It performs:
//! 1. **Text placement:** User instructions from the start of user text, handler
//!    instructions from the start of kernel text.
//! 2. **Data placement:** Initial data bytes from the start of user data.
//! 3. **Bounds:** Reports the extent of both text sections for the instruction cache and
//!    the drop-off check.

use crate::common::SimError;
use crate::common::constants::{DATA_BASE, KERNEL_DATA_BASE, KERNEL_TEXT_BASE, TEXT_BASE, WORD_SIZE};
use crate::core::machine::TextLayout;
use crate::soc::memory::Memory;

/// An assembled program ready to be placed in memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    text: Vec<u32>,
    kernel_text: Vec<u32>,
    data: Vec<u8>,
}

impl ProgramImage {
    /// Creates an image with user text only.
    pub const fn new(text: Vec<u32>) -> Self {
        Self {
            text,
            kernel_text: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Builds user text from little-endian bytes.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidProgram`] if the length is not a whole number of words.
    pub fn from_text_bytes(bytes: &[u8]) -> Result<Self, SimError> {
        if bytes.len() % WORD_SIZE as usize != 0 {
            return Err(SimError::InvalidProgram(format!(
                "text is {} bytes, not a multiple of {WORD_SIZE}",
                bytes.len()
            )));
        }
        let text = bytes
            .chunks_exact(WORD_SIZE as usize)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self::new(text))
    }

    /// Adds exception handler code placed at the start of kernel text.
    #[must_use]
    pub fn with_kernel_text(mut self, kernel_text: Vec<u32>) -> Self {
        self.kernel_text = kernel_text;
        self
    }

    /// Adds initial data placed at the start of user data.
    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// User instruction words.
    pub fn text(&self) -> &[u32] {
        &self.text
    }

    /// Kernel instruction words.
    pub fn kernel_text(&self) -> &[u32] {
        &self.kernel_text
    }

    /// Writes the image into `memory`.
    ///
    /// # Returns
    ///
    /// The extent of the user and kernel text sections.
    ///
    /// # Errors
    ///
    /// * [`SimError::InvalidProgram`] if a section overflows into the next one.
    /// * [`SimError::Memory`] if the memory rejects a write.
    pub fn load(&self, memory: &mut dyn Memory) -> Result<TextLayout, SimError> {
        check_fits("text", TEXT_BASE, DATA_BASE, self.text.len() as u64 * 4)?;
        check_fits(
            "kernel text",
            KERNEL_TEXT_BASE,
            KERNEL_DATA_BASE,
            self.kernel_text.len() as u64 * 4,
        )?;
        check_fits("data", DATA_BASE, KERNEL_TEXT_BASE, self.data.len() as u64)?;

        for (address, word) in (TEXT_BASE..).step_by(4).zip(&self.text) {
            let _ = memory.set_word(address, *word)?;
        }
        for (address, word) in (KERNEL_TEXT_BASE..).step_by(4).zip(&self.kernel_text) {
            let _ = memory.set_word(address, *word)?;
        }
        for (address, byte) in (DATA_BASE..).zip(&self.data) {
            let _ = memory.set_byte(address, *byte)?;
        }

        Ok(TextLayout {
            text_base: TEXT_BASE,
            text_words: self.text.len(),
            kernel_text_limit: KERNEL_TEXT_BASE + self.kernel_text.len() as u32 * WORD_SIZE,
        })
    }
}

fn check_fits(section: &str, base: u32, limit: u32, bytes: u64) -> Result<(), SimError> {
    if u64::from(base) + bytes > u64::from(limit) {
        return Err(SimError::InvalidProgram(format!(
            "{section} of {bytes} bytes does not fit below 0x{limit:08x}"
        )));
    }
    Ok(())
}
