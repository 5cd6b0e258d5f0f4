//! Simulated memory.
//!
//! This module defines the memory seam of the engine. It provides:
//! 1. **`Memory`:** The trait the engine reads and writes through, including the hooks
//!    used for reset snapshots and cache-hierarchy walks.
//! 2. **Sections:** The named regions of the MIPS32 address space.
//! 3. **`SimpleMemory`:** A flat, little-endian implementation over a sparse page buffer.

/// Sparse page storage.
pub mod buffer;

use self::buffer::PageBuffer;
use crate::common::MemoryError;
use crate::common::constants::{
    DATA_BASE, KERNEL_DATA_BASE, KERNEL_TEXT_BASE, MMIO_BASE, TEXT_BASE,
};

/// Named region of the address space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// User text.
    Text,
    /// User data, heap and stack.
    Data,
    /// Kernel text (exception handlers).
    KernelText,
    /// Kernel data.
    KernelData,
    /// Memory-mapped I/O.
    Mmio,
}

/// Word- and byte-addressable memory as seen by the engine.
///
/// Setters return the previous content so the engine can record undo information
/// without an extra read.
pub trait Memory: Send {
    /// Section containing `address`, or `None` if the address is unmapped.
    fn section(&self, address: u32) -> Option<Section>;

    /// Reads an aligned word.
    fn word(&self, address: u32) -> Result<u32, MemoryError>;

    /// Reads an aligned half-word.
    fn half(&self, address: u32) -> Result<u16, MemoryError>;

    /// Reads a byte.
    fn byte(&self, address: u32) -> Result<u8, MemoryError>;

    /// Writes an aligned word, returning the previous value.
    fn set_word(&mut self, address: u32, value: u32) -> Result<u32, MemoryError>;

    /// Writes an aligned half-word, returning the previous value.
    fn set_half(&mut self, address: u32, value: u16) -> Result<u16, MemoryError>;

    /// Writes a byte, returning the previous value.
    fn set_byte(&mut self, address: u32, value: u8) -> Result<u8, MemoryError>;

    /// Address of the first instruction of the user text section.
    fn first_text_address(&self) -> u32;

    /// Snapshots the current contents for `restore_saved_state`.
    fn save_state(&mut self);

    /// Returns to the last snapshot.
    fn restore_saved_state(&mut self);

    /// Drops any cached state held by this level. Plain memories hold none.
    fn reset_cache(&mut self) {}

    /// The memory this level forwards misses to, if it is a cache.
    fn next_level_mut(&mut self) -> Option<&mut dyn Memory> {
        None
    }
}

/// Flat little-endian memory with the standard MIPS32 section layout.
#[derive(Clone, Debug, Default)]
pub struct SimpleMemory {
    buffer: PageBuffer,
    saved: PageBuffer,
}

impl SimpleMemory {
    /// Creates zero-filled memory.
    pub fn new() -> Self {
        Self::default()
    }

    const fn check_alignment(address: u32, width: u32) -> Result<(), MemoryError> {
        if address % width == 0 {
            Ok(())
        } else {
            Err(MemoryError::Unaligned { address, width })
        }
    }

    fn check_mapped(&self, address: u32) -> Result<(), MemoryError> {
        self.section(address)
            .map(|_| ())
            .ok_or(MemoryError::Unmapped { address })
    }

    fn read_le(&self, address: u32, width: u32) -> u32 {
        (0..width).fold(0, |acc, i| {
            acc | (u32::from(self.buffer.read(address.wrapping_add(i))) << (8 * i))
        })
    }

    fn write_le(&mut self, address: u32, width: u32, value: u32) -> u32 {
        (0..width).fold(0, |acc, i| {
            let old = self
                .buffer
                .write(address.wrapping_add(i), (value >> (8 * i)) as u8);
            acc | (u32::from(old) << (8 * i))
        })
    }
}

impl Memory for SimpleMemory {
    fn section(&self, address: u32) -> Option<Section> {
        match address {
            a if a >= MMIO_BASE => Some(Section::Mmio),
            a if a >= KERNEL_DATA_BASE => Some(Section::KernelData),
            a if a >= KERNEL_TEXT_BASE => Some(Section::KernelText),
            a if a >= DATA_BASE => Some(Section::Data),
            a if a >= TEXT_BASE => Some(Section::Text),
            _ => None,
        }
    }

    fn word(&self, address: u32) -> Result<u32, MemoryError> {
        Self::check_alignment(address, 4)?;
        self.check_mapped(address)?;
        Ok(self.read_le(address, 4))
    }

    fn half(&self, address: u32) -> Result<u16, MemoryError> {
        Self::check_alignment(address, 2)?;
        self.check_mapped(address)?;
        Ok(self.read_le(address, 2) as u16)
    }

    fn byte(&self, address: u32) -> Result<u8, MemoryError> {
        self.check_mapped(address)?;
        Ok(self.buffer.read(address))
    }

    fn set_word(&mut self, address: u32, value: u32) -> Result<u32, MemoryError> {
        Self::check_alignment(address, 4)?;
        self.check_mapped(address)?;
        Ok(self.write_le(address, 4, value))
    }

    fn set_half(&mut self, address: u32, value: u16) -> Result<u16, MemoryError> {
        Self::check_alignment(address, 2)?;
        self.check_mapped(address)?;
        Ok(self.write_le(address, 2, u32::from(value)) as u16)
    }

    fn set_byte(&mut self, address: u32, value: u8) -> Result<u8, MemoryError> {
        self.check_mapped(address)?;
        Ok(self.buffer.write(address, value))
    }

    fn first_text_address(&self) -> u32 {
        TEXT_BASE
    }

    fn save_state(&mut self) {
        self.saved = self.buffer.clone();
    }

    fn restore_saved_state(&mut self) {
        self.buffer = self.saved.clone();
    }
}
