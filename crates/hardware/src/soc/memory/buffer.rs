//! Sparse page buffer.
//!
//! Backing storage for simulated memory. The 4 GiB address space is split into 4 KiB
//! pages that are allocated on first write; reads of untouched pages return zero.

use std::collections::HashMap;

/// Size of one page in bytes.
pub const PAGE_SIZE: usize = 4096;

/// Number of bits to shift to convert between bytes and pages.
const PAGE_SHIFT: u32 = 12;

/// Mask extracting the offset inside a page.
const PAGE_OFFSET_MASK: u32 = (PAGE_SIZE as u32) - 1;

type Page = Box<[u8; PAGE_SIZE]>;

/// Lazily allocated byte storage covering the full 32-bit address space.
#[derive(Clone, Debug, Default)]
pub struct PageBuffer {
    pages: HashMap<u32, Page>,
}

impl PageBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads one byte.
    #[inline]
    pub fn read(&self, address: u32) -> u8 {
        self.pages
            .get(&(address >> PAGE_SHIFT))
            .map_or(0, |page| page[(address & PAGE_OFFSET_MASK) as usize])
    }

    /// Writes one byte and returns the previous content.
    #[inline]
    pub fn write(&mut self, address: u32, value: u8) -> u8 {
        let page = self
            .pages
            .entry(address >> PAGE_SHIFT)
            .or_insert_with(|| Box::new([0; PAGE_SIZE]));
        let slot = &mut page[(address & PAGE_OFFSET_MASK) as usize];
        std::mem::replace(slot, value)
    }

    /// Number of allocated pages.
    pub fn allocated_pages(&self) -> usize {
        self.pages.len()
    }
}
