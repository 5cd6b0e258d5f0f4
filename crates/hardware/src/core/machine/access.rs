//! Recorded Register and Memory Access.
//!
//! Every mutation made while a cycle is in flight passes through here. Each write:
//! 1. **Records** the previous value in the current cycle's change set.
//! 2. **Invalidates** the instruction cache when it lands in memory.
//! 3. **Announces** itself with a mutation event when notifications are enabled.

use super::Machine;
use crate::common::{MemoryError, RegisterId, SimError};
use crate::core::undo::{Change, StepChanges, Width};
use crate::sim::events::SimulationEvent;

impl Machine {
    /// Writes a register, recording the previous value.
    ///
    /// PC writes are recorded but not announced.
    pub(crate) fn set_register(&mut self, id: RegisterId, value: u32) {
        let old = self.registers.set(id, value);
        self.current.push(Change::Register { id, old });
        if self.call_events && id != RegisterId::Pc {
            self.pending_events.push(SimulationEvent::RegisterWritten(id));
        }
    }

    /// Reads memory, zero-extending sub-word widths.
    pub(crate) fn load(&self, address: u32, width: Width) -> Result<u32, MemoryError> {
        match width {
            Width::Word => self.memory.word(address),
            Width::Half => self.memory.half(address).map(u32::from),
            Width::Byte => self.memory.byte(address).map(u32::from),
        }
    }

    /// Writes memory, recording the previous value and invalidating cached executions.
    pub(crate) fn store(&mut self, address: u32, width: Width, value: u32) -> Result<(), MemoryError> {
        let old = self.write_raw(address, width, value)?;
        self.current.push(Change::Memory {
            address,
            width,
            old,
        });
        if self.call_events {
            self.pending_events
                .push(SimulationEvent::MemoryWritten { address, width });
        }
        Ok(())
    }

    /// Writes memory without recording; keeps the instruction cache coherent.
    pub(super) fn write_raw(
        &mut self,
        address: u32,
        width: Width,
        value: u32,
    ) -> Result<u32, MemoryError> {
        let old = match width {
            Width::Word => self.memory.set_word(address, value)?,
            Width::Half => u32::from(self.memory.set_half(address, value as u16)?),
            Width::Byte => u32::from(self.memory.set_byte(address, value as u8)?),
        };
        let section = self.memory.section(address);
        self.icache.invalidate(address, section);
        Ok(old)
    }

    /// Edits a register from outside a cycle.
    ///
    /// The write is announced like any other but is not part of a cycle, so it cannot
    /// be undone.
    pub fn write_register(&mut self, id: RegisterId, value: u32) {
        self.set_register(id, value);
        self.current = StepChanges::default();
    }

    /// Edits memory from outside a cycle.
    ///
    /// # Errors
    ///
    /// [`SimError::Memory`] if the address is unaligned for `width` or unmapped.
    pub fn write_memory(&mut self, address: u32, width: Width, value: u32) -> Result<(), SimError> {
        self.store(address, width, value)?;
        self.current = StepChanges::default();
        Ok(())
    }

    /// Reads memory from outside a cycle.
    ///
    /// # Errors
    ///
    /// [`SimError::Memory`] if the address is unaligned for `width` or unmapped.
    pub fn read_memory(&self, address: u32, width: Width) -> Result<u32, SimError> {
        Ok(self.load(address, width)?)
    }
}
