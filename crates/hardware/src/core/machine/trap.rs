//! Exception and Interrupt Dispatch.
//!
//! This module implements the MIPS32 exception entry sequence. It performs the
//! following:
//! 1. **Arbitration:** Software requests win over hardware ones; among hardware requests
//!    the highest level accepted by Status is taken.
//! 2. **Context Saving:** EPC, `Cause.BD`, `Cause.ExcCode`, `Status.EXL` and `Status.IPL`.
//! 3. **Vectoring:** Computes the handler address from EBase, the cause and IntCtl.VS.
//! 4. **Unhandled Exceptions:** A vector holding no handler ends the program.

use tracing::error;

use super::Machine;
use crate::common::constants::{
    CAUSE_BD, CAUSE_EXC_CODE, CAUSE_EXC_CODE_WIDTH, CAUSE_IP, CAUSE_RIPL, CAUSE_RIPL_WIDTH,
    COP0_BAD_VADDR, COP0_CAUSE, COP0_EBASE, COP0_EPC, COP0_INTCTL, COP0_STATUS, INTCTL_VS,
    INTCTL_VS_WIDTH, SOFTWARE_REQUEST_LEVEL, STATUS_EXL, STATUS_IPL, STATUS_IPL_WIDTH,
    UNHANDLED_EXCEPTION_EXIT_BASE, VECTOR_ADDRESS_MASK, VECTOR_CACHE_ERROR, VECTOR_GENERAL,
    VECTOR_INTERRUPT_BASE, VECTOR_SEGMENT, WORD_SIZE,
};
use crate::common::reg::{bits, with_bits};
use crate::common::{InterruptCause, MipsException, RegisterId};
use crate::core::interrupt::InterruptView;
use crate::sim::console::Severity;
use crate::sim::events::SimulationEvent;

/// Computes the handler address for an exception.
///
/// # Arguments
///
/// * `ebase` - Value of the EBase register.
/// * `intctl` - Value of the IntCtl register.
/// * `cause` - Exception being taken.
/// * `level` - Requested interrupt level, used for external interrupts.
/// * `at_exception_level` - Whether `Status.EXL` was already set.
pub const fn exception_vector(
    ebase: u32,
    intctl: u32,
    cause: InterruptCause,
    level: u32,
    at_exception_level: bool,
) -> u32 {
    let offset = if at_exception_level {
        VECTOR_GENERAL
    } else {
        match cause {
            InterruptCause::CacheError => VECTOR_CACHE_ERROR,
            InterruptCause::Interrupt => {
                let spacing = bits(intctl, INTCTL_VS, INTCTL_VS_WIDTH) << 5;
                VECTOR_INTERRUPT_BASE.wrapping_add(level.wrapping_mul(spacing))
            }
            _ => VECTOR_GENERAL,
        }
    };
    ((ebase & !0xFFF).wrapping_add(offset) & VECTOR_ADDRESS_MASK) | VECTOR_SEGMENT
}

impl Machine {
    /// Queues an exception raised by an instruction and flags it in `Cause.IP`.
    pub fn request_software_interrupt(&mut self, exception: MipsException) {
        self.interrupts.request_software(exception);
        let cause = self.registers.cop0(COP0_CAUSE);
        self.set_register(RegisterId::cop0(COP0_CAUSE), with_bits(cause, CAUSE_IP, 1, 1));
    }

    /// Flags an external interrupt at `level`.
    pub const fn request_hardware_interrupt(&mut self, level: u32) {
        self.interrupts.request_hardware(level);
    }

    /// Takes the highest-priority pending request, if any.
    ///
    /// # Returns
    ///
    /// Whether an exception entry sequence ran.
    pub(super) fn dispatch_interrupts(&mut self) -> bool {
        let pc = self.registers.pc();
        let cause = self.registers.cop0(COP0_CAUSE);

        if let Some(exception) = self.interrupts.take_software() {
            let cause = with_bits(cause, CAUSE_IP, 1, 0);
            self.set_register(
                RegisterId::cop0(COP0_CAUSE),
                with_bits(cause, CAUSE_RIPL, CAUSE_RIPL_WIDTH, SOFTWARE_REQUEST_LEVEL),
            );
            self.stats.exceptions_taken += 1;
            self.invoke_interrupt(exception.cause, Some(exception), false, pc);
            return true;
        }

        let view = InterruptView::new(self.registers.cop0(COP0_STATUS));
        let Some(level) = self
            .interrupts
            .highest_hardware_level()
            .filter(|level| view.accepts(*level))
        else {
            return false;
        };
        self.interrupts.acknowledge_hardware(level);
        self.set_register(
            RegisterId::cop0(COP0_CAUSE),
            with_bits(cause, CAUSE_RIPL, CAUSE_RIPL_WIDTH, level),
        );
        self.stats.interrupts_taken += 1;
        self.invoke_interrupt(InterruptCause::Interrupt, None, false, pc);
        true
    }

    /// Runs the exception entry sequence.
    ///
    /// # Arguments
    ///
    /// * `cause` - Exception being taken.
    /// * `exception` - Originating exception, whose bad address goes to BadVAddr.
    /// * `delay_slot` - Whether the faulting instruction sat in a delay slot.
    /// * `pc` - Address saved to EPC.
    pub fn invoke_interrupt(
        &mut self,
        cause: InterruptCause,
        exception: Option<MipsException>,
        delay_slot: bool,
        pc: u32,
    ) {
        let status = self.registers.cop0(COP0_STATUS);
        let at_exception_level = bits(status, STATUS_EXL, 1) == 1;
        let mut cause_reg = self.registers.cop0(COP0_CAUSE);

        if !at_exception_level {
            let epc = if delay_slot {
                pc.wrapping_sub(WORD_SIZE)
            } else {
                pc
            };
            self.set_register(RegisterId::cop0(COP0_EPC), epc);
            cause_reg = with_bits(cause_reg, CAUSE_BD, 1, u32::from(delay_slot));
        }

        cause_reg = with_bits(cause_reg, CAUSE_EXC_CODE, CAUSE_EXC_CODE_WIDTH, cause.code());
        self.set_register(RegisterId::cop0(COP0_CAUSE), cause_reg);

        let level = bits(cause_reg, CAUSE_RIPL, CAUSE_RIPL_WIDTH);
        let status = with_bits(status, STATUS_EXL, 1, 1);
        self.set_register(
            RegisterId::cop0(COP0_STATUS),
            with_bits(status, STATUS_IPL, STATUS_IPL_WIDTH, level),
        );

        let vector = exception_vector(
            self.registers.cop0(COP0_EBASE),
            self.registers.cop0(COP0_INTCTL),
            cause,
            level,
            at_exception_level,
        );
        self.set_register(RegisterId::Pc, vector);

        if let Some(address) = exception.and_then(|e| e.bad_address) {
            self.set_register(RegisterId::cop0(COP0_BAD_VADDR), address);
        }

        if self.memory.word(vector).unwrap_or(0) == 0 {
            error!(
                pc = format_args!("0x{pc:08x}"),
                vector = format_args!("0x{vector:08x}"),
                cause = cause.name(),
                "no exception handler installed"
            );
            self.finish(
                UNHANDLED_EXCEPTION_EXIT_BASE + cause.code() as i32,
                Severity::Error,
                &format!(
                    "Execution finished. Runtime exception at 0x{pc:08x}: Code {} ({})",
                    cause.code(),
                    cause.name()
                ),
            );
        }
    }

    /// Ends the program with an explicit exit code.
    ///
    /// Ignored once the program has finished.
    pub fn request_exit(&mut self, code: i32) {
        self.finish(
            code,
            Severity::Done,
            &format!("Execution finished with exit code {code}."),
        );
    }

    pub(super) fn finish(&mut self, code: i32, severity: Severity, message: &str) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.exit_code = Some(code);
        self.console.print(severity, message);
        self.console.flush();
        self.push_event(SimulationEvent::Finished { exit_code: code });
    }
}
