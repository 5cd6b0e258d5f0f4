//! Exception Dispatch Tests.
//!
//! Covers the vector computation table, the entry sequence (EPC, Cause, Status,
//! BadVAddr), unhandled exceptions, handlers returning with `eret`, and arbitration
//! between software and hardware requests.

use mipsim_core::common::constants::{
    CAUSE_RESET, COP0_CAUSE, COP0_EPC, COP0_INTCTL, COP0_STATUS, STATUS_RESET,
};
use mipsim_core::common::{InterruptCause, MipsException, RegisterId};
use mipsim_core::config::SimulationConfig;
use mipsim_core::core::machine::trap::exception_vector;
use mipsim_core::sim::{ProgramImage, Severity};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::instruction::*;
use crate::common::harness::{
    K0, T1, T2, T3, general_handler, handler_at, machine, machine_with, run_to_end,
};

fn exc_code(cause: u32) -> u32 {
    (cause >> 2) & 0x1F
}

// ══════════════════════════════════════════════════════════
// 1. Vector table
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::general(0x8000_0000, 0x20, InterruptCause::Syscall, 0, false, 0x8000_0180)]
#[case::cache_error(0x8000_0000, 0x20, InterruptCause::CacheError, 0, false, 0x8000_0100)]
#[case::vectored_level_2(0x8000_0000, 4 << 5, InterruptCause::Interrupt, 2, false, 0x8000_0300)]
#[case::vectored_reset_spacing(0x8000_0000, 0x20, InterruptCause::Interrupt, 2, false, 0x8000_0240)]
#[case::zero_spacing(0x8000_0000, 0, InterruptCause::Interrupt, 7, false, 0x8000_0200)]
#[case::nested_interrupt(0x8000_0000, 4 << 5, InterruptCause::Interrupt, 2, true, 0x8000_0180)]
#[case::nested_cache_error(0x8000_0000, 0x20, InterruptCause::CacheError, 0, true, 0x8000_0180)]
#[case::ebase_low_bits_ignored(0x8000_1ABC, 0x20, InterruptCause::Trap, 0, false, 0x8000_1180)]
#[case::forced_into_kseg0(0xC000_0000, 0x20, InterruptCause::Syscall, 0, false, 0x8000_0180)]
fn vector_table(
    #[case] ebase: u32,
    #[case] intctl: u32,
    #[case] cause: InterruptCause,
    #[case] level: u32,
    #[case] exl: bool,
    #[case] expected: u32,
) {
    assert_eq!(exception_vector(ebase, intctl, cause, level, exl), expected);
}

// ══════════════════════════════════════════════════════════
// 2. Unhandled exceptions
// ══════════════════════════════════════════════════════════

#[test]
fn syscall_without_handler_ends_with_cause_code() {
    let (mut m, log) = machine_with(
        &ProgramImage::new(vec![syscall()]),
        &SimulationConfig::default(),
    );
    run_to_end(&mut m, 8);

    assert_eq!(m.exit_code(), Some(0x1008));
    assert_eq!(m.cycles(), 2);
    assert_eq!(m.registers().cop0(COP0_EPC), 0x0040_0004);
    assert_eq!(exc_code(m.registers().cop0(COP0_CAUSE)), 8);
    assert_eq!(m.pc(), 0x8000_0180);
    assert!(log.contains(
        Severity::Error,
        "Execution finished. Runtime exception at 0x00400004: Code 8 (SYSCALL)"
    ));
    assert_eq!(m.stats().exceptions_taken, 1);
}

#[test]
fn pending_exception_prevents_drop_off() {
    let mut m = machine(&[syscall()]);
    let _ = m.cycle();
    assert!(!m.is_finished(), "dispatch must run before the program ends");
    assert_eq!(m.registers().cop0(COP0_CAUSE) & (1 << 8), 1 << 8, "IP0 flags the request");
}

#[test]
fn overflow_leaves_destination_untouched() {
    let mut m = machine(&[lui(8, 0x7FFF), ori(8, 8, 0xFFFF), addiu(9, 0, 1), add(10, 8, 9)]);
    run_to_end(&mut m, 16);
    assert_eq!(m.exit_code(), Some(0x100C));
    assert_eq!(m.registers().gpr(10), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Installed handlers
// ══════════════════════════════════════════════════════════

#[test]
fn handler_runs_and_eret_resumes() {
    let program = ProgramImage::new(vec![syscall(), addiu(T3, 0, 1)]).with_kernel_text(
        general_handler(&[mfc0(K0, 14, 0), addiu(T2, 0, 42), eret()]),
    );
    let (mut m, _) = machine_with(&program, &SimulationConfig::default());
    run_to_end(&mut m, 32);

    assert_eq!(m.exit_code(), Some(0));
    assert_eq!(m.registers().gpr(K0 as usize), 0x0040_0004);
    assert_eq!(m.registers().gpr(T2 as usize), 42);
    assert_eq!(m.registers().gpr(T3 as usize), 1);
    assert_eq!(m.cycles(), 5);
    assert_eq!(m.registers().cop0(COP0_STATUS) & 0b10, 0, "EXL cleared by eret");
}

#[test]
fn handler_falling_off_kernel_text_ends_program() {
    let program = ProgramImage::new(vec![syscall(), addiu(T3, 0, 1)])
        .with_kernel_text(general_handler(&[addiu(T1, 0, 1)]));
    let (mut m, log) = machine_with(&program, &SimulationConfig::default());
    run_to_end(&mut m, 8);

    assert!(m.is_kernel_mode());
    assert_eq!(m.exit_code(), Some(0));
    assert_eq!(m.registers().gpr(T1 as usize), 1);
    assert_eq!(m.registers().gpr(T3 as usize), 0);
    assert!(log.contains(Severity::Warning, "Dropped off bottom"));
}

#[test]
fn nested_exception_keeps_epc() {
    let program = ProgramImage::new(vec![syscall()])
        .with_kernel_text(general_handler(&[teq(0, 0)]));
    let (mut m, _) = machine_with(&program, &SimulationConfig::default());
    for _ in 0..3 {
        let _ = m.cycle();
    }

    assert!(!m.is_finished());
    assert_eq!(m.registers().cop0(COP0_EPC), 0x0040_0004);
    assert_eq!(exc_code(m.registers().cop0(COP0_CAUSE)), 13);
    assert_eq!(m.stats().exceptions_taken, 2);
}

#[test]
fn decode_failure_raises_reserved_instruction() {
    let (mut m, log) = machine_with(
        &ProgramImage::new(vec![0xFFFF_FFFF]),
        &SimulationConfig::default(),
    );
    run_to_end(&mut m, 8);

    assert_eq!(m.exit_code(), Some(0x100A));
    assert_eq!(
        m.last_failure(),
        Some(&mipsim_core::common::SimError::DecodeFailure {
            address: 0x0040_0000,
            word: 0xFFFF_FFFF
        })
    );
    assert!(log.contains(
        Severity::Error,
        "Instruction at 0x00400000 (0xffffffff) could not be decoded."
    ));
}

// ══════════════════════════════════════════════════════════
// 4. Hardware interrupts
// ══════════════════════════════════════════════════════════

#[test]
fn accepted_hardware_interrupt_is_vectored() {
    let mut m = machine(&[nop(), nop()]);
    m.request_hardware_interrupt(2);
    let _ = m.cycle();

    assert_eq!(m.exit_code(), Some(0x1000));
    assert_eq!(m.pc(), 0x8000_0240);
    assert_eq!(m.registers().cop0(COP0_EPC), 0x0040_0000);
    let cause = m.registers().cop0(COP0_CAUSE);
    assert_eq!((cause >> 10) & 0x3F, 2, "RIPL");
    assert_eq!(exc_code(cause), 0);
    assert_eq!((m.registers().cop0(COP0_STATUS) >> 10) & 0x3F, 2, "IPL raised");
    assert_eq!(m.stats().interrupts_taken, 1);
    assert!(!m.interrupts().is_hardware_pending(2));
}

#[test]
fn vector_spacing_follows_intctl() {
    let mut m = machine(&[nop()]);
    m.write_register(RegisterId::cop0(COP0_INTCTL), 4 << 5);
    m.request_hardware_interrupt(2);
    let _ = m.cycle();
    assert_eq!(m.pc(), 0x8000_0300);
}

#[test]
fn interrupt_handler_at_vector_runs() {
    let program = ProgramImage::new(vec![nop(), nop()])
        .with_kernel_text(handler_at(0x240, &[addiu(T1, 0, 5), eret()]));
    let (mut m, _) = machine_with(&program, &SimulationConfig::default());
    m.request_hardware_interrupt(2);
    run_to_end(&mut m, 16);

    assert_eq!(m.registers().gpr(T1 as usize), 5);
    assert_eq!(m.exit_code(), Some(0));
}

#[rstest]
#[case::interrupts_disabled(STATUS_RESET & !1)]
#[case::priority_too_high(STATUS_RESET | (2 << 10))]
#[case::at_exception_level(STATUS_RESET | 0b10)]
fn masked_interrupt_stays_pending(#[case] status: u32) {
    let mut m = machine(&[nop(), nop()]);
    m.write_register(RegisterId::cop0(COP0_STATUS), status);
    m.request_hardware_interrupt(2);
    let _ = m.cycle();

    assert_eq!(m.pc(), 0x0040_0004, "instruction executed normally");
    assert!(m.interrupts().is_hardware_pending(2));
    assert_eq!(m.stats().interrupts_taken, 0);
}

#[test]
fn software_request_wins_over_hardware() {
    let mut m = machine(&[nop()]);
    m.request_hardware_interrupt(3);
    m.request_software_interrupt(MipsException::new(InterruptCause::Syscall));
    let _ = m.cycle();

    assert_eq!(m.exit_code(), Some(0x1008));
    assert!(m.interrupts().is_hardware_pending(3));
    assert_eq!(m.stats().interrupts_taken, 0);
}

#[test]
fn software_dispatch_requests_level_one() {
    let program = ProgramImage::new(vec![syscall(), nop()])
        .with_kernel_text(handler_at(0x2A0, &[eret()]));
    let (mut m, _) = machine_with(&program, &SimulationConfig::default());
    m.request_hardware_interrupt(5);

    let _ = m.cycle();
    assert_eq!(m.pc(), 0x0040_0000, "level 5 handler returned");
    assert_eq!((m.registers().cop0(COP0_CAUSE) >> 10) & 0x3F, 5);

    run_to_end(&mut m, 8);
    let cause = m.registers().cop0(COP0_CAUSE);
    assert_eq!(exc_code(cause), 8);
    assert_eq!((cause >> 10) & 0x3F, 1, "RIPL");
    assert_eq!((m.registers().cop0(COP0_STATUS) >> 10) & 0x3F, 1, "IPL");
    assert_eq!(m.exit_code(), Some(0x1008));
}

#[test]
fn bad_address_is_copied_to_badvaddr() {
    let mut m = machine(&[nop()]);
    m.request_software_interrupt(MipsException::with_address(
        InterruptCause::AddressStore,
        0x1234_5678,
    ));
    let _ = m.cycle();
    assert_eq!(m.registers().cop0((8, 0)), 0x1234_5678);
    assert_eq!(m.exit_code(), Some(0x1005));
}

#[test]
fn invoke_interrupt_in_delay_slot_sets_bd() {
    let program =
        ProgramImage::new(vec![nop()]).with_kernel_text(general_handler(&[addiu(T1, 0, 1)]));
    let (mut m, _) = machine_with(&program, &SimulationConfig::default());
    m.invoke_interrupt(InterruptCause::Trap, None, true, 0x0040_0008);

    assert_eq!(m.registers().cop0(COP0_EPC), 0x0040_0004);
    assert_eq!(m.registers().cop0(COP0_CAUSE) >> 31, 1);
    assert_eq!(m.registers().cop0(COP0_CAUSE) & CAUSE_RESET, CAUSE_RESET);
    assert!(!m.is_finished());
}
