// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Helper functions for the ARM11 MPCore.

use kernel::platform::chip::InterruptMask;

use crate::Arm11Core;

/// IRQ disable bit of the CPSR.
pub const CPSR_IRQ_DISABLE: u32 = 1 << 7;

/// Number of cores in the cluster.
pub const NUM_CORES: usize = 4;

/// The CPSR to restore when leaving a critical section: `cpsr` with its IRQ
/// bit replaced by the one saved in `state`.
pub const fn restored_cpsr(cpsr: u32, state: u32) -> u32 {
    (cpsr & !CPSR_IRQ_DISABLE) | (state & CPSR_IRQ_DISABLE)
}

/// NOP instruction
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub fn nop() {
    use core::arch::asm;
    unsafe {
        asm!("nop", options(nomem, nostack, preserves_flags));
    }
}

/// WFI instruction
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub unsafe fn wfi() {
    use core::arch::asm;
    asm!("wfi", options(nostack, preserves_flags));
}

/// ID of the executing core, from the CPU ID field of the MPIDR.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub fn cpu_id() -> usize {
    use core::arch::asm;
    let mpidr: u32;
    unsafe {
        asm!(
            "mrc p15, 0, {}, c0, c0, 5",
            out(reg) mpidr,
            options(pure, nomem, nostack, preserves_flags),
        );
    }
    (mpidr & 0x3) as usize
}

/// Disable IRQs and return the previous IRQ disable bit.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub fn enter_critical_section() -> u32 {
    use core::arch::asm;
    let cpsr: u32;
    unsafe {
        asm!(
            "mrs {}, cpsr",
            "cpsid i",
            out(reg) cpsr,
            options(nostack, preserves_flags),
        );
    }
    cpsr & CPSR_IRQ_DISABLE
}

/// Restore the IRQ disable bit saved by [`enter_critical_section`]. Only the
/// control field of the CPSR is written.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub unsafe fn leave_critical_section(state: u32) {
    use core::arch::asm;
    let cpsr: u32;
    asm!("mrs {}, cpsr", out(reg) cpsr, options(nomem, nostack, preserves_flags));
    asm!(
        "msr cpsr_c, {}",
        in(reg) restored_cpsr(cpsr, state),
        options(nostack, preserves_flags),
    );
}

/// Clear the IRQ disable bit.
#[cfg(any(doc, all(target_arch = "arm", target_os = "none")))]
#[inline(always)]
pub unsafe fn enable_interrupts() {
    use core::arch::asm;
    asm!("cpsie i", options(nostack, preserves_flags));
}

// Mock implementations for tests on the host.

/// NOP instruction (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn nop() {
    unimplemented!()
}

/// WFI instruction (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub unsafe fn wfi() {
    unimplemented!()
}

/// Core ID (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn cpu_id() -> usize {
    unimplemented!()
}

/// Critical section entry (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub fn enter_critical_section() -> u32 {
    unimplemented!()
}

/// Critical section exit (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub unsafe fn leave_critical_section(_state: u32) {
    unimplemented!()
}

/// Interrupt enable (mock)
#[cfg(not(any(doc, all(target_arch = "arm", target_os = "none"))))]
pub unsafe fn enable_interrupts() {
    unimplemented!()
}

impl InterruptMask for Arm11Core {
    type State = u32;

    fn enter_critical_section() -> u32 {
        enter_critical_section()
    }

    unsafe fn leave_critical_section(state: u32) {
        leave_critical_section(state);
    }

    unsafe fn enable_interrupts() {
        enable_interrupts();
    }
}
