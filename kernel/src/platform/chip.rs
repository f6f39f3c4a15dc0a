// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for implementing chips.

/// Interface for the SoC the bootloader runs on.
///
/// The chip owns the interrupt distributor and knows which core primitives to
/// use for critical sections and for identifying the running core. The main
/// loop only asks it to service interrupts and to sleep.
pub trait Chip {
    /// Provider to query the currently executing core.
    type ThreadIdProvider: ThreadIdProvider;

    /// The critical section primitive of the core this chip runs on.
    type InterruptMask: InterruptMask;

    /// The kernel calls this function to tell the chip to check for all pending
    /// interrupts and to correctly dispatch them to the peripheral drivers for
    /// the chip.
    ///
    /// This function should loop internally until all interrupts have been
    /// handled. It is ok, however, if an interrupt occurs after the last check
    /// but before this function returns. The kernel will handle this edge case.
    fn service_pending_interrupts(&self);

    /// Ask the chip to check if there are any pending interrupts.
    fn has_pending_interrupts(&self) -> bool;

    /// Put the chip to sleep until the next interrupt.
    fn sleep(&self);
}

/// Interface for retrieving the currently executing thread.
///
/// This is used to ensure that single-thread-only kernel structures are not
/// accessed by multiple threads simultaneously. On the MPCore, a "thread" is
/// a core: banked interrupt state is kept per core.
///
/// # Safety
///
/// The implementor must ensure that `running_thread_id` returns the ID of the
/// core actually executing the call, and that IDs are below the number of
/// cores of the platform.
pub unsafe trait ThreadIdProvider {
    /// Return a unique ID for the currently executing core.
    fn running_thread_id() -> usize;
}

/// Masking of interrupt delivery on the calling core.
///
/// Critical sections nest when their tokens are restored in stack order. They
/// are not reference counted, and they do not exclude other cores.
pub trait InterruptMask {
    /// Opaque copy of the interrupt enable state.
    type State: Copy;

    /// Disable interrupts on this core and return the previous state.
    fn enter_critical_section() -> Self::State;

    /// Restore the interrupt state captured by the matching
    /// [`InterruptMask::enter_critical_section`].
    ///
    /// # Safety
    ///
    /// `state` must come from the matching enter call on this core, and inner
    /// sections must be left before outer ones.
    unsafe fn leave_critical_section(state: Self::State);

    /// Unconditionally enable interrupts on this core.
    unsafe fn enable_interrupts();

    /// Run `f` with interrupts disabled on this core.
    fn atomic<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let state = Self::enter_critical_section();
        let res = f();
        unsafe { Self::leave_critical_section(state) };
        res
    }
}
