// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! High-level setup and interrupt servicing for the ARM11 side of CTR.

use arm11::Arm11Core;
use kernel::platform::chip::{Chip, InterruptMask, ThreadIdProvider};

use crate::gic::{Gic, GIC_CPU_INTERFACE_BASE, GIC_DISTRIBUTOR_BASE};

/// Bring-up on the ARM11 runs with interrupts masked, in this order:
///
/// ```rust,ignore
/// let chip = static_init!(Ctr<'static>, Ctr::new());
/// chip.initialize();
/// transport.initialize(chip.gic(), IRQ_PXI_SYNC);
/// unsafe { chip.enable_interrupts() };
/// ```
///
/// The transport handshake registers the sync handler, so the distributor must
/// be up first, and no interrupt may be taken before every handler is in place.
pub struct Ctr<'a, C: ThreadIdProvider + InterruptMask = Arm11Core> {
    gic: Gic<'a, C>,
}

impl<'a> Ctr<'a, Arm11Core> {
    pub const fn new() -> Self {
        Ctr::with_gic(Gic::new(GIC_DISTRIBUTOR_BASE, GIC_CPU_INTERFACE_BASE))
    }
}

impl<'a, C: ThreadIdProvider + InterruptMask> Ctr<'a, C> {
    pub const fn with_gic(gic: Gic<'a, C>) -> Self {
        Ctr { gic }
    }

    pub fn gic(&self) -> &Gic<'a, C> {
        &self.gic
    }

    /// Bring up the interrupt distributor. Interrupts stay masked on this core
    /// until [`Ctr::enable_interrupts`].
    pub fn initialize(&self) {
        self.gic.initialize();
    }

    /// Start taking interrupts on this core, once every handler the board needs
    /// is registered.
    pub unsafe fn enable_interrupts(&self) {
        C::enable_interrupts();
    }
}

impl<'a, C: ThreadIdProvider + InterruptMask> Chip for Ctr<'a, C> {
    type ThreadIdProvider = C;
    type InterruptMask = C;

    fn service_pending_interrupts(&self) {
        while self.gic.service_interrupt() {}
    }

    fn has_pending_interrupts(&self) -> bool {
        self.gic.next_pending().is_some()
    }

    fn sleep(&self) {
        unsafe {
            arm11::support::wfi();
        }
    }
}
