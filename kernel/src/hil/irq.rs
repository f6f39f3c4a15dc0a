// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for interrupt distributors.
//!
//! An interrupt distributor routes interrupt lines to handlers, with a
//! priority, a set of target cores and a trigger type per line. It is also the
//! only way for one core to interrupt another: lines below
//! [`SOFTWARE_INTERRUPTS`] can be raised from software.
//!
//! A client is registered per line. Registering enables the line, and
//! unregistering disables it again:
//!
//! ```ignore
//! gic.register_handler(IRQ_PXI_SYNC, 0, CpuMask::CURRENT, Trigger::Edge, &transport);
//! ```

/// Number of interrupt lines a distributor exposes.
pub const NUM_INTERRUPTS: u32 = 128;

/// Lines `0..SOFTWARE_INTERRUPTS` can be triggered from software.
pub const SOFTWARE_INTERRUPTS: u32 = 16;

/// Lowest priority level a handler can be registered with. Lower numbers are
/// more urgent.
pub const LOWEST_PRIORITY: u8 = 14;

/// Priority level that never gets delivered.
pub const PRIORITY_DISABLED: u8 = 15;

/// Identifies the interrupt being serviced.
///
/// Bits 0-9 hold the interrupt ID. For software interrupts, bits 10-12 hold
/// the ID of the core that raised it; they are zero otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterruptSource(u32);

impl InterruptSource {
    const ID_MASK: u32 = 0x3FF;
    const CPU_SHIFT: u32 = 10;
    const CPU_MASK: u32 = 0x7;

    pub const fn new(id: u32, source_cpu: u8) -> InterruptSource {
        InterruptSource(
            (id & Self::ID_MASK) | ((source_cpu as u32 & Self::CPU_MASK) << Self::CPU_SHIFT),
        )
    }

    /// Decode an acknowledge register value. Bits above 12 are ignored.
    pub const fn from_raw(raw: u32) -> InterruptSource {
        InterruptSource(raw & (Self::ID_MASK | (Self::CPU_MASK << Self::CPU_SHIFT)))
    }

    pub const fn id(&self) -> u32 {
        self.0 & Self::ID_MASK
    }

    pub const fn source_cpu(&self) -> u8 {
        ((self.0 >> Self::CPU_SHIFT) & Self::CPU_MASK) as u8
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Whether a line fires on a level or on a rising edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Level,
    Edge,
}

/// Set of target cores, one bit per core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuMask(pub u8);

impl CpuMask {
    /// Only the core making the call.
    pub const CURRENT: CpuMask = CpuMask(0);

    pub const fn core(id: usize) -> CpuMask {
        CpuMask(1 << id)
    }

    pub const fn contains(&self, id: usize) -> bool {
        id < 8 && self.0 & (1 << id) != 0
    }
}

/// Receives the interrupts of the lines it is registered for.
pub trait InterruptClient {
    /// Called from interrupt context, on the core that acknowledged the
    /// interrupt.
    fn handle_interrupt(&self, source: InterruptSource);
}

/// Routes interrupt lines to clients.
///
/// Invalid arguments are programming errors: implementations stop the system
/// through [`crate::fatal::fatal`] instead of returning an error.
pub trait InterruptDistributor<'a> {
    /// Install `client` for `line`, program its priority, targets and trigger
    /// and enable it. Replaces any client registered before.
    fn register_handler(
        &self,
        line: u32,
        priority: u8,
        cpu_mask: CpuMask,
        trigger: Trigger,
        client: &'a dyn InterruptClient,
    );

    /// Disable `line` and forget its client. An interrupt already in flight may
    /// still be delivered and is then treated as spurious.
    fn unregister_handler(&self, line: u32);

    /// Change only the priority of `line`.
    fn set_priority(&self, line: u32, priority: u8);

    /// Raise software interrupt `line` on every core in `cpu_mask`.
    fn software_interrupt(&self, line: u32, cpu_mask: CpuMask);
}
