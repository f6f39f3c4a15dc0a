// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! ARM11 MPCore interrupt distributor driver.
//!
//! The distributor is shared by the four cores. Lines 0-15 are software
//! interrupts and lines 16-31 private peripherals; both are banked, so every
//! core has its own enable bits for them and its own handler in this driver.
//! Lines 32-127 are shared and routed to the cores of their target mask.
//!
//! Every change of the handler table and of the line configuration happens
//! inside a critical section of the calling core. There is no locking against
//! the other cores.

use core::marker::PhantomData;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::fatal::{fatal, Fatal};
use kernel::hil::irq::{
    CpuMask, InterruptClient, InterruptDistributor, InterruptSource, Trigger, LOWEST_PRIORITY,
    NUM_INTERRUPTS, PRIORITY_DISABLED, SOFTWARE_INTERRUPTS,
};
use kernel::platform::chip::{InterruptMask, ThreadIdProvider};
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly,
};
use kernel::utilities::cells::OptionalCell;
use kernel::utilities::StaticRef;

register_structs! {
    /// Distributor registers, for the 128 lines CTR implements.
    pub GicDistributorRegisters {
        (0x000 => ctlr: ReadWrite<u32, DistributorControl::Register>),
        (0x004 => typer: ReadOnly<u32>),
        (0x008 => _reserved0),
        (0x100 => isenabler: [ReadWrite<u32>; LINE_WORDS]),
        (0x110 => _reserved1),
        (0x180 => icenabler: [ReadWrite<u32>; LINE_WORDS]),
        (0x190 => _reserved2),
        (0x200 => ispendr: [ReadWrite<u32>; LINE_WORDS]),
        (0x210 => _reserved3),
        (0x280 => icpendr: [ReadWrite<u32>; LINE_WORDS]),
        (0x290 => _reserved4),
        (0x300 => isactiver: [ReadOnly<u32>; LINE_WORDS]),
        (0x310 => _reserved5),
        (0x400 => ipriorityr: [ReadWrite<u8>; 128]),
        (0x480 => _reserved6),
        (0x800 => itargetsr: [ReadWrite<u8>; 128]),
        (0x880 => _reserved7),
        (0xC00 => icfgr: [ReadWrite<u32>; 8]),
        (0xC20 => _reserved8),
        (0xF00 => sgir: WriteOnly<u32, SoftwareInterrupt::Register>),
        (0xF04 => _reserved9),
        (0x1000 => @END),
    },

    /// Per-core CPU interface registers. Every core sees its own copy at the
    /// same address.
    pub GicCpuInterfaceRegisters {
        (0x00 => ctlr: ReadWrite<u32, CpuControl::Register>),
        (0x04 => pmr: ReadWrite<u32>),
        (0x08 => bpr: ReadWrite<u32>),
        (0x0C => iar: ReadOnly<u32>),
        (0x10 => eoir: WriteOnly<u32>),
        (0x14 => rpr: ReadOnly<u32>),
        (0x18 => hppir: ReadOnly<u32>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    DistributorControl [
        ENABLE OFFSET(0) NUMBITS(1) []
    ],
    CpuControl [
        ENABLE OFFSET(0) NUMBITS(1) []
    ],
    SoftwareInterrupt [
        INTERRUPT_ID OFFSET(0) NUMBITS(10) [],
        CPU_TARGET_LIST OFFSET(16) NUMBITS(8) [],
        TARGET_LIST_FILTER OFFSET(24) NUMBITS(2) [
            TargetList = 0,
            AllButSelf = 1,
            SelfOnly = 2
        ]
    ]
];

pub const GIC_CPU_INTERFACE_BASE: StaticRef<GicCpuInterfaceRegisters> =
    unsafe { StaticRef::new(0x17E0_0100 as *const GicCpuInterfaceRegisters) };

pub const GIC_DISTRIBUTOR_BASE: StaticRef<GicDistributorRegisters> =
    unsafe { StaticRef::new(0x17E0_1000 as *const GicDistributorRegisters) };

/// Cores with banked interrupt state.
pub const MAX_CPUS: usize = 4;

/// Interrupt ID the CPU interface reports when nothing is pending.
pub const SPURIOUS_INTERRUPT: u32 = 1023;

const NUM_BANKED: usize = 32;
const NUM_SHARED: usize = NUM_INTERRUPTS as usize - NUM_BANKED;
const LINE_WORDS: usize = NUM_INTERRUPTS as usize / 32;

const VALID_CPU_MASK: u8 = (1 << MAX_CPUS) - 1;

// Only the upper four bits of a priority byte are implemented.
const PRIORITY_SHIFT: u8 = 4;

// Level sensitive, 1-N handling, for 16 lines.
const ALL_LEVEL_ONE_N: u32 = 0x5555_5555;

type Slot<'a> = OptionalCell<&'a dyn InterruptClient>;

pub struct Gic<'a, C: ThreadIdProvider + InterruptMask> {
    distributor: StaticRef<GicDistributorRegisters>,
    cpu_interface: StaticRef<GicCpuInterfaceRegisters>,
    banked: [[Slot<'a>; NUM_BANKED]; MAX_CPUS],
    shared: [Slot<'a>; NUM_SHARED],
    _core: PhantomData<C>,
}

fn check_line(line: u32) -> usize {
    if line >= NUM_INTERRUPTS {
        fatal(Fatal::InvalidInterrupt(line));
    }
    line as usize
}

fn check_cpu_mask(mask: CpuMask) {
    if mask.0 & !VALID_CPU_MASK != 0 {
        fatal(Fatal::InvalidCpuMask(mask.0));
    }
}

fn line_bit(line: usize) -> (usize, u32) {
    (line / 32, 1 << (line % 32))
}

impl<'a, C: ThreadIdProvider + InterruptMask> Gic<'a, C> {
    pub const fn new(
        distributor: StaticRef<GicDistributorRegisters>,
        cpu_interface: StaticRef<GicCpuInterfaceRegisters>,
    ) -> Self {
        Gic {
            distributor,
            cpu_interface,
            banked: [const { [const { OptionalCell::empty() }; NUM_BANKED] }; MAX_CPUS],
            shared: [const { OptionalCell::empty() }; NUM_SHARED],
            _core: PhantomData,
        }
    }

    /// Reset the distributor: every line disabled, not pending, priority 15,
    /// shared lines level triggered and untargeted, no handlers. Then set up
    /// the CPU interface of the calling core.
    ///
    /// Must run once, on one core, before any handler is registered.
    pub fn initialize(&self) {
        C::atomic(|| {
            let regs = self.distributor;
            regs.ctlr.write(DistributorControl::ENABLE::CLEAR);

            for reg in regs.icenabler.iter() {
                reg.set(u32::MAX);
            }
            for reg in regs.icpendr.iter() {
                reg.set(u32::MAX);
            }
            for reg in regs.ipriorityr.iter() {
                reg.set(PRIORITY_DISABLED << PRIORITY_SHIFT);
            }
            for reg in regs.itargetsr.iter().skip(NUM_BANKED) {
                reg.set(0);
            }
            for reg in regs.icfgr.iter().skip(NUM_BANKED / 16) {
                reg.set(ALL_LEVEL_ONE_N);
            }
            for slot in self.shared.iter() {
                slot.clear();
            }

            regs.ctlr.write(DistributorControl::ENABLE::SET);
        });
        self.initialize_cpu_interface();
    }

    /// Set up the CPU interface of the calling core and clear its banked
    /// lines. Secondary cores call this instead of [`Gic::initialize`].
    pub fn initialize_cpu_interface(&self) {
        C::atomic(|| {
            let core = C::running_thread_id();
            // Banked: only affects the calling core.
            self.distributor.icenabler[0].set(u32::MAX);
            for slot in self.banked[core].iter() {
                slot.clear();
            }

            let cpu = self.cpu_interface;
            cpu.pmr
                .set(u32::from(PRIORITY_DISABLED) << u32::from(PRIORITY_SHIFT));
            cpu.bpr.set(3);
            cpu.ctlr.write(CpuControl::ENABLE::SET);
        });
    }

    fn slot(&self, line: usize, core: usize) -> &Slot<'a> {
        if line < NUM_BANKED {
            &self.banked[core][line]
        } else {
            &self.shared[line - NUM_BANKED]
        }
    }

    /// Banked lines can only target the core configuring them.
    fn resolve_targets(line: usize, mask: CpuMask, core: usize) -> CpuMask {
        check_cpu_mask(mask);
        let local = CpuMask::core(core);
        if mask == CpuMask::CURRENT {
            local
        } else if line < NUM_BANKED && mask != local {
            fatal(Fatal::InvalidCpuMask(mask.0))
        } else {
            mask
        }
    }

    fn set_trigger(&self, line: usize, trigger: Trigger) {
        // Software interrupts are always edge triggered.
        if line < SOFTWARE_INTERRUPTS as usize {
            return;
        }
        let reg = &self.distributor.icfgr[line / 16];
        let edge: u32 = 1 << ((line % 16) * 2 + 1);
        match trigger {
            Trigger::Edge => reg.set(reg.get() | edge),
            Trigger::Level => reg.set(reg.get() & !edge),
        }
    }

    /// Acknowledge the most urgent pending interrupt of the calling core, run
    /// its handler and signal the end of the interrupt.
    ///
    /// Returns `false` if there was nothing to acknowledge.
    pub fn service_interrupt(&self) -> bool {
        let raw = self.cpu_interface.iar.get();
        let source = InterruptSource::from_raw(raw);
        let id = source.id();
        if id == SPURIOUS_INTERRUPT {
            return false;
        }

        let core = C::running_thread_id();
        let handled = id < NUM_INTERRUPTS
            && self
                .slot(id as usize, core)
                .map(|client| client.handle_interrupt(source))
                .is_some();
        if !handled && CONFIG.debug_unhandled_interrupts {
            debug!("gic: no handler for interrupt {} on core {}", id, core);
        }

        self.cpu_interface.eoir.set(raw);
        true
    }

    /// The most urgent interrupt pending for the calling core, if any.
    pub fn next_pending(&self) -> Option<u32> {
        let id = InterruptSource::from_raw(self.cpu_interface.hppir.get()).id();
        if id == SPURIOUS_INTERRUPT {
            None
        } else {
            Some(id)
        }
    }

    pub fn priority(&self, line: u32) -> u8 {
        self.distributor.ipriorityr[check_line(line)].get() >> PRIORITY_SHIFT
    }

    /// For banked lines the hardware reports the reading core.
    pub fn cpu_targets(&self, line: u32) -> CpuMask {
        CpuMask(self.distributor.itargetsr[check_line(line)].get() & VALID_CPU_MASK)
    }

    pub fn trigger(&self, line: u32) -> Trigger {
        let line = check_line(line);
        if line < SOFTWARE_INTERRUPTS as usize {
            return Trigger::Edge;
        }
        let edge: u32 = 1 << ((line % 16) * 2 + 1);
        if self.distributor.icfgr[line / 16].get() & edge != 0 {
            Trigger::Edge
        } else {
            Trigger::Level
        }
    }

    pub fn is_enabled(&self, line: u32) -> bool {
        let (word, bit) = line_bit(check_line(line));
        self.distributor.isenabler[word].get() & bit != 0
    }

    pub fn is_pending(&self, line: u32) -> bool {
        let (word, bit) = line_bit(check_line(line));
        self.distributor.ispendr[word].get() & bit != 0
    }

    pub fn is_active(&self, line: u32) -> bool {
        let (word, bit) = line_bit(check_line(line));
        self.distributor.isactiver[word].get() & bit != 0
    }

    /// Priority of the interrupt the calling core is currently handling.
    pub fn running_priority(&self) -> u8 {
        (self.cpu_interface.rpr.get() >> PRIORITY_SHIFT) as u8
    }

    /// Number of lines the distributor implements.
    pub fn implemented_lines(&self) -> usize {
        32 * ((self.distributor.typer.get() & 0x1F) as usize + 1)
    }

    /// Whether the calling core has a handler for `line`.
    pub fn has_handler(&self, line: u32) -> bool {
        let line = check_line(line);
        self.slot(line, C::running_thread_id()).is_some()
    }
}

impl<'a, C: ThreadIdProvider + InterruptMask> InterruptDistributor<'a> for Gic<'a, C> {
    fn register_handler(
        &self,
        line: u32,
        priority: u8,
        cpu_mask: CpuMask,
        trigger: Trigger,
        client: &'a dyn InterruptClient,
    ) {
        let line = check_line(line);
        if priority > LOWEST_PRIORITY {
            fatal(Fatal::InvalidPriority(priority));
        }
        let core = C::running_thread_id();
        let targets = Self::resolve_targets(line, cpu_mask, core);
        let (word, bit) = line_bit(line);

        C::atomic(|| {
            let regs = self.distributor;
            regs.icenabler[word].set(bit);
            self.slot(line, core).set(client);
            regs.ipriorityr[line].set(priority << PRIORITY_SHIFT);
            if line >= NUM_BANKED {
                regs.itargetsr[line].set(targets.0);
            }
            self.set_trigger(line, trigger);
            regs.isenabler[word].set(bit);
        });
    }

    fn unregister_handler(&self, line: u32) {
        let line = check_line(line);
        let core = C::running_thread_id();
        let (word, bit) = line_bit(line);

        C::atomic(|| {
            self.distributor.icenabler[word].set(bit);
            self.slot(line, core).clear();
        });
    }

    fn set_priority(&self, line: u32, priority: u8) {
        let line = check_line(line);
        if priority > PRIORITY_DISABLED {
            fatal(Fatal::InvalidPriority(priority));
        }

        C::atomic(|| {
            self.distributor.ipriorityr[line].set(priority << PRIORITY_SHIFT);
        });
    }

    fn software_interrupt(&self, line: u32, cpu_mask: CpuMask) {
        if line >= SOFTWARE_INTERRUPTS {
            fatal(Fatal::NotSoftwareInterrupt(line));
        }
        check_cpu_mask(cpu_mask);

        let targets = if cpu_mask == CpuMask::CURRENT {
            SoftwareInterrupt::TARGET_LIST_FILTER::SelfOnly
        } else {
            SoftwareInterrupt::TARGET_LIST_FILTER::TargetList
                + SoftwareInterrupt::CPU_TARGET_LIST.val(u32::from(cpu_mask.0))
        };
        self.distributor
            .sgir
            .write(SoftwareInterrupt::INTERRUPT_ID.val(line) + targets);
    }
}

#[cfg(test)]
impl GicCpuInterfaceRegisters {
    /// Present `id` as the next interrupt to acknowledge, as the hardware
    /// would.
    pub(crate) fn raise(&self, id: u32) {
        crate::test::poke(&self.iar, id);
        crate::test::poke(&self.hppir, id);
    }

    pub(crate) fn last_end_of_interrupt(&self) -> u32 {
        crate::test::peek(&self.eoir)
    }
}
