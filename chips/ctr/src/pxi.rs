// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PXI, the word FIFO mailbox between the ARM9 and the ARM11.
//!
//! Both processors see the same block at a different address. Each direction
//! has a 16 word FIFO. The sync register carries one byte each way: what the
//! local side writes to `SEND` shows up in the peer's `RECV`.

use kernel::hil::mailbox::Mailbox;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, ReadOnly, ReadWrite, WriteOnly,
};
use kernel::utilities::StaticRef;

register_structs! {
    pub PxiRegisters {
        (0x00 => sync: ReadWrite<u32, PxiSync::Register>),
        (0x04 => cnt: ReadWrite<u16, PxiControl::Register>),
        (0x06 => _reserved0),
        (0x08 => send: WriteOnly<u32>),
        (0x0C => recv: ReadOnly<u32>),
        (0x10 => @END),
    }
}

register_bitfields![u32,
    PxiSync [
        /// Byte last published by the peer
        RECV OFFSET(0) NUMBITS(8) [],
        /// Byte published to the peer
        SEND OFFSET(8) NUMBITS(8) [],
        NOTIFY_ARM11 OFFSET(29) NUMBITS(1) [],
        NOTIFY_ARM9 OFFSET(30) NUMBITS(1) [],
        /// Interrupt when the peer notifies
        IRQ_ENABLE OFFSET(31) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    PxiControl [
        SEND_EMPTY OFFSET(0) NUMBITS(1) [],
        SEND_FULL OFFSET(1) NUMBITS(1) [],
        SEND_EMPTY_IRQ OFFSET(2) NUMBITS(1) [],
        FLUSH_SEND OFFSET(3) NUMBITS(1) [],
        RECV_EMPTY OFFSET(8) NUMBITS(1) [],
        RECV_FULL OFFSET(9) NUMBITS(1) [],
        RECV_NOT_EMPTY_IRQ OFFSET(10) NUMBITS(1) [],
        /// Read from empty or write to full FIFO. Write 1 to acknowledge.
        ERROR OFFSET(14) NUMBITS(1) [],
        ENABLE OFFSET(15) NUMBITS(1) []
    ]
];

pub const PXI_ARM9_BASE: StaticRef<PxiRegisters> =
    unsafe { StaticRef::new(0x1000_8000 as *const PxiRegisters) };

pub const PXI_ARM11_BASE: StaticRef<PxiRegisters> =
    unsafe { StaticRef::new(0x1016_3000 as *const PxiRegisters) };

/// Words each FIFO holds.
pub const FIFO_DEPTH: usize = 16;

/// The processor a [`Pxi`] instance runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Processor {
    Arm9,
    Arm11,
}

pub struct Pxi {
    registers: StaticRef<PxiRegisters>,
    local: Processor,
}

impl Pxi {
    pub const fn new(registers: StaticRef<PxiRegisters>, local: Processor) -> Pxi {
        Pxi { registers, local }
    }

    /// The PXI block as the ARM11 sees it.
    pub const fn arm11() -> Pxi {
        Pxi::new(PXI_ARM11_BASE, Processor::Arm11)
    }

    /// The PXI block as the ARM9 sees it.
    pub const fn arm9() -> Pxi {
        Pxi::new(PXI_ARM9_BASE, Processor::Arm9)
    }

    pub fn local(&self) -> Processor {
        self.local
    }

    pub fn send_fifo_empty(&self) -> bool {
        self.registers.cnt.is_set(PxiControl::SEND_EMPTY)
    }

    pub fn recv_fifo_full(&self) -> bool {
        self.registers.cnt.is_set(PxiControl::RECV_FULL)
    }
}

impl Mailbox for Pxi {
    fn send_fifo_full(&self) -> bool {
        self.registers.cnt.is_set(PxiControl::SEND_FULL)
    }

    fn recv_fifo_empty(&self) -> bool {
        self.registers.cnt.is_set(PxiControl::RECV_EMPTY)
    }

    fn write_word(&self, word: u32) {
        self.registers.send.set(word);
    }

    fn read_word(&self) -> u32 {
        self.registers.recv.get()
    }

    fn peer_sync(&self) -> u8 {
        self.registers.sync.read(PxiSync::RECV) as u8
    }

    fn publish_sync(&self, value: u8, notify: bool) {
        let send = PxiSync::SEND.val(u32::from(value));
        let notify = match (self.local, notify) {
            (_, false) => PxiSync::NOTIFY_ARM11::CLEAR + PxiSync::NOTIFY_ARM9::CLEAR,
            (Processor::Arm9, true) => PxiSync::NOTIFY_ARM11::SET,
            (Processor::Arm11, true) => PxiSync::NOTIFY_ARM9::SET,
        };
        self.registers.sync.modify(send + notify);
    }

    fn reset(&self) {
        self.registers.sync.write(PxiSync::IRQ_ENABLE::SET);
        self.registers
            .cnt
            .write(PxiControl::FLUSH_SEND::SET + PxiControl::ERROR::SET + PxiControl::ENABLE::SET);
    }

    fn fifo_error(&self) -> bool {
        self.registers.cnt.is_set(PxiControl::ERROR)
    }
}
