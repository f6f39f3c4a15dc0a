// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Unrecoverable faults.
//!
//! Misuse of the interrupt distributor and loss of synchronization with the
//! peer processor cannot be handled by the caller: continuing would either
//! corrupt distributor state or dispatch garbage as commands. These conditions
//! stop the system through [`fatal`], which ends in the board's panic handler.

use core::fmt;

/// Reason the system was stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fatal {
    /// Interrupt line outside the distributor's supported range.
    InvalidInterrupt(u32),
    /// Priority above the lowest supported level.
    InvalidPriority(u8),
    /// CPU target mask naming a core that does not exist.
    InvalidCpuMask(u8),
    /// Software interrupt requested on a line that is not a software line.
    NotSoftwareInterrupt(u32),
    /// Command payload longer than the send FIFO can hold with its header.
    PayloadTooLong(usize),
    /// The word count announced by the peer differs from the count derived
    /// from the handshake counters.
    Desynchronized { announced: u8, expected: u8 },
    /// The mailbox reported a FIFO overrun or underrun.
    FifoError,
    /// A notification word with no known meaning was received.
    UnknownNotification(u32),
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Fatal::InvalidInterrupt(id) => write!(f, "invalid interrupt {}", id),
            Fatal::InvalidPriority(prio) => write!(f, "invalid interrupt priority {}", prio),
            Fatal::InvalidCpuMask(mask) => write!(f, "invalid cpu mask {:#x}", mask),
            Fatal::NotSoftwareInterrupt(id) => {
                write!(f, "interrupt {} is not a software interrupt", id)
            }
            Fatal::PayloadTooLong(words) => write!(f, "command payload of {} words", words),
            Fatal::Desynchronized {
                announced,
                expected,
            } => write!(
                f,
                "pxi desynchronized: {} words announced, {} expected",
                announced, expected
            ),
            Fatal::FifoError => write!(f, "pxi fifo error"),
            Fatal::UnknownNotification(word) => write!(f, "unknown notification {:#010x}", word),
        }
    }
}

/// Stop the system.
#[inline(never)]
#[track_caller]
pub fn fatal(reason: Fatal) -> ! {
    panic!("fatal: {}", reason)
}
