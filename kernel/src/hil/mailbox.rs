// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for a word FIFO mailbox between two processors.
//!
//! Each side has a send FIFO that the peer reads and a receive FIFO that the
//! peer fills, plus a byte-sized sync register: the value written locally
//! appears on the peer side, and writing it can interrupt the peer.
//!
//! Implementations only expose the raw hardware. Flow control and framing are
//! the job of the transport built on top.

pub trait Mailbox {
    /// Whether the send FIFO cannot take another word.
    fn send_fifo_full(&self) -> bool;

    /// Whether the receive FIFO holds no word.
    fn recv_fifo_empty(&self) -> bool;

    /// Push a word. The send FIFO must not be full.
    fn write_word(&self, word: u32);

    /// Pop a word. The receive FIFO must not be empty.
    fn read_word(&self) -> u32;

    /// The sync value last published by the peer.
    fn peer_sync(&self) -> u8;

    /// Publish `value` to the peer, raising its sync interrupt if `notify`.
    fn publish_sync(&self, value: u8, notify: bool);

    /// Flush the local send FIFO, acknowledge a pending error, enable the
    /// FIFOs and the sync interrupt. Each side flushes only what it sends, so
    /// both sides reset before the link is clean.
    fn reset(&self);

    /// Whether the hardware saw a read from an empty or a write to a full FIFO
    /// since the last reset.
    fn fifo_error(&self) -> bool;
}
