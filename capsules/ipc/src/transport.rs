// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Command transport between two processors over a [`Mailbox`].
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let pxi = static_init!(Pxi, Pxi::arm9());
//! let transport = static_init!(
//!     Transport<'static, Pxi>,
//!     Transport::new(pxi, &COMMANDS, Handshake::ARM9)
//! );
//! transport.initialize(&chip.gic(), IRQ_PXI_SYNC);
//!
//! let reply = transport.send_command(CMD_MOUNT_FS, &[device]);
//! ```
//!
//! Protocol
//! --------
//!
//! A command is a header word followed by the payload words, pushed into the
//! peer's FIFO. The sender then publishes its running count of payload words
//! (mod 16) in the sync register and notifies the peer. The receiver derives
//! how many words the sender announced from the difference to its own count
//! of received words, and checks it against the header before it touches the
//! payload. A mismatch means both sides disagree about message boundaries,
//! which stops the system.
//!
//! Sending blocks until the single reply word arrives. Receiving runs from the
//! sync interrupt, which calls the [`CommandDispatcher`] and pushes its result
//! back.
//!
//! At bring-up each side publishes a fixed sentinel and waits for the peer's.
//! Once it saw it, a side takes the sync interrupt and sets the ready bit of
//! its sync byte. The ready bit stays set under every counter published
//! afterwards, so a side that is still waiting accepts a peer that already
//! moved on. Commands may only be sent after the peer is ready.

use core::cell::Cell;
use core::hint::spin_loop;

use kernel::config::CONFIG;
use kernel::debug;
use kernel::fatal::{fatal, Fatal};
use kernel::hil::ipc::{CommandDispatcher, Header, MAX_PAYLOAD_WORDS};
use kernel::hil::irq::{CpuMask, InterruptClient, InterruptDistributor, InterruptSource, Trigger};
use kernel::hil::mailbox::Mailbox;

/// Handshake counters wrap at 16.
const COUNTER_MASK: u8 = 0xF;

/// Sentinels exchanged at bring-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handshake {
    /// Published by this side.
    pub local: u8,
    /// Expected from the peer.
    pub remote: u8,
}

impl Handshake {
    /// Set in the sync byte from the end of the handshake on.
    pub const READY: u8 = 1 << 7;

    pub const ARM9: Handshake = Handshake {
        local: 9,
        remote: 11,
    };
    pub const ARM11: Handshake = Handshake {
        local: 11,
        remote: 9,
    };
}

pub struct Transport<'a, M: Mailbox> {
    mailbox: &'a M,
    dispatcher: &'a dyn CommandDispatcher,
    handshake: Handshake,
    /// Payload words sent, mod 16. Only written by the sending path.
    sent: Cell<u8>,
    /// Payload words received, mod 16. Only written by the interrupt handler.
    received: Cell<u8>,
}

impl<'a, M: Mailbox> Transport<'a, M> {
    pub fn new(
        mailbox: &'a M,
        dispatcher: &'a dyn CommandDispatcher,
        handshake: Handshake,
    ) -> Transport<'a, M> {
        Transport {
            mailbox,
            dispatcher,
            handshake,
            sent: Cell::new(0),
            received: Cell::new(0),
        }
    }

    /// Flush the mailbox, reset the counters and publish the local sentinel.
    pub fn begin_handshake(&self) {
        self.mailbox.reset();
        self.sent.set(0);
        self.received.set(0);
        self.mailbox.publish_sync(self.handshake.local, false);
    }

    /// Wait until the peer published its sentinel or is already ready, then
    /// take the sync interrupt `line` on this core and announce readiness.
    pub fn complete_handshake(&'a self, distributor: &dyn InterruptDistributor<'a>, line: u32) {
        loop {
            let peer = self.mailbox.peer_sync();
            if peer == self.handshake.remote || peer & Handshake::READY != 0 {
                break;
            }
            spin_loop();
        }
        distributor.register_handler(line, 0, CpuMask::CURRENT, Trigger::Edge, self);
        self.mailbox.publish_sync(Handshake::READY, false);
    }

    /// Wait until the peer takes commands.
    pub fn wait_for_peer(&self) {
        while !self.peer_ready() {
            spin_loop();
        }
    }

    pub fn peer_ready(&self) -> bool {
        self.mailbox.peer_sync() & Handshake::READY != 0
    }

    /// The whole handshake.
    pub fn initialize(&'a self, distributor: &dyn InterruptDistributor<'a>, line: u32) {
        self.begin_handshake();
        self.complete_handshake(distributor, line);
        self.wait_for_peer();
    }

    /// Send `opcode` with `payload` and wait for the reply.
    pub fn send_command(&self, opcode: u8, payload: &[u32]) -> u32 {
        self.send_command_with_flags(opcode, 0, payload)
    }

    /// Like [`Transport::send_command`], with opcode specific flags in the low
    /// half of the header.
    pub fn send_command_with_flags(&self, opcode: u8, flags: u16, payload: &[u32]) -> u32 {
        if payload.len() > MAX_PAYLOAD_WORDS {
            fatal(Fatal::PayloadTooLong(payload.len()));
        }
        let words = payload.len() as u8;

        self.push(Header::new(opcode, words).with_flags(flags).raw());
        for &word in payload {
            self.push(word);
        }

        let sent = self.sent.get().wrapping_add(words) & COUNTER_MASK;
        self.sent.set(sent);
        self.mailbox.publish_sync(Handshake::READY | sent, true);

        let reply = self.pop();
        if CONFIG.trace_ipc {
            debug!(
                "ipc: sent {:#04x} with {} words, counter {}, reply {:#x}",
                opcode, words, sent, reply
            );
        }
        reply
    }

    /// Take one word from the receive FIFO if there is one.
    pub fn try_receive_word(&self) -> Option<u32> {
        if self.mailbox.recv_fifo_empty() {
            None
        } else {
            Some(self.mailbox.read_word())
        }
    }

    /// Hand every pending word to `on_notification`, after `decode`. A word
    /// `decode` rejects stops the system. Returns the number of words drained.
    pub fn drain_notifications<T, D, F>(&self, decode: D, mut on_notification: F) -> usize
    where
        D: Fn(u32) -> Option<T>,
        F: FnMut(T),
    {
        let mut drained = 0;
        while let Some(word) = self.try_receive_word() {
            match decode(word) {
                Some(notification) => on_notification(notification),
                None => fatal(Fatal::UnknownNotification(word)),
            }
            drained += 1;
        }
        drained
    }

    pub fn words_sent(&self) -> u8 {
        self.sent.get()
    }

    pub fn words_received(&self) -> u8 {
        self.received.get()
    }

    fn push(&self, word: u32) {
        while self.mailbox.send_fifo_full() {
            spin_loop();
        }
        self.mailbox.write_word(word);
    }

    fn pop(&self) -> u32 {
        while self.mailbox.recv_fifo_empty() {
            spin_loop();
        }
        self.mailbox.read_word()
    }
}

impl<'a, M: Mailbox> InterruptClient for Transport<'a, M> {
    fn handle_interrupt(&self, _source: InterruptSource) {
        if self.mailbox.fifo_error() {
            fatal(Fatal::FifoError);
        }
        let expected = self.mailbox.peer_sync().wrapping_sub(self.received.get()) & COUNTER_MASK;
        if self.mailbox.recv_fifo_empty() {
            // Delivered twice: everything announced was already consumed.
            if expected == 0 {
                return;
            }
            fatal(Fatal::Desynchronized {
                announced: 0,
                expected,
            });
        }

        let header = Header::from_raw(self.mailbox.read_word());
        let announced = header.params();
        if announced != expected {
            fatal(Fatal::Desynchronized {
                announced,
                expected,
            });
        }

        let words = usize::from(announced);
        let mut payload = [0u32; MAX_PAYLOAD_WORDS];
        for word in payload[..words].iter_mut() {
            *word = self.pop();
        }
        self.received
            .set(self.received.get().wrapping_add(announced) & COUNTER_MASK);

        let reply = self
            .dispatcher
            .handle_command(header.opcode(), announced, &payload[..words]);
        if CONFIG.trace_ipc {
            debug!(
                "ipc: received {:#04x} with {} words, counter {}, reply {:#x}",
                header.opcode(),
                announced,
                self.received.get(),
                reply
            );
        }
        self.push(reply);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::string::String;
    use std::vec;
    use std::vec::Vec;

    use kernel::hil::ipc::Header;
    use kernel::hil::irq::{CpuMask, Trigger};
    use kernel::hil::mailbox::Mailbox;

    use crate::dispatch::{decode_reply, CommandHandler, CommandTable};
    use crate::test::{
        connected_pair, connected_pair_with, Registration, Side, SimulatedLink, PXI_SYNC_LINE,
    };
    use crate::transport::{Handshake, Transport};
    use kernel::ErrorCode;

    fn echo_opcode(opcode: u8, payload: &[u32]) -> u32 {
        u32::from(opcode) * 2 + payload.len() as u32
    }

    fn panic_message(err: std::boxed::Box<dyn core::any::Any + Send>) -> String {
        match err.downcast::<String>() {
            Ok(msg) => *msg,
            Err(err) => String::from(*err.downcast::<&'static str>().unwrap()),
        }
    }

    #[test]
    fn handshake_registers_sync_handler() {
        let pair = connected_pair(echo_opcode);

        for side in [Side::Arm9, Side::Arm11] {
            assert_eq!(
                pair.link.distributor(side).registration(PXI_SYNC_LINE),
                Some(Registration {
                    priority: 0,
                    cpu_mask: CpuMask::CURRENT,
                    trigger: Trigger::Edge,
                })
            );
        }
        assert_eq!(pair.link.published(Side::Arm9), Handshake::READY);
        assert_eq!(pair.link.published(Side::Arm11), Handshake::READY);
        assert!(pair.arm9.peer_ready());
        assert!(pair.arm11.peer_ready());
        assert_eq!(pair.arm9.words_sent(), 0);
        assert_eq!(pair.arm11.words_received(), 0);
    }

    #[test]
    fn handshake_waits_for_peer_sentinel() {
        let link = SimulatedLink::leak();
        let end = link.end(Side::Arm9);
        let commands = crate::test::Recorder::leak(echo_opcode);
        let transport: &'static Transport<'static, _> =
            std::boxed::Box::leak(std::boxed::Box::new(Transport::new(
                end,
                commands,
                Handshake::ARM9,
            )));

        end.publish_peer_sync_after(5, Handshake::ARM9.remote);
        end.publish_peer_sync_after(2, Handshake::READY);
        transport.initialize(link.distributor(Side::Arm9), PXI_SYNC_LINE);

        // Five polls for the sentinel, two more until the peer is ready.
        assert_eq!(end.sync_polls(), 7);
        assert_eq!(link.published(Side::Arm9), Handshake::READY);
        assert!(link.distributor(Side::Arm9).registration(PXI_SYNC_LINE).is_some());
    }

    #[test]
    fn handshake_accepts_peer_that_is_already_ready() {
        let link = SimulatedLink::leak();
        let end = link.end(Side::Arm11);
        let commands = crate::test::Recorder::leak(echo_opcode);
        let transport: &'static Transport<'static, _> =
            std::boxed::Box::leak(std::boxed::Box::new(Transport::new(
                end,
                commands,
                Handshake::ARM11,
            )));

        // The peer saw our sentinel and replaced its own before we looked.
        end.publish_peer_sync_after(1, Handshake::READY);
        transport.initialize(link.distributor(Side::Arm11), PXI_SYNC_LINE);

        assert_eq!(end.sync_polls(), 2);
        assert!(transport.peer_ready());
    }

    #[test]
    fn reset_flushes_only_outbound_words() {
        let link = SimulatedLink::leak();
        let commands = crate::test::Recorder::leak(echo_opcode);
        let arm9 = Transport::new(link.end(Side::Arm9), commands, Handshake::ARM9);
        let arm11 = Transport::new(link.end(Side::Arm11), commands, Handshake::ARM11);
        link.end(Side::Arm9).write_word(0x1);
        link.end(Side::Arm11).write_word(0x2);

        arm9.begin_handshake();

        assert_eq!(arm11.try_receive_word(), None);
        assert_eq!(arm9.try_receive_word(), Some(0x2));
    }

    #[test]
    fn back_to_back_commands_pair_with_replies() {
        let pair = connected_pair(echo_opcode);

        for opcode in 0..=255u8 {
            let payload: Vec<u32> = (0..u32::from(opcode % 4)).collect();
            assert_eq!(
                pair.arm9.send_command(opcode, &payload),
                echo_opcode(opcode, &payload)
            );
        }

        let calls = pair.arm11_commands.calls();
        assert_eq!(calls.len(), 256);
        for (i, (opcode, params, payload)) in calls.iter().enumerate() {
            assert_eq!(usize::from(*opcode), i);
            assert_eq!(*params, opcode % 4);
            assert_eq!(payload.len(), usize::from(opcode % 4));
        }
        assert!(pair.arm9_commands.calls().is_empty());
    }

    #[test]
    fn commands_flow_both_ways() {
        let pair = connected_pair(echo_opcode);

        assert_eq!(pair.arm9.send_command(0x10, &[1]), 0x21);
        assert_eq!(pair.arm11.send_command(0x20, &[1, 2]), 0x42);
        assert_eq!(pair.arm9.send_command(0x30, &[]), 0x60);

        assert_eq!(pair.arm9.words_sent(), 1);
        assert_eq!(pair.arm11.words_received(), 1);
        assert_eq!(pair.arm11.words_sent(), 2);
        assert_eq!(pair.arm9.words_received(), 2);
    }

    #[test]
    fn counters_track_words_mod_16() {
        let pair = connected_pair(echo_opcode);
        let mut total = 0usize;

        for words in [3, 5, 15, 0, 7, 1, 14, 15, 2] {
            let payload = vec![0xA5A5_0000; words];
            pair.arm9.send_command(0x01, &payload);
            total += words;

            assert_eq!(usize::from(pair.arm9.words_sent()), total % 16);
            assert_eq!(usize::from(pair.arm11.words_received()), total % 16);
            assert_eq!(
                pair.link.published(Side::Arm9),
                Handshake::READY | (total % 16) as u8
            );
        }
    }

    #[test]
    fn send_waits_for_fifo_space_and_reply() {
        let pair = connected_pair(echo_opcode);
        let end = pair.link.end(Side::Arm9);
        end.stall_send(3);
        pair.link.set_notify_latency(4);

        assert_eq!(pair.arm9.send_command(0x05, &[]), 0x0A);

        // Header only: three full polls, then one that finds space.
        assert_eq!(end.send_polls(), 4);
        // The reply shows up once the delayed notification is delivered.
        assert_eq!(end.recv_polls(), 4);
        assert_eq!(end.written(), vec![Header::new(0x05, 0).raw()]);
        assert_eq!(pair.arm11_commands.calls(), vec![(0x05, 0, vec![])]);
    }

    #[test]
    fn corrupted_word_count_halts_before_dispatch() {
        let pair = connected_pair(echo_opcode);

        pair.arm9.send_command(0x01, &[1, 2, 3]);
        pair.arm9.send_command(0x02, &[1, 2, 3, 4, 5]);
        assert_eq!(pair.arm9.words_sent(), 8);
        assert_eq!(pair.arm11.words_received(), 8);

        // Header claims 4 words, the counter advances by 3.
        let end = pair.link.end(Side::Arm9);
        end.write_word(Header::new(0x03, 4).raw());
        for word in [7, 8, 9, 10] {
            end.write_word(word);
        }
        let result = catch_unwind(AssertUnwindSafe(|| end.publish_sync(8 + 3, true)));

        let msg = panic_message(result.unwrap_err());
        assert_eq!(msg, "fatal: pxi desynchronized: 4 words announced, 3 expected");
        assert_eq!(pair.arm11_commands.calls().len(), 2);
        assert_eq!(pair.arm11.words_received(), 8);
    }

    #[test]
    #[should_panic(expected = "fatal: pxi fifo error")]
    fn fifo_error_is_fatal() {
        let pair = connected_pair(echo_opcode);
        pair.link.end(Side::Arm11).raise_fifo_error();
        pair.arm9.send_command(0x01, &[]);
    }

    #[test]
    #[should_panic(expected = "fatal: command payload of 16 words")]
    fn oversized_payload_is_fatal() {
        let pair = connected_pair(echo_opcode);
        pair.arm9.send_command(0x01, &[0; 16]);
    }

    #[test]
    fn largest_payload_fits() {
        let pair = connected_pair(echo_opcode);
        assert_eq!(pair.arm9.send_command(0x01, &[0; 15]), 2 + 15);
        assert_eq!(pair.arm11.words_received(), 15);
    }

    #[test]
    fn flags_travel_in_header() {
        let pair = connected_pair(echo_opcode);

        pair.arm9.send_command_with_flags(0x10, 0xABCD, &[0x1234]);

        assert_eq!(
            pair.link.end(Side::Arm9).written(),
            vec![0x1001_ABCD, 0x1234]
        );
    }

    #[test]
    fn sync_interrupt_without_data_is_ignored() {
        let pair = connected_pair(echo_opcode);

        pair.link.distributor(Side::Arm11).fire(PXI_SYNC_LINE);

        assert!(pair.arm11_commands.calls().is_empty());
        assert_eq!(pair.arm11.words_received(), 0);
        assert!(pair.link.end(Side::Arm9).written().is_empty());
    }

    #[test]
    #[should_panic(expected = "fatal: pxi desynchronized: 0 words announced, 3 expected")]
    fn sync_interrupt_with_lost_words_is_fatal() {
        let pair = connected_pair(echo_opcode);

        // The counter moves by three but no word reaches the FIFO.
        pair.link.end(Side::Arm9).publish_sync(3, true);
    }

    #[test]
    fn repeated_sync_interrupt_after_command_is_ignored() {
        let pair = connected_pair(echo_opcode);
        pair.arm9.send_command(0x01, &[1, 2]);

        pair.link.distributor(Side::Arm11).fire(PXI_SYNC_LINE);

        assert_eq!(pair.arm11_commands.calls().len(), 1);
        assert_eq!(pair.arm11.words_received(), 2);
    }

    #[derive(Debug, PartialEq)]
    enum Button {
        HomePressed,
        PowerPressed,
    }

    fn decode_button(word: u32) -> Option<Button> {
        match word {
            0x1 => Some(Button::HomePressed),
            0x2 => Some(Button::PowerPressed),
            _ => None,
        }
    }

    #[test]
    fn notifications_are_drained() {
        let pair = connected_pair(echo_opcode);
        assert_eq!(pair.arm9.try_receive_word(), None);

        let from_arm11 = pair.link.end(Side::Arm11);
        from_arm11.write_word(0x2);
        from_arm11.write_word(0x1);

        let mut seen = Vec::new();
        let drained = pair.arm9.drain_notifications(decode_button, |b| seen.push(b));

        assert_eq!(drained, 2);
        assert_eq!(seen, vec![Button::PowerPressed, Button::HomePressed]);
        assert_eq!(pair.arm9.try_receive_word(), None);
    }

    #[test]
    #[should_panic(expected = "fatal: unknown notification 0x000000ff")]
    fn unknown_notification_is_fatal() {
        let pair = connected_pair(echo_opcode);
        pair.link.end(Side::Arm11).write_word(0xFF);
        pair.arm9.drain_notifications(decode_button, |_| ());
    }

    fn mount(params: u8, payload: &[u32]) -> Result<u32, ErrorCode> {
        match payload {
            [device] if params == 1 && *device < 2 => Ok(*device),
            _ => Err(ErrorCode::INVAL),
        }
    }

    #[test]
    fn command_table_behind_transport() {
        static TABLE: CommandTable<1> = CommandTable::new([(0x07, mount as CommandHandler)]);
        let pair = connected_pair_with(&TABLE);

        assert_eq!(decode_reply(pair.arm9.send_command(0x07, &[1])), Ok(1));
        assert_eq!(
            decode_reply(pair.arm9.send_command(0x07, &[5])),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(
            decode_reply(pair.arm9.send_command(0x08, &[])),
            Err(ErrorCode::NOSUPPORT)
        );
    }
}
