// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! A simulated mailbox link between two processors, for running both ends of
//! the transport in one host test.
//!
//! Each [`LinkEnd`] is the mailbox of one side. Notifying the peer fires the
//! sync line of the peer's [`TestDistributor`], synchronously or after a
//! number of receive polls. Send FIFO stalls can be scripted per end and every
//! poll is counted.

extern crate std;

use core::cell::{Cell, RefCell};
use std::boxed::Box;
use std::collections::VecDeque;
use std::vec::Vec;

use kernel::hil::ipc::CommandDispatcher;
use kernel::hil::irq::{
    CpuMask, InterruptClient, InterruptDistributor, InterruptSource, Trigger, NUM_INTERRUPTS,
};
use kernel::hil::mailbox::Mailbox;
use kernel::utilities::cells::OptionalCell;

use crate::transport::{Handshake, Transport};

/// Sync line used by both simulated processors.
pub(crate) const PXI_SYNC_LINE: u32 = 80;

const FIFO_DEPTH: usize = 16;
const LINES: usize = NUM_INTERRUPTS as usize;

fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Arm9,
    Arm11,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Arm9 => 0,
            Side::Arm11 => 1,
        }
    }

    fn peer(self) -> Side {
        match self {
            Side::Arm9 => Side::Arm11,
            Side::Arm11 => Side::Arm9,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Registration {
    pub(crate) priority: u8,
    pub(crate) cpu_mask: CpuMask,
    pub(crate) trigger: Trigger,
}

/// Records registrations and delivers fired lines to their client.
pub(crate) struct TestDistributor {
    clients: [OptionalCell<&'static dyn InterruptClient>; LINES],
    registrations: [Cell<Option<Registration>>; LINES],
}

impl TestDistributor {
    fn new() -> Self {
        TestDistributor {
            clients: [const { OptionalCell::empty() }; LINES],
            registrations: [const { Cell::new(None) }; LINES],
        }
    }

    pub(crate) fn registration(&self, line: u32) -> Option<Registration> {
        self.registrations[line as usize].get()
    }

    pub(crate) fn fire(&self, line: u32) {
        self.clients[line as usize]
            .map(|client| client.handle_interrupt(InterruptSource::new(line, 0)));
    }
}

impl InterruptDistributor<'static> for TestDistributor {
    fn register_handler(
        &self,
        line: u32,
        priority: u8,
        cpu_mask: CpuMask,
        trigger: Trigger,
        client: &'static dyn InterruptClient,
    ) {
        self.clients[line as usize].set(client);
        self.registrations[line as usize].set(Some(Registration {
            priority,
            cpu_mask,
            trigger,
        }));
    }

    fn unregister_handler(&self, line: u32) {
        self.clients[line as usize].clear();
        self.registrations[line as usize].set(None);
    }

    fn set_priority(&self, line: u32, priority: u8) {
        let slot = &self.registrations[line as usize];
        slot.set(slot.get().map(|r| Registration { priority, ..r }));
    }

    // Peers are notified through the mailbox, never by software interrupt.
    fn software_interrupt(&self, line: u32, _cpu_mask: CpuMask) {
        panic!("unexpected software interrupt {}", line);
    }
}

pub(crate) struct SimulatedLink {
    /// Words in flight towards each side.
    fifos: [RefCell<VecDeque<u32>>; 2],
    /// Sync byte published by each side.
    sync: [Cell<u8>; 2],
    fifo_error: [Cell<bool>; 2],
    distributors: [TestDistributor; 2],
    ends: [OptionalCell<&'static LinkEnd>; 2],
    notify_latency: Cell<usize>,
    /// Receive polls left before a notification reaches each side.
    pending: [Cell<Option<usize>>; 2],
}

impl SimulatedLink {
    pub(crate) fn leak() -> &'static SimulatedLink {
        let link = leak(SimulatedLink {
            fifos: [
                RefCell::new(VecDeque::new()),
                RefCell::new(VecDeque::new()),
            ],
            sync: [Cell::new(0), Cell::new(0)],
            fifo_error: [Cell::new(false), Cell::new(false)],
            distributors: [TestDistributor::new(), TestDistributor::new()],
            ends: [OptionalCell::empty(), OptionalCell::empty()],
            notify_latency: Cell::new(0),
            pending: [Cell::new(None), Cell::new(None)],
        });
        for side in [Side::Arm9, Side::Arm11] {
            link.ends[side.index()].set(leak(LinkEnd::new(link, side)));
        }
        link
    }

    pub(crate) fn end(&self, side: Side) -> &'static LinkEnd {
        self.ends[side.index()].expect("link end")
    }

    pub(crate) fn distributor(&self, side: Side) -> &TestDistributor {
        &self.distributors[side.index()]
    }

    /// The sync byte `side` last published.
    pub(crate) fn published(&self, side: Side) -> u8 {
        self.sync[side.index()].get()
    }

    /// Deliver later notifications only after this many receive polls.
    pub(crate) fn set_notify_latency(&self, polls: usize) {
        self.notify_latency.set(polls);
    }

    fn notify(&self, to: Side) {
        match self.notify_latency.get() {
            0 => self.distributor(to).fire(PXI_SYNC_LINE),
            polls => self.pending[to.index()].set(Some(polls)),
        }
    }

    fn tick(&self) {
        for side in [Side::Arm9, Side::Arm11] {
            let pending = &self.pending[side.index()];
            match pending.get() {
                Some(left) if left <= 1 => {
                    pending.set(None);
                    self.distributor(side).fire(PXI_SYNC_LINE);
                }
                Some(left) => pending.set(Some(left - 1)),
                None => {}
            }
        }
    }
}

pub(crate) struct LinkEnd {
    link: &'static SimulatedLink,
    side: Side,
    send_stalls: Cell<usize>,
    send_polls: Cell<usize>,
    recv_polls: Cell<usize>,
    sync_polls: Cell<usize>,
    /// Values the peer publishes, each after a number of polls counted from
    /// the previous one.
    peer_script: RefCell<VecDeque<(usize, u8)>>,
    written: RefCell<Vec<u32>>,
}

impl LinkEnd {
    fn new(link: &'static SimulatedLink, side: Side) -> Self {
        LinkEnd {
            link,
            side,
            send_stalls: Cell::new(0),
            send_polls: Cell::new(0),
            recv_polls: Cell::new(0),
            sync_polls: Cell::new(0),
            peer_script: RefCell::new(VecDeque::new()),
            written: RefCell::new(Vec::new()),
        }
    }

    /// Report the send FIFO full for the next `polls` polls.
    pub(crate) fn stall_send(&self, polls: usize) {
        self.send_stalls.set(polls);
    }

    /// Let the peer publish `value` on the `polls`-th sync read after the
    /// previously scripted value.
    pub(crate) fn publish_peer_sync_after(&self, polls: usize, value: u8) {
        self.peer_script.borrow_mut().push_back((polls, value));
    }

    pub(crate) fn raise_fifo_error(&self) {
        self.link.fifo_error[self.side.index()].set(true);
    }

    pub(crate) fn send_polls(&self) -> usize {
        self.send_polls.get()
    }

    pub(crate) fn recv_polls(&self) -> usize {
        self.recv_polls.get()
    }

    pub(crate) fn sync_polls(&self) -> usize {
        self.sync_polls.get()
    }

    /// Every word pushed by this end since the last reset.
    pub(crate) fn written(&self) -> Vec<u32> {
        self.written.borrow().clone()
    }

    fn outbound(&self) -> &RefCell<VecDeque<u32>> {
        &self.link.fifos[self.side.peer().index()]
    }

    fn inbound(&self) -> &RefCell<VecDeque<u32>> {
        &self.link.fifos[self.side.index()]
    }
}

fn take_stall(stalls: &Cell<usize>) -> bool {
    match stalls.get() {
        0 => false,
        left => {
            stalls.set(left - 1);
            true
        }
    }
}

impl Mailbox for LinkEnd {
    fn send_fifo_full(&self) -> bool {
        self.send_polls.set(self.send_polls.get() + 1);
        take_stall(&self.send_stalls) || self.outbound().borrow().len() >= FIFO_DEPTH
    }

    fn recv_fifo_empty(&self) -> bool {
        self.recv_polls.set(self.recv_polls.get() + 1);
        self.link.tick();
        self.inbound().borrow().is_empty()
    }

    fn write_word(&self, word: u32) {
        let mut fifo = self.outbound().borrow_mut();
        assert!(fifo.len() < FIFO_DEPTH, "write to full fifo");
        fifo.push_back(word);
        self.written.borrow_mut().push(word);
    }

    fn read_word(&self) -> u32 {
        self.inbound()
            .borrow_mut()
            .pop_front()
            .expect("read from empty fifo")
    }

    fn peer_sync(&self) -> u8 {
        self.sync_polls.set(self.sync_polls.get() + 1);
        let peer = &self.link.sync[self.side.peer().index()];
        let mut script = self.peer_script.borrow_mut();
        match script.front_mut() {
            Some((left, value)) if *left <= 1 => {
                peer.set(*value);
                script.pop_front();
            }
            Some((left, _)) => *left -= 1,
            None => {}
        }
        peer.get()
    }

    fn publish_sync(&self, value: u8, notify: bool) {
        self.link.sync[self.side.index()].set(value);
        if notify {
            self.link.notify(self.side.peer());
        }
    }

    fn reset(&self) {
        self.outbound().borrow_mut().clear();
        self.written.borrow_mut().clear();
        self.link.fifo_error[self.side.index()].set(false);
        self.link.sync[self.side.index()].set(0);
    }

    fn fifo_error(&self) -> bool {
        self.link.fifo_error[self.side.index()].get()
    }
}

/// Records every command and answers with `reply`.
pub(crate) struct Recorder {
    calls: RefCell<Vec<(u8, u8, Vec<u32>)>>,
    reply: fn(u8, &[u32]) -> u32,
}

impl Recorder {
    pub(crate) fn leak(reply: fn(u8, &[u32]) -> u32) -> &'static Recorder {
        leak(Recorder {
            calls: RefCell::new(Vec::new()),
            reply,
        })
    }

    pub(crate) fn calls(&self) -> Vec<(u8, u8, Vec<u32>)> {
        self.calls.borrow().clone()
    }
}

impl CommandDispatcher for Recorder {
    fn handle_command(&self, opcode: u8, params: u8, payload: &[u32]) -> u32 {
        self.calls
            .borrow_mut()
            .push((opcode, params, payload.to_vec()));
        (self.reply)(opcode, payload)
    }
}

/// Two transports that completed the handshake over one link.
pub(crate) struct Pair {
    pub(crate) link: &'static SimulatedLink,
    pub(crate) arm9: &'static Transport<'static, LinkEnd>,
    pub(crate) arm11: &'static Transport<'static, LinkEnd>,
    pub(crate) arm9_commands: &'static Recorder,
    pub(crate) arm11_commands: &'static Recorder,
}

/// Both sides answer with `reply`.
pub(crate) fn connected_pair(reply: fn(u8, &[u32]) -> u32) -> Pair {
    let arm11_commands = Recorder::leak(reply);
    connect(reply, arm11_commands, arm11_commands)
}

/// The ARM11 side runs `dispatcher`; `arm11_commands` stays empty.
pub(crate) fn connected_pair_with(dispatcher: &'static dyn CommandDispatcher) -> Pair {
    connect(|_, _| 0, dispatcher, Recorder::leak(|_, _| 0))
}

fn connect(
    arm9_reply: fn(u8, &[u32]) -> u32,
    arm11_dispatcher: &'static dyn CommandDispatcher,
    arm11_commands: &'static Recorder,
) -> Pair {
    let link = SimulatedLink::leak();
    let arm9_commands = Recorder::leak(arm9_reply);
    let arm9 = leak(Transport::new(
        link.end(Side::Arm9),
        arm9_commands,
        Handshake::ARM9,
    ));
    let arm11 = leak(Transport::new(
        link.end(Side::Arm11),
        arm11_dispatcher,
        Handshake::ARM11,
    ));

    arm9.begin_handshake();
    arm11.begin_handshake();
    arm9.complete_handshake(link.distributor(Side::Arm9), PXI_SYNC_LINE);
    arm11.complete_handshake(link.distributor(Side::Arm11), PXI_SYNC_LINE);
    arm9.wait_for_peer();
    arm11.wait_for_peer();

    Pair {
        link,
        arm9,
        arm11,
        arm9_commands,
        arm11_commands,
    }
}
