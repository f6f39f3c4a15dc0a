// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Inter-processor command transport over a word FIFO mailbox, and the glue
//! for dispatching the received commands.

#![forbid(unsafe_code)]
#![no_std]

pub mod dispatch;
pub mod transport;

#[cfg(test)]
mod test;
