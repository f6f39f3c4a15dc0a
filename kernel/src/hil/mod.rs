// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Public traits for interfaces between the chip crate, capsules and boards.

pub mod ipc;
pub mod irq;
pub mod mailbox;
