// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core bootloader kernel crate.
//!
//! The kernel crate holds the code shared by the architecture crate, the chip
//! crate and the capsules: the Hardware Interface Layer (HIL) definitions for
//! the interrupt distributor and the inter-processor mailbox, the traits a chip
//! provides to the rest of the system, debug output, error types and the
//! compile-time configuration.
//!
//! Nothing here touches hardware directly. Register access lives in the chip
//! crate behind [`utilities::StaticRef`].

#![warn(unreachable_pub)]
#![no_std]

pub mod config;
#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod fatal;
pub mod hil;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
