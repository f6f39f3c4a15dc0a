// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for the ARM11 MPCore cores.

#![no_std]

pub mod support;
pub mod thread_id;

/// One core of the ARM11 MPCore cluster.
///
/// Carries the core-level traits (critical sections, core identification)
/// the chip crate is generic over.
pub enum Arm11Core {}
