// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Chip support for the CTR SoC: the ARM11 MPCore interrupt distributor and
//! the PXI mailbox shared with the ARM9.

#![no_std]

pub mod chip;
pub mod gic;
pub mod interrupts;
pub mod pxi;
