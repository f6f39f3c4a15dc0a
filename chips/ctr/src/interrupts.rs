// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Named interrupts of the ARM11 MPCore on CTR.

pub const IRQ_MPCORE_SW0: u32 = 0;
pub const IRQ_MPCORE_SW1: u32 = 1;
pub const IRQ_MPCORE_SW2: u32 = 2;
pub const IRQ_MPCORE_SW3: u32 = 3;
pub const IRQ_MPCORE_SW4: u32 = 4;
pub const IRQ_MPCORE_SW5: u32 = 5;
pub const IRQ_MPCORE_SW6: u32 = 6;
pub const IRQ_MPCORE_SW7: u32 = 7;
pub const IRQ_MPCORE_SW8: u32 = 8;
pub const IRQ_MPCORE_SW9: u32 = 9;
pub const IRQ_MPCORE_SW10: u32 = 10;
pub const IRQ_MPCORE_SW11: u32 = 11;
pub const IRQ_MPCORE_SW12: u32 = 12;
pub const IRQ_MPCORE_SW13: u32 = 13;
pub const IRQ_MPCORE_SW14: u32 = 14;
pub const IRQ_MPCORE_SW15: u32 = 15;
/// MPCore private timer
pub const IRQ_TIMER: u32 = 29;
/// MPCore private watchdog
pub const IRQ_WATCHDOG: u32 = 30;
pub const IRQ_PSC0: u32 = 40;
pub const IRQ_PSC1: u32 = 41;
/// VBlank of the top screen
pub const IRQ_PDC0: u32 = 42;
/// VBlank of the bottom screen
pub const IRQ_PDC1: u32 = 43;
pub const IRQ_PPF: u32 = 44;
pub const IRQ_P3D: u32 = 45;
pub const IRQ_PXI_SYNC: u32 = 80;
pub const IRQ_PXI_UNK: u32 = 81;
pub const IRQ_PXI_NOT_FULL: u32 = 82;
pub const IRQ_PXI_NOT_EMPTY: u32 = 83;
pub const IRQ_SHELL_OPENED: u32 = 96;
pub const IRQ_SHELL_CLOSED: u32 = 98;
pub const IRQ_TOUCHSCREEN: u32 = 99;
pub const IRQ_HEADPH_JACK: u32 = 100;
/// HOME/POWER buttons, shell and WiFi switch
pub const IRQ_MCU_HID: u32 = 113;
pub const IRQ_GAMECARD: u32 = 117;
