// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! ARM11 MPCore support for getting the running thread ID.

use kernel::platform::chip::ThreadIdProvider;

use crate::Arm11Core;

// # Safety
//
// By implementing [`ThreadIdProvider`] we are guaranteeing that we correctly
// return the thread ID. Each core is one thread, identified by the CPU ID
// field of its MPIDR, which is always below `support::NUM_CORES`.
unsafe impl ThreadIdProvider for Arm11Core {
    fn running_thread_id() -> usize {
        crate::support::cpu_id()
    }
}
