// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options.
//!
//! Cargo features alone are error-prone for configuration: they are enabled
//! globally as soon as one dependency edge asks for them, and code gated by a
//! disabled feature is not even type-checked. With a typed `const`
//! configuration every code path is type-checked and the compiler folds the
//! disabled branches away, so an `if CONFIG.trace_ipc { .. }` costs nothing
//! when tracing is off.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the matching Cargo feature of the
/// kernel crate in the crate that links the final image.
pub struct Config {
    /// Whether the inter-processor transport should trace every command it
    /// sends and receives to the debug output.
    ///
    /// If enabled, the transport prints the opcode, announced word count and
    /// the handshake counters for each message, and the reply word.
    pub trace_ipc: bool,

    /// Whether the interrupt distributor should report interrupts that arrive
    /// on a line without a registered handler.
    pub debug_unhandled_interrupts: bool,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined. This is the only location where `#[cfg(x)]` is used to configure
/// code based on Cargo features.
pub const CONFIG: Config = Config {
    trace_ipc: cfg!(feature = "trace_ipc"),
    debug_unhandled_interrupts: !cfg!(feature = "no_debug_unhandled_interrupts"),
};
