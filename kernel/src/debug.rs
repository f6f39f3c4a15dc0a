// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Support for in-kernel debugging.
//!
//! For printing, this module provides the `debug!` macro, which prefixes the
//! message with the file and line it was issued from:
//!
//! ```ignore
//! debug!("gic: no handler for interrupt {}", id);
//! ```
//!
//! Output is written synchronously to the writer the board installs with
//! [`set_debug_writer`], typically a polled UART or the bottom-screen console.
//! There is no buffering: the bootloader has no deferred work to flush it from,
//! and messages must survive a following fatal stop. Until a writer is
//! installed, messages are dropped and counted.

use core::fmt::{write, Arguments, Result, Write};
use core::ptr::{addr_of, addr_of_mut};
use core::sync::atomic::{AtomicUsize, Ordering};

/// Implementation of `std::io::Write` for `no_std`.
///
/// This takes bytes instead of a string (contrary to [`core::fmt::Write`]), but
/// we cannot use `std::io::Write` as it isn't available in `no_std`.
pub trait IoWrite {
    /// Write `buf` in full, returning the number of bytes written.
    fn write(&mut self, buf: &[u8]) -> usize;
}

struct DebugWriter {
    output: Option<&'static mut dyn IoWrite>,
}

impl Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> Result {
        if let Some(output) = self.output.as_mut() {
            output.write(s.as_bytes());
        }
        Ok(())
    }
}

static mut DEBUG_WRITER: DebugWriter = DebugWriter { output: None };

static DROPPED_MESSAGES: AtomicUsize = AtomicUsize::new(0);

/// Install the sink every `debug!` message is written to.
///
/// # Safety
///
/// Must be called during single-core bring-up, before interrupts are enabled
/// and before any other code can issue `debug!`.
pub unsafe fn set_debug_writer(writer: &'static mut dyn IoWrite) {
    (*addr_of_mut!(DEBUG_WRITER)).output = Some(writer);
}

/// Number of messages dropped because no writer was installed yet.
pub fn dropped_messages() -> usize {
    DROPPED_MESSAGES.load(Ordering::Relaxed)
}

/// Backend of the `debug!` macro.
pub fn debug_fmt(args: Arguments, file_line: &(&'static str, u32)) {
    // Safety: the writer is only replaced during bring-up, see
    // `set_debug_writer`.
    if unsafe { (*addr_of!(DEBUG_WRITER)).output.is_none() } {
        DROPPED_MESSAGES.fetch_add(1, Ordering::Relaxed);
        return;
    }
    let writer = unsafe { &mut *addr_of_mut!(DEBUG_WRITER) };
    let (file, line) = *file_line;
    let _ = writer.write_fmt(format_args!("{}:{}: ", file, line));
    let _ = write(writer, args);
    let _ = writer.write_str("\r\n");
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_fmt(format_args!("{}", $msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_fmt(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}
