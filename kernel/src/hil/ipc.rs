// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Command messages exchanged between the two processors.
//!
//! A message is one header word followed by up to [`MAX_PAYLOAD_WORDS`] payload
//! words. The header carries the opcode in bits 24-31, the number of payload
//! words in bits 16-23 and opcode specific flags in bits 0-15. The answer is
//! always a single word.

/// Depth of the hardware FIFO minus the header word.
pub const MAX_PAYLOAD_WORDS: usize = 15;

/// Executes commands received from the peer processor.
pub trait CommandDispatcher {
    /// Run `opcode` and return the reply word.
    ///
    /// Called from interrupt context. Must return promptly and must not use
    /// the transport that called it. Failures are encoded in the reply.
    fn handle_command(&self, opcode: u8, params: u8, payload: &[u32]) -> u32;
}

/// Header word of a command message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header(u32);

impl Header {
    pub const fn new(opcode: u8, words: u8) -> Header {
        Header(((opcode as u32) << 24) | ((words as u32) << 16))
    }

    pub const fn with_flags(self, flags: u16) -> Header {
        Header((self.0 & 0xFFFF_0000) | flags as u32)
    }

    pub const fn from_raw(raw: u32) -> Header {
        Header(raw)
    }

    pub const fn opcode(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The parameter byte, which holds the payload word count.
    pub const fn params(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn flags(&self) -> u16 {
        self.0 as u16
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Header;

    #[test]
    fn header_layout() {
        let header = Header::new(0x05, 3).with_flags(0xBEEF);
        assert_eq!(header.raw(), 0x0503_BEEF);
        assert_eq!(header.opcode(), 0x05);
        assert_eq!(header.params(), 3);
        assert_eq!(header.flags(), 0xBEEF);
        assert_eq!(Header::from_raw(0xFF00_0001).params(), 0);
    }
}
