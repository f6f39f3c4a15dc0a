// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Table based [`CommandDispatcher`].
//!
//! Command handlers return `Result<u32, ErrorCode>`. The table folds the
//! result into the single reply word: bit 31 marks an error and the low bits
//! then hold the [`ErrorCode`]. Initiators unfold it with [`decode_reply`].
//!
//! ```ignore
//! static COMMANDS: CommandTable<2> = CommandTable::new([
//!     (CMD_POWER_OFF, power_off),
//!     (CMD_LOAD_FIRM, load_firm),
//! ]);
//! ```

use kernel::debug;
use kernel::hil::ipc::CommandDispatcher;
use kernel::ErrorCode;

/// Runs one command. Gets the parameter byte of the header and the payload.
pub type CommandHandler = fn(u8, &[u32]) -> Result<u32, ErrorCode>;

/// Set in a reply word when the command failed.
pub const REPLY_ERROR_FLAG: u32 = 1 << 31;

/// Fold a handler result into a reply word. Successful values must leave the
/// error flag clear, otherwise they are reported as `SIZE`.
pub fn encode_reply(result: Result<u32, ErrorCode>) -> u32 {
    match result {
        Ok(value) if value & REPLY_ERROR_FLAG == 0 => value,
        Ok(_) => REPLY_ERROR_FLAG | usize::from(ErrorCode::SIZE) as u32,
        Err(error) => REPLY_ERROR_FLAG | usize::from(error) as u32,
    }
}

/// Unfold a reply word produced by [`encode_reply`].
pub fn decode_reply(reply: u32) -> Result<u32, ErrorCode> {
    if reply & REPLY_ERROR_FLAG == 0 {
        Ok(reply)
    } else {
        Err(ErrorCode::try_from((reply & !REPLY_ERROR_FLAG) as usize).unwrap_or(ErrorCode::FAIL))
    }
}

/// Fixed mapping from opcode to handler.
pub struct CommandTable<const N: usize> {
    commands: [(u8, CommandHandler); N],
}

impl<const N: usize> CommandTable<N> {
    pub const fn new(commands: [(u8, CommandHandler); N]) -> Self {
        CommandTable { commands }
    }

    pub fn handler(&self, opcode: u8) -> Option<CommandHandler> {
        self.commands
            .iter()
            .find(|(code, _)| *code == opcode)
            .map(|(_, handler)| *handler)
    }
}

impl<const N: usize> CommandDispatcher for CommandTable<N> {
    fn handle_command(&self, opcode: u8, params: u8, payload: &[u32]) -> u32 {
        let result = match self.handler(opcode) {
            Some(handler) => handler(params, payload),
            None => {
                debug!("ipc: unknown command {:#04x}", opcode);
                Err(ErrorCode::NOSUPPORT)
            }
        };
        encode_reply(result)
    }
}
