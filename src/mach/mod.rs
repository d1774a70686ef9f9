/*!
## Rust Machine Module

This Rust module is the Tiny BASIC virtual machine. Code, stacks, the
program text and the scratch buffers all share one 64K memory and are
told apart only by where they live.

*/

pub type Address = u16;

/// Core size.
pub const CORE_TOP: usize = 65536;
/// Word: front of the BASIC program.
pub const USER_PROG: Address = 32;
/// Word: end of stack/user space.
pub const END_USER: Address = 34;
/// Word: end of the BASIC program.
pub const END_PROG: Address = 36;
/// Word: control stack top.
pub const GO_STK_TOP: Address = 38;
/// Word: current BASIC line number, refreshed for USR.
pub const LINO_CORE: Address = 40;
/// Word: IL program counter, refreshed for USR.
pub const ILPC_CORE: Address = 42;
/// Word: BASIC pointer, refreshed for USR.
pub const BP_CORE: Address = 44;
/// Word: saved pointer, refreshed for USR.
pub const SVPT_CORE: Address = 46;
/// Input line buffer.
pub const IN_LINE: Address = 48;
/// Expression stack ceiling (empty stack). The RND seed lives here and
/// the variables follow it.
pub const EXPN_STK: Address = 128;
/// Output column, for tabs.
pub const TAB_HERE: Address = 191;
pub const WATCH_POINT: Address = 255;
pub const COLD_GO: Address = 256;
pub const WARM_GO: Address = 259;
pub const INCH_SUB: Address = 262;
pub const OUTCH_SUB: Address = 265;
pub const BREAK_SUB: Address = 268;
/// Backspace code used by line input.
pub const BS_CODE: Address = 271;
/// Line cancel code used by line input.
pub const CAN_CODE: Address = 272;
pub const DUMP_SUB: Address = 273;
pub const PEEK_SUB: Address = 276;
pub const PEEK2_SUB: Address = 277;
pub const POKE_SUB: Address = 280;
pub const TR_LOG_SUB: Address = 283;
/// Word: address of the first IL byte.
pub const IL_FRONT: Address = 286;
/// Illegal op, also written after the loaded IL.
pub const BAD_OP: u8 = 15;
/// Activity log capacity. Must be a power of two.
pub const LOG_SIZE: usize = 4096;
/// Instructions per time slice.
pub const TIMESLICE: usize = 10000;

/// Address of a variable's word. Variables are indexed by twice the
/// ASCII code of their (upper case) letter.
pub fn var_address(letter: u8) -> Address {
    Address::from(letter.to_ascii_uppercase()) * 2
}

mod debug;
mod exec;
mod io;
mod memory;
mod opcode;
mod program;
mod runtime;
mod schedule;
mod stack;

#[cfg(test)]
mod tests;

pub use debug::{ActivityLog, LogEntry, Trigger, Watchpoint};
pub use io::{Console, FileInput, FileOutput, InputFile, OutputFile};
pub use memory::Memory;
pub use opcode::Opcode;
pub use program::Program;
pub use runtime::{Config, Runtime};
pub use schedule::{BreakFlag, Status};
pub use stack::{ControlStack, ExprStack};
