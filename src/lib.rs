//! # Tiny BASIC
//!
//! Tom Pittman's Tiny BASIC as it ran on 8-bit micros: a virtual machine
//! for the Tiny BASIC intermediate language (IL), with the BASIC program
//! text, two stacks and the input buffer all living in one 64K memory.
//!
//! The machine never blocks. A host drives it in time slices and feeds it
//! input when it asks for some.
//!
//! ```
//! use std::collections::VecDeque;
//! use tinybasic::mach::{Console, Runtime, Status};
//!
//! #[derive(Default)]
//! struct Tty {
//!     input: VecDeque<char>,
//!     output: String,
//! }
//!
//! impl Console for Tty {
//!     fn write_char(&mut self, ch: char) {
//!         self.output.push(ch);
//!     }
//!     fn read_char(&mut self) -> Option<char> {
//!         self.input.pop_front()
//!     }
//! }
//!
//! let mut runtime = Runtime::new(Tty::default());
//! let mut status = runtime.run_timeslice(Status::TimesliceExhausted);
//! assert_eq!(status, Status::NeedLine);
//! runtime.console_mut().input.extend("PRINT 2+3*4\n".chars());
//! while status != Status::NeedLine || !runtime.console().input.is_empty() {
//!     status = runtime.run_timeslice(status);
//! }
//! assert!(runtime.console().output.contains("14\n"));
//! ```

pub mod lang;
pub mod mach;
