//! # Tiny BASIC
//!
//! Runs a Tiny BASIC session on the terminal. See `tinybasic --help`.

mod term;

fn main() {
    term::main()
}
