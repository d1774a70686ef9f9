use super::schedule::Flow;
use super::*;
use crate::error;
use crate::lang::ErrorCode;
use std::collections::VecDeque;


#[derive(Default)]
struct Tty {
    input: VecDeque<char>,
    output: String,
}

impl Console for Tty {
    fn write_char(&mut self, ch: char) {
        self.output.push(ch);
    }
    fn read_char(&mut self) -> Option<char> {
        self.input.pop_front()
    }
}

fn runtime() -> Runtime<Tty> {
    Runtime::new(Tty::default())
}

/// Run an IL listing until it asks for input or stops.
fn run_il(listing: &str, input: &str) -> (Runtime<Tty>, Status) {
    let mut r = runtime();
    r.initialize(Some(listing)).unwrap();
    r.console_mut().input.extend(input.chars());
    let mut status = Status::TimesliceExhausted;
    for _ in 0..10 {
        status = r.run_timeslice(status);
        if status != Status::TimesliceExhausted {
            break;
        }
    }
    (r, status)
}

fn exec(r: &mut Runtime<Tty>, op: u8) -> Result<Flow, crate::lang::Error> {
    r.execute(Opcode::decode(op))
}
