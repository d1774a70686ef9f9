#![allow(dead_code)]
use std::collections::VecDeque;
use tinybasic::mach::{Config, Console, Runtime, Status};

#[derive(Default)]
pub struct Tty {
    pub input: VecDeque<char>,
    pub output: String,
}

impl Console for Tty {
    fn write_char(&mut self, ch: char) {
        self.output.push(ch);
    }
    fn read_char(&mut self) -> Option<char> {
        self.input.pop_front()
    }
}

pub struct Session {
    pub runtime: Runtime<Tty>,
    pub status: Status,
}

/// A machine sitting at its first prompt.
pub fn session() -> Session {
    session_with(Config::default())
}

pub fn session_with(config: Config) -> Session {
    let mut runtime = Runtime::with_config(Tty::default(), config);
    let status = runtime.run_timeslice(Status::TimesliceExhausted);
    assert_eq!(status, Status::NeedLine);
    assert_eq!(runtime.console().output, ":");
    runtime.console_mut().output.clear();
    Session { runtime, status }
}

pub fn enter(s: &mut Session, line: &str) {
    let input = &mut s.runtime.console_mut().input;
    input.extend(line.chars());
    input.push_back('\n');
}

/// Type in program lines, expecting nothing back but prompts.
pub fn type_program(s: &mut Session, lines: &[&str]) {
    for line in lines {
        enter(s, line);
    }
    let out = exec(s);
    assert_eq!(out, ":".repeat(lines.len() - 1));
}

pub fn exec(s: &mut Session) -> String {
    exec_n(s, 20)
}

/// Run until the machine waits on an empty keyboard, stops, or has used
/// `slices` time slices. Returns the output without the final prompt.
pub fn exec_n(s: &mut Session, slices: usize) -> String {
    let mut exhausted = 0;
    loop {
        s.status = s.runtime.run_timeslice(s.status);
        match s.status {
            Status::TimesliceExhausted => {
                exhausted += 1;
                if exhausted >= slices {
                    break;
                }
            }
            Status::Done => break,
            Status::NeedLine | Status::NeedChar => {
                if s.runtime.console().input.is_empty() {
                    break;
                }
            }
        }
    }
    let out = std::mem::take(&mut s.runtime.console_mut().output);
    match out.strip_suffix(':') {
        Some(out) => out.to_string(),
        None => out,
    }
}
