use super::{Console, Runtime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// ## Time slices
///
/// The host calls `run_timeslice` over and over, handing back whatever it
/// returned last time. The machine never waits for input: it returns
/// `NeedLine` or `NeedChar` and expects to be called again once the console
/// has something to read.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// An illegal IL op ended execution.
    Done,
    /// Waiting for a full input line.
    NeedLine,
    /// Waiting for one character.
    NeedChar,
    /// The instruction budget ran out. Call again.
    TimesliceExhausted,
}

impl Default for Status {
    fn default() -> Status {
        Status::TimesliceExhausted
    }
}

/// Break request shared with the host. Setting it is safe from any thread,
/// such as a Ctrl-C handler. The machine clears it when it notices.
#[derive(Debug, Clone, Default)]
pub struct BreakFlag(Arc<AtomicBool>);

impl BreakFlag {
    pub fn signal(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
    /// Read and reset.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    Suspend(Status),
}

impl<C: Console> Runtime<C> {
    pub fn run_timeslice(&mut self, previous: Status) -> Status {
        if !self.breaker.is_set() {
            let satisfied = match previous {
                Status::NeedLine => self.read_line(),
                Status::NeedChar => self.read_char(),
                _ => true,
            };
            if !satisfied {
                return previous;
            }
        }
        let status = self.interp();
        if status == Status::Done {
            self.io.close_files();
        }
        status
    }

    pub fn signal_break(&self) {
        self.breaker.signal();
    }

    pub fn break_flag(&self) -> BreakFlag {
        self.breaker.clone()
    }

    fn interp(&mut self) -> Status {
        for _ in 0..self.config.timeslice {
            if let Flow::Suspend(status) = self.step() {
                return status;
            }
        }
        Status::TimesliceExhausted
    }
}
