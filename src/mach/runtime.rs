use super::debug::{hex, mem_dump, var_letter};
use super::io::Io;
use super::*;
use crate::error;
use crate::lang::{il, Error};

type Result<T> = std::result::Result<T, Error>;

/// IL larger than this would leave no room for a program.
const MAX_IL: usize = 0x8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Instructions per call to `run_timeslice`.
    pub timeslice: usize,
    /// Initial RND seed.
    pub seed: u16,
    /// Typing a tab toggles the step trace.
    pub trace_toggle: bool,
    pub activity_log: bool,
    pub backspace: u8,
    pub cancel: u8,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            timeslice: TIMESLICE,
            seed: 8191,
            trace_toggle: true,
            activity_log: true,
            backspace: 8,
            cancel: 27,
        }
    }
}

/// ## Runtime
///
/// One Tiny BASIC session: the 64K core with the IL loaded into it, the
/// registers of the IL interpreter, the console and the debug state.
/// Everything the machine knows lives here; the host owns it and drives it
/// with `run_timeslice`.

pub struct Runtime<C: Console> {
    pub(super) mem: Memory,
    pub(super) exprs: ExprStack,
    pub(super) ctl: ControlStack,
    pub(super) program: Program,
    pub(super) io: Io<C>,
    pub(super) log: ActivityLog,
    pub(super) watch: Option<Watchpoint>,
    pub(super) breaker: BreakFlag,
    pub(super) config: Config,
    /// Current BASIC line, 0 in command mode.
    pub(super) lino: u16,
    /// IL program counter. 0 restarts the IL at its front.
    pub(super) ilpc: Address,
    /// BASIC pointer.
    pub(super) bp: Address,
    /// Saved BASIC pointer.
    pub(super) svpt: Address,
    /// End of the input line.
    pub(super) in_lend: Address,
    pub(super) il_end: Address,
    /// Where `XQ` left the IL, resumed by `GO` and `NX`.
    pub(super) xq_here: Address,
    pub(super) tracing: bool,
    pub(super) last_error: Option<Error>,
}

impl<C: Console> Runtime<C> {
    pub fn new(console: C) -> Runtime<C> {
        Runtime::with_config(console, Config::default())
    }

    pub fn with_config(console: C, config: Config) -> Runtime<C> {
        let mut runtime = Runtime {
            mem: Memory::new(),
            exprs: ExprStack::default(),
            ctl: ControlStack::default(),
            program: Program::default(),
            io: Io::new(console),
            log: ActivityLog::default(),
            watch: None,
            breaker: BreakFlag::default(),
            config,
            lino: 0,
            ilpc: 0,
            bp: IN_LINE,
            svpt: IN_LINE,
            in_lend: IN_LINE,
            il_end: IL_FRONT + 2,
            xq_here: 0,
            tracing: false,
            last_error: None,
        };
        runtime.install(&il::from_listing(il::DEFAULT_LISTING));
        runtime
    }

    /// Wipe the machine and load IL from an assembled listing, or the
    /// built-in Tiny BASIC IL when `listing` is `None`. The program is lost.
    pub fn initialize(&mut self, listing: Option<&str>) -> Result<()> {
        let code = il::from_listing(listing.unwrap_or(il::DEFAULT_LISTING));
        if code.is_empty() || code.len() > MAX_IL {
            return Err(error!(OutOfMemory; "IL"));
        }
        self.install(&code);
        Ok(())
    }

    fn install(&mut self, code: &[u8]) {
        self.mem.clear();
        self.log.clear();
        self.watch = None;
        self.last_error = None;
        self.tracing = false;
        self.mem.poke2(EXPN_STK, self.config.seed);
        self.mem.poke(BS_CODE, self.config.backspace);
        self.mem.poke(CAN_CODE, self.config.cancel);
        let front = IL_FRONT + 2;
        self.mem.poke2(IL_FRONT, front);
        self.mem.poke2(COLD_GO + 1, front);
        self.mem.write_slice(front, code);
        self.il_end = front + code.len() as Address;
        self.mem.poke(self.il_end, BAD_OP);
        self.xq_here = 0;
        self.cold_start();
    }

    pub(super) fn cold_start(&mut self) {
        let user_prog = (self.il_end + 1 + 255) & !255;
        self.mem.poke2(END_USER, 65534);
        self.mem.poke2(65534, 0xDEAD);
        self.warm_start();
        self.program.clear(&mut self.mem, user_prog);
    }

    pub(super) fn warm_start(&mut self) {
        let end_user = self.mem.peek2(END_USER);
        self.ctl.reset(&mut self.mem, end_user);
        self.exprs.clear();
        self.lino = 0;
        self.ilpc = 0;
        self.svpt = IN_LINE;
        self.bp = IN_LINE;
        self.mem.poke(IN_LINE, 0);
        self.io.set_column(0);
        self.mem.poke(TAB_HERE, 0);
        self.in_lend = IN_LINE;
    }

    pub(super) fn il_front(&self) -> Address {
        self.mem.peek2(IL_FRONT)
    }

    pub(super) fn end_user(&self) -> Address {
        self.mem.peek2(END_USER)
    }

    /// Report `err` and go back to command mode with empty stacks. The
    /// program and variables survive.
    pub(super) fn error_stop(&mut self, err: Error) {
        let il_offset = self.ilpc.wrapping_sub(self.il_front());
        let mut err = err.at_il_offset(il_offset);
        if (self.lino as i16) > 0 {
            err = err.in_line_number(self.lino);
        }
        self.log(LogEntry::Error {
            il_offset,
            code: err.code(),
        });
        self.io.out_str(&format!("\r{}\r", err));
        if self.tracing {
            self.show_ctl();
            self.show_exprs();
            self.show_vars(None);
            let regs = format!(
                " [BP={}, TB@{}, IL@{}]",
                hex(u32::from(self.bp), 4),
                hex(u32::from(Program::start(&self.mem)), 4),
                hex(u32::from(self.il_front()), 4)
            );
            self.io.out_str(&regs);
            let dump = mem_dump(&self.mem, self.bp.wrapping_sub(30) & !15, 64);
            self.io.out_str(&dump);
        }
        self.lino = 0;
        self.exprs.clear();
        self.ilpc = 0;
        self.bp = IN_LINE;
        self.last_error = Some(err);
    }

    /// Collect input into the line buffer. Returns false when the console
    /// runs dry before the carriage return; what was typed so far is kept.
    pub(super) fn read_line(&mut self) -> bool {
        loop {
            let ch = match self.io.in_char() {
                Some(ch) => ch,
                None => return false,
            };
            let ch = match ch {
                b'\r' => break,
                b'\t' => {
                    if self.config.trace_toggle {
                        self.tracing = !self.tracing;
                    }
                    b' '
                }
                ch if ch == self.mem.peek(BS_CODE) => {
                    if self.in_lend > IN_LINE {
                        self.in_lend -= 1;
                        continue;
                    }
                    self.io.out_char(b'\r');
                    break;
                }
                ch if ch == self.mem.peek(CAN_CODE) => {
                    self.in_lend = IN_LINE;
                    self.io.out_char(b'\r');
                    break;
                }
                ch if ch < b' ' || ch > b'~' => continue,
                ch => ch,
            };
            // Room for the carriage return and the 0 below the stack.
            if self.in_lend + 2 >= self.exprs.top() {
                continue;
            }
            self.mem.poke(self.in_lend, ch);
            self.in_lend += 1;
        }
        while self.in_lend > IN_LINE && self.mem.peek(self.in_lend - 1) == b' ' {
            self.in_lend -= 1;
        }
        self.mem.poke(self.in_lend, b'\r');
        self.in_lend += 1;
        self.mem.poke(self.in_lend, 0);
        self.bp = IN_LINE;
        true
    }

    /// Push one input character as a number. False if none is waiting.
    pub(super) fn read_char(&mut self) -> bool {
        let ch = match self.io.in_char() {
            Some(ch) => ch,
            None => return false,
        };
        if let Err(err) = self.push_word(u16::from(ch)) {
            self.error_stop(err);
        }
        true
    }

    /// Swap BP and the saved pointer, unless `here` is in the input line,
    /// in which case BP is only saved.
    pub(super) fn line_swap(&mut self, here: Address) {
        if here < IN_LINE || here >= self.in_lend {
            std::mem::swap(&mut self.svpt, &mut self.bp);
        } else {
            self.svpt = self.bp;
        }
    }

    /// Point BP at the text of line `lino`, or at the input line in command
    /// mode.
    pub(super) fn goto_line(&mut self) -> Result<()> {
        if (self.lino as i16) <= 0 {
            self.bp = IN_LINE;
            self.log(LogEntry::Line(0));
            return Ok(());
        }
        self.log(LogEntry::Line(self.lino));
        self.trace(&format!(" [#{}]", self.lino));
        self.bp = self.program.find(&self.mem, self.lino);
        let found = self.mem.peek2(self.bp);
        if found == 0 || found != self.lino {
            return Err(error!(UndefinedLine));
        }
        self.bp += 2;
        Ok(())
    }

    pub(super) fn push_byte(&mut self, val: u8) -> Result<()> {
        self.exprs.push_byte(&mut self.mem, self.in_lend, val)?;
        self.show_exprs();
        Ok(())
    }

    pub(super) fn push_word(&mut self, val: u16) -> Result<()> {
        self.exprs.push_word(&mut self.mem, self.in_lend, val)?;
        self.show_exprs();
        Ok(())
    }

    pub(super) fn pop_byte(&mut self) -> Result<u8> {
        self.exprs.pop_byte(&self.mem)
    }

    pub(super) fn pop_word(&mut self) -> Result<i16> {
        self.exprs.pop_word(&self.mem)
    }

    pub(super) fn push_ctl(&mut self, val: u16) -> Result<()> {
        self.ctl.push(&mut self.mem, self.program.end(), val)?;
        self.show_ctl();
        Ok(())
    }

    pub(super) fn pop_ctl(&mut self) -> Result<u16> {
        let end_user = self.end_user();
        self.ctl.pop(&mut self.mem, end_user)
    }

    pub(super) fn log(&mut self, entry: LogEntry) {
        if self.config.activity_log {
            self.log.record(entry);
        }
    }

    pub(super) fn trace(&mut self, s: &str) {
        if self.tracing {
            self.io.out_str(s);
        }
    }

    pub(super) fn show_exprs(&mut self) {
        if !self.tracing {
            return;
        }
        let top = self.exprs.top();
        let mut s = format!("\r [Exp {}", hex(u32::from(top), 3));
        if top & 1 == 0 {
            for word in self.exprs.words(&self.mem) {
                s.push_str(&format!(" {}", word));
            }
        } else {
            for byte in self.exprs.bytes(&self.mem) {
                s.push_str(&format!(".{}", byte));
            }
        }
        s.push(']');
        self.io.out_str(&s);
    }

    pub(super) fn show_ctl(&mut self) {
        if !self.tracing {
            return;
        }
        let mut s = format!("\r [Stk {}", hex(u32::from(self.ctl.top()), 5));
        for val in self.ctl.values(&self.mem, self.end_user()) {
            s.push_str(&format!(" {}", val));
        }
        s.push(']');
        self.io.out_str(&s);
    }

    /// One variable by its page zero address, or all of them with runs of
    /// zeros shown once.
    pub(super) fn show_vars(&mut self, addr: Option<u8>) {
        if !self.tracing {
            return;
        }
        let mut s = String::from("\r  [Vars");
        match addr {
            Some(addr) => {
                let val = self.mem.peek2(Address::from(addr)) as i16;
                s.push_str(&format!(" {}={}", var_letter(addr), val));
            }
            None => {
                let mut prior = 1;
                for (index, val) in self.variables().iter().enumerate() {
                    if *val == 0 && prior == 0 {
                        continue;
                    }
                    prior = *val;
                    s.push_str(&format!(" {}={}", (b'A' + index as u8) as char, val));
                }
            }
        }
        s.push(']');
        self.io.out_str(&s);
    }

    /// Store or replace a program line as if it had been typed. Empty
    /// text deletes. Only printable ASCII can be stored.
    pub fn insert_line(&mut self, line: u16, text: &str) -> Result<()> {
        if (line as i16) <= 0 {
            return Err(error!(BadLineNumber));
        }
        if !text.bytes().all(|ch| (b' '..=b'~').contains(&ch)) {
            return Err(error!(SyntaxError; "UNPRINTABLE"));
        }
        let text = text.trim_start_matches(' ').trim_end_matches(' ');
        let ceiling = self.ctl.top();
        self.program
            .insert(&mut self.mem, line, text.as_bytes(), ceiling)?;
        Ok(())
    }

    /// Address of line `line`, if it is stored.
    pub fn find_line(&self, line: u16) -> Option<Address> {
        let here = self.program.find(&self.mem, line);
        if line != 0 && self.mem.peek2(here) == line {
            Some(here)
        } else {
            None
        }
    }

    pub fn program_lines(&self) -> Vec<(u16, String)> {
        self.program
            .lines(&self.mem)
            .map(|(number, text)| (number, String::from_utf8_lossy(text).into_owned()))
            .collect()
    }

    pub fn variable(&self, letter: char) -> i16 {
        if !letter.is_ascii_alphabetic() {
            return 0;
        }
        self.mem.peek2(var_address(letter as u8)) as i16
    }

    pub fn variables(&self) -> [i16; 26] {
        let mut vars = [0; 26];
        for (index, var) in vars.iter_mut().enumerate() {
            *var = self.variable((b'A' + index as u8) as char);
        }
        vars
    }

    pub fn line_number(&self) -> u16 {
        self.lino
    }

    /// IL program counter as an offset from the front of the IL.
    pub fn il_counter(&self) -> u16 {
        self.ilpc.saturating_sub(self.il_front())
    }

    /// Bytes on the expression stack.
    pub fn expression_depth(&self) -> usize {
        self.exprs.len()
    }

    /// Words on the control stack.
    pub fn control_depth(&self) -> usize {
        self.ctl.len(self.end_user())
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn activity_log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn watchpoint(&self) -> Option<Watchpoint> {
        self.watch
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn is_tracing(&self) -> bool {
        self.tracing
    }

    pub fn console(&self) -> &C {
        self.io.console()
    }

    pub fn console_mut(&mut self) -> &mut C {
        self.io.console_mut()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Take input from `input` until it runs out.
    pub fn set_input_file(&mut self, input: Option<Box<dyn InputFile>>) {
        self.io.set_input(input);
    }

    /// Copy all output to `output`.
    pub fn set_output_file(&mut self, output: Option<Box<dyn OutputFile>>) {
        self.io.set_output(output);
    }
}
