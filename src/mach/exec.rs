use super::debug::{hex, mem_dump};
use super::program::skip_to;
use super::schedule::Flow;
use super::*;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// Case folding for BASIC text compared against IL strings. Tabs read as
/// spaces, line ends as carriage returns, other controls as nothing.
fn fold(ch: u8) -> u8 {
    match ch & 127 {
        9 => b' ',
        10 | 13 => b'\r',
        ch if ch < 32 || ch == 127 => 0,
        ch => ch.to_ascii_uppercase(),
    }
}

impl<C: Console> Runtime<C> {
    /// Execute one IL instruction.
    pub(super) fn step(&mut self) -> Flow {
        if self.breaker.take() {
            self.io.out_str("\r*** User Break ***");
            self.error_stop(error!(Break));
        }
        if self.ilpc == 0 {
            self.ilpc = self.il_front();
            self.log(LogEntry::Il(0));
            self.trace(&format!("\r[IL={}]", hex(u32::from(self.ilpc), 4)));
        }
        if let Some(watch) = self.watch {
            if watch.tripped(&self.mem) {
                let msg = format!(
                    "\r*** Watched {} = {} *** ",
                    hex(u32::from(watch.addr), 4),
                    self.mem.peek(watch.addr)
                );
                self.io.out_str(&msg);
                self.watch = None;
                self.error_stop(error!(Watchpoint));
                return Flow::Continue;
            }
        }
        let op = self.mem.peek(self.ilpc);
        let opcode = Opcode::decode(op);
        if self.tracing {
            let offset = self.ilpc.wrapping_sub(self.il_front());
            let msg = format!(
                "\r[IL+{}={} {}]",
                hex(u32::from(offset), 3),
                hex(u32::from(op), 2),
                opcode
            );
            self.io.out_str(&msg);
        }
        self.ilpc = self.ilpc.wrapping_add(1);
        match self.execute(opcode) {
            Ok(flow) => flow,
            Err(err) => {
                let fatal = err.is_fatal();
                self.error_stop(err);
                if fatal {
                    Flow::Suspend(Status::Done)
                } else {
                    Flow::Continue
                }
            }
        }
    }

    fn il_byte(&mut self) -> u8 {
        let byte = self.mem.peek(self.ilpc);
        self.ilpc = self.ilpc.wrapping_add(1);
        byte
    }

    fn log_il(&mut self) {
        let offset = self.ilpc.wrapping_sub(self.il_front());
        self.log(LogEntry::Il(offset));
    }

    fn skip_spaces(&mut self) {
        while self.mem.peek(self.bp) == b' ' {
            self.bp = self.bp.wrapping_add(1);
        }
    }

    /// Forward branch for the conditional families. A zero offset means
    /// the condition is required.
    fn branch_forward(&mut self, offset: u8) -> Result<()> {
        if offset == 0 {
            return Err(error!(SyntaxError));
        }
        self.ilpc = self.ilpc.wrapping_add(Address::from(offset));
        self.log_il();
        Ok(())
    }

    fn binary(&mut self, f: fn(i16, i16) -> i16) -> Result<()> {
        let b = self.pop_word()?;
        let a = self.pop_word()?;
        self.push_word(f(a, b) as u16)
    }

    pub(super) fn execute(&mut self, opcode: Opcode) -> Result<Flow> {
        use Opcode::*;
        match opcode {
            Nop => {}
            Exchange(n) => {
                self.exprs.exchange(&mut self.mem, n)?;
                self.show_exprs();
            }
            PushByte => {
                let byte = self.il_byte();
                self.push_byte(byte)?;
            }
            PushNumber => {
                let hi = self.il_byte();
                let lo = self.il_byte();
                self.push_word(u16::from_be_bytes([hi, lo]))?;
            }
            Duplicate => {
                let top = self.exprs.peek_word(&self.mem)?;
                self.push_word(top as u16)?;
            }
            Discard => {
                self.pop_word()?;
                self.show_exprs();
            }
            Illegal => return Err(error!(IllegalOpcode)),
            SaveBasic => self.line_swap(self.bp),
            RestoreBasic => self.line_swap(self.svpt),
            FetchVar => {
                let addr = self.pop_byte()?;
                let val = self.mem.peek2(Address::from(addr));
                self.push_word(val)?;
            }
            StoreVar => {
                let val = self.pop_word()?;
                let addr = self.pop_byte()?;
                self.mem.poke2(Address::from(addr), val as u16);
                self.log(LogEntry::Store { addr, val });
                self.show_vars(Some(addr));
            }
            GosubSave => self.push_ctl(self.lino)?,
            ReturnSaved => {
                self.lino = self.pop_ctl()?;
                self.goto_line()?;
            }
            Goto => {
                let target = self.pop_word()? as u16;
                if self.xq_here != 0 {
                    self.ilpc = self.xq_here;
                    self.log_il();
                }
                self.lino = target;
                self.goto_line()?;
                // Nothing has been RUN yet, so there is no statement loop
                // to resume.
                if self.xq_here == 0 {
                    self.ilpc = 0;
                    self.lino = 0;
                }
            }
            Negate => {
                let val = self.pop_word()?;
                self.push_word(val.wrapping_neg() as u16)?;
            }
            Add => self.binary(i16::wrapping_add)?,
            Subtract => self.binary(i16::wrapping_sub)?,
            Multiply => self.binary(i16::wrapping_mul)?,
            Divide => {
                let b = self.pop_word()?;
                let a = self.pop_word()?;
                if b == 0 {
                    return Err(error!(DivisionByZero));
                }
                self.push_word(a.wrapping_div(b) as u16)?;
            }
            Compare => {
                let b = self.pop_word()?;
                let mask = self.pop_byte()?;
                let a = self.pop_word()?;
                let bit = match a.cmp(&b) {
                    std::cmp::Ordering::Less => 1,
                    std::cmp::Ordering::Equal => 2,
                    std::cmp::Ordering::Greater => 4,
                };
                if bit & mask != 0 {
                    self.ilpc = self.ilpc.wrapping_add(1);
                }
                self.show_exprs();
            }
            Next => self.next_statement()?,
            List => {
                let mut from = 0;
                let mut to = 0;
                while !self.exprs.is_empty() {
                    to = from;
                    from = self.pop_word()?;
                }
                if from < 0 || to < 0 {
                    return Err(error!(BadLineNumber));
                }
                self.list(from as u16, to as u16);
            }
            PrintNumber => {
                let val = self.pop_word()?;
                self.io.out_str(&val.to_string());
            }
            PrintQuoted => loop {
                let ch = self.mem.peek(self.bp);
                self.bp = self.bp.wrapping_add(1);
                if ch == b'"' {
                    break;
                }
                if ch < b' ' {
                    return Err(error!(UnterminatedString));
                }
                self.io.out_char(ch);
            },
            PrintTab => loop {
                self.io.out_char(b' ');
                if self.io.column() & 7 == 0 {
                    break;
                }
            },
            NewLine => self.io.out_char(b'\r'),
            PrintLiteral => loop {
                let ch = self.il_byte();
                self.io.out_char(ch & 127);
                if ch & 128 != 0 {
                    break;
                }
            },
            GetLine => {
                self.in_lend = IN_LINE;
                if !self.read_line() {
                    return Ok(Flow::Suspend(Status::NeedLine));
                }
            }
            InsertLine => self.insert_typed_line()?,
            MarkEmpty => {
                self.cold_start();
                self.trace("\r[Cold start]");
            }
            Execute => {
                self.xq_here = self.ilpc;
                self.bp = Program::start(&self.mem);
                self.lino = self.mem.peek2(self.bp);
                self.bp = self.bp.wrapping_add(2);
                if self.lino == 0 {
                    return Err(error!(UndefinedLine));
                }
                self.log(LogEntry::Line(self.lino));
                self.trace(&format!(" [#{}]", self.lino));
            }
            WarmStart => self.warm_start(),
            Usr => return self.usr(),
            Return => {
                let addr = self.pop_ctl()?;
                if addr < self.il_front() || addr >= self.il_end {
                    return Err(error!(IllegalReturn));
                }
                self.ilpc = addr;
                self.log_il();
            }
            Call(hi) => {
                let ret = self.ilpc.wrapping_add(1);
                self.push_ctl(ret)?;
                self.jump(hi);
            }
            Jump(hi) => self.jump(hi),
            Branch(offset) => {
                if offset == 0 {
                    return Err(error!(SyntaxError));
                }
                self.ilpc = self.ilpc.wrapping_add(offset as Address);
                self.log_il();
            }
            BranchNoMatch(offset) => self.match_string(offset)?,
            BranchNotVar(offset) => {
                self.skip_spaces();
                let ch = self.mem.peek(self.bp);
                if ch.is_ascii_alphabetic() {
                    self.push_byte((ch & 0x5F).wrapping_mul(2))?;
                    self.bp = self.bp.wrapping_add(1);
                } else {
                    self.branch_forward(offset)?;
                }
            }
            BranchNotNumber(offset) => {
                self.skip_spaces();
                if self.mem.peek(self.bp).is_ascii_digit() {
                    let mut num: u16 = 0;
                    loop {
                        let ch = self.mem.peek(self.bp);
                        self.bp = self.bp.wrapping_add(1);
                        if ch == b' ' {
                            continue;
                        }
                        if !ch.is_ascii_digit() {
                            break;
                        }
                        num = num.wrapping_mul(10).wrapping_add(u16::from(ch - b'0'));
                    }
                    self.bp = self.bp.wrapping_sub(1);
                    self.push_word(num)?;
                } else {
                    self.branch_forward(offset)?;
                }
            }
            BranchNotEnd(offset) => {
                self.skip_spaces();
                if self.mem.peek(self.bp) != b'\r' {
                    self.branch_forward(offset)?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    /// `J` and `JS`: the high three bits of the target come from the op,
    /// the low eight from the byte after it.
    fn jump(&mut self, hi: u8) {
        let lo = self.mem.peek(self.ilpc);
        let target = u16::from_be_bytes([hi, lo]);
        self.ilpc = self.il_front().wrapping_add(target);
        self.log_il();
    }

    fn next_statement(&mut self) -> Result<()> {
        if self.lino == 0 {
            self.ilpc = 0;
            return Ok(());
        }
        self.bp = skip_to(&self.mem, self.bp, b'\r');
        self.lino = self.mem.peek2(self.bp);
        self.bp = self.bp.wrapping_add(2);
        if self.lino == 0 {
            return Err(error!(UndefinedLine));
        }
        self.ilpc = self.xq_here;
        self.log_il();
        self.log(LogEntry::Line(self.lino));
        self.trace(&format!(" [#{}]", self.lino));
        Ok(())
    }

    fn match_string(&mut self, offset: u8) -> Result<()> {
        let target = if offset == 0 {
            None
        } else {
            Some(self.ilpc.wrapping_add(Address::from(offset)))
        };
        let start = self.bp;
        loop {
            self.skip_spaces();
            let want = self.il_byte();
            let got = fold(self.mem.peek(self.bp));
            self.bp = self.bp.wrapping_add(1);
            if want & 127 != got {
                self.bp = start;
                match target {
                    Some(target) => self.ilpc = target,
                    None => return Err(error!(SyntaxError)),
                }
                break;
            }
            if want & 128 != 0 {
                break;
            }
        }
        self.log_il();
        Ok(())
    }

    fn insert_typed_line(&mut self) -> Result<()> {
        let line = self.pop_word()?;
        if line <= 0 {
            return Err(error!(BadLineNumber));
        }
        self.skip_spaces();
        let end = skip_to(&self.mem, self.bp, b'\r');
        let end = if self.mem.peek(end.wrapping_sub(1)) == b'\r' {
            end - 1
        } else {
            end
        };
        let text = self.mem.slice(self.bp..end.max(self.bp)).to_vec();
        let ceiling = self.ctl.top();
        self.program
            .insert(&mut self.mem, line as u16, &text, ceiling)?;
        self.ilpc = 0;
        self.lino = 0;
        if self.tracing {
            self.list(0, 0);
        }
        Ok(())
    }

    /// Print lines `from` through `to`. `from` 0 lists everything, `to` 0
    /// lists only `from`. A break stops the listing.
    pub(super) fn list(&mut self, from: u16, to: u16) {
        let (from, to) = match (from, to) {
            (0, _) => (1, 65535),
            (from, 0) => (from, from),
            range => range,
        };
        let mut here = self.program.find(&self.mem, from);
        while !self.breaker.take() {
            let line = self
                .program
                .lines_from(&self.mem, here)
                .next()
                .map(|(number, text)| (number, text.to_vec()));
            let (number, text) = match line {
                Some(line) => line,
                None => break,
            };
            if number > to {
                break;
            }
            let mut s = format!("{} ", number);
            s.push_str(&String::from_utf8_lossy(&text));
            s.push('\r');
            self.io.out_str(&s);
            here = here.wrapping_add(text.len() as Address + 3);
        }
    }

    fn usr(&mut self) -> Result<Flow> {
        self.mem.poke2(LINO_CORE, self.lino);
        self.mem.poke2(ILPC_CORE, self.ilpc);
        self.mem.poke2(BP_CORE, self.bp);
        self.mem.poke2(SVPT_CORE, self.svpt);
        self.mem.poke(TAB_HERE, self.io.column());
        let a = self.pop_word()? as u16;
        let x = self.pop_word()? as u16;
        let addr = self.pop_word()? as u16;
        if addr >= self.il_front() && addr < self.il_end {
            self.push_word(x)?;
            self.push_word(a)?;
            self.push_ctl(self.ilpc)?;
            self.ilpc = addr;
            self.log_il();
            return Ok(Flow::Continue);
        }
        match addr {
            WATCH_POINT => {
                self.watch = Watchpoint::new(&self.mem, x, a);
                self.trace(&format!("\r[** Watch {}]", hex(u32::from(x), 4)));
                self.push_word(u16::from(self.mem.peek(x)))?;
            }
            COLD_GO => self.cold_start(),
            WARM_GO => self.warm_start(),
            INCH_SUB => {
                if !self.read_char() {
                    return Ok(Flow::Suspend(Status::NeedChar));
                }
            }
            OUTCH_SUB => {
                self.io.out_char(a as u8 & 127);
                self.push_word(0)?;
            }
            BREAK_SUB => {
                let broken = self.breaker.take();
                self.push_word(u16::from(broken))?;
            }
            DUMP_SUB => {
                let dump = mem_dump(&self.mem, x, a);
                self.io.out_str(&dump);
                self.push_word(x.wrapping_add(a))?;
            }
            PEEK_SUB => self.push_word(u16::from(self.mem.peek(x)))?,
            PEEK2_SUB => self.push_word(self.mem.peek2(x))?,
            POKE_SUB => {
                let val = a as u8;
                self.mem.poke(x, val);
                self.push_word(u16::from(val))?;
                self.log(LogEntry::Poke { addr: x, val });
                self.lino = self.mem.peek2(LINO_CORE);
                self.ilpc = self.mem.peek2(ILPC_CORE);
                self.bp = self.mem.peek2(BP_CORE);
                self.svpt = self.mem.peek2(SVPT_CORE);
                self.io.set_column(self.mem.peek(TAB_HERE));
            }
            TR_LOG_SUB => {
                let listing = self.log.listing();
                self.io.out_str(&listing);
                self.push_word(self.log.total() as u16)?;
            }
            _ => return Err(error!(UnknownService)),
        }
        Ok(Flow::Continue)
    }
}
