use super::{Address, Memory, EXPN_STK, GO_STK_TOP};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Expression stack
///
/// Grows down from `EXPN_STK` towards the end of the input line. Bytes and
/// big-endian words share it; the IL keeps track of which is which.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprStack {
    top: Address,
}

impl Default for ExprStack {
    fn default() -> ExprStack {
        ExprStack { top: EXPN_STK }
    }
}

impl ExprStack {
    fn overflow_error() -> Error {
        error!(StackOverflow; "EXPRESSION STACK")
    }
    fn underflow_error() -> Error {
        error!(StackUnderflow; "EXPRESSION STACK")
    }
    pub fn clear(&mut self) {
        self.top = EXPN_STK;
    }
    pub fn top(&self) -> Address {
        self.top
    }
    pub fn len(&self) -> usize {
        (EXPN_STK - self.top) as usize
    }
    pub fn is_empty(&self) -> bool {
        self.top >= EXPN_STK
    }
    /// `floor` is the end of the input line.
    pub fn push_byte(&mut self, mem: &mut Memory, floor: Address, val: u8) -> Result<()> {
        if self.top <= floor {
            return Err(Self::overflow_error());
        }
        self.top -= 1;
        mem.poke(self.top, val);
        Ok(())
    }
    pub fn pop_byte(&mut self, mem: &Memory) -> Result<u8> {
        if self.top >= EXPN_STK {
            return Err(Self::underflow_error());
        }
        self.top += 1;
        Ok(mem.peek(self.top - 1))
    }
    pub fn push_word(&mut self, mem: &mut Memory, floor: Address, val: u16) -> Result<()> {
        if self.top < floor + 2 {
            return Err(Self::overflow_error());
        }
        self.top -= 2;
        mem.poke2(self.top, val);
        Ok(())
    }
    pub fn pop_word(&mut self, mem: &Memory) -> Result<i16> {
        let val = self.peek_word(mem)?;
        self.top += 2;
        Ok(val)
    }
    pub fn peek_word(&self, mem: &Memory) -> Result<i16> {
        if self.top + 1 >= EXPN_STK {
            return Err(Self::underflow_error());
        }
        Ok(mem.peek2(self.top) as i16)
    }
    /// Exchange the top byte with the byte `n` deep.
    pub fn exchange(&mut self, mem: &mut Memory, n: u8) -> Result<()> {
        let other = self.top + Address::from(n);
        if other >= EXPN_STK {
            return Err(Self::underflow_error());
        }
        let top = mem.peek(self.top);
        mem.poke(self.top, mem.peek(other));
        mem.poke(other, top);
        Ok(())
    }
    /// Contents from top to bottom, as words when word aligned.
    pub fn words(&self, mem: &Memory) -> Vec<i16> {
        (self.top..EXPN_STK)
            .step_by(2)
            .filter(|addr| addr + 1 < EXPN_STK)
            .map(|addr| mem.peek2(addr) as i16)
            .collect()
    }
    pub fn bytes<'a>(&self, mem: &'a Memory) -> &'a [u8] {
        mem.slice(self.top..EXPN_STK)
    }
}

/// ## Control stack
///
/// Grows down from the end of user space towards the end of the program.
/// GOSUB line numbers and IL return addresses are both kept here, untagged.
/// The IL must pop what it pushed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlStack {
    top: Address,
}

impl Default for ControlStack {
    fn default() -> ControlStack {
        ControlStack { top: 0 }
    }
}

impl ControlStack {
    fn overflow_error() -> Error {
        error!(StackOverflow; "CONTROL STACK")
    }
    fn underflow_error() -> Error {
        error!(StackUnderflow; "CONTROL STACK")
    }
    pub fn reset(&mut self, mem: &mut Memory, end_user: Address) {
        self.top = end_user;
        mem.poke2(GO_STK_TOP, self.top);
    }
    pub fn top(&self) -> Address {
        self.top
    }
    pub fn len(&self, end_user: Address) -> usize {
        end_user.saturating_sub(self.top) as usize / 2
    }
    /// `floor` is the end of the program.
    pub fn push(&mut self, mem: &mut Memory, floor: Address, val: u16) -> Result<()> {
        if self.top < floor.saturating_add(2) {
            return Err(Self::overflow_error());
        }
        self.top -= 2;
        mem.poke2(GO_STK_TOP, self.top);
        mem.poke2(self.top, val);
        Ok(())
    }
    /// `end_user` is the bottom of the stack.
    pub fn pop(&mut self, mem: &mut Memory, end_user: Address) -> Result<u16> {
        if self.top >= end_user.saturating_sub(1) {
            return Err(Self::underflow_error());
        }
        self.top += 2;
        mem.poke2(GO_STK_TOP, self.top);
        Ok(mem.peek2(self.top - 2))
    }
    pub fn values(&self, mem: &Memory, end_user: Address) -> Vec<u16> {
        (self.top..end_user.saturating_sub(1))
            .step_by(2)
            .map(|addr| mem.peek2(addr))
            .collect()
    }
}
