use super::{Address, Memory, END_PROG, USER_PROG};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Stored BASIC program
///
/// Lines live back to back from the address in `USER_PROG`, each one a
/// big-endian line number, the text, and a carriage return. They are kept
/// in ascending order with no duplicates. A line number of 0 ends the
/// program.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Program {
    end: Address,
}

/// Search forward from `here` for `ch`. Returns the address just past it,
/// or the address of a 0 byte if one comes first.
pub fn skip_to(mem: &Memory, mut here: Address, ch: u8) -> Address {
    loop {
        let found = mem.peek(here);
        if found == ch {
            return here.wrapping_add(1);
        }
        if found == 0 {
            return here;
        }
        here = here.wrapping_add(1);
    }
}

impl Program {
    pub fn start(mem: &Memory) -> Address {
        mem.peek2(USER_PROG)
    }

    /// One past the terminating 0 line number.
    pub fn end(&self) -> Address {
        self.end
    }

    pub fn clear(&mut self, mem: &mut Memory, start: Address) {
        mem.poke2(USER_PROG, start);
        mem.poke2(start, 0);
        self.end = start + 2;
        mem.poke2(END_PROG, self.end);
    }

    pub fn is_empty(&self, mem: &Memory) -> bool {
        mem.peek2(Program::start(mem)) == 0
    }

    /// Address of the first line numbered `line` or higher, or of the
    /// terminating 0.
    pub fn find(&self, mem: &Memory, line: u16) -> Address {
        let mut here = Program::start(mem);
        loop {
            let number = mem.peek2(here);
            if line <= number || number == 0 {
                return here;
            }
            here = skip_to(mem, here.wrapping_add(2), b'\r');
        }
    }

    /// Replace line `line` with `text`, which excludes the carriage return.
    /// Empty text deletes the line. The rest of the program slides over to
    /// fit. Nothing moves if the program would reach `ceiling`. Returns
    /// whether anything changed.
    pub fn insert(
        &mut self,
        mem: &mut Memory,
        line: u16,
        text: &[u8],
        ceiling: Address,
    ) -> Result<bool> {
        let size = if text.is_empty() { 0 } else { text.len() + 3 };
        let at = self.find(mem, line);
        let old = if mem.peek2(at) == line && line != 0 {
            (skip_to(mem, at + 2, b'\r') - at) as usize
        } else {
            0
        };
        if size == 0 && old == 0 {
            return Ok(false);
        }
        let new_end = self.end as i64 + size as i64 - old as i64;
        if new_end >= ceiling as i64 {
            return Err(error!(OutOfMemory));
        }
        let new_end = new_end as Address;
        if size != old {
            mem.move_bytes(at + old as Address..self.end, at + size as Address);
        }
        if size > 0 {
            mem.poke2(at, line);
            mem.write_slice(at + 2, text);
            mem.poke(at + 2 + text.len() as Address, b'\r');
        }
        self.end = new_end;
        mem.poke2(END_PROG, self.end);
        Ok(true)
    }

    /// Lines from `here` to the end of the program.
    pub fn lines_from<'a>(&self, mem: &'a Memory, here: Address) -> Lines<'a> {
        Lines { mem, here }
    }

    pub fn lines<'a>(&self, mem: &'a Memory) -> Lines<'a> {
        self.lines_from(mem, Program::start(mem))
    }
}

pub struct Lines<'a> {
    mem: &'a Memory,
    here: Address,
}

impl<'a> Iterator for Lines<'a> {
    /// Line number and text without the carriage return.
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let number = self.mem.peek2(self.here);
        if number == 0 {
            return None;
        }
        let text = self.here + 2;
        let next = skip_to(self.mem, text, b'\r');
        self.here = next;
        let end = if self.mem.peek(next.wrapping_sub(1)) == b'\r' {
            next - 1
        } else {
            next
        };
        Some((number, self.mem.slice(text..end)))
    }
}
