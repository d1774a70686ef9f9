use super::{Address, CORE_TOP};
use std::ops::Range;

/// ## The machine's 64K
///
/// Addresses are 16 bits wide so every address a program can form is
/// inside the core. A word access at 0xFFFF takes its low byte from
/// address 0. Words are big-endian.

pub struct Memory {
    cells: Box<[u8]>,
}

impl Default for Memory {
    fn default() -> Memory {
        Memory::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Memory {{ {} bytes }}", self.cells.len())
    }
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            cells: vec![0; CORE_TOP].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            *cell = 0;
        }
    }

    pub fn peek(&self, addr: Address) -> u8 {
        self.cells[addr as usize]
    }

    pub fn poke(&mut self, addr: Address, val: u8) {
        self.cells[addr as usize] = val;
    }

    pub fn peek2(&self, addr: Address) -> u16 {
        u16::from_be_bytes([self.peek(addr), self.peek(addr.wrapping_add(1))])
    }

    pub fn poke2(&mut self, addr: Address, val: u16) {
        let [hi, lo] = val.to_be_bytes();
        self.poke(addr, hi);
        self.poke(addr.wrapping_add(1), lo);
    }

    /// Bytes in `range`, for copying text out of the core.
    pub fn slice(&self, range: Range<Address>) -> &[u8] {
        &self.cells[range.start as usize..range.end as usize]
    }

    pub fn write_slice(&mut self, addr: Address, bytes: &[u8]) {
        let start = addr as usize;
        self.cells[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Move `src` so it starts at `dest`. Overlap is allowed in either
    /// direction.
    pub fn move_bytes(&mut self, src: Range<Address>, dest: Address) {
        self.cells
            .copy_within(src.start as usize..src.end as usize, dest as usize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_big_endian() {
        let mut m = Memory::new();
        m.poke2(130, 0x1234);
        assert_eq!(m.peek(130), 0x12);
        assert_eq!(m.peek(131), 0x34);
        assert_eq!(m.peek2(130), 0x1234);
    }

    #[test]
    fn test_word_at_top_wraps() {
        let mut m = Memory::new();
        m.poke2(0xFFFF, 0xBEEF);
        assert_eq!(m.peek(0xFFFF), 0xBE);
        assert_eq!(m.peek(0), 0xEF);
        assert_eq!(m.peek2(0xFFFF), 0xBEEF);
    }

    #[test]
    fn test_move_bytes_overlapping() {
        let mut m = Memory::new();
        m.write_slice(100, b"abcdef");
        m.move_bytes(100..106, 102);
        assert_eq!(m.slice(102..108), b"abcdef");
        m.move_bytes(102..108, 100);
        assert_eq!(m.slice(100..106), b"abcdef");
    }
}
