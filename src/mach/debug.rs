use super::{Address, Memory, LOG_SIZE};
use crate::lang::ErrorCode;

/// ## Activity log
///
/// Quietly records recent activity in a circular buffer of `LOG_SIZE`
/// entries. Older entries are overwritten; the running total is kept so a
/// dump can say how much has happened.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEntry {
    /// Current BASIC line changed. 0 is the command line.
    Line(u16),
    /// IL control transfer, as an offset from the front of the IL.
    Il(u16),
    /// Store to a page zero word, normally a variable.
    Store { addr: u8, val: i16 },
    /// Byte poked by USR.
    Poke { addr: Address, val: u8 },
    Error { il_offset: u16, code: ErrorCode },
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use LogEntry::*;
        match self {
            Line(n) => write!(f, "#{}", n),
            Il(offset) => write!(f, "  IL+{}", hex(u32::from(*offset), 3)),
            Store { addr, val } => write!(f, "{}={}", var_letter(*addr), val),
            Poke { addr, val } => write!(f, "!{}={}", hex(u32::from(*addr), 4), val),
            Error { il_offset, code } => write!(f, "Err {} {}", il_offset, code),
        }
    }
}

/// Letter of the variable stored at a page zero address.
pub fn var_letter(addr: u8) -> char {
    (((addr >> 1) & 31) + 64) as char
}

pub struct ActivityLog {
    entries: Box<[LogEntry]>,
    here: usize,
}

impl Default for ActivityLog {
    fn default() -> ActivityLog {
        ActivityLog {
            entries: vec![LogEntry::Line(0); LOG_SIZE].into_boxed_slice(),
            here: 0,
        }
    }
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ActivityLog {{ {} recorded }}", self.here)
    }
}

impl ActivityLog {
    pub fn record(&mut self, entry: LogEntry) {
        self.entries[self.here & (LOG_SIZE - 1)] = entry;
        self.here = self.here.wrapping_add(1);
    }

    /// Everything ever recorded, including what has been overwritten.
    pub fn total(&self) -> usize {
        self.here
    }

    pub fn len(&self) -> usize {
        self.here.min(LOG_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.here == 0
    }

    pub fn clear(&mut self) {
        self.here = 0;
    }

    /// Retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        let split = self.here & (LOG_SIZE - 1);
        let (newer, older) = self.entries.split_at(split);
        let older = if self.here >= LOG_SIZE { older } else { &older[..0] };
        older.iter().chain(newer.iter())
    }

    pub fn last(&self) -> Option<&LogEntry> {
        if self.here == 0 {
            None
        } else {
            Some(&self.entries[(self.here - 1) & (LOG_SIZE - 1)])
        }
    }

    pub fn listing(&self) -> String {
        let mut s = format!("\r*** Activity Log @ {} ***", self.here);
        for entry in self.iter() {
            s.push_str(&format!("\r{}", entry));
        }
        s.push_str("\r*****\r");
        s
    }
}

/// ## Watchpoint
///
/// Watches one byte. Execution error stops before the next instruction
/// once the trigger condition holds.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The byte no longer holds this value.
    Changes(u8),
    /// The byte holds this value.
    Equals(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watchpoint {
    pub addr: Address,
    pub trigger: Trigger,
}

impl Watchpoint {
    /// `val` above 32767 (negative in BASIC) watches for any change.
    pub fn new(mem: &Memory, addr: Address, val: u16) -> Option<Watchpoint> {
        if addr == 0 {
            return None;
        }
        let trigger = if val > 32767 {
            Trigger::Changes(mem.peek(addr))
        } else {
            Trigger::Equals(val)
        };
        Some(Watchpoint { addr, trigger })
    }

    pub fn tripped(&self, mem: &Memory) -> bool {
        let now = mem.peek(self.addr);
        match self.trigger {
            Trigger::Changes(was) => now != was,
            Trigger::Equals(val) => u16::from(now) == val,
        }
    }
}

/// Upper case hex of the low `digits` nibbles.
pub fn hex(num: u32, digits: usize) -> String {
    let mask = if digits >= 8 { u32::MAX } else { (1 << (digits * 4)) - 1 };
    format!("{:0width$X}", num & mask, width = digits)
}

/// Hex dump of `len` bytes from `here`, sixteen to a row with the text
/// alongside. Rows start on sixteen byte boundaries.
pub fn mem_dump(mem: &Memory, here: Address, len: u16) -> String {
    let mut s = String::new();
    let mut here = u32::from(here);
    let mut thar = here & !15;
    let mut nlocs = i32::from(len);
    while nlocs > 0 {
        let mut temp = thar;
        s.push('\r');
        s.push_str(&hex(here, 4));
        s.push_str(": ");
        while thar < here {
            s.push_str("   ");
            thar += 1;
        }
        loop {
            s.push(' ');
            if nlocs > 0 {
                s.push_str(&hex(u32::from(mem.peek(here as u16)), 2));
            } else {
                s.push_str("  ");
            }
            nlocs -= 1;
            here += 1;
            if here % 16 == 0 {
                break;
            }
        }
        s.push_str("  ");
        while temp < thar {
            s.push(' ');
            temp += 1;
        }
        while thar < here {
            if nlocs < 0 && (thar & 15) as i32 >= nlocs + 16 {
                break;
            }
            s.push(match mem.peek(thar as u16) {
                b'\r' => '\\',
                b if b < 32 => '`',
                b if b > 126 => '~',
                b => b as char,
            });
            thar += 1;
        }
        thar = here;
    }
    s.push('\r');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_wraps() {
        let mut log = ActivityLog::default();
        assert!(log.is_empty());
        for n in 0..(LOG_SIZE as u16 + 10) {
            log.record(LogEntry::Line(n));
        }
        assert_eq!(log.total(), LOG_SIZE + 10);
        assert_eq!(log.len(), LOG_SIZE);
        assert_eq!(log.iter().next(), Some(&LogEntry::Line(10)));
        assert_eq!(log.last(), Some(&LogEntry::Line(LOG_SIZE as u16 + 9)));
        assert_eq!(log.iter().count(), LOG_SIZE);
    }

    #[test]
    fn test_log_entries_display() {
        assert_eq!(LogEntry::Line(20).to_string(), "#20");
        assert_eq!(LogEntry::Il(0x1D).to_string(), "  IL+01D");
        assert_eq!(LogEntry::Store { addr: 130, val: -5 }.to_string(), "A=-5");
        assert_eq!(LogEntry::Poke { addr: 0x300, val: 7 }.to_string(), "!0300=7");
        let e = LogEntry::Error {
            il_offset: 27,
            code: ErrorCode::DivisionByZero,
        };
        assert_eq!(e.to_string(), "Err 27 DIVISION BY ZERO");
    }

    #[test]
    fn test_watchpoint_triggers() {
        let mut mem = Memory::new();
        mem.poke(500, 3);
        let w = Watchpoint::new(&mem, 500, 0xFFFF).unwrap();
        assert_eq!(w.trigger, Trigger::Changes(3));
        assert!(!w.tripped(&mem));
        mem.poke(500, 4);
        assert!(w.tripped(&mem));
        let w = Watchpoint::new(&mem, 500, 9).unwrap();
        assert!(!w.tripped(&mem));
        mem.poke(500, 9);
        assert!(w.tripped(&mem));
        assert!(Watchpoint::new(&mem, 0, 9).is_none());
    }

    #[test]
    fn test_mem_dump_row() {
        let mut mem = Memory::new();
        mem.write_slice(0x300, b"HI\r\x01");
        let dump = mem_dump(&mem, 0x300, 4);
        assert!(dump.starts_with("\r0300:  48 49 0D 01"));
        assert!(dump.ends_with("HI\\`\r"));
    }

    #[test]
    fn test_hex_digits() {
        assert_eq!(hex(0x1ABCD, 4), "ABCD");
        assert_eq!(hex(5, 2), "05");
    }
}
