/// ## IL instruction set
///
/// The IL is a stack machine for parsing and running BASIC text. Most ops
/// are one byte. Jumps and calls take one more byte; literals and printed
/// strings follow the op in the IL stream. The conditional branches keep
/// their offset in the low bits of the op.
///
/// See Tom Pittman's *Tiny BASIC Experimenter's Kit* for the originals.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `NO`, and every unassigned code.
    Nop,
    /// `SX n`: exchange the top byte with the one `n` deep.
    Exchange(u8),
    /// `LB n`: push the next IL byte.
    PushByte,
    /// `LN n`: push the next two IL bytes as a number.
    PushNumber,
    /// `DS`: duplicate the top number.
    Duplicate,
    /// `SP`: discard the top number.
    Discard,
    /// Stops the machine.
    Illegal,
    /// `SB`: save the BASIC pointer.
    SaveBasic,
    /// `RB`: restore the BASIC pointer.
    RestoreBasic,
    /// `FV`: fetch variable.
    FetchVar,
    /// `SV`: store variable.
    StoreVar,
    /// `GS`: push the current line for GOSUB.
    GosubSave,
    /// `RS`: pop the GOSUB line and go back to it.
    ReturnSaved,
    /// `GO`: GOTO the line number on the stack.
    Goto,
    Negate,
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `CP`: signed compare, skip the next IL byte when the mask matches.
    Compare,
    /// `NX`: next BASIC statement.
    Next,
    /// `LS`: list the program.
    List,
    /// `PN`: print number.
    PrintNumber,
    /// `PQ`: print BASIC string up to the closing quote.
    PrintQuoted,
    /// `PT`: print spaces to the next tab stop.
    PrintTab,
    /// `NL`: new line.
    NewLine,
    /// `PC`: print the literal that follows in the IL.
    PrintLiteral,
    /// `GL`: get input line.
    GetLine,
    /// `IL`: insert BASIC line.
    InsertLine,
    /// `MT`: mark the program empty.
    MarkEmpty,
    /// `XQ`: execute (enter RUN mode).
    Execute,
    /// `WS`: stop, warm start.
    WarmStart,
    /// `US`: machine language (USR) call.
    Usr,
    /// `RT`: IL subroutine return.
    Return,
    /// `JS a`: IL subroutine call. Holds the high three bits of the target.
    Call(u8),
    /// `J a`: jump. Holds the high three bits of the target.
    Jump(u8),
    /// `BR a`: relative branch, -31..=31.
    Branch(i8),
    /// `BC a "xxx"`: branch if the string does not match.
    BranchNoMatch(u8),
    /// `BV a`: branch if not a variable.
    BranchNotVar(u8),
    /// `BN a`: branch if not a number.
    BranchNotNumber(u8),
    /// `BE a`: branch if not at end of line.
    BranchNotEnd(u8),
}

impl Opcode {
    pub fn decode(op: u8) -> Opcode {
        use Opcode::*;
        match op {
            0x01..=0x07 => Exchange(op),
            0x09 => PushByte,
            0x0A => PushNumber,
            0x0B => Duplicate,
            0x0C => Discard,
            0x0F => Illegal,
            0x10 => SaveBasic,
            0x11 => RestoreBasic,
            0x12 => FetchVar,
            0x13 => StoreVar,
            0x14 => GosubSave,
            0x15 => ReturnSaved,
            0x16 => Goto,
            0x17 => Negate,
            0x18 => Add,
            0x19 => Subtract,
            0x1A => Multiply,
            0x1B => Divide,
            0x1C => Compare,
            0x1D => Next,
            0x1F => List,
            0x20 => PrintNumber,
            0x21 => PrintQuoted,
            0x22 => PrintTab,
            0x23 => NewLine,
            0x24 => PrintLiteral,
            0x27 => GetLine,
            0x2A => InsertLine,
            0x2B => MarkEmpty,
            0x2C => Execute,
            0x2D => WarmStart,
            0x2E => Usr,
            0x2F => Return,
            0x30..=0x37 => Call(op & 7),
            0x38..=0x3F => Jump(op & 7),
            0x40..=0x7F => Branch((op as i16 - 0x60) as i8),
            0x80..=0x9F => BranchNoMatch(op & 0x1F),
            0xA0..=0xBF => BranchNotVar(op & 0x1F),
            0xC0..=0xDF => BranchNotNumber(op & 0x1F),
            0xE0..=0xFF => BranchNotEnd(op & 0x1F),
            _ => Nop,
        }
    }

    /// Instructions with a second byte.
    pub fn is_two_byte(&self) -> bool {
        matches!(
            self,
            Opcode::PushByte | Opcode::Call(_) | Opcode::Jump(_)
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Nop => write!(f, "NO"),
            Exchange(n) => write!(f, "SX {}", n),
            PushByte => write!(f, "LB"),
            PushNumber => write!(f, "LN"),
            Duplicate => write!(f, "DS"),
            Discard => write!(f, "SP"),
            Illegal => write!(f, "??"),
            SaveBasic => write!(f, "SB"),
            RestoreBasic => write!(f, "RB"),
            FetchVar => write!(f, "FV"),
            StoreVar => write!(f, "SV"),
            GosubSave => write!(f, "GS"),
            ReturnSaved => write!(f, "RS"),
            Goto => write!(f, "GO"),
            Negate => write!(f, "NE"),
            Add => write!(f, "AD"),
            Subtract => write!(f, "SU"),
            Multiply => write!(f, "MP"),
            Divide => write!(f, "DV"),
            Compare => write!(f, "CP"),
            Next => write!(f, "NX"),
            List => write!(f, "LS"),
            PrintNumber => write!(f, "PN"),
            PrintQuoted => write!(f, "PQ"),
            PrintTab => write!(f, "PT"),
            NewLine => write!(f, "NL"),
            PrintLiteral => write!(f, "PC"),
            GetLine => write!(f, "GL"),
            InsertLine => write!(f, "IL"),
            MarkEmpty => write!(f, "MT"),
            Execute => write!(f, "XQ"),
            WarmStart => write!(f, "WS"),
            Usr => write!(f, "US"),
            Return => write!(f, "RT"),
            Call(_) => write!(f, "JS"),
            Jump(_) => write!(f, "J"),
            Branch(n) => write!(f, "BR {}", n),
            BranchNoMatch(n) => write!(f, "BC {}", n),
            BranchNotVar(n) => write!(f, "BV {}", n),
            BranchNotNumber(n) => write!(f, "BN {}", n),
            BranchNotEnd(n) => write!(f, "BE {}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_families() {
        assert_eq!(Opcode::decode(0x00), Opcode::Nop);
        assert_eq!(Opcode::decode(0x03), Opcode::Exchange(3));
        assert_eq!(Opcode::decode(0x08), Opcode::Nop);
        assert_eq!(Opcode::decode(0x0F), Opcode::Illegal);
        assert_eq!(Opcode::decode(0x30), Opcode::Call(0));
        assert_eq!(Opcode::decode(0x3F), Opcode::Jump(7));
        assert_eq!(Opcode::decode(0x59), Opcode::Branch(-7));
        assert_eq!(Opcode::decode(0x60), Opcode::Branch(0));
        assert_eq!(Opcode::decode(0x7F), Opcode::Branch(31));
        assert_eq!(Opcode::decode(0x40), Opcode::Branch(-32));
        assert_eq!(Opcode::decode(0x8B), Opcode::BranchNoMatch(11));
        assert_eq!(Opcode::decode(0xA0), Opcode::BranchNotVar(0));
        assert_eq!(Opcode::decode(0xC5), Opcode::BranchNotNumber(5));
        assert_eq!(Opcode::decode(0xE1), Opcode::BranchNotEnd(1));
    }

    #[test]
    fn test_every_code_decodes() {
        let nops = (0..=255u8)
            .filter(|op| Opcode::decode(*op) == Opcode::Nop)
            .collect::<Vec<u8>>();
        assert_eq!(nops, vec![0x00, 0x08, 0x0D, 0x0E, 0x1E, 0x25, 0x26, 0x28, 0x29]);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Opcode::decode(0x1D).to_string(), "NX");
        assert_eq!(Opcode::decode(0x02).to_string(), "SX 2");
        assert!(Opcode::decode(0x38).is_two_byte());
        assert!(!Opcode::decode(0x0A).is_two_byte());
    }
}
