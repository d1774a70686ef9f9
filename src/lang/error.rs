/// ## Error stop
///
/// Every failure inside the machine is an error stop. None of them end the
/// session: the executor reports the error, resets to command mode and
/// carries on with the next statement.

#[derive(Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    il_offset: u16,
    line_number: Option<u16>,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            il_offset: 0,
            line_number: None,
            message: "",
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Offset of the IL program counter, from the front of the IL, when the
    /// error was raised. This is the number printed in the diagnostic.
    pub fn il_offset(&self) -> u16 {
        self.il_offset
    }

    pub fn line_number(&self) -> Option<u16> {
        self.line_number
    }

    pub fn is_fatal(&self) -> bool {
        self.code == ErrorCode::IllegalOpcode
    }

    pub fn at_il_offset(&self, il_offset: u16) -> Error {
        Error {
            code: self.code,
            il_offset,
            line_number: self.line_number,
            message: self.message,
        }
    }

    pub fn in_line_number(&self, line: u16) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            code: self.code,
            il_offset: self.il_offset,
            line_number: Some(line),
            message: self.message,
        }
    }

    pub fn message(&self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            il_offset: self.il_offset,
            line_number: self.line_number,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    StackOverflow = 1,
    StackUnderflow = 2,
    DivisionByZero = 3,
    UndefinedLine = 4,
    /// A conditional branch with a zero offset found no match.
    SyntaxError = 5,
    IllegalOpcode = 6,
    /// Line insert would run into the control stack.
    OutOfMemory = 7,
    UnknownService = 8,
    Watchpoint = 9,
    Break = 10,
    BadLineNumber = 11,
    IllegalReturn = 12,
    UnterminatedString = 13,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use ErrorCode::*;
        let code_str = match self {
            StackOverflow => "STACK OVERFLOW",
            StackUnderflow => "STACK UNDERFLOW",
            DivisionByZero => "DIVISION BY ZERO",
            UndefinedLine => "UNDEFINED LINE",
            SyntaxError => "SYNTAX ERROR",
            IllegalOpcode => "ILLEGAL OPCODE",
            OutOfMemory => "OUT OF MEMORY",
            UnknownService => "UNKNOWN USR ADDRESS",
            Watchpoint => "WATCHPOINT",
            Break => "BREAK",
            BadLineNumber => "BAD LINE NUMBER",
            IllegalReturn => "RETURN OUTSIDE IL",
            UnterminatedString => "UNTERMINATED STRING",
        };
        write!(f, "{}", code_str)
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} #{}", self.code, self.il_offset)?;
        if let Some(line_number) = self.line_number {
            write!(f, " IN {}", line_number)?;
        }
        if !self.message.is_empty() {
            write!(f, "; {}", self.message)?;
        }
        write!(f, " }}")
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Tiny Basic error #{}", self.il_offset)?;
        if let Some(line_number) = self.line_number {
            write!(f, " at line {}", line_number)?;
        }
        Ok(())
    }
}
