use std::io::{BufRead, Write};

/// ## Console
///
/// What the host supplies. `read_char` returns `None` when nothing has
/// been typed yet; the machine then suspends and asks again on the next
/// time slice. Hosts that feed the console from another thread must do
/// their own locking.

pub trait Console {
    fn write_char(&mut self, ch: char);
    fn write_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.write_char(ch);
        }
    }
    fn read_char(&mut self) -> Option<char>;
}

/// Input redirected from a file. `None` is end of file.
pub trait InputFile {
    fn read_char(&mut self) -> Option<u8>;
    fn close(&mut self) {}
}

/// Output mirrored to a file.
pub trait OutputFile {
    fn write_char(&mut self, ch: u8);
    fn close(&mut self) {}
}

pub struct FileInput<R: BufRead> {
    reader: R,
}

impl<R: BufRead> FileInput<R> {
    pub fn new(reader: R) -> FileInput<R> {
        FileInput { reader }
    }
}

impl<R: BufRead> InputFile for FileInput<R> {
    fn read_char(&mut self) -> Option<u8> {
        let ch = match self.reader.fill_buf() {
            Ok(buf) => *buf.first()?,
            Err(_) => return None,
        };
        self.reader.consume(1);
        if ch == 0 {
            None
        } else {
            Some(ch)
        }
    }
}

pub struct FileOutput<W: Write> {
    writer: Option<W>,
}

impl<W: Write> FileOutput<W> {
    pub fn new(writer: W) -> FileOutput<W> {
        FileOutput {
            writer: Some(writer),
        }
    }
    pub fn into_inner(self) -> Option<W> {
        self.writer
    }
}

impl<W: Write> OutputFile for FileOutput<W> {
    fn write_char(&mut self, ch: u8) {
        if let Some(writer) = &mut self.writer {
            if writer.write_all(&[ch]).is_err() {
                self.writer = None;
            }
        }
    }
    fn close(&mut self) {
        if let Some(writer) = &mut self.writer {
            let _ = writer.flush();
        }
    }
}

/// ## I/O adapter
///
/// Every byte the machine prints passes through `out_char`, which keeps the
/// output column for tabs and drops anything unprintable. Input is taken
/// from the redirect file first and from the console once that runs out.

pub struct Io<C: Console> {
    console: C,
    column: u8,
    input: Option<Box<dyn InputFile>>,
    output: Option<Box<dyn OutputFile>>,
}

impl<C: Console> Io<C> {
    pub fn new(console: C) -> Io<C> {
        Io {
            console,
            column: 0,
            input: None,
            output: None,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn set_column(&mut self, column: u8) {
        self.column = column;
    }

    pub fn set_input(&mut self, input: Option<Box<dyn InputFile>>) {
        if let Some(mut old) = std::mem::replace(&mut self.input, input) {
            old.close();
        }
    }

    pub fn set_output(&mut self, output: Option<Box<dyn OutputFile>>) {
        if let Some(mut old) = std::mem::replace(&mut self.output, output) {
            old.close();
        }
    }

    #[cfg(test)]
    pub fn has_input_file(&self) -> bool {
        self.input.is_some()
    }

    #[cfg(test)]
    pub fn has_output_file(&self) -> bool {
        self.output.is_some()
    }

    pub fn close_files(&mut self) {
        self.set_input(None);
        self.set_output(None);
    }

    pub fn out_char(&mut self, ch: u8) {
        if let Some(output) = &mut self.output {
            if ch >= b' ' {
                output.write_char(ch);
            } else if ch == b'\r' {
                output.write_char(b'\n');
            }
        }
        self.screen_char(ch);
    }

    fn screen_char(&mut self, ch: u8) {
        if ch == b'\r' {
            self.column = 0;
            self.console.write_char('\n');
        } else if (b' '..=b'~').contains(&ch) {
            self.column = self.column.wrapping_add(1);
            self.console.write_char(ch as char);
        }
    }

    /// Filtered like `out_char` but handed to the console in one piece.
    pub fn out_str(&mut self, s: &str) {
        if let Some(output) = &mut self.output {
            for ch in s.bytes() {
                if ch >= b' ' {
                    output.write_char(ch);
                } else if ch == b'\r' {
                    output.write_char(b'\n');
                }
            }
        }
        let mut screen = String::with_capacity(s.len());
        for ch in s.bytes() {
            if ch == b'\r' {
                self.column = 0;
                screen.push('\n');
            } else if (b' '..=b'~').contains(&ch) {
                self.column = self.column.wrapping_add(1);
                screen.push(ch as char);
            }
        }
        if !screen.is_empty() {
            self.console.write_str(&screen);
        }
    }

    /// Next input byte, with line ends as `\r`. `None` when the console
    /// has nothing yet.
    pub fn in_char(&mut self) -> Option<u8> {
        if let Some(input) = &mut self.input {
            match input.read_char() {
                Some(ch) => {
                    let ch = if ch == b'\n' { b'\r' } else { ch };
                    self.screen_char(ch);
                    return Some(ch);
                }
                None => self.set_input(None),
            }
        }
        let ch = self.console.read_char()?;
        let ch = if ch.is_ascii() { ch as u8 } else { b'?' };
        if let Some(output) = &mut self.output {
            output.write_char(ch);
        }
        if ch == b'\n' {
            self.column = 0;
            Some(b'\r')
        } else {
            Some(ch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Default)]
    struct Tty {
        input: VecDeque<char>,
        output: String,
        writes: usize,
    }

    impl Console for Tty {
        fn write_char(&mut self, ch: char) {
            self.writes += 1;
            self.output.push(ch);
        }
        fn write_str(&mut self, s: &str) {
            self.writes += 1;
            self.output.push_str(s);
        }
        fn read_char(&mut self) -> Option<char> {
            self.input.pop_front()
        }
    }

    struct Shared(Rc<RefCell<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_out_filters_and_counts() {
        let mut io = Io::new(Tty::default());
        io.out_char(b'A');
        io.out_char(0x11);
        io.out_char(b'B');
        assert_eq!(io.column(), 2);
        io.out_char(b'\r');
        assert_eq!(io.column(), 0);
        io.out_str("X\u{80}Y\r");
        assert_eq!(io.console().output, "AB\nXY\n");
        assert_eq!(io.console().writes, 4);
    }

    #[test]
    fn test_input_file_first_then_console() {
        let mut tty = Tty::default();
        tty.input.push_back('Z');
        let mut io = Io::new(tty);
        io.set_input(Some(Box::new(FileInput::new(&b"a\n"[..]))));
        assert_eq!(io.in_char(), Some(b'a'));
        assert_eq!(io.in_char(), Some(b'\r'));
        assert!(io.has_input_file());
        assert_eq!(io.in_char(), Some(b'Z'));
        assert!(!io.has_input_file());
        assert_eq!(io.in_char(), None);
        assert_eq!(io.console().output, "a\n");
    }

    #[test]
    fn test_output_mirror() {
        let bytes = Rc::new(RefCell::new(Vec::new()));
        let mut tty = Tty::default();
        tty.input.push_back('q');
        let mut io = Io::new(tty);
        io.set_output(Some(Box::new(FileOutput::new(Shared(bytes.clone())))));
        io.out_str("OK\r");
        io.out_char(7);
        assert_eq!(io.in_char(), Some(b'q'));
        io.close_files();
        assert_eq!(&bytes.borrow()[..], b"OK\nq");
    }
}
