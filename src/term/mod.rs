extern crate ansi_term;
extern crate clap;
extern crate ctrlc;
extern crate linefeed;
use ansi_term::Style;
use clap::Parser;
use linefeed::{Interface, ReadResult, Signal};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tinybasic::mach::{Config, Console, FileInput, FileOutput, Runtime, Status};

/// Tiny BASIC, interpreted by Tom Pittman's IL.
#[derive(Parser, Debug)]
#[command(name = "tinybasic", version, about)]
struct Args {
    /// BASIC program to type in and RUN.
    program: Option<PathBuf>,
    /// Assembled IL listing to run instead of the built-in Tiny BASIC.
    #[arg(long)]
    il: Option<PathBuf>,
    /// Read input from this file before the keyboard.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Copy all output to this file.
    #[arg(long)]
    output: Option<PathBuf>,
    /// IL instructions between checks for input.
    #[arg(long, default_value_t = 10000)]
    timeslice: usize,
    /// Initial RND seed.
    #[arg(long, default_value_t = 8191)]
    seed: u16,
    /// Seed RND from the system.
    #[arg(long, conflicts_with = "seed")]
    randomize: bool,
    /// Don't let the tab key turn on the IL trace.
    #[arg(long)]
    no_trace: bool,
}

pub fn main() {
    let args = Args::parse();
    if let Err(error) = main_loop(args) {
        eprintln!("{}", Style::new().bold().paint(error.to_string()));
    }
}

fn main_loop(args: Args) -> std::io::Result<()> {
    let config = Config {
        timeslice: args.timeslice.max(1),
        seed: if args.randomize {
            rand::random()
        } else {
            args.seed
        },
        trace_toggle: !args.no_trace,
        ..Config::default()
    };
    let mut runtime = Runtime::with_config(TermConsole::default(), config);
    if let Some(path) = &args.il {
        let listing = std::fs::read_to_string(path)?;
        if let Err(error) = runtime.initialize(Some(&listing)) {
            let msg = format!("{}: {:?}", path.display(), error);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, msg));
        }
    }
    if let Some(path) = &args.input {
        let reader = BufReader::new(File::open(path)?);
        runtime.set_input_file(Some(Box::new(FileInput::new(reader))));
    }
    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        runtime.set_output_file(Some(Box::new(FileOutput::new(writer))));
    }
    if let Some(path) = &args.program {
        let text = std::fs::read_to_string(path)?;
        type_and_run(runtime.console_mut(), &text);
    }

    let flag = runtime.break_flag();
    ctrlc::set_handler(move || flag.signal()).expect("Error setting Ctrl-C handler");

    let interface = Interface::new("tinybasic")?;
    interface.set_report_signal(Signal::Interrupt, true);
    let mut status = Status::TimesliceExhausted;
    loop {
        status = runtime.run_timeslice(status);
        let console = runtime.console_mut();
        match status {
            Status::Done => {
                console.flush_all(&interface)?;
                break;
            }
            Status::TimesliceExhausted => {
                console.flush_all(&interface)?;
            }
            Status::NeedLine | Status::NeedChar => {
                console.flush_lines(&interface)?;
                if !console.input.is_empty() {
                    continue;
                }
                interface.set_prompt(&console.take_pending())?;
                match interface.read_line()? {
                    ReadResult::Input(line) => {
                        console.type_line(&line);
                        interface.add_history_unique(line);
                    }
                    ReadResult::Signal(Signal::Interrupt) => {
                        interface.set_buffer("")?;
                        runtime.signal_break();
                        runtime.console_mut().type_line("");
                    }
                    ReadResult::Signal(_) | ReadResult::Eof => break,
                }
            }
        }
    }
    Ok(())
}

/// Clear the old program and variables, type in a new one and RUN it.
fn type_and_run(console: &mut TermConsole, text: &str) {
    console.type_line("CLEAR");
    for letter in b'A'..=b'Z' {
        console.type_line(&format!("LET {}=0", letter as char));
    }
    for line in text.lines() {
        let line = line.trim_end();
        if !line.is_empty() {
            console.type_line(line);
        }
    }
    console.type_line("RUN");
}

/// Keyboard queue and screen buffer between the machine and `linefeed`.
/// The unfinished last line of output becomes the input prompt.
#[derive(Default)]
struct TermConsole {
    input: VecDeque<char>,
    pending: String,
}

impl TermConsole {
    fn type_line(&mut self, line: &str) {
        self.input.extend(line.chars());
        self.input.push_back('\n');
    }

    fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    /// Write out complete lines, keeping any unfinished one.
    fn flush_lines<T: linefeed::Terminal>(&mut self, interface: &Interface<T>) -> std::io::Result<()> {
        if let Some(index) = self.pending.rfind('\n') {
            let rest = self.pending.split_off(index + 1);
            let lines = std::mem::replace(&mut self.pending, rest);
            write_styled(interface, &lines)?;
        }
        Ok(())
    }

    fn flush_all<T: linefeed::Terminal>(&mut self, interface: &Interface<T>) -> std::io::Result<()> {
        let text = self.take_pending();
        write_styled(interface, &text)
    }
}

impl Console for TermConsole {
    fn write_char(&mut self, ch: char) {
        self.pending.push(ch);
    }
    fn write_str(&mut self, s: &str) {
        self.pending.push_str(s);
    }
    fn read_char(&mut self) -> Option<char> {
        self.input.pop_front()
    }
}

/// Error stops are shown in bold.
fn write_styled<T: linefeed::Terminal>(interface: &Interface<T>, text: &str) -> std::io::Result<()> {
    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches('\n');
        if body.starts_with("Tiny Basic error") || body.starts_with("*** ") {
            let newline = if line.ends_with('\n') { "\n" } else { "" };
            interface.write_fmt(format_args!("{}{}", Style::new().bold().paint(body), newline))?;
        } else {
            interface.write_fmt(format_args!("{}", line))?;
        }
    }
    Ok(())
}
